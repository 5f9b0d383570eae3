pub mod catalog;
#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

pub use catalog::{CatalogQueryConfig, ColumnMap};
#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use toml_config::{BatchConfig, FaultPolicy, OutputConfig, TomlConfig};
