pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{open_file_sink, read_targets_from_path, DualStreamSink, VizierClient};
pub use config::{CatalogQueryConfig, ColumnMap, TomlConfig};
pub use crate::core::{batch::BatchEngine, matcher::MatchClient};
pub use utils::error::{MetaError, Result};
