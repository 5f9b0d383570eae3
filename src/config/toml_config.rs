use crate::config::catalog::{CatalogQueryConfig, ColumnMap};
use crate::utils::error::{MetaError, Result};
use crate::utils::validation::{validate_path, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_INPUT_PATH: &str = "data_samples/exofop_meta_samples.csv";
pub const DEFAULT_CSV_PATH: &str = "data_samples/vsx_meta_samples.csv";
pub const DEFAULT_TEXT_PATH: &str = "data_samples/vsx_text_samples.txt";

/// Whole-run configuration as read from a TOML file. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub catalog: CatalogQueryConfig,
    pub columns: ColumnMap,
    pub input: InputConfig,
    pub output: OutputConfig,
    pub batch: BatchConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Pipe-delimited target table: id|ra|dec[|...], no header.
    pub path: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_INPUT_PATH.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub csv_path: String,
    pub text_path: String,
    /// Append to existing files instead of truncating them.
    pub append: bool,
    /// Label placed before the id in text headers, e.g. "TIC".
    pub id_label: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_path: DEFAULT_CSV_PATH.to_string(),
            text_path: DEFAULT_TEXT_PATH.to_string(),
            append: false,
            id_label: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultPolicy {
    /// Stop the batch at the first service fault.
    #[default]
    Abort,
    /// Record the fault, write nothing for that target, continue.
    Skip,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Leading targets to pass over, for resuming an interrupted run.
    pub skip: usize,
    pub limit: Option<usize>,
    pub on_service_fault: FaultPolicy,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| MetaError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| MetaError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.catalog.validate()?;
        self.columns.validate()?;
        validate_path("input.path", &self.input.path)?;
        validate_path("output.csv_path", &self.output.csv_path)?;
        validate_path("output.text_path", &self.output.text_path)?;
        if self.output.csv_path == self.output.text_path {
            return Err(MetaError::InvalidConfigValueError {
                field: "output.text_path".to_string(),
                value: self.output.text_path.clone(),
                reason: "CSV and text outputs must be different files".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config, TomlConfig::default());
        assert_eq!(config.catalog.catalog_name, "B/vsx/vsx");
        assert_eq!(config.batch.on_service_fault, FaultPolicy::Abort);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[catalog]
endpoint = "http://localhost:9000"
catalog_name = "B/vsx/vsx"
radius_arcsec = 30.0
row_limit = 5

[columns]
epoch = "_tab1_15"

[input]
path = "targets.psv"

[output]
csv_path = "out/meta.csv"
text_path = "out/raw.txt"
append = true
id_label = "TIC"

[batch]
skip = 10
limit = 100
on_service_fault = "skip"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.catalog.radius_arcsec, 30.0);
        assert_eq!(config.catalog.row_limit, Some(5));
        assert!(config.catalog.include_separation_column);
        assert_eq!(config.columns.epoch, "_tab1_15");
        assert_eq!(config.columns.min_flag, "f_min");
        assert_eq!(config.output.id_label.as_deref(), Some("TIC"));
        assert!(config.output.append);
        assert_eq!(config.batch.skip, 10);
        assert_eq!(config.batch.limit, Some(100));
        assert_eq!(config.batch.on_service_fault, FaultPolicy::Skip);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("VSX_META_TEST_ENDPOINT", "https://vizier.example.org");

        let toml_content = r#"
[catalog]
endpoint = "${VSX_META_TEST_ENDPOINT}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.catalog.endpoint, "https://vizier.example.org");

        std::env::remove_var("VSX_META_TEST_ENDPOINT");
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[catalog]
endpoint = "invalid-url"
"#;
        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());

        let same_outputs = r#"
[output]
csv_path = "out.txt"
text_path = "out.txt"
"#;
        let config = TomlConfig::from_toml_str(same_outputs).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_fault_policy_is_parse_error() {
        let toml_content = r#"
[batch]
on_service_fault = "retry"
"#;
        assert!(matches!(
            TomlConfig::from_toml_str(toml_content),
            Err(MetaError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_bundled_example_config() {
        let config = TomlConfig::from_toml_str(include_str!("../../vsx_meta.toml")).unwrap();
        assert_eq!(config.catalog, CatalogQueryConfig::default());
        assert_eq!(config.output.id_label.as_deref(), Some("TIC"));
        assert_eq!(config.batch, BatchConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[catalog]\nradius_arcsec = 60.0\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.catalog.radius_arcsec, 60.0);
    }
}
