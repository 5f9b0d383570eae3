use crate::config::toml_config::{FaultPolicy, TomlConfig};
use crate::utils::error::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "vsx-meta")]
#[command(about = "Cross-match targets against the VSX variable star catalog")]
pub struct CliConfig {
    /// TOML configuration file; CLI flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Pipe-delimited target table (id|ra|dec, no header)
    #[arg(long)]
    pub input: Option<String>,

    /// Structured output, one pipe-delimited line per target
    #[arg(long)]
    pub csv_out: Option<String>,

    /// Raw matched-table output
    #[arg(long)]
    pub text_out: Option<String>,

    /// Append to the output files instead of truncating them
    #[arg(long)]
    pub append: bool,

    /// Skip the first N targets
    #[arg(long)]
    pub skip: Option<usize>,

    /// Process at most N targets
    #[arg(long)]
    pub limit: Option<usize>,

    /// Continue past catalog service faults instead of aborting
    #[arg(long)]
    pub skip_failed: bool,

    /// Label placed before the id in text headers, e.g. "TIC"
    #[arg(long)]
    pub id_label: Option<String>,

    /// VizieR base URL
    #[arg(long)]
    pub endpoint: Option<String>,

    #[arg(long)]
    pub radius_arcsec: Option<f64>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    /// Read and validate the targets, print the plan, query nothing
    #[arg(long)]
    pub dry_run: bool,
}

impl CliConfig {
    /// Built-in defaults, then the TOML file, then flags.
    pub fn resolve(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut TomlConfig) {
        if let Some(input) = &self.input {
            config.input.path = input.clone();
        }
        if let Some(csv_out) = &self.csv_out {
            config.output.csv_path = csv_out.clone();
        }
        if let Some(text_out) = &self.text_out {
            config.output.text_path = text_out.clone();
        }
        if self.append {
            config.output.append = true;
        }
        if let Some(label) = &self.id_label {
            config.output.id_label = Some(label.clone());
        }
        if let Some(skip) = self.skip {
            config.batch.skip = skip;
        }
        if let Some(limit) = self.limit {
            config.batch.limit = Some(limit);
        }
        if self.skip_failed {
            config.batch.on_service_fault = FaultPolicy::Skip;
        }
        if let Some(endpoint) = &self.endpoint {
            config.catalog.endpoint = endpoint.clone();
        }
        if let Some(radius) = self.radius_arcsec {
            config.catalog.radius_arcsec = radius;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_file_values() {
        let cli = CliConfig::parse_from([
            "vsx-meta",
            "--csv-out",
            "meta.csv",
            "--skip",
            "3",
            "--skip-failed",
            "--radius-arcsec",
            "30",
        ]);

        let mut config = TomlConfig::from_toml_str("[batch]\nskip = 1\nlimit = 9\n").unwrap();
        cli.apply_overrides(&mut config);

        assert_eq!(config.output.csv_path, "meta.csv");
        assert_eq!(config.batch.skip, 3);
        assert_eq!(config.batch.limit, Some(9));
        assert_eq!(config.batch.on_service_fault, FaultPolicy::Skip);
        assert_eq!(config.catalog.radius_arcsec, 30.0);
        assert!(!config.output.append);
    }

    #[test]
    fn test_resolve_without_file_uses_defaults() {
        let cli = CliConfig::parse_from(["vsx-meta"]);
        assert_eq!(cli.resolve().unwrap(), TomlConfig::default());
    }
}
