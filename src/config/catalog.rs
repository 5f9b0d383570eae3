use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_positive, validate_url, Validate,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_ENDPOINT: &str = "https://vizier.cds.unistra.fr";
pub const DEFAULT_CATALOG: &str = "B/vsx/vsx";
pub const DEFAULT_RADIUS_ARCSEC: f64 = 120.0;

/// How each target's cone search is shaped. Built once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogQueryConfig {
    /// Base URL of the VizieR server.
    pub endpoint: String,
    /// VizieR table to search.
    pub catalog_name: String,
    pub radius_arcsec: f64,
    /// Add the computed `_r` separation column, which the server also sorts by.
    pub include_separation_column: bool,
    /// Maximum rows per table; absent means unbounded.
    pub row_limit: Option<usize>,
    pub timeout_seconds: u64,
}

impl Default for CatalogQueryConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            catalog_name: DEFAULT_CATALOG.to_string(),
            radius_arcsec: DEFAULT_RADIUS_ARCSEC,
            include_separation_column: true,
            row_limit: None,
            timeout_seconds: 60,
        }
    }
}

impl Validate for CatalogQueryConfig {
    fn validate(&self) -> Result<()> {
        validate_url("catalog.endpoint", &self.endpoint)?;
        validate_non_empty_string("catalog.catalog_name", &self.catalog_name)?;
        validate_positive("catalog.radius_arcsec", self.radius_arcsec)?;
        if self.row_limit == Some(0) {
            return Err(crate::utils::error::MetaError::InvalidConfigValueError {
                field: "catalog.row_limit".to_string(),
                value: "0".to_string(),
                reason: "Omit the limit for unbounded results".to_string(),
            });
        }
        Ok(())
    }
}

/// Catalog column names the normalizer reads. Defaults follow the VSX schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub object_id: String,
    pub variability_type: String,
    pub period: String,
    pub epoch: String,
    pub min_magnitude: String,
    pub max_magnitude: String,
    /// Flag column of `min`; a leading `(` marks amplitude encoding.
    pub min_flag: String,
    pub max_band: String,
    pub separation: String,
    pub alternate_name: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            object_id: "OID".to_string(),
            variability_type: "Type".to_string(),
            period: "Period".to_string(),
            epoch: "Epoch".to_string(),
            min_magnitude: "min".to_string(),
            max_magnitude: "max".to_string(),
            min_flag: "f_min".to_string(),
            max_band: "n_max".to_string(),
            separation: "_r".to_string(),
            alternate_name: "Name".to_string(),
        }
    }
}

impl Validate for ColumnMap {
    fn validate(&self) -> Result<()> {
        let columns = [
            ("columns.object_id", &self.object_id),
            ("columns.variability_type", &self.variability_type),
            ("columns.period", &self.period),
            ("columns.epoch", &self.epoch),
            ("columns.min_magnitude", &self.min_magnitude),
            ("columns.max_magnitude", &self.max_magnitude),
            ("columns.min_flag", &self.min_flag),
            ("columns.max_band", &self.max_band),
            ("columns.separation", &self.separation),
            ("columns.alternate_name", &self.alternate_name),
        ];
        for (field, value) in columns {
            validate_non_empty_string(field, value)?;
        }
        Ok(())
    }
}
