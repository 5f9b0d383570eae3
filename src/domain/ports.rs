use crate::domain::model::CatalogTable;
use crate::utils::error::Result;
use async_trait::async_trait;

/// A radius-bounded query around one sky position.
#[derive(Debug, Clone, PartialEq)]
pub struct ConeSearch {
    pub catalog: String,
    pub ra_deg: f64,
    pub dec_deg: f64,
    pub radius_arcsec: f64,
    /// Ask the service to add (and sort by) the angular separation column.
    pub include_separation_column: bool,
    /// `None` leaves the cap to the service.
    pub row_limit: Option<usize>,
}

#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Zero or more tables, each zero or more rows, in the service's own order.
    async fn cone_search(&self, query: &ConeSearch) -> Result<Vec<CatalogTable>>;
}
