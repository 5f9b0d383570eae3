use crate::config::{CatalogQueryConfig, ColumnMap};
use crate::core::normalizer::{identity_fields, normalize_row};
use crate::domain::model::{MatchOutcome, MatchResult, Target};
use crate::domain::ports::{CatalogService, ConeSearch};
use crate::utils::error::{MetaError, Result};

/// Resolves one target at a time against a [`CatalogService`].
pub struct MatchClient<S: CatalogService> {
    service: S,
    query: CatalogQueryConfig,
    columns: ColumnMap,
}

impl<S: CatalogService> MatchClient<S> {
    pub fn new(service: S, query: CatalogQueryConfig, columns: ColumnMap) -> Self {
        Self {
            service,
            query,
            columns,
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn cone_search_for(&self, target: &Target) -> ConeSearch {
        ConeSearch {
            catalog: self.query.catalog_name.clone(),
            ra_deg: target.right_ascension,
            dec_deg: target.declination,
            radius_arcsec: self.query.radius_arcsec,
            include_separation_column: self.query.include_separation_column,
            row_limit: self.query.row_limit,
        }
    }

    /// The first row of the first table is the match; the service's ordering is
    /// trusted. Service faults are returned as errors, never as `Unmatched`.
    pub async fn find_match(&self, target: &Target) -> Result<MatchResult> {
        let tables = self
            .service
            .cone_search(&self.cone_search_for(target))
            .await?;

        let table = tables.into_iter().next();
        let candidate = table.as_ref().and_then(|t| t.candidate(0));
        if let Some(table) = &table {
            tracing::debug!("{}: {} row(s) in {}", target.catalog_id, table.len(), table.name);
        }

        let outcome = match &candidate {
            None => MatchOutcome::Unmatched,
            Some(row) => match normalize_row(row, &self.columns) {
                Ok(record) => MatchOutcome::Matched(record.stamped(&target.catalog_id)),
                Err(MetaError::MalformedRow { object_id, message }) => {
                    tracing::warn!(
                        "{}: matched {} but its magnitudes are unusable: {}",
                        target.catalog_id,
                        object_id,
                        message
                    );
                    MatchOutcome::Malformed {
                        record: identity_fields(row, &self.columns).stamped(&target.catalog_id),
                        reason: message,
                    }
                }
                Err(e) => return Err(e),
            },
        };

        Ok(MatchResult {
            target_id: target.catalog_id.clone(),
            table,
            outcome,
        })
    }
}
