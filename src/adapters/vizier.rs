//! [`CatalogService`] backed by a VizieR server's ASU interface.
//!
//! The `asu-tsv` output is a block of `#` comment lines followed, per table, by
//! a tab-separated header row, a units row, a row of dashes and the data rows.
//! Tables are separated by blank lines or further comment blocks.

use crate::config::CatalogQueryConfig;
use crate::domain::model::CatalogTable;
use crate::domain::ports::{CatalogService, ConeSearch};
use crate::utils::error::{MetaError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const ASU_TSV_PATH: &str = "/viz-bin/asu-tsv";
const SEPARATION_COLUMN: &str = "_r";

pub struct VizierClient {
    client: Client,
    endpoint: String,
}

impl VizierClient {
    pub fn new(config: &CatalogQueryConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("vsx-meta/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn query_url(&self) -> String {
        format!("{}{}", self.endpoint, ASU_TSV_PATH)
    }

    pub fn query_params(query: &ConeSearch) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("-source", query.catalog.clone()),
            ("-c", format!("{}{:+}", query.ra_deg, query.dec_deg)),
            ("-c.rs", query.radius_arcsec.to_string()),
            ("-oc.form", "dec".to_string()),
            ("-out.all", String::new()),
        ];
        if query.include_separation_column {
            params.push(("-out.add", SEPARATION_COLUMN.to_string()));
            params.push(("-sort", SEPARATION_COLUMN.to_string()));
        }
        let max = query
            .row_limit
            .map(|limit| limit.to_string())
            .unwrap_or_else(|| "unlimited".to_string());
        params.push(("-out.max", max));
        params
    }
}

#[async_trait]
impl CatalogService for VizierClient {
    async fn cone_search(&self, query: &ConeSearch) -> Result<Vec<CatalogTable>> {
        let url = self.query_url();
        tracing::debug!(
            "Cone search on {} at ({}, {}) r={}\"",
            query.catalog,
            query.ra_deg,
            query.dec_deg,
            query.radius_arcsec
        );

        let response = self
            .client
            .get(&url)
            .query(&Self::query_params(query))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        tracing::debug!("VizieR response status: {} ({} bytes)", status, body.len());

        if !status.is_success() {
            return Err(MetaError::ServiceError {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        parse_asu_tsv(&body)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ParseState {
    Seeking,
    AfterHeader,
    AfterUnits,
    Rows,
}

fn is_dash_row(line: &str) -> bool {
    line.contains('-') && line.chars().all(|c| c == '-' || c == '\t' || c == ' ')
}

fn split_cells(line: &str) -> Vec<String> {
    line.split('\t').map(|cell| cell.trim().to_string()).collect()
}

pub fn parse_asu_tsv(body: &str) -> Result<Vec<CatalogTable>> {
    let mut tables = Vec::new();
    let mut current: Option<CatalogTable> = None;
    let mut pending_name = String::new();
    let mut state = ParseState::Seeking;

    for (index, line) in body.lines().enumerate() {
        if let Some(comment) = line.strip_prefix('#') {
            tables.extend(current.take());
            state = ParseState::Seeking;

            if comment.starts_with("***") && comment.to_ascii_lowercase().contains("error") {
                return Err(MetaError::ResponseFormatError {
                    message: comment.trim_start_matches('*').trim().to_string(),
                });
            }
            if let Some(name) = comment.strip_prefix("Name:") {
                pending_name = name.trim().to_string();
            } else if let Some(table) = comment.strip_prefix("Table") {
                pending_name = table.trim().trim_end_matches(':').to_string();
            }
            continue;
        }

        // A units row may be nothing but tabs.
        if line.trim().is_empty() && state != ParseState::AfterHeader {
            tables.extend(current.take());
            state = ParseState::Seeking;
            continue;
        }

        state = match state {
            ParseState::Seeking => {
                current = Some(CatalogTable::new(pending_name.clone(), split_cells(line)));
                ParseState::AfterHeader
            }
            ParseState::AfterHeader if is_dash_row(line) => ParseState::Rows,
            ParseState::AfterHeader => ParseState::AfterUnits,
            ParseState::AfterUnits if is_dash_row(line) => ParseState::Rows,
            ParseState::AfterUnits => {
                return Err(MetaError::ResponseFormatError {
                    message: format!("line {}: expected a dash row after the units row", index + 1),
                });
            }
            ParseState::Rows => {
                if let Some(table) = current.as_mut() {
                    table.rows.push(split_cells(line));
                }
                ParseState::Rows
            }
        };
    }
    tables.extend(current.take());

    Ok(tables)
}
