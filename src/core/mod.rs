pub mod batch;
pub mod matcher;
pub mod normalizer;
pub mod serializer;

pub use crate::domain::model::{MatchOutcome, MatchResult, NormalizedRecord, Record, Target};
pub use crate::domain::ports::{CatalogService, ConeSearch};
pub use crate::utils::error::Result;
