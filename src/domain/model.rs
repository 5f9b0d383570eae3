use crate::utils::error::{MetaError, Result};
use crate::utils::validation::{validate_range, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Opaque external identifier of a target star. Numeric ids are kept as their text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(String);

impl TargetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TargetId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<u64> for TargetId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub catalog_id: TargetId,
    /// ICRS right ascension, degrees.
    pub right_ascension: f64,
    /// ICRS declination, degrees.
    pub declination: f64,
}

impl Target {
    pub fn new(catalog_id: impl Into<TargetId>, right_ascension: f64, declination: f64) -> Self {
        Self {
            catalog_id: catalog_id.into(),
            right_ascension,
            declination,
        }
    }
}

impl Validate for Target {
    fn validate(&self) -> Result<()> {
        if self.catalog_id.as_str().trim().is_empty() {
            return Err(MetaError::InvalidConfigValueError {
                field: "target.catalog_id".to_string(),
                value: String::new(),
                reason: "Target id cannot be empty".to_string(),
            });
        }
        validate_range("target.right_ascension", self.right_ascension, 0.0, 360.0, false)?;
        validate_range("target.declination", self.declination, -90.0, 90.0, true)
    }
}

/// One table of a cone-search response, cells kept as trimmed catalog text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogTable {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CatalogTable {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The row at `index` as a column-name mapping. Short rows yield empty cells.
    pub fn candidate(&self, index: usize) -> Option<MatchCandidate> {
        let row = self.rows.get(index)?;
        Some(
            self.columns
                .iter()
                .enumerate()
                .map(|(i, column)| (column.clone(), row.get(i).cloned().unwrap_or_default()))
                .collect(),
        )
    }
}

/// A matched catalog row. Columns the normalizer does not read are carried as-is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchCandidate {
    fields: HashMap<String, String>,
}

impl MatchCandidate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(column.into(), value.into());
        self
    }

    /// Trimmed cell text; blank cells read as absent.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .get(column)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MatchCandidate {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// How a catalog row stores brightness.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MagnitudeEncoding {
    /// Genuine range: faintest (`min`) and brightest (`max`) magnitudes.
    Range { min: f64, max: f64 },
    /// The min/max columns were overloaded to carry amplitude and magnitude.
    Direct { magnitude: f64, amplitude: f64 },
}

impl MagnitudeEncoding {
    /// `(magnitude, amplitude)`; for a range, the midpoint and half the spread.
    /// `None` when either derived value is not finite.
    pub fn magnitude_and_amplitude(&self) -> Option<(f64, f64)> {
        let (magnitude, amplitude) = match *self {
            MagnitudeEncoding::Range { min, max } => {
                let amplitude = (min - max) / 2.0;
                (max - amplitude, amplitude)
            }
            MagnitudeEncoding::Direct {
                magnitude,
                amplitude,
            } => (magnitude, amplitude),
        };
        (magnitude.is_finite() && amplitude.is_finite()).then_some((magnitude, amplitude))
    }

    pub fn is_amplitude_native(&self) -> bool {
        matches!(self, MagnitudeEncoding::Direct { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    /// Set by the match client once the record is tied to a target.
    pub target_id: Option<TargetId>,
    pub object_id: String,
    pub variability_type: Option<String>,
    pub period: Option<String>,
    pub epoch: Option<String>,
    /// Always set on a matched record; both absent when the row's magnitudes
    /// could not be read.
    pub magnitude: Option<f64>,
    pub amplitude: Option<f64>,
    pub is_amplitude_native: bool,
    pub magnitude_band: Option<String>,
    pub angular_distance: Option<String>,
    pub alternate_name: Option<String>,
}

impl NormalizedRecord {
    pub fn stamped(mut self, target_id: &TargetId) -> Self {
        self.target_id = Some(target_id.clone());
        self
    }
}

/// Loose field mapping handed to the serializer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub data: HashMap<String, serde_json::Value>,
}

impl Record {
    /// The stub written for a target without a usable match.
    pub fn for_target(target_id: &TargetId) -> Self {
        let mut data = HashMap::new();
        data.insert(
            "target_id".to_string(),
            serde_json::Value::String(target_id.to_string()),
        );
        Self { data }
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }
}

impl From<&NormalizedRecord> for Record {
    fn from(record: &NormalizedRecord) -> Self {
        use serde_json::Value;

        fn text(value: &Option<String>) -> Value {
            value.clone().map(Value::String).unwrap_or(Value::Null)
        }

        fn number(value: Option<f64>) -> Value {
            value
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null)
        }

        let mut data = HashMap::new();
        data.insert(
            "target_id".to_string(),
            record
                .target_id
                .as_ref()
                .map(|id| Value::String(id.to_string()))
                .unwrap_or(Value::Null),
        );
        data.insert(
            "object_id".to_string(),
            Value::String(record.object_id.clone()),
        );
        data.insert("variability_type".to_string(), text(&record.variability_type));
        data.insert("period".to_string(), text(&record.period));
        data.insert("epoch".to_string(), text(&record.epoch));
        data.insert("magnitude".to_string(), number(record.magnitude));
        data.insert("amplitude".to_string(), number(record.amplitude));
        data.insert(
            "is_amplitude_native".to_string(),
            Value::Bool(record.is_amplitude_native),
        );
        data.insert("magnitude_band".to_string(), text(&record.magnitude_band));
        data.insert("angular_distance".to_string(), text(&record.angular_distance));
        data.insert("alternate_name".to_string(), text(&record.alternate_name));
        Record { data }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    Matched(NormalizedRecord),
    /// No table, or an empty one.
    Unmatched,
    /// A row came back but its magnitude fields could not be read. The record
    /// keeps the row's identity fields with magnitude and amplitude left empty.
    Malformed {
        record: NormalizedRecord,
        reason: String,
    },
}

/// Everything one cone search produced for a target.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub target_id: TargetId,
    /// First table of the response, kept verbatim for the raw text stream.
    pub table: Option<CatalogTable>,
    pub outcome: MatchOutcome,
}

impl MatchResult {
    pub fn record(&self) -> Option<&NormalizedRecord> {
        match &self.outcome {
            MatchOutcome::Matched(record) => Some(record),
            _ => None,
        }
    }

    /// The record to serialize: the row's fields when one came back, or only
    /// the target id.
    pub fn to_record(&self) -> Record {
        match &self.outcome {
            MatchOutcome::Matched(record) | MatchOutcome::Malformed { record, .. } => {
                Record::from(record)
            }
            MatchOutcome::Unmatched => Record::for_target(&self.target_id),
        }
    }
}
