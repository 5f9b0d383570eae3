//! Turns one matched catalog row into a [`NormalizedRecord`].
//!
//! VSX stores brightness in its `min`/`max` columns in two ways. Usually they
//! are the faintest and brightest magnitudes. For some variable types the
//! catalog instead puts the amplitude in `min` and the mean magnitude in
//! `max`, and marks this with a `(` in the `min` flag column. The encoding is
//! decided here, once, and carried as a [`MagnitudeEncoding`].

use crate::config::ColumnMap;
use crate::domain::model::{MagnitudeEncoding, MatchCandidate, NormalizedRecord};
use crate::utils::error::{MetaError, Result};

const AMPLITUDE_MARKER: char = '(';

pub fn decide_encoding(candidate: &MatchCandidate, columns: &ColumnMap) -> Result<MagnitudeEncoding> {
    let min = read_magnitude(candidate, columns, &columns.min_magnitude)?;
    let max = read_magnitude(candidate, columns, &columns.max_magnitude)?;

    if is_marked(candidate, columns) {
        Ok(MagnitudeEncoding::Direct {
            magnitude: max,
            amplitude: min,
        })
    } else {
        Ok(MagnitudeEncoding::Range { min, max })
    }
}

/// `None` in, `None` out: an absent candidate is the ordinary unmatched case.
pub fn normalize(
    candidate: Option<&MatchCandidate>,
    columns: &ColumnMap,
) -> Result<Option<NormalizedRecord>> {
    candidate.map(|row| normalize_row(row, columns)).transpose()
}

/// Normalizes one row; fails with `MalformedRow` unless both magnitude and
/// amplitude can be derived.
pub fn normalize_row(candidate: &MatchCandidate, columns: &ColumnMap) -> Result<NormalizedRecord> {
    let encoding = decide_encoding(candidate, columns)?;
    let (magnitude, amplitude) = encoding.magnitude_and_amplitude().ok_or_else(|| {
        MetaError::MalformedRow {
            object_id: object_id(candidate, columns),
            message: format!("derived magnitude or amplitude is not finite: {:?}", encoding),
        }
    })?;

    Ok(NormalizedRecord {
        magnitude: Some(magnitude),
        amplitude: Some(amplitude),
        is_amplitude_native: encoding.is_amplitude_native(),
        ..identity_fields(candidate, columns)
    })
}

/// The row's passthrough fields with magnitude and amplitude left empty. Used
/// as-is for rows whose magnitudes cannot be read.
///
/// The passband is read from the max-passband column only; the min passband is
/// assumed to be the same and is not checked.
pub fn identity_fields(candidate: &MatchCandidate, columns: &ColumnMap) -> NormalizedRecord {
    let text = |column: &str| candidate.get(column).map(str::to_string);

    NormalizedRecord {
        target_id: None,
        object_id: object_id(candidate, columns),
        variability_type: text(&columns.variability_type),
        period: text(&columns.period),
        epoch: text(&columns.epoch),
        magnitude: None,
        amplitude: None,
        is_amplitude_native: is_marked(candidate, columns),
        magnitude_band: text(&columns.max_band),
        angular_distance: text(&columns.separation),
        alternate_name: text(&columns.alternate_name),
    }
}

fn is_marked(candidate: &MatchCandidate, columns: &ColumnMap) -> bool {
    candidate
        .get(&columns.min_flag)
        .is_some_and(|flag| flag.starts_with(AMPLITUDE_MARKER))
}

fn object_id(candidate: &MatchCandidate, columns: &ColumnMap) -> String {
    candidate.get(&columns.object_id).unwrap_or_default().to_string()
}

fn read_magnitude(candidate: &MatchCandidate, columns: &ColumnMap, column: &str) -> Result<f64> {
    let malformed = |message: String| MetaError::MalformedRow {
        object_id: object_id(candidate, columns),
        message,
    };

    let raw = candidate
        .get(column)
        .ok_or_else(|| malformed(format!("'{}' is empty", column)))?;

    let value: f64 = raw
        .parse()
        .map_err(|_| malformed(format!("'{}' is not numeric: {:?}", column, raw)))?;

    if value.is_finite() {
        Ok(value)
    } else {
        Err(malformed(format!("'{}' is not finite: {:?}", column, raw)))
    }
}
