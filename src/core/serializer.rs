use crate::domain::model::{CatalogTable, Record};
use crate::utils::error::{MetaError, Result};
use csv::{QuoteStyle, ReaderBuilder, Terminator, WriterBuilder};
use serde_json::Value;

pub const FIELD_DELIMITER: u8 = b'|';

/// Column order of the structured output.
pub const FIELDS: [&str; 11] = [
    "target_id",
    "object_id",
    "variability_type",
    "period",
    "epoch",
    "magnitude",
    "amplitude",
    "is_amplitude_native",
    "magnitude_band",
    "angular_distance",
    "alternate_name",
];

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn finish_writer(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| MetaError::IoError(std::io::Error::new(e.error().kind(), e.error().to_string())))?;
    String::from_utf8(bytes).map_err(|e| MetaError::ResponseFormatError {
        message: format!("non UTF-8 output: {}", e),
    })
}

/// One pipe-delimited line in [`FIELDS`] order, without a line terminator.
/// Keys outside [`FIELDS`] are ignored; absent keys become empty fields.
pub fn serialize_record(record: &Record) -> Result<String> {
    let cells: Vec<String> = FIELDS.iter().map(|field| cell(record.get(field))).collect();

    let mut writer = WriterBuilder::new()
        .delimiter(FIELD_DELIMITER)
        .has_headers(false)
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(&cells)?;

    let line = finish_writer(writer)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Reads a line written by [`serialize_record`]. Values come back as strings;
/// empty fields are left out of the record.
pub fn parse_line(line: &str) -> Result<Record> {
    let mut reader = ReaderBuilder::new()
        .delimiter(FIELD_DELIMITER)
        .has_headers(false)
        .from_reader(line.as_bytes());

    let row = reader
        .records()
        .next()
        .transpose()?
        .ok_or_else(|| MetaError::ResponseFormatError {
            message: "empty structured line".to_string(),
        })?;

    if row.len() != FIELDS.len() {
        return Err(MetaError::ResponseFormatError {
            message: format!("expected {} fields, found {}", FIELDS.len(), row.len()),
        });
    }

    let mut record = Record::default();
    for (field, value) in FIELDS.iter().zip(row.iter()) {
        if !value.is_empty() {
            record
                .data
                .insert(field.to_string(), Value::String(value.to_string()));
        }
    }
    Ok(record)
}

/// The table as comma-delimited text, header row first, `\n` line endings
/// and no carriage returns anywhere. An empty string when there is no table.
pub fn render_raw_table(table: Option<&CatalogTable>) -> Result<String> {
    let Some(table) = table else {
        return Ok(String::new());
    };

    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }

    Ok(finish_writer(writer)?.replace('\r', ""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{NormalizedRecord, TargetId};

    fn sample_record() -> NormalizedRecord {
        NormalizedRecord {
            target_id: Some(TargetId::from(627436u64)),
            object_id: "18147".to_string(),
            variability_type: Some("EA".to_string()),
            period: Some("2.8673".to_string()),
            epoch: Some("2452500.123".to_string()),
            magnitude: Some(11.3),
            amplitude: Some(2.1),
            is_amplitude_native: true,
            magnitude_band: Some("V".to_string()),
            angular_distance: Some("0.35".to_string()),
            alternate_name: Some("ASAS J045211-2511.6".to_string()),
        }
    }

    #[test]
    fn test_fixed_column_order() {
        let line = serialize_record(&Record::from(&sample_record())).unwrap();
        assert_eq!(
            line,
            "627436|18147|EA|2.8673|2452500.123|11.3|2.1|true|V|0.35|ASAS J045211-2511.6"
        );
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let record = Record::from(&sample_record());
        let mut with_extra = record.clone();
        with_extra
            .data
            .insert("debug_table".to_string(), Value::String("ignored".to_string()));

        assert_eq!(
            serialize_record(&with_extra).unwrap(),
            serialize_record(&record).unwrap()
        );
    }

    #[test]
    fn test_id_only_record_serializes_empty_fields() {
        let line = serialize_record(&Record::for_target(&TargetId::from(99u64))).unwrap();
        assert_eq!(line, "99||||||||||");
        assert!(!line.ends_with('\n'));
    }

    #[test]
    fn test_delimiter_in_free_text_is_quoted() {
        let mut record = sample_record();
        record.alternate_name = Some("V* AB|CD".to_string());
        let line = serialize_record(&Record::from(&record)).unwrap();

        assert!(line.ends_with("|\"V* AB|CD\""));
        let parsed = parse_line(&line).unwrap();
        assert_eq!(parsed.get("alternate_name").unwrap().as_str(), Some("V* AB|CD"));
    }

    #[test]
    fn test_parse_line_recovers_all_fields() {
        let line = serialize_record(&Record::from(&sample_record())).unwrap();
        let parsed = parse_line(&line).unwrap();

        let values: Vec<&str> = FIELDS
            .iter()
            .map(|f| parsed.get(f).and_then(Value::as_str).unwrap_or(""))
            .collect();
        assert_eq!(
            values,
            vec![
                "627436",
                "18147",
                "EA",
                "2.8673",
                "2452500.123",
                "11.3",
                "2.1",
                "true",
                "V",
                "0.35",
                "ASAS J045211-2511.6"
            ]
        );
    }

    #[test]
    fn test_parse_line_rejects_wrong_width() {
        assert!(parse_line("1|2|3").is_err());
    }

    #[test]
    fn test_render_raw_table() {
        let mut table = CatalogTable::new(
            "B/vsx/vsx",
            vec!["_r".to_string(), "OID".to_string(), "Name".to_string()],
        );
        table
            .rows
            .push(vec!["0.35".to_string(), "18147".to_string(), "V* X, Y\r".to_string()]);

        let text = render_raw_table(Some(&table)).unwrap();
        assert_eq!(text, "_r,OID,Name\n0.35,18147,\"V* X, Y\"\n");
        assert_eq!(render_raw_table(None).unwrap(), "");
    }
}
