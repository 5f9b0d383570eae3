use crate::domain::model::{Target, TargetId};
use crate::utils::error::{MetaError, Result};
use crate::utils::validation::Validate;
use csv::{ReaderBuilder, Trim};
use std::io::Read;
use std::path::Path;

/// Reads `id|ra|dec[|...]` lines (no header). Columns past the third are ignored.
pub fn read_targets<R: Read>(reader: R) -> Result<Vec<Target>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'|')
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut targets = Vec::new();
    for row in reader.records() {
        let row = row?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();
        let input_error = |message: String| MetaError::InputError { line, message };

        if row.len() < 3 {
            return Err(input_error(format!(
                "expected id|ra|dec, found {} column(s)",
                row.len()
            )));
        }

        let coordinate = |index: usize, name: &str| -> Result<f64> {
            row[index]
                .parse::<f64>()
                .map_err(|_| input_error(format!("{} is not a number: {:?}", name, &row[index])))
        };

        let target = Target {
            catalog_id: TargetId::new(&row[0]),
            right_ascension: coordinate(1, "ra")?,
            declination: coordinate(2, "dec")?,
        };
        target.validate().map_err(|e| input_error(e.to_string()))?;
        targets.push(target);
    }

    tracing::debug!("Read {} targets", targets.len());
    Ok(targets)
}

pub fn read_targets_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Target>> {
    let file = std::fs::File::open(path.as_ref())?;
    read_targets(std::io::BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_first_three_columns_in_order() {
        let input = "627436|73.047325|-25.19406|extra|columns\n\
                     29857|  12.5 |+7.25\n\
                     TOI-700|97.0965|-65.5786\n";
        let targets = read_targets(input.as_bytes()).unwrap();

        assert_eq!(targets.len(), 3);
        assert_eq!(targets[0], Target::new(627436u64, 73.047325, -25.19406));
        assert_eq!(targets[1].catalog_id.as_str(), "29857");
        assert_eq!(targets[1].right_ascension, 12.5);
        assert_eq!(targets[1].declination, 7.25);
        assert_eq!(targets[2].catalog_id.as_str(), "TOI-700");
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let input = "1|10|10\n\n2|20|20\n";
        assert_eq!(read_targets(input.as_bytes()).unwrap().len(), 2);
    }

    #[test]
    fn test_short_line_reports_line_number() {
        let input = "1|10|10\n2|20\n";
        match read_targets(input.as_bytes()) {
            Err(MetaError::InputError { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected InputError, got {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_and_out_of_range_coordinates() {
        assert!(matches!(
            read_targets("1|ten|10\n".as_bytes()),
            Err(MetaError::InputError { .. })
        ));
        assert!(matches!(
            read_targets("1|10|95\n".as_bytes()),
            Err(MetaError::InputError { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            read_targets_from_path("/nonexistent/targets.psv"),
            Err(MetaError::IoError(_))
        ));
    }
}
