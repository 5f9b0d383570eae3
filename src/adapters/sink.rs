use crate::domain::model::TargetId;
use crate::utils::error::Result;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// The two correlated outputs of a batch. Every append writes one entry to each
/// stream, so position *k* in both refers to the same target.
///
/// The text block is written before the CSV line. If a write fails partway, the
/// text stream may hold one block more than the CSV has lines, never fewer, so
/// the CSV line count is always a safe `--skip` for resuming.
pub struct DualStreamSink<C: Write, T: Write> {
    csv: C,
    text: T,
    id_label: Option<String>,
}

impl<C: Write, T: Write> DualStreamSink<C, T> {
    pub fn new(csv: C, text: T) -> Self {
        Self {
            csv,
            text,
            id_label: None,
        }
    }

    pub fn with_id_label(mut self, label: Option<String>) -> Self {
        self.id_label = label.filter(|l| !l.trim().is_empty());
        self
    }

    pub fn section_header(&self, target_id: &TargetId) -> String {
        match &self.id_label {
            Some(label) => format!("\n------ {} {}\n", label, target_id),
            None => format!("\n------ {}\n", target_id),
        }
    }

    /// `line` is a structured line without terminator; `raw_text` may be empty.
    pub fn append(&mut self, target_id: &TargetId, line: &str, raw_text: &str) -> Result<()> {
        let mut block = self.section_header(target_id);
        block.push_str(raw_text);
        let mut csv_line = String::with_capacity(line.len() + 1);
        csv_line.push_str(line);
        csv_line.push('\n');

        self.text.write_all(block.as_bytes())?;
        self.csv.write_all(csv_line.as_bytes())?;
        Ok(())
    }

    /// Text first, for the same reason as in [`DualStreamSink::append`].
    pub fn flush(&mut self) -> Result<()> {
        self.text.flush()?;
        self.csv.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> (C, T) {
        (self.csv, self.text)
    }
}

pub type FileSink = DualStreamSink<BufWriter<File>, BufWriter<File>>;

fn open_output(path: &Path, append: bool) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)?;
    Ok(BufWriter::new(file))
}

/// Opens both output files, truncating them unless `append` is set.
pub fn open_file_sink<P: AsRef<Path>>(csv_path: P, text_path: P, append: bool) -> Result<FileSink> {
    let csv = open_output(csv_path.as_ref(), append)?;
    let text = open_output(text_path.as_ref(), append)?;
    tracing::debug!(
        "Opened outputs {} and {} (append: {})",
        csv_path.as_ref().display(),
        text_path.as_ref().display(),
        append
    );
    Ok(DualStreamSink::new(csv, text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_append_writes_both_streams() {
        let mut sink = DualStreamSink::new(Vec::new(), Vec::new());
        sink.append(&TargetId::from(1u64), "1|a", "OID\n7\n").unwrap();
        sink.append(&TargetId::from(2u64), "2|", "").unwrap();

        let (csv, text) = sink.into_inner();
        assert_eq!(String::from_utf8(csv).unwrap(), "1|a\n2|\n");
        assert_eq!(
            String::from_utf8(text).unwrap(),
            "\n------ 1\nOID\n7\n\n------ 2\n"
        );
    }

    /// Accepts `budget` bytes, then fails every write.
    struct FullDisk {
        written: Vec<u8>,
        budget: usize,
    }

    impl Write for FullDisk {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if self.written.len() + buf.len() > self.budget {
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "no space left"));
            }
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_text_write_leaves_csv_untouched() {
        let text = FullDisk {
            written: Vec::new(),
            budget: 0,
        };
        let mut sink = DualStreamSink::new(Vec::new(), text);

        assert!(sink.append(&TargetId::from(1u64), "1||||||||||", "OID\n7\n").is_err());

        let (csv, text) = sink.into_inner();
        assert!(csv.is_empty());
        assert!(text.written.is_empty());
    }

    #[test]
    fn test_csv_line_count_never_exceeds_text_blocks() {
        let text = FullDisk {
            written: Vec::new(),
            budget: "\n------ 1\nOID\n7\n".len(),
        };
        let mut sink = DualStreamSink::new(Vec::new(), text);

        sink.append(&TargetId::from(1u64), "1|7", "OID\n7\n").unwrap();
        assert!(sink.append(&TargetId::from(2u64), "2|8", "OID\n8\n").is_err());

        let (csv, text) = sink.into_inner();
        assert_eq!(String::from_utf8(csv).unwrap(), "1|7\n");
        assert_eq!(String::from_utf8(text.written).unwrap(), "\n------ 1\nOID\n7\n");
    }

    #[test]
    fn test_id_label_in_header() {
        let sink = DualStreamSink::new(Vec::new(), Vec::new()).with_id_label(Some("TIC".to_string()));
        assert_eq!(sink.section_header(&TargetId::from(627436u64)), "\n------ TIC 627436\n");

        let blank = DualStreamSink::new(Vec::new(), Vec::new()).with_id_label(Some(" ".to_string()));
        assert_eq!(blank.section_header(&TargetId::from(5u64)), "\n------ 5\n");
    }

    #[test]
    fn test_file_sink_truncates_or_appends() {
        let dir = TempDir::new().unwrap();
        let csv_path = dir.path().join("nested/meta.csv");
        let text_path = dir.path().join("nested/raw.txt");

        let mut sink = open_file_sink(&csv_path, &text_path, false).unwrap();
        sink.append(&TargetId::from(1u64), "1", "").unwrap();
        sink.flush().unwrap();
        drop(sink);

        let mut sink = open_file_sink(&csv_path, &text_path, true).unwrap();
        sink.append(&TargetId::from(2u64), "2", "").unwrap();
        sink.flush().unwrap();
        drop(sink);
        assert_eq!(std::fs::read_to_string(&csv_path).unwrap(), "1\n2\n");

        let mut sink = open_file_sink(&csv_path, &text_path, false).unwrap();
        sink.append(&TargetId::from(3u64), "3", "").unwrap();
        sink.flush().unwrap();
        drop(sink);
        assert_eq!(std::fs::read_to_string(&csv_path).unwrap(), "3\n");
        assert_eq!(std::fs::read_to_string(&text_path).unwrap(), "\n------ 3\n");
    }
}
