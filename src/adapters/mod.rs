// Adapters layer: the VizieR HTTP client, the target table reader and the output files.

pub mod sink;
pub mod targets;
pub mod vizier;

pub use sink::{open_file_sink, DualStreamSink, FileSink};
pub use targets::{read_targets, read_targets_from_path};
pub use vizier::VizierClient;
