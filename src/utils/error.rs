use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetaError {
    #[error("Catalog request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Catalog service returned HTTP {status}: {message}")]
    ServiceError { status: u16, message: String },

    #[error("Unexpected catalog response: {message}")]
    ResponseFormatError { message: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Input error at line {line}: {message}")]
    InputError { line: u64, message: String },

    #[error("Malformed catalog row for {object_id}: {message}")]
    MalformedRow { object_id: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Service,
    Data,
    Io,
    Configuration,
}

impl MetaError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            MetaError::ApiError(_) => ErrorCategory::Network,
            MetaError::ServiceError { .. } => ErrorCategory::Service,
            // Includes errors VizieR reports in the body, e.g. an unknown catalog.
            MetaError::ResponseFormatError { .. }
            | MetaError::CsvError(_)
            | MetaError::SerializationError(_)
            | MetaError::InputError { .. }
            | MetaError::MalformedRow { .. } => ErrorCategory::Data,
            MetaError::IoError(_) => ErrorCategory::Io,
            MetaError::ConfigError { .. } | MetaError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
        }
    }

    /// Faults raised while talking to the remote catalog. These are the only
    /// errors a batch may skip past; everything else stops the run.
    pub fn is_service_fault(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Network | ErrorCategory::Service
        )
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            MetaError::ApiError(e) if e.is_timeout() => {
                "The catalog service did not answer in time".to_string()
            }
            MetaError::ApiError(_) => "Could not reach the catalog service".to_string(),
            MetaError::ServiceError { status, .. } => {
                format!("The catalog service rejected the query (HTTP {})", status)
            }
            MetaError::ResponseFormatError { .. } => {
                "The catalog service answered with an unreadable table".to_string()
            }
            MetaError::InputError { line, .. } => {
                format!("The target list has an invalid entry on line {}", line)
            }
            MetaError::ConfigError { .. } | MetaError::InvalidConfigValueError { .. } => {
                format!("Configuration problem: {}", self)
            }
            _ => self.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        if let MetaError::ResponseFormatError { .. } = self {
            return "Check catalog.catalog_name and catalog.endpoint in the configuration";
        }
        match self.category() {
            ErrorCategory::Network => {
                "Check network connectivity, then resume with --append --skip <N>"
            }
            ErrorCategory::Service => {
                "Check the catalog endpoint and name, or retry later with --append --skip <N>"
            }
            ErrorCategory::Data => "Check the input table: id|ra|dec per line, degrees",
            ErrorCategory::Io => "Check that the output directory exists and is writable",
            ErrorCategory::Configuration => "Check the TOML configuration and CLI flags",
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Configuration => 1,
            ErrorCategory::Network | ErrorCategory::Service => 2,
            ErrorCategory::Data => 3,
            ErrorCategory::Io => 4,
        }
    }
}

pub type Result<T> = std::result::Result<T, MetaError>;
