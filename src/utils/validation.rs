use crate::utils::error::{MetaError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(MetaError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(MetaError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(MetaError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(MetaError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(MetaError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(MetaError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_positive(field_name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(MetaError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value must be a finite number greater than 0".to_string(),
        });
    }
    Ok(())
}

/// Inclusive range check; pass `max_inclusive = false` for half-open ranges such as RA.
pub fn validate_range(
    field_name: &str,
    value: f64,
    min: f64,
    max: f64,
    max_inclusive: bool,
) -> Result<()> {
    let above = if max_inclusive { value > max } else { value >= max };
    if !value.is_finite() || value < min || above {
        let close = if max_inclusive { ']' } else { ')' };
        return Err(MetaError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be within [{}, {}{}", min, max, close),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("catalog.endpoint", "https://vizier.cds.unistra.fr").is_ok());
        assert!(validate_url("catalog.endpoint", "http://localhost:8080").is_ok());
        assert!(validate_url("catalog.endpoint", "").is_err());
        assert!(validate_url("catalog.endpoint", "vizier").is_err());
        assert!(validate_url("catalog.endpoint", "ftp://vizier.cds.unistra.fr").is_err());
    }

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive("catalog.radius_arcsec", 120.0).is_ok());
        assert!(validate_positive("catalog.radius_arcsec", 0.0).is_err());
        assert!(validate_positive("catalog.radius_arcsec", f64::NAN).is_err());
    }

    #[test]
    fn test_validate_range_half_open() {
        assert!(validate_range("ra", 0.0, 0.0, 360.0, false).is_ok());
        assert!(validate_range("ra", 359.99, 0.0, 360.0, false).is_ok());
        assert!(validate_range("ra", 360.0, 0.0, 360.0, false).is_err());
        assert!(validate_range("dec", 90.0, -90.0, 90.0, true).is_ok());
        assert!(validate_range("dec", -90.5, -90.0, 90.0, true).is_err());
    }
}
