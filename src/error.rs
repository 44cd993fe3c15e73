use thiserror::Error;

/// Errors raised by the geometric core
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Polygon is not convex")]
    NonConvexPolygon,

    #[error("Indeterminate Euler pole: {0}")]
    IndeterminatePole(String),

    #[error("Bearing is undefined between coincident or antipodal points")]
    DegenerateBearing,
}

impl GeoError {
    /// Prefix the message with a 1-based source line number
    pub(crate) fn at_line(self, line: usize) -> GeoError {
        match self {
            GeoError::InvalidInput(msg) => GeoError::InvalidInput(format!("line {}: {}", line, msg)),
            other => GeoError::InvalidInput(format!("line {}: {}", line, other)),
        }
    }
}

/// Result type for geoshift operations
pub type Result<T> = std::result::Result<T, GeoError>;

/// Reject NaN and infinities at the API boundary
pub(crate) fn ensure_finite(value: f64, what: &str) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(GeoError::InvalidInput(format!(
            "{} must be a finite number, got {}",
            what, value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_finite() {
        assert_eq!(ensure_finite(1.5, "angle"), Ok(1.5));
        assert!(matches!(
            ensure_finite(f64::NAN, "angle"),
            Err(GeoError::InvalidInput(_))
        ));
        assert!(ensure_finite(f64::INFINITY, "distance").is_err());
    }

    #[test]
    fn test_at_line() {
        let err = GeoError::InvalidInput("steps must be between 1 and 50, got 99".to_string());
        assert_eq!(
            err.at_line(3).to_string(),
            "Invalid input: line 3: steps must be between 1 and 50, got 99"
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(GeoError::NonConvexPolygon.to_string(), "Polygon is not convex");
        let err = GeoError::IndeterminatePole("bisectors coincide".to_string());
        assert_eq!(
            err.to_string(),
            "Indeterminate Euler pole: bisectors coincide"
        );
    }
}
