/// Result type alias for the rule model
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the rule model
#[derive(Debug)]
pub enum Error {
    IoError(std::io::Error),
    InvalidArgument(String),
    UnknownDiscriminant { kind: &'static str, value: String },
    SerializationError(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::IoError(e) => write!(f, "IO error: {}", e),
            Error::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            Error::UnknownDiscriminant { kind, value } => {
                write!(f, "unknown {} type: '{}'", kind, value)
            }
            Error::SerializationError(msg) => write!(f, "serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(format!("JSON: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::SerializationError(format!("YAML: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_unknown_discriminant() {
        let err = Error::UnknownDiscriminant {
            kind: "condition",
            value: "bogus".to_string(),
        };
        assert_eq!(err.to_string(), "unknown condition type: 'bogus'");
    }

    #[test]
    fn test_io_error_has_source() {
        use std::error::Error as _;

        let err: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(err.source().is_some());
        assert!(Error::InvalidArgument("x".to_string()).source().is_none());
    }
}
