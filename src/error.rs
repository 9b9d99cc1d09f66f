/// Errors that can occur while building or running the correction pipeline
#[derive(Debug, thiserror::Error)]
pub enum CorrectionError {
    #[error("empty input: received no text to correct")]
    EmptyInput,

    #[error("failed to load dictionary from {path}: {details}")]
    DictionaryLoad { path: String, details: String },

    #[error("failed to load word-frequency table from {path}: {details}")]
    FrequencyLoad { path: String, details: String },

    #[error("context model error: {details}")]
    Prediction { details: String },

    #[error("configuration error: {details}")]
    Config { details: String },

    #[error("HTTP error: {source}")]
    Http {
        #[from]
        source: reqwest::Error,
    },

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_display() {
        let error = CorrectionError::DictionaryLoad {
            path: "/test/words.txt".to_string(),
            details: "missing file".to_string(),
        };
        assert!(error.to_string().contains("failed to load dictionary"));
        assert!(error.to_string().contains("/test/words.txt"));
    }

    #[test]
    fn test_empty_input_message_is_descriptive() {
        let error = CorrectionError::EmptyInput;
        assert!(error.to_string().contains("empty input"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let correction_error = CorrectionError::from(io_error);

        match correction_error {
            CorrectionError::Io { .. } => {
                assert!(correction_error.to_string().contains("IO error"));
            }
            _ => panic!("Expected Io variant"),
        }
    }
}
