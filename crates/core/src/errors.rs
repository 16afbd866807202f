use thiserror::Error;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Write(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum PricingError {
    #[error("failed to decode input as PricingInput json: {0}")]
    MalformedInput(#[source] serde_json::Error),
    #[error("failed to encode output as Ask json: {source}")]
    EncodingFailure {
        #[source]
        source: EncodeError,
        /// Human-readable rendering of the ask that could not be written.
        rendered: String,
    },
}

impl PricingError {
    pub fn class(&self) -> &'static str {
        match self {
            Self::MalformedInput(_) => "malformed_input",
            Self::EncodingFailure { .. } => "encoding_failure",
        }
    }

    /// Message for the diagnostic stream. Encoding failures also carry the
    /// value that failed so it can be inspected offline.
    pub fn diagnostic(&self) -> String {
        match self {
            Self::MalformedInput(_) => self.to_string(),
            Self::EncodingFailure { rendered, .. } => {
                format!("{self}\ncomputed Ask was: {rendered}")
            }
        }
    }
}
