use thiserror::Error;

#[derive(Debug, Error)]
pub enum GestureError {
    #[error("history depth {depth} is shallower than the longest pattern ({min})")]
    InvalidDepth { depth: usize, min: usize },

    #[error("invalid timing: {0}")]
    InvalidTiming(String),

    #[error("malformed observation on line {line}: {source}")]
    MalformedObservation {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read observations: {0}")]
    Io(#[from] std::io::Error),
}
