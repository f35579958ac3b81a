use thiserror::Error;

/// Errors surfaced by the dealer client and persistence layer.
#[derive(Debug, Error)]
pub enum QjackError {
    #[error("failed to connect to dealer after {attempts} attempts: {last_cause}")]
    Connect {
        attempts: u32,
        #[source]
        last_cause: std::io::Error,
    },

    #[error("dealer protocol error: {0}")]
    Protocol(String),

    #[error("I/O error talking to dealer: {0}")]
    Io(#[from] std::io::Error),
}
