//! Exchange error taxonomy.
//!
//! Distinguishes the phase that failed so the server can decide whether
//! the caller still gets an answer: a respond failure has nothing to
//! return, while retention and storage failures happen after the answer
//! already exists.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExchangeError {
    /// The responder agent failed; there is no answer to return.
    #[error("respond failed: {0}")]
    Respond(String),

    /// The analyze/confirm pass failed; the answer survives.
    #[error("retention pass failed: {0}")]
    Retention(String),

    /// The memory row could not be written.
    #[error("memory store failed: {0}")]
    Store(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn respond_error_display() {
        let e = ExchangeError::Respond("provider unreachable".into());
        assert!(e.to_string().contains("respond failed"));
        assert!(e.to_string().contains("provider unreachable"));
    }

    #[test]
    fn store_error_display() {
        let e = ExchangeError::Store("disk full".into());
        assert!(e.to_string().contains("disk full"));
    }
}
