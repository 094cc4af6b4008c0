//! The recording client consumed by the traffic generator.
//!
//! The client performs the actual store operations and is responsible for
//! logging every attempt and outcome for later history analysis; this crate
//! only drives it.

/// Errors returned by store operations.
///
/// These are per-cycle, recoverable failures: the run loop retries a failed
/// read and moves past a failed write. They are never propagated out of
/// [`TrafficGenerator::run`](crate::TrafficGenerator::run).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The operation did not complete within its local time bound.
    #[error("{operation} timed out")]
    Timeout {
        /// Which operation timed out.
        operation: &'static str,
    },

    /// The store rejected or could not serve the operation.
    #[error("store unavailable: {message}")]
    Unavailable {
        /// Description of the failure.
        message: String,
    },

    /// The parent cancellation signal fired while the operation or its
    /// pacing wait was in flight. Normal termination, not a store fault.
    #[error("operation cancelled")]
    Cancelled,
}

/// A store client bound to one simulated client identity.
///
/// One traffic generator instance owns its client exclusively for the
/// lifetime of a run. Implementations must record attempted and completed
/// operations themselves; the generator never inspects results beyond
/// success or failure.
#[allow(async_fn_in_trait)]
pub trait RecordingClient {
    /// The integer identity used to derive this client's identifier window.
    fn identity(&self) -> u64;

    /// Reads the current value of `key`.
    async fn get(&self, key: &str) -> Result<(), StoreError>;

    /// Writes `value` to `key`.
    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Timeout { operation: "get" };
        assert_eq!(format!("{err}"), "get timed out");

        let err = StoreError::Unavailable {
            message: "leader lost".to_string(),
        };
        assert_eq!(format!("{err}"), "store unavailable: leader lost");

        let err = StoreError::Cancelled;
        assert_eq!(format!("{err}"), "operation cancelled");
    }
}
