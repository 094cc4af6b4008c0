//! The rate limiter consumed by the traffic generator.

/// Token-based pacing shared across concurrent traffic generator instances.
///
/// The limiter is the sole coordination point between instances and must be
/// safe for concurrent use. The generator consults it after every successful
/// operation, racing the wait against its cancellation signal, so
/// implementations only need to block until the next token is available.
#[allow(async_fn_in_trait)]
pub trait RateLimiter: Sync {
    /// Blocks until the next operation is admitted.
    async fn acquire(&self);
}
