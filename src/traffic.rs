//! The read/write traffic loop.
//!
//! A [`TrafficGenerator`] drives an unbounded sequence of read-then-write
//! cycles against a single key until cancelled, pacing both operations
//! through a shared rate limiter and tagging every write with the next
//! identifier from the instance's window.

use std::ops::Range;
use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::client::{RecordingClient, StoreError};
use crate::limiter::RateLimiter;
use crate::mix::{OperationKind, WriteMix};

/// Size of the identifier window reserved for each client identity.
pub const MAX_OPS_PER_CLIENT: u64 = 1_000_000;

/// Local time bound for a single store operation.
const OP_TIMEOUT: Duration = Duration::from_millis(20);

/// Returns the contiguous range of write identifiers reserved for `identity`.
///
/// Windows of distinct identities never overlap; the partition is pure
/// arithmetic, no coordination between instances is needed. Arithmetic
/// saturates at `u64::MAX` rather than wrapping.
#[must_use]
pub const fn identifier_window(identity: u64) -> Range<u64> {
    let start = MAX_OPS_PER_CLIENT.saturating_mul(identity);
    let end = start.saturating_add(MAX_OPS_PER_CLIENT);
    start..end
}

/// Configuration for a traffic generator.
#[derive(Debug, Clone)]
pub struct TrafficConfig {
    /// The single key all operations target.
    pub key: String,
    /// Weighted set of write operation kinds.
    pub mix: WriteMix<OperationKind>,
    /// Seed for the per-instance random source.
    pub seed: u64,
}

impl Default for TrafficConfig {
    /// The default traffic: key `"key"`, `Put` at weight 100, seed 0.
    fn default() -> Self {
        Self {
            key: "key".to_string(),
            mix: WriteMix::default(),
            seed: 0,
        }
    }
}

/// Builder for [`TrafficGenerator`].
#[derive(Debug, Default)]
pub struct TrafficBuilder {
    config: TrafficConfig,
}

impl TrafficBuilder {
    /// Creates a builder with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the target key.
    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.config.key = key.into();
        self
    }

    /// Sets the write mix.
    #[must_use]
    pub fn mix(mut self, mix: WriteMix<OperationKind>) -> Self {
        self.config.mix = mix;
        self
    }

    /// Sets the random seed.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Builds the generator.
    #[must_use]
    pub fn build(self) -> TrafficGenerator {
        TrafficGenerator::new(self.config)
    }
}

/// Drives read/write traffic against one key at a controlled pace.
#[derive(Debug)]
pub struct TrafficGenerator {
    key: String,
    mix: WriteMix<OperationKind>,
    rng: ChaCha8Rng,
}

impl TrafficGenerator {
    /// Creates a generator from configuration.
    ///
    /// The mix was already validated when it was constructed, so this never
    /// fails.
    #[must_use]
    pub fn new(config: TrafficConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self {
            key: config.key,
            mix: config.mix,
            rng,
        }
    }

    /// Creates a builder.
    #[must_use]
    pub fn builder() -> TrafficBuilder {
        TrafficBuilder::new()
    }

    /// Returns the target key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the configured write mix.
    #[must_use]
    pub const fn mix(&self) -> &WriteMix<OperationKind> {
        &self.mix
    }

    /// Runs read-then-write cycles until cancelled or the identifier window
    /// is exhausted.
    ///
    /// Each cycle issues one read; only if it succeeds is one write issued
    /// with the next identifier. The identifier advances by exactly 1 per
    /// write attempt whether or not the write succeeded, so the expected
    /// sequence in recorded history is never ambiguous. Individual operation
    /// outcomes are observable only through the client's own log.
    pub async fn run<C, L>(&mut self, cancel: CancellationToken, client: &C, limiter: &L)
    where
        C: RecordingClient,
        L: RateLimiter,
    {
        let window = identifier_window(client.identity());
        debug!(
            identity = client.identity(),
            start = window.start,
            end = window.end,
            key = %self.key,
            "traffic run starting"
        );

        let mut write_id = window.start;
        while write_id < window.end {
            if cancel.is_cancelled() {
                debug!(next_id = write_id, "traffic run cancelled");
                return;
            }

            // One read per write keeps the number of failed writes in the
            // recorded history bounded while the store is unavailable. A
            // failed read is retried immediately; the 20ms operation timeout
            // is the only pacing on that path.
            if let Err(err) = self.read(&cancel, client, limiter).await {
                debug!(error = %err, "read failed");
                continue;
            }

            if let Err(err) = self.write(&cancel, client, limiter, write_id).await {
                debug!(error = %err, id = write_id, "write failed");
            }
            // A failed write still consumes its identifier.
            write_id += 1;
        }

        debug!(end = window.end, "identifier window exhausted");
    }

    /// Issues one bounded read, then waits for the limiter on success.
    async fn read<C, L>(
        &self,
        cancel: &CancellationToken,
        client: &C,
        limiter: &L,
    ) -> Result<(), StoreError>
    where
        C: RecordingClient,
        L: RateLimiter,
    {
        let result = tokio::select! {
            () = cancel.cancelled() => Err(StoreError::Cancelled),
            res = timeout(OP_TIMEOUT, client.get(&self.key)) => match res {
                Ok(inner) => inner,
                Err(_) => Err(StoreError::Timeout { operation: "get" }),
            },
        };
        result?;

        pace(cancel, limiter).await
    }

    /// Issues one bounded write of `id`, then waits for the limiter on
    /// success.
    async fn write<C, L>(
        &mut self,
        cancel: &CancellationToken,
        client: &C,
        limiter: &L,
        id: u64,
    ) -> Result<(), StoreError>
    where
        C: RecordingClient,
        L: RateLimiter,
    {
        let value = id.to_string();
        let result = match self.mix.pick(&mut self.rng) {
            OperationKind::Put => tokio::select! {
                () = cancel.cancelled() => Err(StoreError::Cancelled),
                res = timeout(OP_TIMEOUT, client.put(&self.key, &value)) => match res {
                    Ok(inner) => inner,
                    Err(_) => Err(StoreError::Timeout { operation: "put" }),
                },
            },
        };
        result?;

        pace(cancel, limiter).await
    }
}

/// Waits for the rate limiter, returning early if cancellation fires.
async fn pace<L>(cancel: &CancellationToken, limiter: &L) -> Result<(), StoreError>
where
    L: RateLimiter,
{
    tokio::select! {
        () = cancel.cancelled() => Err(StoreError::Cancelled),
        () = limiter.acquire() => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_starts_at_partition_boundary() {
        assert_eq!(identifier_window(0), 0..MAX_OPS_PER_CLIENT);
        assert_eq!(
            identifier_window(3),
            3 * MAX_OPS_PER_CLIENT..4 * MAX_OPS_PER_CLIENT
        );
    }

    #[test]
    fn test_windows_never_overlap() {
        for c1 in 0..50u64 {
            for c2 in 0..50u64 {
                if c1 == c2 {
                    continue;
                }
                let w1 = identifier_window(c1);
                let w2 = identifier_window(c2);
                assert!(
                    w1.end <= w2.start || w2.end <= w1.start,
                    "windows for {c1} and {c2} overlap"
                );
            }
        }
    }

    #[test]
    fn test_adjacent_windows_are_contiguous() {
        for c in 0..10u64 {
            assert_eq!(identifier_window(c).end, identifier_window(c + 1).start);
        }
    }

    #[test]
    fn test_window_saturates_instead_of_wrapping() {
        let window = identifier_window(u64::MAX);
        assert_eq!(window.start, u64::MAX);
        assert_eq!(window.end, u64::MAX);
        assert!(window.is_empty());
    }

    #[test]
    fn test_default_config() {
        let config = TrafficConfig::default();
        assert_eq!(config.key, "key");
        assert_eq!(config.seed, 0);
        assert_eq!(config.mix.entries(), &[(OperationKind::Put, 100)]);
    }

    #[test]
    fn test_builder_overrides() {
        let mix = WriteMix::new(vec![(OperationKind::Put, 1)]).unwrap();
        let traffic = TrafficGenerator::builder()
            .key("other")
            .mix(mix)
            .seed(99)
            .build();

        assert_eq!(traffic.key(), "other");
        assert_eq!(traffic.mix().weight_sum(), 1);
    }
}
