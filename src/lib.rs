//! Weighted-random traffic driver for key-value stores under test.
//!
//! This crate generates a continuous stream of read/write operations against
//! a single key, pacing issuance through an external rate limiter and tagging
//! every write with a globally unique, monotonically increasing identifier.
//! The recorded operation log (kept by the caller's client) can then be
//! replayed through a history checker, e.g. for linearizability analysis.
//!
//! # Design
//!
//! Each [`TrafficGenerator`] instance drives one simulated client. Instances
//! are expected to run concurrently, one per client identity; identifier
//! windows derived from the identity keep their write payloads disjoint
//! without any coordination. Within one instance, reads and writes strictly
//! alternate: a write is only issued after a successful read, which bounds
//! the number of failed writes recorded while the store is unavailable.
//!
//! # Example
//!
//! ```ignore
//! use kv_traffic::{TrafficGenerator, WriteMix, OperationKind};
//! use tokio_util::sync::CancellationToken;
//!
//! let mix = WriteMix::new(vec![(OperationKind::Put, 100)])?;
//! let mut traffic = TrafficGenerator::builder()
//!     .key("key")
//!     .mix(mix)
//!     .seed(42)
//!     .build();
//!
//! let cancel = CancellationToken::new();
//! traffic.run(cancel.clone(), &client, &limiter).await;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod client;
mod limiter;
mod mix;
mod traffic;

pub use client::{RecordingClient, StoreError};
pub use limiter::RateLimiter;
pub use mix::{MixError, OperationKind, WriteMix};
pub use traffic::{
    identifier_window, TrafficBuilder, TrafficConfig, TrafficGenerator, MAX_OPS_PER_CLIENT,
};
