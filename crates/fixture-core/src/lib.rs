//! Backend-neutral building blocks for db43.
//!
//! This crate defines the contract every backend adapter implements and the
//! shared machinery the adapters are built from:
//!
//! - [`Adapter`] - the truncate/load/release contract
//! - [`FixtureError`] - error kinds shared by all adapters
//! - [`windows`] - splits writes into request-sized batches
//! - [`join_all_settled`] - wait-for-all fan-out with error aggregation
//! - [`TableMetaCache`] - lazily discovered, memoized per-table metadata
//! - [`FixtureResolver`] - priority-ordered fixture file lookup
//!
//! # Architecture
//!
//! ```text
//! fixture-core (this crate)
//!    │
//!    ├─── db43-dynamodb   (key-value adapter, uses dynamodb-types)
//!    ├─── db43-mysql      (relational adapter)
//!    │
//!    └─── db43            (Session orchestrator + CLI)
//! ```

mod adapter;
mod error;
mod fanout;
pub mod fixture;
pub mod meta;
mod window;

pub use adapter::Adapter;
pub use error::{BoxError, FixtureError, Operation, Result};
pub use fanout::join_all_settled;
pub use fixture::{
    ensure_folder, read_records, read_script, FixtureCandidate, FixtureFile, FixtureKind,
    FixtureResolver, Record,
};
pub use meta::{TableMetaCache, TableMetaMap};
pub use window::{clamp_window_size, windows, MAX_WINDOW_SIZE};
