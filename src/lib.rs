//! basin_connectivity: river basin stream network model and queries.
//!
//! # Module structure
//!
//! ```text
//! basin_connectivity
//! ├── error       — StreamError, NetworkError, QueryError, ConfigError
//! ├── config      — basin definition loader (basin.toml)
//! ├── stream
//! │   ├── node     — StreamNode: stream, station, bank
//! │   ├── location — StreamLocation + StreamLocationBuilder
//! │   ├── reach    — StreamReach between two locations
//! │   └── builder  — staged StreamBuilder (junctions as complete triples)
//! └── network
//!     ├── validate — resolution checks (dangling, cycles, tributaries, …)
//!     ├── distance — cumulative distance to the network outlet
//!     ├── upstream — upstream closure of a location
//!     └── drainage — aggregate drainage area
//! ```

/// Public modules
pub mod config;
pub mod error;
pub mod network;
pub mod stream;

pub use error::{ConfigError, NetworkError, QueryError, StreamError};
pub use network::{BasinNetwork, UpstreamEntry, resolve, resolve_by_office};
pub use stream::{Bank, CwmsId, Stream, StreamBuilder, StreamLocation, StreamNode, StreamReach};
