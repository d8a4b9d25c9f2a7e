//! In-memory caching of remote telemetry

mod telemetry;
mod ttl;

pub use telemetry::{CacheTtls, Resource, Snapshot, TelemetryCache};
pub use ttl::{CacheEntry, CacheStats, Lookup, TtlCache};
