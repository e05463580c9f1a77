//! Client code for wayback-rewind.
//!
//! This crate provides the outbound side of the system: URL normalization,
//! the snapshot index client with its retry and deadline policy, result
//! deduplication, and the insight generator gateway.

pub mod insight;
pub mod normalize;
pub mod transport;
pub mod wayback;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use insight::{
    ComparisonAnalysis, ComparisonRequest, InsightConfig, InsightError, InsightGateway, InsightOutcome, InsightSource,
    TimelineRequest,
};
pub use normalize::normalize;
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};
pub use wayback::{IndexClient, IndexConfig, IndexError, SnapshotBatch, SnapshotListing, SnapshotQuery, SnapshotService};
