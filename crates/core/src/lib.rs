//! Core types and shared functionality for wayback-rewind.
//!
//! This crate provides:
//! - The snapshot data model and archive URL conventions
//! - An in-process TTL result cache
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod snapshot;

pub use cache::{CacheStats, ResultCache};
pub use config::{AppConfig, ConfigError, TransportMode};
pub use error::Error;
pub use snapshot::{ArchiveRoot, Collapse, RenderMode, Snapshot, SortOrder, Timestamp};
