//! PawTrack - GPS activity tracking and health-scoring engine for fostered pets
//!
//! PawTrack turns a stream of raw position samples into movement metrics and
//! a derived health assessment, and periodically snapshots them as tracking
//! records for an external store: position sample → activity update →
//! metrics → (every 30 s) tracking record → sink.
//!
//! ## Modules
//!
//! - **Activity tracking**: incremental distance/speed/active-time metrics
//! - **Health scoring**: weighted heuristic mapping metrics to a label
//! - **Sessions**: owned start/stop lifecycle around a position watch and the
//!   emission timer
//! - **Replay**: batch-mode processing of recorded sample sequences

pub mod activity;
pub mod emitter;
pub mod encoder;
pub mod error;
pub mod geo;
pub mod health;
pub mod replay;
pub mod session;
pub mod source;
pub mod types;

// C interop surface, compiled into the cdylib/staticlib artifacts
pub mod ffi;

pub use activity::{ActivityTracker, TimeAttribution};
pub use emitter::{MemorySink, RecordEmitter, TrackingSink};
pub use encoder::RecordEncoder;
pub use error::{PositionErrorKind, SinkError, TrackError};
pub use health::{activity_level, derive_health_label};
pub use replay::{replay, ReplayConfig, ReplayOutput};
pub use session::{SessionConfig, SessionHandle};
pub use source::{channel_source, ChannelSource, PositionFeed, PositionSource};
pub use types::{
    ActivityLevel, ActivityMetrics, HealthLabel, PositionFix, PositionSample, RecordSource,
    SessionSummary, TrackingMethod, TrackingRecord,
};

/// PawTrack version embedded in CLI and FFI surfaces
pub const PAWTRACK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name reported by CLI and FFI surfaces
pub const PRODUCER_NAME: &str = "pawtrack";
