//! Turn telemetry.
//!
//! # SAFETY INVARIANT
//! Telemetry is a read-only side-effect layer. Nothing in classification,
//! policy or execution may read it back.
//!
//! # PRIVACY INVARIANT
//! Events never carry user content: no transcripts, slot values, URLs or
//! embeddings. Only enums, counts and durations.

pub mod event;
pub mod metrics;
pub mod recorder;

pub use event::TelemetryEvent;
pub use metrics::TelemetrySnapshot;
pub use recorder::TelemetryRecorder;
