//! Adapters for the inference ports
//!
//! - [`RemoteDetector`]: object detection served over HTTP
//!
//! The in-process [`crate::NullDetector`] and [`crate::SsimScorer`] live
//! next to their ports.

pub mod remote;

pub use remote::{RemoteDetector, RemoteDetectorConfig};
