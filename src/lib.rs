// src/lib.rs
//
// Per-frame lane corridor estimation for road video.
//
// Given one decoded frame, the pipeline produces a single-channel mask
// delineating the drivable lane ahead. It is a best-effort heuristic
// estimator: every geometric stage degrades to "absent" rather than
// erroring, and absence is resolved by temporal memory, then a
// single-lane geometric fallback, then a final "no mask".
//
// Video decoding, dataset assembly and orchestration live outside this
// crate; callers feed decoded BGR frames and persist the masks.

pub mod classify;
pub mod config;
pub mod curve;
pub mod enhance;
pub mod fallback;
pub mod fit;
pub mod pipeline;
pub mod roi;
pub mod smoother;
pub mod types;
pub mod vanishing;
pub mod vision;

pub use config::DetectionConfig;
pub use pipeline::{LanePipeline, MaskOptions};
pub use smoother::TemporalSmoother;
pub use types::{CurveDirection, CurveInfo, LaneLine, Segment, VanishingPoint};
