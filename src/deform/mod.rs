//! Geometry mutation and its animation.
//!
//! [`GeometryBuffer`] owns vertex data and knows how to stretch itself along
//! an axis without compounding error. [`Deformer`] schedules those stretches
//! over time, reading time from a [`Clock`].

pub mod buffer;
pub mod clock;
pub mod deformer;

pub use buffer::{Axis, GeometryBuffer};
pub use clock::{Clock, FrameScheduler, ManualClock, ManualScheduler, SystemClock};
pub use deformer::{DeformState, DeformationSession, Deformer};
