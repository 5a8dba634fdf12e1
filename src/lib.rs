//! # mtg-turtle
//!
//! Geometric interpretation of multiscale tree graphs (MTG) describing plants.
//!
//! A turtle walks each plant from its base, accumulating position and orientation.
//! Every organ element it meets (stem internode pieces, leaf blade segments) gets a
//! procedurally shaped mesh placed at the turtle frame, so the resulting graph
//! carries world-space geometry ready for rendering or area measurements.

pub mod interpreter;
pub mod mesh;
pub mod mtg;
pub mod organ;
pub mod turtle;

pub use interpreter::*;
pub use mesh::*;
pub use mtg::*;
pub use organ::*;
pub use turtle::*;
