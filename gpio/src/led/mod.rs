//! Segment LED display drivers.

pub mod pt6961;
