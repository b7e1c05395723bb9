//! Data module: vertex coordinate storage
#![warn(missing_docs)]

pub mod point_set;

pub use point_set::PointSet;
