//! # Taichi-Core
//!
//! Core types and utilities for assessing Tai Chi form from body landmark
//! sequences produced by an external pose detector.
//!
//! Landmarks follow the 33-point body model; coordinates are normalized to
//! the image, with `y` growing downwards.

pub mod error;
pub mod filtering;
pub mod geometry;
pub mod kinematics;
pub mod stats;
pub mod types;

pub use error::{Error, ErrorResponse, Result};
pub use filtering::*;
pub use geometry::*;
pub use kinematics::*;
pub use types::*;
