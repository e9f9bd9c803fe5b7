//! Geometry utilities for mesh-curve.
//!
//! This module provides the size fields and the straight-sided element
//! quality measure composed by the curved quality oracle.

pub mod quality;

pub use quality::{MetricSize, SizeField, UniformSize, measure_element_quality};
