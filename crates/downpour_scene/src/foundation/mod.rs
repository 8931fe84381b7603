//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the scene layer:
//! - Math types, TRS transforms and visibility volumes
//! - Logging utilities

pub mod logging;
pub mod math;
