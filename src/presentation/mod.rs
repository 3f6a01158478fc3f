//! Presentation layer
//!
//! Command-line interface and user-facing output.

pub mod cli;
