//! Terminal helpers for the imgkit command line
//!
//! - Status lines and headers
//! - Human-readable sizes and dimensions
//! - Spinners for slow operations

#![warn(missing_docs)]

pub mod output;
pub mod progress;
