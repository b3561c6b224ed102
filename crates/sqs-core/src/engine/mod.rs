//! # Engine Module
//!
//! Run-level state for the conversion workflows.
//!
//! - **Configuration** ([`config`]) - conversion settings and their builder
//! - **Run Context** ([`context`]) - output directory and record counter of a run
//! - **Progress Monitoring** ([`progress`]) - callbacks for user feedback
//! - **Error Handling** ([`error`]) - failures tagged with the offending record

pub mod config;
pub mod context;
pub mod error;
pub mod progress;
