//! Menu intake service and redline tooling.

pub mod config;
pub mod document;
pub mod error;
pub mod intake;
pub mod redline;
