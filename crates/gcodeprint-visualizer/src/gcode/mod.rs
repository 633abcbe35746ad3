//! G-code motion commands
//!
//! This module provides:
//! - the normalized motion command model
//! - drawable-command filtering
//! - a line reader producing commands from program text

pub mod command;
pub mod reader;

pub use command::*;
pub use reader::*;
