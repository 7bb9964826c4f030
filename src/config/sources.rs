//! Configuration sources, lowest precedence first.

pub mod env;
pub mod global_file;
