//! Property-based tests for schema building and run logging

mod run_logging;
mod schema_determinism;
