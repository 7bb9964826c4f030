//! Integration tests for the notionflow tracking client

mod cli_routes;
mod client_flow;
mod test_utils;
