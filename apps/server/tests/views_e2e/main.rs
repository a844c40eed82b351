//! View E2E test suite.
//!
//! Drives the composed views against a mock Carrot-Mapper backend served
//! in-process on an ephemeral port. No external services are needed.
//!
//! Run with: cargo test --test views_e2e

mod mock_backend;
mod test_helpers;

mod test_concepts;
mod test_datasets;
mod test_exports;
mod test_navigation;
mod test_session;
mod test_table_views;
