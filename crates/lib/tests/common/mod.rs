#![allow(dead_code)]
//! # Common Test Utilities
//!
//! Tracing setup shared by the integration suites. The scripted provider
//! lives in `knowbatch-test-utils`, shared with the server tests.

use dotenvy::dotenv;
use std::sync::Once;

static INIT: Once = Once::new();

/// Initializes the tracing subscriber and loads .env for tests.
pub fn setup_tracing() {
    INIT.call_once(|| {
        dotenv().ok();
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}
