//! Shared helpers for integration tests.

// Same guard the library's unit tests use; one copy for both.
#[path = "../../src/test_support/socket_guard.rs"]
pub mod socket_guard;
