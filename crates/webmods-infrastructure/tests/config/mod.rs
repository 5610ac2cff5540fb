//! Configuration integration tests

mod loader_tests;
