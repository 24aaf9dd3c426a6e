//! Integration tests for the harvester
//!
//! These tests use wiremock to stand in for the remote catalog and
//! exercise the full harvest cycle end-to-end.

mod common;
mod harvest_tests;
