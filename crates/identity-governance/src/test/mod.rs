//! Test utilities and fixtures for the governance crate.
