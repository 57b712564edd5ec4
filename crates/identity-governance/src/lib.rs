pub mod config;
pub mod error;
pub mod logic;
pub mod repository;
pub mod service;

#[cfg(any(test, feature = "unit_test"))]
pub mod test;
