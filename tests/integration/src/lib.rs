//! Integration test utilities for the chat mirror
//!
//! This crate provides a scripted in-memory gateway, a fake REST platform,
//! and wire payload fixtures for end-to-end tests.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
