//! Shared utilities for Agora binaries and tests.

pub mod logger;
pub mod time;
