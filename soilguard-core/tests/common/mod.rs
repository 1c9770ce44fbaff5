//! Common test fixtures for integration tests
//!
//! - `hal`: scripted analog inputs, recording power pins, a delay that
//!   drives a mock clock, and an in-memory line sink
//! - `scenarios`: ready-made channel and node setups

#![allow(dead_code)]

pub mod hal;
pub mod scenarios;
