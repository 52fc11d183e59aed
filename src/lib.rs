//! Door/gate controller firmware library.
//!
//! Exposes the pure-logic modules for integration testing.  Everything
//! that needs ESP-IDF is behind the `espidf` feature; the rest builds and
//! tests on the host.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod codec;
pub mod config;
pub mod drivers;
pub mod error;
pub mod fsm;
pub mod pins;
pub mod scheduler;
