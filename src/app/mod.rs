//! Application core — pure domain logic, zero I/O.
//!
//! The door controller's tick handler and command executor live here.
//! All interaction with pins and the broker happens through the
//! **port traits** in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
