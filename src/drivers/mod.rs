//! Input debouncing, motor bridge driver, and indicator patterns.

pub mod debounce;
pub mod indicator;
pub mod motor;
