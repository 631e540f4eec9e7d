//! Shared primitives: time source and money handling

pub mod money;
pub mod time;
