//! Peanut library exports for testing

pub mod console;
pub mod core;

#[cfg(test)]
pub mod test_support;
