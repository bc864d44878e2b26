pub(crate) mod common;
pub mod engine;
pub mod snapshot;

#[cfg(test)]
pub(crate) mod tests;
