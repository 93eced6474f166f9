pub mod analysis;
pub mod batch;
pub mod candidate;
pub mod history;

#[cfg(test)]
pub(crate) mod fixtures;
