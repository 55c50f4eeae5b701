pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod utils;

#[cfg(test)]
mod tests;
