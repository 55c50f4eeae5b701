pub mod contracts;
pub mod deploy;
pub mod wallet;
