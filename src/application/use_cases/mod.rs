pub mod connect_wallet;
pub mod deploy_factory;

pub use connect_wallet::*;
pub use deploy_factory::*;
