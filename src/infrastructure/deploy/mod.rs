pub mod compiler;
pub mod config;
pub mod deployer;

pub use compiler::{load_artifact, parse_artifact, CompiledContract, SolcCompiler};
pub use config::{DeployConfig, NetworkEntry, DEFAULT_CONFIG_FILE};
pub use deployer::{ContractDeployer, Deployment};
