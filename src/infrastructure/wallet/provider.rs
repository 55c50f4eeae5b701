use std::io::{BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ethers::{
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider, ProviderError, RpcError},
    signers::{LocalWallet, Signer},
    types::{Address, U256},
};
use tracing::{debug, info, warn};

use crate::domain::services::ContractError;
use crate::infrastructure::contracts::abis::AbiSource;
use crate::infrastructure::contracts::client::{EthersCampaignFactory, EthersGuestbook, TxSettings};
use crate::infrastructure::contracts::gateway::{CampaignFactoryGateway, GuestbookGateway};
use crate::infrastructure::contracts::types::ChainConfig;

/// EIP-1193 "user rejected the request".
const USER_REJECTED_CODE: i64 = 4001;
/// JSON-RPC "method not found", and the variant some dev nodes use.
const METHOD_NOT_FOUND_CODES: [i64; 2] = [-32601, -32004];

/// Bridge between the client and a wallet: grants account access, answers
/// balance queries and binds contract gateways that sign as the account.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    fn chain(&self) -> &ChainConfig;

    /// Ask for access to the wallet's accounts. The first one is the active account.
    async fn request_accounts(&self) -> Result<Vec<Address>, ContractError>;

    /// Native balance in wei.
    async fn get_balance(&self, account: Address) -> Result<U256, ContractError>;

    fn bind_guestbook(
        &self,
        address: Address,
        account: Address,
        abis: &AbiSource,
    ) -> Result<Arc<dyn GuestbookGateway>, ContractError>;

    fn bind_campaign_factory(
        &self,
        address: Address,
        account: Address,
        abis: &AbiSource,
    ) -> Result<Arc<dyn CampaignFactoryGateway>, ContractError>;
}

// ============ ACCOUNT APPROVAL ============

/// Decides whether the client may use an account, standing in for a wallet's
/// permission popup.
#[async_trait]
pub trait AccountApproval: Send + Sync {
    async fn approve(&self, account: Address, chain: &ChainConfig) -> bool;
}

/// Grants access without asking (`--yes`).
pub struct AutoApprove;

#[async_trait]
impl AccountApproval for AutoApprove {
    async fn approve(&self, _account: Address, _chain: &ChainConfig) -> bool {
        true
    }
}

/// Asks on the terminal. Anything but `y`/`yes` is a rejection.
pub struct TerminalPrompt;

#[async_trait]
impl AccountApproval for TerminalPrompt {
    async fn approve(&self, account: Address, chain: &ChainConfig) -> bool {
        let question = format!("Connect account {:?} on {} (chain {})? [y/N] ", account, chain.name, chain.chain_id);

        let answer = tokio::task::spawn_blocking(move || {
            let mut stderr = std::io::stderr();
            let _ = write!(stderr, "{}", question);
            let _ = stderr.flush();

            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line).map(|_| line)
        })
        .await;

        match answer {
            Ok(Ok(line)) => matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            _ => false,
        }
    }
}

// ============ LOCAL KEY PROVIDER ============

type LocalSigner = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Signs locally with a private key; the node only relays.
pub struct LocalKeyProvider {
    chain: ChainConfig,
    client: Arc<LocalSigner>,
    approval: Arc<dyn AccountApproval>,
}

impl LocalKeyProvider {
    pub fn new(chain: ChainConfig, private_key: &str, approval: Arc<dyn AccountApproval>) -> Result<Self, ContractError> {
        // Create provider
        let provider = http_provider(&chain)?;

        // Create wallet
        let wallet = private_key
            .trim()
            .parse::<LocalWallet>()
            .map_err(|e| ContractError::ConfigError(format!("Invalid private key: {}", e)))?
            .with_chain_id(chain.chain_id);

        Ok(Self {
            client: Arc::new(SignerMiddleware::new(provider, wallet)),
            chain,
            approval,
        })
    }

    pub fn address(&self) -> Address {
        self.client.signer().address()
    }
}

#[async_trait]
impl WalletProvider for LocalKeyProvider {
    fn chain(&self) -> &ChainConfig {
        &self.chain
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, ContractError> {
        let account = self.address();
        if !self.approval.approve(account, &self.chain).await {
            info!("Account access for {:?} was declined", account);
            return Err(ContractError::UserRejected {
                reason: "account access declined".to_string(),
            });
        }
        Ok(vec![account])
    }

    async fn get_balance(&self, account: Address) -> Result<U256, ContractError> {
        self.client
            .get_balance(account, None)
            .await
            .map_err(|e| ContractError::RpcError(e.to_string()))
    }

    fn bind_guestbook(
        &self,
        address: Address,
        account: Address,
        abis: &AbiSource,
    ) -> Result<Arc<dyn GuestbookGateway>, ContractError> {
        Ok(Arc::new(EthersGuestbook::new(
            address,
            abis.guestbook()?,
            self.client.clone(),
            TxSettings::for_chain(&self.chain, Some(account)),
        )))
    }

    fn bind_campaign_factory(
        &self,
        address: Address,
        account: Address,
        abis: &AbiSource,
    ) -> Result<Arc<dyn CampaignFactoryGateway>, ContractError> {
        Ok(Arc::new(EthersCampaignFactory::new(
            address,
            abis,
            self.client.clone(),
            TxSettings::for_chain(&self.chain, Some(account)),
        )?))
    }
}

// ============ NODE ACCOUNTS PROVIDER ============

/// Uses accounts managed by the node itself (a local dev node). The node
/// signs, so writes go out as `eth_sendTransaction` from the account.
pub struct NodeAccountsProvider {
    chain: ChainConfig,
    provider: Arc<Provider<Http>>,
}

impl NodeAccountsProvider {
    pub fn new(chain: ChainConfig) -> Result<Self, ContractError> {
        Ok(Self {
            provider: Arc::new(http_provider(&chain)?),
            chain,
        })
    }
}

/// `Ok` when a failed `eth_requestAccounts` only means the node lacks the
/// method, so `eth_accounts` should be asked instead.
fn check_accounts_fallback(err: &ProviderError) -> Result<(), ContractError> {
    match RpcError::as_error_response(err) {
        Some(resp) if resp.code == USER_REJECTED_CODE => Err(ContractError::UserRejected {
            reason: resp.message.clone(),
        }),
        Some(resp) if METHOD_NOT_FOUND_CODES.contains(&resp.code) => Ok(()),
        _ => Err(ContractError::RpcError(err.to_string())),
    }
}

#[async_trait]
impl WalletProvider for NodeAccountsProvider {
    fn chain(&self) -> &ChainConfig {
        &self.chain
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, ContractError> {
        let accounts = match self.provider.request::<_, Vec<Address>>("eth_requestAccounts", ()).await {
            Ok(accounts) => accounts,
            Err(e) => {
                check_accounts_fallback(&e)?;
                debug!("Node has no eth_requestAccounts, falling back to eth_accounts");
                self.provider
                    .get_accounts()
                    .await
                    .map_err(|e| ContractError::RpcError(e.to_string()))?
            }
        };

        if accounts.is_empty() {
            warn!("Node at {} exposes no accounts", self.chain.rpc_url);
            return Err(ContractError::UserRejected {
                reason: "no accounts exposed by the node".to_string(),
            });
        }
        Ok(accounts)
    }

    async fn get_balance(&self, account: Address) -> Result<U256, ContractError> {
        self.provider
            .get_balance(account, None)
            .await
            .map_err(|e| ContractError::RpcError(e.to_string()))
    }

    fn bind_guestbook(
        &self,
        address: Address,
        account: Address,
        abis: &AbiSource,
    ) -> Result<Arc<dyn GuestbookGateway>, ContractError> {
        Ok(Arc::new(EthersGuestbook::new(
            address,
            abis.guestbook()?,
            self.provider.clone(),
            TxSettings::for_chain(&self.chain, Some(account)),
        )))
    }

    fn bind_campaign_factory(
        &self,
        address: Address,
        account: Address,
        abis: &AbiSource,
    ) -> Result<Arc<dyn CampaignFactoryGateway>, ContractError> {
        Ok(Arc::new(EthersCampaignFactory::new(
            address,
            abis,
            self.provider.clone(),
            TxSettings::for_chain(&self.chain, Some(account)),
        )?))
    }
}

// ============ DISCOVERY ============

/// A private key wins; a local dev chain falls back to node accounts;
/// otherwise there is no provider.
pub fn discover_provider_with(
    chain: &ChainConfig,
    private_key: Option<String>,
    approval: Arc<dyn AccountApproval>,
) -> Result<Option<Arc<dyn WalletProvider>>, ContractError> {
    if let Some(key) = private_key.filter(|k| !k.trim().is_empty()) {
        debug!("Using local key provider on {}", chain.name);
        return Ok(Some(Arc::new(LocalKeyProvider::new(chain.clone(), &key, approval)?)));
    }

    if chain.is_local_dev() {
        debug!("Using node accounts on {}", chain.rpc_url);
        return Ok(Some(Arc::new(NodeAccountsProvider::new(chain.clone())?)));
    }

    Ok(None)
}

fn http_provider(chain: &ChainConfig) -> Result<Provider<Http>, ContractError> {
    let provider = Provider::<Http>::try_from(chain.rpc_url.as_str())
        .map_err(|e| ContractError::RpcError(format!("Invalid RPC URL {}: {}", chain.rpc_url, e)))?;
    Ok(provider.interval(Duration::from_millis(chain.poll_interval_ms)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::contracts::config::{get_chain_config_by_id, CORE_TESTNET_CHAIN_ID, HARDHAT_CHAIN_ID};
    use ethers::providers::{HttpClientError, JsonRpcError};

    // Hardhat's first default account.
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DEV_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    struct Decline;

    #[async_trait]
    impl AccountApproval for Decline {
        async fn approve(&self, _account: Address, _chain: &ChainConfig) -> bool {
            false
        }
    }

    fn testnet() -> ChainConfig {
        get_chain_config_by_id(CORE_TESTNET_CHAIN_ID).unwrap()
    }

    #[test]
    fn no_key_on_a_public_chain_means_no_provider() {
        let provider = discover_provider_with(&testnet(), None, Arc::new(AutoApprove)).unwrap();
        assert!(provider.is_none());

        let provider = discover_provider_with(&testnet(), Some("  ".into()), Arc::new(AutoApprove)).unwrap();
        assert!(provider.is_none());
    }

    #[test]
    fn local_chain_falls_back_to_node_accounts() {
        let chain = get_chain_config_by_id(HARDHAT_CHAIN_ID).unwrap();
        let provider = discover_provider_with(&chain, None, Arc::new(AutoApprove)).unwrap();
        assert_eq!(provider.unwrap().chain().chain_id, HARDHAT_CHAIN_ID);
    }

    #[test]
    fn bad_private_key_is_a_config_error() {
        let result = discover_provider_with(&testnet(), Some("0x1234".into()), Arc::new(AutoApprove));
        assert!(matches!(result, Err(ContractError::ConfigError(_))));
    }

    #[tokio::test]
    async fn local_key_exposes_its_address_once_approved() {
        let provider = LocalKeyProvider::new(testnet(), DEV_KEY, Arc::new(AutoApprove)).unwrap();
        let accounts = provider.request_accounts().await.unwrap();
        assert_eq!(accounts, vec![DEV_ADDRESS.parse::<Address>().unwrap()]);
    }

    #[tokio::test]
    async fn declined_approval_is_user_rejected() {
        let provider = LocalKeyProvider::new(testnet(), DEV_KEY, Arc::new(Decline)).unwrap();
        let err = provider.request_accounts().await.unwrap_err();
        assert!(matches!(err, ContractError::UserRejected { .. }));
    }

    fn node_error(code: i64, message: &str) -> ProviderError {
        ProviderError::JsonRpcClientError(Box::new(HttpClientError::JsonRpcError(JsonRpcError {
            code,
            message: message.to_string(),
            data: None,
        })))
    }

    #[test]
    fn nodes_without_request_accounts_fall_back() {
        assert_eq!(check_accounts_fallback(&node_error(-32601, "Method not found")), Ok(()));
        assert_eq!(
            check_accounts_fallback(&node_error(-32004, "Method eth_requestAccounts is not supported")),
            Ok(())
        );
    }

    #[test]
    fn refused_account_request_does_not_fall_back() {
        assert_eq!(
            check_accounts_fallback(&node_error(4001, "User rejected the request.")),
            Err(ContractError::UserRejected {
                reason: "User rejected the request.".to_string()
            })
        );
    }

    #[test]
    fn other_account_request_failures_are_rpc_errors() {
        let err = check_accounts_fallback(&node_error(-32603, "Internal error")).unwrap_err();
        assert!(matches!(err, ContractError::RpcError(ref reason) if reason.contains("Internal error")));

        let err = check_accounts_fallback(&ProviderError::CustomError("connection refused".to_string())).unwrap_err();
        assert!(matches!(err, ContractError::RpcError(ref reason) if reason.contains("connection refused")));
    }
}

