pub mod crowdfunding_service;
pub mod guestbook_service;

pub use crowdfunding_service::*;
pub use guestbook_service::*;

use tokio::sync::{Mutex, MutexGuard};

use crate::domain::services::ContractError;

/// Claim the single write slot of a page. A second write while one is in
/// flight is refused, not queued.
pub(crate) fn begin_action<'a>(busy: &'a Mutex<()>, action: &str) -> Result<MutexGuard<'a, ()>, ContractError> {
    busy.try_lock().map_err(|_| ContractError::ActionInProgress {
        action: action.to_string(),
    })
}
