use std::sync::Arc;

use crate::database::Gateway;
use crate::identity::IdentityProvider;
use crate::storage::StorageSigner;

/// Per-process dependencies, constructed once in main and passed explicitly
/// into every handler via axum state. No ambient globals.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Gateway,
    pub identity: Arc<dyn IdentityProvider>,
    pub signer: Arc<dyn StorageSigner>,
}

impl AppState {
    pub fn new(
        gateway: Gateway,
        identity: Arc<dyn IdentityProvider>,
        signer: Arc<dyn StorageSigner>,
    ) -> Self {
        Self {
            gateway,
            identity,
            signer,
        }
    }
}
