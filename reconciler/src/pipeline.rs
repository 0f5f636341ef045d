// reconciler/src/pipeline.rs
use std::future::Future;
use std::sync::Arc;

use common::models::{AuthenticatedSession, DisplayList};
use common::Config;
use tracing::Instrument;
use uuid::Uuid;

use crate::account::AccountId;
use crate::assembler::{assemble, ExclusionPolicy};
use crate::error::ReconcileError;
use crate::ledger::{CertificateLedger, JsonRpcLedger};
use crate::pinning::{PinataClient, PinningService};
use crate::prober::probe_all;

const DEFAULT_MAX_CONCURRENT_PROBES: usize = 8;

/// Runs a wallet load: ledger read, liveness probes, assembly.
///
/// Holds only collaborator handles and policy; every load builds its own
/// record list and results from scratch.
#[derive(Clone)]
pub struct Reconciler {
    ledger: Arc<dyn CertificateLedger>,
    pinning: Arc<dyn PinningService>,
    policy: ExclusionPolicy,
    max_concurrent_probes: usize,
}

impl Reconciler {
    pub fn new(ledger: Arc<dyn CertificateLedger>, pinning: Arc<dyn PinningService>) -> Self {
        Self {
            ledger,
            pinning,
            policy: ExclusionPolicy::legacy(),
            max_concurrent_probes: DEFAULT_MAX_CONCURRENT_PROBES,
        }
    }

    /// Wire up the JSON-RPC ledger and the Pinata client from configuration
    pub fn from_config(config: &Config) -> Result<Self, ReconcileError> {
        let ledger = JsonRpcLedger::new(&config.ledger)?;
        let pinning = PinataClient::new(&config.pinning)?;

        Ok(Self::new(Arc::new(ledger), Arc::new(pinning))
            .with_policy(ExclusionPolicy::from(&config.exclusion))
            .with_max_concurrent_probes(config.pinning.max_concurrent_probes))
    }

    pub fn with_policy(mut self, policy: ExclusionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_max_concurrent_probes(mut self, max: usize) -> Self {
        self.max_concurrent_probes = max.max(1);
        self
    }

    pub fn pinning(&self) -> &Arc<dyn PinningService> {
        &self.pinning
    }

    /// Load the display list for `account` on behalf of `session`.
    ///
    /// Ledger failures abort the load; probe failures only shorten the list.
    pub async fn load(&self, session: &AuthenticatedSession, account: &str) -> Result<DisplayList, ReconcileError> {
        if session.is_expired() {
            return Err(ReconcileError::SessionExpired);
        }
        let account = AccountId::parse(account)?;

        let span = tracing::info_span!(
            "load_certificates",
            load_id = %Uuid::new_v4(),
            account = %account,
            user_id = session.user_id(),
        );

        self.run(account).instrument(span).await
    }

    /// Like [`Reconciler::load`], but gives up as soon as `cancel` completes.
    ///
    /// In-flight probes are dropped and no partial list is returned.
    pub async fn load_until<C>(
        &self,
        session: &AuthenticatedSession,
        account: &str,
        cancel: C,
    ) -> Result<DisplayList, ReconcileError>
    where
        C: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            _ = cancel => {
                tracing::info!("Certificate load for {} cancelled", account);
                Err(ReconcileError::Cancelled)
            },
            result = self.load(session, account) => result,
        }
    }

    async fn run(&self, account: AccountId) -> Result<DisplayList, ReconcileError> {
        let records = self.ledger.list_certificates(&account).await.map_err(|e| {
            tracing::error!("Ledger read failed: {}", e);
            e
        })?;
        let total = records.len();

        let records = self.policy.without_excluded_ids(records);
        let liveness = probe_all(self.pinning.as_ref(), &records, self.max_concurrent_probes).await;
        let live = liveness.iter().filter(|l| **l).count();

        let list = assemble(records, &liveness, &self.policy);

        tracing::info!(
            total,
            live,
            displayed = list.len(),
            "Certificate load finished"
        );
        Ok(list)
    }
}
