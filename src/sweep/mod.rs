//! Sweep orchestration: request validation, the quote / signature /
//! execution state machine against the relay, receipt confirmation, and
//! history recording.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use alloy::primitives::{Address, TxHash, U256};
use backon::{ExponentialBuilder, Retryable};
use chrono::Utc;
use tokio::sync::Notify;
use tracing::{info, warn};

use crate::account::{AccountVersion, MultichainAccount};
use crate::config::ReceiptPollConfig;
use crate::portfolio::{
    BalanceFetchError, BalanceIndex, NativeFilter, TokenRecord, fetch_eligible_tokens,
};
use crate::relay::{ExecutionRelay, QuoteRequest, SupertxReceipt, TransactionStatus, Trigger};
use crate::signer::{ChainSwitchError, Signer};

pub mod fee;
pub mod history;
pub mod instructions;
pub mod token;

use fee::{FeeMode, FeeSelection};
use history::{SweepHistoryEntry, SweepHistoryStore};
use instructions::{DirectValueTransfer, NativeSweepStrategy, build_sweep_instructions};
use token::SweepToken;

/// Shown when the underlying failure carries no usable message.
pub const FALLBACK_ERROR_MESSAGE: &str = "Sweep failed. Please try again.";

/// Token amount for the on-chain trigger anchoring externally-funded
/// quotes: the smallest possible movement.
const TRIGGER_AMOUNT: u64 = 1;

/// Pre-flight failures. The sweep never starts; the slot stays idle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Smart account not resolved.")]
    MissingAccount,
    #[error("No destination address.")]
    MissingDestination,
    #[error("Destination must differ from the swept account.")]
    DestinationIsSource,
    #[error("No tokens selected to sweep.")]
    NoTokens,
    #[error("Please select a fee token.")]
    MissingFeeSelection,
    #[error("A sweep is already in progress for this account version.")]
    AlreadyInFlight,
    #[error("No sweepable tokens on supported chains.")]
    EmptyBatch,
}

#[derive(Debug, thiserror::Error)]
pub enum SweepError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Quote(String),
    #[error("{0}")]
    Signature(String),
    #[error("{0}")]
    Execution(String),
    #[error(transparent)]
    ChainSwitch(#[from] ChainSwitchError),
    #[error("Sweep ended with status {status}")]
    Receipt { status: TransactionStatus },
}

impl SweepError {
    /// The message shown to the user: the underlying failure verbatim,
    /// or the generic fallback when there is nothing to show.
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            FALLBACK_ERROR_MESSAGE.to_string()
        } else {
            message
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SweepPhase {
    #[default]
    Idle,
    Quote,
    AwaitingSignature,
    Executing,
    Success,
    Error,
}

impl SweepPhase {
    pub fn is_in_flight(self) -> bool {
        matches!(self, Self::Quote | Self::AwaitingSignature | Self::Executing)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Error)
    }
}

/// Observable state of one account version's sweep slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepStatus {
    pub phase: SweepPhase,
    pub hash: Option<TxHash>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default)]
struct SweepSlot {
    phase: SweepPhase,
    hash: Option<TxHash>,
    error: Option<String>,
}

/// What a sweep attempt produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepOutcome {
    Completed { hash: TxHash },
    /// The wallet was moved to the fee token's chain. The sweep did not
    /// start; the user re-triggers once the switch has settled.
    ChainSwitched { chain_id: u64 },
}

/// Everything a single sweep attempt needs. Optional fields model
/// preconditions the embedding client may not have satisfied yet.
#[derive(Debug, Clone)]
pub struct SweepRequest {
    pub version: AccountVersion,
    pub account: Option<MultichainAccount>,
    pub destination: Option<Address>,
    pub tokens: Vec<SweepToken>,
    pub fee: Option<FeeSelection>,
}

enum ReceiptPollError {
    Relay(crate::relay::RelayError),
    Pending(TransactionStatus),
}

pub fn receipt_retry_strategy(config: &ReceiptPollConfig) -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_max_times(config.max_retries)
        .with_min_delay(Duration::from_millis(config.min_delay_ms))
        .with_max_delay(Duration::from_millis(config.max_delay_ms))
}

/// Drives sweeps for all account versions. Each version owns an
/// independent state-machine slot; at most one execution per version is
/// in flight at a time.
pub struct SweepEngine {
    relay: Arc<dyn ExecutionRelay>,
    history: SweepHistoryStore,
    native_strategy: Box<dyn NativeSweepStrategy>,
    settle_delay: Duration,
    refresh_delay: Duration,
    receipt_retry: ExponentialBuilder,
    slots: Mutex<HashMap<AccountVersion, SweepSlot>>,
    refresh: Arc<Notify>,
}

impl SweepEngine {
    pub fn new(relay: Arc<dyn ExecutionRelay>, history: SweepHistoryStore) -> Self {
        Self {
            relay,
            history,
            native_strategy: Box::new(DirectValueTransfer),
            settle_delay: crate::config::DEFAULT_SETTLE_DELAY,
            refresh_delay: crate::config::DEFAULT_REFRESH_DELAY,
            receipt_retry: receipt_retry_strategy(&ReceiptPollConfig::default()),
            slots: Mutex::new(HashMap::new()),
            refresh: Arc::new(Notify::new()),
        }
    }

    #[must_use]
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    #[must_use]
    pub fn with_refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = delay;
        self
    }

    #[must_use]
    pub fn with_receipt_retry(mut self, strategy: ExponentialBuilder) -> Self {
        self.receipt_retry = strategy;
        self
    }

    #[must_use]
    pub fn with_native_strategy(mut self, strategy: Box<dyn NativeSweepStrategy>) -> Self {
        self.native_strategy = strategy;
        self
    }

    pub fn status(&self, version: AccountVersion) -> SweepStatus {
        let slots = self.lock_slots();
        let slot = slots.get(&version).cloned().unwrap_or_default();
        SweepStatus {
            phase: slot.phase,
            hash: slot.hash,
            error: slot.error,
        }
    }

    /// Recorded sweeps, newest first.
    pub async fn history(&self) -> Vec<SweepHistoryEntry> {
        self.history.load().await
    }

    /// Resolves after a successful sweep has asked for a token-list
    /// refresh (one refresh delay past confirmation).
    pub async fn refresh_requested(&self) {
        self.refresh.notified().await;
    }

    /// Runs one sweep attempt for the request's account version.
    ///
    /// Terminal slots (success or error) start over from idle. Validation
    /// failures leave the slot idle; everything past validation drives it
    /// to a terminal phase.
    pub async fn sweep(
        &self,
        signer: &dyn Signer,
        request: SweepRequest,
    ) -> Result<SweepOutcome, SweepError> {
        let version = request.version;
        match self.run(signer, request).await {
            Ok(outcome) => Ok(outcome),
            Err(error) => {
                if !matches!(error, SweepError::Validation(_)) {
                    let message = error.user_message();
                    warn!(%version, message, "Sweep failed");
                    self.fail_slot(version, message);
                }
                Err(error)
            }
        }
    }

    async fn run(
        &self,
        signer: &dyn Signer,
        request: SweepRequest,
    ) -> Result<SweepOutcome, SweepError> {
        let version = request.version;
        self.begin(version)?;

        let account = request.account.ok_or(ValidationError::MissingAccount)?;
        let destination = request
            .destination
            .ok_or(ValidationError::MissingDestination)?;
        // Sweeping the account into itself would move nothing and still
        // pay fees.
        if account.contains(destination) {
            return Err(ValidationError::DestinationIsSource.into());
        }
        if request.tokens.is_empty() {
            return Err(ValidationError::NoTokens.into());
        }
        let fee = request.fee.ok_or(ValidationError::MissingFeeSelection)?;

        // Externally-funded fees move through the wallet, so the wallet
        // must sit on the fee token's chain before anything is quoted.
        if fee.mode == FeeMode::ExternallyFunded {
            let active = signer.active_chain_id().await;
            if active != fee.chain_id {
                signer.switch_chain(fee.chain_id).await?;
                info!(
                    from = active,
                    to = fee.chain_id,
                    "Switched wallet chain for fee payment; sweep must be re-triggered"
                );
                return Ok(SweepOutcome::ChainSwitched {
                    chain_id: fee.chain_id,
                });
            }
        }

        let batch = build_sweep_instructions(
            &account,
            destination,
            &request.tokens,
            self.native_strategy.as_ref(),
        );
        if batch.is_empty() {
            return Err(ValidationError::EmptyBatch.into());
        }
        let token_count = batch.len();

        self.set_phase(version, SweepPhase::Quote);
        let quote_request = QuoteRequest {
            instructions: batch,
            fee_token: fee.fee_token_ref(),
        };

        let hash = match fee.mode {
            FeeMode::SelfFunded => {
                let quote = self
                    .relay
                    .get_quote(quote_request)
                    .await
                    .map_err(|e| SweepError::Quote(e.to_string()))?;

                self.set_phase(version, SweepPhase::AwaitingSignature);
                let handle = self
                    .relay
                    .execute_quote(quote)
                    .await
                    .map_err(|e| SweepError::Signature(e.to_string()))?;
                self.set_phase(version, SweepPhase::Executing);
                handle.hash
            }
            FeeMode::ExternallyFunded => {
                let trigger = Trigger {
                    chain_id: fee.chain_id,
                    token_address: fee.fee_token_ref().address,
                    amount: U256::from(TRIGGER_AMOUNT),
                };
                let quote = self
                    .relay
                    .get_on_chain_quote(quote_request, trigger)
                    .await
                    .map_err(|e| SweepError::Quote(e.to_string()))?;

                self.set_phase(version, SweepPhase::AwaitingSignature);
                let signed = self
                    .relay
                    .sign_on_chain_quote(quote)
                    .await
                    .map_err(|e| SweepError::Signature(e.to_string()))?;

                self.set_phase(version, SweepPhase::Executing);
                let handle = self
                    .relay
                    .execute_signed_quote(signed)
                    .await
                    .map_err(|e| SweepError::Execution(e.to_string()))?;
                handle.hash
            }
        };

        self.set_hash(version, hash);
        info!(%version, %hash, "Supertransaction submitted");

        tokio::time::sleep(self.settle_delay).await;
        let receipt = self.confirm(hash).await?;

        if !receipt.status.is_success() {
            return Err(SweepError::Receipt {
                status: receipt.status,
            });
        }

        self.complete_slot(version, hash);
        self.history
            .append(&SweepHistoryEntry {
                hash,
                timestamp: Utc::now(),
                token_count,
                account_version: version,
            })
            .await;
        self.schedule_refresh();
        info!(%version, %hash, token_count, "Sweep confirmed");

        Ok(SweepOutcome::Completed { hash })
    }

    /// Polls the receipt until the relay reports a terminal status or the
    /// retry budget runs out.
    async fn confirm(&self, hash: TxHash) -> Result<SupertxReceipt, SweepError> {
        let poll = || async {
            let receipt = self
                .relay
                .get_receipt(hash)
                .await
                .map_err(ReceiptPollError::Relay)?;
            if receipt.status.is_terminal() {
                Ok(receipt)
            } else {
                Err(ReceiptPollError::Pending(receipt.status))
            }
        };

        match poll
            .retry(self.receipt_retry.clone())
            .when(|e| matches!(e, ReceiptPollError::Pending(_)))
            .await
        {
            Ok(receipt) => Ok(receipt),
            Err(ReceiptPollError::Pending(status)) => Err(SweepError::Receipt { status }),
            Err(ReceiptPollError::Relay(error)) => Err(SweepError::Execution(error.to_string())),
        }
    }

    fn schedule_refresh(&self) {
        let refresh = Arc::clone(&self.refresh);
        let delay = self.refresh_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            refresh.notify_one();
        });
    }

    fn lock_slots(&self) -> MutexGuard<'_, HashMap<AccountVersion, SweepSlot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claims the version's slot for a new attempt, resetting any
    /// terminal state from the previous one.
    fn begin(&self, version: AccountVersion) -> Result<(), ValidationError> {
        let mut slots = self.lock_slots();
        let slot = slots.entry(version).or_default();
        if slot.phase.is_in_flight() {
            return Err(ValidationError::AlreadyInFlight);
        }
        *slot = SweepSlot::default();
        Ok(())
    }

    fn set_phase(&self, version: AccountVersion, phase: SweepPhase) {
        self.lock_slots().entry(version).or_default().phase = phase;
    }

    fn set_hash(&self, version: AccountVersion, hash: TxHash) {
        self.lock_slots().entry(version).or_default().hash = Some(hash);
    }

    fn complete_slot(&self, version: AccountVersion, hash: TxHash) {
        let mut slots = self.lock_slots();
        let slot = slots.entry(version).or_default();
        slot.phase = SweepPhase::Success;
        slot.hash = Some(hash);
    }

    fn fail_slot(&self, version: AccountVersion, message: String) {
        let mut slots = self.lock_slots();
        let slot = slots.entry(version).or_default();
        slot.phase = SweepPhase::Error;
        slot.error = Some(message);
    }
}

/// Discovered sweep candidates for one owner. A failed refresh clears
/// the previous list so stale candidates can never be swept.
#[derive(Debug, Default)]
pub struct TokenInventory {
    tokens: Vec<TokenRecord>,
}

impl TokenInventory {
    pub fn tokens(&self) -> &[TokenRecord] {
        &self.tokens
    }

    pub async fn refresh<I>(
        &mut self,
        index: &I,
        owner: Address,
        chain_scope: &[String],
        native_filter: NativeFilter,
    ) -> Result<(), BalanceFetchError>
    where
        I: BalanceIndex + ?Sized,
    {
        match fetch_eligible_tokens(index, owner, chain_scope, native_filter).await {
            Ok(tokens) => {
                self.tokens = tokens;
                Ok(())
            }
            Err(error) => {
                self.tokens.clear();
                Err(error)
            }
        }
    }
}
