//! # Operation Controller
//!
//! The caller side of the orchestrator. Where the orchestrator answers
//! "may this run, and what did the protocol say", the controller owns
//! everything that outlives a single call:
//!
//! - **In-flight guard**: one slot per [`OperationKind`]. A second trigger
//!   of the same kind while the first is submitting gets
//!   [`OperationError::AlreadyInFlight`] and never reaches the orchestrator.
//! - **Confirmation hand-off**: every transaction hash goes to the
//!   [`ConfirmationWatcher`] and becomes the pending transaction until
//!   [`OperationController::on_confirmation`] clears it.
//! - **Refresh**: exactly one refresh per successful operation, scoped by
//!   the receipt. Refreshes are numbered, and each field group of the view
//!   remembers the newest refresh that started reading it. A refresh that
//!   finishes late drops only the groups a newer refresh also covers; the
//!   rest of what it read still lands.
//! - **Affordances**: [`OperationController::is_enabled`] answers whether a
//!   button for `kind` should be clickable right now.
//!
//! Locks are `parking_lot` and are never held across an `.await`.

use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::client::{Confirmation, ConfirmationWatcher};
use super::error::{OperationError, ProtocolError};
use super::orchestrator::Orchestrator;
use super::session::SessionContext;
use super::types::{
    Address, Operation, OperationKind, OperationReceipt, RefreshScope, TokenMetadata, TxHash,
};
use crate::amount::Amount;
use crate::crypto::{CurvePoint, EncryptedBalance};

// ---------------------------------------------------------------------------
// Balance View
// ---------------------------------------------------------------------------

/// Everything the session displays, as of the last applied refresh.
#[derive(Clone, Debug, Default, Serialize)]
pub struct BalanceView {
    pub metadata: Option<TokenMetadata>,
    pub registered: bool,
    pub decryption_key_available: bool,
    pub public_key: CurvePoint,
    pub auditor_public_key: CurvePoint,
    pub encrypted_balance: EncryptedBalance,
    /// `None` until a decryption key is available.
    pub decrypted_balance: Option<Amount>,
    pub underlying_balance: Option<Amount>,
    /// Scale of `underlying_balance`, as reported with it.
    pub underlying_decimals: Option<u32>,
    /// The last submitted transaction the watcher has not confirmed yet.
    pub pending_tx: Option<TxHash>,
    /// Generation of the refresh that produced this view. `0` before the first.
    pub generation: u64,
}

/// Values fetched by one refresh, applied all at once.
#[derive(Default)]
struct ViewUpdate {
    metadata: Option<TokenMetadata>,
    auditor_public_key: Option<CurvePoint>,
    registered: Option<bool>,
    public_key: Option<CurvePoint>,
    encrypted_balance: Option<EncryptedBalance>,
    decrypted_balance: Option<Amount>,
    underlying_balance: Option<Amount>,
    underlying_decimals: Option<u32>,
}

impl ViewUpdate {
    /// Forgets whatever was read for `group`.
    fn discard(&mut self, group: FieldGroup) {
        match group {
            FieldGroup::Metadata => {
                self.metadata = None;
                self.auditor_public_key = None;
            }
            FieldGroup::Registration => {
                self.registered = None;
                self.public_key = None;
            }
            FieldGroup::Encrypted => {
                self.encrypted_balance = None;
                self.decrypted_balance = None;
            }
            FieldGroup::Underlying => {
                self.underlying_balance = None;
                self.underlying_decimals = None;
            }
        }
    }

    fn apply(self, view: &mut BalanceView) {
        if let Some(metadata) = self.metadata {
            view.metadata = Some(metadata);
        }
        if let Some(key) = self.auditor_public_key {
            view.auditor_public_key = key;
        }
        if let Some(registered) = self.registered {
            view.registered = registered;
        }
        if let Some(key) = self.public_key {
            view.public_key = key;
        }
        if let Some(balance) = self.encrypted_balance {
            view.encrypted_balance = balance;
        }
        if self.decrypted_balance.is_some() {
            view.decrypted_balance = self.decrypted_balance;
        }
        if self.underlying_balance.is_some() {
            view.underlying_balance = self.underlying_balance;
        }
        if self.underlying_decimals.is_some() {
            view.underlying_decimals = self.underlying_decimals;
        }
    }
}

/// Parts of the view that are always read together.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FieldGroup {
    Metadata,
    Registration,
    Encrypted,
    Underlying,
}

impl FieldGroup {
    const ALL: [FieldGroup; 4] = [
        FieldGroup::Metadata,
        FieldGroup::Registration,
        FieldGroup::Encrypted,
        FieldGroup::Underlying,
    ];

    fn in_scope(self, scope: RefreshScope) -> bool {
        match self {
            FieldGroup::Metadata => scope.includes_metadata(),
            FieldGroup::Registration => scope.includes_registration(),
            FieldGroup::Encrypted => scope.includes_encrypted(),
            FieldGroup::Underlying => scope.includes_underlying(),
        }
    }
}

/// Newest refresh generation that started reading each [`FieldGroup`].
#[derive(Default)]
struct GroupGenerations([u64; 4]);

impl GroupGenerations {
    fn get(&self, group: FieldGroup) -> u64 {
        self.0[group as usize]
    }

    fn claim(&mut self, group: FieldGroup, generation: u64) {
        self.0[group as usize] = generation;
    }
}

// ---------------------------------------------------------------------------
// In-flight slot
// ---------------------------------------------------------------------------

/// Holds a kind's in-flight slot; releases it on drop.
struct InFlightSlot<'a> {
    slots: &'a Mutex<HashSet<OperationKind>>,
    kind: OperationKind,
}

impl Drop for InFlightSlot<'_> {
    fn drop(&mut self) {
        self.slots.lock().remove(&self.kind);
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

pub struct OperationController {
    orchestrator: Orchestrator,
    watcher: Arc<dyn ConfirmationWatcher>,
    in_flight: Mutex<HashSet<OperationKind>>,
    view: RwLock<BalanceView>,
    history: Mutex<Vec<Operation>>,
    refresh_generation: AtomicU64,
    group_generations: Mutex<GroupGenerations>,
}

impl OperationController {
    pub fn new(orchestrator: Orchestrator, watcher: Arc<dyn ConfirmationWatcher>) -> Self {
        Self {
            orchestrator,
            watcher,
            in_flight: Mutex::new(HashSet::new()),
            view: RwLock::new(BalanceView::default()),
            history: Mutex::new(Vec::new()),
            refresh_generation: AtomicU64::new(0),
            group_generations: Mutex::new(GroupGenerations::default()),
        }
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// Snapshot of the current view.
    pub fn view(&self) -> BalanceView {
        self.view.read().clone()
    }

    /// Every operation that got past the in-flight guard, oldest first.
    pub fn history(&self) -> Vec<Operation> {
        self.history.lock().clone()
    }

    pub fn is_in_flight(&self, kind: OperationKind) -> bool {
        self.in_flight.lock().contains(&kind)
    }

    /// Whether an affordance for `kind` should accept input.
    ///
    /// Disabled while disconnected or while the same kind is submitting.
    /// Register is disabled once registered. Key generation is disabled once
    /// registered with a key in hand. Everything else needs a decryption key
    /// and a deployment mode that offers it.
    pub fn is_enabled(&self, kind: OperationKind, ctx: &SessionContext) -> bool {
        if !ctx.connected || self.is_in_flight(kind) {
            return false;
        }
        let view = self.view.read();
        if kind.requires_decryption_key() && !view.decryption_key_available {
            return false;
        }
        match kind {
            OperationKind::Register => !view.registered,
            OperationKind::GenerateKey => !(view.registered && view.decryption_key_available),
            _ => view
                .metadata
                .as_ref()
                .map_or(false, |m| kind.available_in(m.mode)),
        }
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Initial load of every displayed value.
    pub async fn load(&self, ctx: &SessionContext) -> Result<bool, ProtocolError> {
        self.refresh(ctx, RefreshScope::Everything).await
    }

    pub async fn register(&self, ctx: &SessionContext) -> Result<OperationReceipt, OperationError> {
        self.run(ctx, OperationKind::Register, self.orchestrator.register(ctx))
            .await
    }

    /// Derives the decryption key, regenerating it if the session has none.
    pub async fn generate_key(
        &self,
        ctx: &SessionContext,
    ) -> Result<OperationReceipt, OperationError> {
        let regenerate = !self.view.read().decryption_key_available;
        self.run(
            ctx,
            OperationKind::GenerateKey,
            self.orchestrator.generate_key(ctx, regenerate),
        )
        .await
    }

    pub async fn mint(
        &self,
        ctx: &SessionContext,
        amount: &Amount,
    ) -> Result<OperationReceipt, OperationError> {
        self.run(ctx, OperationKind::Mint, self.orchestrator.mint(ctx, amount))
            .await
    }

    pub async fn burn(
        &self,
        ctx: &SessionContext,
        amount: &Amount,
    ) -> Result<OperationReceipt, OperationError> {
        self.run(ctx, OperationKind::Burn, self.orchestrator.burn(ctx, amount))
            .await
    }

    pub async fn transfer(
        &self,
        ctx: &SessionContext,
        recipient: &Address,
        amount: &str,
    ) -> Result<OperationReceipt, OperationError> {
        self.run(
            ctx,
            OperationKind::Transfer,
            self.orchestrator.transfer(ctx, recipient, amount),
        )
        .await
    }

    pub async fn deposit(
        &self,
        ctx: &SessionContext,
        amount: &str,
    ) -> Result<OperationReceipt, OperationError> {
        self.run(ctx, OperationKind::Deposit, self.orchestrator.deposit(ctx, amount))
            .await
    }

    pub async fn withdraw(
        &self,
        ctx: &SessionContext,
        amount: &str,
    ) -> Result<OperationReceipt, OperationError> {
        self.run(ctx, OperationKind::Withdraw, self.orchestrator.withdraw(ctx, amount))
            .await
    }

    /// The watcher reports a receipt for `tx_hash`.
    ///
    /// Clears the pending transaction if it matches. Returns whether it did.
    pub fn on_confirmation(&self, tx_hash: &TxHash, outcome: Confirmation) -> bool {
        let mut view = self.view.write();
        if view.pending_tx.as_ref() != Some(tx_hash) {
            debug!(tx_hash = %tx_hash, "Confirmation for a transaction that is no longer pending");
            return false;
        }
        match &outcome {
            Confirmation::Included => info!(tx_hash = %tx_hash, "Transaction confirmed"),
            Confirmation::Reverted(reason) => {
                warn!(tx_hash = %tx_hash, reason = %reason, "Transaction reverted")
            }
        }
        view.pending_tx = None;
        true
    }

    /// Re-reads the parts of the view named by `scope`.
    ///
    /// Returns `Ok(false)` if a newer refresh covering some of the same
    /// fields started while this one was reading. Those fields are left to
    /// the newer refresh; every other field read here is still applied.
    pub async fn refresh(
        &self,
        ctx: &SessionContext,
        scope: RefreshScope,
    ) -> Result<bool, ProtocolError> {
        let generation = self.refresh_generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(?scope, generation, "Refreshing balance view");
        {
            let mut claimed = self.group_generations.lock();
            for group in FieldGroup::ALL.into_iter().filter(|g| g.in_scope(scope)) {
                claimed.claim(group, generation);
            }
        }

        let client = self.orchestrator.client();
        let key_available = self.view.read().decryption_key_available;
        let mut update = ViewUpdate::default();

        if scope.includes_metadata() {
            update.metadata = Some(client.token_metadata().await?);
            update.auditor_public_key = Some(client.auditor_public_key().await?);
        }
        if scope.includes_registration() {
            if let Some(account) = &ctx.account {
                update.registered = Some(client.is_address_registered(account).await?);
            }
            update.public_key = Some(client.public_key().await?);
        }
        if scope.includes_encrypted() {
            update.encrypted_balance = Some(client.encrypted_balance().await?);
            if key_available {
                update.decrypted_balance = Some(client.decrypted_balance().await?);
            }
        }
        if scope.includes_underlying() {
            update.underlying_balance = Some(client.underlying_balance().await?);
            update.underlying_decimals = client.underlying_decimals().await?;
        }

        let claimed = self.group_generations.lock();
        let mut current = true;
        let mut applied_any = false;
        for group in FieldGroup::ALL.into_iter().filter(|g| g.in_scope(scope)) {
            if claimed.get(group) == generation {
                applied_any = true;
            } else {
                debug!(?group, generation, "Refresh superseded for field group, discarding");
                update.discard(group);
                current = false;
            }
        }

        let mut view = self.view.write();
        update.apply(&mut view);
        if applied_any {
            view.generation = view.generation.max(generation);
        }
        Ok(current)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn acquire(&self, kind: OperationKind) -> Result<InFlightSlot<'_>, OperationError> {
        if !self.in_flight.lock().insert(kind) {
            warn!(kind = %kind, "Operation already in flight");
            return Err(OperationError::AlreadyInFlight(kind));
        }
        Ok(InFlightSlot {
            slots: &self.in_flight,
            kind,
        })
    }

    async fn run(
        &self,
        ctx: &SessionContext,
        kind: OperationKind,
        call: impl Future<Output = Result<OperationReceipt, OperationError>>,
    ) -> Result<OperationReceipt, OperationError> {
        let _slot = self.acquire(kind)?;

        let mut op = Operation::new(kind);
        op.submit();
        let result = call.await;

        match &result {
            Ok(receipt) => {
                op.confirm(receipt.tx_hash);
                self.history.lock().push(op);

                if receipt.decryption_key.is_some() {
                    self.view.write().decryption_key_available = true;
                }
                if let Some(tx_hash) = &receipt.tx_hash {
                    self.watcher.track(kind, tx_hash);
                    self.view.write().pending_tx = Some(*tx_hash);
                }
                if let Err(e) = self.refresh(ctx, receipt.refresh).await {
                    warn!(kind = %kind, error = %e, "Refresh after operation failed");
                }
            }
            Err(e) => {
                op.fail(e.to_string());
                self.history.lock().push(op);
            }
        }

        result
    }
}
