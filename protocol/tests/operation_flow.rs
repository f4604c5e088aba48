//! Integration tests for the operation layer.
//!
//! Every test drives the orchestrator or the controller against a scripted
//! protocol client that counts its calls. The properties under test are
//! sequencing ones: what gets called, how often, and in which order.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use num_bigint::BigUint;
use parking_lot::Mutex;
use tokio::sync::oneshot;

use eerc_client::amount::{encode, Amount, AmountError};
use eerc_client::config::EercMode;
use eerc_client::crypto::{CurvePoint, EncryptedBalance};
use eerc_client::operations::{
    Address, Confirmation, ConfirmationWatcher, DecryptionKey, OperationController,
    OperationError, OperationKind, OperationStatus, Orchestrator, ProtocolClient, ProtocolError,
    RefreshScope, SessionContext, TokenMetadata, TxHash,
};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

#[derive(Default, Debug, Clone)]
struct Calls {
    register: usize,
    generate_key: usize,
    mint: usize,
    burn: usize,
    transfer: usize,
    deposit: usize,
    withdraw: usize,
    encrypted_balance: usize,
    decrypted_balance: usize,
    underlying_balance: usize,
}

impl Calls {
    fn delegates(&self) -> usize {
        self.register
            + self.generate_key
            + self.mint
            + self.burn
            + self.transfer
            + self.deposit
            + self.withdraw
    }
}

/// A protocol client whose answers are set up front.
struct ScriptedClient {
    mode: EercMode,
    decimals: Option<u32>,
    underlying_decimals: Option<u32>,
    registered: Mutex<HashSet<Address>>,
    fail_with: Mutex<Option<ProtocolError>>,
    fail_lookup: Mutex<Option<ProtocolError>>,
    calls: Mutex<Calls>,
    last_amount: Mutex<Option<Amount>>,
    mint_gate: Mutex<Option<oneshot::Receiver<()>>>,
    read_gate: Mutex<Option<oneshot::Receiver<()>>>,
    tx_counter: Mutex<u8>,
}

impl ScriptedClient {
    fn new(mode: EercMode) -> Self {
        Self {
            mode,
            decimals: Some(2),
            underlying_decimals: Some(18),
            registered: Mutex::new(HashSet::new()),
            fail_with: Mutex::new(None),
            fail_lookup: Mutex::new(None),
            calls: Mutex::new(Calls::default()),
            last_amount: Mutex::new(None),
            mint_gate: Mutex::new(None),
            read_gate: Mutex::new(None),
            tx_counter: Mutex::new(0),
        }
    }

    fn with_registered(self, address: Address) -> Self {
        self.registered.lock().insert(address);
        self
    }

    fn fail_next(&self, error: ProtocolError) {
        *self.fail_with.lock() = Some(error);
    }

    fn calls(&self) -> Calls {
        self.calls.lock().clone()
    }

    fn last_amount(&self) -> Option<Amount> {
        self.last_amount.lock().clone()
    }

    fn submit(&self, amount: Option<&Amount>) -> Result<TxHash, ProtocolError> {
        if let Some(error) = self.fail_with.lock().take() {
            return Err(error);
        }
        if let Some(amount) = amount {
            *self.last_amount.lock() = Some(amount.clone());
        }
        let mut counter = self.tx_counter.lock();
        *counter += 1;
        Ok(TxHash::from_bytes([*counter; 32]))
    }
}

#[async_trait]
impl ProtocolClient for ScriptedClient {
    async fn register(&self) -> Result<TxHash, ProtocolError> {
        self.calls.lock().register += 1;
        self.submit(None)
    }

    async fn generate_decryption_key(&self) -> Result<DecryptionKey, ProtocolError> {
        self.calls.lock().generate_key += 1;
        self.submit(None).map(|_| DecryptionKey::new("0xkey"))
    }

    async fn is_address_registered(&self, address: &Address) -> Result<bool, ProtocolError> {
        if let Some(error) = self.fail_lookup.lock().take() {
            return Err(error);
        }
        Ok(self.registered.lock().contains(address))
    }

    async fn mint(&self, _recipient: &Address, amount: &Amount) -> Result<TxHash, ProtocolError> {
        self.calls.lock().mint += 1;
        let gate = self.mint_gate.lock().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.submit(Some(amount))
    }

    async fn burn(&self, amount: &Amount) -> Result<TxHash, ProtocolError> {
        self.calls.lock().burn += 1;
        self.submit(Some(amount))
    }

    async fn transfer(
        &self,
        _recipient: &Address,
        amount: &Amount,
    ) -> Result<TxHash, ProtocolError> {
        self.calls.lock().transfer += 1;
        self.submit(Some(amount))
    }

    async fn deposit(&self, amount: &Amount) -> Result<TxHash, ProtocolError> {
        self.calls.lock().deposit += 1;
        self.submit(Some(amount))
    }

    async fn withdraw(&self, amount: &Amount) -> Result<TxHash, ProtocolError> {
        self.calls.lock().withdraw += 1;
        self.submit(Some(amount))
    }

    async fn encrypted_balance(&self) -> Result<EncryptedBalance, ProtocolError> {
        let n = {
            let mut calls = self.calls.lock();
            calls.encrypted_balance += 1;
            calls.encrypted_balance
        };
        let gate = self.read_gate.lock().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        let n = BigUint::from(n);
        Ok(EncryptedBalance::from_limbs([
            n.clone(),
            n.clone(),
            n.clone(),
            n,
        ]))
    }

    async fn decrypted_balance(&self) -> Result<Amount, ProtocolError> {
        self.calls.lock().decrypted_balance += 1;
        Ok(Amount::from(150u64))
    }

    async fn public_key(&self) -> Result<CurvePoint, ProtocolError> {
        Ok(CurvePoint::unset())
    }

    async fn auditor_public_key(&self) -> Result<CurvePoint, ProtocolError> {
        Ok(CurvePoint::unset())
    }

    async fn token_metadata(&self) -> Result<TokenMetadata, ProtocolError> {
        Ok(TokenMetadata {
            name: "Test".into(),
            symbol: "TST".into(),
            decimals: self.decimals,
            mode: self.mode,
            owner: None,
            auditor_key_set: false,
        })
    }

    async fn underlying_decimals(&self) -> Result<Option<u32>, ProtocolError> {
        Ok(self.underlying_decimals)
    }

    async fn underlying_balance(&self) -> Result<Amount, ProtocolError> {
        self.calls.lock().underlying_balance += 1;
        Ok(Amount::from(1_000u64))
    }
}

#[derive(Default)]
struct RecordingWatcher {
    tracked: Mutex<Vec<(OperationKind, TxHash)>>,
}

impl ConfirmationWatcher for RecordingWatcher {
    fn track(&self, kind: OperationKind, tx_hash: &TxHash) {
        self.tracked.lock().push((kind, *tx_hash));
    }
}

fn alice() -> Address {
    Address::from_bytes([0xa1; 20])
}

fn bob() -> Address {
    Address::from_bytes([0xb0; 20])
}

fn setup(
    client: ScriptedClient,
) -> (Arc<ScriptedClient>, Arc<RecordingWatcher>, OperationController) {
    let client = Arc::new(client);
    let watcher = Arc::new(RecordingWatcher::default());
    let controller = OperationController::new(
        Orchestrator::new(client.clone()),
        watcher.clone(),
    );
    (client, watcher, controller)
}

// ---------------------------------------------------------------------------
// Preconditions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn transfer_to_unregistered_recipient_never_submits() {
    let (client, watcher, controller) =
        setup(ScriptedClient::new(EercMode::Standalone).with_registered(alice()));
    let ctx = SessionContext::connected(alice());

    let err = controller.transfer(&ctx, &bob(), "1.5").await.unwrap_err();

    assert_eq!(err, OperationError::RecipientNotRegistered(bob()));
    assert!(err.is_precondition());
    assert_eq!(client.calls().transfer, 0);
    assert_eq!(client.calls().encrypted_balance, 0);
    assert!(watcher.tracked.lock().is_empty());

    let history = controller.history();
    assert_eq!(history.len(), 1);
    assert!(matches!(history[0].status, OperationStatus::Failed(_)));
}

#[tokio::test]
async fn failed_recipient_lookup_is_reported_before_submission() {
    let (client, watcher, controller) =
        setup(ScriptedClient::new(EercMode::Standalone).with_registered(alice()));
    let ctx = SessionContext::connected(alice());
    *client.fail_lookup.lock() = Some(ProtocolError::Transport("rpc unreachable".into()));

    let err = controller.transfer(&ctx, &bob(), "1").await.unwrap_err();

    assert_eq!(
        err,
        OperationError::Lookup(ProtocolError::Transport("rpc unreachable".into()))
    );
    assert!(err.is_precondition());
    assert_eq!(client.calls().delegates(), 0);
    assert!(watcher.tracked.lock().is_empty());
}

#[tokio::test]
async fn disconnected_session_rejects_everything() {
    let (client, _, controller) = setup(ScriptedClient::new(EercMode::Standalone));
    let ctx = SessionContext::disconnected();
    let one = Amount::from(100u64);

    assert_eq!(controller.register(&ctx).await.unwrap_err(), OperationError::NotConnected);
    assert_eq!(controller.generate_key(&ctx).await.unwrap_err(), OperationError::NotConnected);
    assert_eq!(controller.mint(&ctx, &one).await.unwrap_err(), OperationError::NotConnected);
    assert_eq!(controller.burn(&ctx, &one).await.unwrap_err(), OperationError::NotConnected);
    assert_eq!(
        controller.transfer(&ctx, &bob(), "1").await.unwrap_err(),
        OperationError::NotConnected
    );
    assert_eq!(controller.deposit(&ctx, "1").await.unwrap_err(), OperationError::NotConnected);
    assert_eq!(controller.withdraw(&ctx, "1").await.unwrap_err(), OperationError::NotConnected);

    assert_eq!(client.calls().delegates(), 0);
}

#[tokio::test]
async fn mint_needs_an_account() {
    let (client, _, controller) = setup(ScriptedClient::new(EercMode::Standalone));
    let ctx = SessionContext::connected_without_account();

    let err = controller.mint(&ctx, &Amount::from(1u64)).await.unwrap_err();
    assert_eq!(err, OperationError::MissingAccount);
    assert_eq!(client.calls().mint, 0);
}

#[tokio::test]
async fn register_twice_is_rejected() {
    let (client, _, controller) =
        setup(ScriptedClient::new(EercMode::Standalone).with_registered(alice()));
    let ctx = SessionContext::connected(alice());

    let err = controller.register(&ctx).await.unwrap_err();
    assert_eq!(err, OperationError::AlreadyRegistered(alice()));
    assert_eq!(client.calls().register, 0);
}

#[tokio::test]
async fn key_generation_on_registered_account_needs_regeneration_flag() {
    let client = Arc::new(ScriptedClient::new(EercMode::Standalone).with_registered(alice()));
    let orchestrator = Orchestrator::new(client.clone());
    let ctx = SessionContext::connected(alice());

    let err = orchestrator.generate_key(&ctx, false).await.unwrap_err();
    assert_eq!(err, OperationError::KeyAlreadyAvailable);
    assert_eq!(client.calls().generate_key, 0);

    let receipt = orchestrator.generate_key(&ctx, true).await.unwrap();
    assert!(receipt.tx_hash.is_none());
    assert!(receipt.decryption_key.is_some());
    assert_eq!(client.calls().generate_key, 1);
}

#[tokio::test]
async fn malformed_amount_is_rejected_before_submission() {
    let (client, _, controller) =
        setup(ScriptedClient::new(EercMode::Standalone).with_registered(bob()));
    let ctx = SessionContext::connected(alice());

    let err = controller.transfer(&ctx, &bob(), "1.234").await.unwrap_err();
    assert!(matches!(
        err,
        OperationError::InvalidAmount(AmountError::InvalidFormat { .. })
    ));
    assert_eq!(client.calls().transfer, 0);
}

// ---------------------------------------------------------------------------
// Mode gating
// ---------------------------------------------------------------------------

#[tokio::test]
async fn standalone_rejects_deposit_and_withdraw() {
    let (client, _, controller) = setup(ScriptedClient::new(EercMode::Standalone));
    let ctx = SessionContext::connected(alice());

    for result in [
        controller.deposit(&ctx, "1").await,
        controller.withdraw(&ctx, "1").await,
    ] {
        assert!(matches!(
            result.unwrap_err(),
            OperationError::UnsupportedInMode {
                mode: EercMode::Standalone,
                ..
            }
        ));
    }
    assert_eq!(client.calls().delegates(), 0);
}

#[tokio::test]
async fn converter_rejects_mint_and_burn() {
    let (client, _, controller) = setup(ScriptedClient::new(EercMode::Converter));
    let ctx = SessionContext::connected(alice());
    let one = Amount::from(100u64);

    let err = controller.mint(&ctx, &one).await.unwrap_err();
    assert_eq!(
        err,
        OperationError::UnsupportedInMode {
            kind: OperationKind::Mint,
            mode: EercMode::Converter
        }
    );
    assert!(controller.burn(&ctx, &one).await.is_err());
    assert_eq!(client.calls().delegates(), 0);
}

// ---------------------------------------------------------------------------
// Submission & refresh
// ---------------------------------------------------------------------------

#[tokio::test]
async fn successful_mint_refreshes_exactly_once() {
    let (client, watcher, controller) = setup(ScriptedClient::new(EercMode::Standalone));
    let ctx = SessionContext::connected(alice());

    let receipt = controller.mint(&ctx, &encode("1.5").unwrap()).await.unwrap();

    assert_eq!(client.calls().mint, 1);
    assert_eq!(client.last_amount(), Some(Amount::from(150u64)));
    assert_eq!(client.calls().encrypted_balance, 1);
    assert_eq!(client.calls().underlying_balance, 0);
    assert_eq!(receipt.refresh, RefreshScope::EncryptedBalance);

    let tx_hash = receipt.tx_hash.unwrap();
    assert_eq!(*watcher.tracked.lock(), vec![(OperationKind::Mint, tx_hash)]);

    let view = controller.view();
    assert_eq!(view.pending_tx, Some(tx_hash));
    assert_eq!(view.generation, 1);
    assert_eq!(controller.history()[0].status, OperationStatus::Confirmed);
}

#[tokio::test]
async fn delegate_failure_passes_message_through_and_skips_refresh() {
    let (client, watcher, controller) = setup(ScriptedClient::new(EercMode::Standalone));
    let ctx = SessionContext::connected(alice());
    client.fail_next(ProtocolError::Rejected("insufficient balance".into()));

    let err = controller.burn(&ctx, &Amount::from(100u64)).await.unwrap_err();

    assert_eq!(
        err,
        OperationError::Delegate(ProtocolError::Rejected("insufficient balance".into()))
    );
    assert_eq!(err.to_string(), "rejected: insufficient balance");
    assert!(!err.is_precondition());
    assert_eq!(client.calls().encrypted_balance, 0);
    assert!(watcher.tracked.lock().is_empty());
    assert!(controller.view().pending_tx.is_none());
}

#[tokio::test]
async fn deposit_encodes_at_underlying_decimals_and_refreshes_both_balances() {
    let (client, _, controller) = setup(ScriptedClient::new(EercMode::Converter));
    let ctx = SessionContext::connected(alice());

    let receipt = controller.deposit(&ctx, "1.5").await.unwrap();

    let expected: BigUint = "1500000000000000000".parse().unwrap();
    assert_eq!(client.last_amount(), Some(Amount::new(expected)));
    assert_eq!(receipt.refresh, RefreshScope::AllBalances);
    assert_eq!(client.calls().encrypted_balance, 1);
    assert_eq!(client.calls().underlying_balance, 1);
    assert_eq!(controller.view().underlying_balance, Some(Amount::from(1_000u64)));
}

#[tokio::test]
async fn deposit_without_underlying_decimals_is_rejected() {
    let mut scripted = ScriptedClient::new(EercMode::Converter);
    scripted.underlying_decimals = None;
    let (client, _, controller) = setup(scripted);
    let ctx = SessionContext::connected(alice());

    let err = controller.deposit(&ctx, "1").await.unwrap_err();
    assert_eq!(err, OperationError::DecimalsUnknown { asset: "underlying" });
    assert_eq!(client.calls().deposit, 0);
}

#[tokio::test]
async fn withdraw_without_token_decimals_is_rejected() {
    let mut scripted = ScriptedClient::new(EercMode::Converter);
    scripted.decimals = None;
    let (client, _, controller) = setup(scripted);
    let ctx = SessionContext::connected(alice());

    let err = controller.withdraw(&ctx, "1").await.unwrap_err();
    assert_eq!(err, OperationError::DecimalsUnknown { asset: "token" });
    assert_eq!(client.calls().withdraw, 0);
}

#[tokio::test]
async fn confirmation_clears_only_the_pending_transaction() {
    let (_, _, controller) = setup(ScriptedClient::new(EercMode::Standalone));
    let ctx = SessionContext::connected(alice());

    let first = controller.mint(&ctx, &Amount::from(1u64)).await.unwrap();
    let second = controller.mint(&ctx, &Amount::from(2u64)).await.unwrap();
    let (first, second) = (first.tx_hash.unwrap(), second.tx_hash.unwrap());

    assert!(!controller.on_confirmation(&first, Confirmation::Included));
    assert_eq!(controller.view().pending_tx, Some(second));

    assert!(controller.on_confirmation(&second, Confirmation::Included));
    assert!(controller.view().pending_tx.is_none());
}

// ---------------------------------------------------------------------------
// Controller concurrency
// ---------------------------------------------------------------------------

#[tokio::test]
async fn second_trigger_while_in_flight_is_refused() {
    let scripted = ScriptedClient::new(EercMode::Standalone);
    let (release, gate) = oneshot::channel();
    *scripted.mint_gate.lock() = Some(gate);
    let (client, _, controller) = setup(scripted);
    let ctx = SessionContext::connected(alice());
    let amount = Amount::from(100u64);

    let (first, second) = tokio::join!(controller.mint(&ctx, &amount), async {
        while !controller.is_in_flight(OperationKind::Mint) {
            tokio::task::yield_now().await;
        }
        assert!(!controller.is_enabled(OperationKind::Mint, &ctx));
        let second = controller.mint(&ctx, &amount).await;
        let _ = release.send(());
        second
    });

    assert!(first.is_ok());
    assert_eq!(
        second.unwrap_err(),
        OperationError::AlreadyInFlight(OperationKind::Mint)
    );
    assert_eq!(client.calls().mint, 1);
    assert!(!controller.is_in_flight(OperationKind::Mint));
    // The refused trigger never became an operation.
    assert_eq!(controller.history().len(), 1);
}

#[tokio::test]
async fn different_kinds_do_not_block_each_other() {
    let scripted = ScriptedClient::new(EercMode::Standalone);
    let (release, gate) = oneshot::channel();
    *scripted.mint_gate.lock() = Some(gate);
    let (client, _, controller) = setup(scripted);
    let ctx = SessionContext::connected(alice());
    let amount = Amount::from(100u64);

    let (mint, burn) = tokio::join!(controller.mint(&ctx, &amount), async {
        while !controller.is_in_flight(OperationKind::Mint) {
            tokio::task::yield_now().await;
        }
        let burn = controller.burn(&ctx, &amount).await;
        let _ = release.send(());
        burn
    });

    assert!(mint.is_ok());
    assert!(burn.is_ok());
    assert_eq!(client.calls().mint, 1);
    assert_eq!(client.calls().burn, 1);
}

#[tokio::test]
async fn superseded_refresh_does_not_overwrite_newer_view() {
    let scripted = ScriptedClient::new(EercMode::Standalone);
    let (release, gate) = oneshot::channel();
    *scripted.read_gate.lock() = Some(gate);
    let (_, _, controller) = setup(scripted);
    let ctx = SessionContext::connected(alice());

    let (stale, fresh) = tokio::join!(
        controller.refresh(&ctx, RefreshScope::EncryptedBalance),
        async {
            tokio::task::yield_now().await;
            let fresh = controller.refresh(&ctx, RefreshScope::EncryptedBalance).await;
            let _ = release.send(());
            fresh
        }
    );

    assert_eq!(stale, Ok(false));
    assert_eq!(fresh, Ok(true));
    let view = controller.view();
    assert_eq!(view.generation, 2);
    assert_eq!(view.encrypted_balance.c1.x, BigUint::from(2u32));
}

#[tokio::test]
async fn narrower_refresh_keeps_the_fields_it_does_not_cover() {
    let scripted = ScriptedClient::new(EercMode::Converter);
    let (release, gate) = oneshot::channel();
    *scripted.read_gate.lock() = Some(gate);
    let (_, _, controller) = setup(scripted);
    let ctx = SessionContext::connected(alice());

    let (wide, narrow) = tokio::join!(
        controller.refresh(&ctx, RefreshScope::AllBalances),
        async {
            tokio::task::yield_now().await;
            let narrow = controller.refresh(&ctx, RefreshScope::EncryptedBalance).await;
            let _ = release.send(());
            narrow
        }
    );

    assert_eq!(wide, Ok(false));
    assert_eq!(narrow, Ok(true));
    let view = controller.view();
    assert_eq!(view.encrypted_balance.c1.x, BigUint::from(2u32));
    assert_eq!(view.underlying_balance, Some(Amount::from(1_000u64)));
    assert_eq!(view.generation, 2);
}

#[tokio::test]
async fn deposit_refresh_survives_an_overlapping_transfer() {
    let scripted = ScriptedClient::new(EercMode::Converter).with_registered(bob());
    let (release, gate) = oneshot::channel();
    *scripted.read_gate.lock() = Some(gate);
    let (client, _, controller) = setup(scripted);
    let ctx = SessionContext::connected(alice());

    let (deposit, transfer) = tokio::join!(controller.deposit(&ctx, "1"), async {
        while client.calls().encrypted_balance == 0 {
            tokio::task::yield_now().await;
        }
        let transfer = controller.transfer(&ctx, &bob(), "1").await;
        let _ = release.send(());
        transfer
    });

    assert!(deposit.is_ok());
    assert!(transfer.is_ok());
    assert_eq!(client.calls().underlying_balance, 1);
    let view = controller.view();
    assert_eq!(view.underlying_balance, Some(Amount::from(1_000u64)));
    // The transfer's read is the newer one for the encrypted balance.
    assert_eq!(view.encrypted_balance.c1.x, BigUint::from(2u32));
}

// ---------------------------------------------------------------------------
// Affordances
// ---------------------------------------------------------------------------

#[tokio::test]
async fn value_operations_stay_disabled_until_key_is_available() {
    let (_, _, controller) =
        setup(ScriptedClient::new(EercMode::Standalone).with_registered(alice()));
    let ctx = SessionContext::connected(alice());

    controller.load(&ctx).await.unwrap();
    let view = controller.view();
    assert!(view.registered);
    assert!(view.decrypted_balance.is_none());

    assert!(!controller.is_enabled(OperationKind::Register, &ctx));
    assert!(controller.is_enabled(OperationKind::GenerateKey, &ctx));
    assert!(!controller.is_enabled(OperationKind::Transfer, &ctx));
    assert!(!controller.is_enabled(OperationKind::Mint, &ctx));

    controller.generate_key(&ctx).await.unwrap();

    assert!(!controller.is_enabled(OperationKind::GenerateKey, &ctx));
    assert!(controller.is_enabled(OperationKind::Transfer, &ctx));
    assert!(controller.is_enabled(OperationKind::Mint, &ctx));
    assert!(!controller.is_enabled(OperationKind::Deposit, &ctx));
    assert_eq!(controller.view().decrypted_balance, Some(Amount::from(150u64)));

    assert!(!controller.is_enabled(OperationKind::Transfer, &SessionContext::disconnected()));
}
