//! Receipt watching for the simulated chain.
//!
//! Transactions are final the moment they are included, so the watcher
//! only has to remember what it was asked to track and look the receipts
//! up when drained.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use eerc_client::operations::{Confirmation, ConfirmationWatcher, OperationKind, TxHash};

use crate::simulator::EercSimulator;

pub struct SimulatedWatcher {
    chain: Arc<EercSimulator>,
    tracked: Mutex<Vec<(OperationKind, TxHash)>>,
}

impl SimulatedWatcher {
    pub fn new(chain: Arc<EercSimulator>) -> Self {
        Self {
            chain,
            tracked: Mutex::new(Vec::new()),
        }
    }

    /// Number of transactions waiting for [`drain`](Self::drain).
    pub fn pending(&self) -> usize {
        self.tracked.lock().len()
    }

    /// Resolves every tracked transaction against the chain's receipts.
    pub fn drain(&self) -> Vec<(TxHash, Confirmation)> {
        let tracked = std::mem::take(&mut *self.tracked.lock());
        tracked
            .into_iter()
            .map(|(kind, tx_hash)| {
                let outcome = match self.chain.receipt(&tx_hash) {
                    Some(receipt) => {
                        debug!(kind = %kind, tx_hash = %tx_hash, block = receipt.block, "Receipt found");
                        Confirmation::Included
                    }
                    None => Confirmation::Reverted("no receipt for transaction".to_string()),
                };
                (tx_hash, outcome)
            })
            .collect()
    }
}

impl ConfirmationWatcher for SimulatedWatcher {
    fn track(&self, kind: OperationKind, tx_hash: &TxHash) {
        self.tracked.lock().push((kind, *tx_hash));
    }
}
