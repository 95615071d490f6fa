//! Client-side UTXO selection.
//!
//! Selection is a set of `txid:vout` keys held by the console. It is never
//! communicated to the node, so it can go stale: [`UtxoSelection::resolve`]
//! matches it against a fresh `listunspent` and drops what is gone.

use std::collections::BTreeSet;

use bitcoin::Amount;

use crate::wallet::model::{OutPoint, UnspentOutput};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UtxoSelection {
    selected: BTreeSet<OutPoint>,
}

impl UtxoSelection {
    pub fn contains(&self, outpoint: &OutPoint) -> bool {
        self.selected.contains(outpoint)
    }

    /// Keep only outpoints still present in `utxos`; returns the dropped ones.
    pub fn resolve(&mut self, utxos: &[UnspentOutput]) -> Vec<OutPoint> {
        let current: BTreeSet<OutPoint> = utxos.iter().map(UnspentOutput::outpoint).collect();
        let stale: Vec<OutPoint> = self.selected.difference(&current).cloned().collect();
        for outpoint in &stale {
            self.selected.remove(outpoint);
        }
        if !stale.is_empty() {
            tracing::debug!(dropped = stale.len(), "Dropped spent outputs from selection");
        }
        stale
    }

    /// Sum of selected amounts found in `utxos`; `None` on overflow.
    pub fn total(&self, utxos: &[UnspentOutput]) -> Option<Amount> {
        utxos
            .iter()
            .filter(|utxo| self.selected.contains(&utxo.outpoint()))
            .try_fold(Amount::ZERO, |acc, utxo| acc.checked_add(utxo.amount))
    }
}

impl FromIterator<OutPoint> for UtxoSelection {
    fn from_iter<I: IntoIterator<Item = OutPoint>>(iter: I) -> Self {
        Self {
            selected: iter.into_iter().collect(),
        }
    }
}
