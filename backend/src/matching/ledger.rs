//! Quantity-delta ledger for one matching pass
//!
//! The engine records every applied quantity change here before moving on.
//! If the pass fails, `roll_back` reverses the recorded deltas through the
//! same public mutators the forward path used, restoring every touched
//! entity to its pre-pass quantities. Commit is a flag flip: once
//! committed, the ledger refuses to roll back and the deltas stand as the
//! record of what happened.
//!
//! The ledger holds entity ids, not references; entities must outlive the
//! pass (they live in [`ReliefState`], which the caller owns).
//!
//! [`ReliefState`]: crate::models::ReliefState

use uuid::Uuid;

use crate::models::state::ReliefState;

/// Reversible record of the quantity changes applied by one matching pass
#[derive(Debug, Default)]
pub struct MatchLedger {
    /// (supply id, units deducted), in application order
    supply_deltas: Vec<(Uuid, u32)>,

    /// (need id, units fulfilled), in application order
    need_deltas: Vec<(Uuid, u32)>,

    committed: bool,
}

impl MatchLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a committed-pending deduction of `quantity` from a supply
    pub fn record_supply_deduction(&mut self, supply_id: Uuid, quantity: u32) {
        self.supply_deltas.push((supply_id, quantity));
    }

    /// Record `quantity` units of fulfillment applied to a need
    pub fn record_need_fulfillment(&mut self, need_id: Uuid, quantity: u32) {
        self.need_deltas.push((need_id, quantity));
    }

    /// Make the recorded deltas permanent; rollback becomes a no-op
    pub fn commit(&mut self) {
        self.committed = true;
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// Deltas recorded against supplies, in application order
    pub fn supply_deltas(&self) -> &[(Uuid, u32)] {
        &self.supply_deltas
    }

    /// Deltas recorded against needs, in application order
    pub fn need_deltas(&self) -> &[(Uuid, u32)] {
        &self.need_deltas
    }

    /// Reverse every recorded delta, newest first
    ///
    /// A forward slice nets to `available -= q` with `reserved` unchanged
    /// (reserve then deduct), so the reverse is `add_stock(q)` plus a
    /// release of any reservation remnant; the release is usually a no-op
    /// and its result is ignored. No-op after commit.
    pub fn roll_back(&mut self, state: &mut ReliefState) {
        if self.committed {
            return;
        }

        for (need_id, quantity) in self.need_deltas.drain(..).rev() {
            if let Some(need) = state.get_need_mut(&need_id) {
                need.revert_fulfilled(quantity);
            }
        }

        for (supply_id, quantity) in self.supply_deltas.drain(..).rev() {
            if let Some(supply) = state.get_supply_mut(&supply_id) {
                supply.add_stock(quantity);
                let _ = supply.release_reservation(quantity);
            }
        }
    }
}
