//! Greedy debt simplification.
//!
//! Turns net balances into a short list of transfers that clears them. This
//! is the classic cash-flow minimization heuristic: repeatedly match the
//! largest outstanding debt with the largest outstanding credit. It does not
//! guarantee the minimum number of transfers, but it never emits more than
//! `debtors + creditors - 1` of them.
//!
//! Suggestions are advisory. They reflect the balances at the time they were
//! computed and must be recomputed before acting on them once new expenses or
//! settlements were recorded.

use serde::{Deserialize, Serialize};

use crate::{Balances, MoneyCents};

/// Tolerance below which a balance counts as settled (one cent).
pub const SETTLEMENT_EPSILON: MoneyCents = MoneyCents::new(1);

/// A proposed transfer: `payer_id` should pay `payee_id` `amount`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementSuggestion {
    pub payer_id: i64,
    pub payee_id: i64,
    pub amount: MoneyCents,
}

#[derive(Clone, Copy, Debug)]
struct Position {
    id: i64,
    balance: MoneyCents,
}

fn within_epsilon(amount: MoneyCents) -> bool {
    amount.abs() <= SETTLEMENT_EPSILON
}

/// Plans the transfers that clear `balances`.
///
/// Debtors are visited from the largest debt down, creditors from the largest
/// credit down; equal balances keep ascending id order. Each step moves
/// `min(|debt|, credit)` and advances whichever side reached zero (both on a
/// tie). Balances within [`SETTLEMENT_EPSILON`] of zero are ignored.
pub fn plan_from_balances(balances: &Balances) -> Vec<SettlementSuggestion> {
    let mut debtors: Vec<Position> = balances
        .iter()
        .filter(|(_, balance)| **balance < -SETTLEMENT_EPSILON)
        .map(|(id, balance)| Position {
            id: *id,
            balance: *balance,
        })
        .collect();
    let mut creditors: Vec<Position> = balances
        .iter()
        .filter(|(_, balance)| **balance > SETTLEMENT_EPSILON)
        .map(|(id, balance)| Position {
            id: *id,
            balance: *balance,
        })
        .collect();

    debtors.sort_by(|a, b| a.balance.cmp(&b.balance).then(a.id.cmp(&b.id)));
    creditors.sort_by(|a, b| b.balance.cmp(&a.balance).then(a.id.cmp(&b.id)));

    let mut suggestions = Vec::with_capacity((debtors.len() + creditors.len()).saturating_sub(1));
    let (mut i, mut j) = (0, 0);

    while i < debtors.len() && j < creditors.len() {
        let debtor = &mut debtors[i];
        let creditor = &mut creditors[j];

        let amount = debtor.balance.abs().min(creditor.balance);
        suggestions.push(SettlementSuggestion {
            payer_id: debtor.id,
            payee_id: creditor.id,
            amount,
        });

        debtor.balance += amount;
        creditor.balance -= amount;

        if within_epsilon(debtor.balance) {
            i += 1;
        }
        if within_epsilon(creditor.balance) {
            j += 1;
        }
    }

    suggestions
}
