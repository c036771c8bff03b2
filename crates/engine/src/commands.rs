//! Command structs for engine operations.
//!
//! These types group parameters for write operations (expenses and
//! settlements), keeping call sites readable and avoiding long argument
//! lists.

use crate::MoneyCents;

/// One participant's portion of an expense.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShareCmd {
    pub participant_id: i64,
    pub amount: MoneyCents,
}

impl ShareCmd {
    #[must_use]
    pub fn new(participant_id: i64, amount: MoneyCents) -> Self {
        Self {
            participant_id,
            amount,
        }
    }
}

/// Record an expense paid by `payer_id` and split into `shares`.
#[derive(Clone, Debug)]
pub struct ExpenseCmd {
    pub group_id: i64,
    pub payer_id: i64,
    pub description: String,
    pub amount: MoneyCents,
    pub shares: Vec<ShareCmd>,
}

impl ExpenseCmd {
    #[must_use]
    pub fn new(
        group_id: i64,
        payer_id: i64,
        description: impl Into<String>,
        amount: MoneyCents,
    ) -> Self {
        Self {
            group_id,
            payer_id,
            description: description.into(),
            amount,
            shares: Vec::new(),
        }
    }

    #[must_use]
    pub fn share(mut self, participant_id: i64, amount: MoneyCents) -> Self {
        self.shares.push(ShareCmd::new(participant_id, amount));
        self
    }

    #[must_use]
    pub fn shares(mut self, shares: impl IntoIterator<Item = ShareCmd>) -> Self {
        self.shares.extend(shares);
        self
    }

    /// Replaces the shares with an even split of the amount.
    ///
    /// Remainder cents go to the first participants in the given order.
    #[must_use]
    pub fn split_evenly(mut self, participants: &[i64]) -> Self {
        self.shares = participants
            .iter()
            .zip(self.amount.split_evenly(participants.len()))
            .map(|(id, amount)| ShareCmd::new(*id, amount))
            .collect();
        self
    }
}

/// Record a payment from `payer_id` to `payee_id`.
#[derive(Clone, Debug)]
pub struct SettlementCmd {
    pub payer_id: i64,
    pub payee_id: i64,
    pub amount: MoneyCents,
    pub group_id: Option<i64>,
}

impl SettlementCmd {
    #[must_use]
    pub fn new(payer_id: i64, payee_id: i64, amount: MoneyCents) -> Self {
        Self {
            payer_id,
            payee_id,
            amount,
            group_id: None,
        }
    }

    #[must_use]
    pub fn group_id(mut self, group_id: i64) -> Self {
        self.group_id = Some(group_id);
        self
    }
}

impl From<crate::SettlementSuggestion> for SettlementCmd {
    fn from(suggestion: crate::SettlementSuggestion) -> Self {
        Self::new(suggestion.payer_id, suggestion.payee_id, suggestion.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_evenly_builds_one_share_per_participant() {
        let cmd = ExpenseCmd::new(1, 1, "Dinner", MoneyCents::new(100_00)).split_evenly(&[1, 2, 3]);
        assert_eq!(
            cmd.shares,
            vec![
                ShareCmd::new(1, MoneyCents::new(33_34)),
                ShareCmd::new(2, MoneyCents::new(33_33)),
                ShareCmd::new(3, MoneyCents::new(33_33)),
            ]
        );
    }

    #[test]
    fn share_builder_appends() {
        let cmd = ExpenseCmd::new(1, 1, "Taxi", MoneyCents::new(30_00))
            .share(1, MoneyCents::new(10_00))
            .share(2, MoneyCents::new(20_00));
        assert_eq!(cmd.shares.len(), 2);
    }
}
