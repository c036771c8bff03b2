//! Net balances.
//!
//! Reduces ledger entries to one signed amount per participant: the debtor
//! of an entry goes down by its amount, the creditor goes up by the same
//! amount. Integer cents make the reduction exact, so the result does not
//! depend on the order of the entries and always sums to zero.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{EngineError, LedgerEntry, MoneyCents, ResultEngine};

/// Net position per participant id, ordered by id.
///
/// Negative values are net debtors, positive values net creditors.
/// Participants without entries are absent.
pub type Balances = BTreeMap<i64, MoneyCents>;

/// Which ledger rows an aggregation looks at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Group(i64),
    #[default]
    All,
}

impl Scope {
    /// Maps an optional group id to a scope (`None` means every group).
    pub fn from_group(group_id: Option<i64>) -> Self {
        group_id.map_or(Self::All, Self::Group)
    }

    pub fn group_id(self) -> Option<i64> {
        match self {
            Self::Group(id) => Some(id),
            Self::All => None,
        }
    }
}

/// Nets unsettled entries into per-participant balances.
///
/// Settled entries are skipped. Fails with `InvalidAmount` if a balance
/// leaves the range where it can still be negated.
pub fn net_balances<'a, I>(entries: I) -> ResultEngine<Balances>
where
    I: IntoIterator<Item = &'a LedgerEntry>,
{
    let overflow = |user_id: i64| {
        EngineError::InvalidAmount(format!("balance of user {user_id} overflows"))
    };

    let mut balances = Balances::new();
    for entry in entries.into_iter().filter(|entry| !entry.settled) {
        let debtor = balances.entry(entry.debtor_id).or_default();
        *debtor = debtor
            .checked_sub(entry.amount)
            .and_then(|b| b.checked_neg().map(|_| b))
            .ok_or_else(|| overflow(entry.debtor_id))?;

        let creditor = balances.entry(entry.creditor_id).or_default();
        *creditor = creditor
            .checked_add(entry.amount)
            .ok_or_else(|| overflow(entry.creditor_id))?;
    }
    Ok(balances)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn entry(id: i64, debtor_id: i64, creditor_id: i64, cents: i64) -> LedgerEntry {
        LedgerEntry {
            id,
            group_id: Some(1),
            expense_id: Some(1),
            settlement_id: None,
            debtor_id,
            creditor_id,
            amount: MoneyCents::new(cents),
            settled: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn empty_ledger_has_no_balances() {
        assert!(net_balances(&Vec::<LedgerEntry>::new()).unwrap().is_empty());
    }

    #[test]
    fn balances_sum_to_zero() {
        let entries = vec![
            entry(1, 2, 1, 100_00),
            entry(2, 3, 1, 100_00),
            entry(3, 1, 3, 33_33),
            entry(4, 4, 2, 1),
        ];
        let balances = net_balances(&entries).unwrap();
        assert_eq!(balances.values().sum::<MoneyCents>(), MoneyCents::ZERO);
        assert_eq!(balances[&1], MoneyCents::new(166_67));
        assert_eq!(balances[&2], MoneyCents::new(-99_99));
        assert_eq!(balances[&3], MoneyCents::new(-66_67));
        assert_eq!(balances[&4], MoneyCents::new(-1));
    }

    #[test]
    fn order_of_entries_does_not_matter() {
        let entries = vec![
            entry(1, 2, 1, 12_34),
            entry(2, 1, 3, 5_01),
            entry(3, 3, 2, 7_77),
        ];
        let mut reversed = entries.clone();
        reversed.reverse();
        assert_eq!(
            net_balances(&entries).unwrap(),
            net_balances(&reversed).unwrap()
        );
    }

    #[test]
    fn settled_entries_are_ignored() {
        let mut settled = entry(1, 2, 1, 50_00);
        settled.settled = true;
        let entries = vec![settled, entry(2, 3, 1, 10_00)];
        let balances = net_balances(&entries).unwrap();
        assert!(!balances.contains_key(&2));
        assert_eq!(balances[&1], MoneyCents::new(10_00));
    }

    #[test]
    fn overflowing_balance_is_an_error() {
        let entries = vec![entry(1, 2, 1, i64::MAX), entry(2, 3, 1, 1)];
        assert!(matches!(
            net_balances(&entries).unwrap_err(),
            EngineError::InvalidAmount(_)
        ));

        let entries = vec![entry(1, 2, 1, i64::MAX), entry(2, 2, 3, 1)];
        assert!(matches!(
            net_balances(&entries).unwrap_err(),
            EngineError::InvalidAmount(_)
        ));
    }

    #[test]
    fn scope_maps_optional_group() {
        assert_eq!(Scope::from_group(None), Scope::All);
        assert_eq!(Scope::from_group(Some(4)), Scope::Group(4));
        assert_eq!(Scope::Group(4).group_id(), Some(4));
    }
}
