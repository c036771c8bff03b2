//! JSON payloads of the HTTP API.
//!
//! Money is always carried as integer minor units (`*_minor`, cents).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct UserNew {
        pub name: String,
        pub email: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: i64,
        pub name: String,
        pub email: String,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserStats {
        pub total_you_owe_minor: i64,
        pub total_owed_to_you_minor: i64,
        pub active_groups: u64,
    }
}

pub mod group {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct GroupNew {
        pub name: String,
        /// Defaults to the `x-actor-id` header when omitted.
        pub created_by: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct MemberAdd {
        pub group_id: i64,
        pub email: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupList {
        pub user_id: i64,
    }

    /// Role of a user in a group.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum MemberRole {
        Admin,
        Member,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberView {
        pub user_id: i64,
        pub name: String,
        pub email: String,
        pub role: MemberRole,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupView {
        pub id: i64,
        pub name: String,
        pub created_by: i64,
        pub created_at: DateTime<Utc>,
        pub members: Vec<MemberView>,
    }
}

pub mod expense {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct ShareNew {
        pub participant_id: i64,
        pub amount_minor: i64,
    }

    /// New expense. Either `shares` or `split_between` must be given:
    /// `split_between` divides the amount evenly.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct ExpenseNew {
        pub group_id: i64,
        /// Defaults to the `x-actor-id` header when omitted.
        pub payer_id: Option<i64>,
        pub description: String,
        pub amount_minor: i64,
        #[serde(default)]
        pub shares: Vec<ShareNew>,
        #[serde(default)]
        pub split_between: Vec<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseList {
        pub group_id: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ShareView {
        pub participant_id: i64,
        pub participant_name: String,
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: i64,
        pub group_id: i64,
        pub payer_id: i64,
        pub payer_name: String,
        pub description: String,
        pub amount_minor: i64,
        pub created_at: DateTime<Utc>,
        pub shares: Vec<ShareView>,
    }
}

pub mod balance {
    use super::*;

    /// Query of the read endpoints. No `group_id` means every group.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ScopeQuery {
        pub group_id: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceView {
        pub user_id: i64,
        pub name: String,
        pub balance_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalancesResponse {
        pub group_id: Option<i64>,
        pub balances: Vec<BalanceView>,
    }
}

pub mod settlement {
    use super::*;

    /// One suggested transfer. `group_id` is the group the plan was computed
    /// for; send it back with `SettlementNew` so the payment nets out of that
    /// group's balances.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SuggestionView {
        pub group_id: Option<i64>,
        pub payer_id: i64,
        pub payer_name: String,
        pub payee_id: i64,
        pub payee_name: String,
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct SettlementNew {
        /// Defaults to the `x-actor-id` header when omitted.
        pub payer_id: Option<i64>,
        pub payee_id: i64,
        pub amount_minor: i64,
        /// Without a group the payment only shows up in the all-groups view.
        pub group_id: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettlementView {
        pub id: i64,
        pub payer_id: i64,
        pub payee_id: i64,
        pub amount_minor: i64,
        pub group_id: Option<i64>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GraphNodeView {
        pub id: i64,
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GraphLinkView {
        pub source: i64,
        pub target: i64,
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GraphView {
        pub nodes: Vec<GraphNodeView>,
        pub links: Vec<GraphLinkView>,
    }
}

pub mod ledger {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct EntryList {
        pub group_id: Option<i64>,
        pub include_settled: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct EntryUpdate {
        pub settled: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EntryView {
        pub id: i64,
        pub group_id: Option<i64>,
        pub expense_id: Option<i64>,
        pub settlement_id: Option<i64>,
        pub debtor_id: i64,
        pub creditor_id: i64,
        pub amount_minor: i64,
        pub settled: bool,
        pub created_at: DateTime<Utc>,
    }
}

pub mod audit {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AuditQuery {
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AuditView {
        pub action: String,
        pub entity: String,
        pub entity_id: i64,
        pub actor_id: Option<i64>,
        pub details: serde_json::Value,
        pub timestamp: DateTime<Utc>,
    }
}
