//! Shared-expense debt ledger and settlement engine.
//!
//! The [`Engine`] records expenses as double-entry [`LedgerEntry`] rows,
//! nets the open entries into per-participant [`Balances`] and plans the
//! transfers that clear them ([`SettlementSuggestion`]). Recorded
//! [`Settlement`]s are booked back into the ledger so that later plans do not
//! suggest debts that were already paid.

pub use audit::{AuditAction, AuditEvent, AuditSink, DbAuditSink, EntityKind, LogAuditSink};
pub use balances::{Balances, Scope, net_balances};
pub use commands::{ExpenseCmd, SettlementCmd, ShareCmd};
pub use directory::{GroupDetail, NameDirectory, UserStats};
pub use error::EngineError;
pub use expenses::{Expense, ExpenseDetail, ExpenseShare, Participant, ShareDetail};
pub use graph::{DebtGraph, GraphLink, GraphNode, project_graph};
pub use group_members::{GroupMember, MemberRole};
pub use groups::Group;
pub use ledger_entries::LedgerEntry;
pub use money::MoneyCents;
pub use ops::{Engine, EngineBuilder};
pub use settlement_plan::{SETTLEMENT_EPSILON, SettlementSuggestion, plan_from_balances};
pub use settlements::Settlement;
pub use users::User;

mod audit;
mod audit_logs;
mod balances;
mod commands;
mod directory;
mod error;
mod expense_shares;
mod expenses;
mod graph;
mod group_members;
mod groups;
mod ledger_entries;
mod money;
mod ops;
mod settlement_plan;
mod settlements;
mod users;

type ResultEngine<T> = Result<T, EngineError>;
