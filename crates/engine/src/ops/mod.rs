use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{AuditEvent, AuditSink, EngineError, LogAuditSink, ResultEngine};

mod access;
mod audit;
mod expenses;
mod groups;
mod ledger;
mod settlements;
mod users;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    audit: Arc<dyn AuditSink>,
    reconcile_settlements: bool,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Whether recorded settlements are booked back into the ledger.
    pub fn reconciles_settlements(&self) -> bool {
        self.reconcile_settlements
    }

    /// Hands an event to the audit sink. Never fails the caller.
    fn audit(&self, event: AuditEvent) {
        self.audit.emit(event);
    }
}

fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

fn normalize_email(value: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    let valid = trimmed
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
    if !valid {
        return Err(EngineError::InvalidInput(format!(
            "invalid email: {trimmed}"
        )));
    }
    Ok(trimmed.to_lowercase())
}

/// The builder for `Engine`
pub struct EngineBuilder {
    database: DatabaseConnection,
    audit: Arc<dyn AuditSink>,
    reconcile_settlements: bool,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            database: DatabaseConnection::default(),
            audit: Arc::new(LogAuditSink),
            reconcile_settlements: true,
        }
    }
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Replace the default (log-only) audit sink.
    pub fn audit_sink(mut self, sink: Arc<dyn AuditSink>) -> EngineBuilder {
        self.audit = sink;
        self
    }

    /// Book recorded settlements back into the ledger (default `true`).
    pub fn reconcile_settlements(mut self, enabled: bool) -> EngineBuilder {
        self.reconcile_settlements = enabled;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            audit: self.audit,
            reconcile_settlements: self.reconcile_settlements,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_trimmed_and_required() {
        assert_eq!(normalize_required_name("  Trip ", "group").unwrap(), "Trip");
        assert_eq!(
            normalize_required_name("   ", "group").unwrap_err(),
            EngineError::InvalidInput("group name must not be empty".to_string())
        );
    }

    #[test]
    fn emails_are_lowercased_and_checked() {
        assert_eq!(
            normalize_email(" Alice@Example.com ").unwrap(),
            "alice@example.com"
        );
        assert!(normalize_email("alice").is_err());
        assert!(normalize_email("@example.com").is_err());
        assert!(normalize_email("alice@").is_err());
    }
}
