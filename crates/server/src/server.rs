use axum::{
    Router,
    routing::{get, patch, post},
};
use axum_extra::headers::{Error as AxumError, Header};

use std::{net::SocketAddr, sync::Arc};

use crate::{audit, balances, expenses, groups, ledger, settlements, users};
use engine::Engine;

static ACTOR_HEADER: axum::http::HeaderName = axum::http::HeaderName::from_static("x-actor-id");

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// `TypedHeader` for the calling user.
///
/// Optional on every route. When present it is recorded as the audit actor
/// and used as the default payer/creator of write requests.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ActorHeader(pub i64);

impl Header for ActorHeader {
    fn name() -> &'static axum::http::HeaderName {
        &ACTOR_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
    where
        Self: Sized,
        I: Iterator<Item = &'i axum::http::HeaderValue>,
    {
        let value = values.next().ok_or_else(AxumError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(AxumError::invalid());
        };
        let Ok(value) = value.trim().parse() else {
            return Err(AxumError::invalid());
        };

        Ok(ActorHeader(value))
    }

    fn encode<E: Extend<axum::http::HeaderValue>>(&self, values: &mut E) {
        values.extend(std::iter::once(axum::http::HeaderValue::from(self.0)));
    }
}

pub fn router(engine: Engine) -> Router {
    let state = ServerState {
        engine: Arc::new(engine),
    };

    Router::new()
        .route("/users", post(users::user_new).get(users::list))
        .route("/users/{id}/stats", get(users::stats))
        .route("/groups", post(groups::group_new).get(groups::list))
        .route("/groups/add-member", post(groups::add_member))
        .route("/expenses", post(expenses::expense_new).get(expenses::list))
        .route("/balances", get(balances::get))
        .route("/settlements", post(settlements::settlement_new).get(settlements::list))
        .route("/settlements/simplify", get(settlements::simplify))
        .route("/settlements/graph", get(settlements::graph))
        .route("/ledger", get(ledger::list))
        .route("/ledger/{id}", patch(ledger::update))
        .route("/audit", get(audit::recent))
        .with_state(state)
}

pub async fn run(engine: Engine, addr: SocketAddr) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(engine)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
