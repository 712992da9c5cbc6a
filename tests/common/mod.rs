#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use serde_json::json;
use url::Url;
use username_scout::config::Config;
use username_scout::infrastructure::persistence::{
    Database, SqliteAvailableRepository, SqliteHistoryRepository,
};
use username_scout::infrastructure::remote::ProbeSettings;
use username_scout::state::{AppState, SqliteLedger};
use username_scout::application::services::LedgerService;

pub const LOOKUP_PATH: &str = "/api/v1/users/web_profile_info/";

pub async fn test_db() -> Arc<Database> {
    Arc::new(Database::in_memory().await.unwrap())
}

pub fn ledger_on(db: &Arc<Database>) -> SqliteLedger {
    LedgerService::new(
        Arc::new(SqliteAvailableRepository::new(Arc::clone(db))),
        Arc::new(SqliteHistoryRepository::new(Arc::clone(db))),
    )
}

pub fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// How the stub answers `GET /{username}/`.
#[derive(Clone)]
pub enum Page {
    Missing,
    Profile,
    SoftMissing,
    RateLimited,
    ServerError,
    LoginWall,
    Slow(Duration),
}

/// How the stub answers the structured lookup for a username.
#[derive(Clone)]
pub enum Lookup {
    User(&'static str),
    NoUser,
    Status(u16),
    Fail(&'static str),
    LoginRedirect,
}

/// In-process stand-in for the remote platform.
#[derive(Default)]
pub struct StubPlatform {
    pages: HashMap<String, Page>,
    lookups: HashMap<String, Lookup>,
}

pub struct RunningStub {
    pub addr: SocketAddr,
    pub page_hits: Arc<AtomicUsize>,
    pub lookup_hits: Arc<AtomicUsize>,
}

impl RunningStub {
    pub fn base_url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    pub fn lookup_url(&self) -> String {
        format!("http://{}{}", self.addr, LOOKUP_PATH)
    }

    pub fn page_hits(&self) -> usize {
        self.page_hits.load(Ordering::SeqCst)
    }

    pub fn lookup_hits(&self) -> usize {
        self.lookup_hits.load(Ordering::SeqCst)
    }

    pub fn probe_settings(&self, session_id: Option<&str>) -> ProbeSettings {
        ProbeSettings {
            base_url: Url::parse(&self.base_url()).unwrap(),
            lookup_url: Url::parse(&self.lookup_url()).unwrap(),
            session_id: session_id.map(str::to_string),
            connect_timeout: Duration::from_secs(2),
            timeout: Duration::from_secs(2),
            soft_404_check: true,
            max_requests_per_second: None,
        }
    }

    /// Configuration pointing at this stub, with pacing turned off.
    pub fn config(&self, session_id: Option<&str>) -> Config {
        Config {
            database_url: "sqlite::memory:".to_string(),
            platform_base_url: self.base_url(),
            platform_lookup_url: self.lookup_url(),
            platform_session_id: session_id.map(str::to_string),
            probe_connect_timeout: 2,
            probe_timeout: 2,
            batch_concurrency: 3,
            batch_intra_delay_ms: 0,
            batch_intra_jitter_ms: 0,
            batch_backoff_ms: 0,
            batch_backoff_jitter_ms: 0,
            ..Config::default()
        }
    }
}

struct StubState {
    pages: HashMap<String, Page>,
    lookups: HashMap<String, Lookup>,
    page_hits: Arc<AtomicUsize>,
    lookup_hits: Arc<AtomicUsize>,
}

impl StubPlatform {
    pub fn page(mut self, username: &str, page: Page) -> Self {
        self.pages.insert(username.to_string(), page);
        self
    }

    pub fn lookup(mut self, username: &str, lookup: Lookup) -> Self {
        self.lookups.insert(username.to_string(), lookup);
        self
    }

    pub async fn spawn(self) -> RunningStub {
        let page_hits = Arc::new(AtomicUsize::new(0));
        let lookup_hits = Arc::new(AtomicUsize::new(0));

        let state = Arc::new(StubState {
            pages: self.pages,
            lookups: self.lookups,
            page_hits: Arc::clone(&page_hits),
            lookup_hits: Arc::clone(&lookup_hits),
        });

        let app = Router::new()
            .route(LOOKUP_PATH, get(lookup_handler))
            .route("/accounts/login/", get(|| async { "Log in to continue" }))
            .route("/{username}/", get(page_handler))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        RunningStub {
            addr,
            page_hits,
            lookup_hits,
        }
    }
}

async fn page_handler(
    State(state): State<Arc<StubState>>,
    Path(username): Path<String>,
) -> Response {
    state.page_hits.fetch_add(1, Ordering::SeqCst);

    match state.pages.get(&username).cloned().unwrap_or(Page::Missing) {
        Page::Missing => (StatusCode::NOT_FOUND, "Page Not Found").into_response(),
        Page::Profile => (
            StatusCode::OK,
            format!("<html><title>@{username} profile</title></html>"),
        )
            .into_response(),
        Page::SoftMissing => (
            StatusCode::OK,
            "<html><h2>Sorry, this page isn't available. User not found.</h2></html>",
        )
            .into_response(),
        Page::RateLimited => StatusCode::TOO_MANY_REQUESTS.into_response(),
        Page::ServerError => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        Page::LoginWall => Redirect::temporary("/accounts/login/").into_response(),
        Page::Slow(delay) => {
            tokio::time::sleep(delay).await;
            (StatusCode::OK, "late profile").into_response()
        }
    }
}

async fn lookup_handler(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.lookup_hits.fetch_add(1, Ordering::SeqCst);

    let has_session = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("sessionid="));
    if !has_session {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let username = query.get("username").cloned().unwrap_or_default();
    match state.lookups.get(&username).cloned().unwrap_or(Lookup::NoUser) {
        Lookup::User(id) => axum::Json(json!({
            "data": { "user": { "id": id, "username": username } },
            "status": "ok"
        }))
        .into_response(),
        Lookup::NoUser => axum::Json(json!({ "data": { "user": null }, "status": "ok" })).into_response(),
        Lookup::Status(code) => StatusCode::from_u16(code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            .into_response(),
        Lookup::Fail(message) => {
            axum::Json(json!({ "message": message, "status": "fail" })).into_response()
        }
        Lookup::LoginRedirect => Redirect::to("/accounts/login/").into_response(),
    }
}

/// Builds the full service graph against a stub and a private database.
pub async fn app_state(stub: &RunningStub, session_id: Option<&str>) -> AppState {
    let db = test_db().await;
    username_scout::runtime::bootstrap_with(stub.config(session_id), db).unwrap()
}
