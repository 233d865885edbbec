//! HTTP front end for the coach: `POST /chat` with cookie-keyed sessions.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::coach::Coach;
use crate::state::{ChatResponse, SessionState};

pub const SESSION_COOKIE: &str = "coach_session";

// Sessions idle longer than this are dropped on the next write
const SESSION_IDLE_TTL: Duration = Duration::from_secs(60 * 60);
const MAX_SESSIONS: usize = 10_000;

struct Session {
    state: SessionState,
    last_seen: Instant,
}

pub struct AppState {
    coach: Coach,
    sessions: RwLock<HashMap<String, Session>>,
    idle_ttl: Duration,
    max_sessions: usize,
}

type AppStateArc = Arc<AppState>;

impl AppState {
    pub fn new() -> Result<Self> {
        Self::with_limits(SESSION_IDLE_TTL, MAX_SESSIONS)
    }

    /// Session store that forgets idle sessions and holds at most `max_sessions`.
    pub fn with_limits(idle_ttl: Duration, max_sessions: usize) -> Result<Self> {
        Ok(Self {
            coach: Coach::new()?,
            sessions: RwLock::new(HashMap::new()),
            idle_ttl,
            max_sessions: max_sessions.max(1),
        })
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Drop expired sessions, then the least recently seen ones until `incoming` fits.
fn evict(sessions: &mut HashMap<String, Session>, incoming: &str, idle_ttl: Duration, max: usize) {
    let before = sessions.len();
    sessions.retain(|id, s| id == incoming || s.last_seen.elapsed() < idle_ttl);

    while !sessions.contains_key(incoming) && sessions.len() >= max {
        let oldest = sessions
            .iter()
            .min_by_key(|(_, s)| s.last_seen)
            .map(|(id, _)| id.clone());
        match oldest {
            Some(id) => {
                sessions.remove(&id);
            }
            None => break,
        }
    }

    let dropped = before.saturating_sub(sessions.len());
    if dropped > 0 {
        debug!("  Evicted {} sessions", dropped);
    }
}

pub fn router(state: AppStateArc) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/health", get(health))
        .with_state(state)
}

/// Serve until the listener fails or ctrl-c is received.
pub async fn serve(listener: TcpListener) -> Result<()> {
    let state = Arc::new(AppState::new()?);
    info!("Research coach listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down gracefully");
        })
        .await?;
    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

async fn chat(
    State(state): State<AppStateArc>,
    jar: CookieJar,
    body: Bytes,
) -> Result<(CookieJar, Json<ChatResponse>), (StatusCode, String)> {
    // Parse regardless of Content-Type; a missing or non-string message is empty
    let data: Value = serde_json::from_slice(&body).map_err(|e| {
        warn!("  Rejected chat body: {}", e);
        (StatusCode::BAD_REQUEST, format!("invalid JSON body: {}", e))
    })?;
    let message = data.get("message").and_then(Value::as_str).unwrap_or("").trim();

    let (session_id, jar) = match jar.get(SESSION_COOKIE) {
        Some(cookie) => (cookie.value().to_string(), jar),
        None => {
            let id = uuid::Uuid::new_v4().to_string();
            debug!("  New session {}", id);
            let cookie = Cookie::build((SESSION_COOKIE, id.clone())).path("/").http_only(true);
            (id, jar.add(cookie))
        }
    };

    // One guard for the whole read-modify-write so overlapping requests don't drop updates
    let mut sessions = state.sessions.write().await;
    evict(&mut sessions, &session_id, state.idle_ttl, state.max_sessions);

    let current = sessions
        .get(&session_id)
        .map(|s| s.state.clone())
        .unwrap_or_default();
    let (reply, next) = state.coach.handle_message(message, current);
    sessions.insert(
        session_id,
        Session {
            state: next.clone(),
            last_seen: Instant::now(),
        },
    );
    drop(sessions);

    Ok((jar, Json(ChatResponse { reply, state: next })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(message: &str) -> Bytes {
        Bytes::from(serde_json::json!({ "message": message }).to_string())
    }

    fn jar_for(id: &str) -> CookieJar {
        CookieJar::new().add(Cookie::new(SESSION_COOKIE, id.to_string()))
    }

    #[tokio::test]
    async fn test_cookieless_requests_stay_within_capacity() {
        let state = Arc::new(AppState::with_limits(SESSION_IDLE_TTL, 8).unwrap());
        for _ in 0..50 {
            let (jar, _) = chat(State(state.clone()), CookieJar::new(), body("hi")).await.unwrap();
            assert!(jar.get(SESSION_COOKIE).is_some());
        }
        assert_eq!(state.session_count().await, 8);
    }

    #[tokio::test]
    async fn test_idle_sessions_expire() {
        let state = Arc::new(AppState::with_limits(Duration::ZERO, 100).unwrap());
        for _ in 0..20 {
            chat(State(state.clone()), CookieJar::new(), body("hi")).await.unwrap();
        }
        assert_eq!(state.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_active_session_survives_eviction() {
        let state = Arc::new(AppState::with_limits(SESSION_IDLE_TTL, 2).unwrap());
        chat(State(state.clone()), jar_for("keep"), body("set topic: bees")).await.unwrap();
        for _ in 0..5 {
            chat(State(state.clone()), CookieJar::new(), body("hi")).await.unwrap();
            // Touching it keeps it the most recently seen
            chat(State(state.clone()), jar_for("keep"), body("hi")).await.unwrap();
        }
        let (_, Json(response)) = chat(State(state.clone()), jar_for("keep"), body("show session"))
            .await
            .unwrap();
        assert_eq!(response.state.topic.as_deref(), Some("bees"));
    }

    #[tokio::test]
    async fn test_overlapping_notes_are_all_kept() {
        let state = Arc::new(AppState::new().unwrap());
        let tasks: Vec<_> = (0..20)
            .map(|i| {
                let state = state.clone();
                tokio::spawn(async move {
                    chat(State(state), jar_for("shared"), body(&format!("save note: n{}", i))).await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let (_, Json(response)) = chat(State(state.clone()), jar_for("shared"), body("show session"))
            .await
            .unwrap();
        assert_eq!(response.state.notes.len(), 20);
        assert_eq!(state.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_malformed_body_is_rejected() {
        let state = Arc::new(AppState::new().unwrap());
        match chat(State(state.clone()), CookieJar::new(), Bytes::from_static(b"{ nope")).await {
            Err((status, _)) => assert_eq!(status, StatusCode::BAD_REQUEST),
            Ok(_) => panic!("malformed body was accepted"),
        }
        assert_eq!(state.session_count().await, 0);
    }
}
