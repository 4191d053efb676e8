//! Cookie-keyed sessions.
//!
//! Each client gets its own [`AgentService`] (history and structure registry)
//! behind a mutex, so overlapping requests from one client are serialized and
//! different clients never share conversation state.

use application::agent_service::AgentService;
use axum::extract::FromRequestParts;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use shared::types::SessionId;
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "molscribe_session";

pub const DEFAULT_MAX_SESSIONS: usize = 256;
pub const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(60 * 60);

struct SessionEntry {
    agent: Arc<Mutex<AgentService>>,
    last_used: Instant,
    /// Monotonic use order, breaks ties between equal instants.
    tick: u64,
}

#[derive(Default)]
struct Sessions {
    entries: HashMap<SessionId, SessionEntry>,
    tick: u64,
}

impl Sessions {
    fn touch(&mut self, id: &str) -> Option<Arc<Mutex<AgentService>>> {
        self.tick += 1;
        let tick = self.tick;
        let entry = self.entries.get_mut(id)?;
        entry.last_used = Instant::now();
        entry.tick = tick;
        Some(entry.agent.clone())
    }
}

/// Agents keyed by session id.
///
/// Entries idle for longer than `idle_timeout` are dropped when a new session
/// is created. At `max_sessions` the least recently used entry makes room.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<Sessions>>,
    max_sessions: usize,
    idle_timeout: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_IDLE)
    }
}

impl SessionRegistry {
    pub fn new(max_sessions: usize, idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(Sessions::default())),
            max_sessions: max_sessions.max(1),
            idle_timeout,
        }
    }

    /// The agent of an existing session. Never registers anything.
    pub async fn get(&self, id: &str) -> Option<Arc<Mutex<AgentService>>> {
        self.sessions.lock().await.touch(id)
    }

    pub async fn get_or_create<F>(&self, id: &str, create: F) -> Arc<Mutex<AgentService>>
    where
        F: FnOnce() -> AgentService,
    {
        let mut sessions = self.sessions.lock().await;
        if let Some(agent) = sessions.touch(id) {
            return agent;
        }

        let idle_timeout = self.idle_timeout;
        let before = sessions.entries.len();
        sessions
            .entries
            .retain(|_, entry| entry.last_used.elapsed() < idle_timeout);
        let expired = before - sessions.entries.len();
        if expired > 0 {
            tracing::info!(expired, "dropped idle sessions");
        }

        while sessions.entries.len() >= self.max_sessions {
            let oldest = sessions
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.tick)
                .map(|(key, _)| key.clone());
            let Some(oldest) = oldest else { break };
            sessions.entries.remove(&oldest);
            tracing::info!(session = %oldest, "evicted least recently used session");
        }

        sessions.tick += 1;
        let agent = Arc::new(Mutex::new(create()));
        let entry = SessionEntry {
            agent: agent.clone(),
            last_used: Instant::now(),
            tick: sessions.tick,
        };
        sessions.entries.insert(id.to_string(), entry);
        tracing::info!(session = id, active = sessions.entries.len(), "new session");
        agent
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.entries.len()
    }
}

/// Session of the current request. `issued` is set when the client sent no
/// usable cookie and a fresh id was minted.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    issued: bool,
}

impl Session {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        match cookie_value(headers, SESSION_COOKIE) {
            Some(id) => Self { id, issued: false },
            None => Self {
                id: Uuid::new_v4().to_string(),
                issued: true,
            },
        }
    }

    pub fn is_new(&self) -> bool {
        self.issued
    }

    /// Attach `Set-Cookie` to `response` for newly issued sessions.
    pub fn respond(&self, response: impl IntoResponse) -> Response {
        let mut response = response.into_response();
        if self.issued {
            let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, self.id);
            if let Ok(value) = HeaderValue::from_str(&cookie) {
                response.headers_mut().append(SET_COOKIE, value);
            }
        }
        response
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Session::from_headers(&parts.headers))
    }
}

/// Ids are accepted only if they look like ones we issue.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| {
            !value.is_empty()
                && value.len() <= 64
                && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}
