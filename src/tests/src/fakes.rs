//! In-memory stand-ins for the completion service and the engine.

use async_trait::async_trait;
use domain::entities::PromptMessage;
use domain::services::{CommandExecutor, CompletionService};
use shared::error::{Error, Result};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Returns the same canned reply (or upstream failure) on every call and
/// records what it was asked.
pub struct ScriptedCompletion {
    reply: std::result::Result<String, String>,
    calls: AtomicUsize,
    requests: Mutex<Vec<(String, Vec<PromptMessage>)>>,
}

impl ScriptedCompletion {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Messages of the most recent call.
    pub fn last_messages(&self) -> Vec<PromptMessage> {
        let requests = self.requests.lock().unwrap_or_else(|e| e.into_inner());
        requests.last().map(|(_, m)| m.clone()).unwrap_or_default()
    }

    pub fn last_system_prompt(&self) -> Option<String> {
        let requests = self.requests.lock().unwrap_or_else(|e| e.into_inner());
        requests.last().map(|(s, _)| s.clone())
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn complete(&self, system: &str, messages: &[PromptMessage]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((system.to_string(), messages.to_vec()));
        self.reply.clone().map_err(Error::Upstream)
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

/// Accepts every line except the configured rejections and crashes.
#[derive(Default)]
pub struct ScriptedExecutor {
    rejections: HashMap<String, String>,
    crashes: HashSet<String>,
    seen: Mutex<Vec<String>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// `line` fails with `message`, the way the engine rejects a command.
    pub fn reject(mut self, line: &str, message: &str) -> Self {
        self.rejections.insert(line.to_string(), message.to_string());
        self
    }

    /// `line` takes the engine down.
    pub fn crash_on(mut self, line: &str) -> Self {
        self.crashes.insert(line.to_string());
        self
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl CommandExecutor for ScriptedExecutor {
    async fn execute(&self, line: &str) -> Result<()> {
        self.seen
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(line.to_string());
        if self.crashes.contains(line) {
            return Err(Error::Critical("engine process exited".to_string()));
        }
        match self.rejections.get(line) {
            Some(message) => Err(Error::Execution(message.clone())),
            None => Ok(()),
        }
    }
}
