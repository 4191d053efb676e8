use domain::rules::{Rejection, StrictRules};
use shared::error::{Error, Result};

/// Whitelist/blocklist filter of the strict pipeline.
///
/// Non-conforming lines are dropped silently (logged at debug). A response with
/// no surviving line is an `EmptyOutput` error carrying the raw text.
#[derive(Debug, Clone, Default)]
pub struct SafetyFilter {
    rules: StrictRules,
}

impl SafetyFilter {
    pub fn new(rules: StrictRules) -> Self {
        Self { rules }
    }

    pub fn filter(&self, raw: &str) -> Result<Vec<String>> {
        let mut kept = Vec::new();
        for line in raw.lines().map(str::trim) {
            match self.rules.check(line) {
                Ok(()) => kept.push(line.to_string()),
                Err(Rejection::Blank) => {}
                Err(Rejection::Blocked(token)) => {
                    tracing::debug!(line, token, "dropped line with blocked token");
                }
                Err(Rejection::NotWhitelisted(verb)) => {
                    tracing::debug!(line, verb = %verb, "dropped line with non-whitelisted verb");
                }
            }
        }

        if kept.is_empty() {
            return Err(Error::EmptyOutput {
                raw: raw.to_string(),
            });
        }
        Ok(kept)
    }
}
