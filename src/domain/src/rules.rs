//! Declarative line-filtering rules.
//!
//! Adding a rule means adding an entry to one of the tables below; the
//! extractors never hard-code phrases of their own.

/// Phrases that mark a line as prose rather than a command (matched lower-cased).
pub const PROSE_PHRASES: &[&str] = &[
    "here are the",
    "the commands are",
    "pymol commands",
    "to accomplish",
    "explanation:",
    "note:",
    "warning:",
    "tip:",
    "remember:",
];

pub const COMMENT_MARKERS: &[&str] = &["#", "//"];

pub const CODE_FENCE: &str = "```";

/// Verbs the strict pipeline lets through.
pub const STRICT_WHITELIST: &[&str] = &[
    "fetch", "load", "set_name", "hide", "show", "as", "color", "spectrum", "bg_color", "create",
    "translate", "rotate", "zoom", "orient", "center", "set", "select", "sele", "save",
];

/// Substrings that disqualify a line in the strict pipeline (matched lower-cased).
///
/// `@` also shows up in some selection syntax, so it can reject legitimate lines.
pub const STRICT_BLOCKLIST: &[&str] = &[
    "python", "cmd.", "run ", "@", "import", "exec", "eval", "system", "delete", "remove",
];

/// Heuristic noise check used by the conversational pipeline.
#[derive(Debug, Clone)]
pub struct ProseRules {
    pub phrases: Vec<&'static str>,
    pub comment_markers: Vec<&'static str>,
}

impl Default for ProseRules {
    fn default() -> Self {
        Self {
            phrases: PROSE_PHRASES.to_vec(),
            comment_markers: COMMENT_MARKERS.to_vec(),
        }
    }
}

impl ProseRules {
    /// `line` must already be trimmed.
    pub fn is_noise(&self, line: &str) -> bool {
        if line.is_empty() || line.starts_with(CODE_FENCE) {
            return true;
        }
        if self.comment_markers.iter().any(|m| line.starts_with(m)) {
            return true;
        }
        let lowered = line.to_lowercase();
        self.phrases.iter().any(|p| lowered.contains(p))
    }
}

/// Whitelist plus blocklist used by the strict pipeline.
#[derive(Debug, Clone)]
pub struct StrictRules {
    pub whitelist: Vec<&'static str>,
    pub blocklist: Vec<&'static str>,
}

impl Default for StrictRules {
    fn default() -> Self {
        Self {
            whitelist: STRICT_WHITELIST.to_vec(),
            blocklist: STRICT_BLOCKLIST.to_vec(),
        }
    }
}

/// Why the strict filter rejected a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Blank,
    Blocked(&'static str),
    NotWhitelisted(String),
}

impl StrictRules {
    pub fn check(&self, line: &str) -> Result<(), Rejection> {
        let lowered = line.trim().to_lowercase();
        if lowered.is_empty() {
            return Err(Rejection::Blank);
        }
        if let Some(token) = self.blocklist.iter().find(|t| lowered.contains(*t)) {
            return Err(Rejection::Blocked(*token));
        }
        let first = lowered.split_whitespace().next().unwrap_or_default();
        let verb = first.strip_suffix(',').unwrap_or(first);
        if self.whitelist.iter().any(|w| *w == verb) {
            Ok(())
        } else {
            Err(Rejection::NotWhitelisted(verb.to_string()))
        }
    }
}
