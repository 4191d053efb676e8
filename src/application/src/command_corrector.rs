use domain::lexicon::{length_gap, positional_matches};
use domain::Lexicon;
use std::sync::Arc;

/// Proposes one rewrite of a command the engine rejected.
///
/// Rules are tried in order and the first hit wins: typo table, nearest verb
/// (for unknown-command errors), missing-argument completion, invalid-color
/// replacement. Pure; the caller decides whether to run the result.
#[derive(Debug, Clone)]
pub struct CommandCorrector {
    lexicon: Arc<Lexicon>,
}

impl CommandCorrector {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    /// Canonical spelling of a verb; correct verbs are returned unchanged.
    pub fn fix_typo<'a>(&self, verb: &'a str) -> &'a str {
        self.lexicon.canonical(verb)
    }

    pub fn correct(&self, command: &str, error: &str) -> Option<String> {
        let command = command.trim();
        let parts: Vec<&str> = command.split_whitespace().collect();
        let verb = parts.first()?.to_lowercase();
        let error = error.to_lowercase();

        if let Some(fixed) = self.lexicon.typo_fix(&verb) {
            return Some(replace_token(&parts, 0, fixed));
        }

        if error.contains("unknown command") {
            let threshold = verb.chars().count().saturating_sub(2);
            if let Some(nearest) = self.lexicon.verbs().find(|candidate| {
                length_gap(&verb, candidate) <= 2
                    && positional_matches(&verb, candidate) >= threshold
            }) {
                return Some(replace_token(&parts, 0, nearest));
            }
        }

        if error.contains("requires") && parts.len() == 1 {
            let completion = match verb.as_str() {
                "show" => Some("cartoon"),
                "hide" => Some("everything"),
                "color" => Some("red"),
                _ => None,
            };
            if let Some(argument) = completion {
                return Some(format!("{} {}", command, argument));
            }
        }

        if error.contains("invalid color") && verb == "color" && parts.len() >= 2 {
            let replacement = if parts[1].ends_with(',') { "red," } else { "red" };
            return Some(replace_token(&parts, 1, replacement));
        }

        None
    }
}

fn replace_token(parts: &[&str], index: usize, replacement: &str) -> String {
    parts
        .iter()
        .enumerate()
        .map(|(i, part)| if i == index { replacement } else { *part })
        .collect::<Vec<_>>()
        .join(" ")
}
