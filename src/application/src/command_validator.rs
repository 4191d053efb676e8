use domain::entities::Validation;
use domain::lexicon::{length_gap, positional_mismatches};
use domain::Lexicon;
use std::sync::Arc;

/// Prefix left over from API-style output (`cmd.show ...`). Not a command itself.
const EXECUTION_PREFIX: &str = "cmd.";

/// Structural checks of single command lines against the [`Lexicon`].
///
/// Total: every input produces a [`Validation`], nothing panics or errors.
#[derive(Debug, Clone)]
pub struct CommandValidator {
    lexicon: Arc<Lexicon>,
}

impl CommandValidator {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    pub fn validate(&self, command: &str) -> Validation {
        let command = command.trim();
        if command.is_empty() {
            return Validation::invalid("Empty command");
        }

        let clean = command
            .strip_prefix(EXECUTION_PREFIX)
            .unwrap_or(command)
            .trim();
        let parts: Vec<&str> = clean.split_whitespace().collect();
        let Some(first) = parts.first() else {
            return Validation::invalid("Invalid command format");
        };
        let verb = first.to_lowercase();

        if !self.lexicon.is_verb(&verb) {
            let suggestions = self.suggestions(&verb);
            return if suggestions.is_empty() {
                Validation::invalid(format!("Unknown command '{}'", verb))
            } else {
                Validation::invalid(format!(
                    "Unknown command '{}'. Did you mean: {}?",
                    verb,
                    suggestions.join(", ")
                ))
            };
        }

        match verb.as_str() {
            "color" if parts.len() >= 2 => {
                let color = parts[1].to_lowercase();
                let color = color.trim_end_matches(',');
                if !self.lexicon.is_color(color) {
                    return Validation::invalid(format!(
                        "Invalid color '{}'. Use standard color names or hex values.",
                        color
                    ));
                }
            }
            "show" | "hide" if parts.len() < 2 => {
                return Validation::invalid(format!(
                    "'{}' command requires a representation type",
                    verb
                ));
            }
            "fetch" if parts.len() < 2 => {
                return Validation::invalid("fetch command requires a PDB ID");
            }
            "mset" if parts.len() < 2 => {
                return Validation::invalid("mset command requires frame specification");
            }
            "mview" if command.contains("store") && parts.len() < 3 => {
                return Validation::invalid("mview store command requires frame number");
            }
            "translate" if !command.contains('[') => {
                return Validation::invalid(
                    "translate command requires coordinate vector [x, y, z]",
                );
            }
            _ => {}
        }

        Validation::ok()
    }

    /// Lexicon verbs within two characters of `verb` by length and by
    /// position-wise mismatches, closest edit distance first.
    pub fn suggestions(&self, verb: &str) -> Vec<&'static str> {
        let mut candidates: Vec<&'static str> = self
            .lexicon
            .verbs()
            .filter(|candidate| {
                length_gap(verb, candidate) <= 2 && positional_mismatches(verb, candidate) <= 2
            })
            .collect();
        candidates.sort_by_key(|candidate| strsim::levenshtein(verb, candidate));
        candidates
    }
}
