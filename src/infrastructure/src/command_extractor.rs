use domain::rules::ProseRules;

/// Heuristic line extractor for the conversational pipeline.
///
/// Drops blank lines, comments, code fences and lines with prose markers.
/// Everything else is kept verbatim, malformed or not; validation happens later.
#[derive(Debug, Clone, Default)]
pub struct CommandExtractor {
    rules: ProseRules,
}

impl CommandExtractor {
    pub fn new(rules: ProseRules) -> Self {
        Self { rules }
    }

    pub fn extract(&self, text: &str) -> Vec<String> {
        let commands: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|line| !self.rules.is_noise(line))
            .map(str::to_string)
            .collect();
        tracing::debug!(count = commands.len(), "extracted candidate commands");
        commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_unknown_verbs() {
        let extractor = CommandExtractor::default();
        let commands = extractor.extract("fetch 1abc\ncartoom\ncolor red");
        assert_eq!(commands, vec!["fetch 1abc", "cartoom", "color red"]);
    }

    #[test]
    fn test_drops_prose_and_markdown() {
        let text = "Here are the PyMOL commands:\n```\nfetch 1abc\n\n# style\nshow cartoon\n```\n\
                    Note: run these in order";
        let commands = CommandExtractor::default().extract(text);
        assert_eq!(commands, vec!["fetch 1abc", "show cartoon"]);
    }

    #[test]
    fn test_trims_but_does_not_rewrite() {
        let commands = CommandExtractor::default().extract("   color  red,   chain A   \r\n");
        assert_eq!(commands, vec!["color  red,   chain A"]);
    }
}
