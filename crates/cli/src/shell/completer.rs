use super::context::ShellContext;
use reedline::{Completer, Span, Suggestion};

/// Maximum number of label suggestions offered at once
const MAX_LABEL_SUGGESTIONS: usize = 30;

pub struct DocscopeCompleter {
    pub commands: Vec<String>,
    pub context: ShellContext,
}

impl DocscopeCompleter {
    pub fn new(commands: Vec<String>, context: ShellContext) -> Self {
        Self { commands, context }
    }
}

fn suggestion(value: String, description: Option<String>, start: usize, end: usize) -> Suggestion {
    Suggestion {
        value,
        description,
        style: None,
        extra: None,
        span: Span { start, end },
        append_whitespace: true,
        match_indices: None,
    }
}

impl Completer for DocscopeCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        let line = &line[..pos.min(line.len())];
        let trimmed = line.trim_start();

        // 1. Command completion (at start of line)
        if !trimmed.contains(' ') {
            return self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(trimmed))
                .map(|cmd| suggestion(cmd.clone(), None, pos - trimmed.len(), pos))
                .collect();
        }

        // 2. Label completion for commands taking a class or symbol name
        let parts: Vec<&str> = trimmed.split_whitespace().collect();
        let Some(&cmd) = parts.first() else {
            return vec![];
        };
        if !matches!(cmd, "find" | "open" | "bases" | "derived" | "hierarchy") {
            return vec![];
        }

        let last_word = if line.ends_with(' ') {
            ""
        } else {
            parts.last().copied().unwrap_or("")
        };
        // Avoid listing a whole shard on an empty tab
        if last_word.is_empty() {
            return vec![];
        }
        let span_start = pos - last_word.len();

        self.context
            .complete(last_word, MAX_LABEL_SUGGESTIONS)
            .into_iter()
            .map(|label| {
                // Labels with spaces would be split again by the shell parser
                let value = if label.contains(' ') {
                    format!("'{}'", label)
                } else {
                    label
                };
                suggestion(value, None, span_start, pos)
            })
            .collect()
    }
}
