use nu_ansi_term::{Color, Style};
use reedline::{Highlighter, StyledText};

pub struct DocscopeHighlighter {
    commands: Vec<String>,
}

impl DocscopeHighlighter {
    pub fn new(commands: Vec<String>) -> Self {
        Self { commands }
    }
}

impl Highlighter for DocscopeHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let mut styled_text = StyledText::new();
        let mut current_pos = 0;

        for word in line.split_inclusive(char::is_whitespace) {
            let trimmed = word.trim();
            if trimmed.is_empty() {
                styled_text.push((Style::new(), word.to_string()));
                current_pos += word.len();
                continue;
            }

            let style = if line[..current_pos].trim().is_empty() {
                if self.commands.iter().any(|c| c == trimmed) {
                    Style::new().fg(Color::LightGreen).bold()
                } else {
                    Style::new().fg(Color::Red)
                }
            } else if trimmed.starts_with('-') {
                Style::new().fg(Color::Cyan)
            } else if trimmed.contains(".html") {
                Style::new().fg(Color::Yellow)
            } else if trimmed.contains("::") {
                Style::new().fg(Color::LightPurple)
            } else {
                Style::new()
            };

            styled_text.push((style, word.to_string()));
            current_pos += word.len();
        }

        styled_text
    }
}
