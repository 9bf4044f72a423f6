use nu_ansi_term::Color;
use reedline::{Prompt, PromptEditMode, PromptHistorySearch};
use std::borrow::Cow;

/// Longest page name shown before the prompt abbreviates it
const MAX_PAGE_WIDTH: usize = 30;

pub struct DefaultPrompt {
    current_page: Option<String>,
}

impl DefaultPrompt {
    pub fn new(current_page: Option<String>) -> Self {
        Self { current_page }
    }
}

impl Prompt for DefaultPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        let prefix = Color::LightBlue.bold().paint("docscope");
        let page = match &self.current_page {
            Some(page) => shorten_page(page),
            None => "/".to_string(),
        };
        Cow::Owned(format!("{} {} > ", prefix, Color::Yellow.paint(page)))
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, _edit_mode: PromptEditMode) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed(".. ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        _history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        Cow::Borrowed("(search) ")
    }
}

/// Drop the anchor and keep the tail of long page names.
fn shorten_page(page: &str) -> String {
    let page = page.split('#').next().unwrap_or(page);
    let count = page.chars().count();
    if count <= MAX_PAGE_WIDTH {
        return page.to_string();
    }
    let tail: String = page.chars().skip(count - (MAX_PAGE_WIDTH - 1)).collect();
    format!("…{}", tail)
}
