use crate::model::{AnalyzeForm, SummarizeForm};
use crate::orchestrator::SubmitEvent;
use std::path::PathBuf;

pub const TAB_ANALYZE: usize = 0;
pub const TAB_SUMMARIZE: usize = 1;
pub const TAB_HELP: usize = 2;
pub const TAB_COUNT: usize = 3;

/// Input field with keyboard focus on the Analyze tab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AnalyzeField {
    #[default]
    Query,
    Url,
}

/// Form contents and view state. Owned by the UI thread only.
#[derive(Debug, Default)]
pub struct UiState {
    pub tab: usize,
    pub query: String,
    pub url: String,
    pub text: String,
    pub focus: AnalyzeField,
    pub info: String,
    pub last_exported_path: Option<String>,
    pub scroll: u16,
    pub log_path: Option<PathBuf>,
}

impl UiState {
    pub fn new(analyze: AnalyzeForm, summarize: SummarizeForm) -> Self {
        Self {
            query: analyze.query,
            url: analyze.url,
            text: summarize.text,
            ..Default::default()
        }
    }

    pub fn next_tab(&mut self) {
        self.tab = (self.tab + 1) % TAB_COUNT;
        self.scroll = 0;
    }

    pub fn toggle_field(&mut self) {
        self.focus = match self.focus {
            AnalyzeField::Query => AnalyzeField::Url,
            AnalyzeField::Url => AnalyzeField::Query,
        };
    }

    /// The field typed characters go to on the current tab.
    fn active_field(&mut self) -> Option<&mut String> {
        match self.tab {
            TAB_ANALYZE => Some(match self.focus {
                AnalyzeField::Query => &mut self.query,
                AnalyzeField::Url => &mut self.url,
            }),
            TAB_SUMMARIZE => Some(&mut self.text),
            _ => None,
        }
    }

    pub fn insert_char(&mut self, c: char) {
        if let Some(field) = self.active_field() {
            field.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.active_field() {
            field.pop();
        }
    }

    pub fn clear_field(&mut self) {
        if let Some(field) = self.active_field() {
            field.clear();
        }
    }

    /// Submit the form of the current tab with the field values as typed.
    pub fn submit_event(&self) -> Option<SubmitEvent> {
        match self.tab {
            TAB_ANALYZE => Some(SubmitEvent::Analysis(AnalyzeForm {
                query: self.query.clone(),
                url: self.url.clone(),
            })),
            TAB_SUMMARIZE => Some(SubmitEvent::Summarization(SummarizeForm {
                text: self.text.clone(),
            })),
            _ => None,
        }
    }

    pub fn scroll_by(&mut self, delta: i32) {
        self.scroll = (self.scroll as i32 + delta).clamp(0, u16::MAX as i32) as u16;
    }
}
