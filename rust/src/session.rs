use serde::Serialize;

use crate::clipboard::{ClipboardHelper, CopyOutcome};
use crate::error::AppError;
use crate::prompt_builder::{build_prompt, Category};
use crate::request_state::{RequestMachine, RequestStatus, SubmitRejected};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

pub struct Session {
    idea: String,
    category: Category,
    request: RequestMachine,
    clipboard: ClipboardHelper,
    modal_visible: bool,
    theme: Theme,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub idea: String,
    pub category: Category,
    pub categories: Vec<&'static str>,
    pub status: RequestStatus,
    pub document: String,
    pub error: String,
    pub copied: bool,
    pub modal_visible: bool,
    pub theme: Theme,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(ClipboardHelper::default())
    }
}

impl Session {
    pub fn new(clipboard: ClipboardHelper) -> Self {
        Self {
            idea: String::new(),
            category: Category::default(),
            request: RequestMachine::new(),
            clipboard,
            modal_visible: false,
            theme: Theme::default(),
        }
    }

    pub fn set_draft(&mut self, idea: &str, category: Category) {
        self.idea = idea.to_string();
        self.category = category;
    }

    pub fn begin_generation(
        &mut self,
        idea: &str,
        category: Category,
    ) -> Result<String, SubmitRejected> {
        self.request.submit(idea)?;
        self.set_draft(idea, category);
        self.modal_visible = false;
        Ok(build_prompt(&self.idea, self.category))
    }

    pub fn finish_generation(&mut self, outcome: Result<String, AppError>) -> bool {
        self.request.complete(outcome)
    }

    pub fn idea(&self) -> &str {
        &self.idea
    }

    pub fn document(&self) -> &str {
        self.request.document()
    }

    pub fn copy_document(&mut self) -> Result<CopyOutcome, AppError> {
        let document = self.request.document().to_string();
        self.clipboard.copy(&document)
    }

    pub fn copy_reset_after_ms(&self) -> u64 {
        self.clipboard.feedback().reset_after().as_millis() as u64
    }

    // The overlay only opens over an existing document.
    pub fn set_modal_visible(&mut self, visible: bool) {
        self.modal_visible = visible && !self.request.document().is_empty();
    }

    // A new page load starts from defaults. Only an outstanding request
    // survives, together with the idea it was submitted for.
    pub fn start_page(&mut self) {
        if self.request.reset() {
            self.idea.clear();
            self.category = Category::default();
        }
        self.clipboard.reset_feedback();
        self.modal_visible = false;
        self.theme = Theme::default();
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            idea: self.idea.clone(),
            category: self.category,
            categories: Category::labels(),
            status: self.request.status(),
            document: self.request.document().to_string(),
            error: self.request.error_message().to_string(),
            copied: self.clipboard.copied(),
            modal_visible: self.modal_visible,
            theme: self.theme,
        }
    }
}
