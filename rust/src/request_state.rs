use serde::Serialize;

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Loading,
    Succeeded(String),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Idle,
    Loading,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitRejected {
    EmptyIdea,
    InFlight,
}

impl SubmitRejected {
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyIdea => AppError::Validation.user_message(),
            Self::InFlight => "A landing page is already being generated.".to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct RequestMachine {
    state: RequestState,
}

impl RequestMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    pub fn status(&self) -> RequestStatus {
        match self.state {
            RequestState::Idle => RequestStatus::Idle,
            RequestState::Loading => RequestStatus::Loading,
            RequestState::Succeeded(_) => RequestStatus::Succeeded,
            RequestState::Failed(_) => RequestStatus::Failed,
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.state == RequestState::Loading
    }

    pub fn document(&self) -> &str {
        match &self.state {
            RequestState::Succeeded(document) => document,
            _ => "",
        }
    }

    pub fn error_message(&self) -> &str {
        match &self.state {
            RequestState::Failed(message) => message,
            _ => "",
        }
    }

    pub fn submit(&mut self, idea: &str) -> Result<(), SubmitRejected> {
        if idea.trim().is_empty() {
            return Err(SubmitRejected::EmptyIdea);
        }
        if self.is_in_flight() {
            return Err(SubmitRejected::InFlight);
        }
        self.state = RequestState::Loading;
        Ok(())
    }

    // An outstanding request is kept so its result still lands.
    pub fn reset(&mut self) -> bool {
        if self.is_in_flight() {
            return false;
        }
        self.state = RequestState::Idle;
        true
    }

    // Ignored when nothing is in flight.
    pub fn complete(&mut self, outcome: Result<String, AppError>) -> bool {
        if !self.is_in_flight() {
            return false;
        }
        self.state = match outcome {
            Ok(document) => RequestState::Succeeded(document),
            Err(err) => RequestState::Failed(err.user_message()),
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::{RequestMachine, RequestState, RequestStatus, SubmitRejected};
    use crate::error::AppError;

    #[test]
    fn blank_idea_never_leaves_current_state() {
        let mut machine = RequestMachine::new();
        assert_eq!(machine.submit("   \n\t"), Err(SubmitRejected::EmptyIdea));
        assert_eq!(machine.state(), &RequestState::Idle);

        machine.submit("Notes app").expect("submit");
        machine.complete(Ok("<h1>Notes</h1>".to_string()));
        assert_eq!(machine.submit(""), Err(SubmitRejected::EmptyIdea));
        assert_eq!(machine.document(), "<h1>Notes</h1>");
    }

    #[test]
    fn submit_clears_previous_result_and_error() {
        let mut machine = RequestMachine::new();
        machine.submit("first").expect("submit");
        machine.complete(Err(AppError::GenerationFailed("bad key".to_string())));
        assert_eq!(machine.status(), RequestStatus::Failed);
        assert_eq!(machine.error_message(), "bad key");
        assert_eq!(machine.document(), "");

        machine.submit("second").expect("resubmit");
        assert_eq!(machine.state(), &RequestState::Loading);
        assert_eq!(machine.error_message(), "");

        machine.complete(Ok("<p>two</p>".to_string()));
        assert_eq!(machine.status(), RequestStatus::Succeeded);
        assert_eq!(machine.document(), "<p>two</p>");

        machine.submit("third").expect("resubmit");
        assert_eq!(machine.document(), "");
    }

    #[test]
    fn only_one_request_in_flight() {
        let mut machine = RequestMachine::new();
        machine.submit("idea").expect("submit");
        assert!(machine.is_in_flight());
        assert_eq!(machine.submit("idea"), Err(SubmitRejected::InFlight));
        assert_eq!(machine.state(), &RequestState::Loading);

        assert!(machine.complete(Err(AppError::Transport)));
        assert!(!machine.is_in_flight());
        assert!(machine.error_message().contains("unreachable"));
    }

    #[test]
    fn completion_without_request_is_ignored() {
        let mut machine = RequestMachine::new();
        assert!(!machine.complete(Ok("<p>late</p>".to_string())));
        assert_eq!(machine.state(), &RequestState::Idle);
    }

    #[test]
    fn reset_clears_finished_request_but_not_loading() {
        let mut machine = RequestMachine::new();
        machine.submit("Notes").expect("submit");
        assert!(!machine.reset());
        assert!(machine.is_in_flight());

        machine.complete(Ok("<p>notes</p>".to_string()));
        assert!(machine.reset());
        assert_eq!(machine.state(), &RequestState::Idle);
        assert_eq!(machine.document(), "");
    }
}
