use super::backend::InterviewBackend;
use super::types::*;
use crate::access::CurrentUser;
use crate::error::{ApiError, ApiResult};
use crate::notify::Notifier;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Client-side state of one mock interview.
#[derive(Debug, Clone, Default)]
pub struct SessionView {
    pub session: Option<InterviewSession>,
    pub messages: Vec<InterviewMessage>,
    pub is_started: bool,
    pub is_ended: bool,
    pub input_buffer: String,
    pub is_busy: bool,
}

impl SessionView {
    pub fn is_loaded(&self) -> bool {
        self.session.is_some()
    }

    pub fn status(&self) -> InterviewStatus {
        if self.is_ended {
            InterviewStatus::Ended
        } else if self.is_started {
            InterviewStatus::InProgress
        } else {
            InterviewStatus::NotStarted
        }
    }

    pub fn can_start(&self) -> bool {
        self.is_loaded() && !self.is_started && !self.is_ended
    }

    pub fn can_chat(&self) -> bool {
        self.is_loaded() && self.is_started && !self.is_ended
    }

    pub fn can_end(&self) -> bool {
        self.can_chat()
    }

    pub fn can_dispatch(&self, event: InterviewEvent) -> bool {
        match event {
            InterviewEvent::Start => self.can_start(),
            InterviewEvent::Chat => self.can_chat(),
            InterviewEvent::End => self.can_end(),
        }
    }
}

#[derive(Debug)]
pub enum DispatchOutcome {
    /// The round trip succeeded and both turns were appended.
    Applied { reply: String, ended: bool },
    Failed(ApiError),
    /// The event is not valid in the current status.
    Refused(InterviewEvent),
    /// Another event is still in flight; this one was dropped.
    Busy,
    EmptyInput,
}

impl DispatchOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, DispatchOutcome::Applied { .. })
    }
}

/// Mediates between user input and the interview event API.
///
/// Cloning is cheap and shares the same state, so a rendering task can hold a
/// clone while another task dispatches events.
#[derive(Clone)]
pub struct InterviewSessionViewModel {
    backend: Arc<dyn InterviewBackend>,
    notifier: Arc<dyn Notifier>,
    user: CurrentUser,
    state: Arc<RwLock<SessionView>>,
}

impl InterviewSessionViewModel {
    pub fn new(
        backend: Arc<dyn InterviewBackend>,
        notifier: Arc<dyn Notifier>,
        user: CurrentUser,
    ) -> Self {
        Self {
            backend,
            notifier,
            user,
            state: Arc::new(RwLock::new(SessionView::default())),
        }
    }

    pub fn current_user(&self) -> &CurrentUser {
        &self.user
    }

    pub async fn snapshot(&self) -> SessionView {
        self.state.read().await.clone()
    }

    pub async fn status(&self) -> InterviewStatus {
        self.state.read().await.status()
    }

    pub async fn set_input(&self, text: impl Into<String>) {
        self.state.write().await.input_buffer = text.into();
    }

    /// Fetches the interview and its history. On failure the view stays unloaded.
    pub async fn load(&self, id: &SessionId) -> ApiResult<()> {
        if let Some(loaded) = self.state.read().await.session.as_ref() {
            if &loaded.id != id {
                return Err(ApiError::SessionMismatch {
                    loaded: loaded.id.to_string(),
                    requested: id.to_string(),
                });
            }
        }

        match self.fetch(id).await {
            Ok((session, messages)) => {
                let mut state = self.state.write().await;
                state.is_started = session.status == InterviewStatus::InProgress;
                state.is_ended = session.status == InterviewStatus::Ended;
                state.messages = messages;
                info!(
                    %id,
                    status = ?session.status,
                    messages = state.messages.len(),
                    "Interview loaded"
                );
                state.session = Some(session);
                Ok(())
            }
            Err(e) => {
                warn!(%id, error = %e, "Failed to load interview");
                self.notifier.error(&format!("Failed to load interview: {}", e));
                Err(e)
            }
        }
    }

    async fn fetch(&self, id: &SessionId) -> ApiResult<(InterviewSession, Vec<InterviewMessage>)> {
        let session = self.backend.get_session(id).await?;
        let messages = parse_history(session.messages.as_deref())?;
        Ok((session, messages))
    }

    /// Sends one event and appends the user turn and the interviewer reply.
    pub async fn dispatch_event(
        &self,
        event: InterviewEvent,
        message: Option<String>,
    ) -> DispatchOutcome {
        if event == InterviewEvent::Chat
            && message.as_deref().map_or(true, |m| m.trim().is_empty())
        {
            return DispatchOutcome::EmptyInput;
        }

        let id = {
            let mut state = self.state.write().await;
            if state.is_busy {
                debug!(%event, "Dropping event, another one is in flight");
                return DispatchOutcome::Busy;
            }
            let id = match state.session.as_ref() {
                Some(session) if state.can_dispatch(event) => session.id.clone(),
                _ => {
                    debug!(%event, status = ?state.status(), "Event not allowed");
                    return DispatchOutcome::Refused(event);
                }
            };
            state.is_busy = true;
            id
        };

        let request = InterviewEventRequest {
            id: id.clone(),
            event,
            message: message.clone(),
        };
        let result = self.backend.dispatch_event(request).await;

        let mut state = self.state.write().await;
        state.is_busy = false;

        let reply = match result {
            Ok(reply) if reply.is_empty() => EMPTY_REPLY_PLACEHOLDER.to_string(),
            Ok(reply) => reply,
            Err(e) => {
                drop(state);
                warn!(%id, %event, error = %e, "Interview event failed");
                self.notifier.error(&format!("Operation failed: {}", e));
                return DispatchOutcome::Failed(e);
            }
        };

        let now = Utc::now().timestamp_millis();
        let user_text = message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| event.placeholder().to_string());
        state.messages.push(InterviewMessage::user(user_text, now));
        state.messages.push(InterviewMessage::assistant(reply.clone(), now + 1));

        match event {
            InterviewEvent::Start => state.is_started = true,
            InterviewEvent::End => state.is_ended = true,
            InterviewEvent::Chat => {
                if reply.contains(TERMINATION_MARKER) {
                    info!(%id, "Interviewer closed the session");
                    state.is_ended = true;
                }
            }
        }

        let status = state.status();
        if let Some(session) = state.session.as_mut() {
            session.status = status;
        }
        info!(%id, %event, ?status, "Interview event applied");

        DispatchOutcome::Applied {
            reply,
            ended: state.is_ended,
        }
    }

    /// Sends the input buffer as a chat turn, then clears it.
    ///
    /// The buffer is kept when the turn was not sent, or when it was edited
    /// while the turn was in flight.
    pub async fn send_message(&self) -> DispatchOutcome {
        let input = self.state.read().await.input_buffer.clone();
        if input.trim().is_empty() {
            return DispatchOutcome::EmptyInput;
        }

        let outcome = self
            .dispatch_event(InterviewEvent::Chat, Some(input.clone()))
            .await;
        if matches!(outcome, DispatchOutcome::Applied { .. } | DispatchOutcome::Failed(_)) {
            let mut state = self.state.write().await;
            if state.input_buffer == input {
                state.input_buffer.clear();
            }
        }
        outcome
    }
}
