use super::types::*;
use crate::api::ApiClient;
use crate::error::ApiResult;
use async_trait::async_trait;
use tracing::debug;

pub const GET_INTERVIEW_PATH: &str = "/api/mockInterview/get";
pub const HANDLE_EVENT_PATH: &str = "/api/mockInterview/handleEvent";
pub const ADD_INTERVIEW_PATH: &str = "/api/mockInterview/add";

/// Remote side of a mock interview.
#[async_trait]
pub trait InterviewBackend: Send + Sync {
    async fn get_session(&self, id: &SessionId) -> ApiResult<InterviewSession>;

    /// Sends one event and returns the interviewer's reply text (possibly empty).
    async fn dispatch_event(&self, request: InterviewEventRequest) -> ApiResult<String>;
}

#[async_trait]
impl InterviewBackend for ApiClient {
    async fn get_session(&self, id: &SessionId) -> ApiResult<InterviewSession> {
        debug!(%id, "Fetching interview");
        self.get(GET_INTERVIEW_PATH, &[("id", id.as_str())])
            .await?
            .into_data("interview")
    }

    async fn dispatch_event(&self, request: InterviewEventRequest) -> ApiResult<String> {
        debug!(id = %request.id, event = %request.event, "Sending interview event");
        let reply: Option<String> = self.post(HANDLE_EVENT_PATH, &request).await?.into_optional()?;
        Ok(reply.unwrap_or_default())
    }
}

impl ApiClient {
    /// Creates a new interview and returns its id.
    pub async fn create_interview(&self, request: &CreateInterviewRequest) -> ApiResult<SessionId> {
        self.post(ADD_INTERVIEW_PATH, request)
            .await?
            .into_data("interview id")
    }
}
