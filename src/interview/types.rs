use crate::api::{lenient_time, PageRequest, RecordId};
use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type SessionId = RecordId;

/// Substring in an assistant reply that signals the interviewer closed the session.
pub const TERMINATION_MARKER: &str = "【面试结束】";
pub const START_PLACEHOLDER: &str = "面试开始";
pub const END_PLACEHOLDER: &str = "面试结束";
pub const EMPTY_REPLY_PLACEHOLDER: &str = "收到请求";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn is_ai(self) -> bool {
        self == Role::Assistant
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(into = "WireMessage", try_from = "WireMessage")]
pub struct InterviewMessage {
    pub role: Role,
    pub content: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

impl InterviewMessage {
    pub fn user(content: impl Into<String>, timestamp: i64) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp,
        }
    }

    pub fn assistant(content: impl Into<String>, timestamp: i64) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp,
        }
    }
}

/// Shape of a message inside the stored history blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireMessage {
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    content: String,
    #[serde(default, rename = "isAI")]
    is_ai: Option<bool>,
    #[serde(default)]
    timestamp: i64,
}

impl WireMessage {
    fn role(&self) -> Option<Role> {
        match self.role.as_deref() {
            Some("user") => Some(Role::User),
            Some("assistant") => Some(Role::Assistant),
            Some(_) => None,
            None => self
                .is_ai
                .map(|ai| if ai { Role::Assistant } else { Role::User }),
        }
    }
}

impl From<InterviewMessage> for WireMessage {
    fn from(message: InterviewMessage) -> Self {
        let role = match message.role {
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        Self {
            role: Some(role.to_string()),
            is_ai: Some(message.role.is_ai()),
            content: message.content,
            timestamp: message.timestamp,
        }
    }
}

impl TryFrom<WireMessage> for InterviewMessage {
    type Error = String;

    fn try_from(wire: WireMessage) -> Result<Self, Self::Error> {
        let role = wire
            .role()
            .ok_or_else(|| format!("unsupported message role {:?}", wire.role))?;
        Ok(Self {
            role,
            content: wire.content,
            timestamp: wire.timestamp,
        })
    }
}

/// Parses the serialized history blob stored with an interview.
///
/// An absent or blank blob is an empty history. Messages with roles other than
/// user/assistant (system prompts, summaries) are skipped.
pub fn parse_history(blob: Option<&str>) -> Result<Vec<InterviewMessage>, ApiError> {
    let blob = match blob.map(str::trim) {
        Some(blob) if !blob.is_empty() => blob,
        _ => return Ok(Vec::new()),
    };

    let wire: Option<Vec<WireMessage>> =
        serde_json::from_str(blob).map_err(|e| ApiError::CorruptHistory(e.to_string()))?;

    Ok(wire
        .unwrap_or_default()
        .into_iter()
        .filter_map(|message| InterviewMessage::try_from(message).ok())
        .collect())
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum InterviewStatus {
    #[default]
    NotStarted,
    InProgress,
    Ended,
}

impl InterviewStatus {
    pub fn label(self) -> &'static str {
        match self {
            InterviewStatus::NotStarted => "待开始",
            InterviewStatus::InProgress => "进行中",
            InterviewStatus::Ended => "已结束",
        }
    }
}

impl fmt::Display for InterviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<u8> for InterviewStatus {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(InterviewStatus::NotStarted),
            1 => Ok(InterviewStatus::InProgress),
            2 => Ok(InterviewStatus::Ended),
            other => Err(format!("unknown interview status {}", other)),
        }
    }
}

impl From<InterviewStatus> for u8 {
    fn from(status: InterviewStatus) -> Self {
        match status {
            InterviewStatus::NotStarted => 0,
            InterviewStatus::InProgress => 1,
            InterviewStatus::Ended => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InterviewEvent {
    Start,
    Chat,
    End,
}

impl InterviewEvent {
    /// Text recorded as the user's turn when the event carries no message.
    pub fn placeholder(self) -> &'static str {
        match self {
            InterviewEvent::Start => START_PLACEHOLDER,
            InterviewEvent::Chat | InterviewEvent::End => END_PLACEHOLDER,
        }
    }
}

impl fmt::Display for InterviewEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InterviewEvent::Start => "start",
            InterviewEvent::Chat => "chat",
            InterviewEvent::End => "end",
        };
        f.write_str(name)
    }
}

/// A mock interview as stored by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewSession {
    pub id: SessionId,
    #[serde(default)]
    pub status: InterviewStatus,
    /// Serialized message history.
    #[serde(default)]
    pub messages: Option<String>,
    #[serde(default)]
    pub job_position: Option<String>,
    #[serde(default)]
    pub work_experience: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub user_id: Option<RecordId>,
    #[serde(default, deserialize_with = "lenient_time")]
    pub create_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_time")]
    pub update_time: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewEventRequest {
    pub id: SessionId,
    pub event: InterviewEvent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateInterviewRequest {
    pub job_position: String,
    pub work_experience: String,
    pub difficulty: String,
}

/// Filters for the interview history table.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InterviewQuery {
    #[serde(flatten)]
    pub page: PageRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<InterviewStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_experience: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<RecordId>,
}
