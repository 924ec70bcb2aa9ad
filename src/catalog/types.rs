use crate::api::{lenient_time, Page, PageRequest, RecordId};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionBank {
    pub id: RecordId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub user_id: Option<RecordId>,
    #[serde(default, deserialize_with = "lenient_time")]
    pub create_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_time")]
    pub update_time: Option<String>,
}

/// A bank together with (optionally) one page of its questions.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionBankDetail {
    #[serde(flatten)]
    pub bank: QuestionBank,
    #[serde(default)]
    pub question_page: Option<Page<Question>>,
}

impl QuestionBankDetail {
    pub fn questions(&self) -> &[Question] {
        self.question_page
            .as_ref()
            .map(|page| page.records.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: RecordId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default, alias = "tagList", deserialize_with = "lenient_tags")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub user_id: Option<RecordId>,
    #[serde(default, deserialize_with = "lenient_time")]
    pub create_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_time")]
    pub update_time: Option<String>,
}

/// Tags arrive either as a JSON array or as a JSON-encoded string column.
fn lenient_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        List(Vec<String>),
        Encoded(String),
    }

    Ok(match Option::<Repr>::deserialize(deserializer)? {
        Some(Repr::List(tags)) => tags,
        Some(Repr::Encoded(raw)) => serde_json::from_str(&raw).unwrap_or_default(),
        None => Vec::new(),
    })
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionBankQuery {
    #[serde(flatten)]
    pub page: PageRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<RecordId>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionQuery {
    #[serde(flatten)]
    pub page: PageRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_bank_id: Option<RecordId>,
    #[serde(rename = "tag", skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<RecordId>,
}
