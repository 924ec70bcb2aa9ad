use super::types::*;
use crate::api::{ApiClient, Page, PageRequest, RecordId, SortOrder};
use crate::error::ApiResult;
use serde::Serialize;
use tracing::warn;

pub const LIST_BANKS_PATH: &str = "/api/questionBank/list/page/vo";
pub const GET_BANK_PATH: &str = "/api/questionBank/get/vo";
pub const LIST_QUESTIONS_PATH: &str = "/api/question/list/page/vo";
pub const GET_QUESTION_PATH: &str = "/api/question/get/vo";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BankDetailQuery<'a> {
    id: &'a str,
    need_query_question_list: bool,
    page_size: u32,
}

impl ApiClient {
    pub async fn list_question_banks(&self, query: &QuestionBankQuery) -> ApiResult<Page<QuestionBank>> {
        let page: Option<Page<QuestionBank>> =
            self.post(LIST_BANKS_PATH, query).await?.into_optional()?;
        Ok(page.unwrap_or_default())
    }

    pub async fn get_question_bank(
        &self,
        id: &RecordId,
        with_questions: bool,
        page_size: u32,
    ) -> ApiResult<QuestionBankDetail> {
        let query = BankDetailQuery {
            id: id.as_str(),
            need_query_question_list: with_questions,
            page_size,
        };
        self.get(GET_BANK_PATH, &query).await?.into_data("question bank")
    }

    pub async fn list_questions(&self, query: &QuestionQuery) -> ApiResult<Page<Question>> {
        let page: Option<Page<Question>> =
            self.post(LIST_QUESTIONS_PATH, query).await?.into_optional()?;
        Ok(page.unwrap_or_default())
    }

    pub async fn get_question(&self, id: &RecordId) -> ApiResult<Question> {
        self.get(GET_QUESTION_PATH, &[("id", id.as_str())])
            .await?
            .into_data("question")
    }
}

/// Latest banks and questions shown on the landing page.
#[derive(Debug, Clone, Default)]
pub struct HomeFeed {
    pub banks: Vec<QuestionBank>,
    pub questions: Vec<Question>,
}

impl HomeFeed {
    /// Fetches both lists concurrently; a failed list is shown empty.
    pub async fn load(client: &ApiClient, size: u32) -> Self {
        let latest = PageRequest::new(size).sorted_by("updateTime", SortOrder::Descend);
        let bank_query = QuestionBankQuery {
            page: latest.clone(),
            ..QuestionBankQuery::default()
        };
        let question_query = QuestionQuery {
            page: latest,
            ..QuestionQuery::default()
        };

        let (banks, questions) = futures::join!(
            client.list_question_banks(&bank_query),
            client.list_questions(&question_query),
        );

        Self {
            banks: records_or_empty("question banks", banks),
            questions: records_or_empty("questions", questions),
        }
    }
}

fn records_or_empty<T>(what: &str, result: ApiResult<Page<T>>) -> Vec<T> {
    match result {
        Ok(page) => page.records,
        Err(e) => {
            warn!(error = %e, "Failed to load {}", what);
            Vec::new()
        }
    }
}
