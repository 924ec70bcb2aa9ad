use super::types::*;
use crate::access::{check_access, AccessRole, CurrentUser};
use crate::api::{ApiClient, Page, SortOrder};
use crate::error::{ApiError, ApiResult};
use tracing::debug;

pub const LIST_MY_INTERVIEWS_PATH: &str = "/api/mockInterview/my/list/page/vo";

impl ApiClient {
    /// Lists the interviews owned by `user`, newest first unless the query sorts otherwise.
    pub async fn list_my_interviews(
        &self,
        user: &CurrentUser,
        mut query: InterviewQuery,
    ) -> ApiResult<Page<InterviewSession>> {
        if !check_access(user, AccessRole::User) {
            return Err(ApiError::AccessDenied(
                "interview history requires a logged-in user".to_string(),
            ));
        }

        if query.page.sort_field.is_none() {
            query.page.sort_field = Some("createTime".to_string());
            query.page.sort_order = Some(SortOrder::Descend);
        }
        if query.user_id.is_none() {
            query.user_id = user.id().and_then(|id| id.parse().ok());
        }

        let page: Option<Page<InterviewSession>> = self
            .post(LIST_MY_INTERVIEWS_PATH, &query)
            .await?
            .into_optional()?;
        let page = page.unwrap_or_default();
        debug!(records = page.records.len(), total = page.total, "Loaded interview history");
        Ok(page)
    }
}
