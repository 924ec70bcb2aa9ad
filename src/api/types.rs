use crate::error::{ApiError, ApiResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Backend identifier. Snowflake ids arrive either as JSON numbers or as
/// strings; numeric ids are sent back as numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordId(String);

impl RecordId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl FromStr for RecordId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("id must not be empty".to_string());
        }
        Ok(Self(s.to_string()))
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.parse::<u64>() {
            Ok(numeric) => serializer.serialize_u64(numeric),
            Err(_) => serializer.serialize_str(&self.0),
        }
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(u64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(n) => Ok(Self(n.to_string())),
            Repr::Text(s) => Ok(Self(s)),
        }
    }
}

/// Accepts a timestamp either as text or as epoch milliseconds.
pub fn lenient_time<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Millis(i64),
        Text(String),
    }

    Ok(match Option::<Repr>::deserialize(deserializer)? {
        Some(Repr::Millis(ms)) => DateTime::<Utc>::from_timestamp_millis(ms).map(|t| t.to_rfc3339()),
        Some(Repr::Text(s)) => Some(s),
        None => None,
    })
}

/// Treats an explicit `null` like a missing key.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Envelope every backend endpoint wraps its payload in.
#[derive(Debug, Deserialize)]
pub struct BaseResponse<T> {
    pub code: i32,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> BaseResponse<T> {
    pub fn is_success(&self) -> bool {
        self.code == 0
    }

    /// Unwraps the envelope, treating an absent `data` as an error.
    pub fn into_data(self, what: &'static str) -> ApiResult<T> {
        self.into_optional()?.ok_or(ApiError::MissingData(what))
    }

    /// Unwraps the envelope, allowing `data` to be absent.
    pub fn into_optional(self) -> ApiResult<Option<T>> {
        if self.is_success() {
            Ok(self.data)
        } else {
            Err(ApiError::Business {
                code: self.code,
                message: self.message.unwrap_or_default(),
            })
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascend,
    Descend,
}

/// Common paging and sorting fields shared by every list request.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
}

impl PageRequest {
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size: Some(page_size),
            ..Self::default()
        }
    }

    pub fn page(mut self, current: u32) -> Self {
        self.current = Some(current);
        self
    }

    pub fn sorted_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort_field = Some(field.into());
        self.sort_order = Some(order);
        self
    }
}

/// One page of records. Missing or `null` fields fall back to an empty page.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    #[serde(default = "Vec::new", deserialize_with = "null_as_default")]
    pub records: Vec<T>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub size: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub current: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pages: u64,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            total: 0,
            size: 0,
            current: 0,
            pages: 0,
        }
    }
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_business_error() {
        let response: BaseResponse<String> = serde_json::from_value(json!({
            "code": 40100,
            "data": null,
            "message": "未登录"
        }))
        .unwrap();

        match response.into_data("reply") {
            Err(ApiError::Business { code, message }) => {
                assert_eq!(code, 40100);
                assert_eq!(message, "未登录");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_envelope_missing_data() {
        let response: BaseResponse<String> =
            serde_json::from_value(json!({ "code": 0, "data": null })).unwrap();

        assert!(matches!(
            response.into_data("reply"),
            Err(ApiError::MissingData("reply"))
        ));
    }

    #[test]
    fn test_page_without_records_is_empty() {
        let page: Page<String> = serde_json::from_value(json!({ "total": 3 })).unwrap();

        assert!(page.is_empty());
        assert_eq!(page.total, 3);
    }

    #[test]
    fn test_page_with_null_fields_is_empty() {
        let page: Page<String> = serde_json::from_value(json!({
            "records": null,
            "total": null,
            "size": 12,
            "current": null,
            "pages": null
        }))
        .unwrap();

        assert!(page.is_empty());
        assert_eq!(page.total, 0);
        assert_eq!(page.size, 12);
    }

    #[test]
    fn test_record_id_accepts_number_or_string() {
        let from_number: RecordId = serde_json::from_value(json!(1840000000000000001u64)).unwrap();
        let from_text: RecordId = serde_json::from_value(json!("1840000000000000001")).unwrap();

        assert_eq!(from_number, from_text);
        assert_eq!(serde_json::to_value(&from_text).unwrap(), json!(1840000000000000001u64));

        let opaque: RecordId = "abc-1".parse().unwrap();
        assert_eq!(serde_json::to_value(&opaque).unwrap(), json!("abc-1"));
        assert!("  ".parse::<RecordId>().is_err());
    }

    #[test]
    fn test_page_request_skips_unset_fields() {
        let request = PageRequest::new(12).sorted_by("updateTime", SortOrder::Descend);
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(
            value,
            json!({ "pageSize": 12, "sortField": "updateTime", "sortOrder": "descend" })
        );
    }
}
