use serde::{Deserialize, Deserializer, Serialize, de::Error};
use std::str::FromStr;

/// 列表接口的分页参数，查询字符串中的数字文本同样接受
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationQuery {
    #[serde(default = "default_page", deserialize_with = "deserialize_lenient")]
    pub page: i64,
    #[serde(default = "default_size", deserialize_with = "deserialize_lenient")]
    pub size: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationInfo {
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
}

/// 原生值或其文本形式
#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Value(T),
    Text(String),
}

impl<T: FromStr> Lenient<T> {
    /// 空文本视为未提供
    fn into_option<E: Error>(self) -> Result<Option<T>, E> {
        match self {
            Lenient::Value(value) => Ok(Some(value)),
            Lenient::Text(text) if text.trim().is_empty() => Ok(None),
            Lenient::Text(text) => text
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| E::custom(format!("invalid value: {text:?}"))),
        }
    }
}

fn deserialize_lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
{
    Lenient::<T>::deserialize(deserializer)?
        .into_option()?
        .ok_or_else(|| D::Error::custom("value must not be empty"))
}

fn deserialize_lenient_option<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
{
    match Option::<Lenient<T>>::deserialize(deserializer)? {
        Some(value) => value.into_option(),
        None => Ok(None),
    }
}

/// 可选整数过滤参数；空字符串视为未提供
pub fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_lenient_option(deserializer)
}

/// 可选布尔参数，接受 `true`/`false`
pub fn deserialize_optional_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_lenient_option(deserializer)
}

fn default_page() -> i64 {
    1
}

fn default_size() -> i64 {
    10
}

impl PaginationQuery {
    /// 从 1 开始
    pub fn page(&self) -> u64 {
        self.page.max(1) as u64
    }

    /// 1..=100
    pub fn size(&self) -> u64 {
        self.size.clamp(1, 100) as u64
    }
}

impl PaginationInfo {
    pub fn new(page: u64, size: u64, total: u64, total_pages: u64) -> Self {
        Self {
            page: page as i64,
            page_size: size as i64,
            total: total as i64,
            total_pages: total_pages as i64,
        }
    }
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            size: default_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_accepts_string_numbers() {
        let query: PaginationQuery = serde_json::from_str(r#"{"page": "3", "size": 20}"#).unwrap();
        assert_eq!(query.page(), 3);
        assert_eq!(query.size(), 20);
    }

    #[test]
    fn test_query_defaults_and_clamping() {
        let query: PaginationQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.page(), 1);
        assert_eq!(query.size(), 10);

        let query = PaginationQuery { page: -4, size: 1000 };
        assert_eq!(query.page(), 1);
        assert_eq!(query.size(), 100);
    }

    #[derive(Deserialize)]
    struct Filters {
        #[serde(default, deserialize_with = "deserialize_optional_i64")]
        department_id: Option<i64>,
        #[serde(default, deserialize_with = "deserialize_optional_bool")]
        unread_only: Option<bool>,
    }

    #[test]
    fn test_optional_filters_from_text() {
        let filters: Filters =
            serde_json::from_str(r#"{"department_id": "7", "unread_only": "true"}"#).unwrap();
        assert_eq!(filters.department_id, Some(7));
        assert_eq!(filters.unread_only, Some(true));

        let filters: Filters = serde_json::from_str("{}").unwrap();
        assert_eq!(filters.department_id, None);
        assert_eq!(filters.unread_only, None);

        let filters: Filters =
            serde_json::from_str(r#"{"department_id": "", "unread_only": false}"#).unwrap();
        assert_eq!(filters.department_id, None);
        assert_eq!(filters.unread_only, Some(false));

        assert!(serde_json::from_str::<Filters>(r#"{"unread_only": "maybe"}"#).is_err());
        assert!(serde_json::from_str::<Filters>(r#"{"department_id": "seven"}"#).is_err());
    }
}
