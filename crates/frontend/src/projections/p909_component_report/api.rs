use crate::shared::api_utils::api_url;
use crate::shared::config::PageConfig;
use contracts::projections::p909_component_report::dto::{
    ComponentFilterResponse, MasterDataPayload, MasterDataResponse,
};
use contracts::projections::p909_component_report::filter::ComponentQuery;
use contracts::shared::api_error::ApiError;
use gloo_net::http::Request;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

const MASTER_DATA_PATH: &str = "/masterdata";
const COMPONENTS_PATH: &str = "/components/filterdata-generatepdf";

/// Справочники для фильтров
pub async fn fetch_master_data(config: &PageConfig) -> Result<MasterDataPayload, ApiError> {
    let url = api_url(config, MASTER_DATA_PATH);
    let response: MasterDataResponse = get_json(&url).await?;
    response.into_result()
}

/// Строки компонентов по фильтрам
pub async fn fetch_components(
    config: &PageConfig,
    query: &ComponentQuery,
) -> Result<Vec<Value>, ApiError> {
    let url = format!(
        "{}?{}",
        api_url(config, COMPONENTS_PATH),
        query.to_query_string()
    );
    let response: ComponentFilterResponse = get_json(&url).await?;
    if let Some(total) = response.total_count {
        log::debug!("Backend reported {} component rows", total);
    }
    response.into_result()
}

async fn get_json<T: DeserializeOwned>(url: &str) -> Result<T, ApiError> {
    log::debug!("GET {}", url);
    let response = Request::get(url)
        .send()
        .await
        .map_err(|e| ApiError::transport(format!("Request failed: {}", e)))?;

    if !response.ok() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::transport(error_message(status, &body)));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::decode(e.to_string()))
}

/// Текст ошибки для не-2xx ответа: `message` из тела, если есть
fn error_message(status: u16, body: &str) -> String {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .filter(|m| !m.is_empty())
        .or_else(|| Some(body.trim().to_string()).filter(|b| !b.is_empty()));

    match message {
        Some(m) => format!("HTTP error {}: {}", status, m),
        None => format!("HTTP error: {}", status),
    }
}

/// Пауза перед повтором запроса
pub async fn sleep(delay: Duration) {
    let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
    gloo_timers::future::TimeoutFuture::new(millis).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_backend_message() {
        assert_eq!(
            error_message(500, r#"{"success":false,"message":"remaining connection slots are reserved"}"#),
            "HTTP error 500: remaining connection slots are reserved"
        );
        assert_eq!(error_message(502, "Bad Gateway"), "HTTP error 502: Bad Gateway");
        assert_eq!(error_message(404, ""), "HTTP error: 404");
    }
}
