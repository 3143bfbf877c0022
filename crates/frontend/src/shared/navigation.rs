//! Входной контекст страницы и переход на страницу согласования

use contracts::projections::p909_component_report::export::ApprovalHandoff;
use serde::Deserialize;
use serde_json::Value;
use web_sys::window;

/// Ключ sessionStorage с данными, переданными со страницы-источника
pub const NAVIGATION_STATE_KEY: &str = "generate_pdf_navigation_state";
/// Ключ sessionStorage с данными для страницы согласования
pub const HANDOFF_STATE_KEY: &str = "send_for_approval_state";

/// Параметры строки запроса (`?cmCode=...&cmDescription=...`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    #[serde(default)]
    pub cm_code: String,
    #[serde(default)]
    pub cm_description: String,
}

/// Состояние навигации (`{ skuData: [...] }`)
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationState {
    #[serde(default)]
    pub sku_data: Vec<Value>,
}

pub fn parse_page_params(search: &str) -> PageParams {
    serde_qs::from_str(search.trim_start_matches('?')).unwrap_or_default()
}

pub fn read_page_params() -> PageParams {
    let search = window()
        .and_then(|w| w.location().search().ok())
        .unwrap_or_default();
    parse_page_params(&search)
}

fn session_storage() -> Option<web_sys::Storage> {
    window().and_then(|w| w.session_storage().ok().flatten())
}

pub fn parse_navigation_state(raw: &str) -> Option<NavigationState> {
    serde_json::from_str::<NavigationState>(raw).ok()
}

/// Читает состояние навигации и удаляет его из sessionStorage
pub fn take_navigation_state() -> Option<NavigationState> {
    let storage = session_storage()?;
    let raw = storage.get_item(NAVIGATION_STATE_KEY).ok().flatten()?;
    let _ = storage.remove_item(NAVIGATION_STATE_KEY);
    let state = parse_navigation_state(&raw);
    if state.is_none() {
        log::warn!("Ignoring malformed navigation state");
    }
    state
}

pub fn store_handoff(handoff: &ApprovalHandoff) -> Result<(), String> {
    let storage = session_storage().ok_or("Session storage is not available")?;
    let json = serde_json::to_string(handoff)
        .map_err(|e| format!("Failed to serialize approval data: {}", e))?;
    storage
        .set_item(HANDOFF_STATE_KEY, &json)
        .map_err(|e| format!("Failed to store approval data: {:?}", e))
}

pub fn navigate_to(route: &str) -> Result<(), String> {
    let window = window().ok_or("No window object")?;
    window
        .location()
        .set_href(route)
        .map_err(|e| format!("Failed to navigate to {}: {:?}", route, e))
}

pub fn history_back() {
    if let Some(history) = window().and_then(|w| w.history().ok()) {
        let _ = history.back();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_params() {
        let params = parse_page_params("?cmCode=CM%2001&cmDescription=Acme%20Ltd&active=x");
        assert_eq!(params.cm_code, "CM 01");
        assert_eq!(params.cm_description, "Acme Ltd");

        assert_eq!(parse_page_params(""), PageParams::default());
    }

    #[test]
    fn test_navigation_state() {
        let state = parse_navigation_state(
            r#"{"skuData":[{"sku_code":"A","description":"x"}],"other":1}"#,
        )
        .unwrap();
        assert_eq!(state.sku_data.len(), 1);

        assert_eq!(parse_navigation_state("{}"), Some(NavigationState::default()));
        assert!(parse_navigation_state("not json").is_none());
    }
}
