use crate::shared::config::PageConfig;
use crate::shared::navigation::{read_page_params, take_navigation_state};
use contracts::projections::p909_component_report::state::ReportState;
use leptos::prelude::*;

/// Какой запрос строк выполняется: от этого зависит переход по ответу
/// и префикс ошибки
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowsLoad {
    Initial,
    Filter,
}

impl RowsLoad {
    pub fn error_context(&self) -> &'static str {
        match self {
            RowsLoad::Initial => "Failed to load initial data",
            RowsLoad::Filter => "Backend filtering failed",
        }
    }
}

pub const MASTER_DATA_ERROR_CONTEXT: &str = "Failed to load master data";

// Create state within component scope instead of thread-local
// This ensures state is properly disposed when component unmounts
pub fn create_state(config: &PageConfig) -> RwSignal<ReportState> {
    let params = read_page_params();
    log::info!(
        "Generate PDF page initialized with cmCode={:?}, cmDescription={:?}",
        params.cm_code,
        params.cm_description
    );

    let mut state = ReportState::new(params.cm_code, params.cm_description)
        .with_max_fields(config.fields.max_selected);

    if let Some(nav) = take_navigation_state() {
        log::info!("SKU data received from navigation state: {} items", nav.sku_data.len());
        state.set_navigation_skus(&nav.sku_data);
    }

    RwSignal::new(state)
}
