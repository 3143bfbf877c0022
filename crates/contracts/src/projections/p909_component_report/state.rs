use super::dto::{MasterDataCatalog, MasterDataPayload, SkuOption};
use super::filter::{ComponentQuery, FilterCriteria};
use super::row::{
    extract_unique_skus, sku_options_from_navigation, transform_api_rows, DisplayRow,
    TransformContext, DEFAULT_MATERIAL_TYPE,
};
use super::selection::SelectionState;
use crate::enums::component_field::{ComponentField, MAX_SELECTED_FIELDS};
use crate::shared::retry::RetryNotice;
use serde_json::Value;

/// Номер поколения запроса. Ответ применяется, только если его токен
/// всё ещё последний выданный.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// Блокирующие модальные окна страницы
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportModal {
    /// Экспорт без выбранных строк
    NoData,
    /// Попытка выбрать больше допустимого числа полей
    MaxFields(usize),
    Alert(String),
}

impl ReportModal {
    pub fn title(&self) -> &'static str {
        match self {
            ReportModal::NoData => "No Data Selected",
            ReportModal::MaxFields(_) => "Maximum Selection Reached",
            ReportModal::Alert(_) => "Error",
        }
    }

    pub fn message(&self) -> String {
        match self {
            ReportModal::NoData => "No data is selected. Please select at least one row before generating the PDF.".to_string(),
            ReportModal::MaxFields(limit) => format!(
                "You can select a maximum of {} component fields. Please unselect some fields before adding new ones.",
                limit
            ),
            ReportModal::Alert(msg) => msg.clone(),
        }
    }
}

/// Состояние страницы Generate PDF.
///
/// Все изменения идут через именованные переходы; коллекции заменяются
/// целиком.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportState {
    pub cm_code: String,
    pub cm_description: String,

    pub catalog: MasterDataCatalog,
    pub sku_options: Vec<SkuOption>,
    /// id текущего периода (максимальный id из справочника)
    pub current_period: Option<String>,

    /// Черновик фильтров, редактируется контролами
    pub draft: FilterCriteria,
    /// Фильтры, с которыми построена таблица
    pub applied: FilterCriteria,

    pub rows: Vec<DisplayRow>,
    pub selection: SelectionState,

    pub loading_master: bool,
    pub loading_rows: bool,
    pub error: Option<String>,
    pub modal: Option<ReportModal>,

    pub max_fields: usize,
    generation: u64,
}

impl ReportState {
    pub fn new(cm_code: impl Into<String>, cm_description: impl Into<String>) -> Self {
        Self {
            cm_code: cm_code.into(),
            cm_description: cm_description.into(),
            catalog: MasterDataCatalog::default(),
            sku_options: Vec::new(),
            current_period: None,
            draft: FilterCriteria::default(),
            applied: FilterCriteria::default(),
            rows: Vec::new(),
            selection: SelectionState::default(),
            loading_master: false,
            loading_rows: false,
            error: None,
            modal: None,
            max_fields: MAX_SELECTED_FIELDS,
            generation: 0,
        }
    }

    pub fn with_max_fields(mut self, max_fields: usize) -> Self {
        self.max_fields = max_fields;
        self
    }

    pub fn is_loading(&self) -> bool {
        self.loading_master || self.loading_rows
    }

    // ---- master data ----

    pub fn begin_master_load(&mut self) {
        self.loading_master = true;
        self.error = None;
    }

    /// Справочники загружены. Возвращает запрос первичной загрузки,
    /// если период известен.
    pub fn master_data_loaded(
        &mut self,
        payload: &MasterDataPayload,
    ) -> Option<(RequestToken, ComponentQuery)> {
        self.loading_master = false;
        self.catalog = MasterDataCatalog::from_payload(payload);
        if let Some(skus) = payload.skus.as_ref().filter(|s| !s.is_empty()) {
            self.sku_options = skus.clone();
        }

        self.current_period = self.catalog.current_period().map(|p| p.id.to_string());
        self.draft.period_id = self.current_period.clone();
        self.applied.period_id = self.current_period.clone();

        self.initial_query()
    }

    pub fn master_data_failed(&mut self, message: impl Into<String>) {
        self.loading_master = false;
        self.error = Some(message.into());
    }

    // ---- запросы строк ----

    pub fn begin_request(&mut self) -> RequestToken {
        self.generation += 1;
        self.loading_rows = true;
        self.error = None;
        RequestToken(self.generation)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.generation
    }

    /// Запрос первичной загрузки с фильтрами по умолчанию
    pub fn initial_query(&mut self) -> Option<(RequestToken, ComponentQuery)> {
        let period = self.current_period.clone()?;
        let query = ComponentQuery::initial(&self.cm_code, Some(&period));
        Some((self.begin_request(), query))
    }

    /// Ответ первичной загрузки. `false`, если ответ устарел.
    pub fn initial_load_finished(&mut self, token: RequestToken, raw: &[Value]) -> bool {
        if !self.is_current(token) {
            return false;
        }
        self.replace_rows(raw, Some(DEFAULT_MATERIAL_TYPE));

        if self.draft.fields.is_empty() {
            self.draft.fields = ComponentField::defaults();
        }
        if self.applied.fields.is_empty() {
            self.applied.fields = ComponentField::defaults();
        }
        self.selection
            .replace_with(self.rows.iter().map(|r| r.id.clone()));

        self.applied.period_id = self.current_period.clone();
        self.applied.component_type = Some(DEFAULT_MATERIAL_TYPE.to_string());
        self.applied.exclude_internal = true;
        true
    }

    /// Ответ запроса с применёнными фильтрами; выбор строк сохраняется
    pub fn filter_load_finished(&mut self, token: RequestToken, raw: &[Value]) -> bool {
        if !self.is_current(token) {
            return false;
        }
        let material_type = self.applied.component_type.clone();
        self.replace_rows(raw, material_type.as_deref());
        true
    }

    pub fn request_failed(&mut self, token: RequestToken, message: impl Into<String>) -> bool {
        if !self.is_current(token) {
            return false;
        }
        self.loading_rows = false;
        self.error = Some(message.into());
        true
    }

    /// Промежуточное сообщение на время паузы перед повтором
    pub fn retry_scheduled(&mut self, notice: &RetryNotice) {
        self.error = Some(notice.message());
    }

    fn replace_rows(&mut self, raw: &[Value], material_type: Option<&str>) {
        let ctx = TransformContext {
            cm_code: &self.cm_code,
            cm_description: &self.cm_description,
            material_type,
        };
        let rows = transform_api_rows(raw, &ctx);
        let skus = extract_unique_skus(raw);
        if !skus.is_empty() {
            self.sku_options = skus;
        }
        self.rows = rows;
        self.loading_rows = false;
        self.error = None;
    }

    // ---- фильтры ----

    /// Черновик становится применённым; возвращает запрос к бэкенду
    pub fn apply_filters(&mut self) -> (RequestToken, ComponentQuery) {
        self.applied = self.draft.clone();
        let query = self.applied.to_query(&self.cm_code);
        (self.begin_request(), query)
    }

    /// Сброс к значениям по умолчанию и повторная первичная загрузка
    pub fn reset(&mut self) -> Option<(RequestToken, ComponentQuery)> {
        let defaults = FilterCriteria {
            period_id: self.current_period.clone(),
            ..FilterCriteria::default()
        };
        self.draft = defaults.clone();
        self.applied = defaults;
        self.rows = Vec::new();
        self.selection.clear();
        self.error = None;
        // старые ответы больше не применяются, даже если повторной загрузки нет
        self.generation += 1;
        self.loading_rows = false;
        self.initial_query()
    }

    /// Замена списка полей в черновике. Больше `max_fields` отклоняется.
    pub fn select_fields(&mut self, fields: Vec<ComponentField>) -> bool {
        if fields.len() > self.max_fields {
            self.modal = Some(ReportModal::MaxFields(self.max_fields));
            return false;
        }
        self.draft.fields = fields;
        true
    }

    pub fn set_navigation_skus(&mut self, raw: &[Value]) {
        let skus = sku_options_from_navigation(raw);
        if !skus.is_empty() {
            self.sku_options = skus;
        }
    }

    // ---- выбор строк ----

    pub fn visible_rows(&self) -> Vec<&DisplayRow> {
        self.applied.filter_rows(&self.rows, &self.catalog)
    }

    pub fn all_selected(&self) -> bool {
        self.selection.all_selected(&self.visible_rows())
    }

    pub fn toggle_select_all(&mut self, checked: bool) {
        let ids: Vec<String> = self.visible_rows().iter().map(|r| r.id.clone()).collect();
        if checked {
            self.selection.replace_with(ids);
        } else {
            self.selection.clear();
        }
    }

    pub fn toggle_row(&mut self, id: &str, checked: bool) {
        self.selection.toggle(id, checked);
    }

    /// Выбранные строки в порядке отфильтрованной таблицы
    pub fn selected_rows(&self) -> Vec<&DisplayRow> {
        self.visible_rows()
            .into_iter()
            .filter(|r| self.selection.contains(&r.id))
            .collect()
    }

    // ---- модальные окна ----

    pub fn show_modal(&mut self, modal: ReportModal) {
        self.modal = Some(modal);
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn loaded_state() -> (ReportState, RequestToken) {
        let mut state = ReportState::new("CM01", "Contract Maker");
        let payload: MasterDataPayload = serde_json::from_value(json!({
            "periods": [
                {"id": 4, "period": "2025", "is_active": false},
                {"id": 7, "period": "2026", "is_active": true}
            ],
            "component_packaging_type": [{"id": 1, "item_name": "Bottle"}]
        }))
        .unwrap();
        state.begin_master_load();
        let (token, query) = state.master_data_loaded(&payload).unwrap();
        assert_eq!(query.period_id.as_deref(), Some("7"));
        assert!(!state.loading_master);
        (state, token)
    }

    fn raw_rows() -> Vec<Value> {
        vec![
            json!({"sku_code": "A", "sku_description": "Alpha", "component_code": "C1"}),
            json!({"sku_code": "B", "component_code": "C2", "skutype": "internal"}),
            json!({"sku_code": "C", "component_code": "C3"}),
        ]
    }

    #[test]
    fn test_master_data_sets_current_period() {
        let (state, _) = loaded_state();
        assert_eq!(state.current_period.as_deref(), Some("7"));
        assert_eq!(state.draft.period_id.as_deref(), Some("7"));
        assert_eq!(state.applied.period_id.as_deref(), Some("7"));
        assert!(state.loading_rows);
    }

    #[test]
    fn test_no_periods_means_no_initial_load() {
        let mut state = ReportState::new("CM01", "");
        assert!(state
            .master_data_loaded(&MasterDataPayload::default())
            .is_none());
        assert!(!state.loading_rows);
    }

    #[test]
    fn test_initial_load_selects_every_row() {
        let (mut state, token) = loaded_state();
        state.draft.fields.clear();
        state.applied.fields.clear();

        assert!(state.initial_load_finished(token, &raw_rows()));
        assert_eq!(state.rows.len(), 3);
        assert_eq!(state.selection.len(), 3);
        assert_eq!(state.applied.fields, ComponentField::defaults());
        assert_eq!(state.draft.fields.len(), 13);
        assert_eq!(state.sku_options.len(), 3);
        assert!(!state.loading_rows);

        // внутренние строки скрыты фильтром, но остаются выбранными
        assert_eq!(state.visible_rows().len(), 2);
        assert_eq!(state.selected_rows().len(), 2);
        assert!(state.all_selected());
    }

    #[test]
    fn test_stale_response_is_dropped() {
        let (mut state, initial) = loaded_state();
        let (latest, _) = state.apply_filters();

        assert!(!state.initial_load_finished(initial, &raw_rows()));
        assert!(state.rows.is_empty());
        assert!(!state.request_failed(initial, "late failure"));
        assert!(state.error.is_none());

        assert!(state.filter_load_finished(latest, &raw_rows()[..1]));
        assert_eq!(state.rows.len(), 1);
    }

    #[test]
    fn test_apply_filters_copies_draft() {
        let (mut state, token) = loaded_state();
        state.initial_load_finished(token, &raw_rows());

        state.draft.packaging_types = vec!["Bottle".into()];
        state.draft.exclude_internal = false;
        let (_, query) = state.apply_filters();

        assert_eq!(state.applied, state.draft);
        assert_eq!(query.component_packaging_types, vec!["Bottle".to_string()]);
        assert!(!query.exclude_internal);
        assert_eq!(query.cm_code, "CM01");
    }

    #[test]
    fn test_filter_load_keeps_selection() {
        let (mut state, token) = loaded_state();
        state.initial_load_finished(token, &raw_rows());
        state.toggle_row("api-1", false);

        let (token, _) = state.apply_filters();
        state.filter_load_finished(token, &raw_rows());
        assert!(!state.selection.contains("api-1"));
        assert!(state.selection.contains("api-3"));
    }

    #[test]
    fn test_reset_restores_defaults_and_reloads() {
        let (mut state, token) = loaded_state();
        state.initial_load_finished(token, &raw_rows());
        state.draft.component_type = Some("Raw Material".into());
        state.select_fields(vec![ComponentField::ComponentCode]);
        state.apply_filters();

        let (reload, query) = state.reset().unwrap();
        assert!(state.rows.is_empty());
        assert!(state.selection.is_empty());
        assert_eq!(state.applied.fields.len(), 13);
        assert_eq!(state.draft.component_type.as_deref(), Some("Packaging"));
        assert_eq!(query, ComponentQuery::initial("CM01", Some("7")));
        assert!(state.is_current(reload));
    }

    #[test]
    fn test_field_limit() {
        let mut state = ReportState::new("CM01", "");
        let before = state.draft.fields.clone();

        assert!(!state.select_fields(ComponentField::ALL[..16].to_vec()));
        assert_eq!(state.draft.fields, before);
        assert_eq!(state.modal, Some(ReportModal::MaxFields(15)));
        assert!(state
            .modal
            .as_ref()
            .map(|m| m.message().contains("maximum of 15"))
            .unwrap_or(false));

        state.close_modal();
        assert!(state.select_fields(ComponentField::ALL[..15].to_vec()));
        assert_eq!(state.draft.fields.len(), 15);
        assert!(state.modal.is_none());
    }

    #[test]
    fn test_toggle_select_all_uses_visible_rows() {
        let (mut state, token) = loaded_state();
        state.initial_load_finished(token, &raw_rows());

        state.toggle_select_all(false);
        assert!(state.selection.is_empty());
        // пустой выбор отображается как «выбрано всё»
        assert!(state.all_selected());

        state.toggle_select_all(true);
        assert_eq!(state.selection.ids(), vec!["api-1".to_string(), "api-3".to_string()]);
    }

    #[test]
    fn test_retry_notice_and_failure_messages() {
        let (mut state, token) = loaded_state();
        state.retry_scheduled(&RetryNotice {
            attempt: 2,
            max_retries: 3,
            delay: Duration::from_secs(4),
        });
        assert_eq!(
            state.error.as_deref(),
            Some("Database connection pool exhausted. Retrying in 4 seconds... (Attempt 2/3)")
        );

        assert!(state.request_failed(token, "Failed to load initial data: boom"));
        assert!(!state.loading_rows);
        assert_eq!(state.error.as_deref(), Some("Failed to load initial data: boom"));
    }

    #[test]
    fn test_navigation_skus_populate_options() {
        let mut state = ReportState::new("CM01", "");
        state.set_navigation_skus(&[json!({"sku_code": "N1"}), json!({"sku_code": "N2"})]);
        assert_eq!(state.sku_options.len(), 2);
        state.set_navigation_skus(&[]);
        assert_eq!(state.sku_options.len(), 2);
    }
}
