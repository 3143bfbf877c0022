use super::dto::SkuOption;
use crate::enums::component_field::ComponentField;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};

/// Заглушка для отсутствующих значений
pub const PLACEHOLDER: &str = "-";

/// Тип строки, если в выборке нет `material_type`
pub const DEFAULT_MATERIAL_TYPE: &str = "Packaging";

pub const SKUTYPE_INTERNAL: &str = "internal";
pub const SKUTYPE_EXTERNAL: &str = "external";

static PLACEHOLDER_VALUE: Lazy<Value> = Lazy::new(|| Value::String(PLACEHOLDER.to_string()));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowType {
    Sku,
    Component,
}

/// Плоская строка таблицы и PDF
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayRow {
    /// `api-<n>`, n начинается с 1
    pub id: String,
    #[serde(rename = "type")]
    pub row_type: RowType,

    // SKU
    pub sku_code: String,
    pub sku_description: String,
    pub sku_reference: String,
    pub skutype: String,
    pub bulk_expert: String,
    pub is_approved: bool,
    pub is_active: bool,

    // Контекст
    pub cm_code: String,
    pub cm_description: String,
    pub material_type: String,
    pub site: String,
    pub period: String,

    /// Значение для каждого из 22 полей компонента
    pub fields: BTreeMap<ComponentField, Value>,
}

impl DisplayRow {
    pub fn value(&self, field: ComponentField) -> &Value {
        self.fields.get(&field).unwrap_or(&PLACEHOLDER_VALUE)
    }

    /// Есть ли у поля данные (не null и не пустая строка)
    pub fn has_value(&self, field: ComponentField) -> bool {
        !is_blank(self.value(field))
    }

    pub fn is_internal(&self) -> bool {
        self.skutype == SKUTYPE_INTERNAL
    }

    pub fn packaging_type(&self) -> Option<&str> {
        text_of(self.value(ComponentField::ComponentPackagingTypeId))
    }
}

/// Контекст страницы, из которого заполняются отсутствующие поля строки
#[derive(Debug, Clone, Copy)]
pub struct TransformContext<'a> {
    pub cm_code: &'a str,
    pub cm_description: &'a str,
    /// Тип материала, с которым запрашивались данные
    pub material_type: Option<&'a str>,
}

/// Преобразует сырые строки API в строки таблицы
pub fn transform_api_rows(raw: &[Value], ctx: &TransformContext<'_>) -> Vec<DisplayRow> {
    raw.iter()
        .enumerate()
        .map(|(index, item)| transform_api_row(index, item, ctx))
        .collect()
}

fn transform_api_row(index: usize, item: &Value, ctx: &TransformContext<'_>) -> DisplayRow {
    let empty = Map::new();
    let obj = item.as_object().unwrap_or(&empty);

    let fields: BTreeMap<ComponentField, Value> = ComponentField::ALL
        .iter()
        .map(|field| {
            let raw = field
                .source_keys()
                .iter()
                .filter_map(|key| obj.get(*key))
                .find(|v| !is_blank(v));
            let value = match raw {
                Some(v) if field.is_date() => format_api_date(v),
                Some(v) => v.clone(),
                None => PLACEHOLDER_VALUE.clone(),
            };
            (*field, value)
        })
        .collect();

    let has_component = obj
        .get("component_code")
        .map(|v| !is_blank(v))
        .unwrap_or(false);

    let material_type = string_or(obj, "material_type", None)
        .or_else(|| ctx.material_type.filter(|m| !m.is_empty()).map(str::to_string))
        .unwrap_or_else(|| DEFAULT_MATERIAL_TYPE.to_string());

    DisplayRow {
        id: format!("api-{}", index + 1),
        row_type: if has_component {
            RowType::Component
        } else {
            RowType::Sku
        },
        sku_code: string_or_placeholder(obj, "sku_code"),
        sku_description: string_or_placeholder(obj, "sku_description"),
        sku_reference: string_or_placeholder(obj, "sku_reference"),
        skutype: string_or(obj, "skutype", Some(SKUTYPE_EXTERNAL))
            .unwrap_or_else(|| SKUTYPE_EXTERNAL.to_string()),
        bulk_expert: string_or_placeholder(obj, "formulation_reference"),
        is_approved: true,
        is_active: obj
            .get("sku_is_active")
            .and_then(Value::as_bool)
            .unwrap_or(true),
        cm_code: string_or(obj, "sku_cm_code", Some(ctx.cm_code))
            .unwrap_or_default(),
        cm_description: string_or(obj, "cm_description", Some(ctx.cm_description))
            .unwrap_or_default(),
        material_type,
        site: string_or_placeholder(obj, "site"),
        period: string_or_placeholder(obj, "period"),
        fields,
    }
}

/// Уникальные SKU из ответа API; при повторе кода побеждает первое описание
pub fn extract_unique_skus(raw: &[Value]) -> Vec<SkuOption> {
    let mut seen = HashSet::new();
    let mut result = Vec::new();
    for item in raw {
        let Some(obj) = item.as_object() else { continue };
        let code = ["sku_code", "SKU Code"]
            .iter()
            .filter_map(|k| obj.get(*k).and_then(text_of))
            .find(|s| !s.is_empty());
        let Some(code) = code else { continue };
        if !seen.insert(code.to_string()) {
            continue;
        }
        let description = ["sku_description", "SKU Description"]
            .iter()
            .filter_map(|k| obj.get(*k).and_then(text_of))
            .find(|s| !s.is_empty())
            .unwrap_or(code);
        result.push(SkuOption {
            id: result.len() as i64 + 1,
            sku_code: code.to_string(),
            sku_description: description.to_string(),
        });
    }
    result
}

/// SKU, переданные со страницы-источника при навигации (`skuData`)
pub fn sku_options_from_navigation(raw: &[Value]) -> Vec<SkuOption> {
    let mut seen = HashSet::new();
    let mut result = Vec::new();
    for (index, item) in raw.iter().enumerate() {
        let Some(obj) = item.as_object() else { continue };
        let Some(code) = obj.get("sku_code").and_then(text_of).filter(|s| !s.is_empty()) else {
            continue;
        };
        if !seen.insert(code.to_string()) {
            continue;
        }
        let description = ["sku_description", "description"]
            .iter()
            .filter_map(|k| obj.get(*k).and_then(text_of))
            .find(|s| !s.is_empty())
            .unwrap_or("No Description");
        let id = obj
            .get("id")
            .and_then(Value::as_i64)
            .unwrap_or(index as i64 + 1);
        result.push(SkuOption {
            id,
            sku_code: code.to_string(),
            sku_description: description.to_string(),
        });
    }
    result
}

/// null или пустая строка
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn text_of(value: &Value) -> Option<&str> {
    value.as_str()
}

fn string_or(obj: &Map<String, Value>, key: &str, fallback: Option<&str>) -> Option<String> {
    match obj.get(key) {
        Some(v) if !is_blank(v) => Some(scalar_to_string(v)),
        _ => fallback.filter(|f| !f.is_empty()).map(str::to_string),
    }
}

fn string_or_placeholder(obj: &Map<String, Value>, key: &str) -> String {
    string_or(obj, key, Some(PLACEHOLDER)).unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// Строковое представление скалярного JSON-значения
pub fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Дата API -> DD/MM/YYYY; нераспознанные значения становятся заглушкой
fn format_api_date(value: &Value) -> Value {
    let formatted = value
        .as_str()
        .and_then(parse_api_date)
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string());
    Value::String(formatted)
}

fn parse_api_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx() -> TransformContext<'static> {
        TransformContext {
            cm_code: "CM01",
            cm_description: "Contract Maker",
            material_type: Some("Packaging"),
        }
    }

    #[test]
    fn test_ids_are_unique_and_sequential() {
        let raw = vec![json!({"sku_code": "A"}), json!({"sku_code": "B"}), json!({})];
        let rows = transform_api_rows(&raw, &ctx());
        let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["api-1", "api-2", "api-3"]);
    }

    #[test]
    fn test_every_field_is_value_or_placeholder() {
        let raw = vec![json!({
            "sku_code": "SKU1",
            "component_code": "C-1",
            "component_quantity": 12,
            "component_uom_id": null,
            "component_description": "",
            "Component Packaging Material": "PET",
            "mapping_valid_from": "2024-03-15T00:00:00Z",
            "mapping_valid_to": "not a date"
        })];
        let row = &transform_api_rows(&raw, &ctx())[0];

        assert_eq!(row.fields.len(), ComponentField::COUNT);
        for field in ComponentField::ALL {
            assert!(!row.value(field).is_null(), "{} is null", field.key());
        }
        assert_eq!(row.value(ComponentField::ComponentQuantity), &json!(12));
        assert_eq!(row.value(ComponentField::ComponentUomId), &json!("-"));
        assert_eq!(row.value(ComponentField::ComponentDescription), &json!("-"));
        assert_eq!(row.value(ComponentField::ComponentPackagingMaterial), &json!("PET"));
        assert_eq!(row.value(ComponentField::ComponentValidFrom), &json!("15/03/2024"));
        assert_eq!(row.value(ComponentField::ComponentValidTo), &json!("-"));
        assert_eq!(row.value(ComponentField::ComponentDimensions), &json!("-"));
    }

    #[test]
    fn test_row_type_and_context_defaults() {
        let raw = vec![
            json!({"sku_code": "SKU1", "component_code": "C-1", "skutype": "internal"}),
            json!({"sku_code": "SKU1", "sku_cm_code": "CM99", "cm_description": "Other"}),
        ];
        let rows = transform_api_rows(&raw, &ctx());

        assert_eq!(rows[0].row_type, RowType::Component);
        assert!(rows[0].is_internal());
        assert_eq!(rows[0].cm_code, "CM01");
        assert_eq!(rows[0].material_type, "Packaging");

        assert_eq!(rows[1].row_type, RowType::Sku);
        assert_eq!(rows[1].skutype, SKUTYPE_EXTERNAL);
        assert_eq!(rows[1].cm_code, "CM99");
        assert_eq!(rows[1].cm_description, "Other");
        assert_eq!(rows[1].sku_description, PLACEHOLDER);
    }

    #[test]
    fn test_extract_unique_skus_first_description_wins() {
        let raw = vec![
            json!({"sku_code": "A", "sku_description": "First"}),
            json!({"sku_code": "A", "sku_description": "Second"}),
            json!({"SKU Code": "B"}),
            json!({"component_code": "C-1"}),
        ];
        let skus = extract_unique_skus(&raw);
        assert_eq!(skus.len(), 2);
        assert_eq!(skus[0].sku_description, "First");
        assert_eq!(skus[1].sku_code, "B");
        assert_eq!(skus[1].sku_description, "B");
        assert_eq!(skus[1].id, 2);
    }

    #[test]
    fn test_navigation_skus() {
        let raw = vec![
            json!({"sku_code": "X", "description": "From nav", "id": 40}),
            json!({"sku_code": "X", "sku_description": "Dup"}),
            json!({"sku_code": "Y"}),
        ];
        let skus = sku_options_from_navigation(&raw);
        assert_eq!(skus.len(), 2);
        assert_eq!(skus[0].id, 40);
        assert_eq!(skus[0].sku_description, "From nav");
        assert_eq!(skus[1].id, 3);
        assert_eq!(skus[1].sku_description, "No Description");
    }
}
