use crate::shared::api_error::ApiError;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Ответ `GET /masterdata`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MasterDataResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: MasterDataPayload,
}

impl MasterDataResponse {
    pub fn into_result(self) -> Result<MasterDataPayload, ApiError> {
        if self.success {
            Ok(self.data)
        } else {
            Err(ApiError::backend(
                self.message.unwrap_or_else(|| "Unknown error".to_string()),
            ))
        }
    }
}

/// Справочники. Каждый список может отсутствовать независимо от других;
/// нераспознанные элементы списка отбрасываются, остальные сохраняются.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MasterDataPayload {
    /// Периоды приходят либо строками, либо объектами `{id, period, is_active}`
    #[serde(default, deserialize_with = "lenient_list")]
    pub periods: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub material_types: Option<Vec<LookupItem>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub component_packaging_type: Option<Vec<PackagingType>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub component_base_uoms: Option<Vec<LookupItem>>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub skus: Option<Vec<SkuOption>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupItem {
    #[serde(deserialize_with = "lenient_id")]
    pub id: i64,
    pub item_name: String,
    #[serde(default)]
    pub item_order: Option<i64>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackagingType {
    #[serde(deserialize_with = "lenient_id")]
    pub id: i64,
    pub item_name: String,
    /// Переименованное отображаемое значение
    #[serde(default)]
    pub item_name_new: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl PackagingType {
    /// Предпочтительное значение для фильтра: `item_name_new`, иначе `item_name`
    pub fn display_value(&self) -> &str {
        match self.item_name_new.as_deref() {
            Some(v) if !v.is_empty() => v,
            _ => &self.item_name,
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        self.item_name == value || self.item_name_new.as_deref() == Some(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Period {
    pub id: i64,
    pub period: String,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkuOption {
    #[serde(deserialize_with = "lenient_id")]
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sku_code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sku_description: String,
}

/// Ответ `GET /components/filterdata-generatepdf`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentFilterResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<Value>,
    #[serde(default)]
    pub total_count: Option<i64>,
    #[serde(default)]
    pub query_info: Option<Value>,
    #[serde(default)]
    pub excel_pdf_generation: Option<Value>,
}

impl ComponentFilterResponse {
    pub fn into_result(self) -> Result<Vec<Value>, ApiError> {
        if self.success {
            Ok(self.data)
        } else {
            Err(ApiError::backend(
                self.message.unwrap_or_else(|| "Unknown error".to_string()),
            ))
        }
    }
}

/// Справочники страницы; заполняются один раз и дальше только читаются
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MasterDataCatalog {
    /// Отсортированы по id по убыванию
    pub periods: Vec<Period>,
    pub material_types: Vec<LookupItem>,
    pub packaging_types: Vec<PackagingType>,
    pub base_uoms: Vec<LookupItem>,
}

impl MasterDataCatalog {
    pub fn from_payload(payload: &MasterDataPayload) -> Self {
        Self {
            periods: payload
                .periods
                .as_deref()
                .map(normalize_periods)
                .unwrap_or_default(),
            material_types: payload.material_types.clone().unwrap_or_default(),
            packaging_types: payload.component_packaging_type.clone().unwrap_or_default(),
            base_uoms: payload.component_base_uoms.clone().unwrap_or_default(),
        }
    }

    /// Текущий период — с наибольшим id
    pub fn current_period(&self) -> Option<&Period> {
        self.periods.iter().max_by_key(|p| p.id)
    }

    pub fn period_label(&self, id: &str) -> Option<&str> {
        self.periods
            .iter()
            .find(|p| p.id.to_string() == id)
            .map(|p| p.period.as_str())
    }

    pub fn find_packaging_type(&self, value: &str) -> Option<&PackagingType> {
        self.packaging_types.iter().find(|pt| pt.matches(value))
    }

    /// Значения для мультиселекта типов упаковки
    pub fn packaging_type_options(&self) -> Vec<String> {
        self.packaging_types
            .iter()
            .map(|pt| pt.display_value().to_string())
            .collect()
    }
}

/// Приводит сырые периоды к `Period`, отбрасывает нераспознанные,
/// сортирует по id по убыванию
pub fn normalize_periods(raw: &[Value]) -> Vec<Period> {
    let mut periods: Vec<Period> = raw
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => parse_leading_int(s).map(|id| Period {
                id,
                period: s.clone(),
                is_active: true,
            }),
            Value::Object(obj) => {
                let id = match obj.get("id")? {
                    Value::Number(n) => n.as_i64()?,
                    Value::String(s) => parse_leading_int(s)?,
                    _ => return None,
                };
                let period = obj.get("period")?.as_str()?.to_string();
                if period.is_empty() {
                    return None;
                }
                let is_active = obj
                    .get("is_active")
                    .and_then(Value::as_bool)
                    .unwrap_or(true);
                Some(Period {
                    id,
                    period,
                    is_active,
                })
            }
            _ => None,
        })
        .collect();
    periods.sort_by(|a, b| b.id.cmp(&a.id));
    periods
}

/// `null` читается как значение по умолчанию
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Список справочника: не-массив даёт `None`, битые элементы пропускаются
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => Ok(Some(
            items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
        )),
        _ => Ok(None),
    }
}

/// id числом или строкой (`7`, `"7"`)
fn lenient_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    let id = match &raw {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => parse_leading_int(s),
        _ => None,
    };
    id.ok_or_else(|| D::Error::custom(format!("invalid id: {}", raw)))
}

fn parse_leading_int(s: &str) -> Option<i64> {
    let trimmed = s.trim();
    let digits: String = trimmed
        .char_indices()
        .take_while(|(i, c)| c.is_ascii_digit() || (*i == 0 && (*c == '-' || *c == '+')))
        .map(|(_, c)| c)
        .collect();
    digits.parse().ok()
}
