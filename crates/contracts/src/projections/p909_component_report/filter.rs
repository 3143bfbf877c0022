use super::dto::MasterDataCatalog;
use super::row::{DisplayRow, DEFAULT_MATERIAL_TYPE};
use crate::enums::component_field::ComponentField;
use serde::{Deserialize, Serialize};

/// Набор фильтров страницы. Хранится дважды: черновик и применённый.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub period_id: Option<String>,
    pub component_type: Option<String>,
    pub packaging_types: Vec<String>,
    /// Фильтр по SKU скрыт в UI, но участвует в клиентской фильтрации
    pub skus: Vec<String>,
    pub exclude_internal: bool,
    pub fields: Vec<ComponentField>,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            period_id: None,
            component_type: Some(DEFAULT_MATERIAL_TYPE.to_string()),
            packaging_types: Vec::new(),
            skus: Vec::new(),
            exclude_internal: true,
            fields: ComponentField::defaults(),
        }
    }
}

impl FilterCriteria {
    pub fn field_labels(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.label()).collect()
    }

    /// Клиентский предикат поверх уже отфильтрованных бэкендом строк
    pub fn matches(&self, row: &DisplayRow, catalog: &MasterDataCatalog) -> bool {
        if !self.fields.is_empty() && !self.fields.iter().any(|f| row.has_value(*f)) {
            return false;
        }

        if let Some(component_type) = self.component_type.as_deref().filter(|c| !c.is_empty()) {
            if !row.material_type.is_empty() && row.material_type != component_type {
                return false;
            }
        }

        if !self.packaging_types.is_empty() {
            if let Some(value) = row.packaging_type().filter(|v| !v.is_empty()) {
                let compare = catalog
                    .find_packaging_type(value)
                    .map(|pt| pt.display_value())
                    .unwrap_or(value);
                if !self.packaging_types.iter().any(|p| p == compare) {
                    return false;
                }
            }
        }

        if !self.skus.is_empty() && !row.sku_code.is_empty() && !self.skus.contains(&row.sku_code)
        {
            return false;
        }

        !(self.exclude_internal && row.is_internal())
    }

    /// Стабильный фильтр: порядок строк сохраняется
    pub fn filter_rows<'a>(
        &self,
        rows: &'a [DisplayRow],
        catalog: &MasterDataCatalog,
    ) -> Vec<&'a DisplayRow> {
        rows.iter().filter(|r| self.matches(r, catalog)).collect()
    }

    pub fn to_query(&self, cm_code: &str) -> ComponentQuery {
        ComponentQuery {
            cm_code: cm_code.to_string(),
            period_id: self.period_id.clone().filter(|p| !p.is_empty()),
            material_type: self.component_type.clone().filter(|c| !c.is_empty()),
            component_packaging_types: self.packaging_types.clone(),
            exclude_internal: self.exclude_internal,
        }
    }
}

/// Параметры `GET /components/filterdata-generatepdf`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentQuery {
    pub cm_code: String,
    pub period_id: Option<String>,
    pub material_type: Option<String>,
    pub component_packaging_types: Vec<String>,
    pub exclude_internal: bool,
}

impl ComponentQuery {
    /// Запрос первичной загрузки с фильтрами по умолчанию
    pub fn initial(cm_code: &str, period_id: Option<&str>) -> Self {
        Self {
            cm_code: cm_code.to_string(),
            period_id: period_id.filter(|p| !p.is_empty()).map(str::to_string),
            material_type: Some(DEFAULT_MATERIAL_TYPE.to_string()),
            component_packaging_types: Vec::new(),
            exclude_internal: true,
        }
    }

    /// Query string без `?`; массивы сериализуются повторяющимися ключами
    pub fn to_query_string(&self) -> String {
        let mut pairs: Vec<(&str, String)> = Vec::new();
        if !self.cm_code.is_empty() {
            pairs.push(("cm_code", self.cm_code.clone()));
        }
        if let Some(p) = &self.period_id {
            pairs.push(("period_id", p.clone()));
        }
        if let Some(m) = &self.material_type {
            pairs.push(("material_type", m.clone()));
        }
        for pt in self.component_packaging_types.iter().filter(|p| !p.is_empty()) {
            pairs.push(("component_packaging_types", pt.clone()));
        }
        pairs.push(("exclude_internal", self.exclude_internal.to_string()));

        pairs
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(&v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}
