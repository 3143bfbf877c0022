use super::row::{DisplayRow, RowType, PLACEHOLDER};
use super::state::{ReportModal, ReportState};
use crate::enums::component_field::{pdf_width_for_label, ComponentField};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Предел длины значения после санитизации
pub const SANITIZE_MAX_CHARS: usize = 50;
/// Предел длины текста ячейки PDF
pub const CELL_MAX_CHARS: usize = 40;

pub const REPORT_TITLE: &str = "Component Data Report";

const ELLIPSIS: &str = "...";

/// Базовые колонки отчёта: заголовок и ширина (мм)
const BASE_COLUMNS: [(BaseColumn, &str, f32); 4] = [
    (BaseColumn::SkuCode, "SKU Code", 25.0),
    (BaseColumn::SkuDescription, "SKU Description", 35.0),
    (BaseColumn::CmCode, "CMO Code", 20.0),
    (BaseColumn::CmDescription, "CMO Description", 30.0),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseColumn {
    SkuCode,
    SkuDescription,
    CmCode,
    CmDescription,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSource {
    Base(BaseColumn),
    Field(ComponentField),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportColumn {
    pub header: String,
    pub width: f32,
    pub source: ColumnSource,
}

impl ReportColumn {
    /// Заголовки колонок в порядке: базовые, затем выбранные поля
    pub fn for_fields(fields: &[ComponentField]) -> Vec<ReportColumn> {
        let base = BASE_COLUMNS.iter().map(|(col, header, width)| ReportColumn {
            header: header.to_string(),
            width: *width,
            source: ColumnSource::Base(*col),
        });
        let extra = fields.iter().map(|f| ReportColumn {
            header: f.label().to_string(),
            width: pdf_width_for_label(f.label()),
            source: ColumnSource::Field(*f),
        });
        base.chain(extra).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    pub sku_count: usize,
    pub component_count: usize,
}

impl ReportSummary {
    pub fn from_rows(rows: &[&DisplayRow]) -> Self {
        rows.iter().fold(Self::default(), |mut acc, row| {
            match row.row_type {
                RowType::Sku => acc.sku_count += 1,
                RowType::Component => acc.component_count += 1,
            }
            acc
        })
    }
}

/// Таблица, готовая к раскладке по страницам
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    pub columns: Vec<ReportColumn>,
    pub rows: Vec<Vec<String>>,
}

pub fn build_report_table(rows: &[&DisplayRow], fields: &[ComponentField]) -> ReportTable {
    let columns = ReportColumn::for_fields(fields);
    let body = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|col| match col.source {
                    ColumnSource::Base(base) => {
                        format_cell(None, &sanitize_value(&Value::String(base_value(row, base))))
                    }
                    ColumnSource::Field(field) => {
                        format_cell(Some(field.label()), &sanitize_value(row.value(field)))
                    }
                })
                .collect()
        })
        .collect();
    ReportTable {
        columns,
        rows: body,
    }
}

fn base_value(row: &DisplayRow, column: BaseColumn) -> String {
    match column {
        BaseColumn::SkuCode => row.sku_code.clone(),
        BaseColumn::SkuDescription => row.sku_description.clone(),
        BaseColumn::CmCode => row.cm_code.clone(),
        BaseColumn::CmDescription => row.cm_description.clone(),
    }
}

/// Приводит значение к безопасному для экспорта виду
pub fn sanitize_value(value: &Value) -> Value {
    match value {
        Value::Null => Value::String(PLACEHOLDER.to_string()),
        Value::Object(_) | Value::Array(_) => {
            let json = value.to_string();
            Value::String(format!("{}{}", take_chars(&json, SANITIZE_MAX_CHARS), ELLIPSIS))
        }
        Value::String(s) if s.chars().count() > SANITIZE_MAX_CHARS => {
            Value::String(format!("{}{}", take_chars(s, SANITIZE_MAX_CHARS), ELLIPSIS))
        }
        other => other.clone(),
    }
}

/// Плоская санитизированная копия строки для передачи на страницу согласования
pub fn sanitize_row(row: &DisplayRow) -> Map<String, Value> {
    let mut map = Map::new();
    let base = [
        ("id", Value::String(row.id.clone())),
        (
            "type",
            serde_json::to_value(row.row_type).unwrap_or(Value::Null),
        ),
        ("sku_code", Value::String(row.sku_code.clone())),
        ("sku_description", Value::String(row.sku_description.clone())),
        ("sku_reference", Value::String(row.sku_reference.clone())),
        ("skutype", Value::String(row.skutype.clone())),
        ("bulk_expert", Value::String(row.bulk_expert.clone())),
        ("is_approved", Value::Bool(row.is_approved)),
        ("is_active", Value::Bool(row.is_active)),
        ("cm_code", Value::String(row.cm_code.clone())),
        ("cm_description", Value::String(row.cm_description.clone())),
        ("material_type", Value::String(row.material_type.clone())),
        ("site", Value::String(row.site.clone())),
        ("period", Value::String(row.period.clone())),
    ];
    for (key, value) in base {
        map.insert(key.to_string(), sanitize_value(&value));
    }
    for field in ComponentField::ALL {
        map.insert(field.key().to_string(), sanitize_value(row.value(field)));
    }
    map
}

/// Текст ячейки PDF
pub fn format_cell(label: Option<&str>, value: &Value) -> String {
    let text = match value {
        Value::Null => return PLACEHOLDER.to_string(),
        Value::String(s) if s.is_empty() => return PLACEHOLDER.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    // Ноль тоже число: `0` в процентной колонке печатается как `0%`
    if label.map(|l| l.contains('%')).unwrap_or(false) && is_numeric(value) {
        return format!("{}%", text);
    }

    if text.chars().count() > CELL_MAX_CHARS {
        format!("{}{}", take_chars(&text, CELL_MAX_CHARS), ELLIPSIS)
    } else {
        text
    }
}

fn is_numeric(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::String(s) => {
            let t = s.trim();
            !t.is_empty() && t.parse::<f64>().map(|n| n.is_finite()).unwrap_or(false)
        }
        _ => false,
    }
}

fn take_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

/// Имя файла: `component_report_{cm_code}_{YYYYMMDD_HHMMSS}.pdf`
pub fn report_file_name(cm_code: &str, now: NaiveDateTime) -> String {
    format!(
        "component_report_{}_{}.pdf",
        cm_code,
        now.format("%Y%m%d_%H%M%S")
    )
}

/// Всё, что нужно для отрисовки PDF
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub file_name: String,
    pub cm_code: String,
    pub cm_description: String,
    pub generated_at: NaiveDateTime,
    pub summary: ReportSummary,
    pub table: ReportTable,
}

impl ReportDocument {
    /// Строки преамбулы первой страницы
    pub fn cm_code_line(&self) -> String {
        format!("CMO Code: {}", self.cm_code)
    }

    pub fn cm_description_line(&self) -> String {
        format!("CMO Description: {}", self.cm_description)
    }

    pub fn generated_line(&self) -> String {
        format!(
            "Generated: {} at {}",
            self.generated_at.format("%d/%m/%Y"),
            self.generated_at.format("%H:%M:%S")
        )
    }

    pub fn summary_line(&self) -> String {
        format!(
            "Data Summary: {} SKUs, {} Components",
            self.summary.sku_count, self.summary.component_count
        )
    }
}

/// Данные, передаваемые странице согласования
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalHandoff {
    pub selected_rows: Vec<String>,
    pub table_data: Vec<DisplayRow>,
    pub cm_code: String,
    pub cm_description: String,
    pub selected_fields: Vec<String>,
    pub selected_data: Vec<Map<String, Value>>,
    pub selected_period: Option<String>,
    #[serde(rename = "generatePDF")]
    pub generate_pdf: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportPlan {
    pub document: ReportDocument,
    pub handoff: ApprovalHandoff,
}

/// Проверяет предусловия экспорта и собирает документ и данные передачи.
/// Ошибка — модальное окно, которое нужно показать вместо экспорта.
pub fn prepare_export(state: &ReportState, now: NaiveDateTime) -> Result<ExportPlan, ReportModal> {
    if state.selection.is_empty() {
        return Err(ReportModal::NoData);
    }

    let selected = state.selected_rows();
    if selected.is_empty() {
        return Err(ReportModal::Alert(
            "No data selected for PDF generation. Please select at least one row.".to_string(),
        ));
    }

    let fields = &state.applied.fields;
    let document = ReportDocument {
        file_name: report_file_name(&state.cm_code, now),
        cm_code: state.cm_code.clone(),
        cm_description: state.cm_description.clone(),
        generated_at: now,
        summary: ReportSummary::from_rows(&selected),
        table: build_report_table(&selected, fields),
    };

    let handoff = ApprovalHandoff {
        selected_rows: state.selection.ids(),
        table_data: state.rows.clone(),
        cm_code: state.cm_code.clone(),
        cm_description: state.cm_description.clone(),
        selected_fields: state
            .applied
            .field_labels()
            .into_iter()
            .map(str::to_string)
            .collect(),
        selected_data: selected.iter().map(|r| sanitize_row(r)).collect(),
        selected_period: state.applied.period_id.clone(),
        generate_pdf: true,
    };

    Ok(ExportPlan { document, handoff })
}

/// Текст блокирующего окна при ошибке генерации
pub fn export_error_message(message: &str) -> String {
    format!(
        "Error generating PDF: {}. Please try again or contact support.",
        message
    )
}
