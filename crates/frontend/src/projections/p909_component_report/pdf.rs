//! Отрисовка отчёта в PDF (printpdf)
//!
//! Геометрия страниц приходит из `contracts::...::layout`; здесь только
//! перевод координат (printpdf считает y снизу) и вызовы рисования.

use anyhow::anyhow;
use contracts::projections::p909_component_report::export::{ReportDocument, REPORT_TITLE};
use contracts::projections::p909_component_report::layout::{
    layout_report, line_height, text_width, RowLayout, ALTERNATE_FILL_RGB, CELL_PADDING_MM,
    CM_CODE_Y_MM, CM_DESCRIPTION_Y_MM, GENERATED_Y_MM, GRID_LINE_WIDTH, HEADER_FILL_RGB,
    MARGIN_LEFT_MM, PAGE_HEIGHT_MM, PAGE_WIDTH_MM, SUMMARY_Y_MM, TITLE_Y_MM,
};
use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Rect, Rgb,
};

const LAYER_NAME: &str = "Report";

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum RowStyle {
    Header,
    Body,
}

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb(Rgb::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        None,
    ))
}

fn black() -> Color {
    rgb((0, 0, 0))
}

fn white() -> Color {
    rgb((255, 255, 255))
}

/// y сверху вниз -> y printpdf
fn pdf_y(y_from_top: f32) -> Mm {
    Mm(PAGE_HEIGHT_MM - y_from_top)
}

/// Рисует документ и возвращает байты PDF
pub fn render_report(document: &ReportDocument) -> anyhow::Result<Vec<u8>> {
    let pages = layout_report(&document.table);

    let (doc, first_page, first_layer) = PdfDocument::new(
        REPORT_TITLE,
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        LAYER_NAME,
    );
    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| anyhow!("Failed to load font: {:?}", e))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| anyhow!("Failed to load font: {:?}", e))?,
    };

    for page in &pages {
        let layer = if page.index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_idx, layer_idx) =
                doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER_NAME);
            doc.get_page(page_idx).get_layer(layer_idx)
        };

        if page.has_preamble() {
            draw_preamble(&layer, document, &fonts);
        }
        draw_row(&layer, &page.header, &fonts.bold, RowStyle::Header);
        for row in &page.rows {
            draw_row(&layer, row, &fonts.regular, RowStyle::Body);
        }
    }

    log::debug!(
        "Rendered {} rows on {} pages",
        document.table.rows.len(),
        pages.len()
    );

    doc.save_to_bytes()
        .map_err(|e| anyhow!("Failed to write PDF: {:?}", e))
}

fn draw_preamble(layer: &PdfLayerReference, document: &ReportDocument, fonts: &Fonts) {
    let x = Mm(MARGIN_LEFT_MM);
    layer.set_fill_color(black());
    layer.use_text(REPORT_TITLE, 18.0, x, pdf_y(TITLE_Y_MM), &fonts.bold);
    layer.use_text(document.cm_code_line(), 12.0, x, pdf_y(CM_CODE_Y_MM), &fonts.bold);
    layer.use_text(
        document.cm_description_line(),
        12.0,
        x,
        pdf_y(CM_DESCRIPTION_Y_MM),
        &fonts.bold,
    );
    layer.use_text(document.generated_line(), 10.0, x, pdf_y(GENERATED_Y_MM), &fonts.regular);
    layer.use_text(document.summary_line(), 10.0, x, pdf_y(SUMMARY_Y_MM), &fonts.regular);
}

fn draw_row(layer: &PdfLayerReference, row: &RowLayout, font: &IndirectFontRef, style: RowStyle) {
    let top = row.y_top;
    let bottom = row.y_bottom();

    let fill = match style {
        RowStyle::Header => Some(HEADER_FILL_RGB),
        RowStyle::Body if row.shaded => Some(ALTERNATE_FILL_RGB),
        RowStyle::Body => None,
    };

    layer.set_outline_color(black());
    layer.set_outline_thickness(GRID_LINE_WIDTH);

    for cell in &row.cells {
        let x1 = Mm(cell.x);
        let x2 = Mm(cell.x + cell.width);

        if let Some(color) = fill {
            layer.set_fill_color(rgb(color));
            layer.add_rect(Rect::new(x1, pdf_y(bottom), x2, pdf_y(top)).with_mode(PaintMode::Fill));
        }
        layer.add_rect(Rect::new(x1, pdf_y(bottom), x2, pdf_y(top)).with_mode(PaintMode::Stroke));

        layer.set_fill_color(match style {
            RowStyle::Header => white(),
            RowStyle::Body => black(),
        });

        // текст по центру ячейки по вертикали
        let lh = line_height(row.font_pt);
        let text_block = cell.lines.len() as f32 * lh;
        let first_baseline = top + (row.height - text_block) / 2.0 + lh * 0.8;

        for (i, line) in cell.lines.iter().enumerate() {
            let x = match style {
                RowStyle::Header => {
                    cell.x + ((cell.width - text_width(line, row.font_pt)) / 2.0).max(CELL_PADDING_MM)
                }
                RowStyle::Body => cell.x + CELL_PADDING_MM,
            };
            let baseline = first_baseline + i as f32 * lh;
            layer.use_text(line.as_str(), row.font_pt, Mm(x), pdf_y(baseline), font);
        }
    }

    layer.set_fill_color(black());
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use contracts::enums::component_field::ComponentField;
    use contracts::projections::p909_component_report::export::{
        build_report_table, report_file_name, ReportSummary,
    };
    use contracts::projections::p909_component_report::row::{
        transform_api_rows, TransformContext,
    };
    use serde_json::json;

    fn document(row_count: usize) -> ReportDocument {
        let raw: Vec<_> = (0..row_count)
            .map(|i| json!({"sku_code": format!("SKU{}", i), "component_code": format!("C{}", i)}))
            .collect();
        let rows = transform_api_rows(
            &raw,
            &TransformContext {
                cm_code: "CM01",
                cm_description: "Maker",
                material_type: None,
            },
        );
        let refs: Vec<_> = rows.iter().collect();
        let generated_at = NaiveDate::from_ymd_opt(2026, 1, 2)
            .and_then(|d| d.and_hms_opt(3, 4, 5))
            .unwrap();
        ReportDocument {
            file_name: report_file_name("CM01", generated_at),
            cm_code: "CM01".into(),
            cm_description: "Maker".into(),
            generated_at,
            summary: ReportSummary::from_rows(&refs),
            table: build_report_table(&refs, &ComponentField::defaults()),
        }
    }

    #[test]
    fn test_render_produces_pdf() {
        let bytes = render_report(&document(3)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_multi_page() {
        let small = render_report(&document(1)).unwrap();
        let large = render_report(&document(200)).unwrap();
        assert!(large.len() > small.len());
    }
}
