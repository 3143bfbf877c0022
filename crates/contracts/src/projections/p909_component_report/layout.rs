//! Раскладка таблицы отчёта по страницам A4 (альбомная ориентация).
//!
//! Координаты в миллиметрах, отсчёт сверху вниз от левого верхнего угла.
//! Отрисовка (printpdf) только переводит их в свою систему координат.

use super::export::ReportTable;

pub const PAGE_WIDTH_MM: f32 = 297.0;
pub const PAGE_HEIGHT_MM: f32 = 210.0;
pub const MARGIN_LEFT_MM: f32 = 10.0;
pub const MARGIN_RIGHT_MM: f32 = 10.0;
pub const MARGIN_TOP_MM: f32 = 15.0;
pub const MARGIN_BOTTOM_MM: f32 = 10.0;
/// Таблица на первой странице начинается под преамбулой
pub const FIRST_PAGE_TABLE_TOP_MM: f32 = 72.0;

pub const HEADER_FONT_PT: f32 = 7.0;
pub const BODY_FONT_PT: f32 = 6.0;
pub const CELL_PADDING_MM: f32 = 1.0;
pub const GRID_LINE_WIDTH: f32 = 0.1;

pub const HEADER_FILL_RGB: (u8, u8, u8) = (40, 167, 69);
pub const ALTERNATE_FILL_RGB: (u8, u8, u8) = (248, 249, 250);

/// y базовых линий преамбулы первой страницы
pub const TITLE_Y_MM: f32 = 20.0;
pub const CM_CODE_Y_MM: f32 = 35.0;
pub const CM_DESCRIPTION_Y_MM: f32 = 45.0;
pub const GENERATED_Y_MM: f32 = 55.0;
pub const SUMMARY_Y_MM: f32 = 65.0;

const PT_TO_MM: f32 = 0.352_8;
const LINE_SPACING: f32 = 1.15;
/// Средняя ширина символа Helvetica относительно кегля
const AVG_CHAR_WIDTH: f32 = 0.5;

pub fn usable_width() -> f32 {
    PAGE_WIDTH_MM - MARGIN_LEFT_MM - MARGIN_RIGHT_MM
}

pub fn line_height(font_pt: f32) -> f32 {
    font_pt * PT_TO_MM * LINE_SPACING
}

/// Оценка ширины текста в мм
pub fn text_width(text: &str, font_pt: f32) -> f32 {
    text.chars().count() as f32 * font_pt * PT_TO_MM * AVG_CHAR_WIDTH
}

/// Перенос по словам в пределах `max_width`; слишком длинные слова режутся
pub fn wrap_text(text: &str, max_width: f32, font_pt: f32) -> Vec<String> {
    let char_width = font_pt * PT_TO_MM * AVG_CHAR_WIDTH;
    let max_chars = ((max_width / char_width).floor() as usize).max(1);

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        if word.is_empty() {
            continue;
        }
        let needed = if current.is_empty() {
            word.len()
        } else {
            current.chars().count() + 1 + word.len()
        };
        if needed > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.extend(word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Ширины колонок; если таблица шире страницы, ужимаются пропорционально
pub fn fit_widths(widths: &[f32]) -> Vec<f32> {
    let total: f32 = widths.iter().sum();
    let available = usable_width();
    if total <= available || total <= 0.0 {
        return widths.to_vec();
    }
    let scale = available / total;
    widths.iter().map(|w| w * scale).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellLayout {
    pub x: f32,
    pub width: f32,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowLayout {
    pub y_top: f32,
    pub height: f32,
    pub font_pt: f32,
    /// Заливка чередующихся строк
    pub shaded: bool,
    pub cells: Vec<CellLayout>,
}

impl RowLayout {
    pub fn y_bottom(&self) -> f32 {
        self.y_top + self.height
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    /// Номер страницы с нуля
    pub index: usize,
    pub header: RowLayout,
    pub rows: Vec<RowLayout>,
}

impl PageLayout {
    pub fn has_preamble(&self) -> bool {
        self.index == 0
    }
}

fn layout_row(texts: &[String], xs: &[f32], widths: &[f32], font_pt: f32, max_height: f32) -> RowLayout {
    let lh = line_height(font_pt);
    let max_lines = (((max_height - 2.0 * CELL_PADDING_MM) / lh).floor() as usize).max(1);

    let cells: Vec<CellLayout> = texts
        .iter()
        .zip(xs.iter().zip(widths.iter()))
        .map(|(text, (x, width))| {
            let mut lines = wrap_text(text, width - 2.0 * CELL_PADDING_MM, font_pt);
            lines.truncate(max_lines);
            CellLayout {
                x: *x,
                width: *width,
                lines,
            }
        })
        .collect();

    let line_count = cells.iter().map(|c| c.lines.len()).max().unwrap_or(1).max(1);
    RowLayout {
        y_top: 0.0,
        height: line_count as f32 * lh + 2.0 * CELL_PADDING_MM,
        font_pt,
        shaded: false,
        cells,
    }
}

/// Раскладывает таблицу по страницам. Заголовок повторяется на каждой
/// странице, строки не заходят за нижнее поле.
pub fn layout_report(table: &ReportTable) -> Vec<PageLayout> {
    let widths = fit_widths(&table.columns.iter().map(|c| c.width).collect::<Vec<_>>());
    let xs: Vec<f32> = widths
        .iter()
        .scan(MARGIN_LEFT_MM, |x, w| {
            let left = *x;
            *x += w;
            Some(left)
        })
        .collect();
    let headers: Vec<String> = table.columns.iter().map(|c| c.header.clone()).collect();
    let bottom = PAGE_HEIGHT_MM - MARGIN_BOTTOM_MM;

    let header_template = layout_row(
        &headers,
        &xs,
        &widths,
        HEADER_FONT_PT,
        bottom - FIRST_PAGE_TABLE_TOP_MM,
    );

    let new_page = |index: usize| {
        let top = if index == 0 {
            FIRST_PAGE_TABLE_TOP_MM
        } else {
            MARGIN_TOP_MM
        };
        let mut header = header_template.clone();
        header.y_top = top;
        PageLayout {
            index,
            header,
            rows: Vec::new(),
        }
    };

    let mut pages = Vec::new();
    let mut page = new_page(0);
    let mut cursor = page.header.y_bottom();

    // строка всегда помещается на пустую страницу-продолжение
    let fresh_space = bottom - (MARGIN_TOP_MM + header_template.height);

    for (i, texts) in table.rows.iter().enumerate() {
        let mut row = layout_row(texts, &xs, &widths, BODY_FONT_PT, fresh_space);
        row.shaded = i % 2 == 1;

        if cursor + row.height > bottom {
            let next = page.index + 1;
            pages.push(std::mem::replace(&mut page, new_page(next)));
            cursor = page.header.y_bottom();
        }

        row.y_top = cursor;
        cursor += row.height;
        page.rows.push(row);
    }
    pages.push(page);
    pages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::component_field::ComponentField;
    use crate::projections::p909_component_report::export::ReportColumn;

    fn table(row_count: usize, fields: &[ComponentField]) -> ReportTable {
        let columns = ReportColumn::for_fields(fields);
        let rows = (0..row_count)
            .map(|i| {
                columns
                    .iter()
                    .map(|c| format!("{} value {}", c.header, i))
                    .collect()
            })
            .collect();
        ReportTable { columns, rows }
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("", 20.0, 6.0), vec![String::new()]);
        let lines = wrap_text("alpha beta gamma delta", 10.0, 6.0);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| text_width(l, 6.0) <= 10.0));
        assert_eq!(lines.join(" "), "alpha beta gamma delta");

        let long = wrap_text(&"z".repeat(60), 10.0, 6.0);
        assert!(long.len() > 1);
        assert_eq!(long.concat(), "z".repeat(60));
    }

    #[test]
    fn test_fit_widths_scales_down() {
        assert_eq!(fit_widths(&[25.0, 35.0]), vec![25.0, 35.0]);

        let wide = fit_widths(&[100.0, 200.0, 254.0]);
        let total: f32 = wide.iter().sum();
        assert!((total - usable_width()).abs() < 0.01);
        assert!((wide[1] / wide[0] - 2.0).abs() < 0.001);
    }

    #[test]
    fn test_empty_table_has_one_page_with_header() {
        let pages = layout_report(&table(0, &ComponentField::defaults()));
        assert_eq!(pages.len(), 1);
        assert!(pages[0].has_preamble());
        assert_eq!(pages[0].header.cells.len(), 17);
        assert!(pages[0].rows.is_empty());
    }

    #[test]
    fn test_pages_repeat_header_and_respect_bottom_margin() {
        let fields = ComponentField::defaults();
        let pages = layout_report(&table(120, &fields));
        assert!(pages.len() > 2);

        let bottom = PAGE_HEIGHT_MM - MARGIN_BOTTOM_MM;
        let mut total_rows = 0;
        for page in &pages {
            assert_eq!(page.header.cells.len(), 4 + fields.len());
            let expected_top = if page.index == 0 {
                FIRST_PAGE_TABLE_TOP_MM
            } else {
                MARGIN_TOP_MM
            };
            assert_eq!(page.header.y_top, expected_top);
            for row in &page.rows {
                assert!(row.y_bottom() <= bottom + 0.001);
                assert!(row.y_top >= page.header.y_bottom() - 0.001);
            }
            total_rows += page.rows.len();
        }
        assert_eq!(total_rows, 120);
        assert!(!pages[0].rows[0].shaded);
        assert!(pages[0].rows[1].shaded);
    }

    #[test]
    fn test_columns_stay_inside_margins() {
        let pages = layout_report(&table(1, &ComponentField::ALL[..15]));
        let last = pages[0].header.cells.last().unwrap();
        assert!(last.x + last.width <= PAGE_WIDTH_MM - MARGIN_RIGHT_MM + 0.01);
    }
}
