use super::row::DisplayRow;
use std::collections::BTreeSet;

/// Выбранные строки таблицы (по id)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    selected: BTreeSet<String>,
}

impl SelectionState {
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn ids(&self) -> Vec<String> {
        self.selected.iter().cloned().collect()
    }

    /// Заменяет выбор набором id
    pub fn replace_with<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected = ids.into_iter().map(Into::into).collect();
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Состояние чекбокса «выбрать все»: пока пользователь ничего
    /// не снял, считается, что выбрано всё видимое
    pub fn all_selected(&self, visible: &[&DisplayRow]) -> bool {
        !visible.is_empty()
            && (self.selected.is_empty() || visible.iter().all(|r| self.selected.contains(&r.id)))
    }

    pub fn toggle_all(&mut self, visible: &[&DisplayRow], checked: bool) {
        if checked {
            self.replace_with(visible.iter().map(|r| r.id.clone()));
        } else {
            self.clear();
        }
    }

    pub fn toggle(&mut self, id: &str, checked: bool) {
        if checked {
            self.selected.insert(id.to_string());
        } else {
            self.selected.remove(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projections::p909_component_report::row::{transform_api_rows, TransformContext};
    use serde_json::json;

    fn sample_rows() -> Vec<DisplayRow> {
        let raw = vec![json!({"sku_code": "A"}), json!({"sku_code": "B"}), json!({"sku_code": "C"})];
        transform_api_rows(
            &raw,
            &TransformContext {
                cm_code: "CM",
                cm_description: "",
                material_type: None,
            },
        )
    }

    #[test]
    fn test_select_all_defaults_to_checked() {
        let rows = sample_rows();
        let visible: Vec<&DisplayRow> = rows.iter().collect();
        let selection = SelectionState::default();
        assert!(selection.all_selected(&visible));
        assert!(!selection.all_selected(&[]));
    }

    #[test]
    fn test_toggle_all_selects_only_visible() {
        let rows = sample_rows();
        let visible: Vec<&DisplayRow> = rows.iter().skip(1).collect();
        let mut selection = SelectionState::default();

        selection.toggle_all(&visible, true);
        assert_eq!(selection.ids(), vec!["api-2".to_string(), "api-3".to_string()]);

        selection.toggle_all(&visible, false);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_row_toggle() {
        let rows = sample_rows();
        let visible: Vec<&DisplayRow> = rows.iter().collect();
        let mut selection = SelectionState::default();
        selection.toggle_all(&visible, true);

        selection.toggle("api-2", false);
        assert_eq!(selection.len(), 2);
        assert!(!selection.all_selected(&visible));

        selection.toggle("api-2", true);
        selection.toggle("api-2", true);
        assert_eq!(selection.len(), 3);
        assert!(selection.all_selected(&visible));
    }
}
