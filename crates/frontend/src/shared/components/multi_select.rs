use leptos::prelude::*;
use thaw::*;
use web_sys::HtmlInputElement;

/// Новый выбор после переключения `value`, в порядке `options`
fn toggled_selection(
    options: &[String],
    current: &[String],
    value: &str,
    checked: bool,
) -> Vec<String> {
    options
        .iter()
        .filter(|opt| {
            if opt.as_str() == value {
                checked
            } else {
                current.contains(opt)
            }
        })
        .cloned()
        .collect()
}

/// Состояние чекбокса опции берётся только из `selected`
fn option_checked(selected: &[String], value: &str) -> bool {
    selected.iter().any(|s| s == value)
}

/// Выпадающий список с множественным выбором
///
/// Сам ничего не хранит: текущий выбор приходит через `selected`,
/// новый список значений уходит в `on_change` (порядок как в `options`).
/// Родитель может отклонить изменение, просто не применив его.
#[component]
pub fn MultiSelect(
    /// Доступные значения
    #[prop(into)]
    options: Signal<Vec<String>>,
    /// Выбранные значения
    #[prop(into)]
    selected: Signal<Vec<String>>,
    on_change: Callback<Vec<String>>,
    #[prop(optional, into)]
    placeholder: String,
    #[prop(optional, into)]
    disabled: Signal<bool>,
) -> impl IntoView {
    let open = RwSignal::new(false);

    let summary = move || {
        let count = selected.with(|s| s.len());
        match count {
            0 => placeholder.clone(),
            1 => selected.with(|s| s[0].clone()),
            n => format!("{} selected", n),
        }
    };

    let toggle_value = move |value: &str, checked: bool| {
        let next = options.with_untracked(|opts| {
            selected.with_untracked(|current| toggled_selection(opts, current, value, checked))
        });
        on_change.run(next);
    };

    view! {
        <div class="multi-select">
            <Button
                class="multi-select__toggle"
                disabled=disabled
                on_click=move |_| open.update(|o| *o = !*o)
            >
                {summary}
            </Button>
            <Show when=move || open.get() && !disabled.get()>
                <div class="multi-select__panel">
                    <div class="multi-select__actions">
                        <Button
                            size=ButtonSize::Small
                            on_click=move |_| on_change.run(options.get_untracked())
                        >
                            "Select all"
                        </Button>
                        <Button
                            size=ButtonSize::Small
                            on_click=move |_| on_change.run(Vec::new())
                        >
                            "Clear"
                        </Button>
                    </div>
                    <For
                        each=move || options.get()
                        key=|opt| opt.clone()
                        children=move |opt: String| {
                            let value = opt.clone();
                            let is_checked = {
                                let opt = opt.clone();
                                move || selected.with(|s| option_checked(s, &opt))
                            };
                            view! {
                                <label class="multi-select__option">
                                    <input
                                        type="checkbox"
                                        prop:checked=is_checked
                                        on:change=move |ev| {
                                            let input = event_target::<HtmlInputElement>(&ev);
                                            toggle_value(&value, input.checked());
                                            // родитель мог отклонить изменение
                                            input.set_checked(
                                                selected.with_untracked(|s| option_checked(s, &value)),
                                            );
                                        }
                                    />
                                    <span>{opt}</span>
                                </label>
                            }
                        }
                    />
                </div>
            </Show>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_toggled_selection_keeps_option_order() {
        let options = strings(&["A", "B", "C"]);
        let next = toggled_selection(&options, &strings(&["C"]), "A", true);
        assert_eq!(next, strings(&["A", "C"]));
        let next = toggled_selection(&options, &next, "C", false);
        assert_eq!(next, strings(&["A"]));
    }

    #[test]
    fn test_rejected_change_resolves_unchecked() {
        let options = strings(&["A", "B", "C"]);
        let mut selected = strings(&["A"]);
        let limit = 1;
        // родитель принимает не больше `limit` значений
        let mut apply = |next: Vec<String>| {
            if next.len() <= limit {
                selected = next;
            }
        };

        apply(toggled_selection(&options, &strings(&["A"]), "B", true));
        assert_eq!(selected, strings(&["A"]));
        assert!(!option_checked(&selected, "B"));
        assert!(option_checked(&selected, "A"));
    }
}
