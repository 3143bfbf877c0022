use leptos::prelude::*;

/// Чекбокс выбора строки таблицы
///
/// Рендерит `<td>` с чекбоксом, или `<th>` для «выбрать все» при `header=true`.
/// Клик на чекбокс не вызывает клик на строку (stop_propagation).
///
/// # Пример использования
/// ```ignore
/// <TableCheckbox
///     checked=Signal::derive(move || state.with(|s| s.selection.contains(&id)))
///     on_change=Callback::new(move |checked| toggle_row(id.clone(), checked))
///     label=format!("Select row {}", id)
/// />
/// ```
#[component]
pub fn TableCheckbox(
    /// Сигнал состояния чекбокса
    #[prop(into)]
    checked: Signal<bool>,
    /// Callback вызывается при изменении состояния
    on_change: Callback<bool>,
    /// aria-label для чекбокса
    #[prop(optional, into)]
    label: String,
    /// Ячейка заголовка вместо ячейки тела
    #[prop(optional)]
    header: bool,
) -> impl IntoView {
    let input = move || {
        view! {
            <input
                type="checkbox"
                class="table__checkbox"
                aria-label=label.clone()
                prop:checked=checked
                on:change=move |ev| {
                    on_change.run(event_target_checked(&ev));
                }
            />
        }
    };

    if header {
        view! {
            <th class="table__cell table__cell--checkbox" on:click=|e| e.stop_propagation()>
                {input()}
            </th>
        }
        .into_any()
    } else {
        view! {
            <td class="table__cell table__cell--checkbox" on:click=|e| e.stop_propagation()>
                {input()}
            </td>
        }
        .into_any()
    }
}
