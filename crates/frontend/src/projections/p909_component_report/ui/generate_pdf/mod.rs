pub mod state;

use self::state::{create_state, RowsLoad, MASTER_DATA_ERROR_CONTEXT};
use crate::projections::p909_component_report::{api, pdf};
use crate::shared::components::{MultiSelect, TableCheckbox};
use crate::shared::config::PageConfig;
use crate::shared::export::download_pdf;
use crate::shared::modal::Modal;
use crate::shared::navigation::{history_back, navigate_to, store_handoff};
use contracts::enums::component_field::ComponentField;
use contracts::projections::p909_component_report::export::{
    export_error_message, prepare_export, ExportPlan,
};
use contracts::projections::p909_component_report::filter::ComponentQuery;
use contracts::projections::p909_component_report::row::{
    is_blank, scalar_to_string, DisplayRow, RowType, PLACEHOLDER,
};
use contracts::projections::p909_component_report::state::{
    ReportModal, ReportState, RequestToken,
};
use contracts::shared::retry::retry_with_backoff;
use leptos::prelude::*;
use leptos::task::spawn_local;
use thaw::*;

/// Локальный сигнал для контрола, синхронизированный с полем черновика.
/// `set` может отклонить значение, тогда контрол вернётся к состоянию.
fn bind_draft<T>(
    state: RwSignal<ReportState>,
    get: fn(&ReportState) -> T,
    set: fn(&mut ReportState, T),
) -> RwSignal<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    let local = RwSignal::new(state.with_untracked(get));
    Effect::new(move |_| {
        let value = state.with(get);
        if local.get_untracked() != value {
            local.set(value);
        }
    });
    Effect::new(move |_| {
        let value = local.get();
        if state.with_untracked(get) != value {
            state.update(|s| set(s, value));
        }
    });
    local
}

fn cell_text(row: &DisplayRow, field: ComponentField) -> String {
    let value = row.value(field);
    if is_blank(value) {
        PLACEHOLDER.to_string()
    } else {
        scalar_to_string(value)
    }
}

fn or_placeholder(value: &str) -> String {
    if value.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        value.to_string()
    }
}

/// PDF, передача данных и переход на страницу согласования
fn export_and_hand_off(plan: &ExportPlan, config: &PageConfig) -> Result<(), String> {
    let bytes = pdf::render_report(&plan.document).map_err(|e| e.to_string())?;
    download_pdf(&bytes, &plan.document.file_name)?;
    log::info!("PDF generated: {}", plan.document.file_name);
    store_handoff(&plan.handoff)?;
    navigate_to(&config.approval.route)
}

#[component]
pub fn GeneratePdfPage() -> impl IntoView {
    let config = use_context::<PageConfig>().unwrap_or_default();
    let state = create_state(&config);
    let config = StoredValue::new(config);

    // ---- загрузка строк ----
    let load_rows = move |kind: RowsLoad, token: RequestToken, query: ComponentQuery| {
        let config = config.get_value();
        let policy = config.retry_policy();
        log::info!("Loading component rows ({:?}): {}", kind, query.to_query_string());

        spawn_local(async move {
            let (cfg, q) = (&config, &query);
            let result = retry_with_backoff(
                &policy,
                move || api::fetch_components(cfg, q),
                api::sleep,
                |notice| {
                    log::warn!("{}", notice.message());
                    state.update(|s| {
                        if s.is_current(token) {
                            s.retry_scheduled(notice);
                        }
                    });
                },
            )
            .await;

            state.update(|s| {
                let applied = match result {
                    Ok(raw) => {
                        log::info!("Received {} component rows", raw.len());
                        match kind {
                            RowsLoad::Initial => s.initial_load_finished(token, &raw),
                            RowsLoad::Filter => s.filter_load_finished(token, &raw),
                        }
                    }
                    Err(err) => {
                        let message = err.user_message(kind.error_context());
                        log::error!("{}", message);
                        s.request_failed(token, message)
                    }
                };
                if !applied {
                    log::info!("Dropping stale response for request {}", token.generation());
                }
            });
        });
    };

    // ---- справочники ----
    let load_master_data = move || {
        let config = config.get_value();
        let policy = config.retry_policy();
        state.update(|s| s.begin_master_load());

        spawn_local(async move {
            let cfg = &config;
            let result = retry_with_backoff(
                &policy,
                move || api::fetch_master_data(cfg),
                api::sleep,
                |notice| {
                    log::warn!("{}", notice.message());
                    state.update(|s| s.retry_scheduled(notice));
                },
            )
            .await;

            match result {
                Ok(payload) => {
                    let next = state.try_update(|s| s.master_data_loaded(&payload)).flatten();
                    match next {
                        Some((token, query)) => load_rows(RowsLoad::Initial, token, query),
                        None => log::warn!("No current period in master data, initial load skipped"),
                    }
                }
                Err(err) => {
                    let message = err.user_message(MASTER_DATA_ERROR_CONTEXT);
                    log::error!("{}", message);
                    state.update(|s| s.master_data_failed(message));
                }
            }
        });
    };

    // Загружаем справочники при монтировании
    Effect::new(move |_| {
        load_master_data();
    });

    // ---- действия ----
    let on_apply = move |_| {
        if let Some((token, query)) = state.try_update(|s| s.apply_filters()) {
            load_rows(RowsLoad::Filter, token, query);
        }
    };

    let on_reset = move |_| {
        log::info!("Resetting all filters to default values");
        if let Some(Some((token, query))) = state.try_update(|s| s.reset()) {
            load_rows(RowsLoad::Initial, token, query);
        }
    };

    let on_generate = move |_| {
        let now = chrono::Local::now().naive_local();
        let plan = match state.with_untracked(|s| prepare_export(s, now)) {
            Ok(plan) => plan,
            Err(modal) => {
                state.update(|s| s.show_modal(modal));
                return;
            }
        };
        if let Err(e) = export_and_hand_off(&plan, &config.get_value()) {
            log::error!("Error generating PDF: {}", e);
            state.update(|s| s.show_modal(ReportModal::Alert(export_error_message(&e))));
        }
    };

    // ---- контролы фильтров ----
    let component_type = bind_draft(
        state,
        |s| s.draft.component_type.clone().unwrap_or_default(),
        |s, value| {
            // Select сбрасывает значение, пока нет подходящего <option>
            if value.is_empty() && s.catalog.material_types.is_empty() {
                return;
            }
            s.draft.component_type = Some(value).filter(|v| !v.is_empty());
        },
    );
    let exclude_internal = bind_draft(
        state,
        |s| s.draft.exclude_internal,
        |s, value| s.draft.exclude_internal = value,
    );

    let is_loading = Signal::derive(move || state.with(|s| s.is_loading()));
    let period_label = move || {
        state.with(|s| {
            s.current_period
                .as_deref()
                .and_then(|id| s.catalog.period_label(id))
                .unwrap_or("Loading...")
                .to_string()
        })
    };
    let material_types = move || state.with(|s| s.catalog.material_types.clone());
    let packaging_options = Signal::derive(move || state.with(|s| s.catalog.packaging_type_options()));
    let packaging_selected = Signal::derive(move || state.with(|s| s.draft.packaging_types.clone()));
    let field_options = Signal::derive(|| {
        ComponentField::all_labels()
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>()
    });
    let field_selected = Signal::derive(move || {
        state.with(|s| {
            s.draft
                .field_labels()
                .into_iter()
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
    });

    // ---- таблица ----
    let visible_rows = Memo::new(move |_| {
        state.with(|s| s.visible_rows().into_iter().cloned().collect::<Vec<DisplayRow>>())
    });
    let applied_fields = Memo::new(move |_| state.with(|s| s.applied.fields.clone()));
    let has_rows = move || state.with(|s| !s.rows.is_empty());
    let all_selected = Signal::derive(move || state.with(|s| s.all_selected()));

    view! {
        <div class="generate-pdf" style="padding: 20px;">
            <Flex justify=FlexJustify::SpaceBetween align=FlexAlign::Center>
                <h1 style="margin: 0;">"Generate PDF"</h1>
                <Button on_click=move |_| history_back()>"Back"</Button>
            </Flex>

            <div class="generate-pdf__cm-details">
                <strong>"CMO Code: "</strong>
                {move || state.with(|s| s.cm_code.clone())}
                " | "
                <strong>"CMO Description: "</strong>
                {move || state.with(|s| s.cm_description.clone())}
            </div>

            <div class="generate-pdf__filters">
                <Flex gap=FlexGap::Large align=FlexAlign::End>
                    <div>
                        <Label>"Period"</Label>
                        <select class="generate-pdf__period" disabled=true>
                            <option>{period_label}</option>
                        </select>
                    </div>

                    <div>
                        <Label>"Component Type"</Label>
                        <Select value=component_type>
                            <option value="">"Select Component Type"</option>
                            <For
                                each=material_types
                                key=|item| item.id
                                children=move |item| {
                                    let name = item.item_name.clone();
                                    let value = name.clone();
                                    view! { <option value=value>{name}</option> }
                                }
                            />
                        </Select>
                    </div>

                    <div>
                        <Label>"Component Packaging Types"</Label>
                        <MultiSelect
                            options=packaging_options
                            selected=packaging_selected
                            on_change=Callback::new(move |values: Vec<String>| {
                                state.update(|s| s.draft.packaging_types = values);
                            })
                            placeholder="Select Component Packaging Types..."
                            disabled=Signal::derive(move || packaging_options.with(|o| o.is_empty()))
                        />
                    </div>

                    <div>
                        <Label>"Component Fields"</Label>
                        <MultiSelect
                            options=field_options
                            selected=field_selected
                            on_change=Callback::new(move |labels: Vec<String>| {
                                let fields = labels
                                    .iter()
                                    .filter_map(|l| ComponentField::from_label(l))
                                    .collect();
                                state.update(|s| {
                                    s.select_fields(fields);
                                });
                            })
                            placeholder="Select Component Fields..."
                        />
                    </div>

                    <Checkbox checked=exclude_internal label="Exclude Internal"/>

                    <Button
                        appearance=ButtonAppearance::Primary
                        disabled=is_loading
                        on_click=on_apply
                    >
                        "Filters"
                    </Button>
                    <Button disabled=is_loading on_click=on_reset>
                        "Reset"
                    </Button>
                </Flex>
            </div>

            <Flex justify=FlexJustify::Center style="margin-top: 20px;">
                <Button
                    appearance=ButtonAppearance::Primary
                    disabled=is_loading
                    on_click=on_generate
                >
                    "Generate PDF"
                </Button>
            </Flex>

            <Show when=move || state.with(|s| s.is_loading())>
                <div class="generate-pdf__loading">
                    <p>"Loading component details..."</p>
                </div>
            </Show>

            {move || {
                state
                    .with(|s| s.error.clone())
                    .map(|error| {
                        view! {
                            <div class="generate-pdf__error">
                                <p>{format!("Error loading component details: {}", error)}</p>
                            </div>
                        }
                    })
            }}

            {move || {
                let fields = applied_fields.get();
                if has_rows() && !fields.is_empty() {
                    let header_fields = fields.clone();
                    view! {
                        <div class="table-wrapper">
                            <Table>
                                <TableHeader>
                                    <TableRow>
                                        <TableCheckbox
                                            header=true
                                            checked=all_selected
                                            on_change=Callback::new(move |checked| {
                                                state.update(|s| s.toggle_select_all(checked));
                                            })
                                            label="Select All"
                                        />
                                        <TableHeaderCell>"SKU Code"</TableHeaderCell>
                                        <TableHeaderCell>"SKU Description"</TableHeaderCell>
                                        <TableHeaderCell>"CMO Code"</TableHeaderCell>
                                        <TableHeaderCell>"CMO Description"</TableHeaderCell>
                                        {header_fields
                                            .into_iter()
                                            .map(|f| view! { <TableHeaderCell>{f.label()}</TableHeaderCell> })
                                            .collect_view()}
                                    </TableRow>
                                </TableHeader>
                                <TableBody>
                                    {move || {
                                        let rows = visible_rows.get();
                                        if rows.is_empty() {
                                            let colspan = (fields.len() + 5).to_string();
                                            return view! {
                                                <tr>
                                                    <td colspan=colspan class="generate-pdf__empty">
                                                        "No data matches the selected component fields"
                                                    </td>
                                                </tr>
                                            }
                                            .into_any();
                                        }
                                        rows.into_iter()
                                            .enumerate()
                                            .map(|(index, row)| {
                                                let mut class = String::from("generate-pdf__row");
                                                if row.row_type == RowType::Sku {
                                                    class.push_str(" generate-pdf__row--sku");
                                                }
                                                if index % 2 == 1 {
                                                    class.push_str(" generate-pdf__row--alt");
                                                }
                                                let id = row.id.clone();
                                                let checked_id = id.clone();
                                                let field_cells = fields
                                                    .iter()
                                                    .map(|f| {
                                                        let text = cell_text(&row, *f);
                                                        view! {
                                                            <TableCell>
                                                                <TableCellLayout truncate=true>{text}</TableCellLayout>
                                                            </TableCell>
                                                        }
                                                    })
                                                    .collect_view();
                                                view! {
                                                    <TableRow class=class>
                                                        <TableCheckbox
                                                            checked=Signal::derive(move || {
                                                                state.with(|s| s.selection.contains(&checked_id))
                                                            })
                                                            on_change=Callback::new(move |checked| {
                                                                state.update(|s| s.toggle_row(&id, checked));
                                                            })
                                                            label=format!("Select row {}", row.id)
                                                        />
                                                        <TableCell>{or_placeholder(&row.sku_code)}</TableCell>
                                                        <TableCell>{or_placeholder(&row.sku_description)}</TableCell>
                                                        <TableCell>{or_placeholder(&row.cm_code)}</TableCell>
                                                        <TableCell>{or_placeholder(&row.cm_description)}</TableCell>
                                                        {field_cells}
                                                    </TableRow>
                                                }
                                            })
                                            .collect_view()
                                            .into_any()
                                    }}
                                </TableBody>
                            </Table>
                        </div>
                    }
                    .into_any()
                } else if state.with(|s| s.is_loading()) {
                    view! {
                        <div class="generate-pdf__placeholder">
                            <h5>"Fetching Data..."</h5>
                            <p>"Please wait while we retrieve the filtered data from the server"</p>
                        </div>
                    }
                    .into_any()
                } else if fields.is_empty() {
                    view! {
                        <div class="generate-pdf__placeholder">
                            <h5>"Select Component Fields"</h5>
                            <p>"Please select component fields to view data in the table"</p>
                        </div>
                    }
                    .into_any()
                } else {
                    view! {
                        <div class="generate-pdf__placeholder">
                            <h5>"No Data Found"</h5>
                            <p>"No component data available for the selected criteria"</p>
                        </div>
                    }
                    .into_any()
                }
            }}

            {move || {
                state
                    .with(|s| s.modal.clone())
                    .map(|modal| {
                        view! {
                            <Modal
                                title=modal.title()
                                on_close=Callback::new(move |_| state.update(|s| s.close_modal()))
                            >
                                <p>{modal.message()}</p>
                            </Modal>
                        }
                    })
            }}
        </div>
    }
}
