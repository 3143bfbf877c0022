use crate::projections::p909_component_report::ui::generate_pdf::GeneratePdfPage;
use crate::shared::config::{load_config, PageConfig};
use leptos::prelude::*;

#[component]
pub fn App() -> impl IntoView {
    let config = load_config().unwrap_or_else(|e| {
        log::error!("Failed to load page config, using defaults: {}", e);
        PageConfig::default()
    });

    // Page config is read once and shared through context
    provide_context(config);

    view! {
        <GeneratePdfPage />
    }
}
