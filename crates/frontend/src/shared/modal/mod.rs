use leptos::ev;
use leptos::prelude::*;
use thaw::*;

/// Блокирующее окно с сообщением и кнопкой OK
#[component]
pub fn Modal(
    /// Title of the modal
    #[prop(into)]
    title: String,
    /// Callback when modal should close
    on_close: Callback<()>,
    /// Modal content
    children: Children,
) -> impl IntoView {
    // Escape закрывает окно
    let handle = window_event_listener(ev::keydown, move |ev: ev::KeyboardEvent| {
        if ev.key() == "Escape" {
            on_close.run(());
        }
    });
    on_cleanup(move || handle.remove());

    let stop_propagation = move |ev: ev::MouseEvent| {
        ev.stop_propagation();
    };

    view! {
        <div class="modal-overlay" on:click=move |_| on_close.run(())>
            <div class="modal" role="dialog" aria-modal="true" on:click=stop_propagation>
                <div class="modal-header">
                    <h2 class="modal-title">{title}</h2>
                </div>
                <div class="modal-body">
                    {children()}
                </div>
                <div class="modal-footer">
                    <Button appearance=ButtonAppearance::Primary on_click=move |_| on_close.run(())>
                        "OK"
                    </Button>
                </div>
            </div>
        </div>
    }
}
