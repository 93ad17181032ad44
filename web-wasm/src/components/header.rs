//! ヘッダーコンポーネント

use leptos::prelude::*;

#[component]
pub fn Header() -> impl IntoView {
    view! {
        <header class="header">
            <h1>"DocSnap"</h1>
            <p class="text-muted">"Snap a prescription, understand your medicines"</p>
        </header>
    }
}
