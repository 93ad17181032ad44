//! 解析中インジケーター
//!
//! モデル応答の進捗は取れないため、不定表示のみ

use leptos::prelude::*;

#[component]
pub fn ProgressBar(#[prop(into)] message: String) -> impl IntoView {
    view! {
        <div class="progress-container" role="status">
            <div class="progress-bar indeterminate">
                <div class="progress-fill" />
            </div>
            <p class="progress-text">{message}</p>
        </div>
    }
}
