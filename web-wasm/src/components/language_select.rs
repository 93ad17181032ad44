//! 言語選択コンポーネント

use doc_snap_common::LANGUAGES;
use leptos::prelude::*;

#[component]
pub fn LanguageSelect(
    language: Signal<String>,
    disabled: Signal<bool>,
    #[prop(into)] on_change: Callback<String>,
) -> impl IntoView {
    let options = LANGUAGES
        .iter()
        .copied()
        .map(|lang| {
            view! {
                <option value=lang selected=move || language.get() == lang>
                    {lang}
                </option>
            }
        })
        .collect_view();

    view! {
        <div class="form-group">
            <label for="language">"Explanation language"</label>
            <select
                id="language"
                prop:value=move || language.get()
                prop:disabled=move || disabled.get()
                on:change=move |ev| on_change.run(event_target_value(&ev))
            >
                {options}
            </select>
        </div>
    }
}
