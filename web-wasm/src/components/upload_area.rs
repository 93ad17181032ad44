//! アップロードエリアコンポーネント
//!
//! 処方箋画像を1枚選択し、プレビューを表示する

use doc_snap_common::SelectedFile;
use leptos::html::Input;
use leptos::prelude::*;
use leptos::task::spawn_local;

/// MIMEタイプが取れないファイル用
const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

#[component]
pub fn UploadArea(
    preview: Signal<Option<String>>,
    file_name: Signal<String>,
    disabled: Signal<bool>,
    #[prop(into)] on_file_selected: Callback<SelectedFile>,
    #[prop(into)] on_read_error: Callback<String>,
    #[prop(into)] on_clear: Callback<()>,
) -> impl IntoView {
    let input_ref: NodeRef<Input> = NodeRef::new();

    let on_change = move |_| {
        let Some(input) = input_ref.get() else {
            return;
        };
        let Some(file) = input.files().and_then(|files| files.get(0)) else {
            return;
        };

        spawn_local(async move {
            let name = file.name();
            let mime_type = match file.type_() {
                t if t.is_empty() => FALLBACK_MIME_TYPE.to_string(),
                t => t,
            };
            let blob = gloo::file::File::from(file);
            match gloo::file::futures::read_as_bytes(&blob).await {
                Ok(bytes) => on_file_selected.run(SelectedFile::new(name, mime_type, bytes)),
                Err(e) => {
                    // 読めなかったファイルを入力欄に残さない
                    if let Some(input) = input_ref.get_untracked() {
                        input.set_value("");
                    }
                    on_read_error.run(format!("Could not read {}: {}", name, e));
                }
            }
        });
    };

    // input要素の値も消さないと同じファイルを選び直せない
    let on_clear_click = move |_| {
        if let Some(input) = input_ref.get() {
            input.set_value("");
        }
        on_clear.run(());
    };

    view! {
        <div class="upload-area">
            <label for="prescription-image" class="upload-label">
                <div class="upload-icon">"📷"</div>
                <p>"Select or capture a prescription image"</p>
                <p class="text-muted">"JPEG, PNG, WebP"</p>
            </label>
            <input
                type="file"
                id="prescription-image"
                accept="image/*"
                node_ref=input_ref
                prop:disabled=move || disabled.get()
                on:change=on_change
            />

            <Show when=move || preview.with(Option::is_some)>
                <div class="preview">
                    <img
                        src=move || preview.get().unwrap_or_default()
                        alt=move || file_name.get()
                    />
                    <p class="file-name">{move || file_name.get()}</p>
                    <button
                        class="btn btn-tertiary btn-small"
                        prop:disabled=move || disabled.get()
                        on:click=on_clear_click
                    >
                        "Clear"
                    </button>
                </div>
            </Show>
        </div>
    }
}
