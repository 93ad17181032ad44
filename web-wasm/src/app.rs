//! メインアプリケーションコンポーネント

use doc_snap_common::{AnalysisState, Error, SelectedFile, Session};
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::ProxyModel;
use crate::components::{
    header::Header,
    language_select::LanguageSelect,
    progress_bar::ProgressBar,
    result_panel::ResultPanel,
    upload_area::UploadArea,
};

/// メインアプリケーションコンポーネント
#[component]
pub fn App() -> impl IntoView {
    // 画面状態はSessionに集約し、シグナルで包む
    let session = RwSignal::new(Session::new());

    let preview = Signal::derive(move || session.with(|s| s.preview().map(str::to_string)));
    let file_name = Signal::derive(move || session.with(|s| s.selected_file_name().to_string()));
    let language = Signal::derive(move || session.with(|s| s.language().to_string()));
    let is_loading = Signal::derive(move || session.with(Session::is_loading));
    let has_file = Signal::derive(move || session.with(|s| s.selected_file().is_some()));
    let result = Signal::derive(move || session.with(|s| s.result().clone()));

    let on_file_selected = move |file: SelectedFile| {
        session.update(|s| s.select_file(file));
    };

    let on_read_error = move |message: String| {
        web_sys::console::warn_1(&message.clone().into());
        session.update(|s| s.report_intake_error(message));
    };

    let on_clear = move |_: ()| {
        session.update(|s| s.clear_file());
    };

    let on_language = move |lang: String| {
        session.update(|s| s.set_language(lang));
    };

    // 解析開始ハンドラ
    let on_analyze = move |_| {
        let files: Vec<SelectedFile> =
            session.with_untracked(|s| s.selected_file().cloned().into_iter().collect());

        let ticket = match session.try_update(|s| s.begin_analysis(&files)) {
            Some(Ok(ticket)) => ticket,
            Some(Err(Error::AnalysisInFlight)) | None => return,
            Some(Err(e)) => {
                session.update(|s| s.report_intake_error(e.to_string()));
                return;
            }
        };

        spawn_local(async move {
            let response = ProxyModel::default()
                .analyze(&ticket.language, &ticket.images)
                .await;
            if let Err(e) = &response {
                web_sys::console::error_1(&e.to_string().into());
            }
            session.update(|s| {
                s.finish_analysis(ticket, response);
            });
        });
    };

    view! {
        <div class="container">
            <Header />

            <UploadArea
                preview=preview
                file_name=file_name
                disabled=is_loading
                on_file_selected=Callback::new(on_file_selected)
                on_read_error=Callback::new(on_read_error)
                on_clear=Callback::new(on_clear)
            />

            <LanguageSelect
                language=language
                disabled=is_loading
                on_change=Callback::new(on_language)
            />

            <button
                class="btn btn-primary"
                prop:disabled=move || is_loading.get() || !has_file.get()
                on:click=on_analyze
            >
                {move || if is_loading.get() { "Analyzing..." } else { "Analyze prescription" }}
            </button>

            <Show when=move || is_loading.get()>
                <ProgressBar message="Reading the prescription..." />
            </Show>

            <Show
                when=move || !result.with(AnalysisState::is_empty)
                fallback=|| view! { <p class="text-muted">"Choose a prescription image, then press Analyze"</p> }
            >
                <ResultPanel result=result />
            </Show>
        </div>
    }
}
