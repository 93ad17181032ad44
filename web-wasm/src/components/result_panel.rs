//! 解析結果パネル
//!
//! モデル応答はHTMLとして挿入せず、構造化した値をテキストとして描画する

use doc_snap_common::{AnalysisOutcome, AnalysisState, Medicine, NO_MEDICINE_MARKER};
use leptos::prelude::*;

#[component]
pub fn ResultPanel(result: Signal<AnalysisState>) -> impl IntoView {
    move || match result.get() {
        AnalysisState::Empty => ().into_any(),
        AnalysisState::Failed { message } => view! {
            <div class="result-panel error" role="alert">
                <h2>"Analysis failed"</h2>
                <p>{message}</p>
            </div>
        }
        .into_any(),
        AnalysisState::Completed { outcome, .. } => view! {
            <div class="result-panel">
                <h2>"Medicines"</h2>
                {outcome_view(outcome)}
            </div>
        }
        .into_any(),
    }
}

fn outcome_view(outcome: AnalysisOutcome) -> AnyView {
    match outcome {
        AnalysisOutcome::Medicines(medicines) => medicines
            .into_iter()
            .map(medicine_card)
            .collect_view()
            .into_any(),
        AnalysisOutcome::NoMedicineIdentified => view! {
            <div class="medicine none">
                <h3>{NO_MEDICINE_MARKER}</h3>
            </div>
        }
        .into_any(),
        AnalysisOutcome::Unstructured(text) => view! {
            <pre class="unstructured">{text}</pre>
        }
        .into_any(),
    }
}

fn medicine_card(medicine: Medicine) -> impl IntoView {
    let Medicine {
        name,
        active_ingredient,
        dosage,
        side_effects,
        notes,
    } = medicine;

    view! {
        <div class="medicine">
            <h3>"Medicine Name: " {name}</h3>
            <p>"Active Ingredient: " {active_ingredient}</p>
            <p>"Dosage: " {dosage}</p>
            <p>"Side Effects: " {side_effects}</p>
            {notes.into_iter().map(|note| view! { <p class="note">{note}</p> }).collect_view()}
        </div>
    }
}
