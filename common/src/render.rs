//! 解析結果のHTML出力
//!
//! モデル応答は信頼しない。構造化済みの値をエスケープして
//! 固定の `<div class="medicine">` 形式に組み直す

use crate::prompts::NO_MEDICINE_MARKER;
use crate::types::{AnalysisOutcome, Medicine};

/// HTML特殊文字をエスケープ
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn render_medicine(medicine: &Medicine) -> String {
    let mut html = String::from("<div class=\"medicine\">\n");
    html.push_str(&format!(
        "  <h3>Medicine Name: {}</h3>\n",
        escape_html(&medicine.name)
    ));
    for (label, value) in [
        ("Active Ingredient", &medicine.active_ingredient),
        ("Dosage", &medicine.dosage),
        ("Side Effects", &medicine.side_effects),
    ] {
        if !value.is_empty() {
            html.push_str(&format!("  <p>{}: {}</p>\n", label, escape_html(value)));
        }
    }
    for note in &medicine.notes {
        html.push_str(&format!("  <p>{}</p>\n", escape_html(note)));
    }
    html.push_str("</div>");
    html
}

/// AnalysisOutcome をエスケープ済みHTMLに変換
pub fn render_html(outcome: &AnalysisOutcome) -> String {
    match outcome {
        AnalysisOutcome::Medicines(medicines) => medicines
            .iter()
            .map(render_medicine)
            .collect::<Vec<_>>()
            .join("\n"),
        AnalysisOutcome::NoMedicineIdentified => format!(
            "<div class=\"medicine\">\n  <h3>{}</h3>\n</div>",
            NO_MEDICINE_MARKER
        ),
        AnalysisOutcome::Unstructured(text) => {
            format!("<div class=\"unstructured\">\n  <p>{}</p>\n</div>", escape_html(text))
        }
    }
}

/// 端末表示用のプレーンテキスト
pub fn render_text(outcome: &AnalysisOutcome) -> String {
    match outcome {
        AnalysisOutcome::Medicines(medicines) => medicines
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let mut lines = vec![format!("{}. {}", i + 1, m.name)];
                for (label, value) in [
                    ("Active Ingredient", &m.active_ingredient),
                    ("Dosage", &m.dosage),
                    ("Side Effects", &m.side_effects),
                ] {
                    if !value.is_empty() {
                        lines.push(format!("   {}: {}", label, value));
                    }
                }
                lines.extend(m.notes.iter().map(|note| format!("   {}", note)));
                lines.join("\n")
            })
            .collect::<Vec<_>>()
            .join("\n\n"),
        AnalysisOutcome::NoMedicineIdentified => NO_MEDICINE_MARKER.to_string(),
        AnalysisOutcome::Unstructured(text) => text.clone(),
    }
}
