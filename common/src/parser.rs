//! モデル応答パーサー
//!
//! モデルが返すHTML断片をそのまま表示せず、
//! `<div class="medicine">` ブロックごとに Medicine へ分解する

use lazy_static::lazy_static;
use regex::Regex;

use crate::prompts::NO_MEDICINE_MARKER;
use crate::types::{AnalysisOutcome, Medicine};

lazy_static! {
    /// class属性のトークンに `medicine` を含む div（`class="medicine card"` も可）
    static ref MEDICINE_BLOCK: Regex = Regex::new(
        r#"(?is)<div\b[^>]*?\bclass\s*=\s*(?:"(?:[^"]*\s)?medicine(?:\s[^"]*)?"|'(?:[^']*\s)?medicine(?:\s[^']*)?'|medicine\b)[^>]*>(.*?)</div>"#
    )
    .unwrap();
    static ref HEADING: Regex = Regex::new(r"(?is)<h[1-6][^>]*>(.*?)</h[1-6]>").unwrap();
    static ref PARAGRAPH: Regex = Regex::new(r"(?is)<p[^>]*>(.*?)</p>").unwrap();
    static ref TAG: Regex = Regex::new(r"(?s)<[^>]*>").unwrap();
}

/// 応答からHTML部分を抽出
///
/// 抽出優先順位:
/// 1. ```html ... ``` ブロック
/// 2. ``` ... ``` ブロック
/// 3. 応答全体
pub fn extract_html(response: &str) -> &str {
    for marker in ["```html", "```"] {
        if let Some(start_marker) = response.find(marker) {
            let start = start_marker + marker.len();
            if let Some(end_offset) = response[start..].find("```") {
                return response[start..start + end_offset].trim();
            }
        }
    }
    response.trim()
}

/// モデル応答を解釈
///
/// - 薬剤ブロックが1件以上 → `Medicines`
/// - 「NO MEDICINE IDENTIFIED!!」のみ → `NoMedicineIdentified`
/// - それ以外 → タグを除いた本文を `Unstructured` として返す
pub fn parse_medicine_response(response: &str) -> AnalysisOutcome {
    let html = extract_html(response);

    let mut medicines = Vec::new();
    let mut saw_no_medicine = false;

    for block in MEDICINE_BLOCK.captures_iter(html) {
        let body = &block[1];
        let heading = HEADING
            .captures(body)
            .map(|c| clean_text(&c[1]))
            .unwrap_or_default();

        if is_no_medicine_marker(&heading) {
            saw_no_medicine = true;
            continue;
        }

        let paragraphs: Vec<String> = PARAGRAPH
            .captures_iter(body)
            .map(|c| clean_text(&c[1]))
            .collect();

        let medicine = build_medicine(&heading, &paragraphs);
        if medicine != Medicine::default() {
            medicines.push(medicine);
        }
    }

    if !medicines.is_empty() {
        return AnalysisOutcome::Medicines(medicines);
    }
    if saw_no_medicine || is_no_medicine_marker(&clean_text(html)) {
        return AnalysisOutcome::NoMedicineIdentified;
    }
    AnalysisOutcome::Unstructured(clean_text(html))
}

fn is_no_medicine_marker(text: &str) -> bool {
    let marker = NO_MEDICINE_MARKER.trim_end_matches('!');
    text.to_uppercase().contains(marker)
}

/// 見出しと段落から Medicine を組み立てる
///
/// 英語ラベルが1つでもあればラベルで振り分け、該当しない段落は `notes` に残す。
/// 英語ラベルがない（翻訳された）場合は出現順（有効成分 → 用量 → 副作用）で割り当て、
/// 余った段落を `notes` に残す
fn build_medicine(heading: &str, paragraphs: &[String]) -> Medicine {
    let mut medicine = Medicine {
        name: split_label(heading).1.to_string(),
        ..Default::default()
    };

    let mut unlabeled = Vec::new();
    let mut matched_label = false;
    for paragraph in paragraphs {
        let (label, value) = split_label(paragraph);
        let slot = match label.map(|l| l.to_lowercase()) {
            Some(l) if l.contains("ingredient") => &mut medicine.active_ingredient,
            Some(l) if l.contains("dosage") || l.contains("dose") => &mut medicine.dosage,
            Some(l) if l.contains("side effect") => &mut medicine.side_effects,
            _ => {
                unlabeled.push((paragraph.as_str(), value));
                continue;
            }
        };
        matched_label = true;
        *slot = value.to_string();
    }

    let mut rest = unlabeled.into_iter();
    if !matched_label {
        for slot in [
            &mut medicine.active_ingredient,
            &mut medicine.dosage,
            &mut medicine.side_effects,
        ] {
            match rest.next() {
                Some((_, value)) => *slot = value.to_string(),
                None => break,
            }
        }
    }
    medicine.notes = rest
        .map(|(paragraph, _)| paragraph.to_string())
        .filter(|note| !note.is_empty())
        .collect();

    medicine
}

/// "ラベル: 値" を分解
///
/// コロン前に数字がある場合（"8:00 に服用" など）はラベルとみなさない
fn split_label(text: &str) -> (Option<&str>, &str) {
    let Some(idx) = text.find([':', '：']) else {
        return (None, text.trim());
    };
    let label = &text[..idx];
    if label.trim().is_empty() || label.chars().any(|c| c.is_ascii_digit()) {
        return (None, text.trim());
    }
    let sep_len = text[idx..].chars().next().map(char::len_utf8).unwrap_or(1);
    (Some(label.trim()), text[idx + sep_len..].trim())
}

/// タグ除去・実体参照の復元・空白の正規化
fn clean_text(fragment: &str) -> String {
    let without_tags = TAG.replace_all(fragment, " ");
    let decoded = decode_entities(&without_tags);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}
