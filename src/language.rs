//! 言語選択

use crate::error::{DocSnapError, Result};
use dialoguer::Select;
use doc_snap_common::LANGUAGES;

/// 既定言語のインデックス（一覧にない場合は先頭）
pub fn default_index(default_language: &str) -> usize {
    LANGUAGES
        .iter()
        .position(|l| l.eq_ignore_ascii_case(default_language.trim()))
        .unwrap_or(0)
}

/// 一覧から言語を対話的に選択
pub fn pick_language(default_language: &str) -> Result<String> {
    let index = Select::new()
        .with_prompt("説明文の言語を選択")
        .items(LANGUAGES)
        .default(default_index(default_language))
        .interact()
        .map_err(|e| DocSnapError::Config(format!("言語選択に失敗: {}", e)))?;
    Ok(LANGUAGES[index].to_string())
}

/// --language / --pick-language / 設定値 から言語を決定
pub fn resolve_language(
    explicit: Option<String>,
    pick: bool,
    default_language: &str,
) -> Result<String> {
    if pick {
        return pick_language(default_language);
    }
    Ok(explicit
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| default_language.to_string()))
}
