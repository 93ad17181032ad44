use doc_snap_common::AnalysisOutcome;
use serde::{Deserialize, Serialize};

/// CLIの解析結果（JSON出力・キャッシュ共通）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub language: String,

    #[serde(default)]
    pub files: Vec<String>,       // 解析した画像ファイル名

    pub raw_text: String,         // モデル応答そのもの

    pub outcome: AnalysisOutcome, // 構造化結果

    #[serde(default)]
    pub analyzed_at: String,      // RFC 3339

    #[serde(default)]
    pub from_cache: bool,
}
