//! 処方箋解析の型定義
//!
//! CLI・プロキシサーバ・Web(WASM)で共有される型:
//! - SelectedFile: ユーザーが選択した処方箋画像
//! - InlinePayload: モデルへ送る Base64 + MIME タイプ
//! - Medicine / AnalysisOutcome: モデル応答を構造化した結果

use serde::{Deserialize, Serialize};

/// 選択可能な言語（プロンプトに埋め込まれる）
pub const LANGUAGES: &[&str] = &["English", "Kannada", "Hindi"];

/// 既定の言語
pub const DEFAULT_LANGUAGE: &str = "English";

/// ユーザーが選択した画像ファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }
}

/// モデルへ送るインライン画像
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlinePayload {
    pub mime_type: String,
    pub data: String,
}

/// 1件の薬剤情報
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Medicine {
    pub name: String,
    pub active_ingredient: String,
    pub dosage: String,
    pub side_effects: String,
    /// 上記以外の段落（ブランド名・服用上の注意など）
    pub notes: Vec<String>,
}

/// モデル応答の解釈結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum AnalysisOutcome {
    /// 薬剤ブロックを1件以上検出
    Medicines(Vec<Medicine>),
    /// 「NO MEDICINE IDENTIFIED!!」応答（成功扱い）
    NoMedicineIdentified,
    /// 期待した形式ではない応答（プレーンテキストとして表示）
    Unstructured(String),
}

impl AnalysisOutcome {
    pub fn medicines(&self) -> &[Medicine] {
        match self {
            AnalysisOutcome::Medicines(list) => list,
            _ => &[],
        }
    }
}

/// `POST /api/analyze` リクエスト（ブラウザ → プロキシ）
///
/// プロンプトは含めない。プロキシが言語から組み立て直す
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default)]
    pub images: Vec<InlinePayload>,
}

/// `POST /api/analyze` 成功レスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub text: String,
    pub outcome: AnalysisOutcome,
    /// エスケープ済みの再構成HTML
    pub html: String,
}

/// プロキシのエラーレスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
