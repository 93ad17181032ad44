//! 画面1枚分の状態管理
//!
//! ファイル選択 → プレビュー → 解析要求 → 結果表示 の状態を保持する。
//! UIフレームワークに依存しないため、Leptos側はこの型をシグナルに包んで使う

use crate::encoder::{encode_all, to_data_url};
use crate::error::{Error, Result};
use crate::model::{GenerativeModel, ModelReply};
use crate::prompts::build_prescription_prompt;
use crate::types::{AnalysisOutcome, InlinePayload, SelectedFile, DEFAULT_LANGUAGE};

/// 解析結果の表示状態
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AnalysisState {
    /// 未解析（ファイル選択・クリア直後）
    #[default]
    Empty,
    /// モデル応答あり（「薬剤なし」もここ）
    Completed {
        text: String,
        outcome: AnalysisOutcome,
    },
    /// 読込失敗・通信失敗など
    Failed { message: String },
}

impl AnalysisState {
    pub fn is_empty(&self) -> bool {
        matches!(self, AnalysisState::Empty)
    }

    /// 完了時のモデル応答テキスト
    pub fn text(&self) -> Option<&str> {
        match self {
            AnalysisState::Completed { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// 実行中の解析要求
///
/// `generation` が現在のセッションと一致しない完了通知は破棄される
#[derive(Debug, Clone)]
pub struct AnalysisTicket {
    generation: u64,
    pub language: String,
    pub prompt: String,
    pub images: Vec<InlinePayload>,
}

/// 処方箋解析画面の状態
#[derive(Debug, Clone)]
pub struct Session {
    selected_file: Option<SelectedFile>,
    preview: Option<String>,
    language: String,
    result: AnalysisState,
    loading: bool,
    generation: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            selected_file: None,
            preview: None,
            language: DEFAULT_LANGUAGE.to_string(),
            result: AnalysisState::Empty,
            loading: false,
            generation: 0,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.selected_file.as_ref()
    }

    pub fn selected_file_name(&self) -> &str {
        self.selected_file
            .as_ref()
            .map(|f| f.name.as_str())
            .unwrap_or("")
    }

    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn result(&self) -> &AnalysisState {
        &self.result
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// ファイルを選択（プレビュー生成・結果クリア）
    pub fn select_file(&mut self, file: SelectedFile) {
        self.preview = Some(to_data_url(&file.mime_type, &file.bytes));
        self.selected_file = Some(file);
        self.result = AnalysisState::Empty;
        self.generation += 1;
    }

    /// 選択ファイル・プレビュー・結果をすべてクリア
    pub fn clear_file(&mut self) {
        self.selected_file = None;
        self.preview = None;
        self.result = AnalysisState::Empty;
        self.generation += 1;
    }

    pub fn set_language(&mut self, language: impl Into<String>) {
        self.language = language.into();
    }

    /// ファイル読込失敗を結果欄に表示
    ///
    /// 読めなかったファイルの前に選んでいたファイルも破棄する
    /// （入力欄の表示と送信対象を一致させるため）
    pub fn report_intake_error(&mut self, message: impl Into<String>) {
        self.selected_file = None;
        self.preview = None;
        self.generation += 1;
        self.result = AnalysisState::Failed {
            message: message.into(),
        };
    }

    /// 解析開始
    ///
    /// 解析中・ファイルなしの場合はエラー（モデルは呼ばれない）
    pub fn begin_analysis(&mut self, files: &[SelectedFile]) -> Result<AnalysisTicket> {
        if self.loading {
            return Err(Error::AnalysisInFlight);
        }
        if files.is_empty() {
            return Err(Error::NoFileSelected);
        }

        self.loading = true;
        Ok(AnalysisTicket {
            generation: self.generation,
            language: self.language.clone(),
            prompt: build_prescription_prompt(&self.language),
            images: encode_all(files),
        })
    }

    /// 解析完了（成功・失敗とも必ずローディングを解除）
    ///
    /// # Returns
    /// 結果を反映した場合は true。途中でファイルが変わっていれば false
    pub fn finish_analysis(&mut self, ticket: AnalysisTicket, response: Result<String>) -> bool {
        self.loading = false;

        if ticket.generation != self.generation {
            return false;
        }

        self.result = match response {
            Ok(text) => {
                let ModelReply { text, outcome } = ModelReply::from_text(text);
                AnalysisState::Completed { text, outcome }
            }
            Err(e) => AnalysisState::Failed {
                message: e.to_string(),
            },
        };
        true
    }

    /// 解析を最後まで実行
    ///
    /// 開始できなかった場合のみ Err。モデル側の失敗は `AnalysisState::Failed` になる
    pub async fn analyze<M>(&mut self, model: &M, files: &[SelectedFile]) -> Result<&AnalysisState>
    where
        M: GenerativeModel + ?Sized,
    {
        let ticket = self.begin_analysis(files)?;
        let response = model
            .generate(&ticket.prompt, &ticket.language, &ticket.images)
            .await;
        self.finish_analysis(ticket, response);
        Ok(&self.result)
    }
}
