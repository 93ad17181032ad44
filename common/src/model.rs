//! 生成モデルの抽象化と解析パイプライン
//!
//! 外部モデルは `generate(prompt, language, images) -> text` として扱う。
//! ネイティブ側は Gemini REST で実装する。ブラウザはプロキシサーバに言語と画像だけを送る

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::parser::parse_medicine_response;
use crate::prompts::build_prescription_prompt;
use crate::types::{AnalysisOutcome, InlinePayload};

/// 画像付きプロンプトを受け取りテキストを返す外部モデル
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait GenerativeModel {
    /// `prompt` は `build_prescription_prompt` の出力、`language` はその差し込み値
    async fn generate(
        &self,
        prompt: &str,
        language: &str,
        images: &[InlinePayload],
    ) -> Result<String>;
}

/// 1回分の解析結果（生テキスト + 構造化結果）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelReply {
    pub text: String,
    pub outcome: AnalysisOutcome,
}

impl ModelReply {
    pub fn from_text(text: String) -> Self {
        let outcome = parse_medicine_response(&text);
        Self { text, outcome }
    }
}

/// エンコード済みペイロードで解析を実行
///
/// 画像が空ならモデルは呼ばない
pub async fn analyze_payloads<M>(
    model: &M,
    language: &str,
    images: &[InlinePayload],
) -> Result<ModelReply>
where
    M: GenerativeModel + ?Sized,
{
    if images.is_empty() {
        return Err(Error::NoFileSelected);
    }
    let prompt = build_prescription_prompt(language);
    let text = model.generate(&prompt, language, images).await?;
    Ok(ModelReply::from_text(text))
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// 固定応答を返すテスト用モデル
    pub struct MockModel {
        reply: std::result::Result<String, String>,
        calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
        image_counts: Mutex<Vec<usize>>,
    }

    impl MockModel {
        pub fn replying(text: &str) -> Self {
            Self::with(Ok(text.to_string()))
        }

        pub fn failing(message: &str) -> Self {
            Self::with(Err(message.to_string()))
        }

        fn with(reply: std::result::Result<String, String>) -> Self {
            Self {
                reply,
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
                image_counts: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }

        pub fn image_counts(&self) -> Vec<usize> {
            self.image_counts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GenerativeModel for MockModel {
        async fn generate(
            &self,
            prompt: &str,
            _language: &str,
            images: &[InlinePayload],
        ) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.image_counts.lock().unwrap().push(images.len());
            self.reply.clone().map_err(Error::Model)
        }
    }
}
