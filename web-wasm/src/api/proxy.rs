//! プロキシサーバ経由の解析要求
//!
//! ブラウザはAPIキーもプロンプトも持たない。言語と画像だけを `doc-snap serve` に送り、
//! プロンプトはサーバ側で組み立て直される

use doc_snap_common::{AnalyzeRequest, AnalyzeResponse, Error, ErrorResponse, InlinePayload, Result};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

/// 同一オリジンで配信される場合の解析エンドポイント
pub const DEFAULT_ENDPOINT: &str = "/api/analyze";

/// 送信するJSON本文
pub fn request_body(language: &str, images: &[InlinePayload]) -> Result<String> {
    let request = AnalyzeRequest {
        language: Some(language.to_string()),
        images: images.to_vec(),
    };
    Ok(serde_json::to_string(&request)?)
}

/// ステータスと本文からモデル応答テキストを取り出す
///
/// エラーステータスの場合は本文の `error` を使う（JSONでなければ本文そのまま）
pub fn parse_reply(status: u16, body: &str) -> Result<String> {
    if !(200..300).contains(&status) {
        let detail = serde_json::from_str::<ErrorResponse>(body)
            .map(|e| e.error)
            .unwrap_or_else(|_| body.trim().to_string());
        return Err(Error::Model(format!("Proxy error {}: {}", status, detail)));
    }

    serde_json::from_str::<AnalyzeResponse>(body)
        .map(|response| response.text)
        .map_err(|e| Error::Model(format!("invalid proxy response: {}", e)))
}

fn js_error(value: JsValue) -> Error {
    let message = value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value));
    Error::Model(message)
}

pub struct ProxyModel {
    endpoint: String,
}

impl ProxyModel {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    /// 言語と画像を送り、モデル応答テキストを返す
    pub async fn analyze(&self, language: &str, images: &[InlinePayload]) -> Result<String> {
        let body = request_body(language, images)?;
        let (status, text) = self.post_json(&body).await.map_err(js_error)?;
        parse_reply(status, &text)
    }

    /// POSTしてステータスと本文を返す
    async fn post_json(&self, body: &str) -> std::result::Result<(u16, String), JsValue> {
        let opts = RequestInit::new();
        opts.set_method("POST");
        opts.set_mode(RequestMode::SameOrigin);
        opts.set_body(&JsValue::from_str(body));

        let request = Request::new_with_str_and_init(&self.endpoint, &opts)?;
        request.headers().set("Content-Type", "application/json")?;

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let resp_value = JsFuture::from(window.fetch_with_request(&request)).await?;
        let resp: Response = resp_value.dyn_into()?;
        let text = JsFuture::from(resp.text()?).await?;

        Ok((resp.status(), text.as_string().unwrap_or_default()))
    }
}

impl Default for ProxyModel {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}
