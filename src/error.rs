use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocSnapError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。`doc-snap config --set-api-key YOUR_KEY` または環境変数 GEMINI_API_KEY で設定してください")]
    MissingApiKey,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("画像が見つかりません: {0}")]
    NoImagesFound(String),

    #[error("API呼び出しエラー: {0}")]
    ApiCall(String),

    #[error("APIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    #[error("サーバエラー: {0}")]
    Server(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] doc_snap_common::Error),
}

pub type Result<T> = std::result::Result<T, DocSnapError>;

impl From<DocSnapError> for doc_snap_common::Error {
    /// GenerativeModel 実装から共通エラーへ戻す
    fn from(err: DocSnapError) -> Self {
        match err {
            DocSnapError::Common(inner) => inner,
            other => doc_snap_common::Error::Model(other.to_string()),
        }
    }
}
