//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),

    #[error("No prescription image selected")]
    NoFileSelected,

    #[error("An analysis is already in progress")]
    AnalysisInFlight,

    #[error("Model request failed: {0}")]
    Model(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
