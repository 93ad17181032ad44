use crate::error::{DocSnapError, Result};
use doc_snap_common::DEFAULT_LANGUAGE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// APIキーを読む環境変数
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub default_language: String,
    pub temperature: f32,
    pub timeout_seconds: u64,
    pub server_host: String,
    pub server_port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.0-flash".into(),
            default_language: DEFAULT_LANGUAGE.into(),
            temperature: 0.2,
            timeout_seconds: 120,
            server_host: "127.0.0.1".into(),
            server_port: 8080,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| DocSnapError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("doc-snap").join("config.json"))
    }

    pub fn get_api_key(&self) -> Result<String> {
        // 環境変数を優先
        Self::resolve_api_key(std::env::var(API_KEY_ENV).ok(), self.api_key.as_deref())
    }

    fn resolve_api_key(env_key: Option<String>, stored: Option<&str>) -> Result<String> {
        env_key
            .filter(|k| !k.trim().is_empty())
            .or_else(|| stored.filter(|k| !k.trim().is_empty()).map(str::to_string))
            .ok_or(DocSnapError::MissingApiKey)
    }

    /// 表示用（実際に使われるキーの先頭4文字以外を伏せる）
    pub fn masked_api_key(&self) -> String {
        Self::mask_resolved_key(std::env::var(API_KEY_ENV).ok(), self.api_key.as_deref())
    }

    fn mask_resolved_key(env_key: Option<String>, stored: Option<&str>) -> String {
        match Self::resolve_api_key(env_key, stored) {
            Ok(key) => {
                let head: String = key.trim().chars().take(4).collect();
                format!("{}…", head)
            }
            Err(_) => "未設定".into(),
        }
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }

    pub fn set_default_language(&mut self, language: String) -> Result<()> {
        self.default_language = language;
        self.save()
    }
}
