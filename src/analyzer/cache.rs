//! 解析結果キャッシュモジュール
//!
//! 言語と画像ペイロードのSHA-256をキーにして解析結果をキャッシュし、
//! 同じ処方箋の再解析をスキップする。

use crate::error::{DocSnapError, Result};
use super::types::AnalysisReport;
use doc_snap_common::InlinePayload;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::warn;

const CACHE_FILE_NAME: &str = ".analysis-cache.json";

/// キャッシュファイルの構造
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheFile {
    /// バージョン（互換性チェック用）
    version: u32,
    /// ハッシュ → 解析結果のマップ
    entries: HashMap<String, AnalysisReport>,
}

impl CacheFile {
    const CURRENT_VERSION: u32 = 1;

    /// 既定のキャッシュディレクトリ（~/.cache/doc-snap など）
    pub fn default_dir() -> Result<PathBuf> {
        let base = dirs::cache_dir()
            .ok_or_else(|| DocSnapError::Config("キャッシュディレクトリが見つかりません".into()))?;
        Ok(base.join("doc-snap"))
    }

    pub fn cache_path(dir: &Path) -> PathBuf {
        dir.join(CACHE_FILE_NAME)
    }

    /// キャッシュファイルを読み込み（壊れている場合は空）
    pub fn load(dir: &Path) -> Self {
        let cache_path = Self::cache_path(dir);
        let file = match File::open(&cache_path) {
            Ok(f) => f,
            Err(_) => return Self::default(),
        };

        match serde_json::from_reader::<_, CacheFile>(BufReader::new(file)) {
            Ok(cache) if cache.version == Self::CURRENT_VERSION => cache,
            Ok(_) => {
                warn!("キャッシュバージョン不一致、再生成します");
                Self::default()
            }
            Err(e) => {
                warn!(error = %e, "キャッシュファイルが壊れています");
                Self::default()
            }
        }
    }

    /// キャッシュファイルを保存
    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        let file = File::create(Self::cache_path(dir))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }

    /// キャッシュファイルを削除
    ///
    /// # Returns
    /// 削除した場合は true、存在しなかった場合は false
    pub fn clear(dir: &Path) -> Result<bool> {
        let cache_path = Self::cache_path(dir);
        if !cache_path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(cache_path)?;
        Ok(true)
    }

    pub fn get(&self, key: &str) -> Option<&AnalysisReport> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: String, report: AnalysisReport) {
        self.entries.insert(key, report);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CacheFile {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            entries: HashMap::new(),
        }
    }
}

/// キャッシュキー: 言語 + 全ペイロード（順序込み）のSHA-256
pub fn cache_key(language: &str, images: &[InlinePayload]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(language.trim().as_bytes());
    for image in images {
        hasher.update([0u8]);
        hasher.update(image.mime_type.as_bytes());
        hasher.update([0u8]);
        hasher.update(image.data.as_bytes());
    }
    hex::encode(hasher.finalize())
}
