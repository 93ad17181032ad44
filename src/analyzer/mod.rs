pub mod cache;
mod gemini;
mod types;

pub use cache::CacheFile;
pub use gemini::{GeminiClient, GEMINI_API_BASE};
pub use types::AnalysisReport;

use crate::error::{DocSnapError, Result};
use crate::scanner::{self, ImageInfo};
use doc_snap_common::{analyze_payloads, encode_all, GenerativeModel};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// 解析オプション
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyzeOptions<'a> {
    /// Some の場合はキャッシュを使用
    pub cache_dir: Option<&'a Path>,
    /// モデル応答待ちのスピナーを表示
    pub show_progress: bool,
}

fn spinner(show: bool) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} ({elapsed})") {
        pb.set_style(style);
    }
    pb.set_message("処方箋を解析中...");
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// 画像をまとめて1回のモデル呼び出しで解析
pub async fn analyze_images<M>(
    model: &M,
    images: &[ImageInfo],
    language: &str,
    options: AnalyzeOptions<'_>,
) -> Result<AnalysisReport>
where
    M: GenerativeModel + ?Sized,
{
    if images.is_empty() {
        return Err(DocSnapError::NoImagesFound("(no paths)".into()));
    }

    let files = images
        .iter()
        .map(scanner::read_selected_file)
        .collect::<Result<Vec<_>>>()?;
    let payloads = encode_all(&files);
    let file_names: Vec<String> = files.iter().map(|f| f.name.clone()).collect();

    let mut cache = options.cache_dir.map(CacheFile::load);
    let key = cache::cache_key(language, &payloads);

    if let Some(hit) = cache.as_ref().and_then(|c| c.get(&key)) {
        info!(key = %key, "cache hit");
        return Ok(AnalysisReport {
            from_cache: true,
            ..hit.clone()
        });
    }

    debug!(files = ?file_names, language, "sending prescription images");
    let pb = spinner(options.show_progress);
    let reply = analyze_payloads(model, language, &payloads).await;
    pb.finish_and_clear();
    let reply = reply?;

    let report = AnalysisReport {
        language: language.trim().to_string(),
        files: file_names,
        raw_text: reply.text,
        outcome: reply.outcome,
        analyzed_at: chrono::Local::now().to_rfc3339(),
        from_cache: false,
    };

    if let (Some(cache), Some(dir)) = (cache.as_mut(), options.cache_dir) {
        cache.insert(key, report.clone());
        cache.save(dir)?;
    }

    Ok(report)
}
