use crate::error::{DocSnapError, Result};
use doc_snap_common::SelectedFile;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub file_name: String,
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// コマンドライン引数のパスから画像を集める
///
/// - ファイルはそのまま採用（拡張子は問わない）
/// - フォルダは直下の画像のみ、ファイル名順
pub fn collect_images(paths: &[PathBuf]) -> Result<Vec<ImageInfo>> {
    let mut images = Vec::new();

    for path in paths {
        if path.is_file() {
            images.push(ImageInfo {
                path: path.clone(),
                file_name: file_name_of(path),
            });
        } else if path.is_dir() {
            images.extend(scan_folder(path)?);
        } else {
            return Err(DocSnapError::FileNotFound(path.display().to_string()));
        }
    }

    Ok(images)
}

pub fn scan_folder(folder: &Path) -> Result<Vec<ImageInfo>> {
    if !folder.exists() {
        return Err(DocSnapError::FileNotFound(folder.display().to_string()));
    }

    let mut images: Vec<ImageInfo> = WalkDir::new(folder)
        .max_depth(1)  // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .map(|ext| is_image_extension(&ext.to_string_lossy()))
                .unwrap_or(false)
        })
        .map(|p| ImageInfo {
            file_name: file_name_of(&p),
            path: p,
        })
        .collect();

    // ファイル名でソート
    images.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(images)
}

/// MIMEタイプ判定
///
/// マジックバイト → 拡張子 → application/octet-stream の順
pub fn detect_mime_type(path: &Path, bytes: &[u8]) -> String {
    if let Ok(format) = image::guess_format(bytes) {
        return format.to_mime_type().to_string();
    }

    path.extension()
        .and_then(|ext| image::ImageFormat::from_extension(ext))
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string())
}

/// 画像を読み込んで SelectedFile にする
pub fn read_selected_file(image: &ImageInfo) -> Result<SelectedFile> {
    let bytes = std::fs::read(&image.path)?;
    let mime_type = detect_mime_type(&image.path, &bytes);
    Ok(SelectedFile::new(image.file_name.clone(), mime_type, bytes))
}
