//! 画像ペイロードのエンコード
//!
//! 選択ファイル → Data URL → Base64部分のみを取り出してモデルへ送る

use base64::{engine::general_purpose, Engine as _};

use crate::error::{Error, Result};
use crate::types::{InlinePayload, SelectedFile};

/// MIMEタイプ不明時の既定値
const FALLBACK_MIME_TYPE: &str = "image/jpeg";

/// バイト列から Data URL を生成
pub fn to_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime_type,
        general_purpose::STANDARD.encode(bytes)
    )
}

/// Data URLからBase64データ部分を抽出
///
/// # Arguments
/// * `data_url` - "data:image/jpeg;base64,/9j/4AAQ..." 形式のData URL
///
/// # Returns
/// Base64エンコードされたデータ部分、または抽出失敗時はNone
pub fn extract_base64_from_data_url(data_url: &str) -> Option<&str> {
    data_url.split_once(',').map(|(_, data)| data)
}

/// Data URLからMIMEタイプを抽出（取れない場合は "image/jpeg"）
pub fn extract_mime_type_from_data_url(data_url: &str) -> &str {
    data_url
        .strip_prefix("data:")
        .and_then(|s| s.split([';', ',']).next())
        .filter(|s| !s.is_empty())
        .unwrap_or(FALLBACK_MIME_TYPE)
}

/// Data URL を (MIMEタイプ, Base64) に分解
pub fn split_data_url(data_url: &str) -> Result<InlinePayload> {
    if !data_url.starts_with("data:") {
        return Err(Error::InvalidDataUrl("missing data: scheme".into()));
    }
    let data = extract_base64_from_data_url(data_url)
        .ok_or_else(|| Error::InvalidDataUrl("missing payload separator".into()))?;

    Ok(InlinePayload {
        mime_type: extract_mime_type_from_data_url(data_url).to_string(),
        data: data.to_string(),
    })
}

/// 選択ファイルをインラインペイロードに変換
///
/// 同じバイト列からは常に同じ結果になる
pub fn encode(file: &SelectedFile) -> InlinePayload {
    let data_url = to_data_url(&file.mime_type, &file.bytes);
    // to_data_url の出力は必ず "data:" と ',' を含む
    let data = split_data_url(&data_url)
        .map(|payload| payload.data)
        .unwrap_or_default();

    InlinePayload {
        mime_type: file.mime_type.clone(),
        data,
    }
}

/// 複数ファイルをまとめてエンコード（入力順を保持）
pub fn encode_all(files: &[SelectedFile]) -> Vec<InlinePayload> {
    files.iter().map(encode).collect()
}

/// Base64ペイロードをバイト列へ戻す
pub fn decode_payload(payload: &InlinePayload) -> Result<Vec<u8>> {
    general_purpose::STANDARD
        .decode(payload.data.as_bytes())
        .map_err(|e| Error::InvalidDataUrl(format!("base64 decode failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_file() -> SelectedFile {
        SelectedFile::new("rx.png", "image/png", vec![0x89, b'P', b'N', b'G', 1, 2, 3])
    }

    // =============================================
    // Data URL抽出テスト
    // =============================================

    #[test]
    fn test_extract_base64_from_data_url_jpeg() {
        let data_url = "data:image/jpeg;base64,/9j/4AAQSkZJRg==";
        assert_eq!(extract_base64_from_data_url(data_url), Some("/9j/4AAQSkZJRg=="));
    }

    #[test]
    fn test_extract_base64_from_data_url_invalid() {
        assert_eq!(extract_base64_from_data_url("not a data url"), None);
        assert_eq!(extract_base64_from_data_url(""), None);
    }

    #[test]
    fn test_extract_mime_type_png() {
        let data_url = "data:image/png;base64,iVBORw0KGgo=";
        assert_eq!(extract_mime_type_from_data_url(data_url), "image/png");
    }

    #[test]
    fn test_extract_mime_type_default() {
        assert_eq!(extract_mime_type_from_data_url("invalid"), "image/jpeg");
        assert_eq!(extract_mime_type_from_data_url("data:;base64,AAAA"), "image/jpeg");
    }

    #[test]
    fn test_split_data_url() {
        let payload = split_data_url("data:image/webp;base64,UklGR").unwrap();
        assert_eq!(payload.mime_type, "image/webp");
        assert_eq!(payload.data, "UklGR");
    }

    #[test]
    fn test_split_data_url_rejects_plain_text() {
        assert!(matches!(
            split_data_url("hello"),
            Err(Error::InvalidDataUrl(_))
        ));
        assert!(matches!(
            split_data_url("data:image/png;base64"),
            Err(Error::InvalidDataUrl(_))
        ));
    }

    // =============================================
    // エンコードテスト
    // =============================================

    #[test]
    fn test_data_url_contains_mime_type() {
        let file = sample_file();
        let url = to_data_url(&file.mime_type, &file.bytes);
        assert!(url.starts_with("data:image/png;base64,"));
        assert!(url.len() > "data:image/png;base64,".len());
    }

    #[test]
    fn test_encode_is_deterministic() {
        let file = sample_file();
        let first = encode(&file);
        let second = encode(&file.clone());
        assert_eq!(first, second);
        assert_eq!(first.mime_type, "image/png");
        assert!(!first.data.contains(','));
    }

    #[test]
    fn test_encode_strips_header_only() {
        let file = SelectedFile::new("a.jpg", "image/jpeg", b"hello".to_vec());
        assert_eq!(encode(&file).data, "aGVsbG8=");
    }

    #[test]
    fn test_encode_all_keeps_order() {
        let files = vec![
            SelectedFile::new("1.jpg", "image/jpeg", b"one".to_vec()),
            SelectedFile::new("2.png", "image/png", b"two".to_vec()),
        ];
        let payloads = encode_all(&files);
        assert_eq!(payloads.len(), 2);
        assert_eq!(payloads[0].mime_type, "image/jpeg");
        assert_eq!(payloads[1].mime_type, "image/png");
    }

    #[test]
    fn test_decode_payload_restores_bytes() {
        let file = sample_file();
        let restored = decode_payload(&encode(&file)).unwrap();
        assert_eq!(restored, file.bytes);
    }

    #[test]
    fn test_decode_payload_invalid() {
        let payload = InlinePayload {
            mime_type: "image/png".into(),
            data: "***".into(),
        };
        assert!(decode_payload(&payload).is_err());
    }
}
