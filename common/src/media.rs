//! 画像形式の判定
//!
//! base64ペイロード先頭のシグネチャからMIMEタイプを決める。
//! 判定できない場合は常に `image/jpeg`（エラーにはしない）。

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

pub const MEDIA_PNG: &str = "image/png";
pub const MEDIA_JPEG: &str = "image/jpeg";
pub const MEDIA_WEBP: &str = "image/webp";
pub const MEDIA_GIF: &str = "image/gif";

/// デコード対象にする先頭文字数（最長シグネチャ12バイトを十分に含む）
const SIGNATURE_PREFIX_CHARS: usize = 100;

/// 形式判定済みの画像
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    pub media_type: &'static str,
    /// base64データ（Data URLのプレフィックスは除去済み）
    pub data: String,
}

impl ImageAsset {
    pub fn from_base64(data: &str) -> Self {
        let data = strip_data_url(data);
        Self {
            media_type: detect_media_type(data),
            data: data.to_string(),
        }
    }
}

/// Data URL（`data:image/png;base64,....`）ならbase64部分だけを返す
pub fn strip_data_url(data: &str) -> &str {
    if data.starts_with("data:") {
        if let Some((_, payload)) = data.split_once(',') {
            return payload;
        }
    }
    data
}

/// base64文字列から画像のMIMEタイプを判定
///
/// 優先順位: PNG → JPEG → WEBP → GIF → `image/jpeg`
///
/// # Examples
/// ```
/// use tastecheck_common::detect_media_type;
///
/// assert_eq!(detect_media_type("iVBORw0KGgo="), "image/png");
/// assert_eq!(detect_media_type("not base64!"), "image/jpeg");
/// ```
pub fn detect_media_type(image_base64: &str) -> &'static str {
    let raw = image_base64.as_bytes();

    // 改行入りのbase64も読めるよう空白を除き、4文字単位に揃えてからデコード
    let mut prefix: Vec<u8> = raw[..raw.len().min(SIGNATURE_PREFIX_CHARS)]
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    prefix.truncate(prefix.len() / 4 * 4);

    let Ok(bytes) = STANDARD.decode(&prefix) else {
        return MEDIA_JPEG;
    };

    if bytes.starts_with(b"\x89PNG") {
        MEDIA_PNG
    } else if bytes.starts_with(b"\xff\xd8\xff") {
        MEDIA_JPEG
    } else if bytes.starts_with(b"RIFF") && bytes.get(8..12) == Some(b"WEBP".as_slice()) {
        MEDIA_WEBP
    } else if bytes.starts_with(b"GIF8") || bytes.starts_with(b"GIF9") {
        MEDIA_GIF
    } else {
        MEDIA_JPEG
    }
}
