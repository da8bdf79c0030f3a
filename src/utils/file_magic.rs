const OLE_HEADER: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
const ZIP_HEADER: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// 检查文件头是否与扩展名相符
///
/// `extension` 含点号且不区分大小写。文本类型只要求开头没有 NUL 字节，未知类型一律拒绝。
pub fn validate_magic_bytes(data: &[u8], extension: &str) -> bool {
    if data.is_empty() {
        return false;
    }

    match extension.to_lowercase().as_str() {
        ".png" => data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
        ".jpg" | ".jpeg" => data.starts_with(&[0xFF, 0xD8, 0xFF]),
        ".gif" => data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a"),
        ".webp" => data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP",
        ".bmp" => data.starts_with(b"BM"),
        ".ico" => data.starts_with(&[0x00, 0x00, 0x01, 0x00]),

        ".pdf" => data.starts_with(b"%PDF"),
        ".doc" | ".xls" | ".ppt" => data.starts_with(&OLE_HEADER),
        // OOXML 本质是 zip
        ".docx" | ".xlsx" | ".pptx" | ".zip" => data.starts_with(&ZIP_HEADER),

        ".txt" | ".md" | ".csv" | ".json" => !data.iter().take(512).any(|&b| b == 0),

        _ => false,
    }
}

const IMAGE_EXTENSIONS: [&str; 6] = [".png", ".jpg", ".gif", ".webp", ".bmp", ".ico"];

/// 根据魔术字节识别图片格式，返回对应扩展名
pub fn detect_image_extension(data: &[u8]) -> Option<&'static str> {
    IMAGE_EXTENSIONS
        .into_iter()
        .find(|ext| validate_magic_bytes(data, ext))
}

/// 声明的 MIME 为 `image/*` 且内容确为图片
pub fn is_image(data: &[u8], content_type: Option<&str>) -> bool {
    let declared = content_type
        .map(|ct| ct.trim().to_ascii_lowercase().starts_with("image/"))
        .unwrap_or(false);
    declared && detect_image_extension(data).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00];
    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0];
    const OLE: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1, 0x00];
    const ZIP: &[u8] = &[0x50, 0x4B, 0x03, 0x04, 0x14];

    #[test]
    fn test_accepted_headers() {
        let cases: &[(&[u8], &str)] = &[
            (PNG, ".png"),
            (PNG, ".PNG"),
            (JPEG, ".jpg"),
            (JPEG, ".jpeg"),
            (b"%PDF-1.4", ".pdf"),
            (OLE, ".doc"),
            (ZIP, ".docx"),
            (ZIP, ".zip"),
            (b"matric,level\nCSC/001,200", ".csv"),
        ];
        for (data, ext) in cases {
            assert!(validate_magic_bytes(data, ext), "{ext} should be accepted");
        }
    }

    #[test]
    fn test_rejected_headers() {
        let cases: &[(&[u8], &str)] = &[
            (PNG, ".jpg"),
            (JPEG, ".png"),
            (b"%PDF-1.4", ".doc"),
            (OLE, ".docx"),
            (PNG, ".txt"),
            (&[], ".txt"),
            (&[], ".png"),
            (b"MZ\x90\x00", ".exe"),
        ];
        for (data, ext) in cases {
            assert!(!validate_magic_bytes(data, ext), "{ext} should be rejected");
        }
    }

    #[test]
    fn test_is_image() {
        assert_eq!(detect_image_extension(PNG), Some(".png"));
        assert!(is_image(PNG, Some("image/png")));
        // 声明类型与内容必须同时满足
        assert!(!is_image(PNG, Some("application/pdf")));
        assert!(!is_image(PNG, None));
        assert!(!is_image(b"%PDF-1.7", Some("image/png")));
    }
}
