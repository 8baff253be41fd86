//! File-name and encoding helpers.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::ImageFormat;

use crate::compression::PreparedImage;

/// Extensions listed from the remote repository, matched case-insensitively.
pub const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "webp", "gif"];

pub fn is_image_filename(name: &str) -> bool {
    match name.rsplit_once('.') {
        Some((_, ext)) => IMAGE_EXTENSIONS
            .iter()
            .any(|known| ext.eq_ignore_ascii_case(known)),
        None => false,
    }
}

/// MIME type of `data`, sniffed from its content, then from the file
/// extension, then `application/octet-stream`.
pub fn guess_mime_type(data: &[u8], filename: &str) -> &'static str {
    if let Ok(format) = image::guess_format(data) {
        return format.to_mime_type();
    }
    filename
        .rsplit_once('.')
        .and_then(|(_, ext)| ImageFormat::from_extension(ext))
        .map(|format| format.to_mime_type())
        .unwrap_or("application/octet-stream")
}

/// `data:<mime>;base64,<payload>` for embedding in the local store.
pub fn to_data_url(mime_type: &str, data: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(data))
}

/// Name to upload `prepared` under: a re-encoded image gets a `.jpg` extension.
pub fn rename_for_output(original: &str, prepared: &PreparedImage) -> String {
    if !prepared.reencoded {
        return original.to_string();
    }
    let stem = match original.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => original,
    };
    format!("{}.jpg", stem)
}
