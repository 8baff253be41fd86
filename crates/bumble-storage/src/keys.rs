//! Repository path generation for uploads.
//!
//! Layout: `images/{account}/{millis}-{sanitized name}`.

use bumble_core::constants::IMAGES_DIR;
use bumble_core::Account;

/// Directory holding `account`'s uploads.
pub fn account_dir(account: Account) -> String {
    format!("{}/{}", IMAGES_DIR, account)
}

/// Replace every character outside `[A-Za-z0-9_.-]` with `_`.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// File name an upload is stored under.
pub fn upload_name(timestamp_millis: i64, original: &str) -> String {
    format!("{}-{}", timestamp_millis, sanitize_filename(original))
}

/// Full repository path for an upload.
pub fn upload_path(account: Account, safe_name: &str) -> String {
    format!("{}/{}", account_dir(account), safe_name)
}
