use serde::{Deserialize, Serialize};

/// A reference to one photo in an account's namespace.
///
/// Items carry no identifier beyond their reference string: the download URL
/// for remote items, the embedded data URL for local ones. Like records match
/// on that string, so a renamed remote file no longer matches earlier likes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ImageItem {
    Remote { url: String },
    Local { data_url: String },
}

impl ImageItem {
    /// The display-ready reference (usable directly as an image source).
    pub fn reference(&self) -> &str {
        match self {
            ImageItem::Remote { url } => url,
            ImageItem::Local { data_url } => data_url,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, ImageItem::Remote { .. })
    }
}
