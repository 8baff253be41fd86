//! Bumble Processing Library
//!
//! Image intake for uploads: decoding, bounded downscaling and quality-stepped
//! JPEG re-encoding to fit a byte budget, plus format helpers shared by the
//! storage backends.

pub mod compression;
pub mod formats;

pub use compression::{
    prepare_for_upload, prepare_in_background, CompressionSettings, PreparedImage,
    ProcessingError,
};
pub use formats::{guess_mime_type, is_image_filename, rename_for_output, to_data_url};
