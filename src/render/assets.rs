//! Image resolution and decoding.
//!
//! [`AssetCache::preload`] decodes every distinct image reference of a report in parallel before
//! drawing starts. Failures are logged and remembered so the renderer can draw a placeholder
//! without retrying.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::DynamicImage;
use log::{debug, warn};
use rayon::prelude::*;

use crate::model::ImageRef;

/// Reasons an image reference could not be turned into pixels.
#[derive(thiserror::Error, Debug)]
pub enum AssetError {
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("failed to read image {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported image location '{0}'")]
    UnsupportedScheme(String),

    #[error("malformed data URL")]
    MalformedDataUrl,

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// A reference that already failed during preloading.
    #[error("image previously failed to load: {0}")]
    Unavailable(String),
}

/// Decoded images keyed by their reference.
#[derive(Debug, Default)]
pub struct AssetCache {
    loaded: HashMap<ImageRef, Arc<DynamicImage>>,
    failed: HashMap<ImageRef, String>,
}

impl AssetCache {
    /// Decodes all distinct references in parallel.
    pub fn preload<'a>(references: impl IntoIterator<Item = &'a ImageRef>) -> Self {
        let mut seen = HashSet::new();
        let distinct: Vec<&ImageRef> = references
            .into_iter()
            .filter(|reference| seen.insert(*reference))
            .collect();

        let results: Vec<(&ImageRef, Result<DynamicImage, AssetError>)> = distinct
            .par_iter()
            .map(|reference| (*reference, load_image(reference)))
            .collect();

        let mut cache = Self::default();
        for (reference, result) in results {
            match result {
                Ok(image) => {
                    cache.loaded.insert(reference.clone(), Arc::new(image));
                }
                Err(err) => {
                    warn!("image {} will be drawn as a placeholder: {err}", describe(reference));
                    cache.failed.insert(reference.clone(), err.to_string());
                }
            }
        }
        debug!(
            "preloaded {} images ({} failed)",
            cache.loaded.len(),
            cache.failed.len()
        );
        cache
    }

    /// Returns the decoded image, decoding it now if it was not preloaded.
    pub fn get(&self, reference: &ImageRef) -> Result<Arc<DynamicImage>, AssetError> {
        if let Some(image) = self.loaded.get(reference) {
            return Ok(Arc::clone(image));
        }
        if let Some(message) = self.failed.get(reference) {
            return Err(AssetError::Unavailable(message.clone()));
        }
        load_image(reference).map(Arc::new)
    }

    /// Number of successfully decoded images.
    pub fn len(&self) -> usize {
        self.loaded.len()
    }

    /// Whether nothing has been preloaded.
    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty()
    }

    /// Number of references that failed to decode.
    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }
}

/// Short description of a reference for log lines. Data URLs and raw bytes are not echoed.
fn describe(reference: &ImageRef) -> String {
    match reference {
        ImageRef::Resolved(url) if url.starts_with("data:") => "<data url>".to_owned(),
        ImageRef::Resolved(url) => url.clone(),
        ImageRef::Pending { bytes, .. } => format!("<{} pending bytes>", bytes.len()),
    }
}

/// Loads and decodes a single image reference.
pub fn load_image(reference: &ImageRef) -> Result<DynamicImage, AssetError> {
    let bytes = match reference {
        ImageRef::Pending { bytes, .. } => return Ok(image::load_from_memory(bytes)?),
        ImageRef::Resolved(url) => read_bytes(url)?,
    };
    Ok(image::load_from_memory(&bytes)?)
}

fn read_bytes(url: &str) -> Result<Vec<u8>, AssetError> {
    if let Some(rest) = url.strip_prefix("data:") {
        return decode_data_url(rest);
    }
    let path = if let Some(path) = url.strip_prefix("file://") {
        PathBuf::from(path)
    } else if url.contains("://") {
        return Err(AssetError::UnsupportedScheme(url.to_owned()));
    } else {
        PathBuf::from(url)
    };
    fs::read(&path).map_err(|source| AssetError::Io { path, source })
}

/// Decodes the part of a `data:` URL after the scheme. Only base64 payloads carry images.
fn decode_data_url(rest: &str) -> Result<Vec<u8>, AssetError> {
    let (header, payload) = rest.split_once(',').ok_or(AssetError::MalformedDataUrl)?;
    if !header.ends_with(";base64") {
        return Err(AssetError::MalformedDataUrl);
    }
    Ok(STANDARD.decode(payload.trim())?)
}

/// Encodes raw image bytes as a `data:` URL.
pub fn to_data_url(bytes: &[u8], media_type: Option<&str>) -> String {
    let media_type = media_type
        .map(str::to_owned)
        .unwrap_or_else(|| sniff_media_type(bytes).to_owned());
    format!("data:{media_type};base64,{}", STANDARD.encode(bytes))
}

/// Guesses the media type of encoded image bytes.
pub fn sniff_media_type(bytes: &[u8]) -> &'static str {
    match image::guess_format(bytes) {
        Ok(image::ImageFormat::Png) => "image/png",
        Ok(image::ImageFormat::Jpeg) => "image/jpeg",
        Ok(image::ImageFormat::Gif) => "image/gif",
        Ok(image::ImageFormat::WebP) => "image/webp",
        Ok(image::ImageFormat::Bmp) => "image/bmp",
        _ => "application/octet-stream",
    }
}
