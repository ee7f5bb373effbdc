//! Logo image references
//!
//! A logo is referenced by a `data:` URI, an http(s) URL or a local file path. HTML output
//! can use all three (local files are inlined as data URIs). PDF output decodes the image:
//! gray and RGB JPEGs are embedded as-is, everything else is re-encoded as deflated pixels
//! with a soft mask for transparency. Remote URLs are never fetched for PDF output.

use std::io::{Cursor, Write};
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::codecs::jpeg::JpegDecoder;
use image::{DynamicImage, ExtendedColorType, ImageDecoder, ImageFormat};
use log::{debug, warn};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LogoError {
    #[error("failed to read logo file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid base64 in logo data URI: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("malformed data URI")]
    MalformedDataUri,
    #[error("remote logos are not fetched: {0}")]
    Remote(String),
    #[error("cannot decode logo image: {0}")]
    Decode(#[from] image::ImageError),
}

/// How the pixel data of a [`LogoImage`] is encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFilter {
    /// Original JPEG stream
    Dct,
    /// Zlib-deflated 8-bit samples
    Flate,
}

impl ImageFilter {
    pub fn pdf_name(self) -> &'static str {
        match self {
            ImageFilter::Dct => "DCTDecode",
            ImageFilter::Flate => "FlateDecode",
        }
    }
}

/// A logo decoded for PDF embedding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoImage {
    pub width: u32,
    pub height: u32,
    /// `DeviceGray` or `DeviceRGB`
    pub color_space: &'static str,
    pub filter: ImageFilter,
    pub data: Vec<u8>,
    /// Deflated 8-bit alpha samples, only for images with transparency
    pub alpha: Option<Vec<u8>>,
}

fn is_remote(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}

fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// `href` usable in SVG/HTML, or `None` when the file can't be read
pub fn logo_href(reference: &str) -> Option<String> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }
    if reference.starts_with("data:") || is_remote(reference) {
        return Some(reference.to_string());
    }

    let path = Path::new(reference);
    match std::fs::read(path) {
        Ok(bytes) => Some(format!(
            "data:{};base64,{}",
            mime_for_path(path),
            BASE64_STANDARD.encode(bytes)
        )),
        Err(e) => {
            warn!("skipping logo {}: {}", reference, e);
            None
        }
    }
}

/// Decoded payload of `data:<mime>;base64,<payload>`
///
/// The declared mime type is ignored; the image format is sniffed from the bytes.
fn decode_data_uri(uri: &str) -> Result<Vec<u8>, LogoError> {
    let rest = uri.strip_prefix("data:").ok_or(LogoError::MalformedDataUri)?;
    let (header, payload) = rest.split_once(',').ok_or(LogoError::MalformedDataUri)?;
    if !header.ends_with(";base64") {
        return Err(LogoError::MalformedDataUri);
    }
    Ok(BASE64_STANDARD.decode(payload.trim())?)
}

fn read_logo_bytes(reference: &str) -> Result<Vec<u8>, LogoError> {
    if reference.starts_with("data:") {
        decode_data_uri(reference)
    } else if is_remote(reference) {
        Err(LogoError::Remote(reference.to_string()))
    } else {
        Ok(std::fs::read(reference)?)
    }
}

fn deflate(samples: &[u8]) -> Result<Vec<u8>, LogoError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(samples)?;
    Ok(encoder.finish()?)
}

/// JPEG stream that a PDF reader can decode directly, if this is one
fn jpeg_passthrough(bytes: &[u8]) -> Result<Option<LogoImage>, LogoError> {
    let decoder = JpegDecoder::new(Cursor::new(bytes))?;
    let color_space = match decoder.original_color_type() {
        ExtendedColorType::L8 => "DeviceGray",
        ExtendedColorType::Rgb8 => "DeviceRGB",
        _ => return Ok(None),
    };
    let (width, height) = decoder.dimensions();
    Ok(Some(LogoImage {
        width,
        height,
        color_space,
        filter: ImageFilter::Dct,
        data: bytes.to_vec(),
        alpha: None,
    }))
}

fn reencode(image: &DynamicImage) -> Result<LogoImage, LogoError> {
    let color = image.color();
    let (color_space, samples) = if color.has_color() {
        ("DeviceRGB", image.to_rgb8().into_raw())
    } else {
        ("DeviceGray", image.to_luma8().into_raw())
    };
    let alpha = if color.has_alpha() {
        let samples: Vec<u8> = image.to_rgba8().pixels().map(|p| p.0[3]).collect();
        Some(deflate(&samples)?)
    } else {
        None
    };
    Ok(LogoImage {
        width: image.width(),
        height: image.height(),
        color_space,
        filter: ImageFilter::Flate,
        data: deflate(&samples)?,
        alpha,
    })
}

/// Turn encoded image bytes into something a PDF image XObject can hold
pub fn decode_logo(bytes: &[u8]) -> Result<LogoImage, LogoError> {
    let format = image::guess_format(bytes)?;
    if format == ImageFormat::Jpeg {
        if let Some(image) = jpeg_passthrough(bytes)? {
            return Ok(image);
        }
        debug!("re-encoding JPEG logo with a color space PDF can't take as-is");
    }
    let image = image::load_from_memory_with_format(bytes, format)?;
    reencode(&image)
}

/// Load a logo for PDF embedding; failures are logged and yield `None`
pub fn load_logo(reference: &str) -> Option<LogoImage> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }
    match read_logo_bytes(reference).and_then(|bytes| decode_logo(&bytes)) {
        Ok(image) => Some(image),
        Err(e) => {
            warn!("logo not embedded in PDF: {}", e);
            None
        }
    }
}
