// ImageQA - core/image.rs
//
// Decoding uploaded bytes into an image descriptor, and re-encoding the
// current image into the payload sent to the answering collaborator.
//
// Accepted encodings: PNG, JPEG, BMP, GIF. The encoding is detected from the
// content; the declared format (usually the file extension) is only a
// fallback when the content does not carry a recognisable signature.

use crate::util::constants::MAX_UPLOAD_BYTES;
use crate::util::error::DecodeError;
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, GenericImageView, ImageFormat};
use std::fmt;
use std::io::Cursor;

/// Image encodings accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormatKind {
    Png,
    Jpeg,
    Bmp,
    Gif,
}

impl ImageFormatKind {
    /// Upper-case label shown next to the image ("PNG", "JPEG", ...).
    pub fn label(&self) -> &'static str {
        match self {
            Self::Png => "PNG",
            Self::Jpeg => "JPEG",
            Self::Bmp => "BMP",
            Self::Gif => "GIF",
        }
    }

    /// Canonical lower-case file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Bmp => "bmp",
            Self::Gif => "gif",
        }
    }

    /// Map a file extension or format name (case-insensitive, leading dot allowed).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" | "jpe" | "jfif" => Some(Self::Jpeg),
            "bmp" | "dib" => Some(Self::Bmp),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }

    /// Map an `image` crate format; `None` for encodings we do not accept.
    pub fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Png => Some(Self::Png),
            ImageFormat::Jpeg => Some(Self::Jpeg),
            ImageFormat::Bmp => Some(Self::Bmp),
            ImageFormat::Gif => Some(Self::Gif),
            _ => None,
        }
    }

    pub fn to_image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Bmp => ImageFormat::Bmp,
            Self::Gif => ImageFormat::Gif,
        }
    }
}

impl fmt::Display for ImageFormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Display metrics of an uploaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormatKind,
}

impl ImageInfo {
    /// "W × H" as shown in the dimensions metric.
    pub fn dimensions_label(&self) -> String {
        format!("{} \u{00d7} {}", self.width, self.height)
    }
}

/// The currently uploaded image: descriptor, original bytes, decoded pixels.
pub struct LoadedImage {
    info: ImageInfo,
    color: ColorType,
    bytes: Vec<u8>,
    pixels: DynamicImage,
}

impl LoadedImage {
    pub fn info(&self) -> ImageInfo {
        self.info
    }

    /// Colour layout of the decoded pixels (shown in debug info).
    pub fn color_type(&self) -> ColorType {
        self.color
    }

    /// The payload exactly as uploaded.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn pixels(&self) -> &DynamicImage {
        &self.pixels
    }
}

// Manual impl: the derived one would dump every pixel.
impl fmt::Debug for LoadedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedImage")
            .field("info", &self.info)
            .field("color", &self.color)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Image preprocessing applied before the payload is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preprocessing {
    pub resize_enabled: bool,
    /// Longest side after resizing. Only consulted when `resize_enabled`.
    pub max_dimension: u32,
}

impl Default for Preprocessing {
    fn default() -> Self {
        Self {
            resize_enabled: false,
            max_dimension: crate::util::constants::DEFAULT_MAX_DIMENSION,
        }
    }
}

/// Encoded image bytes handed to the answering collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub format: ImageFormatKind,
    pub width: u32,
    pub height: u32,
}

/// Decode an uploaded payload.
///
/// `declared` is the caller's idea of the format (typically the file
/// extension). It is only used when the content cannot be sniffed.
pub fn decode(bytes: Vec<u8>, declared: Option<&str>) -> Result<LoadedImage, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(DecodeError::TooLarge {
            size: bytes.len(),
            max_size: MAX_UPLOAD_BYTES,
        });
    }

    let format = match image::guess_format(&bytes) {
        Ok(detected) => {
            let kind = ImageFormatKind::from_image_format(detected).ok_or_else(|| {
                DecodeError::UnsupportedFormat {
                    format: format!("{detected:?}").to_uppercase(),
                }
            })?;
            if let Some(declared_kind) = declared.and_then(ImageFormatKind::from_extension) {
                if declared_kind != kind {
                    tracing::debug!(
                        declared = declared_kind.label(),
                        detected = kind.label(),
                        "Declared image format differs from content; using content"
                    );
                }
            }
            kind
        }
        Err(_) => declared
            .and_then(ImageFormatKind::from_extension)
            .ok_or_else(|| DecodeError::Unrecognised {
                declared: declared.map(str::to_string),
            })?,
    };

    let pixels = image::load_from_memory_with_format(&bytes, format.to_image_format())
        .map_err(|e| DecodeError::Malformed {
            format: format.label(),
            source: e,
        })?;

    let (width, height) = pixels.dimensions();
    let color = pixels.color();

    tracing::debug!(
        width,
        height,
        format = format.label(),
        color = ?color,
        bytes = bytes.len(),
        "Image decoded"
    );

    Ok(LoadedImage {
        info: ImageInfo {
            width,
            height,
            format,
        },
        color,
        bytes,
        pixels,
    })
}

/// Re-encode `image` for the answering collaborator.
///
/// The payload uses the image's original encoding. When resizing is enabled
/// and the longer side exceeds `max_dimension`, the image is first scaled
/// down preserving its aspect ratio.
pub fn encode_payload(
    image: &LoadedImage,
    preprocessing: &Preprocessing,
) -> Result<ImagePayload, image::ImageError> {
    let format = image.info.format;
    let (width, height) = image.pixels.dimensions();

    let needs_resize = preprocessing.resize_enabled
        && preprocessing.max_dimension > 0
        && width.max(height) > preprocessing.max_dimension;

    let resized;
    let source = if needs_resize {
        let max = preprocessing.max_dimension;
        resized = image.pixels.resize(max, max, FilterType::Lanczos3);
        tracing::debug!(
            from_width = width,
            from_height = height,
            to_width = resized.width(),
            to_height = resized.height(),
            "Image resized for payload"
        );
        &resized
    } else {
        &image.pixels
    };

    // JPEG cannot carry alpha; GIF frames are encoded from RGBA.
    let converted;
    let source = match format {
        ImageFormatKind::Jpeg if source.color() != ColorType::Rgb8 => {
            converted = DynamicImage::ImageRgb8(source.to_rgb8());
            &converted
        }
        ImageFormatKind::Gif if source.color() != ColorType::Rgba8 => {
            converted = DynamicImage::ImageRgba8(source.to_rgba8());
            &converted
        }
        _ => source,
    };

    let mut cursor = Cursor::new(Vec::new());
    source.write_to(&mut cursor, format.to_image_format())?;

    Ok(ImagePayload {
        bytes: cursor.into_inner(),
        format,
        width: source.width(),
        height: source.height(),
    })
}
