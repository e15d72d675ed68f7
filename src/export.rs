//! Document export: compose a rendered guide snapshot into a single-page
//! PDF.
//!
//! ## The "print the screen" model
//!
//! The exporter consumes the *rendered view*, not the guide data structure:
//! the host UI captures its guide view as a raster image (typically at a 2×
//! oversampling factor for print fidelity) and hands the pixels over as PNG
//! or JPEG bytes — or as the `data:` URL an embedded webview produces. The
//! raster is embedded into a PDF whose single page is sized exactly to the
//! image's dimensions divided by the oversampling factor; there is no
//! pagination and no text layer. Visual fidelity over re-editable output.
//!
//! The output filename is derived from the guide title by stripping every
//! character outside the ASCII alphanumeric set and appending `_Guide.pdf`,
//! guaranteeing a filesystem-safe name.

use crate::error::GuideError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::DynamicImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A decoded raster snapshot of the rendered guide view.
pub struct Snapshot {
    image: DynamicImage,
}

impl Snapshot {
    /// Wrap an already-decoded image.
    pub fn from_image(image: DynamicImage) -> Result<Self, GuideError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(GuideError::ExportFailed {
                detail: "snapshot has zero dimensions".into(),
            });
        }
        Ok(Snapshot { image })
    }

    /// Decode PNG or JPEG bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, GuideError> {
        let image = image::load_from_memory(bytes).map_err(|e| GuideError::ExportFailed {
            detail: format!("could not decode snapshot: {e}"),
        })?;
        Self::from_image(image)
    }

    /// Decode a `data:image/...;base64,...` URL as produced by a webview's
    /// canvas capture.
    pub fn from_data_url(data_url: &str) -> Result<Self, GuideError> {
        let payload = data_url
            .split_once("base64,")
            .map(|(_, rest)| rest)
            .ok_or_else(|| GuideError::ExportFailed {
                detail: "not a base64 data URL".into(),
            })?;
        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| GuideError::ExportFailed {
                detail: format!("invalid base64 payload: {e}"),
            })?;
        Self::from_bytes(&bytes)
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Options for PDF composition.
#[derive(Debug, Clone, Copy)]
pub struct ExportOptions {
    /// Factor at which the view was captured. The PDF page is sized to the
    /// raster dimensions divided by this, so the document keeps the view's
    /// logical size while carrying the high-resolution pixels. Default: 2.
    pub oversample: u32,
    /// JPEG re-encode quality, 1–100. Default: 90.
    pub jpeg_quality: u8,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            oversample: 2,
            jpeg_quality: 90,
        }
    }
}

/// A composed document ready to hand to the user.
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Strip every character outside the ASCII alphanumeric set.
pub fn sanitize_title(title: &str) -> String {
    title.chars().filter(char::is_ascii_alphanumeric).collect()
}

/// Derive the filesystem-safe output filename for a guide title.
pub fn export_filename(title: &str) -> String {
    format!("{}_Guide.pdf", sanitize_title(title))
}

/// Compose the snapshot into a single-page PDF. CPU-bound and synchronous;
/// use [`export_document_async`] from async contexts.
pub fn export_document(
    snapshot: &Snapshot,
    guide_title: &str,
    options: &ExportOptions,
) -> Result<ExportedDocument, GuideError> {
    let rgb = snapshot.image.to_rgb8();
    let (px_w, px_h) = rgb.dimensions();

    let mut jpeg = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, options.jpeg_quality.clamp(1, 100))
        .encode_image(&rgb)
        .map_err(|e| GuideError::ExportFailed {
            detail: format!("JPEG encoding failed: {e}"),
        })?;

    let oversample = options.oversample.max(1) as f32;
    let page_w = px_w as f32 / oversample;
    let page_h = px_h as f32 / oversample;

    let bytes = compose_pdf(&jpeg, px_w, px_h, page_w, page_h)?;
    debug!(
        px_w,
        px_h,
        pdf_bytes = bytes.len(),
        "snapshot composed into PDF"
    );

    Ok(ExportedDocument {
        filename: export_filename(guide_title),
        bytes,
    })
}

/// Async wrapper around [`export_document`] running on the blocking pool.
pub async fn export_document_async(
    snapshot: Snapshot,
    guide_title: String,
    options: ExportOptions,
) -> Result<ExportedDocument, GuideError> {
    tokio::task::spawn_blocking(move || export_document(&snapshot, &guide_title, &options))
        .await
        .map_err(|e| GuideError::Internal(format!("export task panicked: {e}")))?
}

/// Export and write the document into `dir`, returning the final path.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn export_to_file(
    snapshot: Snapshot,
    guide_title: &str,
    dir: &Path,
    options: ExportOptions,
) -> Result<PathBuf, GuideError> {
    let document = export_document_async(snapshot, guide_title.to_string(), options).await?;
    let path = dir.join(&document.filename);

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| GuideError::OutputWrite {
            path: path.clone(),
            source: e,
        })?;

    let tmp_path = path.with_extension("pdf.tmp");
    tokio::fs::write(&tmp_path, &document.bytes)
        .await
        .map_err(|e| GuideError::OutputWrite {
            path: path.clone(),
            source: e,
        })?;
    tokio::fs::rename(&tmp_path, &path)
        .await
        .map_err(|e| GuideError::OutputWrite {
            path: path.clone(),
            source: e,
        })?;

    Ok(path)
}

/// Build the one-page PDF: an image XObject (the JPEG passes through as a
/// DCTDecode stream, no re-compression) drawn to fill a page whose MediaBox
/// matches the target dimensions exactly.
fn compose_pdf(
    jpeg: &[u8],
    px_w: u32,
    px_h: u32,
    page_w: f32,
    page_h: f32,
) -> Result<Vec<u8>, GuideError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => px_w as i64,
            "Height" => px_h as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        jpeg.to_vec(),
    ));

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Real(page_w),
                    Object::Real(0.0),
                    Object::Real(0.0),
                    Object::Real(page_h),
                    Object::Real(0.0),
                    Object::Real(0.0),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let encoded = content.encode().map_err(|e| GuideError::ExportFailed {
        detail: format!("content stream encoding failed: {e}"),
    })?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

    let resources_id = doc.add_object(dictionary! {
        "XObject" => dictionary! {
            "Im0" => Object::Reference(image_id),
        },
    });

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => Object::Reference(pages_id),
        "Contents" => Object::Reference(content_id),
        "Resources" => Object::Reference(resources_id),
        "MediaBox" => vec![
            Object::Real(0.0),
            Object::Real(0.0),
            Object::Real(page_w),
            Object::Real(page_h),
        ],
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).map_err(|e| GuideError::ExportFailed {
        detail: format!("PDF serialisation failed: {e}"),
    })?;
    Ok(bytes)
}
