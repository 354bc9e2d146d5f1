//! PDF extraction: plain text and embedded raster images via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async contexts.
//! `tokio::task::spawn_blocking` moves the work onto a dedicated thread pool
//! thread designed for blocking operations, keeping the Tokio workers free
//! while pdfium walks the document.
//!
//! ## Ordinal assignment
//!
//! Images are numbered 1, 2, 3… globally across the whole document: pages in
//! document order, image objects within a page in the order pdfium reports
//! them. The ordinal is the image's identity — it names the file on disk
//! (`image<N>.png`) and fixes the captioning order, so extraction must be
//! deterministic for a given input.

use crate::error::BiasScopeError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Raster file extensions the cleanup pass recognises as extracted images.
const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "tiff"];

/// One embedded image written to the working directory.
#[derive(Debug, Clone)]
pub struct SavedImage {
    /// 1-based position among all images in the document.
    pub ordinal: usize,
    /// Path of the persisted file, `image<ordinal>.png`.
    pub path: PathBuf,
}

/// Basic document facts for inspect mode; no LLM involved.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DocumentInfo {
    pub page_count: usize,
    pub image_count: usize,
    pub title: Option<String>,
    pub author: Option<String>,
}

/// Extract the article's plain text, preserving the reading order produced by
/// pdfium's text layout engine. Pages are joined with a blank line; no reflow
/// or cleanup is performed.
pub async fn extract_text(pdf_path: &Path) -> Result<String, BiasScopeError> {
    let path = pdf_path.to_path_buf();
    tokio::task::spawn_blocking(move || extract_text_blocking(&path))
        .await
        .map_err(|e| BiasScopeError::Internal(format!("Extraction task panicked: {}", e)))?
}

fn extract_text_blocking(pdf_path: &Path) -> Result<String, BiasScopeError> {
    let pdfium = Pdfium::default();
    let document = load_document(&pdfium, pdf_path)?;

    let pages = document.pages();
    info!("PDF loaded: {} pages", pages.len());

    let mut text = String::new();
    for (index, page) in pages.iter().enumerate() {
        let page_text = page
            .text()
            .map_err(|e| BiasScopeError::ExtractionFailed {
                page: index + 1,
                detail: format!("{:?}", e),
            })?
            .all();
        if !text.is_empty() {
            text.push_str("\n\n");
        }
        text.push_str(&page_text);
    }

    debug!("Extracted {} chars of article text", text.len());
    Ok(text)
}

/// Extract every embedded raster image and persist each as
/// `image<ordinal>.png` under `out_dir`, overwriting same-named files from a
/// previous run. Returns the saved images in ordinal order.
pub async fn extract_images(
    pdf_path: &Path,
    out_dir: &Path,
) -> Result<Vec<SavedImage>, BiasScopeError> {
    let path = pdf_path.to_path_buf();
    let dir = out_dir.to_path_buf();
    tokio::task::spawn_blocking(move || extract_images_blocking(&path, &dir))
        .await
        .map_err(|e| BiasScopeError::Internal(format!("Extraction task panicked: {}", e)))?
}

fn extract_images_blocking(
    pdf_path: &Path,
    out_dir: &Path,
) -> Result<Vec<SavedImage>, BiasScopeError> {
    let pdfium = Pdfium::default();
    let document = load_document(&pdfium, pdf_path)?;

    std::fs::create_dir_all(out_dir).map_err(|e| BiasScopeError::ArtifactWriteFailed {
        path: out_dir.to_path_buf(),
        source: e,
    })?;

    let mut saved = Vec::new();
    let mut ordinal = 1usize;

    for (index, page) in document.pages().iter().enumerate() {
        for object in page.objects().iter() {
            let Some(image_object) = object.as_image_object() else {
                continue;
            };
            let raw = image_object
                .get_raw_image()
                .map_err(|e| BiasScopeError::ExtractionFailed {
                    page: index + 1,
                    detail: format!("{:?}", e),
                })?;

            let path = out_dir.join(format!("image{}.png", ordinal));
            write_png(&raw, &path)?;
            debug!(
                "Saved embedded image {} from page {} → {}",
                ordinal,
                index + 1,
                path.display()
            );

            saved.push(SavedImage { ordinal, path });
            ordinal += 1;
        }
    }

    info!("Extracted {} embedded images", saved.len());
    Ok(saved)
}

fn write_png(image: &DynamicImage, path: &Path) -> Result<(), BiasScopeError> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| BiasScopeError::Internal(format!("PNG encoding failed: {}", e)))?;
    std::fs::write(path, &buf).map_err(|e| BiasScopeError::ArtifactWriteFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Remove `image*` raster files left over from a previous captioning run.
/// Returns how many files were removed.
pub fn clear_extracted_images(dir: &Path) -> Result<usize, BiasScopeError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        // Nothing extracted yet.
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => {
            return Err(BiasScopeError::ArtifactReadFailed {
                path: dir.to_path_buf(),
                source: e,
            })
        }
    };

    let mut removed = 0usize;
    for entry in entries.filter_map(|e| e.ok()) {
        let name = entry.file_name().to_string_lossy().to_lowercase();
        let is_image = name.starts_with("image")
            && IMAGE_EXTENSIONS.iter().any(|ext| {
                name.strip_suffix(ext)
                    .is_some_and(|stem| stem.ends_with('.'))
            });
        if is_image {
            std::fs::remove_file(entry.path()).map_err(|e| BiasScopeError::ArtifactWriteFailed {
                path: entry.path(),
                source: e,
            })?;
            removed += 1;
        }
    }

    debug!("Cleared {} previously extracted images", removed);
    Ok(removed)
}

/// Extract page count, image count, and basic metadata without any LLM call.
pub async fn document_info(pdf_path: &Path) -> Result<DocumentInfo, BiasScopeError> {
    let path = pdf_path.to_path_buf();
    tokio::task::spawn_blocking(move || document_info_blocking(&path))
        .await
        .map_err(|e| BiasScopeError::Internal(format!("Inspect task panicked: {}", e)))?
}

fn document_info_blocking(pdf_path: &Path) -> Result<DocumentInfo, BiasScopeError> {
    let pdfium = Pdfium::default();
    let document = load_document(&pdfium, pdf_path)?;

    let metadata = document.metadata();
    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata.get(tag).and_then(|t| {
            let v = t.value().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        })
    };

    let pages = document.pages();
    let mut image_count = 0usize;
    for page in pages.iter() {
        image_count += page
            .objects()
            .iter()
            .filter(|o| o.as_image_object().is_some())
            .count();
    }

    Ok(DocumentInfo {
        page_count: pages.len() as usize,
        image_count,
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
    })
}

fn load_document<'a>(
    pdfium: &'a Pdfium,
    pdf_path: &Path,
) -> Result<PdfDocument<'a>, BiasScopeError> {
    pdfium
        .load_pdf_from_file(pdf_path, None)
        .map_err(|e| BiasScopeError::CorruptPdf {
            path: pdf_path.to_path_buf(),
            detail: format!("{:?}", e),
        })
}
