//! Export of a reconciled batch: a ZIP of every artifact, or a PDF with one
//! 1080x1920 portrait page per image.
//!
//! ZIP entries keep the original slot number, so a carousel with a failed
//! second card exports `card-1.png` and `card-3.png`.

use std::io::{Cursor, Write};

use printpdf::image_crate::{self, DynamicImage, GenericImageView};
use printpdf::{Image, ImageTransform, Mm, PdfDocument};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::artifact::Artifact;
use crate::error::{StudioError, StudioResult};
use crate::supervisor::Lane;

pub const CAROUSEL_ENTRY_PREFIX: &str = "card";
pub const VIDEO_ENTRY_PREFIX: &str = "video";
pub const POST_ENTRY_PREFIX: &str = "suggestion";

/// Entry prefix and download file name for a lane's archive.
pub fn archive_naming(lane: Lane) -> (&'static str, &'static str) {
    match lane {
        Lane::Carousel => (CAROUSEL_ENTRY_PREFIX, "carousel.zip"),
        Lane::Videos => (VIDEO_ENTRY_PREFIX, "videos.zip"),
        Lane::SinglePost => (POST_ENTRY_PREFIX, "post-images.zip"),
    }
}

/// Download file name for the carousel PDF.
pub const CAROUSEL_PDF_NAME: &str = "carousel.pdf";

/// PDF page size in pixels at [`PAGE_DPI`], matching the card format.
pub const PAGE_WIDTH_PX: f32 = 1080.0;
pub const PAGE_HEIGHT_PX: f32 = 1920.0;
const PAGE_DPI: f32 = 96.0;

fn px_to_mm(px: f32) -> Mm {
    Mm(px / PAGE_DPI * 25.4)
}

/// `{prefix}-{slot}.{ext}`, slot numbered from 1.
pub fn entry_name(prefix: &str, index: usize, artifact: &Artifact) -> String {
    format!("{}-{}.{}", prefix, index + 1, artifact.extension())
}

/// Pack every produced artifact; `None` slots are skipped.
pub fn export_zip(outputs: &[Option<Artifact>], prefix: &str) -> StudioResult<Vec<u8>> {
    if outputs.iter().all(Option::is_none) {
        return Err(StudioError::Precondition(
            "Nothing to export: no artifact was generated".to_string(),
        ));
    }

    let mut buf = Cursor::new(Vec::new());
    {
        let mut zip = ZipWriter::new(&mut buf);
        // Images and mp4 are already compressed.
        let options = FileOptions::default().compression_method(CompressionMethod::Stored);
        for (index, artifact) in outputs.iter().enumerate() {
            let Some(artifact) = artifact else { continue };
            zip.start_file(entry_name(prefix, index, artifact), options)?;
            zip.write_all(artifact.bytes())?;
        }
        zip.finish()?;
    }
    let bytes = buf.into_inner();
    tracing::info!(bytes = bytes.len(), "📦 ZIP export ready");
    Ok(bytes)
}

/// One page per produced image, stretched to fill the page. `None` slots and
/// non-image artifacts are skipped.
pub fn export_pdf(outputs: &[Option<Artifact>]) -> StudioResult<Vec<u8>> {
    let images: Vec<&Artifact> = outputs
        .iter()
        .flatten()
        .filter(|a| matches!(a, Artifact::Image { .. }))
        .collect();
    if images.is_empty() {
        return Err(StudioError::Precondition(
            "Nothing to export: no image was generated".to_string(),
        ));
    }

    let (width, height) = (px_to_mm(PAGE_WIDTH_PX), px_to_mm(PAGE_HEIGHT_PX));
    let (doc, first_page, first_layer) = PdfDocument::new("Carousel", width, height, "Card 1");
    let mut pages = vec![(first_page, first_layer)];
    for n in 2..=images.len() {
        pages.push(doc.add_page(width, height, format!("Card {}", n)));
    }

    for (n, ((page, layer), artifact)) in pages.into_iter().zip(images).enumerate() {
        let decoded = image_crate::load_from_memory(artifact.bytes())
            .map_err(|e| StudioError::Export(format!("card {}: {}", n + 1, e)))?;
        let (w, h) = decoded.dimensions();
        // PDF images carry no alpha here.
        let rgb = DynamicImage::ImageRgb8(decoded.to_rgb8());
        Image::from_dynamic_image(&rgb).add_to_layer(
            doc.get_page(page).get_layer(layer),
            ImageTransform {
                dpi: Some(PAGE_DPI),
                scale_x: Some(PAGE_WIDTH_PX / w as f32),
                scale_y: Some(PAGE_HEIGHT_PX / h as f32),
                ..Default::default()
            },
        );
    }

    let bytes = doc
        .save_to_bytes()
        .map_err(|e| StudioError::Export(e.to_string()))?;
    tracing::info!(bytes = bytes.len(), "📄 PDF export ready");
    Ok(bytes)
}
