//! PNG rasterization of resolved card documents.
//!
//! The batch layer only sees the [`Rasterizer`] trait; this module provides
//! the resvg-backed implementation (contain fit on a white background, the
//! same framing the previous pipeline produced).

use std::io::Cursor;

use resvg::tiny_skia;

use crate::error::{TeamcardError, TeamcardResult};

/// Opaque raster backend. Malformed markup fails with a render error, which
/// the batch layer downgrades to a per-record failure.
pub trait Rasterizer {
    fn render_png(&self, document: &str, width: u32, height: u32) -> TeamcardResult<Vec<u8>>;
}

/// resvg/usvg rasterizer with system fonts loaded (card text is Korean, the
/// template's font stack has to resolve through the host fontdb).
pub struct SvgRasterizer {
    options: usvg::Options<'static>,
    background: [u8; 4],
}

impl SvgRasterizer {
    pub fn new() -> Self {
        let mut options = usvg::Options::default();
        options.fontdb_mut().load_system_fonts();
        Self {
            options,
            background: [255, 255, 255, 255],
        }
    }
}

impl Default for SvgRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer for SvgRasterizer {
    fn render_png(&self, document: &str, width: u32, height: u32) -> TeamcardResult<Vec<u8>> {
        if width == 0 || height == 0 {
            return Err(TeamcardError::render("raster size must be nonzero"));
        }

        let tree = usvg::Tree::from_str(document, &self.options)
            .map_err(|e| TeamcardError::render(format!("parse svg: {e}")))?;

        let mut pixmap = tiny_skia::Pixmap::new(width, height)
            .ok_or_else(|| TeamcardError::render("allocate pixmap"))?;
        let [r, g, b, a] = self.background;
        pixmap.fill(tiny_skia::Color::from_rgba8(r, g, b, a));

        let size = tree.size();
        let scale = (width as f32 / size.width()).min(height as f32 / size.height());
        let tx = (width as f32 - size.width() * scale) / 2.0;
        let ty = (height as f32 - size.height() * scale) / 2.0;
        let transform = tiny_skia::Transform::from_scale(scale, scale).post_translate(tx, ty);

        resvg::render(&tree, transform, &mut pixmap.as_mut());

        let mut rgba = pixmap.data().to_vec();
        demultiply_rgba8_in_place(&mut rgba);

        let mut out = Cursor::new(Vec::new());
        image::write_buffer_with_format(
            &mut out,
            &rgba,
            width,
            height,
            image::ExtendedColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .map_err(|e| TeamcardError::render(format!("encode png: {e}")))?;
        Ok(out.into_inner())
    }
}

fn demultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 || a == 255 {
            continue;
        }
        px[0] = ((px[0] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[1] = ((px[1] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[2] = ((px[2] as u16 * 255 + a / 2) / a).min(255) as u8;
    }
}
