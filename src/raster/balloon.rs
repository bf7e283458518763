use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::Context as _;
use rayon::prelude::*;

use crate::document::model::{LayerBounds, LayerNode};
use crate::foundation::error::ToonletterResult;
use crate::overlay::engine::OverlayBox;
use crate::raster::pool::SurfacePool;

/// Balloon text size in document pixels.
const FONT_SIZE: f64 = 30.0;
/// Line advance between wrapped lines.
const LINE_HEIGHT: f64 = 30.0;
/// Baseline of the first text line.
const FIRST_BASELINE: f64 = 50.0;
/// Border stroke width around the balloon.
const BORDER_WIDTH: f64 = 5.0;
/// Horizontal slack added to the balloon surface so border and trailing
/// glyphs are not clipped.
const WIDTH_SLACK: f64 = 15.0;
/// Approximate glyph advance as a fraction of the font size, used for the
/// greedy wrap. Matches a sans-serif average closely enough for balloon text.
const GLYPH_ADVANCE_EM: f64 = 0.55;

/// One balloon rendered to pixels, positioned in document space.
#[derive(Clone, Debug, PartialEq)]
pub struct RasterizedBalloon {
    /// Layer name (the balloon text).
    pub name: String,
    /// Left edge in document pixels.
    pub left: f64,
    /// Top edge in document pixels.
    pub top: f64,
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8 pixels.
    pub rgba8: Vec<u8>,
}

impl RasterizedBalloon {
    /// Convert into a raster layer node for the export group.
    pub fn into_layer(self) -> ToonletterResult<LayerNode> {
        let bounds = LayerBounds {
            left: self.left.round() as i32,
            top: self.top.round() as i32,
            width: self.width,
            height: self.height,
        };
        LayerNode::raster(self.name, bounds, self.rgba8)
    }
}

/// Renders balloons: white fill, black border, wrapped text.
///
/// Each balloon is synthesized as a small SVG and rasterized through
/// usvg/resvg against the system font database. Surfaces come from a bounded
/// pool; many balloons may rasterize in parallel but each surface is held by
/// one balloon at a time.
pub struct BalloonRaster {
    fontdb: Arc<usvg::fontdb::Database>,
    pool: SurfacePool,
}

impl Default for BalloonRaster {
    fn default() -> Self {
        Self::new()
    }
}

impl BalloonRaster {
    /// Construct a rasterizer backed by the system font database.
    pub fn new() -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        Self {
            fontdb: Arc::new(db),
            pool: SurfacePool::new(8),
        }
    }

    /// Rasterize every balloon to document-space pixels.
    ///
    /// `scale` maps viewport geometry into document space (document width /
    /// viewport width at export time). Boxes are independent, so they render
    /// in parallel.
    #[tracing::instrument(skip(self, boxes), fields(count = boxes.len()))]
    pub fn rasterize_all(
        &self,
        boxes: &[OverlayBox],
        scale: f64,
    ) -> ToonletterResult<Vec<RasterizedBalloon>> {
        boxes
            .par_iter()
            .map(|b| self.rasterize(b, scale))
            .collect()
    }

    /// Rasterize one balloon to document-space pixels.
    pub fn rasterize(&self, balloon: &OverlayBox, scale: f64) -> ToonletterResult<RasterizedBalloon> {
        let width = (balloon.width * scale + WIDTH_SLACK).round().max(1.0) as u32;
        let height = (balloon.height * scale).round().max(1.0) as u32;

        let svg = balloon_svg(&balloon.text, width, height);
        let opts = usvg::Options {
            fontdb: Arc::clone(&self.fontdb),
            ..Default::default()
        };
        let tree = usvg::Tree::from_data(svg.as_bytes(), &opts).context("parse balloon svg")?;

        let mut surface = self.pool.acquire(width, height)?;
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::identity(),
            &mut surface.as_mut(),
        );
        let rgba8 = surface.data().to_vec();

        Ok(RasterizedBalloon {
            name: balloon.text.clone(),
            left: balloon.left * scale,
            top: balloon.top * scale,
            width,
            height,
            rgba8,
        })
    }
}

/// Synthesize the balloon SVG: full-surface white rect with a black border,
/// then the wrapped text lines.
fn balloon_svg(text: &str, width: u32, height: u32) -> String {
    let mut svg = String::with_capacity(256 + text.len() * 2);
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" \
         viewBox=\"0 0 {width} {height}\">\
         <rect x=\"0\" y=\"0\" width=\"{width}\" height=\"{height}\" \
         fill=\"white\" stroke=\"black\" stroke-width=\"{BORDER_WIDTH}\"/>"
    );

    if !text.trim().is_empty() {
        let _ = write!(
            svg,
            "<text font-family=\"sans-serif\" font-size=\"{FONT_SIZE}\" fill=\"black\">"
        );
        let lines = wrap_words(text, f64::from(width));
        let mut y = FIRST_BASELINE;
        let last = lines.len().saturating_sub(1);
        for (idx, line) in lines.iter().enumerate() {
            // Wrapped lines start at x=10; the final line keeps the wider
            // inset the original renderer used.
            let x = if idx == last { 20.0 } else { 10.0 };
            let _ = write!(
                svg,
                "<tspan x=\"{x}\" y=\"{y}\">{}</tspan>",
                escape_xml(line)
            );
            y += LINE_HEIGHT;
        }
        svg.push_str("</text>");
    }

    svg.push_str("</svg>");
    svg
}

/// Greedy word wrap against the surface width.
///
/// Mirrors the canvas-measure loop of the original renderer, with glyph
/// advances approximated from the font size instead of measured.
fn wrap_words(text: &str, surface_width: f64) -> Vec<String> {
    let advance = FONT_SIZE * GLYPH_ADVANCE_EM;
    let mut lines = Vec::new();
    let mut line = String::new();

    for (n, word) in text.split(' ').enumerate() {
        let test_line = format!("{line}{word} ");
        let test_width = test_line.chars().count() as f64 * advance;
        if test_width > surface_width && n > 0 {
            lines.push(line.trim_end().to_string());
            line = format!("{word} ");
        } else {
            line = test_line;
        }
    }
    lines.push(line.trim_end().to_string());
    lines
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/raster/balloon.rs"]
mod tests;
