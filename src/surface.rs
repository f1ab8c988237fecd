//! Drawing surfaces.
//!
//! [`Surface`] mirrors the subset of a 2D canvas context the renderer needs:
//! a current path, stroke/fill styles, a line width and a font. Every call is
//! infallible, so a render can never stop halfway through an element.
//!
//! [`SvgSurface`] records the calls as an SVG document of fixed logical size.
//! With the `png` feature it can be rasterized through resvg.

use crate::background::RasterImage;
use crate::config::Font;
use std::f64::consts::{PI, TAU};
use std::fmt::Write as _;

pub trait Surface {
    /// Logical width in the diagram's coordinate space.
    fn width(&self) -> f64;
    fn height(&self) -> f64;
    /// Drop everything painted so far and reset the style state.
    fn clear(&mut self);
    /// Paint `image` stretched to the given rectangle.
    fn draw_image(&mut self, image: &RasterImage, x: f64, y: f64, width: f64, height: f64);
    fn set_stroke_style(&mut self, color: &str);
    fn set_fill_style(&mut self, color: &str);
    fn set_line_width(&mut self, width: f64);
    fn set_font(&mut self, font: &Font);
    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    /// Clockwise arc from `start` to `end` (radians, y pointing down).
    fn arc(&mut self, cx: f64, cy: f64, radius: f64, start: f64, end: f64);
    fn stroke(&mut self);
    fn fill(&mut self);
    /// Fill `text` with the current fill style and font, centred on `(x, y)`.
    fn fill_text(&mut self, text: &str, x: f64, y: f64);
}

#[derive(Debug, Clone)]
pub struct SvgSurface {
    width: f64,
    height: f64,
    body: String,
    path: String,
    stroke_style: String,
    fill_style: String,
    line_width: f64,
    font: Font,
}

impl SvgSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            body: String::new(),
            path: String::new(),
            stroke_style: crate::config::DEFAULT_COLOR.to_string(),
            fill_style: crate::config::DEFAULT_COLOR.to_string(),
            line_width: 1.0,
            font: Font::default(),
        }
    }

    /// True when nothing has been painted since creation or the last clear.
    pub fn is_blank(&self) -> bool {
        self.body.is_empty()
    }

    pub fn to_svg(&self) -> String {
        let mut svg = String::with_capacity(self.body.len() + 256);
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
            w = self.width,
            h = self.height,
        );
        svg.push_str(&self.body);
        svg.push_str("</svg>");
        svg
    }

    fn connect(&mut self, x: f64, y: f64) {
        let cmd = if self.path.is_empty() { 'M' } else { 'L' };
        self.push_path(format_args!("{cmd} {x:.2} {y:.2}"));
    }

    fn push_path(&mut self, segment: std::fmt::Arguments<'_>) {
        if !self.path.is_empty() {
            self.path.push(' ');
        }
        let _ = self.path.write_fmt(segment);
    }
}

impl Surface for SvgSurface {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn clear(&mut self) {
        *self = Self::new(self.width, self.height);
    }

    fn draw_image(&mut self, image: &RasterImage, x: f64, y: f64, width: f64, height: f64) {
        let href = image.data_uri();
        let _ = write!(
            self.body,
            "<image x=\"{x:.2}\" y=\"{y:.2}\" width=\"{width:.2}\" height=\"{height:.2}\" preserveAspectRatio=\"none\" href=\"{href}\" xlink:href=\"{href}\"/>",
        );
    }

    fn set_stroke_style(&mut self, color: &str) {
        self.stroke_style = color.to_string();
    }

    fn set_fill_style(&mut self, color: &str) {
        self.fill_style = color.to_string();
    }

    fn set_line_width(&mut self, width: f64) {
        self.line_width = width;
    }

    fn set_font(&mut self, font: &Font) {
        self.font = font.clone();
    }

    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.push_path(format_args!("M {x:.2} {y:.2}"));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.connect(x, y);
    }

    fn arc(&mut self, cx: f64, cy: f64, radius: f64, start: f64, end: f64) {
        let r = radius.abs();
        let sx = cx + r * start.cos();
        let sy = cy + r * start.sin();
        self.connect(sx, sy);

        let sweep = end - start;
        if sweep >= TAU - 1e-9 {
            // SVG cannot express a closed arc in one command; go via the
            // opposite point.
            let mx = cx + r * (start + PI).cos();
            let my = cy + r * (start + PI).sin();
            self.push_path(format_args!(
                "A {r:.2} {r:.2} 0 0 1 {mx:.2} {my:.2} A {r:.2} {r:.2} 0 0 1 {sx:.2} {sy:.2}"
            ));
        } else {
            let sweep = sweep.rem_euclid(TAU);
            let ex = cx + r * (start + sweep).cos();
            let ey = cy + r * (start + sweep).sin();
            let large = u8::from(sweep > PI);
            self.push_path(format_args!(
                "A {r:.2} {r:.2} 0 {large} 1 {ex:.2} {ey:.2}"
            ));
        }
    }

    fn stroke(&mut self) {
        if self.path.is_empty() {
            return;
        }
        let _ = write!(
            self.body,
            "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"/>",
            self.path,
            escape_xml(&self.stroke_style),
            self.line_width,
        );
    }

    fn fill(&mut self) {
        if self.path.is_empty() {
            return;
        }
        let _ = write!(
            self.body,
            "<path d=\"{}\" fill=\"{}\" stroke=\"none\"/>",
            self.path,
            escape_xml(&self.fill_style),
        );
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        let _ = write!(
            self.body,
            "<text x=\"{x:.2}\" y=\"{y:.2}\" text-anchor=\"middle\" dominant-baseline=\"central\" font-family=\"{}\" font-size=\"{}\" font-weight=\"{}\" fill=\"{}\">{}</text>",
            escape_xml(&self.font.family),
            self.font.size,
            escape_xml(&self.font.weight),
            escape_xml(&self.fill_style),
            escape_xml(text),
        );
    }
}

#[cfg(feature = "png")]
mod raster {
    use super::SvgSurface;
    use crate::error::SurfaceError;
    use once_cell::sync::Lazy;
    use resvg::tiny_skia::{Pixmap, Transform};
    use std::path::Path;
    use std::sync::Arc;
    use usvg::fontdb;

    static FONT_DB: Lazy<Arc<fontdb::Database>> = Lazy::new(|| {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        Arc::new(db)
    });

    impl SvgSurface {
        /// Render into a pixmap of `width * scale` by `height * scale`
        /// physical pixels.
        pub fn rasterize(&self, scale: f32) -> Result<Pixmap, SurfaceError> {
            let mut opt = usvg::Options::default();
            opt.fontdb = Arc::clone(&FONT_DB);

            let tree = usvg::Tree::from_str(&self.to_svg(), &opt)?;
            let width = (self.width * f64::from(scale)).ceil().max(1.0) as u32;
            let height = (self.height * f64::from(scale)).ceil().max(1.0) as u32;
            let mut pixmap =
                Pixmap::new(width, height).ok_or(SurfaceError::Allocation { width, height })?;

            let mut pixmap_mut = pixmap.as_mut();
            resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap_mut);
            Ok(pixmap)
        }

        pub fn encode_png(&self, scale: f32) -> Result<Vec<u8>, SurfaceError> {
            self.rasterize(scale)?
                .encode_png()
                .map_err(|err| SurfaceError::Png(err.to_string()))
        }

        pub fn write_png(&self, output: &Path, scale: f32) -> Result<(), SurfaceError> {
            self.rasterize(scale)?
                .save_png(output)
                .map_err(|err| SurfaceError::Png(err.to_string()))
        }
    }
}

/// Escapes markup and drops characters XML 1.0 cannot carry at all, so a
/// stray control character in a label or colour only spoils that string.
fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(ch),
            c if c < ' ' || matches!(c, '\u{FFFE}' | '\u{FFFF}') => {}
            c => out.push(c),
        }
    }
    out
}
