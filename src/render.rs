use crate::background::RasterImage;
use crate::config::StyleConfig;
use crate::error::DecodeError;
use crate::ir::{Diagram, DrawingElement, Point, Shape};
use crate::parser::{SkippedElement, decode};
use crate::surface::Surface;
use std::f64::consts::TAU;

/// What a render pass ended up putting on the surface.
#[derive(Debug)]
pub enum RenderOutcome {
    /// Background plus every drawable element.
    Complete {
        drawn: usize,
        skipped: Vec<SkippedElement>,
    },
    /// The diagram could not be decoded; only the background was painted.
    BackgroundOnly { error: DecodeError },
    /// The background never became ready; the surface was left blank.
    /// `decoded` carries the decode result for diagnostics only.
    BackgroundUnavailable {
        error: crate::error::BackgroundLoadError,
        decoded: Result<usize, DecodeError>,
    },
    /// A newer render started before this one's background was ready; the
    /// surface was not touched.
    Superseded,
}

impl RenderOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete { .. })
    }
}

/// Paint `background` and then every element of `diagram`, in order.
///
/// The background is stretched over the whole surface. Later elements paint
/// over earlier ones.
pub fn render<S: Surface + ?Sized>(
    surface: &mut S,
    background: &RasterImage,
    diagram: &Diagram,
    style: &StyleConfig,
) {
    paint_background(surface, background);
    for element in diagram {
        draw_element(surface, element, style);
    }
    tracing::debug!(elements = diagram.len(), "rendered diagram");
}

/// Decode `serialized` and render it. A diagram that fails to decode leaves
/// the background on its own.
pub fn render_serialized<S: Surface + ?Sized>(
    surface: &mut S,
    background: &RasterImage,
    serialized: &str,
    style: &StyleConfig,
) -> RenderOutcome {
    match decode(serialized) {
        Ok(decoded) => {
            render(surface, background, &decoded.diagram, style);
            RenderOutcome::Complete {
                drawn: decoded.diagram.len(),
                skipped: decoded.skipped,
            }
        }
        Err(error) => {
            tracing::warn!(%error, "diagram dropped, showing background only");
            paint_background(surface, background);
            RenderOutcome::BackgroundOnly { error }
        }
    }
}

/// End points of the two arrowhead barbs for a shaft from `start` to `end`.
///
/// Each barb runs `length` back from `end`, rotated by `angle` to either side
/// of the reversed shaft direction.
pub fn arrowhead(start: Point, end: Point, length: f64, angle: f64) -> [Point; 2] {
    let theta = (end.y - start.y).atan2(end.x - start.x);
    let barb = |offset: f64| {
        Point::new(
            end.x - length * (theta + offset).cos(),
            end.y - length * (theta + offset).sin(),
        )
    };
    [barb(-angle), barb(angle)]
}

fn paint_background<S: Surface + ?Sized>(surface: &mut S, background: &RasterImage) {
    surface.clear();
    let (width, height) = (surface.width(), surface.height());
    surface.draw_image(background, 0.0, 0.0, width, height);
}

fn draw_element<S: Surface + ?Sized>(surface: &mut S, element: &DrawingElement, style: &StyleConfig) {
    surface.set_stroke_style(element.color());
    surface.set_fill_style(element.color());
    surface.set_line_width(style.stroke_width);

    match element.shape() {
        Shape::Line { points } => draw_line(surface, points),
        Shape::Arrow { start, end } => draw_arrow(surface, start, end, style),
        Shape::Circle { center, radius } => draw_circle(surface, center, radius),
        Shape::Player { center, label } => draw_player(surface, center, label, style),
    }
}

fn draw_line<S: Surface + ?Sized>(surface: &mut S, points: &[Point]) {
    let Some((first, rest)) = points.split_first() else {
        return;
    };
    surface.begin_path();
    surface.move_to(first.x, first.y);
    for point in rest {
        surface.line_to(point.x, point.y);
    }
    surface.stroke();
}

fn draw_arrow<S: Surface + ?Sized>(surface: &mut S, start: Point, end: Point, style: &StyleConfig) {
    surface.begin_path();
    surface.move_to(start.x, start.y);
    surface.line_to(end.x, end.y);
    surface.stroke();

    // Two open barbs, not a filled head.
    for barb in arrowhead(start, end, style.arrow_head_length, style.arrow_head_angle) {
        surface.begin_path();
        surface.move_to(end.x, end.y);
        surface.line_to(barb.x, barb.y);
        surface.stroke();
    }
}

fn draw_circle<S: Surface + ?Sized>(surface: &mut S, center: Point, radius: f64) {
    surface.begin_path();
    surface.arc(center.x, center.y, radius, 0.0, TAU);
    surface.stroke();
}

fn draw_player<S: Surface + ?Sized>(
    surface: &mut S,
    center: Point,
    label: Option<&str>,
    style: &StyleConfig,
) {
    surface.begin_path();
    surface.arc(center.x, center.y, style.marker_radius, 0.0, TAU);
    surface.fill();

    if let Some(label) = label {
        surface.set_fill_style(&style.label_color);
        surface.set_font(&style.label_font);
        surface.fill_text(label, center.x, center.y);
    }
}
