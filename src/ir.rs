use crate::error::ElementGeometryError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in the background's logical pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Line,
    Arrow,
    Circle,
    Player,
}

impl ElementKind {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "line" => Some(Self::Line),
            "arrow" => Some(Self::Arrow),
            "circle" => Some(Self::Circle),
            "player" => Some(Self::Player),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Arrow => "arrow",
            Self::Circle => "circle",
            Self::Player => "player",
        }
    }

    /// Fewest points an element of this kind needs to be drawn.
    pub fn min_points(self) -> usize {
        match self {
            Self::Line | Self::Arrow | Self::Circle => 2,
            Self::Player => 1,
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One drawable unit of a diagram.
///
/// Fields are private so that every element in a [`Diagram`] satisfies the
/// minimum point count of its kind; build one with [`DrawingElement::new`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawingElement {
    #[serde(rename = "type")]
    kind: ElementKind,
    points: Vec<Point>,
    color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,
}

/// Geometry of an element as the renderer consumes it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape<'a> {
    Line { points: &'a [Point] },
    Arrow { start: Point, end: Point },
    Circle { center: Point, radius: f64 },
    Player { center: Point, label: Option<&'a str> },
}

impl DrawingElement {
    pub fn new(
        kind: ElementKind,
        points: Vec<Point>,
        color: impl Into<String>,
        label: Option<String>,
    ) -> Result<Self, ElementGeometryError> {
        let required = kind.min_points();
        if points.len() < required {
            return Err(ElementGeometryError::TooFewPoints {
                kind,
                required,
                found: points.len(),
            });
        }
        if let Some(point) = points.iter().position(|p| !p.is_finite()) {
            return Err(ElementGeometryError::NonFiniteCoordinate { kind, point });
        }
        Ok(Self {
            kind,
            points,
            color: color.into(),
            label,
        })
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn shape(&self) -> Shape<'_> {
        // Construction guarantees at least `min_points` entries.
        let first = self.points[0];
        let last = self.points[self.points.len() - 1];
        match self.kind {
            ElementKind::Line => Shape::Line {
                points: &self.points,
            },
            ElementKind::Arrow => Shape::Arrow {
                start: first,
                end: last,
            },
            ElementKind::Circle => Shape::Circle {
                center: first,
                radius: first.distance(last),
            },
            ElementKind::Player => Shape::Player {
                center: first,
                label: self.label.as_deref().filter(|label| !label.is_empty()),
            },
        }
    }
}

/// Ordered element list. Later elements paint over earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Diagram {
    pub elements: Vec<DrawingElement>,
}

impl Diagram {
    pub fn new(elements: Vec<DrawingElement>) -> Self {
        Self { elements }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DrawingElement> {
        self.elements.iter()
    }
}

impl<'a> IntoIterator for &'a Diagram {
    type Item = &'a DrawingElement;
    type IntoIter = std::slice::Iter<'a, DrawingElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}
