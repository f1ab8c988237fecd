use crate::config::DEFAULT_COLOR;
use crate::error::{DecodeError, ElementGeometryError};
use crate::ir::{Diagram, DrawingElement, ElementKind, Point};
use serde_json::{Map, Value};
use std::fmt;

/// Result of a best-effort decode: everything that could be drawn, plus a
/// record of every element that was dropped along the way.
#[derive(Debug, Default)]
pub struct Decoded {
    pub diagram: Diagram,
    pub skipped: Vec<SkippedElement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedElement {
    /// Position of the element in the serialized sequence.
    pub index: usize,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    UnknownKind(String),
    Geometry(ElementGeometryError),
    Malformed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownKind(kind) => write!(f, "unknown element type '{kind}'"),
            Self::Geometry(err) => write!(f, "{err}"),
            Self::Malformed(why) => write!(f, "malformed element: {why}"),
        }
    }
}

/// Decode a serialized diagram.
///
/// The input is a JSON array of element objects, or an object holding that
/// array under `elements`. Elements of unknown type, with too few points, or
/// with badly typed fields are skipped and reported in [`Decoded::skipped`].
/// Only a broken document or a point without numeric coordinates fails the
/// whole decode.
pub fn decode(serialized: &str) -> Result<Decoded, DecodeError> {
    let root: Value = serde_json::from_str(serialized).map_err(|err| {
        tracing::warn!(error = %err, "diagram is not valid JSON");
        DecodeError::from(err)
    })?;

    let items = match root {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("elements") {
            Some(Value::Array(items)) => items,
            Some(other) => return Err(not_a_sequence(&other)),
            None => return Err(not_a_sequence(&Value::Object(map))),
        },
        other => return Err(not_a_sequence(&other)),
    };

    let mut decoded = Decoded::default();
    for (index, item) in items.iter().enumerate() {
        match decode_element(index, item)? {
            Ok(element) => decoded.diagram.elements.push(element),
            Err(reason) => {
                tracing::debug!(index, %reason, "skipping diagram element");
                decoded.skipped.push(SkippedElement { index, reason });
            }
        }
    }
    tracing::debug!(
        elements = decoded.diagram.len(),
        skipped = decoded.skipped.len(),
        "decoded diagram"
    );
    Ok(decoded)
}

/// Serialize a diagram into the canonical JSON array form read by [`decode`].
pub fn encode(diagram: &Diagram) -> String {
    // Elements only hold finite coordinates, so serialization cannot fail.
    serde_json::to_string(diagram).unwrap_or_else(|_| "[]".to_string())
}

fn not_a_sequence(value: &Value) -> DecodeError {
    let found = json_type_name(value);
    tracing::warn!(found, "diagram is not a sequence of elements");
    DecodeError::NotASequence { found }
}

/// The outer `Result` aborts the whole diagram; the inner one skips this
/// element only.
fn decode_element(
    index: usize,
    item: &Value,
) -> Result<Result<DrawingElement, SkipReason>, DecodeError> {
    let Some(obj) = item.as_object() else {
        return Ok(Err(SkipReason::Malformed(format!(
            "expected an object, found {}",
            json_type_name(item)
        ))));
    };

    let kind = match obj.get("type").or_else(|| obj.get("kind")) {
        Some(Value::String(token)) => match ElementKind::from_token(token) {
            Some(kind) => kind,
            None => return Ok(Err(SkipReason::UnknownKind(token.clone()))),
        },
        Some(other) => {
            return Ok(Err(SkipReason::Malformed(format!(
                "type must be a string, found {}",
                json_type_name(other)
            ))));
        }
        None => return Ok(Err(SkipReason::Malformed("missing type".to_string()))),
    };

    let points = match obj.get("points") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(raw)) => {
            let mut points = Vec::with_capacity(raw.len());
            for (point_idx, raw_point) in raw.iter().enumerate() {
                let point = parse_point(raw_point).ok_or_else(|| {
                    tracing::warn!(
                        element = index,
                        point = point_idx,
                        "non-numeric coordinates in diagram"
                    );
                    DecodeError::InvalidCoordinate {
                        element: index,
                        point: point_idx,
                    }
                })?;
                points.push(point);
            }
            points
        }
        Some(other) => {
            return Ok(Err(SkipReason::Malformed(format!(
                "points must be an array, found {}",
                json_type_name(other)
            ))));
        }
    };

    let color = match string_field(obj, "color") {
        Ok(color) => color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
        Err(reason) => return Ok(Err(reason)),
    };
    let label = match string_field(obj, "label") {
        Ok(label) => label,
        Err(reason) => return Ok(Err(reason)),
    };

    Ok(DrawingElement::new(kind, points, color, label).map_err(SkipReason::Geometry))
}

/// Accepts `{"x": 1, "y": 2}` and the compact `[1, 2]`.
fn parse_point(value: &Value) -> Option<Point> {
    let (x, y) = match value {
        Value::Object(map) => (map.get("x")?, map.get("y")?),
        Value::Array(pair) if pair.len() == 2 => (&pair[0], &pair[1]),
        _ => return None,
    };
    let x = x.as_f64().filter(|v| v.is_finite())?;
    let y = y.as_f64().filter(|v| v.is_finite())?;
    Some(Point::new(x, y))
}

/// Strings pass through, numbers (jersey numbers as labels) are stringified,
/// null and absent mean `None`.
fn string_field(obj: &Map<String, Value>, key: &str) -> Result<Option<String>, SkipReason> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(Value::Number(value)) => Ok(Some(value.to_string())),
        Some(other) => Err(SkipReason::Malformed(format!(
            "{key} must be a string, found {}",
            json_type_name(other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
