use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::path::Path;

/// Logical width of the court background.
pub const DEFAULT_WIDTH: f64 = 800.0;
/// Logical height of the court background.
pub const DEFAULT_HEIGHT: f64 = 400.0;
/// Line width used for every shape kind.
pub const STROKE_WIDTH: f64 = 3.0;
/// Length of each arrowhead barb.
pub const ARROW_HEAD_LENGTH: f64 = 15.0;
/// Barb deviation from the reversed shaft direction (30°).
pub const ARROW_HEAD_ANGLE: f64 = PI / 6.0;
/// Radius of a player marker.
pub const MARKER_RADIUS: f64 = 15.0;
/// Colour for elements that do not declare one (the canvas default).
pub const DEFAULT_COLOR: &str = "#000000";
pub const LABEL_COLOR: &str = "#FFFFFF";
pub const LABEL_FONT_FAMILY: &str = "Arial, Helvetica, sans-serif";
pub const LABEL_FONT_SIZE: f64 = 14.0;
pub const LABEL_FONT_WEIGHT: &str = "bold";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub family: String,
    pub size: f64,
    pub weight: String,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            family: LABEL_FONT_FAMILY.to_string(),
            size: LABEL_FONT_SIZE,
            weight: LABEL_FONT_WEIGHT.to_string(),
        }
    }
}

/// Surface geometry. `width`/`height` are logical units; `scale` maps them to
/// physical pixels when rasterizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f64,
    pub height: f64,
    pub scale: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            scale: 1.0,
        }
    }
}

/// Fixed drawing constants shared by all draw routines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleConfig {
    pub stroke_width: f64,
    pub arrow_head_length: f64,
    /// Radians.
    pub arrow_head_angle: f64,
    pub marker_radius: f64,
    pub label_font: Font,
    pub label_color: String,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            stroke_width: STROKE_WIDTH,
            arrow_head_length: ARROW_HEAD_LENGTH,
            arrow_head_angle: ARROW_HEAD_ANGLE,
            marker_radius: MARKER_RADIUS,
            label_font: Font::default(),
            label_color: LABEL_COLOR.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub render: RenderConfig,
    pub style: StyleConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    width: Option<f64>,
    height: Option<f64>,
    scale: Option<f32>,
    stroke_width: Option<f64>,
    arrow_head_length: Option<f64>,
    /// Degrees, converted on load.
    arrow_head_angle: Option<f64>,
    marker_radius: Option<f64>,
    label_font_family: Option<String>,
    label_font_size: Option<f64>,
    label_font_weight: Option<String>,
    label_color: Option<String>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = serde_json::from_str(contents)?;
    let mut config = Config::default();

    if let Some(v) = parsed.width {
        config.render.width = positive("width", v)?;
    }
    if let Some(v) = parsed.height {
        config.render.height = positive("height", v)?;
    }
    if let Some(v) = parsed.scale {
        config.render.scale = positive("scale", f64::from(v))? as f32;
    }
    if let Some(v) = parsed.stroke_width {
        config.style.stroke_width = positive("strokeWidth", v)?;
    }
    if let Some(v) = parsed.arrow_head_length {
        config.style.arrow_head_length = positive("arrowHeadLength", v)?;
    }
    if let Some(v) = parsed.arrow_head_angle {
        config.style.arrow_head_angle = v.to_radians();
    }
    if let Some(v) = parsed.marker_radius {
        config.style.marker_radius = positive("markerRadius", v)?;
    }
    if let Some(v) = parsed.label_font_family {
        config.style.label_font.family = v;
    }
    if let Some(v) = parsed.label_font_size {
        config.style.label_font.size = positive("labelFontSize", v)?;
    }
    if let Some(v) = parsed.label_font_weight {
        config.style.label_font.weight = v;
    }
    if let Some(v) = parsed.label_color {
        config.style.label_color = v;
    }

    Ok(config)
}

/// Apply size overrides from outside the config file, checked like the file's
/// own values.
pub fn override_render(
    render: &mut RenderConfig,
    width: Option<f64>,
    height: Option<f64>,
    scale: Option<f32>,
) -> anyhow::Result<()> {
    if let Some(v) = width {
        render.width = positive("width", v)?;
    }
    if let Some(v) = height {
        render.height = positive("height", v)?;
    }
    if let Some(v) = scale {
        render.scale = positive("scale", f64::from(v))? as f32;
    }
    Ok(())
}

fn positive(name: &str, value: f64) -> anyhow::Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(anyhow::anyhow!("{name} must be a positive number, got {value}"))
    }
}
