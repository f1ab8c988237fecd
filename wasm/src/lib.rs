use tactics_diagram::config::{Config, parse_config};
use tactics_diagram::{RasterImage, SvgSurface, decode, render_svg};
use wasm_bindgen::prelude::*;

fn build_config(options_json: Option<String>) -> Result<Config, JsValue> {
    match options_json {
        Some(raw) if !raw.trim().is_empty() => {
            parse_config(&raw).map_err(|error| JsValue::from_str(&error.to_string()))
        }
        _ => Ok(Config::default()),
    }
}

/// Render `diagram` over the PNG/JPEG `background` and return the SVG.
///
/// An undecodable diagram yields the background alone; an unreadable
/// background yields a blank document of the configured size.
#[wasm_bindgen]
pub fn render_diagram_svg(
    diagram: &str,
    background: &[u8],
    options_json: Option<String>,
) -> Result<String, JsValue> {
    let config = build_config(options_json)?;
    match RasterImage::from_bytes(background.to_vec()) {
        Ok(background) => Ok(render_svg(diagram, &background, &config).0),
        Err(_) => Ok(SvgSurface::new(config.render.width, config.render.height).to_svg()),
    }
}

/// Summarise how a diagram decodes, as JSON: drawable element count and one
/// message per skipped element.
#[wasm_bindgen]
pub fn check_diagram(diagram: &str) -> String {
    let report = match decode(diagram) {
        Ok(decoded) => serde_json::json!({
            "ok": true,
            "elements": decoded.diagram.len(),
            "skipped": decoded
                .skipped
                .iter()
                .map(|skip| format!("element {}: {}", skip.index, skip.reason))
                .collect::<Vec<_>>(),
        }),
        Err(error) => serde_json::json!({ "ok": false, "error": error.to_string() }),
    };
    report.to_string()
}
