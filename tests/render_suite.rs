use std::io::Cursor;
use std::path::Path;

use tactics_diagram::{
    Config, ElementKind, MemoryBackgroundLoader, RasterImage, RenderOutcome, Renderer, SkipReason,
    SvgSurface, decode, encode, render_svg,
};

const COURT_RGB: [u8; 3] = [214, 170, 110];

fn court_png(width: u32, height: u32) -> Vec<u8> {
    let [r, g, b] = COURT_RGB;
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([r, g, b, 255]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png)
        .expect("encode court");
    buf.into_inner()
}

fn court() -> RasterImage {
    // Deliberately not 800x400: the background is stretched to the surface.
    RasterImage::from_bytes(court_png(80, 40)).expect("court decodes")
}

fn fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(path).expect("fixture read failed")
}

fn rgb_at(svg_surface: &SvgSurface, x: u32, y: u32) -> [u8; 3] {
    let pixmap = svg_surface.rasterize(1.0).expect("rasterize");
    let px = pixmap.pixel(x, y).expect("pixel in bounds");
    assert_eq!(px.alpha(), 255, "pixel ({x}, {y}) not opaque");
    [px.red(), px.green(), px.blue()]
}

fn render_to_surface(serialized: &str) -> (SvgSurface, RenderOutcome) {
    let config = Config::default();
    let mut surface = SvgSurface::new(config.render.width, config.render.height);
    let outcome = tactics_diagram::render_serialized(&mut surface, &court(), serialized, &config.style);
    (surface, outcome)
}

#[test]
fn render_all_fixtures() {
    // Keep this list explicit so new fixtures must be added intentionally.
    let candidates = [
        ("serve_receive.json", true),
        ("mixed_invalid.json", true),
        ("compact_points.json", true),
        ("truncated.json", false),
    ];

    for (name, decodes) in candidates {
        let input = fixture(name);
        let (svg, outcome) = render_svg(&input, &court(), &Config::default());
        assert!(svg.starts_with("<svg"), "{name}: missing <svg tag");
        assert!(svg.ends_with("</svg>"), "{name}: missing </svg tag");
        assert!(svg.contains("<image"), "{name}: background missing");
        assert_eq!(outcome.is_complete(), decodes, "{name}: unexpected outcome {outcome:?}");
    }
}

#[test]
fn fixture_with_invalid_elements_keeps_valid_ones() {
    let decoded = decode(&fixture("mixed_invalid.json")).expect("decodes");
    let kinds: Vec<_> = decoded.diagram.iter().map(|el| el.kind()).collect();
    assert_eq!(kinds, vec![ElementKind::Player, ElementKind::Circle]);
    assert_eq!(decoded.diagram.elements[0].label(), Some("12"));

    let reasons: Vec<_> = decoded.skipped.iter().map(|s| (s.index, &s.reason)).collect();
    assert_eq!(reasons.len(), 3);
    assert!(matches!(reasons[0], (0, SkipReason::Geometry(_))));
    assert!(matches!(reasons[1], (1, SkipReason::UnknownKind(kind)) if kind == "zone"));
    assert!(matches!(reasons[2], (2, SkipReason::Malformed(_))));
}

#[test]
fn fixture_survives_encode_decode() {
    let decoded = decode(&fixture("serve_receive.json")).expect("decodes");
    assert_eq!(decoded.diagram.len(), 7);
    let again = decode(&encode(&decoded.diagram)).expect("re-decodes");
    assert_eq!(again.diagram, decoded.diagram);
}

#[test]
fn later_elements_paint_over_earlier_ones() {
    let (surface, outcome) = render_to_surface(
        r##"[
            {"type": "player", "points": [[100, 100]], "color": "#ff0000"},
            {"type": "player", "points": [[100, 100]], "color": "#0000ff"}
        ]"##,
    );
    assert!(outcome.is_complete());
    assert_eq!(rgb_at(&surface, 100, 100), [0, 0, 255]);

    let (surface, _) = render_to_surface(
        r##"[
            {"type": "player", "points": [[100, 100]], "color": "#0000ff"},
            {"type": "player", "points": [[100, 100]], "color": "#ff0000"}
        ]"##,
    );
    assert_eq!(rgb_at(&surface, 100, 100), [255, 0, 0]);
}

#[test]
fn background_is_stretched_over_the_surface() {
    let (surface, _) = render_to_surface("[]");
    assert_eq!(rgb_at(&surface, 10, 10), COURT_RGB);
    assert_eq!(rgb_at(&surface, 790, 390), COURT_RGB);
    assert_eq!(rgb_at(&surface, 400, 200), COURT_RGB);
}

#[test]
fn circle_is_stroked_not_filled() {
    let (surface, _) = render_to_surface(
        r##"[{"type": "circle", "points": [[200, 200], [200, 250]], "color": "#00ff00"}]"##,
    );
    assert_eq!(rgb_at(&surface, 250, 200), [0, 255, 0]);
    assert_eq!(rgb_at(&surface, 200, 150), [0, 255, 0]);
    assert_eq!(rgb_at(&surface, 200, 200), COURT_RGB);
}

#[test]
fn unparsable_diagram_shows_only_background() {
    let (surface, outcome) = render_to_surface(&fixture("truncated.json"));
    assert!(matches!(outcome, RenderOutcome::BackgroundOnly { .. }));
    assert_eq!(rgb_at(&surface, 20, 20), COURT_RGB);
    assert!(!surface.to_svg().contains("<path"));
}

#[test]
fn invalid_color_does_not_break_the_render() {
    let (surface, outcome) = render_to_surface(
        r##"[
            {"type": "player", "points": [[100, 100]], "color": "not-a-colour"},
            {"type": "player", "points": [[300, 100]], "color": "#0000ff"}
        ]"##,
    );
    assert!(outcome.is_complete());
    assert_eq!(rgb_at(&surface, 300, 100), [0, 0, 255]);
}

#[test]
fn control_characters_spoil_only_their_own_element() {
    let (surface, outcome) = render_to_surface(
        r##"[
            {"type": "player", "points": [[100, 100]], "color": "#0000ff", "label": "A\u0001"},
            {"type": "player", "points": [[300, 100]], "color": "#0000ff"},
            {"type": "player", "points": [[500, 300]], "color": "#ff0000\u0000"}
        ]"##,
    );
    assert!(outcome.is_complete());
    assert_eq!(rgb_at(&surface, 20, 20), COURT_RGB);
    assert_eq!(rgb_at(&surface, 300, 100), [0, 0, 255]);
    assert_eq!(rgb_at(&surface, 500, 300), [255, 0, 0]);
    assert!(surface.encode_png(1.0).is_ok());
}

#[test]
fn scale_multiplies_physical_size() {
    let (surface, _) = render_to_surface(&fixture("serve_receive.json"));
    let pixmap = surface.rasterize(2.0).expect("rasterize");
    assert_eq!((pixmap.width(), pixmap.height()), (1600, 800));
    let png = surface.encode_png(0.5).expect("encode");
    assert!(png.starts_with(b"\x89PNG"));
}

#[tokio::test]
async fn pipeline_renders_from_memory_loader() {
    let loader = MemoryBackgroundLoader::new().with_image("court.png", court_png(800, 400));
    let renderer = Renderer::new(loader, Config::default().style);
    let mut surface = SvgSurface::new(800.0, 400.0);

    let outcome = renderer
        .render(&mut surface, "court.png", &fixture("serve_receive.json"))
        .await;
    match outcome {
        RenderOutcome::Complete { drawn, skipped } => {
            assert_eq!(drawn, 7);
            assert!(skipped.is_empty());
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    // Left of the label glyph, still inside the marker.
    assert_eq!(rgb_at(&surface, 549, 110), [0xc0, 0x39, 0x2b]);

    let outcome = renderer
        .render(&mut surface, "missing.png", &fixture("serve_receive.json"))
        .await;
    assert!(matches!(outcome, RenderOutcome::BackgroundUnavailable { decoded: Ok(7), .. }));
    assert!(surface.is_blank());
}
