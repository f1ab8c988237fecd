use crate::background::FsBackgroundLoader;
use crate::config::{load_config, override_render};
use crate::pipeline::Renderer;
use crate::render::RenderOutcome;
use crate::surface::SvgSurface;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tdr", version, about = "Render tactical court diagrams over a background image")]
pub struct Args {
    /// Diagram file (JSON) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Background image (PNG or JPEG)
    #[arg(short = 'b', long = "background")]
    pub background: PathBuf,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format. Inferred from the output extension when omitted.
    #[arg(short = 'e', long = "outputFormat", value_enum)]
    pub output_format: Option<OutputFormat>,

    /// Config JSON file (sizes, stroke width, marker and label style)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Logical width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f64>,

    /// Logical height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f64>,

    /// Physical pixels per logical unit for PNG output
    #[arg(short = 's', long = "scale")]
    pub scale: Option<f32>,

    /// Exit with an error unless every element was drawn
    #[arg(long = "strict")]
    pub strict: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    override_render(&mut config.render, args.width, args.height, args.scale)?;

    let input = read_input(args.input.as_deref())?;
    let format = resolve_format(args.output_format, args.output.as_deref());

    let (dir, file) = split_background(&args.background);
    let renderer = Renderer::new(FsBackgroundLoader::with_root(dir), config.style.clone());
    let mut surface = SvgSurface::new(config.render.width, config.render.height);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let outcome = runtime.block_on(renderer.render(&mut surface, &file, &input));
    report(&outcome);

    match format {
        OutputFormat::Svg => write_output_svg(&surface.to_svg(), args.output.as_deref())?,
        OutputFormat::Png => {
            let output = args
                .output
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("Output path required for png output"))?;
            surface.write_png(output, config.render.scale)?;
        }
    }

    if args.strict {
        check_strict(&outcome)?;
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return Ok(std::fs::read_to_string(path)?);
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn resolve_format(explicit: Option<OutputFormat>, output: Option<&Path>) -> OutputFormat {
    if let Some(format) = explicit {
        return format;
    }
    let is_png = output
        .and_then(|p| p.extension())
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
    if is_png { OutputFormat::Png } else { OutputFormat::Svg }
}

/// The loader resolves references against a root; point it at the image's
/// directory.
fn split_background(path: &Path) -> (PathBuf, String) {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    let file = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    (dir, file)
}

fn report(outcome: &RenderOutcome) {
    match outcome {
        RenderOutcome::Complete { drawn, skipped } => {
            tracing::info!(drawn, skipped = skipped.len(), "diagram rendered");
            for skip in skipped {
                tracing::warn!(index = skip.index, reason = %skip.reason, "element skipped");
            }
        }
        RenderOutcome::BackgroundOnly { error } => {
            tracing::warn!(%error, "rendered background only");
        }
        RenderOutcome::BackgroundUnavailable { error, .. } => {
            tracing::warn!(%error, "rendered blank surface");
        }
        RenderOutcome::Superseded => {}
    }
}

fn check_strict(outcome: &RenderOutcome) -> Result<()> {
    match outcome {
        RenderOutcome::Complete { skipped, .. } if skipped.is_empty() => Ok(()),
        RenderOutcome::Complete { skipped, .. } => Err(anyhow::anyhow!(
            "{} element(s) skipped; first at index {}: {}",
            skipped.len(),
            skipped[0].index,
            skipped[0].reason
        )),
        RenderOutcome::BackgroundOnly { error } => Err(anyhow::anyhow!("diagram not drawn: {error}")),
        RenderOutcome::BackgroundUnavailable { error, .. } => {
            Err(anyhow::anyhow!("background not loaded: {error}"))
        }
        RenderOutcome::Superseded => Err(anyhow::anyhow!("render superseded")),
    }
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::ElementGeometryError;
    use crate::ir::ElementKind;
    use crate::parser::{SkipReason, SkippedElement};

    #[test]
    fn infers_format_from_extension() {
        assert_eq!(resolve_format(None, Some(Path::new("out.PNG"))), OutputFormat::Png);
        assert_eq!(resolve_format(None, Some(Path::new("out.svg"))), OutputFormat::Svg);
        assert_eq!(resolve_format(None, None), OutputFormat::Svg);
        assert_eq!(
            resolve_format(Some(OutputFormat::Svg), Some(Path::new("out.png"))),
            OutputFormat::Svg
        );
    }

    #[test]
    fn splits_background_path() {
        assert_eq!(
            split_background(Path::new("assets/court.png")),
            (PathBuf::from("assets"), "court.png".to_string())
        );
        assert_eq!(
            split_background(Path::new("court.png")),
            (PathBuf::from("."), "court.png".to_string())
        );
    }

    #[test]
    fn strict_mode_rejects_partial_renders() {
        assert!(
            check_strict(&RenderOutcome::Complete {
                drawn: 2,
                skipped: Vec::new()
            })
            .is_ok()
        );
        let partial = RenderOutcome::Complete {
            drawn: 1,
            skipped: vec![SkippedElement {
                index: 0,
                reason: SkipReason::Geometry(ElementGeometryError::TooFewPoints {
                    kind: ElementKind::Line,
                    required: 2,
                    found: 1,
                }),
            }],
        };
        let err = check_strict(&partial).unwrap_err().to_string();
        assert!(err.contains("index 0"));
        assert!(check_strict(&RenderOutcome::Superseded).is_err());
    }

    #[test]
    fn parses_arguments() {
        let args = Args::try_parse_from([
            "tdr", "-i", "play.json", "-b", "court.png", "-o", "play.png", "-s", "2", "--strict",
        ])
        .unwrap();
        assert_eq!(args.input, Some(PathBuf::from("play.json")));
        assert_eq!(args.scale, Some(2.0));
        assert!(args.strict);
        assert!(args.output_format.is_none());
        assert!(Args::try_parse_from(["tdr", "-i", "play.json"]).is_err());
    }

    #[test]
    fn size_overrides_must_be_positive() {
        let mut config = Config::default();
        let args = Args::try_parse_from(["tdr", "-b", "court.png", "-w", "1024", "-s", "2"]).unwrap();
        override_render(&mut config.render, args.width, args.height, args.scale).unwrap();
        assert_eq!(config.render.width, 1024.0);
        assert_eq!(config.render.height, 400.0);
        assert_eq!(config.render.scale, 2.0);

        for bad in ["--scale=0", "--width=-5", "--height=NaN"] {
            let args = Args::try_parse_from(["tdr", "-b", "court.png", bad]).unwrap();
            let err = override_render(&mut config.render, args.width, args.height, args.scale)
                .unwrap_err()
                .to_string();
            assert!(err.contains("must be a positive number"), "{bad:?}: {err}");
        }
        assert_eq!(config.render.width, 1024.0);
    }
}
