//! Replays a recorded gesture script over a photo and writes the results.

mod script;

use clap::Parser;
use fieldmark_core::{
    ConfigError, ElementRect, ImageError, MarkupConfig, MarkupSession, PhotoRecord, RecordError,
    SourceImage,
};
use fieldmark_render::{EncodedRaster, ExportError, Exporter, RasterRenderer, RenderStyle, Renderer};
use script::{LabelQueue, Script};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Parser, Debug)]
#[command(
    name = "fieldmark",
    version,
    about = "Mark up a survey photo by replaying a gesture script"
)]
struct Args {
    /// Photo to mark up (PNG, JPEG, WebP, BMP or GIF).
    image: PathBuf,
    /// JSON gesture script.
    #[arg(long)]
    script: PathBuf,
    /// JSON markup configuration.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Override the maximum surface width.
    #[arg(long)]
    max_width: Option<f64>,
    /// Survey section stored in the record.
    #[arg(long, default_value = "")]
    section: String,
    /// Caption stored in the record.
    #[arg(long, default_value = "")]
    caption: String,
    /// Directory for the marked and original rasters and record.json.
    #[arg(long)]
    out_dir: PathBuf,
    /// Write every redrawn surface during replay as frame-NNNN.png here.
    #[arg(long)]
    frames: Option<PathBuf>,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Image(#[from] ImageError),
    #[error("Image {0} cannot be marked up")]
    Unusable(String),
    #[error("Script error: {0}")]
    Script(String),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error("IO error: {0}")]
    Io(String),
}

fn main() {
    env_logger::init();

    let args = Args::parse();
    match run(&args) {
        Ok(record) => log::info!(
            "Wrote record {} with {} annotations to {}",
            record.id,
            record.marks.len(),
            args.out_dir.display()
        ),
        Err(e) => {
            log::error!("{}", e);
            eprintln!("fieldmark: {}", e);
            std::process::exit(1);
        }
    }
}

fn run(args: &Args) -> Result<PhotoRecord, CliError> {
    let mut config = match &args.config {
        Some(path) => MarkupConfig::load(path)?,
        None => MarkupConfig::default(),
    };
    if let Some(max_width) = args.max_width {
        config.max_surface_width = max_width;
    }

    let script = Script::load(&args.script).map_err(CliError::Script)?;
    let image = SourceImage::open(&args.image)?;

    let mut session = MarkupSession::new(config.clone());
    let labels = LabelQueue::default();
    for text in &script.labels {
        labels.push(text.clone());
    }
    labels.attach(&mut session);

    if !session.initialize(image) {
        return Err(CliError::Unusable(args.image.display().to_string()));
    }
    let element = match (script.element, session.viewport()) {
        (Some(element), _) => element,
        (None, Some(viewport)) => ElementRect::at_surface_size(viewport),
        (None, None) => return Err(CliError::Unusable(args.image.display().to_string())),
    };

    let mut frames = match &args.frames {
        Some(dir) => Some(FrameWriter::create(dir)?),
        None => None,
    };
    for (index, step) in script.steps.iter().enumerate() {
        let outcome = script::apply(step, &mut session, &element, &labels);
        log::debug!("Step {}: {:?} -> {:?}", index, step, outcome);
        if session.take_redraw_request() {
            if let Some(frames) = frames.as_mut() {
                frames.write(&session)?;
            }
        }
    }
    if session.is_drawing() {
        log::warn!("Script ended mid-gesture; the unfinished shape is not exported");
    }

    let mut exporter = Exporter::new(config.export);
    let marked = exporter.export(&session)?;
    let original = exporter.original_raster(&session)?;

    std::fs::create_dir_all(&args.out_dir)
        .map_err(|e| CliError::Io(format!("Failed to create {}: {}", args.out_dir.display(), e)))?;
    write_raster(&args.out_dir, "marked", &marked)?;
    write_raster(&args.out_dir, "original", &original)?;

    let record = PhotoRecord::new(
        args.section.as_str(),
        args.caption.as_str(),
        original.to_data_url(),
        marked.to_data_url(),
        session.snapshot(),
    );
    record.save(&args.out_dir.join("record.json"))?;
    Ok(record)
}

/// Renders the live surface, candidate preview included, on each redraw.
struct FrameWriter {
    dir: PathBuf,
    renderer: RasterRenderer,
    written: usize,
}

impl FrameWriter {
    fn create(dir: &Path) -> Result<Self, CliError> {
        std::fs::create_dir_all(dir)
            .map_err(|e| CliError::Io(format!("Failed to create {}: {}", dir.display(), e)))?;
        Ok(Self {
            dir: dir.to_path_buf(),
            renderer: RasterRenderer::new(),
            written: 0,
        })
    }

    fn write(&mut self, session: &MarkupSession) -> Result<(), CliError> {
        let surface = self
            .renderer
            .render_session(session, RenderStyle::default())
            .map_err(ExportError::from)?;
        let path = self.dir.join(format!("frame-{:04}.png", self.written));
        surface
            .save_with_format(&path, image::ImageFormat::Png)
            .map_err(|e| CliError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
        self.written += 1;
        Ok(())
    }
}

fn write_raster(dir: &Path, stem: &str, raster: &EncodedRaster) -> Result<(), CliError> {
    let path = dir.join(format!("{}.{}", stem, raster.format.extension()));
    std::fs::write(&path, &raster.bytes)
        .map_err(|e| CliError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
    log::info!("Wrote {} ({}x{})", path.display(), raster.width, raster.height);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldmark_core::Annotation;
    use image::{Rgba, RgbaImage};

    fn args(dir: &Path, script: &str) -> Args {
        let image = dir.join("photo.png");
        RgbaImage::from_pixel(1800, 1200, Rgba([40, 60, 80, 255]))
            .save(&image)
            .unwrap();
        let script_path = dir.join("gestures.json");
        std::fs::write(&script_path, script).unwrap();
        Args {
            image,
            script: script_path,
            config: None,
            max_width: None,
            section: "Exterior".to_string(),
            caption: "North wall".to_string(),
            out_dir: dir.join("out"),
            frames: None,
        }
    }

    #[test]
    fn test_run_writes_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let args = args(
            dir.path(),
            r#"{
                "labels": ["Spalling"],
                "steps": [
                    { "op": "mouse", "phase": "down", "x": 40, "y": 40 },
                    { "op": "mouse", "phase": "up", "x": 40, "y": 40 },
                    { "op": "tool", "name": "rect" },
                    { "op": "mouse", "phase": "down", "x": 100, "y": 100 },
                    { "op": "mouse", "phase": "move", "x": 150, "y": 140 },
                    { "op": "mouse", "phase": "up", "x": 200, "y": 180 },
                    { "op": "tool", "name": "text" },
                    { "op": "mouse", "phase": "down", "x": 300, "y": 300 },
                    { "op": "mouse", "phase": "up", "x": 300, "y": 300 },
                    { "op": "zoom_in" }
                ]
            }"#,
        );

        let record = run(&args).unwrap();
        assert_eq!(record.section, "Exterior");
        assert_eq!(record.annotation, "North wall");
        assert_eq!(record.marks.len(), 3);
        assert!(matches!(record.marks[1], Annotation::Rectangle(_)));

        let out = dir.path().join("out");
        let marked = SourceImage::open(&out.join("marked.png")).unwrap();
        assert_eq!((marked.natural_width(), marked.natural_height()), (900, 600));
        let original = SourceImage::open(&out.join("original.png")).unwrap();
        assert_eq!(original.natural_width(), 1800);
        assert_eq!(PhotoRecord::load(&out.join("record.json")).unwrap(), record);
    }

    #[test]
    fn test_max_width_override() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args(dir.path(), "[]");
        args.max_width = Some(600.0);
        run(&args).unwrap();
        let marked = SourceImage::open(&dir.path().join("out").join("marked.png")).unwrap();
        assert_eq!((marked.natural_width(), marked.natural_height()), (600, 400));
    }

    #[test]
    fn test_frames_follow_redraw_requests() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args(
            dir.path(),
            r##"[
                { "op": "tool", "name": "circle" },
                { "op": "mouse", "phase": "down", "x": 200, "y": 200 },
                { "op": "mouse", "phase": "move", "x": 240, "y": 200 },
                { "op": "mouse", "phase": "up", "x": 260, "y": 200 },
                { "op": "color", "value": "#00ff00" }
            ]"##,
        );
        let frames = dir.path().join("frames");
        args.frames = Some(frames.clone());
        run(&args).unwrap();

        // Load, down, move and up each asked for a redraw; the color change did not.
        let mut names: Vec<_> = std::fs::read_dir(&frames)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec!["frame-0000.png", "frame-0001.png", "frame-0002.png", "frame-0003.png"]
        );
        let last = SourceImage::open(&frames.join("frame-0003.png")).unwrap();
        assert_eq!(last.natural_width(), 900);
    }

    #[test]
    fn test_no_frames_without_flag() {
        let dir = tempfile::tempdir().unwrap();
        let args = args(dir.path(), r#"[{ "op": "mouse", "phase": "down", "x": 5, "y": 5 }]"#);
        run(&args).unwrap();
        assert!(!dir.path().join("frames").exists());
    }

    #[test]
    fn test_bad_script_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let args = args(dir.path(), "{ nope");
        assert!(matches!(run(&args), Err(CliError::Script(_))));
    }

    #[test]
    fn test_missing_image_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args(dir.path(), "[]");
        args.image = dir.path().join("missing.jpg");
        assert!(matches!(run(&args), Err(CliError::Image(ImageError::Io(_)))));
    }
}
