//! CLI application for bite and face-proportion analysis.
//!
//! Usage:
//!   dental-face <keypoints.json>                          # Human-readable output
//!   dental-face <keypoints.json> --json                   # JSON output
//!   dental-face <keypoints.json> -i face.jpg --overlay out.png
//!   dental-face <points.json> --layout ibug --store record.json

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use dental_face::{
    format_for_storage, generate_recommendations, AnalysisResult, Analyzer, CanvasRenderer,
    Config, KeypointLayout, StaticDetector, StoredAnalysis, Visualizer,
};
use image::DynamicImage;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "dental-face")]
#[command(author, version, about = "Facial midline, face shape and dental proportions", long_about = None)]
struct Args {
    /// Keypoint file produced by a landmark detector
    #[arg(required = true)]
    keypoints: PathBuf,

    /// Keypoint file layout
    #[arg(long, value_enum, default_value_t = Layout::Named)]
    layout: Layout,

    /// Source image (used for the overlay)
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// Write the rendered overlay to this PNG file
    #[arg(long)]
    overlay: Option<PathBuf>,

    /// Write the storage record to this JSON file
    #[arg(long)]
    store: Option<PathBuf>,

    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(short, long)]
    json: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Layout {
    /// Named keypoints: [{"name": "chin", "x": 1, "y": 2}, ...]
    Named,
    /// iBUG 68/81 points: [[x, y], ...]
    Ibug,
}

impl From<Layout> for KeypointLayout {
    fn from(layout: Layout) -> Self {
        match layout {
            Layout::Named => KeypointLayout::Named,
            Layout::Ibug => KeypointLayout::Ibug,
        }
    }
}

/// Output structure for JSON serialization
#[derive(Serialize)]
struct Output<'a> {
    keypoints: String,
    faces_detected: usize,
    analysis: &'a AnalysisResult,
    recommendations: Vec<String>,
    record: Option<StoredAnalysis>,
}

fn main() {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => {
            tracing::debug!("loading config from {:?}", path);
            Config::load(path)?
        }
        None => Config::default(),
    };

    tracing::debug!("loading keypoints from {:?}", args.keypoints);
    let detector = StaticDetector::from_json_file(&args.keypoints, args.layout.into())?;
    let faces_detected = detector.num_faces();

    let image = match &args.image {
        Some(path) => {
            tracing::debug!("loading image {:?}", path);
            image::open(path)?
        }
        None => DynamicImage::new_rgba8(config.surface.width, config.surface.height),
    };

    let analyzer = Analyzer::new(detector);
    let result = analyzer.analyze_image(&image);

    if let Some(ref path) = args.overlay {
        let mut canvas = CanvasRenderer::new(config.surface.width, config.surface.height);
        Visualizer::new(config.overlay.clone()).render(&mut canvas, &image.to_rgba8(), &result);
        canvas.into_image().save(path)?;
        tracing::info!("overlay written to {:?}", path);
    }

    let record = format_for_storage(&result);
    if let (Some(path), Some(record)) = (&args.store, &record) {
        std::fs::write(path, serde_json::to_string_pretty(record)?)?;
        tracing::info!("storage record written to {:?}", path);
    }

    let output = Output {
        keypoints: args.keypoints.display().to_string(),
        faces_detected,
        analysis: &result,
        recommendations: generate_recommendations(&result),
        record,
    };

    let output_str = if args.json {
        serde_json::to_string_pretty(&output)?
    } else {
        format_human_readable(&output)
    };

    if let Some(ref path) = args.output {
        std::fs::write(path, &output_str)?;
        tracing::info!("output written to {:?}", path);
    } else {
        println!("{}", output_str);
    }

    Ok(())
}

fn format_human_readable(output: &Output) -> String {
    let mut s = String::new();

    s.push_str(&format!("Keypoints: {}\n", output.keypoints));
    s.push_str(&format!("Faces detected: {}\n", output.faces_detected));

    let analysis = output.analysis;
    let Some((midline, face_shape, proportions)) = analysis.measurements() else {
        let reason = analysis.error.as_deref().unwrap_or("unknown error");
        s.push_str(&format!("\nAnalysis failed: {}\n", reason));
        return s;
    };

    s.push_str("\nMidline:\n");
    s.push_str(&format!(
        "  Angle:      {:.1}° ({:+.1}° from vertical)\n",
        midline.angle,
        midline.tilt_from_vertical()
    ));
    s.push_str(&format!("  Confidence: {:.0}%\n", midline.confidence * 100.0));

    s.push_str("\nFace shape:\n");
    s.push_str(&format!("  Shape:      {}\n", face_shape.shape));
    s.push_str(&format!("  Ratio:      {:.3}\n", face_shape.ratio));
    s.push_str(&format!("  Confidence: {:.0}%\n", face_shape.confidence * 100.0));

    s.push_str("\nIdeal tooth widths:\n");
    s.push_str(&format!("  Central incisors: {:.1} mm\n", proportions.central_incisors_width));
    s.push_str(&format!("  Lateral incisors: {:.1} mm\n", proportions.lateral_incisors_width));
    s.push_str(&format!("  Canines:          {:.1} mm\n", proportions.canines_width));
    s.push_str(&format!("  Confidence:       {:.0}%\n", proportions.confidence * 100.0));

    if !output.recommendations.is_empty() {
        s.push_str("\nRecommendations:\n");
        for rec in &output.recommendations {
            s.push_str(&format!("  - {}\n", rec));
        }
    }

    s
}
