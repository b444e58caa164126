//! # Poster Editor
//!
//! Editing session and command-line host for poster scenes.
//!
//! The presentation layer is reduced to intents: every action becomes an
//! [`Intent`](poster_core::Intent) dispatched to an [`Editor`], which owns
//! the scene and runs image decodes on blocking worker tasks.
//!
//! ## Usage
//!
//! ```bash
//! poster-editor --background bg.jpg --image logo.png --text "Summer Sale" --color red
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `EditorConfig` - Canvas size, background fit, fonts and export settings
//! - `Editor` - One editing session: scene, pending decodes, exporter

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

mod error;
mod session;

pub use error::{EditorError, EditorResult};
pub use session::{Completion, Dispatched, Editor};

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use poster_core::{BackgroundFit, Color, SceneConfig, Viewport};
use poster_renderer::{ExportConfig, ExportFormat, DEFAULT_FILE_NAME};

/// Command-line arguments for poster-editor.
#[derive(Debug, Clone, Parser)]
#[command(name = "poster-editor")]
#[command(about = "Compose a poster from a background, images and text, then export it")]
#[command(version)]
pub struct CliArgs {
    /// Canvas width in pixels
    #[arg(long, default_value = "500")]
    pub width: u32,

    /// Canvas height in pixels
    #[arg(long, default_value = "650")]
    pub height: u32,

    /// Background image file
    #[arg(long)]
    pub background: Option<PathBuf>,

    /// How the background is fitted to the canvas
    #[arg(long, value_enum, default_value_t = FitArg::Stretch)]
    pub fit: FitArg,

    /// Image file to add (repeatable, painted in order)
    #[arg(long = "image")]
    pub images: Vec<PathBuf>,

    /// Text object to add (repeatable, painted after images)
    #[arg(long = "text")]
    pub texts: Vec<String>,

    /// Add the default poster text
    #[arg(long)]
    pub default_text: bool,

    /// Text colour: a swatch name or #rrggbb
    #[arg(long, value_parser = parse_color)]
    pub color: Option<Color>,

    /// Extra font file (repeatable)
    #[arg(long = "font")]
    pub fonts: Vec<PathBuf>,

    /// Directory the exported image is written to
    #[arg(long, env = "POSTER_OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// File name of the exported image
    #[arg(long, env = "POSTER_FILE_NAME", default_value = DEFAULT_FILE_NAME)]
    pub file_name: String,

    /// Export format
    #[arg(long, value_enum, default_value_t = FormatArg::Png)]
    pub format: FormatArg,

    /// JPEG quality 1-100
    #[arg(long, default_value = "85", value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: u8,

    /// Export even when the poster is blank
    #[arg(long)]
    pub allow_empty: bool,

    /// Print a JSON summary of the scene to stdout
    #[arg(long)]
    pub summary: bool,
}

/// Background fit choices on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FitArg {
    /// Fill the canvas exactly, ignoring aspect ratio.
    Stretch,
    /// Fit inside the canvas.
    Contain,
    /// Cover the canvas, cropping overflow.
    Cover,
}

impl From<FitArg> for BackgroundFit {
    fn from(fit: FitArg) -> Self {
        match fit {
            FitArg::Stretch => Self::Stretch,
            FitArg::Contain => Self::Contain,
            FitArg::Cover => Self::Cover,
        }
    }
}

/// Export format choices on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// PNG.
    Png,
    /// JPEG.
    Jpeg,
}

impl From<FormatArg> for ExportFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Png => Self::Png,
            FormatArg::Jpeg => Self::Jpeg,
        }
    }
}

fn parse_color(value: &str) -> Result<Color, String> {
    value.parse::<Color>().map_err(|e| e.to_string())
}

/// Editor configuration.
#[derive(Debug, Clone)]
pub struct EditorConfig {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Background fit policy.
    pub background_fit: BackgroundFit,
    /// Background image to load at startup.
    pub background: Option<PathBuf>,
    /// Images to add at startup, in paint order.
    pub images: Vec<PathBuf>,
    /// Texts to add at startup, in paint order.
    pub texts: Vec<String>,
    /// Add the default poster text at startup.
    pub default_text: bool,
    /// Colour applied to each added text.
    pub text_color: Option<Color>,
    /// Extra font files.
    pub fonts: Vec<PathBuf>,
    /// Export directory.
    pub output_dir: PathBuf,
    /// Export file name.
    pub file_name: String,
    /// Export format.
    pub format: ExportFormat,
    /// JPEG quality.
    pub jpeg_quality: u8,
    /// Export blank posters instead of failing.
    pub allow_empty: bool,
    /// Print the scene summary after export.
    pub print_summary: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorConfig {
    /// Create a new editor configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        let viewport = Viewport::default();
        Self {
            width: viewport.width,
            height: viewport.height,
            background_fit: BackgroundFit::default(),
            background: None,
            images: Vec::new(),
            texts: Vec::new(),
            default_text: false,
            text_color: None,
            fonts: Vec::new(),
            output_dir: PathBuf::from("."),
            file_name: DEFAULT_FILE_NAME.to_string(),
            format: ExportFormat::default(),
            jpeg_quality: ExportConfig::default().jpeg_quality,
            allow_empty: false,
            print_summary: false,
        }
    }

    /// Scene settings for this configuration.
    #[must_use]
    pub fn scene_config(&self) -> SceneConfig {
        SceneConfig {
            viewport: Viewport::new(self.width, self.height),
            background_fit: self.background_fit,
            ..SceneConfig::default()
        }
    }

    /// Export settings for this configuration.
    #[must_use]
    pub fn export_config(&self) -> ExportConfig {
        ExportConfig {
            jpeg_quality: self.jpeg_quality,
            allow_empty: self.allow_empty,
            file_name: self.file_name.clone(),
            ..ExportConfig::default()
        }
    }
}

impl From<CliArgs> for EditorConfig {
    fn from(args: CliArgs) -> Self {
        Self {
            width: args.width,
            height: args.height,
            background_fit: args.fit.into(),
            background: args.background,
            images: args.images,
            texts: args.texts,
            default_text: args.default_text,
            text_color: args.color,
            fonts: args.fonts,
            output_dir: args.output_dir,
            file_name: args.file_name,
            format: args.format.into(),
            jpeg_quality: args.quality,
            allow_empty: args.allow_empty,
            print_summary: args.summary,
        }
    }
}
