//! # Poster Renderer
//!
//! Compositor and exporter for poster scenes.
//!
//! ## Pipeline
//!
//! ```text
//! ┌───────────┐   ┌───────────┐   ┌──────────────┐   ┌─────────────┐
//! │   Scene   │──►│    SVG    │──►│ resvg raster │──►│ PNG / JPEG  │
//! │  (core)   │   │ document  │   │ (tiny-skia)  │   │   export    │
//! └───────────┘   └───────────┘   └──────────────┘   └─────────────┘
//! ```
//!
//! Layers are painted in order: canvas fill, background layer, then objects
//! in paint order. Output is always exactly the scene's viewport.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod compositor;
pub mod error;
pub mod export;
pub mod fonts;
pub mod svg;

pub use compositor::{Compositor, CompositorConfig, Frame};
pub use error::{RenderError, RenderResult};
pub use export::{EncodedImage, ExportConfig, ExportFormat, SceneExporter, DEFAULT_FILE_NAME};
