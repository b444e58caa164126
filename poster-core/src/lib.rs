//! # Poster Core
//!
//! Scene model for the poster editor: what is on the poster, nothing about
//! how it is drawn.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 poster-core                 │
//! ├─────────────────────────────────────────────┤
//! │  Scene            │  Intents                │
//! │  - Background     │  - UI actions as values │
//! │  - Objects        │  - Applied in order     │
//! │  - Selection      │                         │
//! ├─────────────────────────────────────────────┤
//! │  Bitmaps          │  Decode tickets         │
//! │  - Decoding       │  - Stale completions    │
//! │  - Data URIs      │    are discarded        │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod background;
pub mod bitmap;
pub mod color;
pub mod decode;
pub mod error;
pub mod intent;
pub mod object;
pub mod scene;
pub mod summary;

pub use background::{BackgroundFit, BackgroundLayer, Viewport};
pub use bitmap::{Bitmap, ImageFormat};
pub use color::{Color, Palette};
pub use decode::{DecodeOutcome, DecodeTarget, DecodeTicket};
pub use error::{SceneError, SceneResult};
pub use intent::{Applied, Intent};
pub use object::{
    ImageObject, ObjectId, ObjectKind, Point, Scale, SceneObject, TextObject, TextStyle,
    DEFAULT_FONT_SIZE, DEFAULT_LINE_HEIGHT,
};
pub use scene::{
    Scene, SceneConfig, ZOrder, DEFAULT_IMAGE_SCALE, DEFAULT_INSERT_POSITION, DEFAULT_TEXT,
};
pub use summary::{ObjectSummary, SceneSummary};

/// Poster core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
