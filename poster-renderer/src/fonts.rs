//! Font database used for text layout.
//!
//! A DejaVu Sans face ships inside the crate so text renders the same on
//! every host, whether or not it has system fonts installed.

use std::sync::Arc;

use usvg::fontdb;

use crate::error::{RenderError, RenderResult};

/// Family name of the bundled face.
pub const BUNDLED_FAMILY: &str = "DejaVu Sans";

static BUNDLED_FONT: &[u8] = include_bytes!("../assets/fonts/DejaVuSans.ttf");

/// Build a font database containing the bundled face.
///
/// # Errors
///
/// Returns an error if the bundled face cannot be parsed.
pub fn bundled_database() -> RenderResult<Arc<fontdb::Database>> {
    let mut db = fontdb::Database::new();
    db.load_font_data(BUNDLED_FONT.to_vec());

    if db.is_empty() {
        return Err(RenderError::Font(format!(
            "bundled {BUNDLED_FAMILY} face could not be parsed"
        )));
    }

    db.set_sans_serif_family(BUNDLED_FAMILY);
    tracing::debug!("Font database ready with {} face(s)", db.len());
    Ok(Arc::new(db))
}

/// Add faces from extra font files to a database.
///
/// Faces that fail to parse are skipped by `fontdb`.
#[must_use]
pub fn with_extra_fonts(base: &fontdb::Database, fonts: &[Vec<u8>]) -> Arc<fontdb::Database> {
    let mut db = base.clone();
    for data in fonts {
        db.load_font_data(data.clone());
    }
    Arc::new(db)
}
