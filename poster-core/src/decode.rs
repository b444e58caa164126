//! Tickets for image decodes that complete after the request was issued.
//!
//! ```text
//! scene.begin_decode(target) ──► ticket ──► decode off-thread
//!                                               │
//! scene.finish_decode(ticket, result) ◄─────────┘
//!   ├─ Applied      ticket still current, object/background installed
//!   └─ Discarded    scene cleared or background superseded meanwhile
//! ```

use serde::{Deserialize, Serialize};

use crate::ObjectId;

/// What a pending decode will install when it completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodeTarget {
    /// Replace the background layer.
    Background,
    /// Append a new image object.
    Image,
}

/// A claim on a future scene mutation, issued before decoding starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecodeTicket {
    /// What the decode installs.
    pub target: DecodeTarget,
    /// Monotonic request number, unique per scene.
    pub seq: u64,
    /// Scene generation when the ticket was issued.
    pub(crate) generation: u64,
}

/// Result of handing a completed decode back to the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// The background layer was replaced.
    BackgroundSet,
    /// A new image object was appended.
    ImageAdded(ObjectId),
    /// The ticket went stale and the result was dropped.
    Discarded,
}

impl DecodeOutcome {
    /// Whether the completion changed the scene.
    #[must_use]
    pub fn is_applied(&self) -> bool {
        !matches!(self, Self::Discarded)
    }
}
