//! Transient placement candidates.

use std::sync::Arc;

use gaius_core::{Anchor, Appearance, Coordinate, TileMeta, VisualId};

/// Height at which placeholders hover above the grid plane.
const ANCHOR_HEIGHT: f32 = 1.0;

/// Placement candidate bound to a catalog entry and its placeholder visual.
///
/// A preview is never mutated into a committed cell; placing it hands the
/// placeholder over to the cell as its occupant and the preview is dropped.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacementPreview {
    meta: Arc<TileMeta>,
    visual: VisualId,
    valid: bool,
}

impl PlacementPreview {
    /// Creates a preview that starts out valid.
    #[must_use]
    pub fn new(meta: Arc<TileMeta>, visual: VisualId) -> Self {
        Self {
            meta,
            visual,
            valid: true,
        }
    }

    /// Catalog entry proposed for placement.
    #[must_use]
    pub fn meta(&self) -> &Arc<TileMeta> {
        &self.meta
    }

    /// Placeholder representing the candidate.
    #[must_use]
    pub const fn visual(&self) -> VisualId {
        self.visual
    }

    /// Whether the candidate fits the location it was last checked against.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    /// Records the outcome of the latest placement check.
    pub fn set_valid(&mut self, valid: bool) {
        self.valid = valid;
    }

    /// Rendering mode matching the validity flag.
    #[must_use]
    pub const fn appearance(&self) -> Appearance {
        if self.valid {
            Appearance::Preview
        } else {
            Appearance::Invalid
        }
    }

    /// World-space anchor of the placeholder when attached to `cell`.
    ///
    /// Even extents shift the anchor by half a cell towards negative so that
    /// multi-cell buildings line up with the centered selection.
    #[must_use]
    pub fn anchor_at(&self, cell: Coordinate) -> Anchor {
        let size = self.meta.size;
        let extra_x = if size.is_x_even() { -0.5 } else { 0.0 };
        let extra_z = if size.is_z_even() { -0.5 } else { 0.0 };
        Anchor::new(
            cell.x() as f32 + extra_x,
            ANCHOR_HEIGHT,
            cell.z() as f32 + extra_z,
        )
    }
}
