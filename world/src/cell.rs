//! Addressable grid cells and their placement transaction.

use std::{fmt, sync::Arc};

use gaius_core::{Anchor, Coordinate, PlacementError, TileMeta, TileState, TileStatus, VisualId};
use tracing::debug;

use crate::PlacementPreview;

/// Single addressable cell of the tile world.
///
/// A cell owns its [`TileState`] and, once a placement is committed, the
/// catalog entry and placeholder of the building standing on it. Chains are
/// one-directional: only the root enumerates its members through
/// `chain_nodes`, members only know their root.
#[derive(Clone, Debug)]
pub struct GridCell {
    coordinate: Coordinate,
    state: TileState,
    meta: Option<Arc<TileMeta>>,
    occupant: Option<VisualId>,
    hovered: bool,
    selected: bool,
    preview: Option<PlacementPreview>,
    chain_root: Option<Coordinate>,
    chain_nodes: Vec<Coordinate>,
}

impl GridCell {
    /// Creates an empty, unchained cell at the provided coordinate.
    #[must_use]
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            state: TileState::new(),
            meta: None,
            occupant: None,
            hovered: false,
            selected: false,
            preview: None,
            chain_root: None,
            chain_nodes: Vec::new(),
        }
    }

    /// Key of the cell within the grid.
    #[must_use]
    pub const fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    /// Scene name of the cell, as reported for pointer hits.
    #[must_use]
    pub fn name(&self) -> String {
        format!("Slot ({}, {})", self.coordinate.x(), self.coordinate.z())
    }

    /// Simulation state owned by the cell.
    #[must_use]
    pub fn state(&self) -> &TileState {
        &self.state
    }

    /// Catalog entry of the committed placement, if any.
    #[must_use]
    pub fn meta(&self) -> Option<&Arc<TileMeta>> {
        self.meta.as_ref()
    }

    /// Placeholder of the committed building, if any.
    #[must_use]
    pub const fn occupant(&self) -> Option<VisualId> {
        self.occupant
    }

    /// Whether the pointer currently rests on the cell.
    #[must_use]
    pub const fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// Whether the cell is selected.
    #[must_use]
    pub const fn is_selected(&self) -> bool {
        self.selected
    }

    /// Preview currently attached to the cell.
    #[must_use]
    pub fn preview(&self) -> Option<&PlacementPreview> {
        self.preview.as_ref()
    }

    /// Catalog entry of the attached preview.
    #[must_use]
    pub fn preview_meta(&self) -> Option<Arc<TileMeta>> {
        self.preview.as_ref().map(|preview| Arc::clone(preview.meta()))
    }

    /// Root of the chain this cell belongs to, when it is a chain member.
    #[must_use]
    pub const fn chain_root(&self) -> Option<Coordinate> {
        self.chain_root
    }

    /// Members chained beneath this cell; only populated on a chain root.
    #[must_use]
    pub fn chain_nodes(&self) -> &[Coordinate] {
        &self.chain_nodes
    }

    /// Reports whether a new placement may claim the cell.
    #[must_use]
    pub fn can_place(&self) -> bool {
        self.placeability().is_ok()
    }

    /// Explains why a new placement may not claim the cell.
    pub fn placeability(&self) -> Result<(), PlacementError> {
        if self.state.status != TileStatus::Empty {
            return Err(PlacementError::Occupied);
        }
        if self.chain_root.is_some() {
            return Err(PlacementError::Chained);
        }
        Ok(())
    }

    /// Commits the attached preview onto the cell.
    ///
    /// Rejections leave the cell untouched. On success the preview's meta
    /// becomes the cell's meta, the state is reset and flipped to
    /// [`TileStatus::Building`], the placeholder becomes the occupant and the
    /// hover flag is cleared. The consumed placeholder is returned.
    pub fn place(&mut self) -> Result<VisualId, PlacementError> {
        if self.preview.is_none() {
            debug!(cell = ?self.coordinate, "place rejected: no preview");
            return Err(PlacementError::NoPreview);
        }
        if !self.hovered {
            debug!(cell = ?self.coordinate, "place rejected: not hovered");
            return Err(PlacementError::NotHovered);
        }
        if let Err(reason) = self.placeability() {
            debug!(cell = ?self.coordinate, %reason, "place rejected");
            return Err(reason);
        }

        let Some(preview) = self.preview.take() else {
            return Err(PlacementError::NoPreview);
        };
        self.state.reset();
        self.state.status = TileStatus::Building;
        self.meta = Some(Arc::clone(preview.meta()));
        self.occupant = Some(preview.visual());
        self.hovered = false;
        Ok(preview.visual())
    }

    /// Attaches or detaches a preview.
    ///
    /// Attaching returns the anchor the placeholder has to move to; detaching
    /// has no effect on the cell's own state.
    pub fn set_preview(&mut self, preview: Option<PlacementPreview>) -> Option<Anchor> {
        let anchor = preview
            .as_ref()
            .map(|preview| preview.anchor_at(self.coordinate));
        self.preview = preview;
        anchor
    }

    /// Sets the hover flag of this cell only.
    pub fn set_hover(&mut self, hovered: bool) {
        self.hovered = hovered;
    }

    /// Sets the selection flag of this cell only.
    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    /// Appends a member to the chain rooted at this cell.
    pub fn add_chain_node(&mut self, node: Coordinate) {
        self.chain_nodes.push(node);
    }

    /// Forgets every member of the chain rooted at this cell.
    pub fn clear_chain_nodes(&mut self) {
        self.chain_nodes.clear();
    }

    /// Records the root of the chain this cell belongs to.
    pub fn set_chained(&mut self, root: Option<Coordinate>) {
        self.chain_root = root;
    }

    pub(crate) fn state_mut(&mut self) -> &mut TileState {
        &mut self.state
    }

    /// Returns the cell to the empty, unchained state and hands back its occupant.
    pub(crate) fn clear_placement(&mut self) -> Option<VisualId> {
        self.state.reset();
        self.meta = None;
        self.chain_root = None;
        self.chain_nodes.clear();
        self.occupant.take()
    }

    /// Zeroes the state and marks it destroyed, keeping meta and chain topology.
    pub(crate) fn mark_destroyed(&mut self) {
        self.state.reset();
        self.state.status = TileStatus::Destroyed;
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let child = self.meta.as_ref().map_or("None", |meta| meta.id.as_str());
        write!(
            f,
            "x={}, z={}, child={}, lv={}, h={}",
            self.coordinate.x(),
            self.coordinate.z(),
            child,
            self.state.level,
            self.state.health
        )
    }
}
