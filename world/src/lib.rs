#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative tile world state management for Gaius.

mod cell;
mod preview;

use std::{collections::BTreeMap, sync::Arc};

use gaius_core::{
    AdjacencyKind, Appearance, Command, Coordinate, Event, FootprintSize, PlacementError,
    TileMeta, TileStatus, VisualId,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span};

pub use cell::GridCell;
pub use preview::PlacementPreview;

const DEFAULT_GRID_WIDTH: u32 = 32;
const DEFAULT_GRID_HEIGHT: u32 = 32;

/// How the world reacts to a tick in which the pointer resolves to no cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerMissPolicy {
    /// Keep the last hovered cell so short pointer gaps do not flicker.
    #[default]
    RetainHover,
    /// Drop the hover and detach the preview as soon as the pointer leaves the grid.
    ClearHover,
}

/// Construction parameters of a [`World`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Number of cells along the `x` axis.
    pub width: u32,
    /// Number of cells along the `z` axis.
    pub height: u32,
    /// Reaction to ticks without a pointer hit.
    #[serde(default)]
    pub pointer_miss: PointerMissPolicy,
}

impl WorldConfig {
    /// Creates a configuration for a `width × height` grid with default policies.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pointer_miss: PointerMissPolicy::RetainHover,
        }
    }

    /// Returns the configuration with the provided pointer miss policy.
    #[must_use]
    pub const fn with_pointer_miss(mut self, policy: PointerMissPolicy) -> Self {
        self.pointer_miss = policy;
        self
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self::new(DEFAULT_GRID_WIDTH, DEFAULT_GRID_HEIGHT)
    }
}

/// Represents the authoritative Gaius tile world.
///
/// The grid is spawned once with a fixed size; placements and demolitions
/// mutate cell contents but never add or remove cells.
#[derive(Debug)]
pub struct World {
    config: WorldConfig,
    grid: BTreeMap<Coordinate, GridCell>,
    hovered: Option<Coordinate>,
    selected: Option<Coordinate>,
    preview: Option<PlacementPreview>,
    raycast_hit: Option<Coordinate>,
    next_visual: VisualId,
}

impl World {
    /// Spawns every cell of the configured grid.
    #[must_use]
    pub fn new(config: WorldConfig) -> Self {
        let width = i32::try_from(config.width).unwrap_or(i32::MAX);
        let height = i32::try_from(config.height).unwrap_or(i32::MAX);
        let mut grid = BTreeMap::new();
        for x in 0..width {
            for z in 0..height {
                let coordinate = Coordinate::new(x, z);
                let _ = grid.insert(coordinate, GridCell::new(coordinate));
            }
        }
        debug!(width, height, "tile world spawned");

        Self {
            config,
            grid,
            hovered: None,
            selected: None,
            preview: None,
            raycast_hit: None,
            next_visual: VisualId::new(0),
        }
    }

    fn allocate_visual(&mut self) -> VisualId {
        let visual = self.next_visual;
        self.next_visual = VisualId::new(visual.get().wrapping_add(1));
        visual
    }

    fn cell_mut(&mut self, cell: Coordinate) -> Result<&mut GridCell, PlacementError> {
        self.grid.get_mut(&cell).ok_or(PlacementError::OutOfBounds)
    }

    fn chain_root_of(&self, cell: Coordinate) -> Option<Coordinate> {
        self.grid
            .get(&cell)
            .map(|slot| slot.chain_root().unwrap_or(cell))
    }

    /// Root followed by every member of the chain containing `cell`.
    fn chain_of(&self, cell: Coordinate) -> Vec<Coordinate> {
        let Some(root) = self.chain_root_of(cell) else {
            return Vec::new();
        };
        let mut chain = vec![root];
        if let Some(slot) = self.grid.get(&root) {
            chain.extend_from_slice(slot.chain_nodes());
        }
        chain
    }

    fn set_preview_tile(&mut self, meta: Arc<TileMeta>, out_events: &mut Vec<Event>) {
        let _span = info_span!("set_preview_tile").entered();
        if let Some(previous) = self.preview.take() {
            if let Some(hovered) = self.hovered {
                if let Some(slot) = self.grid.get_mut(&hovered) {
                    let _ = slot.set_preview(None);
                }
            }
            out_events.push(Event::PreviewDestroyed {
                visual: previous.visual(),
            });
        }

        let visual = self.allocate_visual();
        out_events.push(Event::PreviewSpawned {
            visual,
            meta_id: meta.id.clone(),
            appearance: Appearance::Preview,
        });
        let mut preview = PlacementPreview::new(meta, visual);

        if let Some(hovered) = self.hovered {
            preview.set_valid(query::can_place(self, hovered, preview.meta().size));
            if let Some(slot) = self.grid.get_mut(&hovered) {
                if let Some(anchor) = slot.set_preview(Some(preview.clone())) {
                    out_events.push(Event::PreviewMoved { visual, anchor });
                }
            }
            out_events.push(Event::PreviewValidityChanged {
                visual,
                appearance: preview.appearance(),
            });
        }

        self.preview = Some(preview);
    }

    fn handle_slot_interaction(
        &mut self,
        hit: Option<Coordinate>,
        confirm: bool,
        out_events: &mut Vec<Event>,
    ) {
        let _span = info_span!("interact").entered();
        let hit = hit.filter(|cell| self.grid.contains_key(cell));
        self.raycast_hit = hit;

        let Some(cell) = hit else {
            if self.config.pointer_miss == PointerMissPolicy::ClearHover {
                self.clear_hover(out_events);
            }
            return;
        };

        if self.hovered != Some(cell) {
            self.hover(cell, out_events);
        }

        if !confirm {
            return;
        }

        if self.preview.is_none() {
            self.select(cell, out_events);
            return;
        }

        let Some(meta) = self.grid.get(&cell).and_then(GridCell::preview_meta) else {
            return;
        };

        let placed = if meta.size.should_chain() {
            self.place_chain(cell, meta.size)
        } else {
            self.place_single(cell)
        };

        match placed {
            Ok((visual, members)) => self.finish_placement(cell, &meta, visual, members, out_events),
            Err(reason) => {
                debug!(cell = ?cell, meta = %meta.id, %reason, "placement rejected");
                out_events.push(Event::PlacementRejected { at: cell, reason });
            }
        }
    }

    fn clear_hover(&mut self, out_events: &mut Vec<Event>) {
        let Some(previous) = self.hovered.take() else {
            return;
        };
        if let Some(slot) = self.grid.get_mut(&previous) {
            let _ = slot.set_preview(None);
            slot.set_hover(false);
        }
        out_events.push(Event::HoverChanged {
            from: Some(previous),
            to: None,
        });
    }

    fn hover(&mut self, cell: Coordinate, out_events: &mut Vec<Event>) {
        let previous = self.hovered;
        if let Some(previous) = previous {
            if let Some(slot) = self.grid.get_mut(&previous) {
                let _ = slot.set_preview(None);
                slot.set_hover(false);
            }
        }

        if let Some(preview) = self.preview.as_mut() {
            let valid = {
                let size = preview.meta().size;
                let selection = centered_selection(&self.grid, cell, size);
                selection.is_ok_and(|cells| all_placeable(&self.grid, &cells))
            };
            preview.set_valid(valid);
        }

        let preview = self.preview.clone();
        if let Some(slot) = self.grid.get_mut(&cell) {
            slot.set_hover(true);
            if let Some(preview) = preview.as_ref() {
                if let Some(anchor) = slot.set_preview(Some(preview.clone())) {
                    out_events.push(Event::PreviewMoved {
                        visual: preview.visual(),
                        anchor,
                    });
                }
            }
        }
        self.hovered = Some(cell);
        out_events.push(Event::HoverChanged {
            from: previous,
            to: Some(cell),
        });

        if let Some(preview) = preview {
            out_events.push(Event::PreviewValidityChanged {
                visual: preview.visual(),
                appearance: preview.appearance(),
            });
        }
    }

    fn select(&mut self, cell: Coordinate, out_events: &mut Vec<Event>) {
        let previous = self.selected;
        if let Some(previous) = previous {
            if let Some(slot) = self.grid.get_mut(&previous) {
                slot.set_selected(false);
            }
        }
        if let Some(slot) = self.grid.get_mut(&cell) {
            slot.set_selected(true);
        }
        self.selected = Some(cell);
        out_events.push(Event::SelectionChanged {
            from: previous,
            to: cell,
        });
    }

    fn place_single(
        &mut self,
        cell: Coordinate,
    ) -> Result<(VisualId, Vec<Coordinate>), PlacementError> {
        let _span = info_span!("place").entered();
        let visual = self.cell_mut(cell)?.place()?;
        Ok((visual, Vec::new()))
    }

    /// Places a multi-cell footprint centered on `anchor`, all or nothing.
    ///
    /// Every member of the selection is validated before the anchor commits;
    /// once it has, chaining the members cannot fail.
    fn place_chain(
        &mut self,
        anchor: Coordinate,
        size: FootprintSize,
    ) -> Result<(VisualId, Vec<Coordinate>), PlacementError> {
        let _span = info_span!("place").entered();
        let selection = centered_selection(&self.grid, anchor, size)?;
        for member in &selection {
            if let Some(slot) = self.grid.get(member) {
                slot.placeability()?;
            }
        }

        let visual = self.cell_mut(anchor)?.place()?;

        let members: Vec<Coordinate> = selection
            .into_iter()
            .filter(|member| *member != anchor)
            .collect();
        for member in &members {
            if let Some(slot) = self.grid.get_mut(member) {
                slot.set_chained(Some(anchor));
            }
        }
        if let Some(root) = self.grid.get_mut(&anchor) {
            for member in &members {
                root.add_chain_node(*member);
            }
        }

        Ok((visual, members))
    }

    fn finish_placement(
        &mut self,
        anchor: Coordinate,
        meta: &TileMeta,
        visual: VisualId,
        members: Vec<Coordinate>,
        out_events: &mut Vec<Event>,
    ) {
        self.preview = None;
        let previous = self.hovered.take();
        info!(cell = ?anchor, meta = %meta.id, chained = members.len(), "tile placed");

        out_events.push(Event::PreviewCommitted { visual, at: anchor });
        out_events.push(Event::TilePlaced {
            anchor,
            meta_id: meta.id.clone(),
            members,
        });
        out_events.push(Event::HoverChanged {
            from: previous,
            to: None,
        });
    }

    fn set_chain_hovered(&mut self, cell: Coordinate, hovered: bool) {
        let _span = info_span!("set_chain_hovered").entered();
        for member in self.chain_of(cell) {
            if let Some(slot) = self.grid.get_mut(&member) {
                slot.set_hover(hovered);
            }
        }
    }

    fn set_chain_selected(&mut self, cell: Coordinate, selected: bool) {
        let _span = info_span!("set_chain_selected").entered();
        for member in self.chain_of(cell) {
            if let Some(slot) = self.grid.get_mut(&member) {
                slot.set_selected(selected);
            }
        }
    }

    fn placed_chain(&self, cell: Coordinate) -> Result<Vec<Coordinate>, PlacementError> {
        let root = self
            .chain_root_of(cell)
            .ok_or(PlacementError::OutOfBounds)?;
        match self.grid.get(&root) {
            Some(slot) if slot.meta().is_some() => Ok(self.chain_of(root)),
            _ => Err(PlacementError::NotPlaced),
        }
    }

    fn demolish(&mut self, cell: Coordinate, out_events: &mut Vec<Event>) {
        let _span = info_span!("demolish").entered();
        let chain = match self.placed_chain(cell) {
            Ok(chain) => chain,
            Err(reason) => {
                debug!(cell = ?cell, %reason, "demolish rejected");
                out_events.push(Event::PlacementRejected { at: cell, reason });
                return;
            }
        };

        for member in &chain {
            if let Some(slot) = self.grid.get_mut(member) {
                if let Some(visual) = slot.clear_placement() {
                    out_events.push(Event::VisualDestroyed { visual });
                }
            }
        }
        info!(cell = ?cell, cells = chain.len(), "tile demolished");
        out_events.push(Event::TileDemolished { cells: chain });
    }

    fn destroy(&mut self, cell: Coordinate, out_events: &mut Vec<Event>) {
        let _span = info_span!("destroy").entered();
        let chain = match self.placed_chain(cell) {
            Ok(chain) => chain,
            Err(reason) => {
                debug!(cell = ?cell, %reason, "destroy rejected");
                out_events.push(Event::PlacementRejected { at: cell, reason });
                return;
            }
        };

        let affected = chain
            .first()
            .and_then(|root| self.grid.get(root))
            .and_then(GridCell::meta)
            .is_some_and(|meta| meta.is_affected_by_disaster);
        if !affected {
            debug!(cell = ?cell, "tile is immune to disasters");
            return;
        }

        for member in &chain {
            if let Some(slot) = self.grid.get_mut(member) {
                slot.mark_destroyed();
            }
        }
        info!(cell = ?cell, cells = chain.len(), "tile destroyed");
        out_events.push(Event::TileDestroyed { cells: chain });
    }

    fn set_nearby(
        &mut self,
        cell: Coordinate,
        kind: AdjacencyKind,
        nearby: Vec<Coordinate>,
        out_events: &mut Vec<Event>,
    ) {
        let _span = info_span!("set_nearby").entered();
        let nearby: Vec<Coordinate> = nearby
            .into_iter()
            .filter(|neighbour| self.grid.contains_key(neighbour))
            .collect();

        let outcome = self.cell_mut(cell).and_then(|slot| {
            if slot.state().status == TileStatus::Empty {
                return Err(PlacementError::EmptyCell);
            }
            slot.state_mut().set_nearby(kind, nearby);
            Ok(())
        });

        if let Err(reason) = outcome {
            debug!(cell = ?cell, ?kind, %reason, "neighbour update rejected");
            out_events.push(Event::PlacementRejected { at: cell, reason });
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(WorldConfig::default())
    }
}

fn centered_selection(
    grid: &BTreeMap<Coordinate, GridCell>,
    center: Coordinate,
    size: FootprintSize,
) -> Result<Vec<Coordinate>, PlacementError> {
    // A footprint larger than the whole grid can never fit.
    let cells = u64::try_from(grid.len()).unwrap_or(u64::MAX);
    if size.area() > cells {
        return Err(PlacementError::OutOfBounds);
    }
    let size_x = i32::try_from(size.x()).map_err(|_| PlacementError::OutOfBounds)?;
    let size_z = i32::try_from(size.z()).map_err(|_| PlacementError::OutOfBounds)?;
    let start = center.offset(-(size_x / 2), -(size_z / 2));

    let capacity = usize::try_from(size.area()).map_or(grid.len(), |area| area.min(grid.len()));
    let mut selection = Vec::with_capacity(capacity);
    for dx in 0..size_x {
        for dz in 0..size_z {
            let key = start.offset(dx, dz);
            if !grid.contains_key(&key) {
                return Err(PlacementError::OutOfBounds);
            }
            selection.push(key);
        }
    }
    Ok(selection)
}

fn all_placeable(grid: &BTreeMap<Coordinate, GridCell>, cells: &[Coordinate]) -> bool {
    cells
        .iter()
        .all(|cell| grid.get(cell).is_some_and(GridCell::can_place))
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    let _span = info_span!("apply").entered();
    match command {
        Command::SetPreviewTile { meta } => world.set_preview_tile(meta, out_events),
        Command::Interact { hit, confirm } => {
            world.handle_slot_interaction(hit, confirm, out_events);
        }
        Command::SetChainHovered { cell, hovered } => world.set_chain_hovered(cell, hovered),
        Command::SetChainSelected { cell, selected } => world.set_chain_selected(cell, selected),
        Command::Demolish { cell } => world.demolish(cell, out_events),
        Command::Destroy { cell } => world.destroy(cell, out_events),
        Command::SetNearby { cell, kind, nearby } => {
            world.set_nearby(cell, kind, nearby, out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use gaius_core::{AdjacencyKind, Coordinate, FootprintSize, PlacementError, TileStatus};

    use super::{GridCell, PlacementPreview, World, WorldConfig};

    /// Configuration the world was spawned with.
    #[must_use]
    pub fn config(world: &World) -> &WorldConfig {
        &world.config
    }

    /// Grid dimensions as `(width, height)`.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        (world.config.width, world.config.height)
    }

    /// Looks up the cell stored under `coordinate`.
    #[must_use]
    pub fn cell(world: &World, coordinate: Coordinate) -> Option<&GridCell> {
        world.grid.get(&coordinate)
    }

    /// Iterates every cell, ordered by `x` then `z`.
    pub fn cells(world: &World) -> impl Iterator<Item = &GridCell> {
        world.grid.values()
    }

    /// Cell currently hovered by the pointer.
    #[must_use]
    pub fn hovered_cell(world: &World) -> Option<Coordinate> {
        world.hovered
    }

    /// Cell currently selected.
    #[must_use]
    pub fn selected_cell(world: &World) -> Option<Coordinate> {
        world.selected
    }

    /// Cell the pointer resolved to on the latest interaction tick.
    #[must_use]
    pub fn raycast_hit(world: &World) -> Option<Coordinate> {
        world.raycast_hit
    }

    /// Active placement preview.
    #[must_use]
    pub fn preview(world: &World) -> Option<&PlacementPreview> {
        world.preview.as_ref()
    }

    /// Footprint of `size` centered on `center`.
    ///
    /// Coordinates are ordered with `x` ascending in the outer loop and `z`
    /// ascending in the inner loop, so the first entry is the most negative
    /// corner. Fails when any coordinate lies outside the grid.
    pub fn centered_selection(
        world: &World,
        center: Coordinate,
        size: FootprintSize,
    ) -> Result<Vec<Coordinate>, PlacementError> {
        super::centered_selection(&world.grid, center, size)
    }

    /// Reports whether a footprint of `size` centered on `center` fits on empty, unchained cells.
    #[must_use]
    pub fn can_place(world: &World, center: Coordinate, size: FootprintSize) -> bool {
        centered_selection(world, center, size)
            .is_ok_and(|cells| super::all_placeable(&world.grid, &cells))
    }

    /// Resolves the recorded neighbours of `cell`, skipping entries that no longer hold a tile.
    #[must_use]
    pub fn nearby(world: &World, cell: Coordinate, kind: AdjacencyKind) -> Vec<&GridCell> {
        let Some(slot) = world.grid.get(&cell) else {
            return Vec::new();
        };
        slot.state()
            .nearby(kind)
            .iter()
            .filter_map(|neighbour| world.grid.get(neighbour))
            .filter(|neighbour| neighbour.state().status != TileStatus::Empty)
            .collect()
    }

    /// Debug description of a cell, or `<none>` when absent.
    #[must_use]
    pub fn describe(world: &World, cell: Option<Coordinate>) -> String {
        cell.and_then(|cell| world.grid.get(&cell))
            .map_or_else(|| "<none>".to_owned(), ToString::to_string)
    }
}
