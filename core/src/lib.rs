#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Gaius city builder.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative tile world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! that adapters use to drive visuals, overlays and logs. Placeable tile types
//! are described by [`TileMeta`] catalog entries resolved through a
//! [`MetaProvider`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Location of a single grid cell expressed as `x` and `z` world indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    x: i32,
    z: i32,
}

impl Coordinate {
    /// Creates a new grid coordinate.
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Index of the cell along the world `x` axis.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Index of the cell along the world `z` axis.
    #[must_use]
    pub const fn z(&self) -> i32 {
        self.z
    }

    /// Returns the coordinate shifted by the provided deltas.
    #[must_use]
    pub const fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            z: self.z.saturating_add(dz),
        }
    }
}

/// Footprint of a tile type measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FootprintSize {
    x: u32,
    z: u32,
}

impl FootprintSize {
    /// Footprint covering exactly one cell.
    pub const SINGLE: Self = Self::new(1, 1);

    /// Creates a new footprint descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(x: u32, z: u32) -> Self {
        Self { x, z }
    }

    /// Extent of the footprint along the `x` axis.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Extent of the footprint along the `z` axis.
    #[must_use]
    pub const fn z(&self) -> u32 {
        self.z
    }

    /// Reports whether a placement of this size spans several cells and must be chained.
    #[must_use]
    pub const fn should_chain(&self) -> bool {
        self.x > 1 || self.z > 1
    }

    /// Reports whether the footprint has an even extent along `x`.
    #[must_use]
    pub const fn is_x_even(&self) -> bool {
        self.x % 2 == 0
    }

    /// Reports whether the footprint has an even extent along `z`.
    #[must_use]
    pub const fn is_z_even(&self) -> bool {
        self.z % 2 == 0
    }

    /// Number of cells covered by the footprint.
    #[must_use]
    pub const fn area(&self) -> u64 {
        self.x as u64 * self.z as u64
    }
}

/// Categories of placeable tiles.
///
/// Residential tiles house population, commercial tiles provide jobs and
/// industrial tiles produce and consume resources. The remaining categories
/// are services that other tiles want nearby.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileType {
    /// Housing that accommodates population.
    Residential,
    /// Shops and offices that provide jobs.
    Commercial,
    /// Factories with resource production and consumption.
    Industrial,
    /// Schools.
    Education,
    /// Fire stations.
    Fireman,
    /// Hospitals.
    Hospital,
    /// Police stations.
    Police,
    /// Parks.
    Park,
    /// Places of worship.
    Religious,
    /// Roads.
    Road,
    /// Origin of the water network.
    WaterSource,
    /// Pipe segment of the water network.
    WaterLine,
    /// Distribution point of the water network.
    WaterSupply,
}

/// Linear rate description used by industrial tiles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileMetaRate {
    /// Rate at level zero.
    pub initial: i32,
    /// Growth applied per level.
    pub multiplier: i32,
}

/// Immutable catalog entry describing a placeable tile type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileMeta {
    /// Unique identifier used to look the entry up.
    pub id: String,
    /// Human readable name.
    #[serde(default)]
    pub display_name: String,
    /// Asset path of the model the host instantiates for this tile.
    #[serde(default)]
    pub model: Option<String>,
    /// Footprint occupied on the grid.
    pub size: FootprintSize,
    /// Maximum number of instances the player may build.
    #[serde(default)]
    pub limit: Option<u32>,
    /// Construction cost.
    #[serde(default)]
    pub cost: f32,
    /// Health of a fully built tile.
    #[serde(default)]
    pub max_health: f32,
    /// Highest upgrade level.
    #[serde(default)]
    pub max_level: u32,
    /// Category of the tile.
    #[serde(rename = "type")]
    pub tile_type: TileType,
    /// Residential capacity.
    #[serde(default)]
    pub max_population: Option<u32>,
    /// Commercial capacity.
    #[serde(default)]
    pub max_jobs: Option<u32>,
    /// Industrial production rate.
    #[serde(default)]
    pub resource_production: Option<TileMetaRate>,
    /// Industrial consumption rate.
    #[serde(default)]
    pub resource_consumption: Option<TileMetaRate>,
    /// Whether disasters can destroy the tile.
    #[serde(default = "default_affected_by_disaster")]
    pub is_affected_by_disaster: bool,
}

fn default_affected_by_disaster() -> bool {
    true
}

impl TileMeta {
    /// Creates a catalog entry with the provided identity and zeroed stats.
    #[must_use]
    pub fn new(id: impl Into<String>, tile_type: TileType, size: FootprintSize) -> Self {
        let id = id.into();
        Self {
            display_name: id.clone(),
            id,
            model: None,
            size,
            limit: None,
            cost: 0.0,
            max_health: 0.0,
            max_level: 0,
            tile_type,
            max_population: None,
            max_jobs: None,
            resource_production: None,
            resource_consumption: None,
            is_affected_by_disaster: true,
        }
    }

    /// Returns the entry with the provided construction cost.
    #[must_use]
    pub fn with_cost(mut self, cost: f32) -> Self {
        self.cost = cost;
        self
    }

    /// Returns the entry with the provided maximum health.
    #[must_use]
    pub fn with_max_health(mut self, max_health: f32) -> Self {
        self.max_health = max_health;
        self
    }

    /// Returns the entry with the provided disaster susceptibility.
    #[must_use]
    pub fn with_disaster_immunity(mut self, immune: bool) -> Self {
        self.is_affected_by_disaster = !immune;
        self
    }
}

/// Lifecycle status of a grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileStatus {
    /// Nothing has been built on the cell.
    #[default]
    Empty,
    /// A placement was committed and is under construction.
    Building,
    /// Construction finished and the tile is in use.
    Occupied,
    /// The tile was destroyed by a disaster.
    Destroyed,
}

/// Service categories tracked in a tile's neighbourhood.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AdjacencyKind {
    /// Schools nearby.
    Education,
    /// Fire stations nearby.
    Fireman,
    /// Hospitals nearby.
    Hospital,
    /// Parks nearby.
    Park,
    /// Police stations nearby.
    Police,
    /// Places of worship nearby.
    Religious,
    /// Roads nearby.
    Road,
    /// Water supply nearby.
    WaterSupply,
}

impl AdjacencyKind {
    /// Number of tracked categories.
    pub const COUNT: usize = 8;

    /// Every category in declaration order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Education,
        Self::Fireman,
        Self::Hospital,
        Self::Park,
        Self::Police,
        Self::Religious,
        Self::Road,
        Self::WaterSupply,
    ];

    const fn index(self) -> usize {
        match self {
            Self::Education => 0,
            Self::Fireman => 1,
            Self::Hospital => 2,
            Self::Park => 3,
            Self::Police => 4,
            Self::Religious => 5,
            Self::Road => 6,
            Self::WaterSupply => 7,
        }
    }
}

/// Mutable simulation state owned by a single grid cell.
///
/// Neighbour lists store coordinates rather than references so a reset or
/// demolished neighbour never leaves a dangling entry; the world resolves them
/// lazily. An `Empty` cell always carries zeroed counters and empty lists.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TileState {
    /// Lifecycle status of the cell.
    pub status: TileStatus,
    /// Current health.
    pub health: f32,
    /// Current upgrade level.
    pub level: u32,
    /// Residents living on the tile.
    pub population: u32,
    /// Jobs provided by the tile.
    pub jobs: u32,
    /// Current resource production rate.
    pub resource_production_rate: i32,
    /// Current resource consumption rate.
    pub resource_consumption_rate: i32,
    nearby: [Vec<Coordinate>; AdjacencyKind::COUNT],
}

impl TileState {
    /// Creates an empty, zeroed state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Zeroes every counter, clears all neighbour lists and marks the cell empty.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Coordinates of the neighbours recorded for the provided category.
    #[must_use]
    pub fn nearby(&self, kind: AdjacencyKind) -> &[Coordinate] {
        &self.nearby[kind.index()]
    }

    /// Reports whether at least one neighbour of the category is recorded.
    #[must_use]
    pub fn has_nearby(&self, kind: AdjacencyKind) -> bool {
        !self.nearby[kind.index()].is_empty()
    }

    /// Replaces the neighbour list recorded for the provided category.
    pub fn set_nearby(&mut self, kind: AdjacencyKind, cells: Vec<Coordinate>) {
        self.nearby[kind.index()] = cells;
    }

    /// Reports whether the state is indistinguishable from a freshly reset one.
    #[must_use]
    pub fn is_zeroed(&self) -> bool {
        self.health == 0.0
            && self.level == 0
            && self.population == 0
            && self.jobs == 0
            && self.resource_production_rate == 0
            && self.resource_consumption_rate == 0
            && self.nearby.iter().all(Vec::is_empty)
    }
}

/// Identifier of a renderable placeholder owned by the host's visual factory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VisualId(u32);

impl VisualId {
    /// Creates a new visual identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Rendering mode a visual factory should apply to a placeholder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Appearance {
    /// Semi-transparent candidate that fits the hovered location.
    Preview,
    /// Candidate tinted to signal that the hovered location is unavailable.
    Invalid,
    /// Opaque committed building.
    Solid,
}

/// World-space position a placeholder should be moved to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    /// Position along the world `x` axis.
    pub x: f32,
    /// Height above the grid plane.
    pub y: f32,
    /// Position along the world `z` axis.
    pub z: f32,
}

impl Anchor {
    /// Creates a new anchor from explicit components.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Reasons a placement or cell mutation may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// The requested footprint extends beyond the grid.
    #[error("footprint extends beyond the grid")]
    OutOfBounds,
    /// No preview is attached to the cell.
    #[error("no preview attached")]
    NoPreview,
    /// The cell is not hovered by the pointer.
    #[error("cell is not hovered")]
    NotHovered,
    /// The cell already holds a tile.
    #[error("cell is occupied")]
    Occupied,
    /// The cell belongs to another placement's chain.
    #[error("cell is chained to another placement")]
    Chained,
    /// The cell holds no placed tile to act upon.
    #[error("no tile placed on cell")]
    NotPlaced,
    /// Neighbour data cannot be attached to an empty cell.
    #[error("cell is empty")]
    EmptyCell,
}

/// Failure to resolve a catalog entry.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LookupError {
    /// No entry with the identifier exists.
    #[error("unknown tile meta `{0}`")]
    NotFound(String),
}

/// Synchronous lookup of catalog entries by identifier.
pub trait MetaProvider {
    /// Resolves the entry registered under `id`.
    fn lookup(&self, id: &str) -> Result<Arc<TileMeta>, LookupError>;
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the active placement preview with a new candidate.
    SetPreviewTile {
        /// Catalog entry proposed for placement.
        meta: Arc<TileMeta>,
    },
    /// Per-tick pointer interaction with the grid.
    Interact {
        /// Cell resolved under the pointer, if any.
        hit: Option<Coordinate>,
        /// Whether the primary action fired this tick.
        confirm: bool,
    },
    /// Sets the hover flag across the chain containing the cell.
    SetChainHovered {
        /// Any member of the chain.
        cell: Coordinate,
        /// Flag value to apply.
        hovered: bool,
    },
    /// Sets the selection flag across the chain containing the cell.
    SetChainSelected {
        /// Any member of the chain.
        cell: Coordinate,
        /// Flag value to apply.
        selected: bool,
    },
    /// Clears the placement covering the cell.
    Demolish {
        /// Any member of the placement.
        cell: Coordinate,
    },
    /// Marks the placement covering the cell as destroyed.
    Destroy {
        /// Any member of the placement.
        cell: Coordinate,
    },
    /// Replaces neighbour data computed by an external scanner.
    SetNearby {
        /// Cell whose state receives the list.
        cell: Coordinate,
        /// Category of the neighbours.
        kind: AdjacencyKind,
        /// Coordinates of the neighbours.
        nearby: Vec<Coordinate>,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// The hovered cell changed.
    HoverChanged {
        /// Previously hovered cell.
        from: Option<Coordinate>,
        /// Newly hovered cell.
        to: Option<Coordinate>,
    },
    /// The selected cell changed.
    SelectionChanged {
        /// Previously selected cell.
        from: Option<Coordinate>,
        /// Newly selected cell.
        to: Coordinate,
    },
    /// A placeholder must be created for a new preview.
    PreviewSpawned {
        /// Identifier allocated to the placeholder.
        visual: VisualId,
        /// Catalog entry the placeholder represents.
        meta_id: String,
        /// Initial rendering mode.
        appearance: Appearance,
    },
    /// A placeholder must be moved to a new anchor.
    PreviewMoved {
        /// Placeholder to move.
        visual: VisualId,
        /// Destination in world space.
        anchor: Anchor,
    },
    /// The validity tint of the preview changed.
    PreviewValidityChanged {
        /// Placeholder to tint.
        visual: VisualId,
        /// Rendering mode to apply.
        appearance: Appearance,
    },
    /// The preview placeholder became a committed building.
    PreviewCommitted {
        /// Placeholder that now renders solid.
        visual: VisualId,
        /// Anchor cell owning the building.
        at: Coordinate,
    },
    /// The preview placeholder was discarded.
    PreviewDestroyed {
        /// Placeholder to release.
        visual: VisualId,
    },
    /// A placement was committed.
    TilePlaced {
        /// Cell owning the meta and the chain.
        anchor: Coordinate,
        /// Catalog entry placed.
        meta_id: String,
        /// Chained cells beneath the anchor.
        members: Vec<Coordinate>,
    },
    /// A placement attempt was rejected without mutating the grid.
    PlacementRejected {
        /// Cell the attempt targeted.
        at: Coordinate,
        /// Reason for the rejection.
        reason: PlacementError,
    },
    /// Cells were returned to the empty state.
    TileDemolished {
        /// Cells that were cleared.
        cells: Vec<Coordinate>,
    },
    /// Cells were marked as destroyed.
    TileDestroyed {
        /// Cells that were destroyed.
        cells: Vec<Coordinate>,
    },
    /// A committed building placeholder must be released.
    VisualDestroyed {
        /// Placeholder to release.
        visual: VisualId,
    },
}
