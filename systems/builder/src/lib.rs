#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure builder system that turns per-tick pointer and hotkey input into world commands.

use std::collections::BTreeMap;

use gaius_core::{Command, Coordinate, LookupError, MetaProvider};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Keys the host forwards to pick a preview tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Hotkey {
    /// The `Z` key.
    Z,
    /// The `X` key.
    X,
    /// The `C` key.
    C,
    /// The `V` key.
    V,
}

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuilderInput {
    /// Cell resolved under the pointer, if any.
    pub cursor_cell: Option<Coordinate>,
    /// Indicates whether the player pressed the primary action on this frame.
    pub confirm_action: bool,
    /// Preview hotkey pressed on this frame.
    pub hotkey: Option<Hotkey>,
}

impl BuilderInput {
    /// Creates a new input descriptor with explicit field values.
    #[must_use]
    pub const fn new(
        cursor_cell: Option<Coordinate>,
        confirm_action: bool,
        hotkey: Option<Hotkey>,
    ) -> Self {
        Self {
            cursor_cell,
            confirm_action,
            hotkey,
        }
    }
}

/// Builder system that maps hotkeys to catalog entries and forwards pointer interaction.
#[derive(Debug, Clone)]
pub struct Builder {
    bindings: BTreeMap<Hotkey, String>,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
            .with_binding(Hotkey::Z, "HOUSE")
            .with_binding(Hotkey::X, "WATER_SOURCE")
    }
}

impl Builder {
    /// Creates a builder without hotkey bindings.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bindings: BTreeMap::new(),
        }
    }

    /// Returns the builder with `hotkey` bound to the catalog entry `meta_id`.
    #[must_use]
    pub fn with_binding(mut self, hotkey: Hotkey, meta_id: impl Into<String>) -> Self {
        let _ = self.bindings.insert(hotkey, meta_id.into());
        self
    }

    /// Catalog entry bound to `hotkey`.
    #[must_use]
    pub fn binding(&self, hotkey: Hotkey) -> Option<&str> {
        self.bindings.get(&hotkey).map(String::as_str)
    }

    /// Translates one tick of input into world commands.
    ///
    /// A bound hotkey emits [`Command::SetPreviewTile`] ahead of the tick's
    /// [`Command::Interact`]. When the bound entry cannot be resolved no
    /// preview command is emitted, the interaction is still queued, and the
    /// lookup failure is returned so the caller never places an unresolved
    /// entry.
    pub fn handle<P>(
        &mut self,
        input: BuilderInput,
        provider: &P,
        out: &mut Vec<Command>,
    ) -> Result<(), LookupError>
    where
        P: MetaProvider + ?Sized,
    {
        let mut outcome = Ok(());

        if let Some(meta_id) = input.hotkey.and_then(|hotkey| self.binding(hotkey)) {
            match provider.lookup(meta_id) {
                Ok(meta) => out.push(Command::SetPreviewTile { meta }),
                Err(error) => {
                    warn!(%error, "preview hotkey ignored");
                    outcome = Err(error);
                }
            }
        }

        out.push(Command::Interact {
            hit: input.cursor_cell,
            confirm: input.confirm_action,
        });

        outcome
    }
}
