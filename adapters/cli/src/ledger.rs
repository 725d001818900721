use std::collections::BTreeMap;

use gaius_core::{Anchor, Appearance, Event, VisualId};
use tracing::{debug, info};

/// Placeholder tracked by the ledger.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Visual {
    pub(crate) meta_id: String,
    pub(crate) appearance: Appearance,
    pub(crate) anchor: Option<Anchor>,
}

/// Visual factory that records placeholders instead of rendering them.
#[derive(Debug, Default)]
pub(crate) struct VisualLedger {
    visuals: BTreeMap<VisualId, Visual>,
}

impl VisualLedger {
    /// Applies the visual side effects carried by `events`.
    pub(crate) fn observe(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::PreviewSpawned {
                    visual,
                    meta_id,
                    appearance,
                } => {
                    debug!(visual = visual.get(), %meta_id, ?appearance, "visual spawned");
                    let _ = self.visuals.insert(
                        *visual,
                        Visual {
                            meta_id: meta_id.clone(),
                            appearance: *appearance,
                            anchor: None,
                        },
                    );
                }
                Event::PreviewMoved { visual, anchor } => {
                    if let Some(entry) = self.visuals.get_mut(visual) {
                        entry.anchor = Some(*anchor);
                    }
                }
                Event::PreviewValidityChanged { visual, appearance } => {
                    if let Some(entry) = self.visuals.get_mut(visual) {
                        entry.appearance = *appearance;
                    }
                }
                Event::PreviewCommitted { visual, at } => {
                    if let Some(entry) = self.visuals.get_mut(visual) {
                        entry.appearance = Appearance::Solid;
                        info!(visual = visual.get(), meta_id = %entry.meta_id, ?at, "visual committed");
                    }
                }
                Event::PreviewDestroyed { visual } | Event::VisualDestroyed { visual } => {
                    if self.visuals.remove(visual).is_some() {
                        debug!(visual = visual.get(), "visual released");
                    }
                }
                _ => {}
            }
        }
    }

    /// Live placeholders in allocation order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (VisualId, &Visual)> {
        self.visuals.iter().map(|(visual, entry)| (*visual, entry))
    }

    /// Number of committed buildings currently rendered.
    pub(crate) fn solid_count(&self) -> usize {
        self.visuals
            .values()
            .filter(|visual| visual.appearance == Appearance::Solid)
            .count()
    }

    /// Number of live placeholders of any kind.
    pub(crate) fn len(&self) -> usize {
        self.visuals.len()
    }
}
