//! Layer registry, completion tracking and the layer-toggle control.

use crate::map::LayerId;

/// Monotonic count of datasets that have reported, success or failure
#[derive(Debug)]
pub struct CompletionTracker {
    reported: usize,
    expected: usize,
}

impl CompletionTracker {
    pub fn new(expected: usize) -> Self {
        Self { reported: 0, expected }
    }

    /// Count one report. Returns true on exactly the call that reaches the expected total.
    pub fn record(&mut self) -> bool {
        if self.reported >= self.expected {
            return false;
        }
        self.reported += 1;
        self.reported == self.expected
    }

    pub fn reported(&self) -> usize {
        self.reported
    }

    pub fn expected(&self) -> usize {
        self.expected
    }

    pub fn is_complete(&self) -> bool {
        self.reported == self.expected
    }
}

/// Overlays registered for the toggle control, in registration order
#[derive(Debug, Default)]
pub struct LayerRegistry {
    entries: Vec<(String, LayerId)>,
}

impl LayerRegistry {
    pub fn register(&mut self, name: impl Into<String>, layer: LayerId) {
        self.entries.push((name.into(), layer));
    }

    pub fn entries(&self) -> &[(String, LayerId)] {
        &self.entries
    }
}

/// The layer-toggle control: one base layer and the overlays that loaded
#[derive(Clone, Debug, PartialEq)]
pub struct LayerControl {
    pub base: String,
    pub overlays: Vec<(String, LayerId)>,
    pub collapsed: bool,
}

impl LayerControl {
    pub fn build(base: &str, registry: &LayerRegistry) -> Self {
        Self {
            base: base.to_string(),
            overlays: registry.entries().to_vec(),
            collapsed: true,
        }
    }

    /// Overlay at a 1-based position in the control
    pub fn overlay(&self, position: usize) -> Option<LayerId> {
        position
            .checked_sub(1)
            .and_then(|idx| self.overlays.get(idx))
            .map(|(_, id)| *id)
    }

    pub fn toggle_collapsed(&mut self) {
        self.collapsed = !self.collapsed;
    }
}
