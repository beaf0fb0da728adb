use std::collections::BTreeMap;

use crate::instruments::Voice;
use crate::shape::ShapeId;

/// Live voices keyed by the shape they belong to. At most one per shape.
#[derive(Debug, Default)]
pub struct VoiceRegistry {
    voices: BTreeMap<ShapeId, Voice>,
}

impl VoiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `voice` for its shape. An existing entry is never replaced;
    /// returns `false` in that case.
    pub fn register(&mut self, voice: Voice) -> bool {
        if self.voices.contains_key(&voice.shape()) {
            return false;
        }
        self.voices.insert(voice.shape(), voice);
        true
    }

    pub fn contains(&self, shape: ShapeId) -> bool {
        self.voices.contains_key(&shape)
    }

    pub fn get(&self, shape: ShapeId) -> Option<&Voice> {
        self.voices.get(&shape)
    }

    pub fn remove(&mut self, shape: ShapeId) -> Option<Voice> {
        self.voices.remove(&shape)
    }

    /// Shapes with a registered voice that fail `is_live`.
    pub fn orphans<F: Fn(ShapeId) -> bool>(&self, is_live: F) -> Vec<ShapeId> {
        self.voices
            .keys()
            .copied()
            .filter(|&shape| !is_live(shape))
            .collect()
    }

    /// Remove and return every voice.
    pub fn drain(&mut self) -> Vec<Voice> {
        std::mem::take(&mut self.voices).into_values().collect()
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Voice> {
        self.voices.values()
    }
}
