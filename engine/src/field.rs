use crate::bubble::{Bubble, BubbleId, BubbleIds};
use crate::placement::PlacementEngine;
use crate::vec2::{FieldSize, Vec2};
use rand::Rng;

/// What one lifecycle tick did to the field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldTick {
    pub expired: Vec<BubbleId>,
    pub spawned: usize,
}

/// Authoritative set of live bubbles.
pub struct BubbleField {
    size: FieldSize,
    target: usize,
    bubbles: Vec<Bubble>,
    placement: PlacementEngine,
    ids: BubbleIds,
}

impl BubbleField {
    pub fn new(size: FieldSize, target: usize, placement: PlacementEngine) -> Self {
        Self {
            size,
            target,
            bubbles: Vec::new(),
            placement,
            ids: BubbleIds::new(),
        }
    }

    pub fn size(&self) -> FieldSize {
        self.size
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn len(&self) -> usize {
        self.bubbles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }

    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    pub fn get(&self, id: BubbleId) -> Option<&Bubble> {
        self.bubbles.iter().find(|b| b.id == id)
    }

    /// Top the field up to its target. Returns how many were added.
    pub fn populate(&mut self, rng: &mut impl Rng) -> usize {
        let wanted = self.target.saturating_sub(self.bubbles.len());
        let placed = self
            .placement
            .place(wanted, self.size, &self.bubbles, &mut self.ids, rng);
        let added = placed.bubbles.len();
        self.bubbles.extend(placed.bubbles);
        added
    }

    /// Age every bubble, drop the expired ones and refill around the
    /// survivors. The live set is swapped in one step.
    pub fn tick(&mut self, rng: &mut impl Rng) -> FieldTick {
        let mut expired = Vec::new();
        let mut survivors = Vec::with_capacity(self.target);
        for bubble in self.bubbles.drain(..) {
            let id = bubble.id;
            match bubble.aged() {
                Some(b) => survivors.push(b),
                None => expired.push(id),
            }
        }

        let wanted = self.target.saturating_sub(survivors.len());
        let placed = self
            .placement
            .place(wanted, self.size, &survivors, &mut self.ids, rng);
        let spawned = placed.bubbles.len();
        survivors.extend(placed.bubbles);
        self.bubbles = survivors;

        FieldTick { expired, spawned }
    }

    /// Remove one bubble. Absent ids are a no-op.
    pub fn remove(&mut self, id: BubbleId) -> Option<Bubble> {
        let idx = self.bubbles.iter().position(|b| b.id == id)?;
        Some(self.bubbles.remove(idx))
    }

    /// Ask for exactly one replacement, excluding the current live set.
    /// Never pushes the field past its target.
    pub fn refill_one(&mut self, rng: &mut impl Rng) -> Option<BubbleId> {
        if self.bubbles.len() >= self.target {
            return None;
        }
        let placed = self
            .placement
            .place(1, self.size, &self.bubbles, &mut self.ids, rng);
        let bubble = placed.bubbles.into_iter().next()?;
        let id = bubble.id;
        self.bubbles.push(bubble);
        Some(id)
    }

    /// Only future placements see the new bounds; live bubbles stay put even
    /// if they now poke past the margin.
    pub fn resize(&mut self, size: FieldSize) {
        self.size = size;
    }

    /// First bubble whose disc contains the point.
    pub fn hit_test(&self, point: Vec2) -> Option<BubbleId> {
        self.bubbles.iter().find(|b| b.contains(point)).map(|b| b.id)
    }

    /// Drop every bubble. Ids keep counting so a late pop aimed at an old
    /// bubble cannot hit a new one.
    pub fn clear(&mut self) {
        self.bubbles.clear();
    }

    /// Change the target for the next refill.
    pub fn set_target(&mut self, target: usize) {
        self.target = target;
    }
}
