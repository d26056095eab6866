use crate::category::Category;
use crate::vec2::{distance, Vec2};

/// Opaque bubble identifier. Never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BubbleId(pub u64);

/// Hands out fresh ids. Monotonic, so an id can never come back.
#[derive(Debug, Clone)]
pub struct BubbleIds {
    next: u64,
}

impl BubbleIds {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn next_id(&mut self) -> BubbleId {
        let id = BubbleId(self.next);
        self.next += 1;
        id
    }
}

impl Default for BubbleIds {
    fn default() -> Self {
        Self::new()
    }
}

/// A stationary circular target.
#[derive(Debug, Clone, PartialEq)]
pub struct Bubble {
    pub id: BubbleId,
    pub category: Category,
    pub radius: f64,
    pub pos: Vec2,
    remaining_lifespan: u32,
}

impl Bubble {
    /// A zero lifespan is bumped to one tick so a live bubble never reads 0.
    pub fn new(id: BubbleId, category: Category, radius: f64, pos: Vec2, lifespan: u32) -> Self {
        Self {
            id,
            category,
            radius,
            pos,
            remaining_lifespan: lifespan.max(1),
        }
    }

    pub fn remaining_lifespan(&self) -> u32 {
        self.remaining_lifespan
    }

    /// Age by one tick. Returns the bubble if it is still alive.
    pub fn aged(mut self) -> Option<Self> {
        if self.remaining_lifespan <= 1 {
            None
        } else {
            self.remaining_lifespan -= 1;
            Some(self)
        }
    }

    /// Strict overlap: touching circles do not overlap.
    pub fn overlaps(&self, pos: Vec2, radius: f64) -> bool {
        distance(self.pos, pos) < self.radius + radius
    }

    /// Hit test for a tap. The boundary counts as a hit.
    pub fn contains(&self, point: Vec2) -> bool {
        distance(self.pos, point) <= self.radius
    }
}
