use crate::category::Category;

/// Points for a pop that repeats the previous category: ceil(base * 1.5).
pub fn combo_points(base: u32) -> u32 {
    (base * 3).div_ceil(2)
}

/// Running score plus the category of the previous pop.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    score: u64,
    last_popped: Option<Category>,
}

impl ScoringEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn last_popped(&self) -> Option<Category> {
        self.last_popped
    }

    /// Points a pop of `category` would earn right now.
    pub fn points_for(&self, category: Category) -> u32 {
        let base = category.points();
        if self.last_popped == Some(category) {
            combo_points(base)
        } else {
            base
        }
    }

    /// Record a pop of a bubble confirmed live and return the points awarded.
    pub fn pop(&mut self, category: Category) -> u32 {
        let points = self.points_for(category);
        self.score += u64::from(points);
        self.last_popped = Some(category);
        points
    }

    pub fn reset(&mut self) {
        self.score = 0;
        self.last_popped = None;
    }
}
