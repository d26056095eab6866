use crate::bubble::{Bubble, BubbleIds};
use crate::category::Category;
use crate::vec2::{FieldSize, Vec2};
use bubblepop_shared::config::PlacementConfig;
use rand::Rng;

/// Area bubble circles must stay inside: the field shrunk by the margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafeRect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl SafeRect {
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Whether a circle lies fully inside.
    pub fn contains_circle(&self, pos: Vec2, radius: f64) -> bool {
        pos.x - radius >= self.left
            && pos.x + radius <= self.right
            && pos.y - radius >= self.top
            && pos.y + radius <= self.bottom
    }
}

/// Result of one placement call.
#[derive(Debug, Clone)]
pub struct Placement {
    pub bubbles: Vec<Bubble>,
    /// Sampling iterations consumed, never above the attempt budget
    pub attempts: u32,
}

impl Placement {
    fn empty() -> Self {
        Self {
            bubbles: Vec::new(),
            attempts: 0,
        }
    }
}

/// Rejection-sampling bubble placer.
/// Stateless apart from its tuning; occupants and bounds come in per call.
#[derive(Debug, Clone)]
pub struct PlacementEngine {
    config: PlacementConfig,
}

impl PlacementEngine {
    pub fn new(config: PlacementConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    /// Safe rectangle for a field, or None when it cannot fit even one
    /// minimum-size bubble.
    pub fn safe_rect(&self, size: FieldSize) -> Option<SafeRect> {
        if size.is_degenerate() {
            return None;
        }
        let m = self.config.margin;
        let rect = SafeRect {
            left: m,
            top: m,
            right: size.width - m,
            bottom: size.height - m,
        };
        let min_span = 2.0 * self.config.min_radius;
        if rect.width() < min_span || rect.height() < min_span {
            return None;
        }
        Some(rect)
    }

    /// Largest radius allowed for this rectangle, clamped to [floor, cap].
    pub fn max_radius(&self, rect: &SafeRect) -> f64 {
        let scaled = rect.width().min(rect.height()) / self.config.radius_divisor;
        scaled.min(self.config.max_radius).max(self.config.min_radius)
    }

    /// Place up to `count` new bubbles that overlap neither `existing` nor
    /// each other. One attempt budget covers the whole call, so the result
    /// may be short when the field is crowded.
    pub fn place(
        &self,
        count: usize,
        size: FieldSize,
        existing: &[Bubble],
        ids: &mut BubbleIds,
        rng: &mut impl Rng,
    ) -> Placement {
        if count == 0 {
            return Placement::empty();
        }
        let Some(rect) = self.safe_rect(size) else {
            tracing::debug!(
                "Field {}x{} too small for bubbles",
                size.width,
                size.height
            );
            return Placement::empty();
        };

        let min_radius = self.config.min_radius;
        let max_radius = self.max_radius(&rect);
        let mut placed: Vec<Bubble> = Vec::with_capacity(count);
        let mut attempts = 0;

        while placed.len() < count && attempts < self.config.attempt_budget {
            attempts += 1;

            let category = sample_category(rng);
            let radius = sample_span(rng, min_radius, max_radius);
            let pos = Vec2::new(
                sample_span(rng, rect.left + radius, rect.right - radius),
                sample_span(rng, rect.top + radius, rect.bottom - radius),
            );

            // Float rounding can push an edge sample a hair outside.
            if !rect.contains_circle(pos, radius) {
                continue;
            }

            let blocked = existing
                .iter()
                .chain(placed.iter())
                .any(|b| b.overlaps(pos, radius));
            if blocked {
                continue;
            }

            let lifespan = rng.gen_range(self.config.lifespan_min..=self.config.lifespan_max);
            placed.push(Bubble::new(ids.next_id(), category, radius, pos, lifespan));
        }

        if placed.len() < count {
            tracing::debug!(
                "Placed {}/{} bubbles in {} attempts",
                placed.len(),
                count,
                attempts
            );
        }

        Placement {
            bubbles: placed,
            attempts,
        }
    }
}

impl Default for PlacementEngine {
    fn default() -> Self {
        Self::new(PlacementConfig::default())
    }
}

/// Weighted draw over the fixed category pool.
pub fn sample_category(rng: &mut impl Rng) -> Category {
    Category::from_weight_draw(rng.gen_range(0..Category::total_weight()))
}

/// Uniform in [lo, hi]; collapses to `lo` when the span is empty.
fn sample_span(rng: &mut impl Rng, lo: f64, hi: f64) -> f64 {
    if hi > lo {
        rng.gen_range(lo..=hi)
    } else {
        lo
    }
}
