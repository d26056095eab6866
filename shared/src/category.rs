//! Bubble categories: point value and spawn weight per tier.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../renderer/src/generated/")]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Tier1,
    Tier2,
    Tier3,
    Tier4,
    Tier5,
}

impl Category {
    /// Every category, in cumulative-weight order.
    pub const ALL: [Category; 5] = [
        Category::Tier1,
        Category::Tier2,
        Category::Tier3,
        Category::Tier4,
        Category::Tier5,
    ];

    /// Base points awarded for popping a bubble of this category.
    pub fn points(self) -> u32 {
        match self {
            Category::Tier1 => 1,
            Category::Tier2 => 2,
            Category::Tier3 => 5,
            Category::Tier4 => 8,
            Category::Tier5 => 10,
        }
    }

    /// Relative spawn probability mass.
    pub fn weight(self) -> u32 {
        match self {
            Category::Tier1 => 40,
            Category::Tier2 => 30,
            Category::Tier3 => 15,
            Category::Tier4 => 10,
            Category::Tier5 => 5,
        }
    }

    /// Sum of all spawn weights.
    pub fn total_weight() -> u32 {
        Self::ALL.iter().map(|c| c.weight()).sum()
    }

    /// Map a draw in `0..total_weight()` to a category by cumulative ranges.
    /// Draws past the end clamp to the last tier.
    pub fn from_weight_draw(draw: u32) -> Category {
        let mut upper = 0;
        for category in Self::ALL {
            upper += category.weight();
            if draw < upper {
                return category;
            }
        }
        Category::Tier5
    }
}
