//! Movement-cost tiers for path previews and the post-move chat summary.

use std::fmt;

/// RGB overlay color.
pub type Rgb = [u8; 3];

/// How a path length compares to an entity's available movement.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CostTier {
    /// Within the entity's movement.
    WithinRange,
    /// Within twice the entity's movement.
    Dash,
    /// Beyond twice the entity's movement.
    OverDouble,
    /// The entity has no trackable movement value.
    Untracked,
}

impl CostTier {
    /// Classifies `distance` against `movement`. Boundaries are inclusive.
    pub fn classify(distance: f64, movement: Option<f64>) -> Self {
        match movement {
            Some(m) if m.is_finite() && m >= 0.0 => {
                if distance <= m {
                    CostTier::WithinRange
                } else if distance <= m * 2.0 {
                    CostTier::Dash
                } else {
                    CostTier::OverDouble
                }
            }
            _ => CostTier::Untracked,
        }
    }

    /// Overlay color for this tier.
    pub fn color(&self) -> Rgb {
        match self {
            CostTier::WithinRange => [0x4c, 0xaf, 0x50],
            CostTier::Dash => [0xff, 0xc1, 0x07],
            CostTier::OverDouble => [0xf4, 0x43, 0x36],
            CostTier::Untracked => [0x21, 0x96, 0xf3],
        }
    }
}

/// Chat summary of a completed move.
#[derive(Debug, Clone, PartialEq)]
pub struct MovementSummary {
    pub entity_name: String,
    pub distance: f64,
    pub units: String,
    pub movement: Option<f64>,
}

impl MovementSummary {
    pub fn tier(&self) -> CostTier {
        CostTier::classify(self.distance, self.movement)
    }
}

impl fmt::Display for MovementSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} moved {} {}", self.entity_name, format_distance(self.distance), self.units)?;
        match self.movement {
            Some(m) if self.distance <= m => {
                write!(f, " ({} {} remaining)", format_distance(m - self.distance), self.units)
            }
            Some(m) => write!(f, " ({} {} over movement)", format_distance(self.distance - m), self.units),
            None => Ok(()),
        }
    }
}

/// Formats a game distance to one decimal, dropping a trailing `.0`:
/// 15.0 -> "15", 7.5 -> "7.5", 21.2132 -> "21.2".
pub fn format_distance(value: f64) -> String {
    let text = format!("{:.1}", value);
    match text.strip_suffix(".0") {
        Some(whole) => whole.to_string(),
        None => text,
    }
}
