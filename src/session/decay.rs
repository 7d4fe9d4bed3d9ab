use std::time::Duration;

use crate::utils::percentage::{remaining_percentage, Percentage};

/// Inactivity window after which the writing is committed.
pub const DEPLETION_TIME: Duration = Duration::from_secs(8);

/// Colors the life bar goes through while it drains, violet to red.
pub const LIFE_COLORS: [(u8, u8, u8); 7] = [
    (148, 0, 211),
    (75, 0, 130),
    (0, 0, 255),
    (0, 255, 0),
    (255, 255, 0),
    (255, 165, 0),
    (255, 0, 0),
];

/// What the life bar currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifeBar {
    pub percentage: Percentage,
    /// Index into [LIFE_COLORS].
    pub color_index: usize,
}

impl LifeBar {
    pub const FULL: LifeBar = LifeBar {
        percentage: Percentage::FULL,
        color_index: 0,
    };

    pub fn color(&self) -> (u8, u8, u8) {
        LIFE_COLORS[self.color_index.min(LIFE_COLORS.len() - 1)]
    }
}

impl Default for LifeBar {
    fn default() -> Self {
        Self::FULL
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecayStep {
    Alive(LifeBar),
    Expired,
}

pub struct DecayEvaluator {
    threshold: Duration,
}

impl DecayEvaluator {
    pub fn new(threshold: Duration) -> Self {
        Self { threshold }
    }

    pub fn from_seconds(threshold_s: u64) -> Self {
        Self::new(Duration::from_secs(threshold_s))
    }

    /// Maps time since the last keystroke onto the life bar. Elapsed time is compared with full
    /// precision, so the writing expires as soon as the threshold is reached.
    pub fn evaluate(&self, elapsed: Duration) -> DecayStep {
        if elapsed >= self.threshold {
            return DecayStep::Expired;
        }
        let color_index = (elapsed.as_nanos() * LIFE_COLORS.len() as u128
            / self.threshold.as_nanos()) as usize;
        DecayStep::Alive(LifeBar {
            percentage: remaining_percentage(elapsed, self.threshold),
            color_index: color_index.min(LIFE_COLORS.len() - 1),
        })
    }
}

impl Default for DecayEvaluator {
    fn default() -> Self {
        Self::new(DEPLETION_TIME)
    }
}
