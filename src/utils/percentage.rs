use std::{fmt::Display, ops::Deref, time::Duration};

/// Whole percentage in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Percentage(u8);

impl Percentage {
    pub const FULL: Percentage = Percentage(100);
    pub const EMPTY: Percentage = Percentage(0);

    pub fn new_opt(value: u8) -> Option<Percentage> {
        if value > 100 {
            None
        } else {
            Some(Percentage(value))
        }
    }

    /// Fraction of `width` covered by this percentage, rounded down.
    pub fn of(self, width: u16) -> u16 {
        (u32::from(width) * u32::from(self.0) / 100) as u16
    }
}

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl Deref for Percentage {
    type Target = u8;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Share of `whole` that is still left after `value` has passed:
/// `100 - floor(value * 100 / whole)`, saturating at 0.
pub fn remaining_percentage(value: Duration, whole: Duration) -> Percentage {
    if whole.is_zero() {
        return Percentage::EMPTY;
    }
    let spent = value.as_nanos() * 100 / whole.as_nanos();
    Percentage(100 - spent.min(100) as u8)
}
