use std::fmt::{self, Display};

/// Remaining cooldown, in minutes rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct WaitTime(f64);

impl WaitTime {
    pub(super) fn from_seconds(seconds: f64) -> Self {
        let minutes = (seconds / 60.0 * 100.0).round() / 100.0;
        // never report "wait 0 minutes" while the user is still blocked
        Self(minutes.max(0.01))
    }

    pub fn minutes(&self) -> f64 {
        self.0
    }
}

impl Display for WaitTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
