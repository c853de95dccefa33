use chrono::{DateTime, Duration, Utc};

/// Where submission timestamps come from.
///
/// Production code uses the wall clock; tests pin it so ledger ordering is
/// reproducible.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Wall,
    Pinned(DateTime<Utc>),
}

impl Clock {
    #[must_use]
    pub fn pinned(at: DateTime<Utc>) -> Self {
        Self::Pinned(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Wall => Utc::now(),
            Clock::Pinned(at) => *at,
        }
    }

    /// Moves a pinned clock forward; the wall clock ignores this.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Pinned(at) = self {
            *at += delta;
        }
    }
}

/// 2023-11-14T22:13:20Z, in seconds since the epoch.
const TEST_EPOCH_SECS: i64 = 1_700_000_000;

/// The instant every pinned test clock starts at.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::UNIX_EPOCH + Duration::seconds(TEST_EPOCH_SECS)
}

#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::pinned(fixed_now())
}
