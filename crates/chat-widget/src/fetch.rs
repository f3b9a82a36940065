//! Pagination fetch state machine.
//!
//! Each paginated collection carries one of these. It collapses the usual
//! pair of booleans (`is_fetching`, `reached_end`) into a single state so the
//! two concurrent-fetch bugs they invite (double fire, fetch past the end)
//! cannot be expressed.

/// State of one paginated fetch channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchState {
    /// No fetch running; more pages may exist.
    #[default]
    Idle,
    /// A fetch is running; further requests are ignored.
    InFlight,
    /// The store returned a short page; there is nothing left to fetch.
    Exhausted,
}

impl FetchState {
    /// Try to start a fetch. Returns `true` and moves to [`FetchState::InFlight`]
    /// only from [`FetchState::Idle`].
    pub fn try_begin(&mut self) -> bool {
        match self {
            FetchState::Idle => {
                *self = FetchState::InFlight;
                true
            }
            FetchState::InFlight | FetchState::Exhausted => false,
        }
    }

    /// Finish the in-flight fetch. A short page pins the state to
    /// [`FetchState::Exhausted`]; otherwise it returns to idle.
    pub fn finish(&mut self, exhausted: bool) {
        *self = if exhausted {
            FetchState::Exhausted
        } else {
            FetchState::Idle
        };
    }

    /// Forget everything; the next [`try_begin`](Self::try_begin) succeeds.
    pub fn reset(&mut self) {
        *self = FetchState::Idle;
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, FetchState::Exhausted)
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self, FetchState::InFlight)
    }
}
