use std::fmt;

/// Negotiation state of one peer link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkState {
    Idle,
    Offering,
    AnswerPending,
    Connected,
    Closed,
}

impl LinkState {
    /// States in which candidates from the remote side are still of interest.
    pub fn accepts_candidates(&self) -> bool {
        !matches!(self, LinkState::Closed)
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
