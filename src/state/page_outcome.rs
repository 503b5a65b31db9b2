//! Terminal outcomes of a listing page task

use crate::TransportError;
use std::fmt;

/// How a single listing page task ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageOutcome {
    /// Page fetched and yielded at least one item
    Processed,

    /// Page fetched but no item could be extracted
    Empty,

    /// Server answered with a non-retryable status (e.g. 404)
    Rejected,

    /// Retries ran out on a retryable status or connection error
    Exhausted,
}

impl PageOutcome {
    /// Returns true if the page contributed items to the run
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Processed)
    }

    /// Returns true if the page could not be fetched at all
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Rejected | Self::Exhausted)
    }

    /// Short lowercase label used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processed => "processed",
            Self::Empty => "empty",
            Self::Rejected => "rejected",
            Self::Exhausted => "exhausted",
        }
    }
}

impl From<&TransportError> for PageOutcome {
    fn from(error: &TransportError) -> Self {
        match error {
            TransportError::Rejected { .. } => Self::Rejected,
            TransportError::Exhausted { .. } => Self::Exhausted,
        }
    }
}

impl fmt::Display for PageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
