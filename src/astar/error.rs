// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

/// Node expansions allowed by [SearchOptions::default](crate::SearchOptions).
/// Generous enough for a county-sized network.
pub const DEFAULT_STEP_LIMIT: usize = 1_000_000;

/// Failed route search between two segments.
///
/// A missing route is `Ok(None)`, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// A segment index is outside of the segment table, or a resumed
    /// search doesn't start at an endpoint of its segment.
    #[error("invalid segment: {0}")]
    InvalidReference(usize),

    /// More than [SearchOptions::step_limit](crate::SearchOptions::step_limit)
    /// endpoints were expanded without reaching the destination.
    #[error("step limit exceeded")]
    StepLimitExceeded,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(RouteError::InvalidReference(42).to_string(), "invalid segment: 42");
        assert_eq!(RouteError::StepLimitExceeded.to_string(), "step limit exceeded");
    }
}
