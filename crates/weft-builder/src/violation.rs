use std::panic::Location;

use text_size::TextSize;
use thiserror::Error;

/// Where a marker was allocated.
pub type Site = &'static Location<'static>;

/// Misuse of the marker protocol by the parser.
///
/// Unlike syntax errors these are bugs in the parser: the first one recorded
/// makes tree construction fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
    #[error("marker allocated at {site} was never completed")]
    Unterminated { site: Site },
    #[error("cannot {action} marker allocated at {site}: marker allocated at {child} is still open")]
    OpenChild { site: Site, child: Site, action: &'static str },
    #[error("cannot complete marker allocated at {site} before marker allocated at {before}: {reason}")]
    InvalidDoneBefore { site: Site, before: Site, reason: &'static str },
    #[error("marker allocated at {site} crosses marker allocated at {other}")]
    CrossingMarkers { site: Site, other: Site },
    #[error("marker allocated at {site} was used after it was {state}")]
    StaleMarker { site: Site, state: &'static str },
    #[error("no marker was produced")]
    NoRoot,
    #[error("marker allocated at {site} is a second root")]
    MultipleRoots { site: Site },
    #[error("significant token at {offset:?} is outside the root marker")]
    TokensOutsideRoot { offset: TextSize },
}
