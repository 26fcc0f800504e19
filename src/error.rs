use std::fmt::{Display, Formatter};

/// Errors returned by [`crate::analyzer::analyze`].
///
/// These are caller bugs, not degraded data: the analyzer produces no
/// partial output when one of these fires.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyzeError {
    /// Fewer than 3 points were supplied, or fewer than 3 remained
    /// after resampling.
    RouteTooShort,
    /// A point failed basic sanity checks (NaN or out-of-range
    /// latitude/longitude).
    InvalidPoint { index: usize, reason: &'static str },
    /// A config value is non-positive where it must be positive, or
    /// otherwise internally inconsistent.
    InvalidConfig { reason: &'static str },
}

impl Display for AnalyzeError {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            AnalyzeError::RouteTooShort => {
                write!(f, "route has too few points to analyze")
            }
            AnalyzeError::InvalidPoint { index, reason } => {
                write!(f, "invalid point at index {}: {}", index, reason)
            }
            AnalyzeError::InvalidConfig { reason } => {
                write!(f, "invalid analysis config: {}", reason)
            }
        }
    }
}

impl std::error::Error for AnalyzeError {}

/// Runtime signals the scheduler reports to its listener. Unlike
/// [`AnalyzeError`], these are not failures — they are data about the
/// state of the drive (off-route, a silent GPS source, a sink that
/// failed to speak) and the scheduler keeps running after each one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerSignal {
    OffRoute,
    BackOnRoute,
    GpsTimeout,
    SinkFailure,
}

impl Display for SchedulerSignal {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            SchedulerSignal::OffRoute => write!(f, "off route"),
            SchedulerSignal::BackOnRoute => write!(f, "back on route"),
            SchedulerSignal::GpsTimeout => write!(f, "no GPS fix for 10s"),
            SchedulerSignal::SinkFailure => write!(f, "speech sink failed"),
        }
    }
}
