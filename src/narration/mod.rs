//! Real-time narration: phrase composition, trigger timing, and the
//! session scheduler that ties them to live route progress (spec.md
//! §4.12-4.14).

pub mod phrase;
pub mod scheduler;
pub mod timing;

pub use phrase::{compose_curve_phrase, compose_straight_phrase};
pub use scheduler::{
    NarrationEvent, NarrationEventKind, NarrationScheduler, NarrationSink, PauseReason, SessionState,
};
pub use timing::compute_trigger_distance_m;
