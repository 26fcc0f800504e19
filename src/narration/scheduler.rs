//! Narration scheduler (spec.md §4.14): turns the analyzed route plus
//! live route-progress updates into an ordered stream of narration
//! events to speak.
//!
//! # Architecture
//! The scheduler owns no I/O — it is driven by [`crate::map_match`]
//! progress updates on one side and a listener on the other, the same
//! separation the teacher draws between sensor readers and the EKF
//! they feed. A caller wires GPS updates in through
//! [`NarrationScheduler::on_location_update`] and
//! [`NarrationScheduler::handle_signal`]; delivered events reach the
//! caller through a [`NarrationSink`] registered with
//! [`NarrationScheduler::set_listener`], and are also returned
//! directly from `on_location_update` as a convenience for callers
//! that would rather poll than implement a sink.
//!
//! # Session state machine
//! `Idle -> Playing <-> Paused -> Stopped`. `Stopped` is terminal —
//! a new scheduler is built for a new drive. Off-route and GPS-timeout
//! signals both pause playback; only an explicit `resume`, the
//! matching recovery signal, or (for a GPS timeout) the next location
//! update clears the corresponding latch.
//!
//! # Preemption and cooldown
//! A narration event preempts whatever is currently playing only if
//! its priority is strictly higher (spec.md §4.14). The interrupted
//! event is discarded, not re-queued. Once a curve or straight has
//! been announced, it is never announced again for the rest of the
//! drive. After `on_narration_complete`, a 400 ms cooldown delays the
//! next dequeue.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::config::{NarrationConfig, Verbosity};
use crate::error::SchedulerSignal;
use crate::narration::{phrase, timing};
use crate::segment::{RouteSegment, Severity};

/// How far ahead of route progress the scheduler looks for segments
/// to enqueue (spec.md §4.14 step 3).
const LOOKAHEAD_WINDOW_M: f64 = 1000.0;

/// Segments more than this far behind route progress are considered
/// passed and are no longer eligible (spec.md §4.14 step 2).
const PASSED_SLACK_M: f64 = 5.0;

const PRIORITY_SYSTEM: u8 = 10;
const PRIORITY_SPARSE_WARNING: u8 = 8;
const PRIORITY_STRAIGHT: u8 = 2;

const NARRATION_COOLDOWN: Duration = Duration::from_millis(400);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Playing,
    Paused,
    Stopped,
}

/// Why the session is currently paused, reported to the listener via
/// [`NarrationSink::on_paused`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseReason {
    UserRequested,
    OffRoute,
    GpsTimeout,
}

/// What kind of thing a [`NarrationEvent`] announces (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrationEventKind {
    Curve,
    Straight,
    SparseWarning,
    OffRoute,
    BackOnRoute,
    System,
}

/// A narration event (spec.md §3): a piece of text waiting to be
/// spoken, with a priority the scheduler uses for preemption.
#[derive(Debug, Clone, PartialEq)]
pub struct NarrationEvent {
    pub text: String,
    pub priority: u8,
    pub trigger_distance_m: f64,
    pub curve_identity: Option<(usize, usize)>,
    pub kind: NarrationEventKind,
    pub delivered: bool,
}

/// The listener the scheduler reports to (spec.md §6). External to
/// this crate: a real implementation wraps a speech sink and a UI.
pub trait NarrationSink {
    fn on_narration(&mut self, event: &NarrationEvent);
    fn on_interrupt(&mut self, event: &NarrationEvent);
    fn on_paused(&mut self, reason: PauseReason);
    fn on_resumed(&mut self);
}

/// Drives the narration event stream for one drive session.
pub struct NarrationScheduler {
    config: NarrationConfig,
    state: SessionState,
    queue: Vec<NarrationEvent>,
    announced_curves: HashSet<(usize, usize)>,
    announced_straights: HashSet<(usize, usize)>,
    announced_sparse_regions: HashSet<(usize, usize)>,
    currently_playing: Option<NarrationEvent>,
    muted: bool,
    off_route: bool,
    gps_timeout: bool,
    cooldown_until: Option<Instant>,
    listener: Option<Box<dyn NarrationSink>>,
}

impl NarrationScheduler {
    pub fn new(config: NarrationConfig) -> Self {
        Self {
            config,
            state: SessionState::Idle,
            queue: Vec::new(),
            announced_curves: HashSet::new(),
            announced_straights: HashSet::new(),
            announced_sparse_regions: HashSet::new(),
            currently_playing: None,
            muted: false,
            off_route: false,
            gps_timeout: false,
            cooldown_until: None,
            listener: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Registers the sink that receives delivered, interrupted, and
    /// pause/resume notifications. Replaces any previously registered
    /// listener.
    pub fn set_listener(&mut self, listener: Box<dyn NarrationSink>) {
        self.listener = Some(listener);
    }

    /// §4.15: accepts a fresh narration config without discarding
    /// queue state. Already-delivered identities remain delivered.
    pub fn update_config(&mut self, config: NarrationConfig) {
        self.config = config;
    }

    /// `Idle -> Playing`. A no-op once already playing.
    pub fn start(&mut self) {
        if self.state == SessionState::Idle {
            self.state = SessionState::Playing;
        }
    }

    /// Ends the session. Terminal: no further events will be
    /// scheduled or delivered.
    pub fn stop(&mut self) {
        self.interrupt_current();
        self.state = SessionState::Stopped;
        self.queue.clear();
    }

    pub fn pause(&mut self) {
        if self.state == SessionState::Playing {
            self.interrupt_current();
            self.state = SessionState::Paused;
            self.notify_paused(PauseReason::UserRequested);
        }
    }

    /// Resumes from a user-initiated pause. Does nothing if the pause
    /// is held by an unresolved off-route or GPS-timeout signal —
    /// those clear through [`NarrationScheduler::handle_signal`] or
    /// the next location update, not this call.
    pub fn resume(&mut self) {
        if self.state == SessionState::Paused && !self.off_route && !self.gps_timeout {
            self.state = SessionState::Playing;
            self.notify_resumed();
        }
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Reacts to a scheduler signal (spec.md §4.14): off-route and
    /// GPS-timeout both force a pause, interrupting whatever is
    /// in-flight; their recovery counterparts clear the corresponding
    /// latch and resume playback if nothing else is still holding the
    /// pause. A sink failure completes the current utterance as
    /// failed and applies the usual cooldown so the queue does not
    /// stall.
    pub fn handle_signal(&mut self, signal: SchedulerSignal) {
        match signal {
            SchedulerSignal::OffRoute => {
                if !self.off_route {
                    self.off_route = true;
                    self.interrupt_current();
                    if self.state == SessionState::Playing {
                        self.state = SessionState::Paused;
                    }
                    self.notify_paused(PauseReason::OffRoute);
                    self.deliver_immediate(NarrationEventKind::OffRoute, "Off route".to_string());
                }
            }
            SchedulerSignal::BackOnRoute => {
                if self.off_route {
                    self.off_route = false;
                    if self.state == SessionState::Paused && !self.gps_timeout {
                        self.state = SessionState::Playing;
                        self.notify_resumed();
                    }
                    self.deliver_immediate(NarrationEventKind::BackOnRoute, "Back on route".to_string());
                }
            }
            SchedulerSignal::GpsTimeout => {
                if !self.gps_timeout {
                    self.gps_timeout = true;
                    self.interrupt_current();
                    if self.state == SessionState::Playing {
                        self.state = SessionState::Paused;
                    }
                    self.notify_paused(PauseReason::GpsTimeout);
                }
            }
            SchedulerSignal::SinkFailure => {
                self.currently_playing = None;
                self.cooldown_until = Some(Instant::now() + NARRATION_COOLDOWN);
            }
        }
    }

    /// Scans `segments` for curves and (if configured) straights
    /// ahead of `route_progress_m` within the lookahead window, and
    /// enqueues the ones whose trigger distance has been reached.
    /// Also emits at most one sparse-data warning per contiguous
    /// low-confidence run of curves as it enters the window. Then
    /// attempts to deliver the highest-priority eligible event.
    ///
    /// A fix arriving clears a latched GPS timeout: receiving any
    /// update at all means the GPS source is alive again.
    pub fn on_location_update(
        &mut self,
        segments: &[RouteSegment],
        route_progress_m: f64,
        speed_ms: f64,
    ) -> Option<NarrationEvent> {
        if self.gps_timeout {
            self.gps_timeout = false;
            if self.state == SessionState::Paused && !self.off_route {
                self.state = SessionState::Playing;
                self.notify_resumed();
            }
        }

        self.queue.retain(|e| is_still_eligible(e, segments, route_progress_m));

        self.scan_curves_and_straights(segments, route_progress_m, speed_ms);
        self.scan_sparse_regions(segments, route_progress_m, speed_ms);

        self.try_deliver()
    }

    /// Invoked by the speech sink upon utterance end or error.
    /// Clears the in-flight slot and starts the 400 ms cooldown.
    pub fn on_narration_complete(&mut self) {
        self.currently_playing = None;
        self.cooldown_until = Some(Instant::now() + NARRATION_COOLDOWN);
    }

    fn scan_curves_and_straights(&mut self, segments: &[RouteSegment], route_progress_m: f64, speed_ms: f64) {
        for segment in segments {
            let distance_ahead = segment.distance_from_start_m() - route_progress_m;
            if distance_ahead < 0.0 || distance_ahead > LOOKAHEAD_WINDOW_M {
                continue;
            }

            match segment {
                RouteSegment::Curve(curve) => {
                    let identity = curve.identity();
                    if self.announced_curves.contains(&identity)
                        || self.queue.iter().any(|e| e.curve_identity == Some(identity))
                    {
                        continue;
                    }
                    if !self.passes_verbosity_filter(curve.severity, curve.compound_type.is_some()) {
                        continue;
                    }
                    let advisory = curve.advisory_speed_ms;
                    let trigger_distance_m = timing::compute_trigger_distance_m(speed_ms, advisory, &self.config);
                    if distance_ahead > trigger_distance_m {
                        continue;
                    }
                    self.queue.push(NarrationEvent {
                        text: phrase::compose_curve_phrase(curve, &self.config),
                        priority: curve.severity.priority(),
                        trigger_distance_m,
                        curve_identity: Some(identity),
                        kind: NarrationEventKind::Curve,
                        delivered: false,
                    });
                }
                RouteSegment::Straight(straight) => {
                    if self.config.verbosity != Verbosity::Detailed || !self.config.narrate_straights {
                        continue;
                    }
                    let identity = (straight.start_index, straight.end_index);
                    if self.announced_straights.contains(&identity)
                        || self.queue.iter().any(|e| e.curve_identity == Some(identity))
                    {
                        continue;
                    }
                    let trigger_distance_m = timing::compute_trigger_distance_m(speed_ms, None, &self.config);
                    if distance_ahead > trigger_distance_m {
                        continue;
                    }
                    self.queue.push(NarrationEvent {
                        text: phrase::compose_straight_phrase(straight.length_m),
                        priority: PRIORITY_STRAIGHT,
                        trigger_distance_m,
                        curve_identity: Some(identity),
                        kind: NarrationEventKind::Straight,
                        delivered: false,
                    });
                }
            }
        }
    }

    /// GENTLE is dropped at MINIMAL; MODERATE without a compound is
    /// dropped at MINIMAL (spec.md §4.14).
    fn passes_verbosity_filter(&self, severity: Severity, has_compound: bool) -> bool {
        if self.config.verbosity != Verbosity::Minimal {
            return true;
        }
        match severity {
            Severity::Gentle => false,
            Severity::Moderate => has_compound,
            _ => true,
        }
    }

    /// Groups contiguous low-confidence curves into regions and
    /// emits one `SPARSE_WARNING` per region, identified by its first
    /// curve, the first time any curve in the region enters the
    /// lookahead window.
    fn scan_sparse_regions(&mut self, segments: &[RouteSegment], route_progress_m: f64, speed_ms: f64) {
        let curves: Vec<_> = segments.iter().filter_map(RouteSegment::as_curve).collect();
        let mut index = 0;
        while index < curves.len() {
            if curves[index].confidence >= 0.5 {
                index += 1;
                continue;
            }
            let region_start = index;
            while index < curves.len() && curves[index].confidence < 0.5 {
                index += 1;
            }
            let region_key = curves[region_start].identity();
            if self.announced_sparse_regions.contains(&region_key) {
                continue;
            }
            let distance_ahead = curves[region_start].distance_from_start_m - route_progress_m;
            if distance_ahead < 0.0 || distance_ahead > LOOKAHEAD_WINDOW_M {
                continue;
            }
            let trigger_distance_m = timing::compute_trigger_distance_m(speed_ms, None, &self.config);
            if distance_ahead > trigger_distance_m {
                continue;
            }
            self.announced_sparse_regions.insert(region_key);
            self.queue.push(NarrationEvent {
                text: "Caution, low data quality ahead".to_string(),
                priority: PRIORITY_SPARSE_WARNING,
                trigger_distance_m,
                curve_identity: None,
                kind: NarrationEventKind::SparseWarning,
                delivered: false,
            });
        }
    }

    /// Picks the highest-priority due event (first-arrived wins
    /// ties), preempts whatever is currently playing if the new event
    /// outranks it, and delivers it through the listener.
    fn try_deliver(&mut self) -> Option<NarrationEvent> {
        if self.state != SessionState::Playing || self.muted {
            return None;
        }
        if let Some(until) = self.cooldown_until {
            if Instant::now() < until {
                return None;
            }
            self.cooldown_until = None;
        }

        let mut best_index: Option<usize> = None;
        for (i, event) in self.queue.iter().enumerate() {
            if let Some(bi) = best_index {
                if event.priority > self.queue[bi].priority {
                    best_index = Some(i);
                }
            } else {
                best_index = Some(i);
            }
        }
        let due_index = best_index?;

        if let Some(playing) = &self.currently_playing {
            if self.queue[due_index].priority <= playing.priority {
                return None;
            }
        }

        let mut due = self.queue.remove(due_index);
        if let Some(playing) = self.currently_playing.take() {
            log::debug!(
                "preempting priority {} with priority {}",
                playing.priority,
                due.priority
            );
            if let Some(listener) = self.listener.as_mut() {
                listener.on_interrupt(&playing);
            }
        }

        due.delivered = true;
        match due.curve_identity {
            Some(identity) if due.kind == NarrationEventKind::Curve => {
                self.announced_curves.insert(identity);
            }
            Some(identity) if due.kind == NarrationEventKind::Straight => {
                self.announced_straights.insert(identity);
            }
            _ => {}
        }
        if let Some(listener) = self.listener.as_mut() {
            listener.on_narration(&due);
        }
        self.currently_playing = Some(due.clone());
        Some(due)
    }

    /// Delivers a one-shot priority-10 event immediately, bypassing
    /// the queue: off-route and back-on-route always win any
    /// preemption contest, so there is nothing to compare against.
    fn deliver_immediate(&mut self, kind: NarrationEventKind, text: String) {
        let event = NarrationEvent {
            text,
            priority: PRIORITY_SYSTEM,
            trigger_distance_m: 0.0,
            curve_identity: None,
            kind,
            delivered: true,
        };
        if let Some(listener) = self.listener.as_mut() {
            listener.on_narration(&event);
        }
        self.currently_playing = Some(event);
    }

    fn interrupt_current(&mut self) {
        if let Some(playing) = self.currently_playing.take() {
            if let Some(listener) = self.listener.as_mut() {
                listener.on_interrupt(&playing);
            }
        }
    }

    fn notify_paused(&mut self, reason: PauseReason) {
        if let Some(listener) = self.listener.as_mut() {
            listener.on_paused(reason);
        }
    }

    fn notify_resumed(&mut self) {
        if let Some(listener) = self.listener.as_mut() {
            listener.on_resumed();
        }
    }
}

/// An already-queued event for a curve or straight that has since
/// fallen behind route progress (by more than [`PASSED_SLACK_M`]) is
/// no longer eligible for delivery. Events with no segment identity
/// (sparse warnings, system events) are always eligible.
fn is_still_eligible(event: &NarrationEvent, segments: &[RouteSegment], route_progress_m: f64) -> bool {
    let Some(identity) = event.curve_identity else {
        return true;
    };
    !segments
        .iter()
        .find(|s| s.start_index() == identity.0 && s.end_index() == identity.1)
        .is_some_and(|s| s.distance_from_start_m() + s.length_m() < route_progress_m - PASSED_SLACK_M)
}
