//! Drag-to-refresh gesture recognition.
//!
//! [`PullController`] turns a press / drag / release stream into a decision:
//! was this a refresh pull, or just someone scrolling?  A pull only arms when
//! the scroll surface under the pointer is already at its top, and it is
//! abandoned the moment that surface scrolls away mid-drag.
//!
//! ```text
//!   Idle ──press at top──▶ Pulling ──release, past threshold──▶ Refreshing
//!    ▲                        │                                     │
//!    └──release short / left top──┘            settle (ok or err) ──┘
//! ```
//!
//! The controller is synchronous.  When a release commits to a refresh it
//! hands back a [`RefreshTicket`]; whoever runs the [`RefreshAction`] calls
//! [`PullController::settle`] with that ticket once the action finishes.

use std::future::Future;
use std::pin::Pin;

use super::error::{ConfigError, SurfaceError};
use super::surface::{OverscrollBehavior, Point, ScrollHost, SurfaceId};

/// The visual travel of the indicator is capped at this multiple of the
/// threshold.
pub const MAX_DISTANCE_FACTOR: f64 = 1.5;

// ───────────────────────────────────────── config ────────────

/// Gesture tuning, fixed for the lifetime of an attachment (except
/// `disabled`, see [`PullController::set_disabled`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PullConfig {
    /// Damped distance (logical px) past which a release refreshes.
    pub threshold: f64,
    /// Multiplier applied to the raw drag distance.
    pub resistance: f64,
    pub disabled: bool,
}

impl Default for PullConfig {
    fn default() -> Self {
        Self {
            threshold: 80.0,
            resistance: 0.5,
            disabled: false,
        }
    }
}

impl PullConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            return Err(ConfigError::InvalidThreshold(self.threshold));
        }
        if !self.resistance.is_finite() || self.resistance <= 0.0 || self.resistance > 1.0 {
            return Err(ConfigError::InvalidResistance(self.resistance));
        }
        Ok(())
    }

    /// Hard cap on the displayed pull distance.
    pub fn max_distance(&self) -> f64 {
        self.threshold * MAX_DISTANCE_FACTOR
    }

    /// Damped, capped distance for a raw downward drag of `delta`.
    pub fn damped(&self, delta: f64) -> f64 {
        (delta * self.resistance).min(self.max_distance())
    }
}

// ───────────────────────────────────────── snapshots ─────────

/// Read-only view of the controller for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PullState {
    pub is_pulling: bool,
    pub is_refreshing: bool,
    pub pull_distance: f64,
    /// Only meaningful while `is_pulling`.
    pub can_refresh: bool,
}

/// Visual parameters derived from [`PullState`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorStyle {
    /// How far the content is pushed down (logical px).
    pub offset: f64,
    /// 0.0 ..= 1.0
    pub opacity: f64,
    /// `false` while the finger is down so the indicator tracks it 1:1;
    /// `true` otherwise so it can ease back.
    pub animate: bool,
}

// ───────────────────────────────────────── refresh ───────────

/// Boxed future returned by a [`RefreshAction`].
pub type RefreshFuture<T> = Pin<Box<dyn Future<Output = anyhow::Result<T>> + Send>>;

/// The caller-supplied reload.  Takes no arguments; whatever it produces is
/// passed through untouched to the code that settles the ticket.
pub trait RefreshAction: Send + Sync + 'static {
    type Output: Send + 'static;

    fn refresh(&self) -> RefreshFuture<Self::Output>;
}

impl<F, Fut, T> RefreshAction for F
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    T: Send + 'static,
{
    type Output = T;

    fn refresh(&self) -> RefreshFuture<T> {
        Box::pin(self())
    }
}

/// Identifies one in-flight refresh.  A ticket issued before a detach or
/// rebind no longer matches and is ignored by [`PullController::settle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    generation: u64,
    seq: u64,
}

// ───────────────────────────────────────── outcomes ──────────

/// Result of a drag event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragOutcome {
    /// Not pulling (or detached / disabled).  Let the host scroll normally.
    Ignored,
    /// Still pulling.  When `suppress_default` is set the host must not
    /// scroll or bounce for this move.
    Tracking { suppress_default: bool },
    /// The surface left its top mid-drag; the gesture was dropped.
    Abandoned,
}

impl DragOutcome {
    pub fn suppresses_default(self) -> bool {
        matches!(
            self,
            DragOutcome::Tracking {
                suppress_default: true
            }
        )
    }
}

/// Result of a release event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    /// No gesture was active.
    Ignored,
    /// Released short of the threshold; back to idle.
    Reset,
    /// Committed.  Run the refresh action and settle this ticket.
    Refresh(RefreshTicket),
}

// ───────────────────────────────────────── controller ────────

#[derive(Debug, Clone, Copy, PartialEq)]
struct GestureSession {
    start_y: f64,
    current_y: f64,
    /// Looked up through the host on every move, never owned.
    surface: SurfaceId,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    Pulling(GestureSession),
    Refreshing(RefreshTicket),
}

#[derive(Debug, Clone, Copy)]
struct Attachment {
    root: SurfaceId,
    prior_overscroll: OverscrollBehavior,
}

/// The drag-to-refresh state machine.
#[derive(Debug)]
pub struct PullController {
    config: PullConfig,
    phase: Phase,
    pull_distance: f64,
    can_refresh: bool,
    attachment: Option<Attachment>,
    /// Bumped on every attach/detach so stale tickets can be told apart.
    generation: u64,
    seq: u64,
}

impl PullController {
    pub fn new(config: PullConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            phase: Phase::Idle,
            pull_distance: 0.0,
            can_refresh: false,
            attachment: None,
            generation: 0,
            seq: 0,
        })
    }

    pub fn root(&self) -> Option<SurfaceId> {
        self.attachment.map(|a| a.root)
    }

    // ── binding ─────────────────────────────────────────────────

    /// Bind to `root` on `host`.  Any previous binding is detached first and
    /// the gesture state starts over.  The root's overscroll is set to
    /// [`OverscrollBehavior::Contain`] until [`detach`](Self::detach).
    pub fn attach<H: ScrollHost>(&mut self, host: &mut H, root: SurfaceId) -> Result<(), SurfaceError> {
        if !host.contains_surface(root) {
            return Err(SurfaceError::Unknown(root));
        }
        self.detach(host);

        let prior_overscroll = host
            .set_overscroll(root, OverscrollBehavior::Contain)
            .unwrap_or_default();
        self.generation += 1;
        self.attachment = Some(Attachment {
            root,
            prior_overscroll,
        });
        self.reset();
        tracing::debug!(root, generation = self.generation, "pull controller attached");
        Ok(())
    }

    /// Unbind and restore the root's previous overscroll behaviour.  Returns
    /// `false` if nothing was attached.  An in-flight refresh keeps running
    /// but its ticket goes stale.
    pub fn detach<H: ScrollHost>(&mut self, host: &mut H) -> bool {
        let Some(attachment) = self.attachment.take() else {
            return false;
        };
        host.set_overscroll(attachment.root, attachment.prior_overscroll);
        self.generation += 1;
        self.reset();
        tracing::debug!(root = attachment.root, "pull controller detached");
        true
    }

    /// Toggle the gesture at runtime.  Disabling drops an active pull but
    /// never interrupts a refresh already in flight.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.config.disabled = disabled;
        if disabled && matches!(self.phase, Phase::Pulling(_)) {
            self.reset();
        }
    }

    // ── gesture events ──────────────────────────────────────────

    /// Pointer pressed at `point`.  Returns `true` if a pull was armed.
    pub fn press<H: ScrollHost>(&mut self, point: Point, host: &H) -> bool {
        let Some(attachment) = self.attachment else {
            return false;
        };
        if self.config.disabled || matches!(self.phase, Phase::Refreshing(_)) {
            return false;
        }
        // Only one touch is tracked; a fresh press replaces any stale session.
        if matches!(self.phase, Phase::Pulling(_)) {
            self.reset();
        }

        let Some(surface) = resolve_surface(host, point, attachment.root) else {
            tracing::trace!(?point, "press outside attached root");
            return false;
        };
        let at_top = host
            .vertical_scroll_offset(surface)
            .is_some_and(|offset| offset <= 0.0);
        if !at_top {
            tracing::trace!(surface, "press ignored, surface not at top");
            return false;
        }

        self.phase = Phase::Pulling(GestureSession {
            start_y: point.y,
            current_y: point.y,
            surface,
        });
        tracing::trace!(surface, y = point.y, "pull armed");
        true
    }

    /// Pointer moved to vertical position `y`.
    pub fn drag<H: ScrollHost>(&mut self, y: f64, host: &H) -> DragOutcome {
        if self.attachment.is_none() || self.config.disabled {
            return DragOutcome::Ignored;
        }
        let Phase::Pulling(ref mut session) = self.phase else {
            return DragOutcome::Ignored;
        };
        session.current_y = y;
        let delta = y - session.start_y;
        let surface = session.surface;

        // Upward / zero movement is ignored, not treated as a cancel.
        if delta <= 0.0 {
            return DragOutcome::Tracking {
                suppress_default: false,
            };
        }

        let at_top = host
            .vertical_scroll_offset(surface)
            .is_some_and(|offset| offset <= 0.0);
        if !at_top {
            tracing::debug!(surface, "surface left top mid-pull, abandoning");
            self.reset();
            return DragOutcome::Abandoned;
        }

        self.pull_distance = self.config.damped(delta);
        self.can_refresh = self.pull_distance >= self.config.threshold;
        DragOutcome::Tracking {
            suppress_default: self.pull_distance > 0.0,
        }
    }

    /// Pointer released.
    pub fn release(&mut self) -> Release {
        let Phase::Pulling(session) = self.phase else {
            return Release::Ignored;
        };
        if self.can_refresh {
            let ticket = self.begin_refresh();
            tracing::debug!(
                distance = self.pull_distance,
                travel = session.current_y - session.start_y,
                "pull released past threshold"
            );
            Release::Refresh(ticket)
        } else {
            self.reset();
            Release::Reset
        }
    }

    /// Start a refresh without a gesture (e.g. a key binding).  `None` while
    /// detached or while another refresh is in flight.
    pub fn trigger(&mut self) -> Option<RefreshTicket> {
        if self.attachment.is_none() || matches!(self.phase, Phase::Refreshing(_)) {
            return None;
        }
        self.pull_distance = self.config.threshold;
        self.can_refresh = false;
        Some(self.begin_refresh())
    }

    /// The refresh behind `ticket` finished.  Failures are logged and
    /// otherwise treated exactly like success.  Returns `false` for a stale
    /// ticket.
    pub fn settle<T>(&mut self, ticket: RefreshTicket, result: &anyhow::Result<T>) -> bool {
        if let Err(err) = result {
            tracing::warn!("refresh action failed: {err:#}");
        }
        if self.phase != Phase::Refreshing(ticket) {
            tracing::trace!(?ticket, "ignoring stale refresh ticket");
            return false;
        }
        self.reset();
        true
    }

    // ── views ───────────────────────────────────────────────────

    pub fn state(&self) -> PullState {
        PullState {
            is_pulling: matches!(self.phase, Phase::Pulling(_)),
            is_refreshing: matches!(self.phase, Phase::Refreshing(_)),
            pull_distance: self.pull_distance,
            can_refresh: self.can_refresh,
        }
    }

    pub fn indicator_style(&self) -> IndicatorStyle {
        let pulling = matches!(self.phase, Phase::Pulling(_));
        let threshold = self.config.threshold;
        IndicatorStyle {
            offset: self.pull_distance.min(threshold),
            opacity: if pulling {
                (self.pull_distance / threshold).min(1.0)
            } else {
                0.0
            },
            animate: !pulling,
        }
    }

    /// Surface the active pull was armed on.
    pub fn active_surface(&self) -> Option<SurfaceId> {
        match self.phase {
            Phase::Pulling(session) => Some(session.surface),
            _ => None,
        }
    }

    // ── internals ───────────────────────────────────────────────

    fn begin_refresh(&mut self) -> RefreshTicket {
        self.seq += 1;
        let ticket = RefreshTicket {
            generation: self.generation,
            seq: self.seq,
        };
        self.phase = Phase::Refreshing(ticket);
        ticket
    }

    fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.pull_distance = 0.0;
        self.can_refresh = false;
    }
}

/// Nearest surface enclosing `point` that can scroll, searching from the
/// innermost region up to and including `root`.  Falls back to `root`;
/// `None` when the point is not inside `root` at all.
fn resolve_surface<H: ScrollHost>(host: &H, point: Point, root: SurfaceId) -> Option<SurfaceId> {
    let chain = host.enclosing_surfaces(point);
    if !chain.contains(&root) {
        return None;
    }
    for id in chain {
        if host.can_scroll_vertically(id) {
            return Some(id);
        }
        if id == root {
            break;
        }
    }
    Some(root)
}
