//! Wheel motion: dolly the camera along the view ray under the cursor.
//!
//! Two strategies share one controller shell. [`MotionStrategy::Momentum`]
//! accumulates scroll velocity and glides over animation frames;
//! [`MotionStrategy::Instant`] applies a single step per event, scaled by
//! the distance to the geometry under the cursor.
//!
//! Both strategies debounce a deferred scene refresh and always report the
//! event as consumed so the host suppresses its default scroll action.

mod instant;
mod momentum;

pub use instant::InstantState;
pub use momentum::{MomentumState, velocity_multiplier};

use std::time::{Duration, Instant};

use glam::Vec2;
use tracing::{debug, trace, warn};

use crate::capability::{NavContext, RayResult, Viewport};
use crate::config::{MotionStrategy, WheelConfig};
use crate::error::NavError;
use crate::query::QuerySet;
use crate::schedule::Scheduler;
use crate::step::BaseStep;
use crate::types::{Modifiers, Ray, ScreenRect};

/// A wheel event in DOM conventions: negative `delta_y` scrolls up/away.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelInput {
    pub delta_y: f32,
    /// Cursor position in screen pixels.
    pub position: Vec2,
    pub modifiers: Modifiers,
    pub timestamp: Instant,
}

impl WheelInput {
    pub fn new(delta_y: f32, position: Vec2, timestamp: Instant) -> Self {
        Self {
            delta_y,
            position,
            modifiers: Modifiers::default(),
            timestamp,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// +1 moves forward along the view ray, -1 retreats, 0 for no scroll.
    pub fn direction(&self) -> f32 {
        if self.delta_y < 0.0 {
            1.0
        } else if self.delta_y > 0.0 {
            -1.0
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WheelTimer {
    Frame,
    Refresh,
    Settle,
}

#[derive(Debug, Clone)]
enum Motion {
    Momentum(MomentumState),
    Instant(InstantState),
}

/// Container rectangle, re-read at most once per cache window.
#[derive(Debug, Default)]
struct RectCache {
    rect: Option<ScreenRect>,
    fetched: Option<Instant>,
}

impl RectCache {
    fn get(&mut self, viewport: Option<&dyn Viewport>, now: Instant, ttl: Duration) -> Option<ScreenRect> {
        let fresh = self
            .fetched
            .is_some_and(|at| now.saturating_duration_since(at) < ttl);
        if !fresh || self.rect.is_none() {
            self.rect = viewport.and_then(|v| v.bounding_rect());
            self.fetched = Some(now);
        }
        self.rect
    }
}

pub struct WheelController {
    config: WheelConfig,
    step: BaseStep,
    motion: Motion,
    timers: Scheduler<WheelTimer>,
    queries: QuerySet<u64>,
    rect: RectCache,
    cursor: Option<Vec2>,
    last_event: Option<Instant>,
    next_ticket: u64,
    disposed: bool,
}

impl WheelController {
    pub fn new(config: WheelConfig, step: BaseStep) -> Result<Self, NavError> {
        config.validate()?;
        let motion = match config.strategy {
            MotionStrategy::Momentum => Motion::Momentum(MomentumState::default()),
            MotionStrategy::Instant => Motion::Instant(InstantState::default()),
        };
        debug!("Wheel controller created with {:?} strategy", config.strategy);
        Ok(Self {
            config,
            step,
            motion,
            timers: Scheduler::new(),
            queries: QuerySet::new(),
            rect: RectCache::default(),
            cursor: None,
            last_event: None,
            next_ticket: 0,
            disposed: false,
        })
    }

    pub fn config(&self) -> &WheelConfig {
        &self.config
    }

    pub fn strategy(&self) -> MotionStrategy {
        match self.motion {
            Motion::Momentum(_) => MotionStrategy::Momentum,
            Motion::Instant(_) => MotionStrategy::Instant,
        }
    }

    pub fn base_step(&self) -> &BaseStep {
        &self.step
    }

    /// Momentum state, when running the momentum strategy.
    pub fn momentum(&self) -> Option<&MomentumState> {
        match &self.motion {
            Motion::Momentum(state) => Some(state),
            Motion::Instant(_) => None,
        }
    }

    /// Proximity state, when running the instant strategy.
    pub fn proximity(&self) -> Option<&InstantState> {
        match &self.motion {
            Motion::Instant(state) => Some(state),
            Motion::Momentum(_) => None,
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Earliest pending timer or animation frame.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_due()
    }

    /// Handle one wheel event. Returns true when the host should suppress
    /// the default scroll action, which is always the case until disposed.
    pub fn on_wheel(&mut self, input: &WheelInput, ctx: &mut NavContext<'_>) -> bool {
        if self.disposed {
            return false;
        }
        self.poll_queries(ctx);

        let now = input.timestamp;
        let elapsed = self.last_event.map(|last| now.saturating_duration_since(last));
        self.last_event = Some(now);
        self.cursor = Some(input.position);

        let direction = input.direction();
        if direction != 0.0 {
            let scale = self.step.get() * self.modifier_scale(input.modifiers);
            match self.config.strategy {
                MotionStrategy::Momentum => {
                    self.momentum_wheel(input, elapsed, direction * scale);
                }
                MotionStrategy::Instant => {
                    self.instant_wheel(now, direction * scale, ctx);
                }
            }
        }

        self.timers
            .debounce(WheelTimer::Refresh, now + self.config.refresh_delay());
        self.poll_queries(ctx);
        true
    }

    /// Fire due timers and animation frames and apply resolved queries.
    pub fn advance(&mut self, now: Instant, ctx: &mut NavContext<'_>) {
        if self.disposed {
            return;
        }
        self.poll_queries(ctx);
        for timer in self.timers.drain_due(now) {
            match timer {
                WheelTimer::Frame => self.momentum_frame(now, ctx),
                WheelTimer::Settle => self.settle(now, ctx),
                WheelTimer::Refresh => {
                    debug!("Scroll idle, refreshing deferred scene updates");
                    ctx.refresh.refresh();
                }
            }
        }
        self.poll_queries(ctx);
    }

    /// Cancel every timer and frame and drop in-flight queries. The
    /// controller ignores all further input.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.timers.cancel_all();
        self.queries.clear();
        if let Motion::Momentum(state) = &mut self.motion {
            state.stop();
        }
        debug!("Wheel controller disposed");
    }

    fn modifier_scale(&self, modifiers: Modifiers) -> f32 {
        let mut scale = 1.0;
        if modifiers.shift {
            scale *= self.config.shift_boost;
        }
        if modifiers.fine() {
            scale *= self.config.fine_modifier;
        }
        scale
    }

    fn cursor_ray(&mut self, now: Instant, ctx: &NavContext<'_>) -> Option<Ray> {
        let cursor = self.cursor?;
        let rect = self.rect.get(ctx.viewport, now, self.config.rect_cache())?;
        let ndc = rect.to_ndc(cursor)?;
        ctx.rig.as_deref()?.ray_from_ndc(ndc)
    }

    fn momentum_wheel(&mut self, input: &WheelInput, elapsed: Option<Duration>, unit_step: f32) {
        let frame_due = input.timestamp + self.config.frame_interval();
        let Motion::Momentum(state) = &mut self.motion else {
            return;
        };
        let multiplier = state.accumulate(&self.config, elapsed, input.delta_y);
        state.blend(&self.config, unit_step * multiplier);
        trace!(
            "Momentum velocity {} multiplier {} pending {}",
            state.velocity(),
            multiplier,
            state.pending()
        );
        if state.start() {
            self.timers.request(WheelTimer::Frame, frame_due);
        }
    }

    fn momentum_frame(&mut self, now: Instant, ctx: &mut NavContext<'_>) {
        let ray = self.cursor_ray(now, ctx);
        let Motion::Momentum(state) = &mut self.motion else {
            return;
        };
        let (Some(ray), Some(rig)) = (ray, ctx.rig.as_deref_mut()) else {
            trace!("No camera ray available, dropping momentum");
            state.stop();
            return;
        };

        let (amount, more) = state.frame_step(&self.config);
        let offset = ray.direction * amount;
        let position = rig.position() + offset;
        let target = rig.target() + offset;
        rig.set_look_at(position, target, false);

        if more {
            self.timers
                .request(WheelTimer::Frame, now + self.config.frame_interval());
        } else {
            trace!("Momentum settled");
        }
    }

    fn instant_wheel(&mut self, now: Instant, signed_step: f32, ctx: &mut NavContext<'_>) {
        let wants_raycast = match &self.motion {
            Motion::Instant(state) => state.wants_raycast(&self.config, now),
            Motion::Momentum(_) => return,
        };
        if wants_raycast {
            self.issue_raycast(now, ctx);
        }

        let ray = self.cursor_ray(now, ctx);
        let Motion::Instant(state) = &mut self.motion else {
            return;
        };
        state.begin_burst();
        let distance = signed_step * state.step_factor(&self.config);
        self.timers
            .debounce(WheelTimer::Settle, now + self.config.settle_delay());

        let (Some(ray), Some(rig)) = (ray, ctx.rig.as_deref_mut()) else {
            trace!("Camera rig or viewport not ready, skipping wheel step");
            return;
        };
        let offset = ray.direction * distance;
        let position = rig.position() + offset;
        let target = rig.target() + offset;
        rig.set_look_at(position, target, true);
    }

    fn settle(&mut self, now: Instant, ctx: &mut NavContext<'_>) {
        let Motion::Instant(state) = &mut self.motion else {
            return;
        };
        state.settle();
        if self.config.proximity.enabled {
            trace!("Scroll settled, issuing final proximity raycast");
            self.issue_raycast(now, ctx);
        }
    }

    fn issue_raycast(&mut self, now: Instant, ctx: &mut NavContext<'_>) {
        let Some(ray) = self.cursor_ray(now, ctx) else {
            return;
        };
        if let Motion::Instant(state) = &mut self.motion {
            state.mark_raycast(now);
        }
        self.next_ticket += 1;
        let future = ctx.scene.cast_ray(ray);
        self.queries.issue(self.next_ticket, future);
    }

    fn poll_queries(&mut self, ctx: &mut NavContext<'_>) {
        if self.queries.is_empty() {
            return;
        }
        for (ticket, result) in self.queries.poll_ready() {
            self.apply_raycast(ticket, result, ctx);
        }
    }

    fn apply_raycast(&mut self, ticket: u64, result: RayResult, ctx: &mut NavContext<'_>) {
        let Motion::Instant(state) = &mut self.motion else {
            return;
        };
        let hit = match result {
            Ok(hit) => hit,
            Err(err) => {
                warn!("Proximity raycast failed, treating as open space: {err}");
                None
            }
        };
        if !state.apply_hit(&self.config, ticket, hit) {
            trace!("Dropping stale proximity raycast {ticket}");
            return;
        }
        trace!("Proximity factor now {}", state.factor());

        let Some(hit) = hit else {
            return;
        };
        if state.is_scrolling() {
            return;
        }
        if let Some(rig) = ctx.rig.as_deref_mut() {
            debug!("Pivot follows proximity hit at {:?}", hit.point);
            rig.set_pivot(hit.point);
        }
    }
}
