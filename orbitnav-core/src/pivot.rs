//! Pivot selection: pick the orbit center from the geometry under the
//! pointer when a drag starts.
//!
//! A primary press arms the gesture and issues a scene query at the press
//! position. The first move that travels past the drag threshold commits the
//! resolved point as the rig's pivot. A click that never crosses the
//! threshold leaves the pivot alone, and a gesture commits at most once.

use glam::{Vec2, Vec3};
use tracing::{debug, trace, warn};

use crate::capability::{CameraRig, NavContext, RayResult, SceneQuery, Viewport};
use crate::config::PivotConfig;
use crate::error::NavError;
use crate::query::QuerySet;
use crate::types::Hit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
    Other(u16),
}

/// Where the current gesture stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GesturePhase {
    #[default]
    Idle,
    /// Primary button down, waiting for the drag threshold.
    Armed,
    /// Pivot already set for this gesture.
    Committed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TicketKind {
    Press,
    Touch,
}

/// Captured when a query is issued; results for an older gesture are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PivotTicket {
    gesture: u64,
    kind: TicketKind,
}

#[derive(Debug, Clone, Default)]
struct DragState {
    phase: GesturePhase,
    press_position: Vec2,
    pending_point: Option<Vec3>,
}

pub struct PivotController {
    config: PivotConfig,
    drag: DragState,
    gesture: u64,
    queries: QuerySet<PivotTicket>,
    disposed: bool,
}

impl PivotController {
    pub fn new(config: PivotConfig) -> Result<Self, NavError> {
        config.validate()?;
        Ok(Self {
            config,
            drag: DragState::default(),
            gesture: 0,
            queries: QuerySet::new(),
            disposed: false,
        })
    }

    pub fn phase(&self) -> GesturePhase {
        self.drag.phase
    }

    /// Intersection point waiting to be committed by a drag.
    pub fn pending_point(&self) -> Option<Vec3> {
        self.drag.pending_point
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn on_pointer_down(&mut self, position: Vec2, button: PointerButton, ctx: &mut NavContext<'_>) {
        if self.disposed || button != PointerButton::Primary {
            return;
        }

        self.gesture += 1;
        self.drag = DragState {
            phase: GesturePhase::Armed,
            press_position: position,
            pending_point: None,
        };
        trace!("Gesture {} armed at {:?}", self.gesture, position);

        self.issue(position, TicketKind::Press, ctx);
    }

    pub fn on_pointer_move(&mut self, position: Vec2, primary_held: bool, ctx: &mut NavContext<'_>) {
        if self.disposed {
            return;
        }
        self.poll(ctx);

        if !primary_held || self.drag.phase != GesturePhase::Armed {
            return;
        }
        if self.drag.press_position.distance(position) < self.config.drag_threshold {
            return;
        }
        let Some(point) = self.drag.pending_point else {
            return;
        };
        let Some(rig) = ctx.rig.as_deref_mut() else {
            trace!("Camera rig not ready, pivot commit deferred");
            return;
        };

        rig.set_pivot(point);
        self.drag.pending_point = None;
        self.drag.phase = GesturePhase::Committed;
        debug!("Gesture {} committed pivot {:?}", self.gesture, point);
    }

    /// Single-finger touch commits the pivot as soon as the query hits.
    pub fn on_touch_start(&mut self, touches: &[Vec2], ctx: &mut NavContext<'_>) {
        if self.disposed {
            return;
        }
        let [touch] = touches else {
            return;
        };

        self.gesture += 1;
        self.drag = DragState::default();
        self.issue(*touch, TicketKind::Touch, ctx);
    }

    /// Apply resolved queries. Pointer handlers call this themselves; hosts
    /// call it from their frame loop so late results are not held back until
    /// the next event.
    pub fn poll(&mut self, ctx: &mut NavContext<'_>) {
        if self.disposed || self.queries.is_empty() {
            return;
        }
        for (ticket, result) in self.queries.poll_ready() {
            self.resolve(ticket, result, ctx);
        }
    }

    /// Drop in-flight queries and ignore every later event.
    pub fn dispose(&mut self) {
        self.disposed = true;
        self.queries.clear();
        self.drag = DragState::default();
    }

    fn issue(&mut self, position: Vec2, kind: TicketKind, ctx: &mut NavContext<'_>) {
        let Some(ray) = ctx.ray_at(position) else {
            trace!("No view ray at {:?}, skipping pivot query", position);
            return;
        };
        let ticket = PivotTicket {
            gesture: self.gesture,
            kind,
        };
        let future = ctx.scene.cast_ray(ray);
        self.queries.issue(ticket, future);
        self.poll(ctx);
    }

    fn resolve(&mut self, ticket: PivotTicket, result: RayResult, ctx: &mut NavContext<'_>) {
        if ticket.gesture != self.gesture {
            trace!(
                "Ignoring query for gesture {} (current {})",
                ticket.gesture,
                self.gesture
            );
            return;
        }

        let hit = match result {
            Ok(Some(hit)) => hit,
            Ok(None) => {
                trace!("Pivot query missed");
                return;
            }
            Err(err) => {
                warn!("Pivot query failed, keeping current pivot: {err}");
                return;
            }
        };

        match ticket.kind {
            TicketKind::Press => {
                if self.drag.phase == GesturePhase::Armed {
                    self.drag.pending_point = Some(hit.point);
                }
            }
            TicketKind::Touch => {
                if let Some(rig) = ctx.rig.as_deref_mut() {
                    rig.set_pivot(hit.point);
                    self.drag.phase = GesturePhase::Committed;
                    debug!("Touch committed pivot {:?}", hit.point);
                }
            }
        }
    }
}

/// One-shot "focus on point": query the scene under `screen` and make the
/// hit the pivot. Independent of any gesture; failures leave the pivot
/// unchanged. Returns the new pivot.
pub async fn set_pivot_at(
    rig: &mut dyn CameraRig,
    scene: &mut dyn SceneQuery,
    viewport: &dyn Viewport,
    screen: Vec2,
) -> Option<Vec3> {
    let ndc = viewport.bounding_rect()?.to_ndc(screen)?;
    let ray = rig.ray_from_ndc(ndc)?;

    let hit: Hit = match scene.cast_ray(ray).await {
        Ok(Some(hit)) => hit,
        Ok(None) => return None,
        Err(err) => {
            warn!("Focus query failed: {err}");
            return None;
        }
    };

    rig.set_pivot(hit.point);
    debug!("Focused pivot at {:?}", hit.point);
    Some(hit.point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Harness, RecordingRig, ScriptedScene};
    use crate::types::ScreenRect;
    use pollster::FutureExt;

    fn controller() -> PivotController {
        PivotController::new(PivotConfig::default()).unwrap()
    }

    fn at(x: f32, y: f32) -> Vec2 {
        Vec2::new(x, y)
    }

    #[test]
    fn test_click_below_threshold_keeps_pivot() {
        let mut h = Harness::new();
        h.scene.push_hit(Vec3::new(1.0, 2.0, 3.0), 7.0);
        let mut pivot = controller();

        pivot.on_pointer_down(at(100.0, 100.0), PointerButton::Primary, &mut h.ctx());
        assert_eq!(pivot.phase(), GesturePhase::Armed);
        assert_eq!(pivot.pending_point(), Some(Vec3::new(1.0, 2.0, 3.0)));

        pivot.on_pointer_move(at(105.0, 100.0), true, &mut h.ctx());
        assert!(h.rig.pivots.is_empty());
        assert_eq!(pivot.phase(), GesturePhase::Armed);
    }

    #[test]
    fn test_drag_past_threshold_commits_once() {
        let mut h = Harness::new();
        let point = Vec3::new(1.0, 2.0, 3.0);
        h.scene.push_hit(point, 7.0);
        let mut pivot = controller();

        pivot.on_pointer_down(at(100.0, 100.0), PointerButton::Primary, &mut h.ctx());
        pivot.on_pointer_move(at(100.0, 112.0), true, &mut h.ctx());
        assert_eq!(h.rig.pivots, vec![point]);
        assert_eq!(pivot.phase(), GesturePhase::Committed);

        pivot.on_pointer_move(at(100.0, 140.0), true, &mut h.ctx());
        pivot.on_pointer_move(at(180.0, 20.0), true, &mut h.ctx());
        assert_eq!(h.rig.pivots.len(), 1);
    }

    #[test]
    fn test_threshold_boundary_counts_as_drag() {
        let mut h = Harness::new();
        h.scene.push_hit(Vec3::ONE, 3.0);
        let mut pivot = controller();
        pivot.on_pointer_down(at(0.0, 0.0), PointerButton::Primary, &mut h.ctx());
        pivot.on_pointer_move(at(6.0, 8.0), true, &mut h.ctx());
        assert_eq!(h.rig.pivots.len(), 1);
    }

    #[test]
    fn test_new_press_starts_new_gesture() {
        let mut h = Harness::new();
        let first = Vec3::new(1.0, 0.0, 0.0);
        let second = Vec3::new(2.0, 0.0, 0.0);
        h.scene.push_hit(first, 5.0);
        h.scene.push_hit(second, 5.0);
        let mut pivot = controller();

        pivot.on_pointer_down(at(100.0, 100.0), PointerButton::Primary, &mut h.ctx());
        pivot.on_pointer_move(at(130.0, 100.0), true, &mut h.ctx());
        pivot.on_pointer_down(at(300.0, 300.0), PointerButton::Primary, &mut h.ctx());
        assert_eq!(pivot.phase(), GesturePhase::Armed);
        pivot.on_pointer_move(at(300.0, 330.0), true, &mut h.ctx());
        assert_eq!(h.rig.pivots, vec![first, second]);
    }

    #[test]
    fn test_moves_without_primary_button_ignored() {
        let mut h = Harness::new();
        h.scene.push_hit(Vec3::ONE, 5.0);
        let mut pivot = controller();
        pivot.on_pointer_down(at(100.0, 100.0), PointerButton::Primary, &mut h.ctx());
        pivot.on_pointer_move(at(200.0, 100.0), false, &mut h.ctx());
        assert!(h.rig.pivots.is_empty());
    }

    #[test]
    fn test_other_buttons_do_not_arm() {
        let mut h = Harness::new();
        let mut pivot = controller();
        pivot.on_pointer_down(at(100.0, 100.0), PointerButton::Secondary, &mut h.ctx());
        pivot.on_pointer_down(at(100.0, 100.0), PointerButton::Middle, &mut h.ctx());
        assert_eq!(pivot.phase(), GesturePhase::Idle);
        assert!(h.scene.rays.is_empty());
    }

    #[test]
    fn test_miss_and_error_never_commit() {
        let mut h = Harness::new();
        h.scene.push_miss();
        h.scene.push_error();
        let mut pivot = controller();

        for _ in 0..2 {
            pivot.on_pointer_down(at(100.0, 100.0), PointerButton::Primary, &mut h.ctx());
            pivot.on_pointer_move(at(150.0, 150.0), true, &mut h.ctx());
        }
        assert!(h.rig.pivots.is_empty());
    }

    #[test]
    fn test_late_result_commits_on_next_qualifying_move() {
        let mut h = Harness::new();
        let tx = h.scene.push_deferred();
        let point = Vec3::new(0.0, 1.0, 0.0);
        let mut pivot = controller();

        pivot.on_pointer_down(at(100.0, 100.0), PointerButton::Primary, &mut h.ctx());
        pivot.on_pointer_move(at(120.0, 100.0), true, &mut h.ctx());
        assert!(h.rig.pivots.is_empty());

        tx.send(Ok(Some(Hit::new(point, 9.0)))).unwrap();
        pivot.on_pointer_move(at(125.0, 100.0), true, &mut h.ctx());
        assert_eq!(h.rig.pivots, vec![point]);
    }

    #[test]
    fn test_stale_result_from_previous_gesture_ignored() {
        let mut h = Harness::new();
        let stale = h.scene.push_deferred();
        h.scene.push_miss();
        let mut pivot = controller();

        pivot.on_pointer_down(at(100.0, 100.0), PointerButton::Primary, &mut h.ctx());
        pivot.on_pointer_down(at(200.0, 200.0), PointerButton::Primary, &mut h.ctx());

        stale
            .send(Ok(Some(Hit::new(Vec3::splat(5.0), 2.0))))
            .unwrap();
        pivot.poll(&mut h.ctx());
        assert_eq!(pivot.pending_point(), None);

        pivot.on_pointer_move(at(250.0, 250.0), true, &mut h.ctx());
        assert!(h.rig.pivots.is_empty());
    }

    #[test]
    fn test_missing_rig_is_silent() {
        let mut h = Harness::new();
        h.scene.push_hit(Vec3::ONE, 1.0);
        let mut pivot = controller();
        pivot.on_pointer_down(at(100.0, 100.0), PointerButton::Primary, &mut h.ctx_without_rig());
        pivot.on_pointer_move(at(200.0, 100.0), true, &mut h.ctx_without_rig());
        assert!(h.scene.rays.is_empty());
        assert!(h.rig.pivots.is_empty());
    }

    #[test]
    fn test_touch_commits_immediately() {
        let mut h = Harness::new();
        let point = Vec3::new(4.0, 0.0, -2.0);
        h.scene.push_hit(point, 12.0);
        let mut pivot = controller();

        pivot.on_touch_start(&[at(400.0, 300.0)], &mut h.ctx());
        assert_eq!(h.rig.pivots, vec![point]);
        assert_eq!(pivot.phase(), GesturePhase::Committed);
    }

    #[test]
    fn test_multi_touch_ignored() {
        let mut h = Harness::new();
        h.scene.push_hit(Vec3::ONE, 1.0);
        let mut pivot = controller();
        pivot.on_touch_start(&[at(10.0, 10.0), at(50.0, 50.0)], &mut h.ctx());
        pivot.on_touch_start(&[], &mut h.ctx());
        assert!(h.scene.rays.is_empty());
        assert!(h.rig.pivots.is_empty());
    }

    #[test]
    fn test_dispose_ignores_pending_results() {
        let mut h = Harness::new();
        let tx = h.scene.push_deferred();
        let mut pivot = controller();
        pivot.on_pointer_down(at(100.0, 100.0), PointerButton::Primary, &mut h.ctx());
        pivot.dispose();

        let _ = tx.send(Ok(Some(Hit::new(Vec3::ONE, 1.0))));
        pivot.poll(&mut h.ctx());
        pivot.on_pointer_move(at(200.0, 200.0), true, &mut h.ctx());
        pivot.on_touch_start(&[at(1.0, 1.0)], &mut h.ctx());
        assert!(h.rig.pivots.is_empty());
        assert_eq!(h.scene.rays.len(), 1);
    }

    #[test]
    fn test_set_pivot_at_commits_hit() {
        let mut rig = RecordingRig::default();
        let mut scene = ScriptedScene::default();
        let rect = ScreenRect::new(0.0, 0.0, 800.0, 600.0);
        let point = Vec3::new(0.5, 0.5, 0.0);
        scene.push_hit(point, 10.0);
        scene.push_miss();
        scene.push_error();

        let first = set_pivot_at(&mut rig, &mut scene, &rect, at(400.0, 300.0)).block_on();
        assert_eq!(first, Some(point));
        let second = set_pivot_at(&mut rig, &mut scene, &rect, at(10.0, 10.0)).block_on();
        assert_eq!(second, None);
        let third = set_pivot_at(&mut rig, &mut scene, &rect, at(10.0, 10.0)).block_on();
        assert_eq!(third, None);

        assert_eq!(rig.pivots, vec![point]);
        assert_eq!(scene.rays.len(), 3);
    }

    #[test]
    fn test_set_pivot_at_needs_viewport() {
        let mut rig = RecordingRig::default();
        let mut scene = ScriptedScene::default();
        let empty = ScreenRect::new(0.0, 0.0, 0.0, 0.0);
        let result = set_pivot_at(&mut rig, &mut scene, &empty, at(1.0, 1.0)).block_on();
        assert_eq!(result, None);
        assert!(scene.rays.is_empty());
    }
}
