use std::time::{Duration, Instant};

use futures::FutureExt;
use glam::Vec2;
use orbitnav_core::{
    BaseStep, Modifiers, NavConfig, NavContext, NavError, PivotController, PointerButton,
    WheelController, WheelInput, set_pivot_at,
};
use tracing::{debug, trace};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, TouchPhase, WindowEvent};

/// Pixels per scroll line, matching what browsers report for a wheel notch.
pub const LINE_HEIGHT: f32 = 100.0;

const DOUBLE_CLICK_INTERVAL: Duration = Duration::from_millis(300);
const DOUBLE_CLICK_DISTANCE: f32 = 4.0;

/// Window input reduced to what the navigation controllers consume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavEvent {
    /// Vertical scroll in pixels; negative moves towards the scene.
    Wheel { delta_y: f32 },
    CursorMoved(Vec2),
    Button { button: PointerButton, pressed: bool },
    TouchStarted { id: u64, position: Vec2 },
    TouchEnded { id: u64 },
    Modifiers(Modifiers),
}

impl NavEvent {
    /// Map a winit event, or `None` when navigation does not care about it.
    pub fn translate(event: &WindowEvent) -> Option<Self> {
        match event {
            WindowEvent::MouseWheel { delta, .. } => Some(Self::Wheel {
                delta_y: scroll_delta_y(delta),
            }),
            WindowEvent::CursorMoved { position, .. } => Some(Self::CursorMoved(Vec2::new(
                position.x as f32,
                position.y as f32,
            ))),
            WindowEvent::MouseInput { state, button, .. } => Some(Self::Button {
                button: pointer_button(*button),
                pressed: *state == ElementState::Pressed,
            }),
            WindowEvent::Touch(touch) => match touch.phase {
                TouchPhase::Started => Some(Self::TouchStarted {
                    id: touch.id,
                    position: Vec2::new(touch.location.x as f32, touch.location.y as f32),
                }),
                TouchPhase::Ended | TouchPhase::Cancelled => {
                    Some(Self::TouchEnded { id: touch.id })
                }
                TouchPhase::Moved => None,
            },
            WindowEvent::ModifiersChanged(modifiers) => {
                let state = modifiers.state();
                Some(Self::Modifiers(Modifiers {
                    shift: state.shift_key(),
                    ctrl: state.control_key(),
                    alt: state.alt_key(),
                    meta: state.super_key(),
                }))
            }
            _ => None,
        }
    }
}

/// Scroll amount in pixels with the browser sign convention. winit reports
/// positive `y` for scrolling up, which is a negative pixel delta there.
pub fn scroll_delta_y(delta: &MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => -y * LINE_HEIGHT,
        MouseScrollDelta::PixelDelta(pos) => -(pos.y as f32),
    }
}

pub fn pointer_button(button: MouseButton) -> PointerButton {
    match button {
        MouseButton::Left => PointerButton::Primary,
        MouseButton::Middle => PointerButton::Middle,
        MouseButton::Right => PointerButton::Secondary,
        MouseButton::Back => PointerButton::Other(3),
        MouseButton::Forward => PointerButton::Other(4),
        MouseButton::Other(code) => PointerButton::Other(code),
    }
}

/// Wheel dolly, drag pivot selection and double-click focus for one window.
pub struct NavigationControls {
    wheel: WheelController,
    pivot: PivotController,
    cursor: Option<Vec2>,
    modifiers: Modifiers,
    primary_held: bool,
    touches: Vec<(u64, Vec2)>,
    last_click: Option<(Instant, Vec2)>,
}

impl NavigationControls {
    pub fn new(config: &NavConfig, step: BaseStep) -> Result<Self, NavError> {
        Ok(Self {
            wheel: WheelController::new(config.wheel, step)?,
            pivot: PivotController::new(config.pivot)?,
            cursor: None,
            modifiers: Modifiers::default(),
            primary_held: false,
            touches: Vec::new(),
            last_click: None,
        })
    }

    pub fn wheel(&self) -> &WheelController {
        &self.wheel
    }

    pub fn pivot(&self) -> &PivotController {
        &self.pivot
    }

    pub fn cursor(&self) -> Option<Vec2> {
        self.cursor
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.wheel.next_deadline()
    }

    /// Handle a window event. Returns true when the event was consumed and
    /// should not reach other handlers.
    pub fn handle_event(
        &mut self,
        event: &WindowEvent,
        now: Instant,
        ctx: &mut NavContext<'_>,
    ) -> bool {
        NavEvent::translate(event).is_some_and(|event| self.handle_nav_event(event, now, ctx))
    }

    pub fn handle_nav_event(
        &mut self,
        event: NavEvent,
        now: Instant,
        ctx: &mut NavContext<'_>,
    ) -> bool {
        if self.wheel.is_disposed() {
            return false;
        }
        match event {
            NavEvent::Wheel { delta_y } => {
                let position = self.cursor.unwrap_or_else(|| viewport_center(ctx));
                let input = WheelInput::new(delta_y, position, now).with_modifiers(self.modifiers);
                self.wheel.on_wheel(&input, ctx)
            }
            NavEvent::CursorMoved(position) => {
                self.cursor = Some(position);
                self.pivot.on_pointer_move(position, self.primary_held, ctx);
                false
            }
            NavEvent::Button { button, pressed } => {
                if button == PointerButton::Primary {
                    self.primary_held = pressed;
                }
                if !pressed {
                    return false;
                }
                let Some(position) = self.cursor else {
                    trace!("Button press before any cursor position");
                    return false;
                };
                self.pivot.on_pointer_down(position, button, ctx);
                if button == PointerButton::Primary {
                    self.track_click(position, now, ctx);
                }
                false
            }
            NavEvent::TouchStarted { id, position } => {
                self.touches.retain(|(touch, _)| *touch != id);
                self.touches.push((id, position));
                let positions: Vec<Vec2> = self.touches.iter().map(|(_, pos)| *pos).collect();
                self.pivot.on_touch_start(&positions, ctx);
                false
            }
            NavEvent::TouchEnded { id } => {
                self.touches.retain(|(touch, _)| *touch != id);
                false
            }
            NavEvent::Modifiers(modifiers) => {
                self.modifiers = modifiers;
                false
            }
        }
    }

    /// Drive timers and late query results; call once per frame.
    pub fn advance(&mut self, now: Instant, ctx: &mut NavContext<'_>) {
        self.wheel.advance(now, ctx);
        self.pivot.poll(ctx);
    }

    pub fn dispose(&mut self) {
        self.wheel.dispose();
        self.pivot.dispose();
        self.touches.clear();
        self.last_click = None;
    }

    fn track_click(&mut self, position: Vec2, now: Instant, ctx: &mut NavContext<'_>) {
        let is_double = self.last_click.is_some_and(|(at, pos)| {
            now.saturating_duration_since(at) <= DOUBLE_CLICK_INTERVAL
                && pos.distance(position) <= DOUBLE_CLICK_DISTANCE
        });
        if is_double {
            self.last_click = None;
            focus(position, ctx);
        } else {
            self.last_click = Some((now, position));
        }
    }
}

fn viewport_center(ctx: &NavContext<'_>) -> Vec2 {
    ctx.viewport
        .and_then(|viewport| viewport.bounding_rect())
        .map(|rect| Vec2::new(rect.left + rect.width * 0.5, rect.top + rect.height * 0.5))
        .unwrap_or(Vec2::ZERO)
}

/// Double-click focus. The input thread never blocks, so a scene whose
/// query is still pending skips the focus.
fn focus(position: Vec2, ctx: &mut NavContext<'_>) {
    let (Some(rig), Some(viewport)) = (ctx.rig.as_deref_mut(), ctx.viewport) else {
        return;
    };
    match set_pivot_at(rig, &mut *ctx.scene, viewport, position).now_or_never() {
        Some(Some(point)) => debug!("Double click focused {:?}", point),
        Some(None) => trace!("Double click hit nothing"),
        None => debug!("Focus query still pending, skipped"),
    }
}
