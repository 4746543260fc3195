//! winit bindings for orbitnav, plus a reference orbit camera rig and a
//! ray-pickable triangle scene.

mod camera;
mod controls;
mod logging;
mod scene;

pub use camera::{CameraPose, OrbitRig, Projection};
pub use controls::{LINE_HEIGHT, NavEvent, NavigationControls, pointer_button, scroll_delta_y};
pub use logging::init_tracing;
pub use scene::{Triangle, TriangleScene};
