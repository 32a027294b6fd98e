//! Scene lifecycle for applications built on an external rendering engine.
//!
//! Exactly one scene is attached at a time. A transition shows the loading
//! indicator, detaches the old scene, builds and awaits the new one, and only
//! then disposes the old scene. [`SceneFlow`] chains transitions along the
//! configured sequence whenever the active scene's advance control fires.

mod advance;
mod builder;
mod config;
mod driver;
#[cfg(test)]
mod mock;
mod render;
mod state;
mod transition;

pub use advance::{AdvanceAction, AdvanceRequests};
pub use builder::{build_overlay, build_scene, start_blueprint, story_blueprint, SceneBlueprint};
pub use config::{ConfigError, FlowConfig, DEFAULT_CANVAS_ID};
pub use driver::{FlowError, SceneFlow};
pub use render::{
    ButtonDesc, CameraDesc, Canvas, ClickHandler, Color3, Color4, HighlightDesc,
    HorizontalAlignment, Length, LightDesc, MeshDesc, MeshId, MeshShape, OverlayDesc,
    RenderEngine, SceneHandle, SceneId, UiOverlay, Vec3, VerticalAlignment,
};
pub use state::{GameState, UnknownGameState};
pub use transition::{
    start_controller, story_controller, transition_to, AuxiliarySetup, SceneController,
    SetupError, SetupStatus, TransitionContext, TransitionController, TransitionError,
    TransitionResult,
};
