use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::advance::AdvanceAction;
use crate::builder::{build_overlay, build_scene, start_blueprint, story_blueprint, SceneBlueprint};
use crate::render::{Canvas, RenderEngine, SceneHandle};
use crate::state::GameState;

/// Engine and canvas shared by every transition of a flow.
pub struct TransitionContext<E: RenderEngine> {
    pub engine: E,
    pub canvas: Canvas,
}

impl<E: RenderEngine> TransitionContext<E> {
    pub fn new(engine: E, canvas: Canvas) -> Self {
        Self { engine, canvas }
    }
}

/// Outcome of the optional step run after the new scene is live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupStatus {
    NotRequested,
    Completed,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SetupError {
    message: String,
}

impl SetupError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Scene-kind specific work that runs once the new scene has replaced the
/// old one, e.g. preparing game state behind a story screen.
#[async_trait(?Send)]
pub trait AuxiliarySetup {
    fn name(&self) -> &str;
    async fn run(&mut self) -> Result<(), SetupError>;
}

#[derive(Debug)]
pub struct TransitionResult<S> {
    pub scene: S,
    pub state: GameState,
    pub setup: SetupStatus,
}

#[derive(Debug, Error)]
pub enum TransitionError<E>
where
    E: std::error::Error + 'static,
{
    #[error("failed to construct {state} scene: {source}")]
    SceneConstruction {
        state: GameState,
        #[source]
        source: E,
    },
    #[error("failed to build {state} overlay: {source}")]
    OverlayConstruction {
        state: GameState,
        #[source]
        source: E,
    },
    #[error("{state} scene failed to become ready: {source}")]
    Readiness {
        state: GameState,
        #[source]
        source: E,
    },
}

impl<E> TransitionError<E>
where
    E: std::error::Error + 'static,
{
    pub fn state(&self) -> GameState {
        match self {
            TransitionError::SceneConstruction { state, .. }
            | TransitionError::OverlayConstruction { state, .. }
            | TransitionError::Readiness { state, .. } => *state,
        }
    }
}

/// Replaces `current` with a freshly built scene of kind `state`.
///
/// Order: loading indicator on, old scene detached, new scene and overlay
/// built, readiness awaited, loading indicator off, old scene disposed,
/// `extra_setup` awaited. On error the old scene stays detached but is not
/// disposed, and the loading indicator stays up.
pub async fn transition_to<E: RenderEngine>(
    ctx: &mut TransitionContext<E>,
    current: Option<&E::Scene>,
    advance: AdvanceAction,
    blueprint: &SceneBlueprint,
    state: GameState,
    extra_setup: Option<&mut dyn AuxiliarySetup>,
) -> Result<TransitionResult<E::Scene>, TransitionError<E::Error>> {
    info!(
        state = %state,
        previous = ?current.map(|scene| scene.id().0),
        "transition_started"
    );
    ctx.engine.display_loading_ui();
    if let Some(previous) = current {
        previous.detach_control();
    }

    let scene = build_scene(&mut ctx.engine, &ctx.canvas, blueprint)
        .map_err(|source| TransitionError::SceneConstruction { state, source })?;

    if let Err(source) = build_overlay(&scene, &ctx.canvas, &blueprint.advance_button, advance) {
        discard_unready(&scene, state);
        return Err(TransitionError::OverlayConstruction { state, source });
    }

    if let Err(source) = scene.when_ready().await {
        discard_unready(&scene, state);
        return Err(TransitionError::Readiness { state, source });
    }
    ctx.engine.hide_loading_ui();
    info!(state = %state, scene = scene.id().0, "scene_ready");

    if let Some(previous) = current {
        previous.dispose();
        info!(scene = previous.id().0, "scene_disposed");
    }

    let setup = match extra_setup {
        None => SetupStatus::NotRequested,
        Some(setup) => match setup.run().await {
            Ok(()) => {
                debug!(setup = setup.name(), "setup_completed");
                SetupStatus::Completed
            }
            Err(error) => {
                warn!(setup = setup.name(), error = %error, "setup_failed");
                SetupStatus::Failed(error.to_string())
            }
        },
    };

    Ok(TransitionResult {
        scene,
        state,
        setup,
    })
}

fn discard_unready<S: SceneHandle>(scene: &S, state: GameState) {
    scene.detach_control();
    scene.dispose();
    warn!(state = %state, scene = scene.id().0, "unready_scene_discarded");
}

/// One scene kind's transition routine.
#[async_trait(?Send)]
pub trait TransitionController<E: RenderEngine> {
    fn kind(&self) -> GameState;

    async fn transition(
        &mut self,
        ctx: &mut TransitionContext<E>,
        current: Option<&E::Scene>,
        advance: AdvanceAction,
    ) -> Result<TransitionResult<E::Scene>, TransitionError<E::Error>>;
}

/// Controller driven by a blueprint, with an optional setup step.
pub struct SceneController {
    state: GameState,
    blueprint: SceneBlueprint,
    setup: Option<Box<dyn AuxiliarySetup>>,
}

impl SceneController {
    pub fn new(state: GameState, blueprint: SceneBlueprint) -> Self {
        Self {
            state,
            blueprint,
            setup: None,
        }
    }

    pub fn with_setup(mut self, setup: impl AuxiliarySetup + 'static) -> Self {
        self.setup = Some(Box::new(setup));
        self
    }
}

#[async_trait(?Send)]
impl<E: RenderEngine> TransitionController<E> for SceneController {
    fn kind(&self) -> GameState {
        self.state
    }

    async fn transition(
        &mut self,
        ctx: &mut TransitionContext<E>,
        current: Option<&E::Scene>,
        advance: AdvanceAction,
    ) -> Result<TransitionResult<E::Scene>, TransitionError<E::Error>> {
        let setup = self
            .setup
            .as_deref_mut()
            .map(|setup| setup as &mut dyn AuxiliarySetup);
        transition_to(ctx, current, advance, &self.blueprint, self.state, setup).await
    }
}

/// Title screen with the "PLAY GAME" button.
pub fn start_controller() -> SceneController {
    SceneController::new(GameState::Start, start_blueprint())
}

/// Story screen; `setup` prepares the game while the story is shown.
pub fn story_controller(setup: impl AuxiliarySetup + 'static) -> SceneController {
    SceneController::new(GameState::Story, story_blueprint()).with_setup(setup)
}
