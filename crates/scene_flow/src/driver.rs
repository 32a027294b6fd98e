use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::advance::AdvanceRequests;
use crate::config::FlowConfig;
use crate::render::{RenderEngine, SceneHandle};
use crate::state::GameState;
use crate::transition::{SetupStatus, TransitionContext, TransitionController, TransitionError};

#[derive(Debug, Error)]
pub enum FlowError<E>
where
    E: std::error::Error + 'static,
{
    #[error("scene flow has already started")]
    AlreadyStarted,
    #[error("scene flow has not started")]
    NotStarted,
    #[error("no controller registered for scene {0}")]
    NoController(GameState),
    #[error("scene {0} is the last scene of the sequence")]
    NoSuccessor(GameState),
    #[error("no failed transition to retry")]
    NothingToRetry,
    #[error("transition to {target} failed: {source}")]
    Transition {
        target: GameState,
        #[source]
        source: TransitionError<E>,
    },
}

struct ActiveScene<S> {
    scene: S,
    state: GameState,
}

/// Finite-state driver that owns the active scene.
///
/// Scenes never start the next transition themselves: their advance control
/// only raises a shared request flag, and `process_advance` turns a pending
/// request into a transition to the successor listed in the config.
pub struct SceneFlow<E: RenderEngine> {
    context: TransitionContext<E>,
    controllers: HashMap<GameState, Box<dyn TransitionController<E>>>,
    config: FlowConfig,
    active: Option<ActiveScene<E::Scene>>,
    requests: AdvanceRequests,
    failed_target: Option<GameState>,
    last_setup: SetupStatus,
}

impl<E: RenderEngine> SceneFlow<E> {
    pub fn new(context: TransitionContext<E>, config: FlowConfig) -> Self {
        Self {
            context,
            controllers: HashMap::new(),
            config,
            active: None,
            requests: AdvanceRequests::default(),
            failed_target: None,
            last_setup: SetupStatus::NotRequested,
        }
    }

    /// Registers `controller` for its scene kind, returning the one it replaces.
    pub fn register(
        &mut self,
        controller: Box<dyn TransitionController<E>>,
    ) -> Option<Box<dyn TransitionController<E>>> {
        let kind = controller.kind();
        debug!(state = %kind, "controller_registered");
        self.controllers.insert(kind, controller)
    }

    /// Builds the initial scene of the configured sequence.
    pub async fn start(&mut self) -> Result<GameState, FlowError<E::Error>> {
        if self.active.is_some() {
            return Err(FlowError::AlreadyStarted);
        }
        self.run(self.config.initial_state).await
    }

    /// Moves to the successor of the active scene if its advance control
    /// fired since the last call. Returns `Ok(None)` when nothing is pending.
    pub async fn process_advance(&mut self) -> Result<Option<GameState>, FlowError<E::Error>> {
        if !self.requests.take() {
            return Ok(None);
        }
        let current = self
            .active
            .as_ref()
            .map(|active| active.state)
            .ok_or(FlowError::NotStarted)?;
        let next = self
            .config
            .successor_of(current)
            .ok_or(FlowError::NoSuccessor(current))?;
        self.run(next).await.map(Some)
    }

    /// Re-runs the last transition that failed, including one that found no
    /// controller registered. The scene it was meant to replace is still the
    /// active one.
    pub async fn retry_failed(&mut self) -> Result<GameState, FlowError<E::Error>> {
        let target = self.failed_target.ok_or(FlowError::NothingToRetry)?;
        info!(target = %target, "transition_retry");
        self.run(target).await
    }

    async fn run(&mut self, target: GameState) -> Result<GameState, FlowError<E::Error>> {
        let Some(controller) = self.controllers.get_mut(&target) else {
            debug!(target = %target, "controller_missing");
            self.failed_target = Some(target);
            return Err(FlowError::NoController(target));
        };

        if self.requests.take() {
            debug!(target = %target, "stale_advance_request_dropped");
        }
        let advance = self.requests.action();
        let current = self.active.as_ref().map(|active| &active.scene);

        match controller.transition(&mut self.context, current, advance).await {
            Ok(result) => {
                info!(
                    from = ?self.active.as_ref().map(|active| active.state),
                    to = %result.state,
                    scene = result.scene.id().0,
                    setup = ?result.setup,
                    "transition_completed"
                );
                self.failed_target = None;
                self.last_setup = result.setup;
                self.active = Some(ActiveScene {
                    scene: result.scene,
                    state: result.state,
                });
                Ok(result.state)
            }
            Err(source) => {
                warn!(target = %target, error = %source, "transition_failed");
                self.failed_target = Some(target);
                Err(FlowError::Transition { target, source })
            }
        }
    }

    pub fn advance_requested(&self) -> bool {
        self.requests.is_pending()
    }

    pub fn active_state(&self) -> Option<GameState> {
        self.active.as_ref().map(|active| active.state)
    }

    pub fn active_scene(&self) -> Option<&E::Scene> {
        self.active.as_ref().map(|active| &active.scene)
    }

    pub fn failed_target(&self) -> Option<GameState> {
        self.failed_target
    }

    pub fn last_setup_status(&self) -> &SetupStatus {
        &self.last_setup
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    pub fn context(&self) -> &TransitionContext<E> {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut TransitionContext<E> {
        &mut self.context
    }

    /// Detaches and disposes the active scene, leaving the flow unstarted.
    pub fn shutdown(&mut self) {
        if let Some(active) = self.active.take() {
            active.scene.detach_control();
            active.scene.dispose();
            info!(state = %active.state, scene = active.scene.id().0, "flow_shutdown");
        }
        self.requests.take();
        self.failed_target = None;
    }
}
