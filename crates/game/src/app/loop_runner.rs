use std::process::ExitCode;

use scene_flow::{FlowError, GameState, SceneFlow};
use tracing::{error, info, warn};

use super::bootstrap::AppWiring;
use super::console_engine::{ConsoleEngine, ConsoleError};

pub(crate) fn run(app: AppWiring) -> ExitCode {
    let AppWiring { mut flow, session } = app;
    let outcome = pollster::block_on(drive(&mut flow));
    flow.shutdown();
    let live_scenes = flow.context().engine.live_scene_count();
    if live_scenes != 0 {
        warn!(live_scenes, "scenes_leaked_after_shutdown");
    }

    match outcome {
        Ok(visited) => {
            info!(visited = ?visited, session = ?session.borrow(), "flow_finished");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "flow_failed");
            ExitCode::FAILURE
        }
    }
}

/// Starts the flow and presses each scene's advance control in turn until
/// the chain reaches a scene with nowhere left to go.
pub(crate) async fn drive(
    flow: &mut SceneFlow<ConsoleEngine>,
) -> Result<Vec<GameState>, FlowError<ConsoleError>> {
    let mut visited = vec![flow.start().await?];

    for _ in 0..flow.config().sequence.len() {
        let Some(scene) = flow.active_scene().cloned() else {
            break;
        };
        if !scene.click_advance() {
            warn!(state = ?flow.active_state(), "advance_control_unavailable");
            break;
        }
        match flow.process_advance().await {
            Ok(Some(state)) => visited.push(state),
            Ok(None) => break,
            Err(FlowError::NoController(state)) => {
                info!(state = %state, "handoff_to_external_scene");
                break;
            }
            Err(FlowError::NoSuccessor(state)) => {
                info!(state = %state, "sequence_complete");
                break;
            }
            Err(err) => return Err(err),
        }
    }

    Ok(visited)
}
