use std::path::PathBuf;

use scene_flow::{
    start_controller, story_controller, ConfigError, FlowConfig, SceneFlow, TransitionContext,
};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::console_engine::ConsoleEngine;
use super::setup::{GameSetup, SessionHandle};

const CONFIG_ENV_VAR: &str = "SCENE_FLOW_CONFIG";
const SAVE_PATH_ENV_VAR: &str = "SCENE_FLOW_SAVE_PATH";
const SEED_ENV_VAR: &str = "SCENE_FLOW_SEED";
const DEFAULT_SEED: u64 = 0x5eed;

pub(crate) struct AppWiring {
    pub(crate) flow: SceneFlow<ConsoleEngine>,
    pub(crate) session: SessionHandle,
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{var} must be an unsigned integer, got '{value}'")]
    InvalidSeed { var: &'static str, value: String },
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Scene Flow Startup ===");

    let config = match std::env::var_os(CONFIG_ENV_VAR) {
        Some(path) => {
            let path = PathBuf::from(path);
            info!(path = %path.display(), "flow_config_loading");
            FlowConfig::load(&path)?
        }
        None => FlowConfig::default(),
    };
    let seed = parse_seed(std::env::var(SEED_ENV_VAR).ok())?;
    let save_path = std::env::var_os(SAVE_PATH_ENV_VAR).map(PathBuf::from);

    Ok(wire(config, ConsoleEngine::default(), seed, save_path))
}

pub(crate) fn wire(
    config: FlowConfig,
    engine: ConsoleEngine,
    seed: u64,
    save_path: Option<PathBuf>,
) -> AppWiring {
    info!(
        initial = %config.initial_state,
        sequence = ?config.sequence,
        canvas_width = config.canvas_width,
        canvas_height = config.canvas_height,
        "flow_config"
    );
    let setup = GameSetup::new(seed, save_path);
    let session = setup.session();

    let context = TransitionContext::new(engine, config.canvas());
    let mut flow = SceneFlow::new(context, config);
    flow.register(Box::new(start_controller()));
    flow.register(Box::new(story_controller(setup)));

    AppWiring { flow, session }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn parse_seed(raw: Option<String>) -> Result<u64, BootstrapError> {
    match raw {
        None => Ok(DEFAULT_SEED),
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map_err(|_| BootstrapError::InvalidSeed {
                var: SEED_ENV_VAR,
                value,
            }),
    }
}
