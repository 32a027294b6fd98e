//! Headless engine that keeps scene bookkeeping and logs what a real
//! renderer would draw.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use async_trait::async_trait;
use scene_flow::{
    ButtonDesc, CameraDesc, Canvas, ClickHandler, Color4, HighlightDesc, LightDesc, MeshDesc,
    MeshId, OverlayDesc, RenderEngine, SceneHandle, SceneId, UiOverlay,
};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub(crate) enum ConsoleError {
    #[error("scene {0} was already disposed")]
    Disposed(u64),
    #[error("scene {scene} could not load {resource}")]
    AssetLoad { scene: u64, resource: String },
}

#[derive(Default)]
pub(crate) struct ConsoleEngine {
    next_scene_id: u64,
    next_mesh_id: Rc<Cell<u64>>,
    loading_visible: bool,
    missing_assets: Rc<RefCell<HashSet<String>>>,
    live_scenes: Rc<Cell<usize>>,
}

impl ConsoleEngine {
    /// Makes every later readiness wait fail on a resource called `name`.
    #[cfg(test)]
    pub(crate) fn mark_missing(&self, name: &str) {
        self.missing_assets.borrow_mut().insert(name.to_string());
    }

    pub(crate) fn live_scene_count(&self) -> usize {
        self.live_scenes.get()
    }
}

impl RenderEngine for ConsoleEngine {
    type Error = ConsoleError;
    type Scene = ConsoleScene;

    fn display_loading_ui(&mut self) {
        self.loading_visible = true;
        info!("loading_ui_shown");
    }

    fn hide_loading_ui(&mut self) {
        self.loading_visible = false;
        info!("loading_ui_hidden");
    }

    fn is_loading_ui_visible(&self) -> bool {
        self.loading_visible
    }

    fn create_scene(&mut self) -> Result<ConsoleScene, ConsoleError> {
        self.next_scene_id += 1;
        self.live_scenes.set(self.live_scenes.get() + 1);
        debug!(scene = self.next_scene_id, "scene_created");
        Ok(ConsoleScene {
            inner: Rc::new(SceneRecord {
                id: self.next_scene_id,
                attached: Cell::new(true),
                disposed: Cell::new(false),
                clear_color: Cell::new(Color4::OPAQUE_BLACK),
                resources: RefCell::new(Vec::new()),
                buttons: RefCell::new(Vec::new()),
                next_mesh_id: self.next_mesh_id.clone(),
                missing_assets: self.missing_assets.clone(),
                live_scenes: self.live_scenes.clone(),
            }),
        })
    }
}

struct SceneRecord {
    id: u64,
    attached: Cell<bool>,
    disposed: Cell<bool>,
    clear_color: Cell<Color4>,
    resources: RefCell<Vec<String>>,
    buttons: RefCell<Vec<(&'static str, ClickHandler)>>,
    next_mesh_id: Rc<Cell<u64>>,
    missing_assets: Rc<RefCell<HashSet<String>>>,
    live_scenes: Rc<Cell<usize>>,
}

#[derive(Clone)]
pub(crate) struct ConsoleScene {
    inner: Rc<SceneRecord>,
}

impl ConsoleScene {
    fn ensure_live(&self) -> Result<(), ConsoleError> {
        if self.inner.disposed.get() {
            return Err(ConsoleError::Disposed(self.inner.id));
        }
        Ok(())
    }

    fn track(&self, resource: String) {
        debug!(scene = self.inner.id, resource = %resource, "resource_queued");
        self.inner.resources.borrow_mut().push(resource);
    }

    /// Presses the scene's advance control. Detached scenes ignore input.
    pub(crate) fn click_advance(&self) -> bool {
        if !self.inner.attached.get() {
            debug!(scene = self.inner.id, "click_ignored_detached");
            return false;
        }
        let mut buttons = self.inner.buttons.borrow_mut();
        if buttons.is_empty() {
            return false;
        }
        for (name, handler) in buttons.iter_mut() {
            info!(scene = self.inner.id, button = *name, "button_clicked");
            handler();
        }
        true
    }

    #[cfg(test)]
    pub(crate) fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    #[cfg(test)]
    pub(crate) fn clear_color(&self) -> Color4 {
        self.inner.clear_color.get()
    }

    pub(crate) fn resources(&self) -> Vec<String> {
        self.inner.resources.borrow().clone()
    }
}

#[async_trait(?Send)]
impl SceneHandle for ConsoleScene {
    type Error = ConsoleError;
    type Overlay = ConsoleOverlay;

    fn id(&self) -> SceneId {
        SceneId(self.inner.id)
    }

    fn set_clear_color(&self, color: Color4) {
        self.inner.clear_color.set(color);
    }

    fn add_camera(&self, desc: &CameraDesc, canvas: &Canvas) -> Result<(), ConsoleError> {
        self.ensure_live()?;
        if desc.attach_control {
            debug!(
                scene = self.inner.id,
                camera = desc.name,
                canvas = %canvas.id,
                "camera_attached"
            );
        }
        self.track(format!("camera:{}", desc.name));
        Ok(())
    }

    fn add_light(&self, desc: &LightDesc) -> Result<(), ConsoleError> {
        self.ensure_live()?;
        self.track(format!("light:{}", desc.name));
        Ok(())
    }

    fn add_mesh(&self, desc: &MeshDesc) -> Result<MeshId, ConsoleError> {
        self.ensure_live()?;
        let id = self.inner.next_mesh_id.get() + 1;
        self.inner.next_mesh_id.set(id);
        debug!(scene = self.inner.id, mesh = desc.name, shape = ?desc.shape, "mesh_added");
        self.track(format!("mesh:{}", desc.name));
        Ok(MeshId(id))
    }

    fn add_highlight(&self, desc: &HighlightDesc, mesh: MeshId) -> Result<(), ConsoleError> {
        self.ensure_live()?;
        debug!(scene = self.inner.id, highlight = desc.name, mesh = mesh.0, "highlight_added");
        self.track(format!("highlight:{}", desc.name));
        Ok(())
    }

    fn create_fullscreen_ui(&self, desc: &OverlayDesc) -> Result<ConsoleOverlay, ConsoleError> {
        self.ensure_live()?;
        self.track(format!("overlay:{}", desc.name));
        Ok(ConsoleOverlay {
            scene: self.clone(),
        })
    }

    fn detach_control(&self) {
        if self.inner.attached.replace(false) {
            debug!(scene = self.inner.id, "control_detached");
        }
    }

    fn is_attached(&self) -> bool {
        self.inner.attached.get()
    }

    async fn when_ready(&self) -> Result<(), ConsoleError> {
        self.ensure_live()?;
        let resources = self.resources();
        let total = resources.len();
        for (index, resource) in resources.into_iter().enumerate() {
            NextTick::default().await;
            if self.inner.missing_assets.borrow().contains(&resource) {
                return Err(ConsoleError::AssetLoad {
                    scene: self.inner.id,
                    resource,
                });
            }
            debug!(
                scene = self.inner.id,
                resource = %resource,
                loaded = index + 1,
                total,
                "resource_loaded"
            );
        }
        Ok(())
    }

    fn dispose(&self) {
        if self.inner.disposed.replace(true) {
            warn!(scene = self.inner.id, "scene_already_disposed");
            return;
        }
        self.inner.attached.set(false);
        self.inner.buttons.borrow_mut().clear();
        self.inner.resources.borrow_mut().clear();
        let live = self.inner.live_scenes.get();
        self.inner.live_scenes.set(live.saturating_sub(1));
    }
}

pub(crate) struct ConsoleOverlay {
    scene: ConsoleScene,
}

impl UiOverlay for ConsoleOverlay {
    type Error = ConsoleError;

    fn add_button(
        &mut self,
        desc: &ButtonDesc,
        on_click: ClickHandler,
    ) -> Result<(), ConsoleError> {
        self.scene.ensure_live()?;
        debug!(
            scene = self.scene.inner.id,
            button = desc.name,
            label = desc.label,
            "button_added"
        );
        self.scene
            .inner
            .buttons
            .borrow_mut()
            .push((desc.name, on_click));
        Ok(())
    }
}

/// Yields to the executor once, standing in for one frame of asset loading.
#[derive(Default)]
struct NextTick {
    polled: bool,
}

impl Future for NextTick {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.polled {
            return Poll::Ready(());
        }
        self.polled = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scene_flow::{build_overlay, build_scene, start_blueprint, story_blueprint, AdvanceAction};

    fn canvas() -> Canvas {
        Canvas::new("renderCanvas", 800, 600)
    }

    #[test]
    fn built_scene_tracks_every_resource() {
        let mut engine = ConsoleEngine::default();
        let scene = build_scene(&mut engine, &canvas(), &story_blueprint()).expect("scene");

        assert_eq!(
            scene.resources(),
            vec![
                "camera:camera".to_string(),
                "light:light1".to_string(),
                "mesh:sphere".to_string(),
                "highlight:hlSphere".to_string(),
            ]
        );
        assert_eq!(scene.clear_color(), Color4::OPAQUE_BLACK);
        assert_eq!(engine.live_scene_count(), 1);
    }

    #[test]
    fn missing_asset_fails_readiness() {
        let mut engine = ConsoleEngine::default();
        engine.mark_missing("mesh:box");
        let scene = build_scene(&mut engine, &canvas(), &start_blueprint()).expect("scene");

        let error = pollster::block_on(scene.when_ready()).expect_err("missing asset");
        assert!(matches!(
            error,
            ConsoleError::AssetLoad { ref resource, .. } if resource == "mesh:box"
        ));
    }

    #[test]
    fn detached_scene_ignores_clicks() {
        let mut engine = ConsoleEngine::default();
        let scene = build_scene(&mut engine, &canvas(), &start_blueprint()).expect("scene");
        let clicks = Rc::new(Cell::new(0));
        let counter = clicks.clone();
        build_overlay(
            &scene,
            &canvas(),
            &start_blueprint().advance_button,
            AdvanceAction::new(move || counter.set(counter.get() + 1)),
        )
        .expect("overlay");

        assert!(scene.click_advance());
        assert!(!scene.is_attached());
        assert!(!scene.click_advance());
        assert_eq!(clicks.get(), 1);
    }

    #[test]
    fn dispose_is_counted_once_and_rejects_new_objects() {
        let mut engine = ConsoleEngine::default();
        let scene = build_scene(&mut engine, &canvas(), &start_blueprint()).expect("scene");

        scene.dispose();
        scene.dispose();

        assert!(scene.is_disposed());
        assert_eq!(engine.live_scene_count(), 0);
        assert!(matches!(
            scene.add_light(&start_blueprint().light),
            Err(ConsoleError::Disposed(_))
        ));
    }
}
