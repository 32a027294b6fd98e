//! Recording engine used by the unit tests to assert call order.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use async_trait::async_trait;
use thiserror::Error;

use crate::render::{
    ButtonDesc, Canvas, CameraDesc, ClickHandler, Color4, HighlightDesc, LightDesc, MeshDesc,
    MeshId, OverlayDesc, RenderEngine, SceneHandle, SceneId, UiOverlay,
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    DisplayLoadingUi,
    HideLoadingUi,
    CreateScene(u64),
    SetClearColor(u64),
    AddCamera(u64, String),
    AddLight(u64),
    AddMesh(u64, &'static str),
    AddHighlight(u64, &'static str),
    CreateOverlay(u64, u32, u32),
    AddButton(u64, &'static str),
    DetachControl(u64),
    WhenReady(u64),
    Dispose(u64),
    Setup(&'static str),
}

pub(crate) type CallLog = Rc<RefCell<Vec<Call>>>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("mock engine failure: {0}")]
pub(crate) struct MockError(pub &'static str);

#[derive(Default)]
pub(crate) struct MockEngine {
    pub(crate) log: CallLog,
    pub(crate) next_id: u64,
    pub(crate) loading_visible: bool,
    pub(crate) fail_create: bool,
    pub(crate) fail_mesh: bool,
    pub(crate) fail_ready: bool,
}

impl MockEngine {
    pub(crate) fn calls(&self) -> Vec<Call> {
        self.log.borrow().clone()
    }

    pub(crate) fn clear_calls(&self) {
        self.log.borrow_mut().clear();
    }

    pub(crate) fn log(&self) -> CallLog {
        self.log.clone()
    }

    pub(crate) fn count(&self, call: &Call) -> usize {
        self.log.borrow().iter().filter(|entry| *entry == call).count()
    }

    pub(crate) fn position(&self, call: &Call) -> Option<usize> {
        self.log.borrow().iter().position(|entry| entry == call)
    }
}

impl RenderEngine for MockEngine {
    type Error = MockError;
    type Scene = MockScene;

    fn display_loading_ui(&mut self) {
        self.loading_visible = true;
        self.log.borrow_mut().push(Call::DisplayLoadingUi);
    }

    fn hide_loading_ui(&mut self) {
        self.loading_visible = false;
        self.log.borrow_mut().push(Call::HideLoadingUi);
    }

    fn is_loading_ui_visible(&self) -> bool {
        self.loading_visible
    }

    fn create_scene(&mut self) -> Result<MockScene, MockError> {
        if self.fail_create {
            return Err(MockError("scene creation refused"));
        }
        self.next_id += 1;
        let id = self.next_id;
        self.log.borrow_mut().push(Call::CreateScene(id));
        Ok(MockScene {
            inner: Rc::new(MockSceneInner {
                id,
                log: self.log.clone(),
                attached: Cell::new(true),
                disposed: Cell::new(false),
                fail_mesh: self.fail_mesh,
                fail_ready: self.fail_ready,
                buttons: RefCell::new(Vec::new()),
            }),
        })
    }
}

struct MockSceneInner {
    id: u64,
    log: CallLog,
    attached: Cell<bool>,
    disposed: Cell<bool>,
    fail_mesh: bool,
    fail_ready: bool,
    buttons: RefCell<Vec<(&'static str, ClickHandler)>>,
}

#[derive(Clone)]
pub(crate) struct MockScene {
    inner: Rc<MockSceneInner>,
}

impl MockScene {
    fn record(&self, call: Call) {
        self.inner.log.borrow_mut().push(call);
    }

    /// Fires every handler registered under `name`, attached or not.
    pub(crate) fn click(&self, name: &str) -> usize {
        let mut buttons = self.inner.buttons.borrow_mut();
        let mut fired = 0;
        for (button, handler) in buttons.iter_mut() {
            if *button == name {
                handler();
                fired += 1;
            }
        }
        fired
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }
}

#[async_trait(?Send)]
impl SceneHandle for MockScene {
    type Error = MockError;
    type Overlay = MockOverlay;

    fn id(&self) -> SceneId {
        SceneId(self.inner.id)
    }

    fn set_clear_color(&self, _color: Color4) {
        self.record(Call::SetClearColor(self.inner.id));
    }

    fn add_camera(&self, _desc: &CameraDesc, canvas: &Canvas) -> Result<(), MockError> {
        self.record(Call::AddCamera(self.inner.id, canvas.id.clone()));
        Ok(())
    }

    fn add_light(&self, _desc: &LightDesc) -> Result<(), MockError> {
        self.record(Call::AddLight(self.inner.id));
        Ok(())
    }

    fn add_mesh(&self, desc: &MeshDesc) -> Result<MeshId, MockError> {
        if self.inner.fail_mesh {
            return Err(MockError("mesh geometry rejected"));
        }
        self.record(Call::AddMesh(self.inner.id, desc.name));
        Ok(MeshId(self.inner.id * 100))
    }

    fn add_highlight(&self, desc: &HighlightDesc, _mesh: MeshId) -> Result<(), MockError> {
        self.record(Call::AddHighlight(self.inner.id, desc.name));
        Ok(())
    }

    fn create_fullscreen_ui(&self, desc: &OverlayDesc) -> Result<MockOverlay, MockError> {
        self.record(Call::CreateOverlay(
            self.inner.id,
            desc.ideal_width,
            desc.ideal_height,
        ));
        Ok(MockOverlay {
            scene: self.clone(),
        })
    }

    fn detach_control(&self) {
        self.inner.attached.set(false);
        self.record(Call::DetachControl(self.inner.id));
    }

    fn is_attached(&self) -> bool {
        self.inner.attached.get()
    }

    async fn when_ready(&self) -> Result<(), MockError> {
        self.record(Call::WhenReady(self.inner.id));
        YieldNow::default().await;
        if self.inner.fail_ready {
            return Err(MockError("assets failed to load"));
        }
        Ok(())
    }

    fn dispose(&self) {
        self.inner.disposed.set(true);
        self.inner.attached.set(false);
        self.inner.buttons.borrow_mut().clear();
        self.record(Call::Dispose(self.inner.id));
    }
}

pub(crate) struct MockOverlay {
    scene: MockScene,
}

impl UiOverlay for MockOverlay {
    type Error = MockError;

    fn add_button(&mut self, desc: &ButtonDesc, on_click: ClickHandler) -> Result<(), MockError> {
        self.scene.record(Call::AddButton(self.scene.inner.id, desc.name));
        self.scene
            .inner
            .buttons
            .borrow_mut()
            .push((desc.name, on_click));
        Ok(())
    }
}

/// Returns `Pending` once so awaiting it really suspends.
#[derive(Default)]
struct YieldNow {
    yielded: bool,
}

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            return Poll::Ready(());
        }
        self.yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}
