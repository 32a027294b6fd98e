//! Contract with the rendering engine that owns scenes, cameras, meshes and UI.
//!
//! Nothing here renders anything. Implementors wrap a real engine (or a
//! recording stand-in) and the transition code only ever talks to these
//! traits.

use async_trait::async_trait;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color3 {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color3 {
    pub const WHITE: Color3 = Color3::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Builds a color from `0xRRGGBB`.
    pub fn from_rgb_u32(rgb: u32) -> Self {
        let channel = |shift: u32| ((rgb >> shift) & 0xff) as f32 / 255.0;
        Self::new(channel(16), channel(8), channel(0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color4 {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color4 {
    pub const OPAQUE_BLACK: Color4 = Color4::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// Drawing surface the engine renders into and receives input from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    pub id: String,
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub fn new(id: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id: id.into(),
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(pub u64);

/// Orbit camera around `target`. Angles are in radians.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraDesc {
    pub name: &'static str,
    pub alpha: f32,
    pub beta: f32,
    pub radius: f32,
    pub target: Vec3,
    pub attach_control: bool,
}

/// Hemispheric light pointing toward `direction`.
#[derive(Debug, Clone, PartialEq)]
pub struct LightDesc {
    pub name: &'static str,
    pub direction: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MeshShape {
    Box,
    Sphere { diameter: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeshDesc {
    pub name: &'static str,
    pub shape: MeshShape,
}

/// Glow layer drawn around the mesh named `mesh`.
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightDesc {
    pub name: &'static str,
    pub mesh: &'static str,
    pub color: Color3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayDesc {
    pub name: &'static str,
    pub ideal_width: u32,
    pub ideal_height: u32,
}

impl OverlayDesc {
    /// Full-screen overlay whose ideal size follows the canvas viewport.
    pub fn fullscreen(name: &'static str, canvas: &Canvas) -> Self {
        Self {
            name,
            ideal_width: canvas.width,
            ideal_height: canvas.height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    /// Share of the parent size, `1.0` being the whole parent.
    Fraction(f32),
    Percent(f32),
    Pixels(f32),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VerticalAlignment {
    Top,
    #[default]
    Center,
    Bottom,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HorizontalAlignment {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ButtonDesc {
    pub name: &'static str,
    pub label: &'static str,
    pub width: Length,
    pub height: Length,
    pub color: Color3,
    pub top: Length,
    pub left: Length,
    pub thickness: f32,
    pub vertical_alignment: VerticalAlignment,
    pub horizontal_alignment: HorizontalAlignment,
    pub pointer_cursor: bool,
}

/// Invoked by the engine each time the control is activated.
pub type ClickHandler = Box<dyn FnMut()>;

/// Shared rendering engine. Lives across every transition.
pub trait RenderEngine {
    type Error: std::error::Error + 'static;
    type Scene: SceneHandle<Error = Self::Error>;

    fn display_loading_ui(&mut self);
    fn hide_loading_ui(&mut self);
    fn is_loading_ui_visible(&self) -> bool;
    fn create_scene(&mut self) -> Result<Self::Scene, Self::Error>;
}

/// Reference to a scene owned by the engine.
///
/// Clones refer to the same scene. `dispose` releases every resource the
/// scene holds and must only be called once by whoever supersedes it.
#[async_trait(?Send)]
pub trait SceneHandle: Clone + 'static {
    type Error: std::error::Error + 'static;
    type Overlay: UiOverlay<Error = Self::Error>;

    fn id(&self) -> SceneId;
    fn set_clear_color(&self, color: Color4);
    fn add_camera(&self, desc: &CameraDesc, canvas: &Canvas) -> Result<(), Self::Error>;
    fn add_light(&self, desc: &LightDesc) -> Result<(), Self::Error>;
    fn add_mesh(&self, desc: &MeshDesc) -> Result<MeshId, Self::Error>;
    fn add_highlight(&self, desc: &HighlightDesc, mesh: MeshId) -> Result<(), Self::Error>;
    fn create_fullscreen_ui(&self, desc: &OverlayDesc) -> Result<Self::Overlay, Self::Error>;
    /// Stops the scene from receiving input or firing its controls.
    fn detach_control(&self);
    fn is_attached(&self) -> bool;
    /// Resolves once every resource of the scene has loaded.
    async fn when_ready(&self) -> Result<(), Self::Error>;
    fn dispose(&self);
}

pub trait UiOverlay {
    type Error: std::error::Error + 'static;

    fn add_button(&mut self, desc: &ButtonDesc, on_click: ClickHandler) -> Result<(), Self::Error>;
}
