use std::collections::HashMap;
use std::f32::consts::PI;

use tracing::{debug, warn};

use crate::advance::AdvanceAction;
use crate::render::{
    ButtonDesc, Canvas, CameraDesc, ClickHandler, Color3, Color4, HighlightDesc,
    HorizontalAlignment, Length, LightDesc, MeshDesc, MeshShape, OverlayDesc, RenderEngine,
    SceneHandle, UiOverlay, Vec3, VerticalAlignment,
};

const CAMERA_ALPHA: f32 = PI / 3.0;
const CAMERA_BETA: f32 = PI / 2.5;
const CAMERA_RADIUS: f32 = 3.0;
const LIGHT_DIRECTION: Vec3 = Vec3::new(0.8, 1.0, 0.0);
const STORY_SPHERE_DIAMETER: f32 = 0.6;
const STORY_HIGHLIGHT_RGB: u32 = 0xf5bb0a;
const OVERLAY_NAME: &str = "UI";

/// Everything one scene kind puts on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneBlueprint {
    pub clear_color: Color4,
    pub camera: CameraDesc,
    pub light: LightDesc,
    pub meshes: Vec<MeshDesc>,
    pub highlights: Vec<HighlightDesc>,
    pub advance_button: ButtonDesc,
}

/// Creates a scene and populates it from `blueprint`.
///
/// The camera is attached to `canvas`. Highlights naming a mesh the
/// blueprint does not declare are skipped. If any object fails to build,
/// the partly built scene is detached and disposed before the error returns.
pub fn build_scene<E: RenderEngine>(
    engine: &mut E,
    canvas: &Canvas,
    blueprint: &SceneBlueprint,
) -> Result<E::Scene, E::Error> {
    let scene = engine.create_scene()?;
    match populate(&scene, canvas, blueprint) {
        Ok(mesh_count) => {
            debug!(scene = scene.id().0, mesh_count, "scene_built");
            Ok(scene)
        }
        Err(error) => {
            scene.detach_control();
            scene.dispose();
            warn!(scene = scene.id().0, error = %error, "partial_scene_discarded");
            Err(error)
        }
    }
}

fn populate<S: SceneHandle>(
    scene: &S,
    canvas: &Canvas,
    blueprint: &SceneBlueprint,
) -> Result<usize, S::Error> {
    scene.set_clear_color(blueprint.clear_color);

    scene.add_camera(&blueprint.camera, canvas)?;
    scene.add_light(&blueprint.light)?;

    let mut meshes = HashMap::with_capacity(blueprint.meshes.len());
    for mesh in &blueprint.meshes {
        let id = scene.add_mesh(mesh)?;
        meshes.insert(mesh.name, id);
    }

    for highlight in &blueprint.highlights {
        match meshes.get(highlight.mesh) {
            Some(mesh_id) => scene.add_highlight(highlight, *mesh_id)?,
            None => warn!(
                highlight = highlight.name,
                mesh = highlight.mesh,
                "highlight_mesh_missing"
            ),
        }
    }
    Ok(meshes.len())
}

/// Adds the full-screen overlay with the single advance control.
///
/// Activating the control runs `action` and then detaches input from
/// `scene`, since the scene is about to be superseded. Later activations do
/// nothing.
pub fn build_overlay<S: SceneHandle>(
    scene: &S,
    canvas: &Canvas,
    button: &ButtonDesc,
    action: AdvanceAction,
) -> Result<(), S::Error> {
    let desc = OverlayDesc::fullscreen(OVERLAY_NAME, canvas);
    debug!(
        ideal_width = desc.ideal_width,
        ideal_height = desc.ideal_height,
        "overlay_created"
    );
    let mut overlay = scene.create_fullscreen_ui(&desc)?;

    let owner = scene.clone();
    let on_click: ClickHandler = Box::new(move || {
        if action.activate() {
            owner.detach_control();
        }
    });
    overlay.add_button(button, on_click)
}

fn orbit_camera() -> CameraDesc {
    CameraDesc {
        name: "camera",
        alpha: CAMERA_ALPHA,
        beta: CAMERA_BETA,
        radius: CAMERA_RADIUS,
        target: Vec3::ZERO,
        attach_control: true,
    }
}

fn sky_light() -> LightDesc {
    LightDesc {
        name: "light1",
        direction: LIGHT_DIRECTION,
    }
}

pub fn start_blueprint() -> SceneBlueprint {
    SceneBlueprint {
        clear_color: Color4::OPAQUE_BLACK,
        camera: orbit_camera(),
        light: sky_light(),
        meshes: vec![MeshDesc {
            name: "box",
            shape: MeshShape::Box,
        }],
        highlights: Vec::new(),
        advance_button: ButtonDesc {
            name: "start",
            label: "PLAY GAME",
            width: Length::Fraction(0.4),
            height: Length::Fraction(0.07),
            color: Color3::WHITE,
            top: Length::Pixels(-10.0),
            left: Length::Pixels(0.0),
            thickness: 0.5,
            vertical_alignment: VerticalAlignment::Bottom,
            horizontal_alignment: HorizontalAlignment::Center,
            pointer_cursor: true,
        },
    }
}

pub fn story_blueprint() -> SceneBlueprint {
    let highlight = Color3::from_rgb_u32(STORY_HIGHLIGHT_RGB);
    SceneBlueprint {
        clear_color: Color4::OPAQUE_BLACK,
        camera: orbit_camera(),
        light: sky_light(),
        meshes: vec![MeshDesc {
            name: "sphere",
            shape: MeshShape::Sphere {
                diameter: STORY_SPHERE_DIAMETER,
            },
        }],
        highlights: vec![HighlightDesc {
            name: "hlSphere",
            mesh: "sphere",
            color: highlight,
        }],
        advance_button: ButtonDesc {
            name: "next",
            label: "NEXT",
            width: Length::Fraction(0.25),
            height: Length::Fraction(0.07),
            color: highlight,
            top: Length::Percent(-5.0),
            left: Length::Percent(-3.0),
            thickness: 0.5,
            vertical_alignment: VerticalAlignment::Bottom,
            horizontal_alignment: HorizontalAlignment::Right,
            pointer_cursor: true,
        },
    }
}
