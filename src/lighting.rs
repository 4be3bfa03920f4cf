//! Static light sources and lighting uniform upload
//!
//! The scene has a fixed set of point lights. The first
//! [`MAX_POINT_LIGHTS`] of them shade the spawned meshes; all of them are
//! drawn as small colored marker cubes.

use cgmath::{Deg, Matrix4, Vector3};

use crate::gfx::camera::Camera;
use crate::gfx::program::{LightField, ShaderProgram, UniformSlot, MAX_POINT_LIGHTS};

pub const SHININESS: f32 = 32.0;
/// Uniform scale of a light marker cube
pub const MARKER_SCALE: f32 = 0.2;

const POSITIONS: [[f32; 3]; 7] = [
    [5.0, 0.0, 0.0],
    [0.0, 5.0, 0.0],
    [0.0, 0.0, 5.0],
    [0.0, 0.0, 0.0],
    [-5.0, 0.0, 0.0],
    [0.0, -5.0, 0.0],
    [0.0, 0.0, -5.0],
];

/// Red, green, blue, white
const COLORS: [[f32; 3]; 4] = [
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [1.0, 1.0, 1.0],
];

/// Distance falloff `1 / (constant + linear * d + quadratic * d^2)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

/// Falloff tuned for a range of roughly 50 units
pub const ATTENUATION: Attenuation = Attenuation {
    constant: 1.0,
    linear: 0.09,
    quadratic: 0.032,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vector3<f32>,
    pub color: Vector3<f32>,
}

impl PointLight {
    pub fn ambient(&self) -> Vector3<f32> {
        self.color * 0.05
    }

    pub fn diffuse(&self) -> Vector3<f32> {
        self.color * 0.8
    }

    pub fn specular(&self) -> Vector3<f32> {
        self.color
    }

    /// `translate(position) * scale(MARKER_SCALE)`
    pub fn marker_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position) * Matrix4::from_scale(MARKER_SCALE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub direction: Vector3<f32>,
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
}

pub const DIRECTIONAL_LIGHT: DirectionalLight = DirectionalLight {
    direction: Vector3 { x: -0.2, y: -1.0, z: -0.3 },
    ambient: Vector3 { x: 0.05, y: 0.05, z: 0.05 },
    diffuse: Vector3 { x: 0.4, y: 0.4, z: 0.4 },
    specular: Vector3 { x: 0.5, y: 0.5, z: 0.5 },
};

/// Flashlight cone attached to the camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLight {
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
    pub inner_angle: Deg<f32>,
    pub outer_angle: Deg<f32>,
}

pub const SPOT_LIGHT: SpotLight = SpotLight {
    ambient: Vector3 { x: 0.0, y: 0.0, z: 0.0 },
    diffuse: Vector3 { x: 1.0, y: 1.0, z: 1.0 },
    specular: Vector3 { x: 1.0, y: 1.0, z: 1.0 },
    inner_angle: Deg(12.5),
    outer_angle: Deg(15.0),
};

/// Read-only table of the scene's point lights
#[derive(Debug, Clone, Copy, Default)]
pub struct LightTable;

impl LightTable {
    /// Number of lights, all of which get a marker
    pub fn marker_count(&self) -> usize {
        POSITIONS.len()
    }

    pub fn position(&self, index: usize) -> Vector3<f32> {
        Vector3::from(POSITIONS[index % POSITIONS.len()])
    }

    /// Colors repeat every four lights
    pub fn color(&self, index: usize) -> Vector3<f32> {
        Vector3::from(COLORS[index % COLORS.len()])
    }

    pub fn point_light(&self, index: usize) -> PointLight {
        PointLight {
            position: self.position(index),
            color: self.color(index),
        }
    }

    /// Lights used for shading
    pub fn shaded(&self) -> impl Iterator<Item = PointLight> + '_ {
        (0..MAX_POINT_LIGHTS).map(|index| self.point_light(index))
    }

    /// Every light, in table order
    pub fn markers(&self) -> impl Iterator<Item = PointLight> + '_ {
        (0..self.marker_count()).map(|index| self.point_light(index))
    }
}

/// Sets every lighting uniform except `projection`, `view` and `model`
pub fn upload_lighting(program: &mut dyn ShaderProgram, lights: &LightTable, camera: &dyn Camera) {
    program.set_vec3(&UniformSlot::ViewPos.to_string(), camera.position());
    program.set_float(&UniformSlot::MaterialShininess.to_string(), SHININESS);

    let dir = DIRECTIONAL_LIGHT;
    for (field, value) in [
        (LightField::Direction, dir.direction),
        (LightField::Ambient, dir.ambient),
        (LightField::Diffuse, dir.diffuse),
        (LightField::Specular, dir.specular),
    ] {
        program.set_vec3(&UniformSlot::DirLight(field).to_string(), value);
    }

    for (index, light) in lights.shaded().enumerate() {
        let slot = |field: LightField| UniformSlot::PointLight(index, field).to_string();
        program.set_vec3(&slot(LightField::Position), light.position);
        program.set_vec3(&slot(LightField::Ambient), light.ambient());
        program.set_vec3(&slot(LightField::Diffuse), light.diffuse());
        program.set_vec3(&slot(LightField::Specular), light.specular());
        set_attenuation(program, &slot, ATTENUATION);
    }

    let spot = SPOT_LIGHT;
    let slot = |field: LightField| UniformSlot::SpotLight(field).to_string();
    program.set_vec3(&slot(LightField::Position), camera.position());
    program.set_vec3(&slot(LightField::Direction), camera.front());
    program.set_vec3(&slot(LightField::Ambient), spot.ambient);
    program.set_vec3(&slot(LightField::Diffuse), spot.diffuse);
    program.set_vec3(&slot(LightField::Specular), spot.specular);
    set_attenuation(program, &slot, ATTENUATION);
    program.set_float(&slot(LightField::CutOff), cgmath::Angle::cos(spot.inner_angle));
    program.set_float(&slot(LightField::OuterCutOff), cgmath::Angle::cos(spot.outer_angle));
}

fn set_attenuation(
    program: &mut dyn ShaderProgram,
    slot: &dyn Fn(LightField) -> String,
    attenuation: Attenuation,
) {
    program.set_float(&slot(LightField::Constant), attenuation.constant);
    program.set_float(&slot(LightField::Linear), attenuation.linear);
    program.set_float(&slot(LightField::Quadratic), attenuation.quadratic);
}
