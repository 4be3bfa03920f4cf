//! String-keyed uniform protocol
//!
//! Scene code addresses shader inputs by GLSL-style names such as
//! `pointLights[2].diffuse`. [`UniformSlot`] is the typed form of those names:
//! the scene formats names from slots and the program recorder parses them
//! back, so both ends share one definition.

use std::fmt;
use std::str::FromStr;

use bytemuck::{Pod, Zeroable};
use cgmath::{Matrix4, SquareMatrix, Vector3};

/// Number of point lights the lighting shader shades with
pub const MAX_POINT_LIGHTS: usize = 4;

/// Field of a light struct uniform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightField {
    Position,
    Direction,
    Ambient,
    Diffuse,
    Specular,
    Constant,
    Linear,
    Quadratic,
    CutOff,
    OuterCutOff,
}

impl LightField {
    pub const ALL: [LightField; 10] = [
        LightField::Position,
        LightField::Direction,
        LightField::Ambient,
        LightField::Diffuse,
        LightField::Specular,
        LightField::Constant,
        LightField::Linear,
        LightField::Quadratic,
        LightField::CutOff,
        LightField::OuterCutOff,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LightField::Position => "position",
            LightField::Direction => "direction",
            LightField::Ambient => "ambient",
            LightField::Diffuse => "diffuse",
            LightField::Specular => "specular",
            LightField::Constant => "constant",
            LightField::Linear => "linear",
            LightField::Quadratic => "quadratic",
            LightField::CutOff => "cutOff",
            LightField::OuterCutOff => "outerCutOff",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }

    fn kind(self) -> UniformKind {
        match self {
            LightField::Position
            | LightField::Direction
            | LightField::Ambient
            | LightField::Diffuse
            | LightField::Specular => UniformKind::Vec3,
            _ => UniformKind::Float,
        }
    }

    fn in_dir_light(self) -> bool {
        matches!(
            self,
            LightField::Direction | LightField::Ambient | LightField::Diffuse | LightField::Specular
        )
    }

    fn in_point_light(self) -> bool {
        !matches!(
            self,
            LightField::Direction | LightField::CutOff | LightField::OuterCutOff
        )
    }
}

/// A named shader input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformSlot {
    ViewPos,
    MaterialShininess,
    DirLight(LightField),
    PointLight(usize, LightField),
    SpotLight(LightField),
    Projection,
    View,
    Model,
    LightColor,
}

impl UniformSlot {
    /// Value type the slot accepts
    pub fn kind(self) -> UniformKind {
        match self {
            UniformSlot::ViewPos | UniformSlot::LightColor => UniformKind::Vec3,
            UniformSlot::MaterialShininess => UniformKind::Float,
            UniformSlot::Projection | UniformSlot::View | UniformSlot::Model => UniformKind::Mat4,
            UniformSlot::DirLight(field)
            | UniformSlot::PointLight(_, field)
            | UniformSlot::SpotLight(field) => field.kind(),
        }
    }

    /// Slots that change between draws of the same program
    pub fn is_per_draw(self) -> bool {
        matches!(self, UniformSlot::Model | UniformSlot::LightColor)
    }

    /// Checks the slot names a field that exists on its light struct
    pub fn validate(self) -> Result<Self, UniformError> {
        let valid = match self {
            UniformSlot::DirLight(field) => field.in_dir_light(),
            UniformSlot::PointLight(index, field) => {
                if index >= MAX_POINT_LIGHTS {
                    return Err(UniformError::PointLightIndex(index));
                }
                field.in_point_light()
            }
            _ => true,
        };
        if valid {
            Ok(self)
        } else {
            Err(UniformError::Unknown(self.to_string()))
        }
    }

    /// Every valid slot of the protocol
    pub fn all() -> Vec<UniformSlot> {
        let mut slots = vec![UniformSlot::ViewPos, UniformSlot::MaterialShininess];
        slots.extend(
            LightField::ALL
                .into_iter()
                .filter(|field| field.in_dir_light())
                .map(UniformSlot::DirLight),
        );
        for index in 0..MAX_POINT_LIGHTS {
            slots.extend(
                LightField::ALL
                    .into_iter()
                    .filter(|field| field.in_point_light())
                    .map(|field| UniformSlot::PointLight(index, field)),
            );
        }
        slots.extend(LightField::ALL.into_iter().map(UniformSlot::SpotLight));
        slots.extend([
            UniformSlot::Projection,
            UniformSlot::View,
            UniformSlot::Model,
            UniformSlot::LightColor,
        ]);
        slots
    }
}

impl fmt::Display for UniformSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniformSlot::ViewPos => f.write_str("viewPos"),
            UniformSlot::MaterialShininess => f.write_str("material.shininess"),
            UniformSlot::DirLight(field) => write!(f, "dirLight.{}", field.name()),
            UniformSlot::PointLight(index, field) => {
                write!(f, "pointLights[{}].{}", index, field.name())
            }
            UniformSlot::SpotLight(field) => write!(f, "spotLight.{}", field.name()),
            UniformSlot::Projection => f.write_str("projection"),
            UniformSlot::View => f.write_str("view"),
            UniformSlot::Model => f.write_str("model"),
            UniformSlot::LightColor => f.write_str("lightColor"),
        }
    }
}

impl FromStr for UniformSlot {
    type Err = UniformError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let unknown = || UniformError::Unknown(name.to_string());

        let slot = match name {
            "viewPos" => UniformSlot::ViewPos,
            "material.shininess" => UniformSlot::MaterialShininess,
            "projection" => UniformSlot::Projection,
            "view" => UniformSlot::View,
            "model" => UniformSlot::Model,
            "lightColor" => UniformSlot::LightColor,
            _ => {
                let (owner, field) = name.split_once('.').ok_or_else(unknown)?;
                let field = LightField::from_name(field).ok_or_else(unknown)?;
                match owner {
                    "dirLight" => UniformSlot::DirLight(field),
                    "spotLight" => UniformSlot::SpotLight(field),
                    _ => {
                        let index = owner
                            .strip_prefix("pointLights[")
                            .and_then(|rest| rest.strip_suffix(']'))
                            .and_then(|digits| digits.parse::<usize>().ok())
                            .ok_or_else(unknown)?;
                        UniformSlot::PointLight(index, field)
                    }
                }
            }
        };

        slot.validate()
    }
}

/// Value type of a uniform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformKind {
    Float,
    Vec3,
    Mat4,
}

/// A value set on a uniform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec3(Vector3<f32>),
    Mat4(Matrix4<f32>),
}

impl UniformValue {
    pub fn kind(&self) -> UniformKind {
        match self {
            UniformValue::Float(_) => UniformKind::Float,
            UniformValue::Vec3(_) => UniformKind::Vec3,
            UniformValue::Mat4(_) => UniformKind::Mat4,
        }
    }
}

/// Uniform protocol errors
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum UniformError {
    #[error("unknown uniform `{0}`")]
    Unknown(String),

    #[error("point light index {0} out of range")]
    PointLightIndex(usize),

    #[error("uniform `{slot}` expects {expected:?}, got {found:?}")]
    TypeMismatch {
        slot: UniformSlot,
        expected: UniformKind,
        found: UniformKind,
    },

    #[error("uniform `{0}` is not used by this program")]
    Unused(UniformSlot),
}

/// GPU-side uniform block a program routes its global slots into
pub trait UniformBlock: Pod + Default {
    fn apply(&mut self, slot: UniformSlot, value: UniformValue) -> Result<(), UniformError>;
}

/// Checks `value` against the slot type
pub fn check_kind(slot: UniformSlot, value: &UniformValue) -> Result<(), UniformError> {
    let expected = slot.kind();
    let found = value.kind();
    if expected == found {
        Ok(())
    } else {
        Err(UniformError::TypeMismatch {
            slot,
            expected,
            found,
        })
    }
}

fn vec4(value: Vector3<f32>, w: f32) -> [f32; 4] {
    [value.x, value.y, value.z, w]
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct DirLightRaw {
    pub direction: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
}

/// Point light; `attenuation` holds constant, linear and quadratic terms
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct PointLightRaw {
    pub position: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub attenuation: [f32; 4],
}

/// Spotlight; `cutoffs` holds the inner and outer cone cosines
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct SpotLightRaw {
    pub position: [f32; 4],
    pub direction: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub attenuation: [f32; 4],
    pub cutoffs: [f32; 4],
}

/// Uniform block of the lit-object program
///
/// Every member is 16-byte aligned to match the WGSL layout.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LightingUniforms {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub view_pos: [f32; 4],
    /// x: shininess
    pub material: [f32; 4],
    pub dir_light: DirLightRaw,
    pub point_lights: [PointLightRaw; MAX_POINT_LIGHTS],
    pub spot_light: SpotLightRaw,
}

impl Default for LightingUniforms {
    fn default() -> Self {
        let identity: [[f32; 4]; 4] = Matrix4::<f32>::identity().into();
        let mut uniforms = Self::zeroed();
        uniforms.view = identity;
        uniforms.projection = identity;
        uniforms
    }
}

impl UniformBlock for LightingUniforms {
    fn apply(&mut self, slot: UniformSlot, value: UniformValue) -> Result<(), UniformError> {
        check_kind(slot, &value)?;

        match (slot, value) {
            (UniformSlot::View, UniformValue::Mat4(m)) => self.view = m.into(),
            (UniformSlot::Projection, UniformValue::Mat4(m)) => self.projection = m.into(),
            (UniformSlot::ViewPos, UniformValue::Vec3(v)) => self.view_pos = vec4(v, 1.0),
            (UniformSlot::MaterialShininess, UniformValue::Float(s)) => self.material[0] = s,
            (UniformSlot::DirLight(field), value) => {
                let light = &mut self.dir_light;
                match (field, value) {
                    (LightField::Direction, UniformValue::Vec3(v)) => light.direction = vec4(v, 0.0),
                    (LightField::Ambient, UniformValue::Vec3(v)) => light.ambient = vec4(v, 0.0),
                    (LightField::Diffuse, UniformValue::Vec3(v)) => light.diffuse = vec4(v, 0.0),
                    (LightField::Specular, UniformValue::Vec3(v)) => light.specular = vec4(v, 0.0),
                    _ => return Err(UniformError::Unknown(slot.to_string())),
                }
            }
            (UniformSlot::PointLight(index, field), value) => {
                let light = self
                    .point_lights
                    .get_mut(index)
                    .ok_or(UniformError::PointLightIndex(index))?;
                match (field, value) {
                    (LightField::Position, UniformValue::Vec3(v)) => light.position = vec4(v, 1.0),
                    (LightField::Ambient, UniformValue::Vec3(v)) => light.ambient = vec4(v, 0.0),
                    (LightField::Diffuse, UniformValue::Vec3(v)) => light.diffuse = vec4(v, 0.0),
                    (LightField::Specular, UniformValue::Vec3(v)) => light.specular = vec4(v, 0.0),
                    (LightField::Constant, UniformValue::Float(x)) => light.attenuation[0] = x,
                    (LightField::Linear, UniformValue::Float(x)) => light.attenuation[1] = x,
                    (LightField::Quadratic, UniformValue::Float(x)) => light.attenuation[2] = x,
                    _ => return Err(UniformError::Unknown(slot.to_string())),
                }
            }
            (UniformSlot::SpotLight(field), value) => {
                let light = &mut self.spot_light;
                match (field, value) {
                    (LightField::Position, UniformValue::Vec3(v)) => light.position = vec4(v, 1.0),
                    (LightField::Direction, UniformValue::Vec3(v)) => light.direction = vec4(v, 0.0),
                    (LightField::Ambient, UniformValue::Vec3(v)) => light.ambient = vec4(v, 0.0),
                    (LightField::Diffuse, UniformValue::Vec3(v)) => light.diffuse = vec4(v, 0.0),
                    (LightField::Specular, UniformValue::Vec3(v)) => light.specular = vec4(v, 0.0),
                    (LightField::Constant, UniformValue::Float(x)) => light.attenuation[0] = x,
                    (LightField::Linear, UniformValue::Float(x)) => light.attenuation[1] = x,
                    (LightField::Quadratic, UniformValue::Float(x)) => light.attenuation[2] = x,
                    (LightField::CutOff, UniformValue::Float(x)) => light.cutoffs[0] = x,
                    (LightField::OuterCutOff, UniformValue::Float(x)) => light.cutoffs[1] = x,
                    _ => return Err(UniformError::Unknown(slot.to_string())),
                }
            }
            _ => return Err(UniformError::Unused(slot)),
        }
        Ok(())
    }
}

/// Uniform block of the light-marker program
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MarkerUniforms {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
}

impl Default for MarkerUniforms {
    fn default() -> Self {
        let identity: [[f32; 4]; 4] = Matrix4::<f32>::identity().into();
        Self {
            view: identity,
            projection: identity,
        }
    }
}

impl UniformBlock for MarkerUniforms {
    fn apply(&mut self, slot: UniformSlot, value: UniformValue) -> Result<(), UniformError> {
        check_kind(slot, &value)?;
        match (slot, value) {
            (UniformSlot::View, UniformValue::Mat4(m)) => self.view = m.into(),
            (UniformSlot::Projection, UniformValue::Mat4(m)) => self.projection = m.into(),
            _ => return Err(UniformError::Unused(slot)),
        }
        Ok(())
    }
}
