//! Program recorder: a [`ShaderProgram`] backed by a uniform block and
//! per-mesh instance batches.
//!
//! Global uniforms are written into a Pod block that the render engine uploads
//! once per frame. `model` and `lightColor` are per-draw: each `draw_mesh`
//! captures their current values into an [`InstanceRaw`] so the frame can be
//! drawn with one instanced call per mesh.
//!
//! Globals are sealed by the first draw of a frame. Setting one afterwards
//! would need a second uniform upload mid-pass, so it is reported and ignored.

use std::collections::{BTreeMap, HashSet};
use std::fmt::Display;
use std::ops::Range;

use cgmath::{Matrix4, SquareMatrix, Vector3};
use log::warn;

use super::uniforms::{check_kind, UniformBlock, UniformSlot, UniformValue};
use super::{MeshId, ShaderProgram};
use crate::gfx::geometry::InstanceRaw;

pub struct ProgramRecorder<U: UniformBlock> {
    label: &'static str,
    uniforms: U,
    in_use: bool,
    sealed: bool,
    model: Matrix4<f32>,
    color: Vector3<f32>,
    batches: BTreeMap<MeshId, Vec<InstanceRaw>>,
    reported: HashSet<String>,
}

impl<U: UniformBlock> ProgramRecorder<U> {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            uniforms: U::default(),
            in_use: false,
            sealed: false,
            model: Matrix4::identity(),
            color: Vector3::new(1.0, 1.0, 1.0),
            batches: BTreeMap::new(),
            reported: HashSet::new(),
        }
    }

    /// Drops last frame's draws. Uniform values persist like GL program state.
    pub fn begin_frame(&mut self) {
        for batch in self.batches.values_mut() {
            batch.clear();
        }
        self.in_use = false;
        self.sealed = false;
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn uniforms(&self) -> &U {
        &self.uniforms
    }

    /// Whether `use_program` was called this frame
    pub fn is_in_use(&self) -> bool {
        self.in_use
    }

    /// Non-empty instance batches in mesh order
    pub fn batches(&self) -> impl Iterator<Item = (MeshId, &[InstanceRaw])> {
        self.batches
            .iter()
            .filter(|(_, instances)| !instances.is_empty())
            .map(|(mesh, instances)| (*mesh, instances.as_slice()))
    }

    /// Total draws recorded this frame
    pub fn draw_count(&self) -> usize {
        self.batches.values().map(Vec::len).sum()
    }

    /// Largest single batch
    pub fn largest_batch(&self) -> usize {
        self.batches.values().map(Vec::len).max().unwrap_or(0)
    }

    /// All instances in one contiguous array, with each mesh's range in it
    pub fn packed(&self) -> (Vec<InstanceRaw>, Vec<(MeshId, Range<u32>)>) {
        let mut instances = Vec::with_capacity(self.draw_count());
        let mut ranges = Vec::new();
        for (mesh, batch) in self.batches() {
            let start = instances.len() as u32;
            instances.extend_from_slice(batch);
            ranges.push((mesh, start..instances.len() as u32));
        }
        (instances, ranges)
    }

    fn set(&mut self, name: &str, value: UniformValue) {
        let slot = match name.parse::<UniformSlot>() {
            Ok(slot) => slot,
            Err(err) => return self.report(name, err),
        };
        if let Err(err) = check_kind(slot, &value) {
            return self.report(name, err);
        }

        match (slot, value) {
            (UniformSlot::Model, UniformValue::Mat4(model)) => self.model = model,
            (UniformSlot::LightColor, UniformValue::Vec3(color)) => self.color = color,
            _ if self.sealed => self.report(name, "set after the first draw of the frame"),
            _ => {
                if let Err(err) = self.uniforms.apply(slot, value) {
                    self.report(name, err);
                }
            }
        }
    }

    fn report(&mut self, name: &str, reason: impl Display) {
        if self.reported.insert(name.to_string()) {
            warn!("{}: ignoring uniform `{}`: {}", self.label, name, reason);
        }
    }
}

impl<U: UniformBlock> ShaderProgram for ProgramRecorder<U> {
    fn use_program(&mut self) {
        self.in_use = true;
    }

    fn set_float(&mut self, name: &str, value: f32) {
        self.set(name, UniformValue::Float(value));
    }

    fn set_vec3(&mut self, name: &str, value: Vector3<f32>) {
        self.set(name, UniformValue::Vec3(value));
    }

    fn set_mat4(&mut self, name: &str, value: &Matrix4<f32>) {
        self.set(name, UniformValue::Mat4(*value));
    }

    fn draw_mesh(&mut self, mesh: MeshId) {
        self.sealed = true;
        self.batches
            .entry(mesh)
            .or_default()
            .push(InstanceRaw::new(&self.model, self.color));
    }
}
