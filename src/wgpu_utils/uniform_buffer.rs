// src/wgpu_utils/uniform_buffer.rs
use std::marker::PhantomData;

fn short_type_name<T>() -> &'static str {
    let type_name = std::any::type_name::<T>();
    match type_name.rfind(':') {
        Some(pos) => &type_name[(pos + 1)..],
        None => type_name,
    }
}

/// Typed uniform buffer holding a single Pod value
pub struct UniformBuffer<Content> {
    buffer: wgpu::Buffer,
    content_type: PhantomData<Content>,
    previous_content: Vec<u8>,
}

impl<Content: bytemuck::Pod> UniformBuffer<Content> {
    /// Create a new uniform buffer
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("UniformBuffer: {}", short_type_name::<Content>())),
            size: std::mem::size_of::<Content>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        UniformBuffer {
            buffer,
            content_type: PhantomData,
            previous_content: Vec::new(),
        }
    }

    /// Update buffer content, skipping the write when nothing changed
    pub fn update_content(&mut self, queue: &wgpu::Queue, content: &Content) {
        let new_content = bytemuck::bytes_of(content);
        if self.previous_content == new_content {
            return;
        }
        queue.write_buffer(&self.buffer, 0, new_content);
        self.previous_content = new_content.to_vec();
    }

    /// Get binding resource
    pub fn binding_resource(&self) -> wgpu::BindingResource {
        self.buffer.as_entire_binding()
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

/// Growable vertex buffer for per-instance records
///
/// Capacity doubles whenever a write does not fit, so the buffer is only
/// reallocated a logarithmic number of times as the scene fills up.
pub struct ArrayBuffer<Content> {
    buffer: wgpu::Buffer,
    content_type: PhantomData<Content>,
    capacity: usize,
    current_size: usize,
}

impl<Content: bytemuck::Pod> ArrayBuffer<Content> {
    /// Create a new instance buffer with room for `capacity` elements
    pub fn new(device: &wgpu::Device, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        ArrayBuffer {
            buffer: Self::allocate(device, capacity),
            content_type: PhantomData,
            capacity,
            current_size: 0,
        }
    }

    fn allocate(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("ArrayBuffer<{}>", short_type_name::<Content>())),
            size: (capacity * std::mem::size_of::<Content>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Replaces the contents with `data`, growing the buffer if needed
    pub fn update_data(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, data: &[Content]) {
        if data.len() > self.capacity {
            let capacity = grown_capacity(self.capacity, data.len());
            log::debug!(
                "Growing {} from {} to {} elements",
                short_type_name::<Content>(),
                self.capacity,
                capacity
            );
            self.buffer = Self::allocate(device, capacity);
            self.capacity = capacity;
        }
        if !data.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(data));
        }
        self.current_size = data.len();
    }

    /// Slice covering elements `range` for binding as a vertex buffer
    pub fn slice(&self, range: std::ops::Range<u32>) -> wgpu::BufferSlice<'_> {
        let stride = std::mem::size_of::<Content>() as u64;
        self.buffer
            .slice(range.start as u64 * stride..range.end as u64 * stride)
    }

    /// Get current number of elements
    pub fn len(&self) -> usize {
        self.current_size
    }

    pub fn is_empty(&self) -> bool {
        self.current_size == 0
    }

    /// Get capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Smallest power-of-two multiple of `current` that holds `required`
fn grown_capacity(current: usize, required: usize) -> usize {
    let mut capacity = current.max(1);
    while capacity < required {
        capacity *= 2;
    }
    capacity
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grown_capacity_doubles() {
        assert_eq!(grown_capacity(64, 65), 128);
        assert_eq!(grown_capacity(64, 64), 64);
        assert_eq!(grown_capacity(1, 1000), 1024);
        assert_eq!(grown_capacity(0, 3), 4);
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name::<crate::gfx::geometry::InstanceRaw>(), "InstanceRaw");
    }
}
