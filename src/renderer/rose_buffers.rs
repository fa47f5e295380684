use crate::rose::{BakedRose, RoseVertex};

const INITIAL_VERTICES: usize = 8192;
const INITIAL_INDICES: usize = 16_384;

const ROSE_ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
    0 => Float32x3,
    1 => Float32x3,
    2 => Float32x3,
    3 => Float32x2,
    4 => Float32
];

/// Vertex and index storage for the baked flower. Buffers only grow; a
/// smaller regrow reuses the existing allocation.
pub struct RoseBuffers {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    vertex_capacity: usize,
    index_capacity: usize,
    index_count: u32,
}

impl RoseBuffers {
    pub fn new(device: &wgpu::Device) -> Self {
        Self {
            vertex_buffer: create_vertex_buffer(device, INITIAL_VERTICES),
            index_buffer: create_index_buffer(device, INITIAL_INDICES),
            vertex_capacity: INITIAL_VERTICES,
            index_capacity: INITIAL_INDICES,
            index_count: 0,
        }
    }

    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, rose: &BakedRose) {
        if rose.vertices.is_empty() || rose.indices.is_empty() {
            self.index_count = 0;
            return;
        }

        if rose.vertices.len() > self.vertex_capacity {
            self.vertex_capacity = grown_capacity(self.vertex_capacity, rose.vertices.len());
            self.vertex_buffer = create_vertex_buffer(device, self.vertex_capacity);
            tracing::debug!(capacity = self.vertex_capacity, "rose vertex buffer grown");
        }
        if rose.indices.len() > self.index_capacity {
            self.index_capacity = grown_capacity(self.index_capacity, rose.indices.len());
            self.index_buffer = create_index_buffer(device, self.index_capacity);
            tracing::debug!(capacity = self.index_capacity, "rose index buffer grown");
        }

        queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&rose.vertices));
        queue.write_buffer(&self.index_buffer, 0, bytemuck::cast_slice(&rose.indices));
        self.index_count = rose.indices.len() as u32;
    }

    pub fn vertex_buffer(&self) -> &wgpu::Buffer {
        &self.vertex_buffer
    }

    pub fn index_buffer(&self) -> &wgpu::Buffer {
        &self.index_buffer
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }
}

fn create_vertex_buffer(device: &wgpu::Device, vertices: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Rose Vertex Buffer"),
        size: (vertices * std::mem::size_of::<RoseVertex>()) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_index_buffer(device: &wgpu::Device, indices: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Rose Index Buffer"),
        size: (indices * std::mem::size_of::<u32>()) as u64,
        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn grown_capacity(current: usize, needed: usize) -> usize {
    needed.next_power_of_two().max(current)
}

pub fn rose_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<RoseVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &ROSE_ATTRIBUTES,
    }
}
