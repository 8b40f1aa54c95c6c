//! GPU-facing data layouts. Each struct must match its WGSL counterpart.

/// One mesh vertex. Matches `VsIn` in the mesh shader.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable, Debug, PartialEq)]
pub struct MeshVertex {
    /// Model-space position, recentred on the bounding-box centre.
    pub position: [f32; 3],
    /// Unit normal (zero for isolated vertices).
    pub normal: [f32; 3],
}

/// Per-frame uniforms for the mesh pass, std140 layout.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshUniformStd140 {
    /// View-projection of the active camera.
    pub view_proj: [[f32; 4]; 4],
    /// Model transform of the displayed object.
    pub model: [[f32; 4]; 4],
    /// Inverse-transpose of the model's upper 3×3, padded to a mat4.
    pub normal_matrix: [[f32; 4]; 4],
    /// World-space direction *toward* the light.
    pub light_dir: [f32; 3],
    pub _pad0: f32,
    pub base_color: [f32; 4],
}

// Compile-time check against the WGSL struct size.
const _: [(); 224] = [(); core::mem::size_of::<MeshUniformStd140>()];

/// A coloured line-list vertex for overlays.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable, Debug, PartialEq)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

/// CPU-side geometry handed from the asset provider to the renderer.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

/// GPU buffers for the currently displayed model.
#[derive(Debug)]
pub struct MeshGpu {
    pub name: String,
    pub vtx: wgpu::Buffer,
    pub idx: wgpu::Buffer,
    pub index_count: u32,
}
