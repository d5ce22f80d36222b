use crate::{
    blend::{BlendMode, BufferUsage},
    color::Color,
    effect::{Effect, EffectFlags},
    math::{Rect, Transform},
    texture::{Texture, TextureFilter, TextureWrap},
};

mod recording;

pub use self::recording::{CommandLog, DeviceCommand, RecordingDevice};

/// A GPU buffer handle issued by a [`Device`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub u64);

/// The vertex streams a batch can bind to an effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexAttribute {
    /// Three floats per vertex.
    Position,
    /// Two floats per vertex.
    TextureCoord,
    /// Four floats per vertex.
    Color,
    /// Three floats per vertex.
    Normal,
    /// Three floats per vertex.
    Binormal,
    /// Three floats per vertex.
    Tangent,
}

impl VertexAttribute {
    /// The number of floats this attribute occupies per vertex.
    #[must_use]
    pub const fn components(self) -> usize {
        match self {
            Self::TextureCoord => 2,
            Self::Position | Self::Normal | Self::Binormal | Self::Tangent => 3,
            Self::Color => 4,
        }
    }
}

/// The matrix uniforms an effect exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatrixUniform {
    /// Object to world transform.
    World,
    /// World to camera transform.
    View,
    /// Camera to clip space transform.
    Projection,
}

/// How indices are assembled into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topology {
    /// Every three indices form a triangle.
    Triangles,
    /// Every two indices form a line segment.
    Lines,
    /// Every index after the first extends a connected line.
    LineStrip,
}

/// The width of each index in an index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexFormat {
    /// 16-bit indices.
    U16,
    /// 32-bit indices.
    U32,
}

/// The graphics backend batches draw through.
///
/// Implementations translate these calls to a real graphics API. Buffer
/// contents are passed as raw bytes in native endianness. Vertex data is
/// always `f32`, index data matches the [`IndexFormat`] given on upload.
pub trait Device {
    /// Allocates a new, empty GPU buffer.
    fn create_buffer(&mut self) -> BufferId;

    /// Releases a buffer returned by [`Device::create_buffer`].
    fn delete_buffer(&mut self, buffer: BufferId);

    /// Replaces the contents of a vertex buffer.
    fn upload_vertices(&mut self, buffer: BufferId, data: &[u8], usage: BufferUsage);

    /// Replaces the contents of an index buffer.
    fn upload_indices(&mut self, buffer: BufferId, data: &[u8], format: IndexFormat);

    /// Binds `buffer` as the source of `attribute` for `effect`.
    fn bind_attribute(&mut self, effect: &Effect, attribute: VertexAttribute, buffer: BufferId);

    /// Makes `effect` the active program, applying `flags` on top of its
    /// defaults.
    fn use_effect(&mut self, effect: &Effect, flags: EffectFlags);

    /// Uploads a matrix uniform to `effect`.
    fn set_matrix(&mut self, effect: &Effect, uniform: MatrixUniform, matrix: &Transform);

    /// Uploads outline uniforms to `effect`.
    fn set_outline(&mut self, effect: &Effect, weight: f32, color: Color);

    /// Binds `texture` for sampling by `effect`.
    fn bind_texture(
        &mut self,
        effect: &Effect,
        texture: &Texture,
        filter: TextureFilter,
        wrap: TextureWrap,
    );

    /// Changes how fragments are blended into the target.
    fn set_blend_mode(&mut self, mode: BlendMode);

    /// Restricts rendering to `region` of the target.
    fn set_viewport(&mut self, region: Rect);

    /// Draws `count` indices from `indices` using the currently bound
    /// attributes.
    fn draw_elements(
        &mut self,
        topology: Topology,
        indices: BufferId,
        format: IndexFormat,
        count: usize,
    );
}
