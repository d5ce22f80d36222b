use crate::{
    blend::BufferUsage,
    device::{BufferId, Device, IndexFormat, VertexAttribute},
    effect::Effect,
    math::Vector3D,
    vertex::Vertex,
    Error, Result,
};

/// A fixed-capacity CPU mirror of one vertex attribute, paired with the GPU
/// buffer it is uploaded to.
#[derive(Debug)]
pub struct VertexStream {
    gpu: BufferId,
    attribute: VertexAttribute,
    data: Option<Vec<f32>>,
    cursor: usize,
    capacity: usize,
}

impl VertexStream {
    fn new(device: &mut dyn Device, attribute: VertexAttribute, vertices: usize) -> Self {
        let capacity = vertices * attribute.components();
        Self {
            gpu: device.create_buffer(),
            attribute,
            data: Some(vec![0.; capacity]),
            cursor: 0,
            capacity,
        }
    }

    /// The GPU buffer backing this stream.
    #[must_use]
    pub const fn gpu_buffer(&self) -> BufferId {
        self.gpu
    }

    /// The attribute this stream feeds.
    #[must_use]
    pub const fn attribute(&self) -> VertexAttribute {
        self.attribute
    }

    /// The number of floats written since the last rewind.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.cursor
    }

    /// Returns true if nothing was written since the last rewind.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    /// The number of floats the stream can hold.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of floats that can still be written.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.capacity - self.cursor
    }

    /// The values written since the last rewind. Empty once the CPU mirror
    /// was released.
    #[must_use]
    pub fn written(&self) -> &[f32] {
        self.data.as_ref().map_or(&[], |data| &data[..self.cursor])
    }

    /// Appends `values`, failing without writing anything if they don't fit.
    pub fn push(&mut self, values: &[f32]) -> Result<()> {
        let data = self.data.as_mut().ok_or(Error::Static)?;
        let end = self.cursor + values.len();
        if end > self.capacity {
            return Err(Error::BufferOverflow {
                requested: values.len(),
                available: self.capacity - self.cursor,
            });
        }
        data[self.cursor..end].copy_from_slice(values);
        self.cursor = end;
        Ok(())
    }

    /// Moves the write cursor back to the start.
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    fn upload(&self, device: &mut dyn Device, usage: BufferUsage) {
        device.upload_vertices(self.gpu, bytemuck::cast_slice(self.written()), usage);
    }
}

/// A write-once index buffer.
#[derive(Debug)]
pub struct IndexBuffer {
    gpu: BufferId,
    format: IndexFormat,
    len: usize,
}

impl IndexBuffer {
    /// Uploads `count` quads worth of indices, two triangles per quad sharing
    /// the 1-2 edge.
    pub fn quads(device: &mut dyn Device, count: usize) -> Self {
        let indices = (0..count)
            .flat_map(|quad| {
                let base = (quad * 4) as u32;
                [base, base + 1, base + 2, base + 1, base + 3, base + 2]
            })
            .collect::<Vec<_>>();
        Self::upload(device, &indices)
    }

    /// Uploads `count` indices counting up from zero.
    pub fn sequential(device: &mut dyn Device, count: usize) -> Self {
        let indices = (0..count as u32).collect::<Vec<_>>();
        Self::upload(device, &indices)
    }

    fn upload(device: &mut dyn Device, indices: &[u32]) -> Self {
        let gpu = device.create_buffer();
        let format = if indices.iter().all(|&index| index <= u32::from(u16::MAX)) {
            IndexFormat::U16
        } else {
            IndexFormat::U32
        };
        match format {
            IndexFormat::U16 => {
                let narrow = indices.iter().map(|&index| index as u16).collect::<Vec<_>>();
                device.upload_indices(gpu, bytemuck::cast_slice(&narrow), format);
            }
            IndexFormat::U32 => device.upload_indices(gpu, bytemuck::cast_slice(indices), format),
        }
        Self {
            gpu,
            format,
            len: indices.len(),
        }
    }

    /// The GPU buffer holding the indices.
    #[must_use]
    pub const fn gpu_buffer(&self) -> BufferId {
        self.gpu
    }

    /// The width of each index.
    #[must_use]
    pub const fn format(&self) -> IndexFormat {
        self.format
    }

    /// The number of indices uploaded.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no indices were uploaded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Which optional vertex streams a batch allocates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferLayout {
    /// Allocates a texture coordinate stream.
    pub texture_coords: bool,
    /// Allocates a color stream.
    pub colors: bool,
    /// Allocates a normal stream.
    pub normals: bool,
    /// Allocates a binormal stream.
    pub binormals: bool,
    /// Allocates a tangent stream.
    pub tangents: bool,
}

/// How primitives map onto vertices and indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    /// Four vertices and six indices per quad.
    Quads,
    /// Three vertices per triangle.
    Triangles,
    /// Two vertices per line segment.
    Lines,
}

impl PrimitiveKind {
    /// The most vertices one primitive occupies.
    #[must_use]
    pub const fn vertices_per_primitive(self) -> usize {
        match self {
            Self::Quads => 4,
            Self::Triangles => 3,
            Self::Lines => 2,
        }
    }
}

/// Every buffer a batch owns, with the counters describing what was written.
#[derive(Debug)]
pub struct BatchBuffers {
    positions: VertexStream,
    texture_coords: Option<VertexStream>,
    colors: Option<VertexStream>,
    normals: Option<VertexStream>,
    binormals: Option<VertexStream>,
    tangents: Option<VertexStream>,
    indices: IndexBuffer,
    kind: PrimitiveKind,
    capacity: usize,
    primitives: usize,
    vertices: usize,
}

impl BatchBuffers {
    /// Allocates buffers for `capacity` primitives of `kind`.
    pub fn new(
        device: &mut dyn Device,
        kind: PrimitiveKind,
        capacity: usize,
        layout: BufferLayout,
    ) -> Self {
        let vertices = capacity * kind.vertices_per_primitive();
        let mut optional = |enabled: bool, attribute| {
            if enabled {
                Some(VertexStream::new(device, attribute, vertices))
            } else {
                None
            }
        };
        let texture_coords = optional(layout.texture_coords, VertexAttribute::TextureCoord);
        let colors = optional(layout.colors, VertexAttribute::Color);
        let normals = optional(layout.normals, VertexAttribute::Normal);
        let binormals = optional(layout.binormals, VertexAttribute::Binormal);
        let tangents = optional(layout.tangents, VertexAttribute::Tangent);
        let positions = VertexStream::new(device, VertexAttribute::Position, vertices);
        let indices = match kind {
            PrimitiveKind::Quads => IndexBuffer::quads(device, capacity),
            PrimitiveKind::Triangles | PrimitiveKind::Lines => {
                IndexBuffer::sequential(device, vertices)
            }
        };
        Self {
            positions,
            texture_coords,
            colors,
            normals,
            binormals,
            tangents,
            indices,
            kind,
            capacity,
            primitives: 0,
            vertices: 0,
        }
    }

    /// The primitive kind these buffers were allocated for.
    #[must_use]
    pub const fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    /// The most primitives the buffers hold before they must be flushed.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of primitives written since the last clear.
    #[must_use]
    pub const fn primitives(&self) -> usize {
        self.primitives
    }

    /// The number of vertices written since the last clear.
    #[must_use]
    pub const fn vertices(&self) -> usize {
        self.vertices
    }

    /// The number of vertices that can still be written.
    #[must_use]
    pub const fn remaining_vertices(&self) -> usize {
        self.capacity * self.kind.vertices_per_primitive() - self.vertices
    }

    /// Returns true once the primitive count reached capacity.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.primitives >= self.capacity
    }

    /// Returns true if a color stream was allocated.
    #[must_use]
    pub const fn has_colors(&self) -> bool {
        self.colors.is_some()
    }

    /// The position stream.
    #[must_use]
    pub const fn positions(&self) -> &VertexStream {
        &self.positions
    }

    /// The color stream, if allocated.
    #[must_use]
    pub const fn colors(&self) -> Option<&VertexStream> {
        self.colors.as_ref()
    }

    /// The texture coordinate stream, if allocated.
    #[must_use]
    pub const fn texture_coords(&self) -> Option<&VertexStream> {
        self.texture_coords.as_ref()
    }

    /// The index buffer.
    #[must_use]
    pub const fn indices(&self) -> &IndexBuffer {
        &self.indices
    }

    /// Writes `vertices` to every allocated stream. Colors are only written
    /// when `write_colors` is set. Either every vertex is written or, if they
    /// don't fit, none are.
    pub fn write(&mut self, vertices: &[Vertex], write_colors: bool) -> Result<()> {
        if vertices.len() > self.remaining_vertices() {
            return Err(Error::BufferOverflow {
                requested: vertices.len(),
                available: self.remaining_vertices(),
            });
        }

        for vertex in vertices {
            let position = vertex.position;
            self.positions
                .push(&[position.x, position.y, position.z])?;
            if let Some(stream) = &mut self.texture_coords {
                let uv = vertex.texture_coord;
                stream.push(&[uv.x, uv.y])?;
            }
            if write_colors {
                if let Some(stream) = &mut self.colors {
                    stream.push(&vertex.color.rgba())?;
                }
            }
            for (stream, value) in [
                (&mut self.normals, vertex.normal),
                (&mut self.binormals, vertex.binormal),
                (&mut self.tangents, vertex.tangent),
            ] {
                if let Some(stream) = stream {
                    let value = value.unwrap_or_else(Vector3D::zero);
                    stream.push(&[value.x, value.y, value.z])?;
                }
            }
        }
        self.vertices += vertices.len();
        Ok(())
    }

    /// Counts `count` more primitives as written.
    pub fn add_primitives(&mut self, count: usize) {
        self.primitives += count;
    }

    /// Rewinds every stream and resets the counters.
    pub fn clear(&mut self) {
        for stream in self.streams_mut() {
            stream.rewind();
        }
        self.primitives = 0;
        self.vertices = 0;
    }

    /// Drops the CPU mirrors. The GPU buffers and the counters are kept so
    /// the uploaded contents can still be drawn.
    pub fn release_mirrors(&mut self) {
        for stream in self.streams_mut() {
            stream.data = None;
        }
    }

    /// Binds every stream the effect reads, uploading the written portion
    /// first when `upload` is set.
    pub fn bind(
        &self,
        device: &mut dyn Device,
        effect: &Effect,
        usage: BufferUsage,
        upload: bool,
        use_colors: bool,
    ) {
        for stream in self.streams() {
            if stream.attribute == VertexAttribute::Color && !use_colors {
                continue;
            }
            device.bind_attribute(effect, stream.attribute, stream.gpu);
            if upload {
                stream.upload(device, usage);
            }
        }
    }

    /// Releases every GPU buffer.
    pub fn destroy(self, device: &mut dyn Device) {
        for stream in self.streams() {
            device.delete_buffer(stream.gpu);
        }
        device.delete_buffer(self.indices.gpu);
    }

    fn streams(&self) -> impl Iterator<Item = &VertexStream> {
        let optional = [
            &self.texture_coords,
            &self.colors,
            &self.normals,
            &self.binormals,
            &self.tangents,
        ];
        std::iter::once(&self.positions)
            .chain(IntoIterator::into_iter(optional).filter_map(Option::as_ref))
    }

    fn streams_mut(&mut self) -> impl Iterator<Item = &mut VertexStream> {
        let optional = [
            &mut self.texture_coords,
            &mut self.colors,
            &mut self.normals,
            &mut self.binormals,
            &mut self.tangents,
        ];
        std::iter::once(&mut self.positions)
            .chain(IntoIterator::into_iter(optional).filter_map(Option::as_mut))
    }
}
