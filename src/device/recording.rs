use std::{cell::RefCell, rc::Rc};

use super::{BufferId, Device, IndexFormat, MatrixUniform, Topology, VertexAttribute};
use crate::{
    blend::{BlendMode, BufferUsage},
    color::Color,
    effect::{Effect, EffectFlags},
    math::{Rect, Transform},
    texture::{Texture, TextureFilter, TextureWrap},
};

/// A call made on a [`RecordingDevice`].
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    /// A buffer was allocated.
    CreateBuffer(BufferId),
    /// A buffer was released.
    DeleteBuffer(BufferId),
    /// Vertex data was uploaded.
    UploadVertices {
        /// The destination buffer.
        buffer: BufferId,
        /// The uploaded values.
        data: Vec<f32>,
        /// The usage hint given.
        usage: BufferUsage,
    },
    /// Index data was uploaded.
    UploadIndices {
        /// The destination buffer.
        buffer: BufferId,
        /// The uploaded indices, widened to 32 bits.
        indices: Vec<u32>,
        /// The index width.
        format: IndexFormat,
    },
    /// A vertex stream was bound.
    BindAttribute {
        /// The id of the effect.
        effect: u64,
        /// The attribute bound.
        attribute: VertexAttribute,
        /// The buffer feeding the attribute.
        buffer: BufferId,
    },
    /// An effect was activated.
    UseEffect {
        /// The id of the effect.
        effect: u64,
        /// The override flags.
        flags: EffectFlags,
    },
    /// A matrix uniform was uploaded.
    SetMatrix {
        /// The id of the effect.
        effect: u64,
        /// Which matrix.
        uniform: MatrixUniform,
        /// The matrix value.
        matrix: Transform,
    },
    /// Outline uniforms were uploaded.
    SetOutline {
        /// The id of the effect.
        effect: u64,
        /// The outline weight.
        weight: f32,
        /// The outline color.
        color: Color,
    },
    /// A texture was bound.
    BindTexture {
        /// The id of the effect.
        effect: u64,
        /// The id of the texture.
        texture: u64,
        /// The filter used.
        filter: TextureFilter,
        /// The wrap mode used.
        wrap: TextureWrap,
    },
    /// The blend mode changed.
    SetBlendMode(BlendMode),
    /// The viewport changed.
    SetViewport(Rect),
    /// Primitives were drawn.
    DrawElements {
        /// The primitive topology.
        topology: Topology,
        /// The index buffer used.
        indices: BufferId,
        /// The index width.
        format: IndexFormat,
        /// The number of indices drawn.
        count: usize,
    },
}

/// A shared view of the commands a [`RecordingDevice`] received. Cheap to
/// clone.
#[derive(Debug, Clone, Default)]
pub struct CommandLog(Rc<RefCell<Vec<DeviceCommand>>>);

impl CommandLog {
    /// Returns a copy of every recorded command.
    #[must_use]
    pub fn commands(&self) -> Vec<DeviceCommand> {
        self.0.borrow().clone()
    }

    /// Returns `(topology, index count)` for every recorded draw call.
    #[must_use]
    pub fn draws(&self) -> Vec<(Topology, usize)> {
        self.0
            .borrow()
            .iter()
            .filter_map(|command| match command {
                DeviceCommand::DrawElements {
                    topology, count, ..
                } => Some((*topology, *count)),
                _ => None,
            })
            .collect()
    }

    /// Returns the data of every vertex upload to `buffer`, oldest first.
    #[must_use]
    pub fn uploads_to(&self, buffer: BufferId) -> Vec<Vec<f32>> {
        self.0
            .borrow()
            .iter()
            .filter_map(|command| match command {
                DeviceCommand::UploadVertices {
                    buffer: target,
                    data,
                    ..
                } if *target == buffer => Some(data.clone()),
                _ => None,
            })
            .collect()
    }

    /// Returns the buffer last bound to `attribute`, if any.
    #[must_use]
    pub fn last_bound(&self, attribute: VertexAttribute) -> Option<BufferId> {
        self.0.borrow().iter().rev().find_map(|command| match command {
            DeviceCommand::BindAttribute {
                attribute: bound,
                buffer,
                ..
            } if *bound == attribute => Some(*buffer),
            _ => None,
        })
    }

    /// Returns the number of recorded commands matching `predicate`.
    pub fn count<F: Fn(&DeviceCommand) -> bool>(&self, predicate: F) -> usize {
        self.0.borrow().iter().filter(|c| predicate(c)).count()
    }

    /// Forgets every recorded command.
    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    fn push(&self, command: DeviceCommand) {
        self.0.borrow_mut().push(command);
    }
}

/// A [`Device`] that renders nothing and records every call it receives.
/// Useful for headless runs and for inspecting what a batch submits.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    log: CommandLog,
    next_buffer: u64,
}

impl RecordingDevice {
    /// Creates a device with an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handle to the command log. The handle stays valid after the
    /// device is moved into a [`Graphics`](crate::Graphics).
    #[must_use]
    pub fn log(&self) -> CommandLog {
        self.log.clone()
    }
}

fn decode<T: bytemuck::Pod>(data: &[u8]) -> Vec<T> {
    data.chunks_exact(std::mem::size_of::<T>())
        .map(bytemuck::pod_read_unaligned)
        .collect()
}

impl Device for RecordingDevice {
    fn create_buffer(&mut self) -> BufferId {
        let id = BufferId(self.next_buffer);
        self.next_buffer += 1;
        self.log.push(DeviceCommand::CreateBuffer(id));
        id
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        self.log.push(DeviceCommand::DeleteBuffer(buffer));
    }

    fn upload_vertices(&mut self, buffer: BufferId, data: &[u8], usage: BufferUsage) {
        self.log.push(DeviceCommand::UploadVertices {
            buffer,
            data: decode(data),
            usage,
        });
    }

    fn upload_indices(&mut self, buffer: BufferId, data: &[u8], format: IndexFormat) {
        let indices = match format {
            IndexFormat::U16 => decode::<u16>(data).into_iter().map(u32::from).collect(),
            IndexFormat::U32 => decode::<u32>(data),
        };
        self.log.push(DeviceCommand::UploadIndices {
            buffer,
            indices,
            format,
        });
    }

    fn bind_attribute(&mut self, effect: &Effect, attribute: VertexAttribute, buffer: BufferId) {
        self.log.push(DeviceCommand::BindAttribute {
            effect: effect.id(),
            attribute,
            buffer,
        });
    }

    fn use_effect(&mut self, effect: &Effect, flags: EffectFlags) {
        self.log.push(DeviceCommand::UseEffect {
            effect: effect.id(),
            flags,
        });
    }

    fn set_matrix(&mut self, effect: &Effect, uniform: MatrixUniform, matrix: &Transform) {
        self.log.push(DeviceCommand::SetMatrix {
            effect: effect.id(),
            uniform,
            matrix: *matrix,
        });
    }

    fn set_outline(&mut self, effect: &Effect, weight: f32, color: Color) {
        self.log.push(DeviceCommand::SetOutline {
            effect: effect.id(),
            weight,
            color,
        });
    }

    fn bind_texture(
        &mut self,
        effect: &Effect,
        texture: &Texture,
        filter: TextureFilter,
        wrap: TextureWrap,
    ) {
        self.log.push(DeviceCommand::BindTexture {
            effect: effect.id(),
            texture: texture.id(),
            filter,
            wrap,
        });
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.log.push(DeviceCommand::SetBlendMode(mode));
    }

    fn set_viewport(&mut self, region: Rect) {
        self.log.push(DeviceCommand::SetViewport(region));
    }

    fn draw_elements(
        &mut self,
        topology: Topology,
        indices: BufferId,
        format: IndexFormat,
        count: usize,
    ) {
        self.log.push(DeviceCommand::DrawElements {
            topology,
            indices,
            format,
            count,
        });
    }
}
