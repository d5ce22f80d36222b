//! Draw batching for sprites, shapes, lines, and text on top of an abstract
//! graphics device.

#![forbid(unsafe_code)]
#![warn(
    clippy::cargo,
    missing_docs,
    // clippy::missing_docs_in_private_items,
    clippy::nursery,
    clippy::pedantic,
    future_incompatible,
    rust_2018_idioms,
)]
#![cfg_attr(doc, deny(rustdoc::all))]
#![allow(
    clippy::missing_errors_doc, // TODO clippy::missing_errors_doc
    clippy::missing_panics_doc, // TODO clippy::missing_panics_doc
    clippy::option_if_let_else,
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
)]

/// Batches and the begin/end protocol they share.
pub mod batch;
mod blend;
/// Vertex and index buffers owned by batches.
pub mod buffer;
/// Projection and view matrices.
pub mod camera;
mod color;
/// The interface to the graphics backend, and a recording implementation.
pub mod device;
/// Shader programs as seen by batches.
pub mod effect;
mod error;
/// Render state shared by every batch drawing to the same device.
pub mod graphics;
/// Math types for 2d and 3d geometry.
pub mod math;
/// Types describing what to draw.
pub mod sprite;
#[cfg(test)]
mod tests;
/// Font textures and text layout.
pub mod text;
/// Types for managing textures.
pub mod texture;
mod vertex;

// Re-exports
pub use euclid;
pub use palette;

pub use self::{
    blend::{BlendMode, BufferUsage},
    color::{Color, Rgba},
    error::Error,
    graphics::{FrameStats, Graphics, GraphicsConfig},
    vertex::Vertex,
};

/// A collection of commonly used exports provided by this crate.
pub mod prelude {
    pub use super::{
        batch::{
            DrawBatch, LinesBatch, ShapesBatch, SpriteBatch, SpriteBatch3D, SpriteBatchBase,
            TextSpriteBatch,
        },
        camera::Camera,
        device::{Device, RecordingDevice},
        effect::{Effect, EffectFlags},
        math::{Angle, Point, Point3D, Rect, Size, Transform, Vector},
        sprite::{Sprite, SpriteColor, SpritesGroup},
        text::{build_text, FontTexture, Glyph, TextAlignment},
        texture::{Texture, TextureFilter, TextureKind, TextureWrap},
        BlendMode, BufferUsage, Color, Error, Graphics, GraphicsConfig, Vertex,
    };
}

/// Alias for [`std::result::Result`] where the error type is [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
