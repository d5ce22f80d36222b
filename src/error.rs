/// All errors that `kludgine-batch` can return.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// `begin()` was called on a batch that is already drawing.
    #[error("batch is already drawing; call end() before begin()")]
    AlreadyDrawing,
    /// An operation that requires an open scope was called outside of
    /// `begin()`/`end()`.
    #[error("batch is not drawing; call begin() first")]
    NotDrawing,
    /// The batch was destroyed and can no longer be used.
    #[error("batch was destroyed")]
    Destroyed,
    /// The batch was frozen by `make_static()` and its contents can't change.
    #[error("batch is static and its contents can't be modified")]
    Static,
    /// A texture was used before its data finished loading.
    #[error("texture is not loaded")]
    TextureNotLoaded,
    /// A write went past the end of a vertex stream.
    #[error("vertex stream overflow: {requested} values requested, {available} available")]
    BufferOverflow {
        /// The number of values the write needed.
        requested: usize,
        /// The number of values that were left in the stream.
        available: usize,
    },
}
