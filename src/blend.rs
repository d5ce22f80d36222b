/// How the fragments of a draw call combine with what's already in the
/// render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum BlendMode {
    /// Standard alpha blending.
    AlphaBlend,
    /// No blending. Source replaces destination.
    Opaque,
    /// Source is added to destination.
    Additive,
    /// Source multiplies destination.
    Multiply,
    /// Source is subtracted from destination.
    Subtract,
    /// Inverse of multiplying the inverses.
    Screen,
    /// Multiply or screen depending on the destination.
    Overlay,
    /// Inverts the destination where the source is drawn.
    Invert,
    /// Keeps the darker of source and destination.
    Darken,
    /// Keeps destination only where the source is opaque.
    DestIn,
    /// Keeps destination only where the source is transparent.
    DestOut,
}

impl Default for BlendMode {
    fn default() -> Self {
        Self::AlphaBlend
    }
}

/// How often a batch expects its vertex buffers to be rewritten. Passed to the
/// device as an upload hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum BufferUsage {
    /// Rewritten every frame.
    Stream,
    /// Rewritten occasionally.
    Dynamic,
    /// Written once and drawn many times.
    Static,
}

impl Default for BufferUsage {
    fn default() -> Self {
        Self::Stream
    }
}
