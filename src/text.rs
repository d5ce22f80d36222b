use std::collections::HashMap;

use crate::{
    math::{Point, Rect, Vector},
    sprite::{Sprite, SpriteColor, SpritesGroup},
    texture::{Texture, TextureKind},
    Error, Result,
};

/// Placement of one character within a [`FontTexture`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    /// Where the glyph is in the texture, in pixels.
    pub source: Rect,
    /// Offset from the pen position to the glyph's left edge and vertical
    /// center, at the font's native size.
    pub offset: Vector,
    /// How far the pen moves after the glyph, at the font's native size.
    pub x_advance: f32,
}

/// A texture holding rendered characters and the table locating each one.
#[derive(Debug, Clone)]
pub struct FontTexture {
    texture: Texture,
    font_size: f32,
    line_height: f32,
    glyphs: HashMap<char, Glyph>,
    placeholder: char,
}

impl FontTexture {
    /// Wraps `texture`, rendered at `font_size` with `line_height` pixels
    /// between baselines. Characters without a glyph are drawn as `'?'`.
    #[must_use]
    pub fn new(texture: Texture, font_size: f32, line_height: f32) -> Self {
        Self {
            texture,
            font_size,
            line_height,
            glyphs: HashMap::new(),
            placeholder: '?',
        }
    }

    /// Registers the glyph for `character`.
    #[must_use]
    pub fn with_glyph(mut self, character: char, glyph: Glyph) -> Self {
        self.insert_glyph(character, glyph);
        self
    }

    /// Registers the glyph for `character`, replacing any previous one.
    pub fn insert_glyph(&mut self, character: char, glyph: Glyph) {
        self.glyphs.insert(character, glyph);
    }

    /// Draws characters without a glyph using `placeholder` instead.
    pub fn set_placeholder(&mut self, placeholder: char) {
        self.placeholder = placeholder;
    }

    /// The texture holding the glyphs.
    #[must_use]
    pub const fn texture(&self) -> &Texture {
        &self.texture
    }

    /// The size the glyphs were rendered at.
    #[must_use]
    pub const fn font_size(&self) -> f32 {
        self.font_size
    }

    /// Distance between baselines at [`Self::font_size`].
    #[must_use]
    pub const fn line_height(&self) -> f32 {
        self.line_height
    }

    /// Returns true if the glyphs are stored as a multi-channel signed
    /// distance field.
    #[must_use]
    pub fn is_msdf(&self) -> bool {
        self.texture.kind() == TextureKind::MsdfFont
    }

    /// The glyph for `character`, or the placeholder's glyph.
    #[must_use]
    pub fn glyph(&self, character: char) -> Option<&Glyph> {
        self.glyphs
            .get(&character)
            .or_else(|| self.glyphs.get(&self.placeholder))
    }
}

/// How each line of text is placed relative to the starting position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum TextAlignment {
    /// Lines start at the position.
    Left,
    /// Lines end at the position.
    Right,
    /// Lines are centered on the position.
    Center,
}

impl Default for TextAlignment {
    fn default() -> Self {
        Self::Left
    }
}

/// Lays out `text` as one sprite per visible character.
///
/// `font_size` defaults to the font's own size. `margin` scales the advance
/// between characters (x) and between lines (y). The returned group is
/// positioned at `offset`.
pub fn build_text(
    font: &FontTexture,
    text: &str,
    font_size: Option<f32>,
    color: impl Into<SpriteColor>,
    alignment: TextAlignment,
    offset: Option<Point>,
    margin: Option<Vector>,
) -> Result<SpritesGroup> {
    if !font.texture.is_valid() {
        return Err(Error::TextureNotLoaded);
    }

    let color = color.into();
    let scale = font_size.unwrap_or(font.font_size) / font.font_size;
    let margin = margin.unwrap_or_else(|| Vector::new(1., 1.));
    // Distance field glyph tables are measured at twice the drawn size.
    let offset_scale = if font.is_msdf() { scale * 0.5 } else { scale };

    let mut group = SpritesGroup::new();
    let mut pen = Point::zero();
    let mut line_start = 0;
    let mut line_width = 0.;

    for character in text.chars() {
        if character == '\n' {
            align_line(&mut group, line_start, line_width, alignment);
            pen.x = 0.;
            pen.y += font.line_height * scale * margin.y;
            line_start = group.len();
            line_width = 0.;
            continue;
        }

        let glyph = match font.glyph(character) {
            Some(glyph) => glyph,
            None => continue,
        };

        if character != ' ' {
            let mut sprite = Sprite::new(
                Some(font.texture.clone()),
                pen + glyph.offset * offset_scale,
                glyph.source.size * scale,
            )
            .with_source(glyph.source)
            .with_origin(Point::new(0., 0.5));
            sprite.color = color.clone();
            group.push(sprite);
        }

        let advance = glyph.x_advance * scale * margin.x;
        line_width += advance;
        pen.x += advance;
    }
    align_line(&mut group, line_start, line_width, alignment);

    if let Some(offset) = offset {
        group.position = offset;
    }
    Ok(group)
}

fn align_line(group: &mut SpritesGroup, start: usize, width: f32, alignment: TextAlignment) {
    let shift = match alignment {
        TextAlignment::Left => return,
        TextAlignment::Right => -width,
        TextAlignment::Center => -width / 2.,
    };
    for sprite in &mut group.sprites_mut()[start..] {
        sprite.position.x += shift;
    }
}
