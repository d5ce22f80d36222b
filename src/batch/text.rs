use tracing::{debug, warn};

use super::{BatchCore, DrawBatch, FlushHooks, SpriteBatchBase, SpriteOptions, DEFAULT_CAPACITY};
use crate::{
    buffer::{BufferLayout, PrimitiveKind},
    color::Color,
    effect::Effect,
    graphics::{Graphics, GraphicsState},
    sprite::SpritesGroup,
    texture::{Texture, TextureKind},
    Result,
};

/// Font settings checked and applied whenever a [`TextSpriteBatch`] flushes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextHooks {
    /// Draws glyphs as multi-channel signed distance fields.
    pub msdf_font: bool,
    /// Outline thickness. Zero disables the outline.
    pub outline_weight: f32,
    /// Outline color.
    pub outline_color: Color,
}

impl Default for TextHooks {
    fn default() -> Self {
        Self {
            msdf_font: false,
            outline_weight: 0.,
            outline_color: Color::BLACK,
        }
    }
}

impl FlushHooks for TextHooks {
    fn on_set_effect(
        &self,
        graphics: &mut GraphicsState,
        effect: &Effect,
        texture: Option<&Texture>,
    ) {
        let kind = texture.map(Texture::kind);
        if self.msdf_font {
            if kind != Some(TextureKind::MsdfFont) {
                warn!(?kind, "rendering an msdf font from a texture that isn't an msdf font");
            }
        } else if !matches!(kind, Some(TextureKind::BitmapFont | TextureKind::MsdfFont)) {
            warn!(?kind, "rendering text from a texture that isn't a font");
        }

        if self.outline_weight > 0. {
            if effect.supports_outline() {
                graphics.set_outline(effect, self.outline_weight, self.outline_color);
            } else {
                debug!(effect = effect.name(), "effect has no outline, ignoring");
            }
        }
    }
}

/// Batches glyph quads sampled from a font texture.
#[derive(Debug)]
pub struct TextSpriteBatch {
    core: BatchCore,
    hooks: TextHooks,
    /// Placement options.
    pub options: SpriteOptions,
}

impl TextSpriteBatch {
    /// Creates a batch holding [`DEFAULT_CAPACITY`] glyphs.
    #[must_use]
    pub fn new(graphics: &Graphics) -> Self {
        Self::with_capacity(graphics, DEFAULT_CAPACITY)
    }

    /// Creates a batch holding `glyphs` glyphs before flushing.
    #[must_use]
    pub fn with_capacity(graphics: &Graphics, glyphs: usize) -> Self {
        let layout = BufferLayout {
            texture_coords: true,
            colors: true,
            ..BufferLayout::default()
        };
        Self {
            core: BatchCore::new(graphics, PrimitiveKind::Quads, glyphs, layout, true),
            hooks: TextHooks::default(),
            options: SpriteOptions::default(),
        }
    }

    /// Returns true if glyphs are drawn as signed distance fields.
    #[must_use]
    pub const fn msdf_font(&self) -> bool {
        self.hooks.msdf_font
    }

    /// Selects signed distance field rendering. Changes the default effect
    /// used by the next `begin()`.
    pub fn set_msdf_font(&mut self, msdf: bool) {
        self.hooks.msdf_font = msdf;
    }

    /// The outline weight and color.
    #[must_use]
    pub const fn outline(&self) -> (f32, Color) {
        (self.hooks.outline_weight, self.hooks.outline_color)
    }

    /// Configures the outline. A weight of zero disables it.
    pub fn set_outline(&mut self, weight: f32, color: Color) {
        self.hooks.outline_weight = weight;
        self.hooks.outline_color = color;
    }

    /// Draws every glyph of `text`, as built by
    /// [`build_text`](crate::text::build_text), using the group's transform.
    pub fn draw_text(
        &mut self,
        text: &SpritesGroup,
        cull_out_of_screen: Option<bool>,
    ) -> Result<()> {
        let transform = text.transform();
        self.draw_sprites(text.sprites(), transform.as_ref(), cull_out_of_screen)
    }
}

impl DrawBatch for TextSpriteBatch {
    fn core(&self) -> &BatchCore {
        &self.core
    }

    fn parts_mut(&mut self) -> (&mut BatchCore, &dyn FlushHooks) {
        (&mut self.core, &self.hooks)
    }

    fn default_effect(&self) -> Effect {
        let effects = self.core.graphics().builtin_effects();
        if self.hooks.msdf_font {
            effects.msdf_font
        } else if self.hooks.outline_weight > 0. {
            effects.sprites_with_outline
        } else {
            effects.sprites
        }
    }
}

impl SpriteBatchBase for TextSpriteBatch {
    fn sprite_options(&self) -> SpriteOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        device::{DeviceCommand, RecordingDevice},
        math::{Point, Rect, Size, Vector},
        text::{build_text, FontTexture, Glyph, TextAlignment},
    };

    fn font(kind: TextureKind) -> FontTexture {
        FontTexture::new(Texture::with_kind(Size::new(32, 32), kind), 16., 18.).with_glyph(
            'x',
            Glyph {
                source: Rect::new(Point::zero(), Size::new(8., 8.)),
                offset: Vector::zero(),
                x_advance: 8.,
            },
        )
    }

    #[test]
    fn default_effect_follows_mode() {
        let graphics = Graphics::new(RecordingDevice::new());
        let effects = graphics.builtin_effects();
        let mut batch = TextSpriteBatch::new(&graphics);
        assert_eq!(batch.default_effect(), effects.sprites);
        batch.set_outline(2., Color::RED);
        assert_eq!(batch.default_effect(), effects.sprites_with_outline);
        batch.set_msdf_font(true);
        assert_eq!(batch.default_effect(), effects.msdf_font);
    }

    #[test]
    fn outline_is_applied_on_flush() {
        let device = RecordingDevice::new();
        let log = device.log();
        let graphics = Graphics::new(device);
        let font = font(TextureKind::BitmapFont);
        let text = build_text(
            &font,
            "xxx",
            None,
            Color::WHITE,
            TextAlignment::Left,
            None,
            None,
        )
        .unwrap();

        let mut batch = TextSpriteBatch::new(&graphics);
        batch.set_outline(1.5, Color::RED);
        batch.begin_default().unwrap();
        batch.draw_text(&text, None).unwrap();
        assert_eq!(batch.quads_in_batch(), 3);
        batch.end().unwrap();

        assert!(log.commands().contains(&DeviceCommand::SetOutline {
            effect: graphics.builtin_effects().sprites_with_outline.id(),
            weight: 1.5,
            color: Color::RED,
        }));
        assert_eq!(log.draws().len(), 1);
    }

    #[test]
    fn mismatched_font_still_draws() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let device = RecordingDevice::new();
        let log = device.log();
        let graphics = Graphics::new(device);
        let font = font(TextureKind::BitmapFont);
        let text = build_text(
            &font,
            "x",
            None,
            Color::WHITE,
            TextAlignment::Left,
            None,
            None,
        )
        .unwrap();

        let mut batch = TextSpriteBatch::new(&graphics);
        batch.set_msdf_font(true);
        batch.begin_default().unwrap();
        batch.draw_text(&text, None).unwrap();
        batch.end().unwrap();
        assert_eq!(log.draws().len(), 1);
        assert_eq!(
            log.count(|command| matches!(command, DeviceCommand::SetOutline { .. })),
            0
        );
    }
}
