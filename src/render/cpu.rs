use std::sync::Arc;

use crate::assets::decode::PreparedImage;
use crate::assets::font::TextBrushRgba8;
use crate::assets::store::{PreparedWordStore, WordArt};
use crate::foundation::core::{Canvas, Point};
use crate::foundation::error::{KaraokeError, KaraokeResult};
use crate::layout::engine::LyricLayout;
use crate::layout::visibility::{DrawInstruction, FrameView};
use crate::render::backend::{FrameRGBA, RenderStyle};

#[derive(Clone, Debug)]
struct ImagePaint {
    paint: vello_cpu::Image,
    w: u32,
    h: u32,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct RendererSettings {
    width: u16,
    height: u16,
    style: RenderStyle,
}

impl RendererSettings {
    pub(crate) fn build(self) -> CpuFrameRenderer {
        CpuFrameRenderer {
            width: self.width,
            height: self.height,
            style: self.style,
            ctx: None,
            target: None,
            image_cache: Vec::new(),
        }
    }
}

/// CPU raster renderer powered by `vello_cpu`.
///
/// Holds a reusable render context and output pixmap; one instance per render worker.
#[derive(Debug)]
pub struct CpuFrameRenderer {
    width: u16,
    height: u16,
    style: RenderStyle,
    ctx: Option<vello_cpu::RenderContext>,
    target: Option<vello_cpu::Pixmap>,
    image_cache: Vec<Option<ImagePaint>>,
}

impl CpuFrameRenderer {
    pub fn new(canvas: Canvas, style: RenderStyle) -> KaraokeResult<Self> {
        let width: u16 = canvas
            .width
            .try_into()
            .map_err(|_| KaraokeError::validation("canvas width exceeds u16"))?;
        let height: u16 = canvas
            .height
            .try_into()
            .map_err(|_| KaraokeError::validation("canvas height exceeds u16"))?;
        if !style.shadow_offset_px.is_finite() {
            return Err(KaraokeError::validation("shadow offset must be finite"));
        }
        if style.background_rgba[3] != u8::MAX {
            return Err(KaraokeError::validation("key color must be opaque"));
        }
        Ok(Self {
            width,
            height,
            style,
            ctx: None,
            target: None,
            image_cache: Vec::new(),
        })
    }

    /// Validated settings, shareable across worker threads.
    pub(crate) fn settings(&self) -> RendererSettings {
        RendererSettings {
            width: self.width,
            height: self.height,
            style: self.style,
        }
    }

    /// Draw `view` over the background color.
    pub fn render(
        &mut self,
        layout: &LyricLayout,
        view: &FrameView<'_>,
        store: &PreparedWordStore,
    ) -> KaraokeResult<FrameRGBA> {
        let mut ctx = match self.ctx.take() {
            Some(ctx) => ctx,
            None => vello_cpu::RenderContext::new(self.width, self.height),
        };
        ctx.reset();

        let drawn = self.draw_view(&mut ctx, layout, view, store);
        let out = drawn.map(|()| {
            let mut target = self
                .target
                .take()
                .unwrap_or_else(|| vello_cpu::Pixmap::new(self.width, self.height));
            ctx.flush();
            ctx.render_to_pixmap(&mut target);
            let frame = FrameRGBA {
                width: u32::from(self.width),
                height: u32::from(self.height),
                data: target.data_as_u8_slice().to_vec(),
                premultiplied: true,
            };
            self.target = Some(target);
            frame
        });
        self.ctx = Some(ctx);
        out
    }

    fn draw_view(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        layout: &LyricLayout,
        view: &FrameView<'_>,
        store: &PreparedWordStore,
    ) -> KaraokeResult<()> {
        let [r, g, b, a] = self.style.background_rgba;
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(self.width),
            f64::from(self.height),
        ));

        for draw in &view.draws {
            let id = store.id_for_word(draw.word)?;
            match store.get(id)? {
                WordArt::Glyphs(text) => {
                    let shadow =
                        Point::new(draw.origin.x + self.style.shadow_offset_px, draw.origin.y);
                    let shadow_brush = TextBrushRgba8::from_rgba(self.style.shadow_rgba);
                    draw_glyphs(ctx, text, store.font(), shadow, Some(shadow_brush));
                    draw_glyphs(ctx, text, store.font(), draw.origin, None);
                }
                WordArt::Image(img) => {
                    let paint = self.image_paint_for(id, img)?;
                    draw_image(ctx, &paint, draw, layout.line_height());
                }
            }
        }
        Ok(())
    }

    fn image_paint_for(&mut self, id: usize, img: &PreparedImage) -> KaraokeResult<ImagePaint> {
        if let Some(p) = self.image_cache.get(id).and_then(|x| x.clone()) {
            return Ok(p);
        }
        let pixmap = pixmap_from_premul_bytes(&img.rgba8_premul, img.width, img.height)?;
        let out = ImagePaint {
            paint: vello_cpu::Image {
                image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
                sampler: vello_cpu::peniko::ImageSampler::default(),
            },
            w: img.width,
            h: img.height,
        };
        if self.image_cache.len() <= id {
            self.image_cache.resize(id + 1, None);
        }
        self.image_cache[id] = Some(out.clone());
        Ok(out)
    }
}

/// Fill every glyph run of `layout` with its top-left line box at `origin`.
///
/// `brush_override` replaces the per-run brush (used for the shadow pass).
fn draw_glyphs(
    ctx: &mut vello_cpu::RenderContext,
    layout: &parley::Layout<TextBrushRgba8>,
    font: &vello_cpu::peniko::FontData,
    origin: Point,
    brush_override: Option<TextBrushRgba8>,
) {
    ctx.set_transform(vello_cpu::kurbo::Affine::translate((origin.x, origin.y)));
    for line in layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(glyph_run) = item else {
                continue;
            };
            let brush = brush_override.unwrap_or(glyph_run.style().brush);
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                brush.r, brush.g, brush.b, brush.a,
            ));

            let mut run_x = glyph_run.offset();
            let run_y = glyph_run.baseline();
            let glyphs = glyph_run.glyphs().map(|g| {
                let glyph = vello_cpu::Glyph {
                    id: g.id,
                    x: run_x + g.x,
                    y: run_y - g.y,
                };
                run_x += g.advance;
                glyph
            });
            ctx.glyph_run(font)
                .font_size(glyph_run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }
}

/// Pictograms are vertically centered on the line box.
fn draw_image(
    ctx: &mut vello_cpu::RenderContext,
    paint: &ImagePaint,
    draw: &DrawInstruction<'_>,
    line_height: f64,
) {
    let center_y = draw.origin.y + (line_height / 2.0).floor();
    let y = center_y - f64::from(paint.h / 2);
    let x = draw.origin.x.floor();

    ctx.set_transform(vello_cpu::kurbo::Affine::translate((x, y)));
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(paint.paint.clone());
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(paint.w),
        f64::from(paint.h),
    ));
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> KaraokeResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| KaraokeError::validation("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| KaraokeError::validation("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(KaraokeError::validation("pixmap byte len mismatch"));
    }
    // Pixmap stores PremulRgba8; our bytes are already premultiplied.
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect::<Vec<_>>();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
