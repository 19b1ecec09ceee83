//! CPU rasterization of a single slide.
//!
//! The whole surface is filled with the slide background, then the wrapped lines from the
//! layout engine are stacked around the vertical center and each line is centered horizontally.
//! Lines wider than the layout box are condensed horizontally to fit it.

use crate::assets::fonts::{FontSet, TextShaper};
use crate::foundation::core::{Canvas, Rgb8};
use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::foundation::math::unpremultiply_rgba8_in_place;
use crate::layout::text::{LayoutBox, LayoutResult, layout_text};
use crate::render::backend::FrameRGBA;
use crate::scene::model::Slide;
use vello_cpu::kurbo::{Affine, Rect};

/// Reusable raster surface plus text shaper for one canvas size.
pub struct SlideRasterizer {
    canvas: Canvas,
    bbox: LayoutBox,
    shaper: TextShaper,
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
}

impl SlideRasterizer {
    /// Allocate a `canvas`-sized surface and register `fonts`.
    pub fn new(canvas: Canvas, fonts: &FontSet) -> SlidecastResult<Self> {
        let (w, h) = surface_dims(canvas)?;
        Ok(Self {
            canvas,
            bbox: LayoutBox::for_canvas(canvas),
            shaper: TextShaper::new(fonts)?,
            ctx: vello_cpu::RenderContext::new(w, h),
            pixmap: vello_cpu::Pixmap::new(w, h),
        })
    }

    /// Surface dimensions.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Box the layout engine wraps text into.
    pub fn layout_box(&self) -> LayoutBox {
        self.bbox
    }

    /// Compute font size and lines for `slide` with this rasterizer's fonts.
    #[tracing::instrument(skip(self, slide), fields(slide = %slide.id))]
    pub fn layout(&mut self, slide: &Slide) -> LayoutResult {
        let out = layout_text(&slide.text, &self.bbox, &mut self.shaper);
        tracing::debug!(
            font_size_px = out.font_size_px,
            lines = out.lines.len(),
            "slide laid out"
        );
        out
    }

    /// Paint `slide` and read the surface back.
    ///
    /// Deterministic: identical slides produce identical pixels.
    pub fn render(&mut self, slide: &Slide) -> SlidecastResult<FrameRGBA> {
        let has_text = slide.text.split_whitespace().next().is_some();
        if has_text && !self.shaper.has_fonts() {
            return Err(SlidecastError::raster(
                "no usable font in the fallback chain; cannot draw slide text",
            ));
        }
        let layout = self.layout(slide);

        let width = f64::from(self.canvas.width);
        let height = f64::from(self.canvas.height);

        self.ctx.reset();
        self.ctx.set_transform(Affine::IDENTITY);
        self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            slide.bg.r, slide.bg.g, slide.bg.b, 255,
        ));
        self.ctx.fill_rect(&Rect::new(0.0, 0.0, width, height));

        let font_size = f64::from(layout.font_size_px);
        let line_height = layout.line_height_px();
        let mut y = height / 2.0 - layout.block_height_px() / 2.0 + font_size / 2.0;
        for line in &layout.lines {
            self.draw_line(line, layout.font_size_px, width / 2.0, y, slide.text_color)?;
            y += line_height;
        }

        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.pixmap);

        let mut data = self.pixmap.data_as_u8_slice().to_vec();
        unpremultiply_rgba8_in_place(&mut data);
        Ok(FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data,
        })
    }

    /// Paint `slide` and encode the surface as PNG.
    pub fn render_png(&mut self, slide: &Slide) -> SlidecastResult<Vec<u8>> {
        self.render(slide)?.to_png()
    }

    /// Draw one line centered on `(center_x, middle_y)` with a "middle" baseline.
    fn draw_line(
        &mut self,
        text: &str,
        font_size_px: u32,
        center_x: f64,
        middle_y: f64,
        color: Rgb8,
    ) -> SlidecastResult<()> {
        let shaped = self.shaper.shape_line(text, font_size_px);
        let natural = f64::from(shaped.width());
        let max_width = f64::from(self.bbox.max_width_px);
        let scale_x = if natural > max_width && natural > 0.0 {
            max_width / natural
        } else {
            1.0
        };
        let x0 = center_x - natural * scale_x / 2.0;

        self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            color.r, color.g, color.b, 255,
        ));
        for line in shaped.lines() {
            let m = line.metrics();
            let baseline_y = middle_y + f64::from(m.ascent - m.descent) / 2.0;
            let dy = baseline_y - f64::from(m.baseline);
            self.ctx.set_transform(
                Affine::translate((x0, dy)) * Affine::scale_non_uniform(scale_x, 1.0),
            );
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let font_ref = run.run().font();
                let font = self
                    .shaper
                    .paint_font(font_ref.data.id(), font_ref.index)?;
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                self.ctx
                    .glyph_run(&font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        Ok(())
    }
}

fn surface_dims(canvas: Canvas) -> SlidecastResult<(u16, u16)> {
    if canvas.width == 0 || canvas.height == 0 {
        return Err(SlidecastError::invalid_project(
            "raster surface width/height must be positive",
        ));
    }
    let w: u16 = canvas
        .width
        .try_into()
        .map_err(|_| SlidecastError::raster("surface width exceeds u16"))?;
    let h: u16 = canvas
        .height
        .try_into()
        .map_err(|_| SlidecastError::raster("surface height exceeds u16"))?;
    Ok((w, h))
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
