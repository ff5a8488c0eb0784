use std::io::Cursor;

use super::*;
use crate::test_support::test_font;
use crate::assets::font::{FontFace, ParleyMetrics};
use crate::assets::pictogram::PictogramResolver;
use crate::foundation::rng::Rng64;
use crate::layout::engine::LayoutConfig;
use crate::layout::paginate::PagePolicy;
use crate::transcript::lrc::TimedWord;

struct Fixture {
    layout: LyricLayout,
    store: PreparedWordStore,
}

fn fixture(face: &FontFace, texts: &[&str], pictograms: &PictogramResolver) -> Fixture {
    let words: Vec<TimedWord> = texts
        .iter()
        .enumerate()
        .map(|(i, t)| TimedWord {
            time: i as f64,
            text: (*t).to_owned(),
        })
        .collect();
    let cfg = LayoutConfig {
        canvas: Canvas::new(320, 240).unwrap(),
        margin: 0.0,
        line_spacing: 20.0,
        pictogram_size: 40.0,
        page_policy: PagePolicy::new([1]).unwrap(),
    };
    let mut metrics = ParleyMetrics::new(face, [0, 0, 0, 255]).unwrap();
    let layout = LyricLayout::build(&words, &cfg, &mut metrics, &mut Rng64::new(1)).unwrap();
    let store = PreparedWordStore::prepare(&layout, face, &mut metrics, pictograms).unwrap();
    Fixture { layout, store }
}

fn count_px(frame: &FrameRGBA, px: [u8; 4]) -> usize {
    frame
        .data
        .chunks_exact(4)
        .filter(|p| *p == px.as_slice())
        .count()
}

#[test]
fn rejects_canvas_beyond_u16() {
    let canvas = Canvas::new(70_000, 10).unwrap();
    assert!(CpuFrameRenderer::new(canvas, RenderStyle::default()).is_err());
}

#[test]
fn rejects_translucent_key_color() {
    let style = RenderStyle {
        background_rgba: [0, 255, 0, 128],
        ..RenderStyle::default()
    };
    let err = CpuFrameRenderer::new(Canvas::new(10, 10).unwrap(), style).unwrap_err();
    assert!(err.to_string().contains("opaque"));
}

#[test]
fn blank_view_is_solid_background() {
    let Some(face) = test_font(40.0) else {
        return;
    };
    let fx = fixture(&face, &["hello"], &PictogramResolver::disabled());
    let mut r = CpuFrameRenderer::new(fx.layout.canvas(), RenderStyle::default()).unwrap();

    let frame = r.render(&fx.layout, &fx.layout.visible_at(-1.0), &fx.store).unwrap();
    assert_eq!((frame.width, frame.height), (320, 240));
    assert!(frame.premultiplied);
    assert_eq!(count_px(&frame, [0, 255, 0, 255]), 320 * 240);
}

#[test]
fn revealed_word_draws_text_and_shadow() {
    let Some(face) = test_font(40.0) else {
        return;
    };
    let fx = fixture(&face, &["hello"], &PictogramResolver::disabled());
    let mut r = CpuFrameRenderer::new(fx.layout.canvas(), RenderStyle::default()).unwrap();

    let frame = r.render(&fx.layout, &fx.layout.visible_at(0.0), &fx.store).unwrap();
    assert!(count_px(&frame, [0, 0, 0, 255]) > 0);
    assert!(count_px(&frame, [255, 255, 255, 255]) > 0);
    assert!(count_px(&frame, [0, 255, 0, 255]) > 320 * 240 / 2);
}

#[test]
fn renderer_reuse_is_stable() {
    let Some(face) = test_font(40.0) else {
        return;
    };
    let fx = fixture(&face, &["la", "la"], &PictogramResolver::disabled());
    let mut r = CpuFrameRenderer::new(fx.layout.canvas(), RenderStyle::default()).unwrap();
    let view = fx.layout.visible_at(5.0);
    let a = r.render(&fx.layout, &view, &fx.store).unwrap();
    let _ = r.render(&fx.layout, &fx.layout.visible_at(-1.0), &fx.store).unwrap();
    let b = r.render(&fx.layout, &view, &fx.store).unwrap();
    assert_eq!(a, b);
    assert_eq!(a, r.settings().build().render(&fx.layout, &view, &fx.store).unwrap());
}

#[test]
fn pictogram_image_is_centered_on_line() {
    let Some(face) = test_font(40.0) else {
        return;
    };
    let dir = std::env::temp_dir().join(format!("karaoke_cpu_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let img = image::RgbaImage::from_pixel(8, 8, image::Rgba([255, 0, 0, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    std::fs::write(dir.join("1f600.png"), buf).unwrap();

    let fx = fixture(&face, &["\u{1F600}"], &PictogramResolver::new(&dir, 40));
    let mut r = CpuFrameRenderer::new(fx.layout.canvas(), RenderStyle::default()).unwrap();
    let view = fx.layout.visible_at(0.0);
    let frame = r.render(&fx.layout, &view, &fx.store).unwrap();

    let d = view.draws[0];
    let cy = d.origin.y + (fx.layout.line_height() / 2.0).floor();
    assert_eq!(frame.pixel(20, cy as u32), Some([255, 0, 0, 255]));
    let red = count_px(&frame, [255, 0, 0, 255]);
    assert!(red >= 36 * 36 && red <= 40 * 40, "{red}");

    let _ = std::fs::remove_dir_all(&dir);
}
