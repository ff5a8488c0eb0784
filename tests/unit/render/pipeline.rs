
use super::*;
use crate::test_support::test_font;
use crate::assets::font::{FontFace, ParleyMetrics};
use crate::assets::pictogram::PictogramResolver;
use crate::encode::sink::InMemorySink;
use crate::foundation::core::Canvas;
use crate::foundation::rng::Rng64;
use crate::layout::engine::LayoutConfig;
use crate::layout::fingerprint::StableHasher;
use crate::layout::paginate::PagePolicy;
use crate::transcript::lrc::TimedWord;

fn fp(tag: u64) -> FrameFingerprint {
    let mut h = StableHasher::new();
    h.write_u64(tag);
    h.finish()
}

fn view(tag: u64) -> FrameView<'static> {
    FrameView {
        page: None,
        draws: Vec::new(),
        fingerprint: fp(tag),
    }
}

fn fixture(face: &FontFace) -> (LyricLayout, PreparedWordStore) {
    // Words at 0.5s, 1.0s and 1.5s.
    let words: Vec<TimedWord> = ["one", "two", "three"]
        .iter()
        .enumerate()
        .map(|(i, t)| TimedWord {
            time: 0.5 * (i as f64 + 1.0),
            text: (*t).to_owned(),
        })
        .collect();
    let cfg = LayoutConfig {
        canvas: Canvas::new(256, 128).unwrap(),
        margin: 0.0,
        line_spacing: 10.0,
        pictogram_size: 32.0,
        page_policy: PagePolicy::new([2]).unwrap(),
    };
    let mut metrics = ParleyMetrics::new(face, [0, 0, 0, 255]).unwrap();
    let layout = LyricLayout::build(&words, &cfg, &mut metrics, &mut Rng64::new(3)).unwrap();
    let store =
        PreparedWordStore::prepare(&layout, face, &mut metrics, &PictogramResolver::disabled())
            .unwrap();
    (layout, store)
}

fn opts(fps: u32, threading: RenderThreading) -> RenderOpts {
    RenderOpts {
        style: RenderStyle::default(),
        fps: Fps::new(fps, 1).unwrap(),
        threading,
        audio: None,
    }
}

#[test]
fn chunk_size_zero_is_normalized() {
    assert_eq!(normalized_chunk_size(0), 1);
    assert_eq!(normalized_chunk_size(17), 17);
}

#[test]
fn zero_threads_is_rejected() {
    assert!(build_thread_pool(Some(0)).is_err());
    assert!(build_thread_pool(Some(2)).is_ok());
}

#[test]
fn plan_dedups_identical_fingerprints() {
    let views = [view(1), view(1), view(2), view(1), view(2)];
    let plan = plan_unique(&views, true, None);
    assert_eq!(plan.unique, vec![0, 2]);
    assert_eq!(
        plan.frame_to_slot,
        vec![
            Slot::Unique(0),
            Slot::Unique(0),
            Slot::Unique(1),
            Slot::Unique(0),
            Slot::Unique(1)
        ]
    );
}

#[test]
fn plan_reuses_frame_carried_from_previous_chunk() {
    let carried = (
        fp(7),
        FrameRGBA {
            width: 1,
            height: 1,
            data: vec![0, 0, 0, 255],
            premultiplied: true,
        },
    );
    let views = [view(7), view(7), view(8)];
    let plan = plan_unique(&views, true, Some(&carried));
    assert_eq!(plan.unique, vec![2]);
    assert_eq!(
        plan.frame_to_slot,
        vec![Slot::Carried, Slot::Carried, Slot::Unique(0)]
    );
}

#[test]
fn plan_without_elision_renders_everything() {
    let views = [view(1), view(1), view(1)];
    let plan = plan_unique(&views, false, None);
    assert_eq!(plan.unique, vec![0, 1, 2]);
}

#[test]
fn empty_range_is_rejected() {
    let Some(face) = test_font(32.0) else {
        return;
    };
    let (layout, store) = fixture(&face);
    let range = FrameRange::new(FrameIndex(3), FrameIndex(3)).unwrap();
    let mut sink = InMemorySink::new();
    let res = render_range(
        &layout,
        &store,
        range,
        &opts(4, RenderThreading::default()),
        &mut sink,
    );
    assert!(res.is_err());
    assert!(sink.config().is_none());
}

#[test]
fn sequential_render_streams_every_frame_and_elides_repeats() {
    let Some(face) = test_font(32.0) else {
        return;
    };
    let (layout, store) = fixture(&face);
    // 4 fps over 2.5s: frames at 0, .25, .5, ..., 2.25.
    let range = FrameRange::new(FrameIndex(0), FrameIndex(10)).unwrap();
    let threading = RenderThreading {
        chunk_size: 3,
        ..RenderThreading::default()
    };
    let mut sink = InMemorySink::new();
    let stats = render_range(&layout, &store, range, &opts(4, threading), &mut sink).unwrap();

    assert!(sink.is_ended());
    let cfg = sink.config().unwrap();
    assert_eq!((cfg.width, cfg.height), (256, 128));
    let indices: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(indices, (0..10).collect::<Vec<_>>());

    // Blank, one, one+two, one+two+three (or a new page): at most four distinct views.
    assert_eq!(stats.frames_total, 10);
    assert!(stats.frames_rendered <= 4, "{stats:?}");
    assert_eq!(stats.frames_rendered + stats.frames_elided, 10);

    for f in 0..10u64 {
        let mut r = CpuFrameRenderer::new(layout.canvas(), RenderStyle::default()).unwrap();
        let direct = render_frame_at(&layout, &store, &mut r, f as f64 / 4.0).unwrap();
        assert_eq!(sink.frames()[f as usize].1, direct, "frame {f}");
    }
}

#[test]
fn parallel_matches_sequential() {
    let Some(face) = test_font(32.0) else {
        return;
    };
    let (layout, store) = fixture(&face);
    let range = FrameRange::new(FrameIndex(0), FrameIndex(12)).unwrap();

    let mut seq = InMemorySink::new();
    render_range(
        &layout,
        &store,
        range,
        &opts(5, RenderThreading::default()),
        &mut seq,
    )
    .unwrap();

    let mut par = InMemorySink::new();
    let threading = RenderThreading {
        parallel: true,
        chunk_size: 5,
        threads: Some(2),
        static_frame_elision: true,
    };
    render_range(&layout, &store, range, &opts(5, threading), &mut par).unwrap();

    assert_eq!(seq.frames(), par.frames());
}

#[test]
fn disabling_elision_renders_every_frame() {
    let Some(face) = test_font(32.0) else {
        return;
    };
    let (layout, store) = fixture(&face);
    let range = FrameRange::new(FrameIndex(0), FrameIndex(6)).unwrap();
    let threading = RenderThreading {
        static_frame_elision: false,
        ..RenderThreading::default()
    };
    let mut sink = InMemorySink::new();
    let stats = render_range(&layout, &store, range, &opts(4, threading), &mut sink).unwrap();
    assert_eq!(stats.frames_rendered, 6);
    assert_eq!(stats.frames_elided, 0);
}
