use std::collections::HashMap;
use std::path::PathBuf;

use rayon::prelude::*;

use crate::assets::store::PreparedWordStore;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex, FrameRange};
use crate::foundation::error::{KaraokeError, KaraokeResult};
use crate::layout::engine::LyricLayout;
use crate::layout::fingerprint::FrameFingerprint;
use crate::layout::visibility::FrameView;
use crate::render::backend::{FrameRGBA, RenderStyle};
use crate::render::cpu::{CpuFrameRenderer, RendererSettings};

#[derive(Clone, Debug)]
/// Threading and chunking controls for multi-frame rendering.
pub struct RenderThreading {
    /// Enable parallel rendering when `true`.
    pub parallel: bool,
    /// Chunk size in frames for batched scheduling.
    pub chunk_size: usize,
    /// Optional explicit worker thread count.
    pub threads: Option<usize>,
    /// Reuse the pixels of frames that show the same words on the same page.
    pub static_frame_elision: bool,
}

impl Default for RenderThreading {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 64,
            threads: None,
            static_frame_elision: true,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Aggregated rendering counters.
pub struct RenderStats {
    /// Total requested frames.
    pub frames_total: u64,
    /// Frames that were actually rendered.
    pub frames_rendered: u64,
    /// Frames reused via static-frame elision.
    pub frames_elided: u64,
}

/// Options for [`render_range`].
#[derive(Clone, Debug)]
pub struct RenderOpts {
    pub style: RenderStyle,
    pub fps: Fps,
    pub threading: RenderThreading,
    /// Audio file handed to the sink for muxing.
    pub audio: Option<PathBuf>,
}

/// Render the frame shown at `t` seconds.
///
/// Returns a [`FrameRGBA`] containing **premultiplied** RGBA8 pixels.
pub fn render_frame_at(
    layout: &LyricLayout,
    store: &PreparedWordStore,
    renderer: &mut CpuFrameRenderer,
    t: f64,
) -> KaraokeResult<FrameRGBA> {
    renderer.render(layout, &layout.visible_at(t), store)
}

/// Render `range` at `opts.fps` and stream the frames into `sink` in order.
///
/// Frame `i` shows the lyrics at `i / fps` seconds. `sink.begin` and `sink.end` are called here.
#[tracing::instrument(
    skip_all,
    fields(start = range.start.0, end = range.end.0, parallel = opts.threading.parallel)
)]
pub fn render_range(
    layout: &LyricLayout,
    store: &PreparedWordStore,
    range: FrameRange,
    opts: &RenderOpts,
    sink: &mut dyn FrameSink,
) -> KaraokeResult<RenderStats> {
    if range.is_empty() {
        return Err(KaraokeError::validation("render range must be non-empty"));
    }

    let canvas = layout.canvas();
    let mut renderer = CpuFrameRenderer::new(canvas, opts.style)?;
    let pool = if opts.threading.parallel {
        Some(build_thread_pool(opts.threading.threads)?)
    } else {
        None
    };

    sink.begin(SinkConfig {
        width: canvas.width,
        height: canvas.height,
        fps: opts.fps,
        audio: opts.audio.clone(),
    })?;

    let chunk_size = normalized_chunk_size(opts.threading.chunk_size);
    let mut stats = RenderStats::default();
    let mut carry: Option<(FrameFingerprint, FrameRGBA)> = None;

    let mut chunk_start = range.start.0;
    while chunk_start < range.end.0 {
        let chunk_end = (chunk_start + chunk_size).min(range.end.0);
        let chunk = FrameRange::new(FrameIndex(chunk_start), FrameIndex(chunk_end))?;

        let views: Vec<FrameView<'_>> = (chunk.start.0..chunk.end.0)
            .map(|f| layout.visible_at(opts.fps.frames_to_secs(f)))
            .collect();

        let plan = plan_unique(&views, opts.threading.static_frame_elision, carry.as_ref());
        let rendered = match pool.as_ref() {
            Some(pool) => {
                render_unique_parallel(layout, store, renderer.settings(), &views, &plan, pool)?
            }
            None => {
                let mut out = Vec::with_capacity(plan.unique.len());
                for &i in &plan.unique {
                    out.push(renderer.render(layout, &views[i], store)?);
                }
                out
            }
        };

        for (offset, slot) in plan.frame_to_slot.iter().enumerate() {
            let frame = match slot {
                Slot::Carried => carry
                    .as_ref()
                    .map(|(_, f)| f)
                    .ok_or_else(|| KaraokeError::layout("carried frame missing"))?,
                Slot::Unique(u) => rendered
                    .get(*u)
                    .ok_or_else(|| KaraokeError::layout("unique frame index out of range"))?,
            };
            sink.push_frame(FrameIndex(chunk.start.0 + offset as u64), frame)?;
        }

        let total = chunk.len_frames();
        let rendered_count = rendered.len() as u64;
        stats.frames_total += total;
        stats.frames_rendered += rendered_count;
        stats.frames_elided += total.saturating_sub(rendered_count);

        if opts.threading.static_frame_elision
            && let (Some(last_view), Some(last_slot)) = (views.last(), plan.frame_to_slot.last())
            && let Slot::Unique(u) = *last_slot
            && let Some(frame) = rendered.into_iter().nth(u)
        {
            carry = Some((last_view.fingerprint, frame));
        }

        chunk_start = chunk_end;
    }

    sink.end()?;
    tracing::info!(
        frames = stats.frames_total,
        rendered = stats.frames_rendered,
        elided = stats.frames_elided,
        "render finished"
    );
    Ok(stats)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    /// Same pixels as the last frame of the previous chunk.
    Carried,
    /// Index into the chunk's rendered frames.
    Unique(usize),
}

#[derive(Debug, Default)]
struct ChunkPlan {
    /// View indices that must be rendered.
    unique: Vec<usize>,
    frame_to_slot: Vec<Slot>,
}

fn plan_unique(
    views: &[FrameView<'_>],
    elision: bool,
    carry: Option<&(FrameFingerprint, FrameRGBA)>,
) -> ChunkPlan {
    let mut plan = ChunkPlan {
        unique: Vec::with_capacity(views.len()),
        frame_to_slot: Vec::with_capacity(views.len()),
    };
    if !elision {
        for idx in 0..views.len() {
            plan.unique.push(idx);
            plan.frame_to_slot.push(Slot::Unique(idx));
        }
        return plan;
    }

    let carried = carry.map(|(fp, _)| *fp);
    let mut first = HashMap::<FrameFingerprint, usize>::new();
    for (idx, view) in views.iter().enumerate() {
        if Some(view.fingerprint) == carried {
            plan.frame_to_slot.push(Slot::Carried);
        } else if let Some(existing) = first.get(&view.fingerprint).copied() {
            plan.frame_to_slot.push(Slot::Unique(existing));
        } else {
            let slot = plan.unique.len();
            plan.unique.push(idx);
            first.insert(view.fingerprint, slot);
            plan.frame_to_slot.push(Slot::Unique(slot));
        }
    }
    plan
}

fn render_unique_parallel(
    layout: &LyricLayout,
    store: &PreparedWordStore,
    settings: RendererSettings,
    views: &[FrameView<'_>],
    plan: &ChunkPlan,
    pool: &rayon::ThreadPool,
) -> KaraokeResult<Vec<FrameRGBA>> {
    let rendered = pool.install(|| {
        plan.unique
            .par_iter()
            .map_init(
                move || settings.build(),
                |worker, &view_idx| worker.render(layout, &views[view_idx], store),
            )
            .collect::<Vec<_>>()
    });

    let mut out = Vec::with_capacity(rendered.len());
    for item in rendered {
        out.push(item?);
    }
    Ok(out)
}

fn build_thread_pool(threads: Option<usize>) -> KaraokeResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(KaraokeError::validation(
            "render threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| KaraokeError::external(format!("failed to build rayon thread pool: {e}")))
}

fn normalized_chunk_size(chunk_size: usize) -> u64 {
    if chunk_size == 0 {
        1
    } else {
        chunk_size as u64
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
