use super::*;

fn frame() -> FrameRGBA {
    FrameRGBA {
        width: 1,
        height: 1,
        data: vec![0, 255, 0, 255],
        premultiplied: true,
    }
}

fn config() -> SinkConfig {
    SinkConfig {
        width: 1,
        height: 1,
        fps: Fps { num: 30, den: 1 },
        audio: None,
    }
}

#[test]
fn cursor_accepts_a_run_from_any_start() {
    let mut cursor = FrameCursor::default();
    for i in 40..45 {
        cursor.advance(FrameIndex(i)).unwrap();
    }
}

#[test]
fn cursor_rejects_gaps_and_repeats() {
    let mut cursor = FrameCursor::default();
    cursor.advance(FrameIndex(3)).unwrap();
    assert!(cursor.advance(FrameIndex(5)).is_err());

    let mut cursor = FrameCursor::default();
    cursor.advance(FrameIndex(3)).unwrap();
    assert!(cursor.advance(FrameIndex(3)).is_err());
}

#[test]
fn in_memory_sink_records_one_track_per_begin() {
    let mut sink = InMemorySink::new();
    assert!(sink.push_frame(FrameIndex(0), &frame()).is_err());

    sink.begin(config()).unwrap();
    sink.push_frame(FrameIndex(0), &frame()).unwrap();
    sink.push_frame(FrameIndex(1), &frame()).unwrap();
    sink.end().unwrap();
    assert!(sink.is_ended());
    assert_eq!(sink.frames().len(), 2);
    assert!(sink.push_frame(FrameIndex(2), &frame()).is_err());

    sink.begin(config()).unwrap();
    assert!(sink.frames().is_empty());
    assert!(!sink.is_ended());
    sink.push_frame(FrameIndex(7), &frame()).unwrap();
    assert!(sink.push_frame(FrameIndex(9), &frame()).is_err());
}
