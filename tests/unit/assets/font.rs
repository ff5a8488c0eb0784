use super::*;
use crate::test_support::test_font;

#[test]
fn load_reports_missing_path() {
    let err = FontFace::load(Path::new("/no/such/font.ttf"), 110.0).unwrap_err();
    assert!(err.to_string().contains("font.ttf"));
}

#[test]
fn rejects_bad_size_and_empty_bytes() {
    let p = Path::new("x.ttf");
    assert!(FontFace::from_bytes(p, vec![1, 2, 3], 0.0).is_err());
    assert!(FontFace::from_bytes(p, vec![1, 2, 3], f32::NAN).is_err());
    assert!(FontFace::from_bytes(p, Vec::new(), 12.0).is_err());
}

#[test]
fn garbage_bytes_register_no_family() {
    let face = FontFace::from_bytes(Path::new("junk.ttf"), vec![0u8; 64], 12.0).unwrap();
    assert!(ParleyMetrics::new(&face, [0, 0, 0, 255]).is_err());
}

#[test]
fn widths_grow_with_text_and_size() {
    let Some(face) = test_font(110.0) else {
        return;
    };
    let mut m = ParleyMetrics::new(&face, [0, 0, 0, 255]).unwrap();
    let short = m.text_width("hi");
    let long = m.text_width("hello world");
    assert!(short > 0.0);
    assert!(long > short);
    assert!(m.space_width() > 0.0);

    let Some(small) = test_font(20.0) else {
        return;
    };
    let mut ms = ParleyMetrics::new(&small, [0, 0, 0, 255]).unwrap();
    assert!(ms.text_width("hello world") < long);
}

#[test]
fn vertical_metrics_are_positive() {
    let Some(face) = test_font(110.0) else {
        return;
    };
    let m = ParleyMetrics::new(&face, [0, 0, 0, 255]).unwrap();
    let v = m.vertical();
    assert!(v.ascent > 0.0);
    assert!(v.descent > 0.0);
}

#[test]
fn shaped_layouts_are_cached() {
    let Some(face) = test_font(48.0) else {
        return;
    };
    let mut m = ParleyMetrics::new(&face, [0, 0, 0, 255]).unwrap();
    let a = m.shaped("karaoke");
    let b = m.shaped("karaoke");
    assert!(Arc::ptr_eq(&a, &b));
}
