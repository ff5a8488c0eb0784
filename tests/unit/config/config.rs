use super::*;

#[test]
fn empty_object_yields_defaults() {
    let cfg = KaraokeConfig::from_reader("{}".as_bytes()).unwrap();
    assert_eq!(cfg, KaraokeConfig::default());
    cfg.validate().unwrap();

    assert_eq!(cfg.canvas().unwrap(), Canvas::new(1080, 1080).unwrap());
    assert_eq!(cfg.fps().unwrap().as_f64(), 60.0);
    assert_eq!(cfg.pictogram_size(), 110.0);
    assert_eq!(cfg.page_policy().unwrap().counts(), &[1, 2, 3]);
    assert_eq!(cfg.render_style(), RenderStyle::default());
    assert_eq!(cfg.chroma, ChromaParams::default());
}

#[test]
fn partial_overrides_keep_other_defaults() {
    let json = r#"{
        "width": 720,
        "height": 1280,
        "font_size": 64,
        "page_line_counts": [2, 4],
        "seed": 9,
        "chroma": { "speed": 1.0 }
    }"#;
    let cfg = KaraokeConfig::from_reader(json.as_bytes()).unwrap();
    cfg.validate().unwrap();
    assert_eq!(cfg.pictogram_size(), 64.0);
    assert_eq!(cfg.seed, Some(9));
    assert_eq!(cfg.chroma.speed, 1.0);
    assert_eq!(cfg.chroma.crf, 18);

    let layout = cfg.layout_config().unwrap();
    assert_eq!(layout.canvas, Canvas::new(720, 1280).unwrap());
    assert_eq!(layout.line_spacing, 80.0);
    assert_eq!(layout.page_policy.counts(), &[2, 4]);
}

#[test]
fn unknown_fields_are_rejected() {
    assert!(KaraokeConfig::from_reader(r#"{"colour": 1}"#.as_bytes()).is_err());
}

#[test]
fn validate_rejects_bad_values() {
    let cases = [
        KaraokeConfig {
            width: 0,
            ..KaraokeConfig::default()
        },
        KaraokeConfig {
            height: 1081,
            ..KaraokeConfig::default()
        },
        KaraokeConfig {
            fps: 0,
            ..KaraokeConfig::default()
        },
        KaraokeConfig {
            font_size: 0.0,
            ..KaraokeConfig::default()
        },
        KaraokeConfig {
            page_line_counts: vec![],
            ..KaraokeConfig::default()
        },
        KaraokeConfig {
            page_line_counts: vec![0, 2],
            ..KaraokeConfig::default()
        },
        KaraokeConfig {
            margin: 600.0,
            ..KaraokeConfig::default()
        },
        KaraokeConfig {
            background_rgba: [0, 255, 0, 0],
            ..KaraokeConfig::default()
        },
    ];
    for cfg in cases {
        assert!(cfg.validate().is_err(), "{cfg:?}");
    }
}

#[test]
fn from_path_reports_missing_file() {
    let err = KaraokeConfig::from_path("/no/such/karaoke.json").unwrap_err();
    assert!(err.to_string().contains("karaoke.json"));
}
