use super::*;

#[test]
fn parses_duration_streams_and_audio_codec() {
    let json = br#"{
        "streams": [
            {"index": 0, "codec_type": "video", "codec_name": "h264", "width": 1920, "height": 1080},
            {"index": 1, "codec_type": "audio", "codec_name": "AAC"}
        ],
        "format": {"filename": "bg.mp4", "duration": "42.500000"}
    }"#;
    let info = parse_probe_json(Path::new("bg.mp4"), json).unwrap();
    assert_eq!(info.duration_secs, 42.5);
    assert_eq!(info.video_size, Some((1920, 1080)));
    assert_eq!(info.audio_codec.as_deref(), Some("aac"));
    assert!(info.has_audio());
}

#[test]
fn audio_only_file_has_no_video_size() {
    let json = br#"{
        "streams": [{"codec_type": "audio", "codec_name": "mp3"}],
        "format": {"duration": "3.0"}
    }"#;
    let info = parse_probe_json(Path::new("song.mp3"), json).unwrap();
    assert_eq!(info.video_size, None);
    assert_eq!(info.duration_secs, 3.0);
}

#[test]
fn missing_duration_is_an_error() {
    let json = br#"{"streams": [], "format": {}}"#;
    let err = parse_probe_json(Path::new("x.wav"), json).unwrap_err();
    assert!(err.to_string().contains("x.wav"));

    let json = br#"{"format": {"duration": "N/A"}}"#;
    assert!(parse_probe_json(Path::new("x.wav"), json).is_err());
}

#[test]
fn garbage_output_is_an_error() {
    assert!(parse_probe_json(Path::new("x"), b"not json").is_err());
}
