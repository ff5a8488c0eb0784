use super::*;

#[test]
fn parses_display_timestamps() {
    assert_eq!(parse_display_timestamp("00:00.00").unwrap(), 0.0);
    assert_eq!(parse_display_timestamp("00:01.50").unwrap(), 1.5);
    assert_eq!(parse_display_timestamp("02:03.25").unwrap(), 123.25);
}

#[test]
fn rejects_malformed_display_timestamps() {
    for bad in ["", "1.5", "00:01", "00-01.50", "aa:bb.cc", "[00:01.50]", "00:01.50x"] {
        let err = parse_display_timestamp(bad).unwrap_err();
        assert!(matches!(err, KaraokeError::Format(_)), "{bad}");
    }
}

#[test]
fn format_truncates_without_carry() {
    assert_eq!(format_display_timestamp(0.0), "00:00.00");
    assert_eq!(format_display_timestamp(1.5), "00:01.50");
    assert_eq!(format_display_timestamp(59.999), "00:59.99");
    assert_eq!(format_display_timestamp(61.257), "01:01.25");
    assert_eq!(format_display_timestamp(-3.0), "00:00.00");
    assert_eq!(format_display_timestamp(f64::NAN), "00:00.00");
}

#[test]
fn display_form_round_trips_over_the_whole_grid() {
    for mm in 0..60u32 {
        for ss in [0u32, 1, 9, 29, 30, 58, 59] {
            for ff in 0..100u32 {
                let s = format!("{mm:02}:{ss:02}.{ff:02}");
                let secs = parse_display_timestamp(&s).unwrap();
                assert_eq!(format_display_timestamp(secs), s);
            }
        }
    }
}

#[test]
fn trim_sentinel_means_unbounded() {
    assert_eq!(parse_trim_timecode("-1").unwrap(), None);
    assert_eq!(parse_trim_timecode("  ").unwrap(), None);
}

#[test]
fn trim_accepts_two_and_three_segment_forms() {
    assert_eq!(parse_trim_timecode("01:30").unwrap(), Some(90.0));
    assert_eq!(parse_trim_timecode("1:05.5").unwrap(), Some(65.5));
    assert_eq!(parse_trim_timecode("1:00:00").unwrap(), Some(3600.0));
    assert_eq!(parse_trim_timecode("0:02:03.250").unwrap(), Some(123.25));
}

#[test]
fn trim_fails_fast_on_bad_input() {
    for bad in ["90", "1:2:3:4", "01:60", "1:60:00", "x:10", "01:-1", "-2:10", "01:nan"] {
        let err = parse_trim_timecode(bad).unwrap_err();
        assert!(matches!(err, KaraokeError::Format(_)), "{bad}");
    }
}
