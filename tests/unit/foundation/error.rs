use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        KaraokeError::format("x")
            .to_string()
            .contains("format error:")
    );
    assert!(
        KaraokeError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        KaraokeError::layout("x")
            .to_string()
            .contains("layout error:")
    );
    assert!(
        KaraokeError::external("x")
            .to_string()
            .contains("external tool error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = KaraokeError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
