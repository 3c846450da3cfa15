use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        DubframeError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(DubframeError::input("x").to_string().contains("input error:"));
    assert!(
        DubframeError::resource("x")
            .to_string()
            .contains("resource error:")
    );
    assert!(DubframeError::export("x").to_string().contains("export error:"));
    assert!(
        DubframeError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn contract_errors_read_as_documented() {
    assert_eq!(
        DubframeError::NoAudioTrack.to_string(),
        "no audio track available"
    );
    assert!(
        DubframeError::unsupported_format("video/webm; codecs=vp9")
            .to_string()
            .starts_with("unsupported recording format")
    );
    assert!(
        DubframeError::surface_unavailable("0x0 canvas")
            .to_string()
            .starts_with("render surface unavailable")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = DubframeError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
