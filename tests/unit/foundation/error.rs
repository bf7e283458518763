use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ToonletterError::decode("x")
            .to_string()
            .contains("decode error:")
    );
    assert!(
        ToonletterError::encode("x")
            .to_string()
            .contains("encode error:")
    );
    assert!(
        ToonletterError::protocol("x")
            .to_string()
            .contains("protocol error:")
    );
    assert!(
        ToonletterError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        ToonletterError::raster("x")
            .to_string()
            .contains("raster error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ToonletterError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
