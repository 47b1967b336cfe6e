use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        EchoError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(EchoError::source("x").to_string().contains("source error:"));
    assert!(EchoError::render("x").to_string().contains("render error:"));
    assert!(EchoError::encode("x").to_string().contains("encode error:"));
    assert!(
        EchoError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = EchoError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
