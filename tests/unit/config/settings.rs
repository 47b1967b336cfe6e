use super::*;
use crate::foundation::core::Rect;

#[test]
fn defaults_are_valid() {
    let cfg = EchoConfig::default();
    cfg.validate().unwrap();
    assert_eq!(cfg.frames, 256);
    assert_eq!(cfg.vertices_per_axis, 32);
    assert_eq!(cfg.capture, Resolution { width: 640, height: 480 });
    assert_eq!(cfg.warp.mode, WarpMode::Fold);
    assert_eq!(cfg.chroma_order, ChromaOrder::Yuyv);
    assert!((cfg.delay_secs() - 256.0 / 30.0).abs() < 1e-12);
}

#[test]
fn partial_json_fills_in_defaults() {
    let cfg = EchoConfig::from_json_str(
        r#"{ "frames": 16, "warp": { "mode": "linear" }, "chroma_order": "uyvy" }"#,
    )
    .unwrap();
    assert_eq!(cfg.frames, 16);
    assert_eq!(cfg.warp.mode, WarpMode::Linear);
    assert_eq!(cfg.warp.rotation_deg_per_tick, 0.5);
    assert_eq!(cfg.chroma_order, ChromaOrder::Uyvy);
    assert_eq!(cfg.output, OutputConfig::default());
}

#[test]
fn json_roundtrips() {
    let mut cfg = EchoConfig::default();
    cfg.filter = FilterMode::Nearest;
    cfg.clear_rgba = [1, 2, 3, 4];
    let text = cfg.to_json_pretty().unwrap();
    assert_eq!(EchoConfig::from_json_str(&text).unwrap(), cfg);
}

#[test]
fn rejects_contract_violations() {
    let bad = [
        r#"{ "frames": 1 }"#,
        r#"{ "vertices_per_axis": 1 }"#,
        r#"{ "capture": { "width": 641, "height": 480 } }"#,
        r#"{ "capture": { "width": 0, "height": 480 } }"#,
        r#"{ "output": { "width": 0 } }"#,
        r#"{ "output": { "fps": { "num": 30, "den": 0 } } }"#,
    ];
    for json in bad {
        assert!(
            matches!(EchoConfig::from_json_str(json), Err(EchoError::Validation(_))),
            "{json}"
        );
    }
}

#[test]
fn malformed_json_is_a_serde_error() {
    assert!(matches!(
        EchoConfig::from_json_str("{ frames: }"),
        Err(EchoError::Serde(_))
    ));
    assert!(matches!(
        EchoConfig::from_json_str(r#"{ "unknown_key": 1 }"#),
        Err(EchoError::Serde(_))
    ));
}

#[test]
fn derived_sampler_and_presenter_cover_output() {
    let cfg = EchoConfig::default();
    let sampler = cfg.sampler().unwrap();
    assert_eq!(sampler.region(), Rect::new(0.0, 0.0, 640.0, 480.0));
    assert_eq!(sampler.strip_count(), 31);
    let opts = cfg.presenter_opts().unwrap();
    assert_eq!(opts.output, Resolution { width: 640, height: 480 });
}
