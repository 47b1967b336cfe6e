use super::*;
use crate::encode::sink::InMemorySink;
use crate::foundation::core::Resolution;
use crate::source::test_pattern::TestPatternSource;

fn small_config() -> EchoConfig {
    let mut cfg = EchoConfig::default();
    cfg.capture = Resolution {
        width: 8,
        height: 4,
    };
    cfg.frames = 4;
    cfg.vertices_per_axis = 4;
    cfg.output.width = 8;
    cfg.output.height = 8;
    cfg
}

fn pattern(cfg: &EchoConfig) -> TestPatternSource {
    TestPatternSource::new(cfg.capture).unwrap()
}

#[test]
fn captures_then_renders_each_tick() {
    let cfg = small_config();
    let src = pattern(&cfg);
    let mut session = EchoSession::new(cfg, Some(Box::new(src))).unwrap();

    let (outcome, frame) = session.step().unwrap();
    assert_eq!(outcome, CaptureOutcome::Written { layer: 1 });
    assert_eq!((frame.width, frame.height), (8, 8));
    assert_eq!(session.ring().writes_committed(), 1);
    assert_eq!(session.tick(), FrameIndex(1));

    for _ in 0..4 {
        session.step().unwrap();
    }
    assert_eq!(session.ring().layer_index(), 1);
}

#[test]
fn idle_source_skips_capture_but_still_renders() {
    let cfg = small_config();
    let src = pattern(&cfg).with_idle_every(2);
    let mut session = EchoSession::new(cfg, Some(Box::new(src))).unwrap();

    assert!(matches!(
        session.capture_tick().unwrap(),
        CaptureOutcome::Written { .. }
    ));
    assert_eq!(session.capture_tick().unwrap(), CaptureOutcome::NoNewFrame);
    assert_eq!(session.ring().writes_committed(), 1);
    assert!(session.render_tick().is_ok());
}

#[test]
fn failing_source_is_demoted_and_loop_continues() {
    let cfg = small_config();
    let src = pattern(&cfg).with_frame_limit(2);
    let mut session = EchoSession::new(cfg, Some(Box::new(src))).unwrap();

    let mut sink = InMemorySink::new();
    let stats = session.run(5, &mut sink).unwrap();
    assert_eq!(
        stats,
        RunStats {
            ticks: 5,
            frames_captured: 2,
            ticks_skipped: 3,
        }
    );
    assert!(!session.source_active());
    assert_eq!(sink.frames().len(), 5);
    assert!(sink.is_finished());
}

#[test]
fn no_source_renders_opaque_black() {
    let cfg = small_config();
    let mut session = EchoSession::new(cfg, None).unwrap();
    assert_eq!(
        session.capture_tick().unwrap(),
        CaptureOutcome::SourceUnavailable
    );
    let frame = session.render_tick().unwrap();
    assert!(frame.data.chunks_exact(4).all(|px| px == [0, 0, 0, 255]));
}

#[test]
fn first_step_presents_opaque_pixels() {
    let cfg = small_config();
    let src = pattern(&cfg);
    let mut session = EchoSession::new(cfg, Some(Box::new(src))).unwrap();

    let (_, frame) = session.step().unwrap();
    let translucent = frame.data.chunks_exact(4).filter(|px| px[3] != 255).count();
    assert_eq!(translucent, 0);
}

#[test]
fn rejects_source_with_wrong_resolution() {
    let cfg = small_config();
    let src = TestPatternSource::new(Resolution {
        width: 4,
        height: 4,
    })
    .unwrap();
    assert!(matches!(
        EchoSession::new(cfg, Some(Box::new(src))),
        Err(EchoError::Validation(_))
    ));
}

#[test]
fn rotation_accumulates_and_wraps() {
    let mut cfg = small_config();
    cfg.warp.rotation_deg_per_tick = 90.0;
    let session = EchoSession::new(cfg, None).unwrap();
    assert_eq!(session.rotation_at(FrameIndex(0)), 0.0);
    assert!((session.rotation_at(FrameIndex(1)) - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    assert_eq!(session.rotation_at(FrameIndex(4)), 0.0);
    assert!((session.rotation_at(FrameIndex(6)) - std::f64::consts::PI).abs() < 1e-12);
}

#[test]
fn run_pushes_frames_in_tick_order() {
    let cfg = small_config();
    let src = pattern(&cfg);
    let mut session = EchoSession::new(cfg, Some(Box::new(src))).unwrap();
    let mut sink = InMemorySink::new();
    session.run(3, &mut sink).unwrap();

    let idx: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(idx, vec![0, 1, 2]);
    let sink_cfg = sink.config().unwrap();
    assert_eq!((sink_cfg.width, sink_cfg.height), (8, 8));
}

#[test]
fn invalid_config_is_rejected_at_construction() {
    let mut cfg = small_config();
    cfg.frames = 1;
    assert!(matches!(
        EchoSession::new(cfg, None),
        Err(EchoError::Validation(_))
    ));
}
