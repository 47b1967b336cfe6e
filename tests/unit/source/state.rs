use super::*;
use crate::source::test_pattern::TestPatternSource;

fn pattern() -> TestPatternSource {
    TestPatternSource::new(Resolution::new(4, 2).unwrap()).unwrap()
}

#[test]
fn missing_source_polls_unavailable() {
    let mut s = SourceState::from_option(None);
    assert!(!s.is_active());
    assert!(matches!(s.poll(), Poll::Unavailable));
}

#[test]
fn idle_polls_keep_source_active() {
    let mut s = SourceState::Active(Box::new(pattern().with_idle_every(2)));
    assert!(matches!(s.poll(), Poll::Frame(_)));
    assert!(matches!(s.poll(), Poll::Idle));
    assert!(matches!(s.poll(), Poll::Frame(_)));
    assert!(s.is_active());
}

#[test]
fn failing_source_is_demoted_once() {
    let mut s = SourceState::Active(Box::new(pattern().with_frame_limit(1)));
    assert!(matches!(s.poll(), Poll::Frame(_)));
    assert!(matches!(s.poll(), Poll::Unavailable));
    assert!(!s.is_active());
    assert!(matches!(s.poll(), Poll::Unavailable));
    assert_eq!(format!("{s:?}"), "Unavailable");
}
