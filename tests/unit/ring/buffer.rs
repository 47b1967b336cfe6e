use super::*;

fn ring(frames: usize) -> TemporalRingBuffer {
    TemporalRingBuffer::new(Resolution::new(2, 2).unwrap(), frames).unwrap()
}

fn solid(rgba: [u8; 4]) -> FrameRGBA {
    FrameRGBA::solid(Resolution::new(2, 2).unwrap(), rgba)
}

#[test]
fn cursor_starts_at_zero_and_advances_before_commit() {
    let mut r = ring(4);
    assert_eq!(r.layer_index(), 0);
    r.write_layer(&solid([9, 9, 9, 255])).unwrap();
    assert_eq!(r.layer_index(), 1);
    assert_eq!(r.store().texel(0, 0, 1), [9, 9, 9, 255]);
    assert_eq!(r.store().texel(0, 0, 0), [0, 0, 0, 0]);
}

#[test]
fn cursor_wraps_after_full_cycle() {
    let mut r = ring(256);
    let f = solid([1, 2, 3, 255]);
    for k in 1..=256u64 {
        r.write_layer(&f).unwrap();
        assert_eq!(r.layer_index() as u64, k % 256);
    }
    assert_eq!(r.layer_index(), 0);
    r.write_layer(&f).unwrap();
    assert_eq!(r.layer_index(), 1);
    assert_eq!(r.writes_committed(), 257);
}

#[test]
fn read_window_derivation() {
    let w = ReadWindow::for_cursor(10, 256);
    assert_eq!(w.newest, 10.0 / 256.0);
    assert_eq!(w.oldest, 11.0 / 256.0);

    let w = ReadWindow::for_cursor(255, 256);
    assert_eq!(w.newest, 255.0 / 256.0);
    assert_eq!(w.oldest, 1.0);
}

#[test]
fn read_window_is_idempotent_between_writes() {
    let mut r = ring(8);
    r.write_layer(&solid([5, 5, 5, 255])).unwrap();
    let a = r.read_window();
    let b = r.read_window();
    assert_eq!(a, b);
    r.write_layer(&solid([6, 6, 6, 255])).unwrap();
    assert_ne!(a, r.read_window());
}

#[test]
fn oldest_layer_is_next_to_be_replaced() {
    let mut r = ring(3);
    assert_eq!(r.oldest_layer(), 1);
    r.write_layer(&solid([1, 1, 1, 255])).unwrap();
    r.write_layer(&solid([2, 2, 2, 255])).unwrap();
    assert_eq!(r.layer_index(), 2);
    assert_eq!(r.oldest_layer(), 0);
    r.write_layer(&solid([3, 3, 3, 255])).unwrap();
    assert_eq!(r.layer_index(), 0);
    assert_eq!(r.store().texel(0, 0, 0), [3, 3, 3, 255]);
    assert_eq!(r.store().texel(0, 0, 1), [1, 1, 1, 255]);
    assert_eq!(r.store().texel(0, 0, 2), [2, 2, 2, 255]);
}

#[test]
fn mismatched_frame_is_rejected_without_advancing() {
    let mut r = ring(4);
    let wrong = FrameRGBA::solid(Resolution::new(4, 2).unwrap(), [1, 1, 1, 255]);
    assert!(r.write_layer(&wrong).is_err());
    let short = FrameRGBA {
        width: 2,
        height: 2,
        data: vec![0; 3],
    };
    assert!(r.write_layer(&short).is_err());
    assert_eq!(r.layer_index(), 0);
    assert_eq!(r.writes_committed(), 0);
}

#[test]
fn ring_of_one_is_rejected() {
    assert!(TemporalRingBuffer::new(Resolution::new(2, 2).unwrap(), 1).is_err());
    assert!(TemporalRingBuffer::new(Resolution::new(2, 2).unwrap(), 0).is_err());
}
