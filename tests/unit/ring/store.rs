use super::*;

#[test]
fn new_store_is_zeroed_with_expected_layout() {
    let s = VolumetricFrameStore::new(Resolution::new(3, 2).unwrap(), 4).unwrap();
    assert_eq!(s.frames(), 4);
    assert_eq!(s.layer_len(), 3 * 2 * 4);
    assert_eq!(s.as_bytes().len(), 3 * 2 * 4 * 4);
    assert!(s.as_bytes().iter().all(|&b| b == 0));
}

#[test]
fn write_layer_touches_only_that_layer() {
    let res = Resolution::new(2, 2).unwrap();
    let mut s = VolumetricFrameStore::new(res, 3).unwrap();
    let px: Vec<u8> = (0..16).collect();
    s.write_layer(1, &px).unwrap();

    assert!(s.layer(0).iter().all(|&b| b == 0));
    assert_eq!(s.layer(1), px.as_slice());
    assert!(s.layer(2).iter().all(|&b| b == 0));
    assert_eq!(s.texel(1, 1, 1), [12, 13, 14, 15]);
    assert_eq!(s.texel(1, 0, 1), [4, 5, 6, 7]);
}

#[test]
fn write_layer_rejects_bad_index_and_size() {
    let mut s = VolumetricFrameStore::new(Resolution::new(2, 2).unwrap(), 2).unwrap();
    assert!(s.write_layer(2, &[0; 16]).is_err());
    assert!(s.write_layer(0, &[0; 15]).is_err());
}

#[test]
fn zero_depth_is_rejected() {
    assert!(VolumetricFrameStore::new(Resolution::new(2, 2).unwrap(), 0).is_err());
}
