use super::*;

#[test]
fn unit_step_spans_closed_interval() {
    assert_eq!(unit_step(0, 5), 0.0);
    assert_eq!(unit_step(2, 5), 0.5);
    assert_eq!(unit_step(4, 5), 1.0);
    assert_eq!(unit_step(0, 1), 0.0);
}

#[test]
fn saturate_clamps_both_ends() {
    assert_eq!(saturate_u8(-7), 0);
    assert_eq!(saturate_u8(128), 128);
    assert_eq!(saturate_u8(300), 255);
}

#[test]
fn lerp_and_mul_div255() {
    assert_eq!(lerp(2.0, 4.0, 0.5), 3.0);
    assert_eq!(mul_div255_u16(255, 255), 255);
    assert_eq!(mul_div255_u16(128, 255), 128);
    assert_eq!(mul_div255_u16(0, 200), 0);
}
