use super::*;

#[test]
fn mul_div255_rounds_to_nearest() {
    assert_eq!(mul_div255_u16(255, 255), 255);
    assert_eq!(mul_div255_u16(128, 255), 128);
    assert_eq!(mul_div255_u16(0, 200), 0);
    assert_eq!(mul_div255_u8(255, 128), 128);
}

#[test]
fn over_with_opaque_source_replaces_destination() {
    let mut dst = vec![10u8, 20, 30, 255];
    premul_over_in_place(&mut dst, &[200, 100, 50, 255]);
    assert_eq!(dst, vec![200, 100, 50, 255]);
}

#[test]
fn over_with_transparent_source_keeps_destination() {
    let mut dst = vec![10u8, 20, 30, 255];
    premul_over_in_place(&mut dst, &[0, 0, 0, 0]);
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn over_with_half_alpha_blends() {
    let mut dst = vec![0u8, 0, 255, 255];
    premul_over_in_place(&mut dst, &[128, 0, 0, 128]);
    assert_eq!(dst[0], 128);
    assert_eq!(dst[2], 127);
    assert_eq!(dst[3], 255);
}
