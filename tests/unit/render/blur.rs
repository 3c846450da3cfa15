use super::*;

#[test]
fn radius_zero_is_identity() {
    let src = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
    let out = blur_rgba8_premul(&src, 1, 2, 0, 1.0).unwrap();
    assert_eq!(out, src);
}

#[test]
fn constant_image_is_unchanged() {
    let (w, h) = (4u32, 3u32);
    let src = [10u8, 20, 30, 40].repeat((w * h) as usize);
    let out = blur_rgba8_premul(&src, w, h, 3, 2.0).unwrap();
    assert_eq!(out, src);
}

#[test]
fn single_pixel_spreads_to_neighbours() {
    let (w, h) = (5u32, 5u32);
    let mut src = vec![0u8; (w * h * 4) as usize];
    let center = ((2 * w + 2) * 4) as usize;
    src[center..center + 4].copy_from_slice(&[255, 255, 255, 255]);
    let out = blur_rgba8_premul(&src, w, h, 2, 1.0).unwrap();
    assert!(out[center + 3] < 255);
    let right = ((2 * w + 3) * 4) as usize;
    assert!(out[right + 3] > 0);
}

#[test]
fn mismatched_buffer_is_rejected() {
    assert!(blur_rgba8_premul(&[0u8; 7], 1, 2, 1, 1.0).is_err());
}

#[test]
fn shadow_params_follow_half_blur_sigma() {
    assert_eq!(shadow_kernel_params(0.0), (0, 0.0));
    assert_eq!(shadow_kernel_params(4.0), (6, 2.0));
    assert_eq!(shadow_kernel_params(15.0), (23, 7.5));
}
