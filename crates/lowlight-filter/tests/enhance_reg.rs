//! Low-light enhancement regression test
//!
//! End-to-end runs on synthetic images: uniform dark frames under both
//! normalization divisors, identity at zero strength, clipping, and
//! rejection of malformed raw buffers.

use lowlight_core::{FPix, ImageFormat, Pix};
use lowlight_filter::{
    EstimatorConfig, FilterError, GainLut, GainLutParams, LowLightEnhancer, apply_gain_map,
    enhance_low_light, gain_map,
};
use lowlight_test::RegParams;
use lowlight_test::fixtures::{gradient_rgb, step_rgb, uniform_rgb};
use std::sync::Arc;

#[test]
fn enhance_reg() {
    let mut rp = RegParams::new("enhance");
    let full = Arc::new(GainLut::build(&GainLutParams::default()).expect("build"));

    // --- Test 1: Uniform 50 with the default 128 divisor ---
    // smoothed = 50 * 1024 / 128 = 400, LUT[400] = 3105, 50 * 3105/1024 = 151.6
    let dark = uniform_rgb(24, 16, 50).expect("uniform");
    let enhancer = LowLightEnhancer::new(full.clone(), EstimatorConfig::default()).expect("enhancer");
    let out = enhancer.enhance_with_maps(&dark).expect("enhance");
    rp.compare_values(400.0, out.smoothed.get_pixel(5, 5).unwrap_or(0.0) as f64, 0.0);
    rp.compare_values(3105.0 / 1024.0, out.gains.get_pixel(5, 5).unwrap_or(0.0) as f64, 1e-6);
    let expected = Pix::new_with_rgb(24, 16, 151, 151, 151).expect("expected");
    rp.compare_pix(&expected, &out.image);
    rp.write_pix_if_display(&out.image, ImageFormat::Png).expect("display");

    // --- Test 2: Uniform 50 with the kernel-energy divisor ---
    // smoothed = 50, LUT[50] = 9193, 50 * 8.98 clips to 255
    let energy = LowLightEnhancer::new(full.clone(), EstimatorConfig::kernel_energy_normalized())
        .expect("energy enhancer");
    let out = energy.enhance_with_maps(&dark).expect("enhance energy");
    rp.compare_values(50.0, out.smoothed.get_pixel(0, 0).unwrap_or(0.0) as f64, 0.0);
    rp.compare_values(9193.0 / 1024.0, out.gains.get_pixel(0, 0).unwrap_or(0.0) as f64, 1e-6);
    let white = Pix::new_with_rgb(24, 16, 255, 255, 255).expect("white");
    rp.compare_pix(&white, &out.image);

    // --- Test 3: Zero strength leaves any image unchanged ---
    let ramp = gradient_rgb(40, 10).expect("gradient");
    let identity = LowLightEnhancer::with_strength(0.0).expect("identity");
    let same = identity.enhance(&ramp).expect("enhance t=0");
    rp.compare_pix(&ramp, &same);

    // --- Test 4: Brightening never darkens and clips at 255 ---
    let brightened = enhancer.enhance(&ramp).expect("enhance ramp");
    let mut never_darker = true;
    for (a, b) in ramp.data().iter().zip(brightened.data()) {
        never_darker &= b >= a;
    }
    rp.compare_bool(true, never_darker);
    rp.write_pix_if_display(&brightened, ImageFormat::Png).expect("display");

    // --- Test 5: Dark side of a step is boosted more than the bright side ---
    let step = step_rgb(30, 10, 15, (20, 20, 20), (180, 180, 180)).expect("step");
    let out = enhancer.enhance_with_maps(&step).expect("enhance step");
    let g_dark = out.gains.get_pixel(2, 5).unwrap_or(0.0);
    let g_bright = out.gains.get_pixel(27, 5).unwrap_or(0.0);
    rp.compare_bool(true, g_dark > g_bright);
    eprintln!("  step gains: dark={:.3} bright={:.3}", g_dark, g_bright);

    // --- Test 6: Free function agrees with the enhancer ---
    let direct = enhance_low_light(&step, &full, &EstimatorConfig::default()).expect("direct");
    rp.compare_pix(&out.image, &direct);

    // --- Test 7: Gain map helpers ---
    let smoothed = FPix::new_with_value(3, 2, 0.0).expect("field");
    let gains = gain_map(&smoothed, &full);
    rp.compare_values(65399.0 / 1024.0, gains.get_pixel(2, 1).unwrap_or(0.0) as f64, 1e-6);
    let tiny = uniform_rgb(3, 2, 3).expect("tiny");
    let boosted = apply_gain_map(&tiny, &gains).expect("apply");
    // 3 * 63.866 = 191.6
    rp.compare_values(191.0, boosted.get_rgb(0, 0).map(|p| p.0).unwrap_or(0) as f64, 0.0);
    let wrong = FPix::new_with_value(2, 3, 1.0).expect("wrong field");
    rp.compare_bool(
        true,
        matches!(apply_gain_map(&tiny, &wrong), Err(FilterError::InvalidInput(_))),
    );

    // --- Test 8: Malformed raw buffers are rejected ---
    for (w, h, len) in [(4u32, 4u32, 0usize), (4, 4, 47), (4, 4, 49), (4, 0, 0)] {
        let buf = vec![50u8; len];
        let res = enhancer.enhance_raw(w, h, &buf);
        rp.compare_bool(true, matches!(res, Err(FilterError::InvalidInput(_))));
    }
    let ok = enhancer.enhance_raw(4, 4, &[50u8; 48]).expect("raw ok");
    rp.compare_values(48.0, ok.len() as f64, 0.0);

    assert!(rp.cleanup(), "enhance regression test failed");
}
