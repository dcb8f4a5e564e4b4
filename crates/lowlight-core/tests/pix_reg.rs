//! Pix and FPix regression test
//!
//! Construction, pixel access, copy-on-write and field statistics.

use lowlight_core::{Error, FPix, ImageFormat, Pix};
use lowlight_test::RegParams;

#[test]
fn pix_reg() {
    let mut rp = RegParams::new("pix");

    // --- Test 1: Construction and shape checks ---
    let pix = Pix::new_with_rgb(7, 5, 10, 20, 30).expect("new_with_rgb");
    rp.compare_values(7.0 * 5.0 * 3.0, pix.data().len() as f64, 0.0);
    rp.compare_bool(true, pix.get_rgb(6, 4) == Some((10, 20, 30)));
    rp.compare_bool(true, pix.get_rgb(7, 0).is_none());
    rp.compare_values(30.0, pix.max_component(3, 3).unwrap_or(0) as f64, 0.0);

    rp.compare_bool(true, matches!(Pix::new(0, 4), Err(Error::InvalidDimension { .. })));
    rp.compare_bool(true, matches!(Pix::from_raw_rgb(2, 2, Vec::new()), Err(Error::NullInput(_))));
    rp.compare_bool(
        true,
        matches!(
            Pix::from_raw_rgb(2, 2, vec![0; 11]),
            Err(Error::BufferSizeMismatch { expected: 12, actual: 11 })
        ),
    );

    // --- Test 2: Gray expansion ---
    let gray = Pix::from_gray(3, 1, &[0, 100, 255]).expect("from_gray");
    rp.compare_bool(true, gray.get_rgb(1, 0) == Some((100, 100, 100)));

    // --- Test 3: Copy-on-write leaves the source unchanged ---
    let shared = pix.clone();
    rp.compare_bool(true, shared.clone().try_into_mut().is_err());
    let mut edited = shared.to_mut();
    edited.set_rgb(0, 0, 255, 0, 0).expect("set_rgb");
    rp.compare_bool(true, edited.set_rgb(9, 9, 0, 0, 0).is_err());
    edited.set_informat(ImageFormat::Png);
    let edited: Pix = edited.into();
    rp.compare_bool(true, pix.get_rgb(0, 0) == Some((10, 20, 30)));
    rp.compare_bool(true, edited.get_rgb(0, 0) == Some((255, 0, 0)));
    rp.compare_bool(true, edited.informat() == ImageFormat::Png);
    rp.compare_bool(true, pix.sizes_equal(&edited));
    rp.compare_pix(&pix, &pix.deep_clone());

    // --- Test 4: Unique handle converts in place ---
    let unique = Pix::new(2, 2).expect("new");
    rp.compare_bool(true, unique.try_into_mut().is_ok());

    // --- Test 5: Format tags ---
    rp.compare_bool(true, ImageFormat::from_extension("JPG") == Some(ImageFormat::Jpeg));
    rp.compare_bool(true, ImageFormat::from_extension("bmp") == Some(ImageFormat::Bmp));
    rp.compare_bool(true, ImageFormat::from_extension("tif").is_none());
    rp.compare_strings(b"png", ImageFormat::Png.extension().as_bytes());

    // --- Test 6: FPix field access and statistics ---
    let mut field = FPix::new(4, 3).expect("fpix");
    field.set_pixel(3, 2, 12.0).expect("set_pixel");
    rp.compare_values(12.0, field.get_pixel(3, 2).unwrap_or(0.0) as f64, 0.0);
    rp.compare_bool(true, field.get_pixel(4, 0).is_err());
    rp.compare_values(1.0, field.mean() as f64, 1e-6);
    rp.compare_values(12.0, field.max_value().unwrap_or(0.0) as f64, 0.0);
    rp.compare_bool(true, FPix::from_data(2, 2, vec![0.0; 3]).is_err());

    assert!(rp.cleanup(), "pix regression test failed");
}
