use super::*;
use std::io::Cursor;

fn encode_test_png(width: u32, height: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            pixels.push((x * 16) as u8);
            pixels.push((y * 16) as u8);
            pixels.push(128);
            pixels.push(255);
        }
    }

    let image = image::RgbaImage::from_raw(width, height, pixels).unwrap();
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

#[test]
fn test_decode_image_bytes_roundtrip() {
    let png = encode_test_png(4, 3);
    let decoded = decode_image_bytes(&png).unwrap();

    assert_eq!(decoded.width, 4);
    assert_eq!(decoded.height, 3);
    assert_eq!(decoded.rgba.len(), 4 * 3 * 4);
}

#[test]
fn test_decode_image_bytes_preserves_pixels() {
    let png = encode_test_png(2, 2);
    let decoded = decode_image_bytes(&png).unwrap();

    // Pixel (1, 1): r = 1*16, g = 1*16, b = 128, a = 255
    let idx = (1 * 2 + 1) * 4;
    assert_eq!(&decoded.rgba[idx..idx + 4], &[16, 16, 128, 255]);
}

#[test]
fn test_decode_image_bytes_garbage_fails() {
    let garbage = vec![0u8, 1, 2, 3, 4, 5, 6, 7];
    assert!(decode_image_bytes(&garbage).is_err());
}

#[test]
fn test_decode_image_file_missing_fails() {
    let result = decode_image_file(std::path::Path::new("/nonexistent/path/does-not-exist.png"));
    assert!(result.is_err());
}

#[test]
fn test_font_asset_from_bytes_garbage_fails() {
    let garbage = vec![0u8; 32];
    assert!(FontAsset::from_bytes(garbage).is_err());
}

#[test]
fn test_font_asset_from_file_missing_fails() {
    let result = FontAsset::from_file(std::path::Path::new("/nonexistent/path/does-not-exist.ttf"));
    assert!(result.is_err());
}

#[test]
fn outline_path_closes_contour_back_to_its_start() {
    let mut outline = OutlinePath::default();
    outline.move_to(0.0, 0.0);
    outline.line_to(10.0, 0.0);
    outline.line_to(10.0, 10.0);
    outline.line_to(0.0, 10.0);
    outline.close();

    assert_eq!(outline.contours.len(), 1);
    let contour = &outline.contours[0];
    assert_eq!(contour.first(), contour.last());
}

#[test]
fn outline_path_quad_to_subdivides_into_line_segments() {
    let mut outline = OutlinePath::default();
    outline.move_to(0.0, 0.0);
    outline.quad_to(5.0, 10.0, 10.0, 0.0);
    outline.close();

    // 8 subdivisions plus the initial move_to point, then the closing point.
    assert_eq!(outline.contours[0].len(), 10);
}

#[test]
fn winding_number_is_nonzero_inside_a_square_and_zero_outside() {
    let square = [
        ((0.0, 0.0), (10.0, 0.0)),
        ((10.0, 0.0), (10.0, 10.0)),
        ((10.0, 10.0), (0.0, 10.0)),
        ((0.0, 10.0), (0.0, 0.0)),
    ];

    assert_ne!(winding_number(&square, 5.0, 5.0), 0);
    assert_eq!(winding_number(&square, 50.0, 50.0), 0);
    assert_eq!(winding_number(&square, -5.0, 5.0), 0);
}

#[test]
fn rasterize_edges_fills_a_square_and_leaves_the_margin_empty() {
    let square = [
        ((2.0, 2.0), (8.0, 2.0)),
        ((8.0, 2.0), (8.0, 8.0)),
        ((8.0, 8.0), (2.0, 8.0)),
        ((2.0, 8.0), (2.0, 2.0)),
    ];

    let coverage = rasterize_edges(&square, 10, 10);
    assert_eq!(coverage.len(), 100);

    // Pixel centered well inside the square is fully covered.
    assert_eq!(coverage[5 * 10 + 5], 255);
    // Pixel in the untouched margin is empty.
    assert_eq!(coverage[0 * 10 + 0], 0);
}

#[test]
fn rasterize_edges_on_empty_input_is_all_zero() {
    let coverage = rasterize_edges(&[], 4, 4);
    assert_eq!(coverage, vec![0u8; 16]);
}
