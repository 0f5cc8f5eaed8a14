mod common;

use common::*;
use image::Rgb;
use ocrpipe::Quad;
use ocrpipe::detection::rectify;

const RED: Rgb<u8> = Rgb([255, 0, 0]);
const BLUE: Rgb<u8> = Rgb([0, 0, 255]);

#[test]
fn test_axis_aligned_box_keeps_its_size() {
    let img = gradient_image(200, 100);
    let quad = Quad::from_corners([(50, 25), (150, 25), (150, 75), (50, 75)]);

    let crop = rectify(&img, &quad).expect("crop");
    assert_eq!(crop.dimensions(), (100, 50));
    // Identity mapping: the top-left sample comes from the quad's corner
    assert_eq!(*crop.get_pixel(0, 0), *img.get_pixel(50, 25));
}

#[test]
fn test_wide_box_is_not_rotated() {
    let img = gradient_image(200, 100);
    let quad = Quad::from_corners([(10, 10), (110, 10), (110, 60), (10, 60)]);

    let crop = rectify(&img, &quad).expect("crop");
    assert_eq!(crop.dimensions(), (100, 50));
}

#[test]
fn test_tall_box_is_rotated_to_read_left_to_right() {
    // Blue left of x = 35, red from there on; the box spans x 10..60
    let img = two_tone_image(200, 200, 35, BLUE, RED);
    let quad = Quad::from_corners([(10, 10), (60, 10), (60, 160), (10, 160)]);

    let crop = rectify(&img, &quad).expect("crop");
    assert_eq!(crop.dimensions(), (150, 50));

    // Counter-clockwise quarter turn: the right edge becomes the top row
    assert_eq!(*crop.get_pixel(75, 0), RED);
    assert_eq!(*crop.get_pixel(75, 49), BLUE);
}

#[test]
fn test_box_just_under_ratio_is_not_rotated() {
    let img = gradient_image(200, 200);
    // 149 < 1.5 * 100
    let quad = Quad::from_corners([(10, 10), (110, 10), (110, 159), (10, 159)]);

    let crop = rectify(&img, &quad).expect("crop");
    assert_eq!(crop.dimensions(), (100, 149));
}

#[test]
fn test_degenerate_box_yields_nothing() {
    let img = gradient_image(100, 100);
    let quad = Quad::from_corners([(20, 20), (20, 20), (20, 20), (20, 20)]);
    assert!(rectify(&img, &quad).is_none());

    // A flat line has an empty bounding box
    let flat = Quad::from_corners([(10, 30), (80, 30), (80, 30), (10, 30)]);
    assert!(rectify(&img, &flat).is_none());
}

#[test]
fn test_box_outside_image_yields_nothing() {
    let img = gradient_image(100, 100);
    let quad = Quad::from_corners([(150, 150), (190, 150), (190, 180), (150, 180)]);
    assert!(rectify(&img, &quad).is_none());
}

#[test]
fn test_skewed_box_produces_edge_lengths() {
    let img = gradient_image(300, 200);
    // Top edge 3-4-5 scaled by 20 -> length 100; left edge vertical 40
    let quad = Quad::from_corners([(50, 50), (130, 110), (130, 150), (50, 90)]);

    let crop = rectify(&img, &quad).expect("crop");
    assert_eq!(crop.dimensions(), (100, 40));
}

#[test]
fn test_trapezoid_keeps_colors_on_their_side() {
    // Symmetric about x = 100, where blue turns red
    let img = two_tone_image(200, 120, 100, BLUE, RED);
    let quad = Quad::from_corners([(60, 20), (140, 20), (180, 100), (20, 100)]);

    let crop = rectify(&img, &quad).expect("crop");
    assert_eq!(crop.dimensions(), (80, 89));

    for y in [0, 44, 88] {
        assert_eq!(*crop.get_pixel(5, y), BLUE);
        assert_eq!(*crop.get_pixel(74, y), RED);
    }
}

#[test]
fn test_extreme_coordinates_yield_nothing() {
    let img = gradient_image(100, 100);
    let quad = Quad::from_corners([(i32::MIN, 0), (i32::MAX, 0), (i32::MAX, 50), (i32::MIN, 50)]);
    assert!(rectify(&img, &quad).is_none());
}

#[test]
fn test_target_larger_than_image_yields_nothing() {
    let img = gradient_image(100, 100);
    let quad = Quad::from_corners([
        (-1_000_000, 0),
        (1_000_000, 0),
        (1_000_000, 50),
        (-1_000_000, 50),
    ]);
    assert!(rectify(&img, &quad).is_none());
}
