// ABOUTME: Unit tests for bounding-box quantity estimation
// ABOUTME: Bounds, rounding, saturation, and monotonicity of the gram estimate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Morsel Labs
#![allow(missing_docs)]

use morsel_api::models::BoundingBox;
use morsel_api::quantity::estimate_quantity;

fn bbox(width: f64, height: f64) -> BoundingBox {
    BoundingBox {
        x: 0.0,
        y: 0.0,
        width,
        height,
    }
}

#[test]
fn output_is_always_within_bounds() {
    let dims = [1u32, 64, 480, 640, 1920, 4096];
    let edges = [0.5f64, 1.0, 10.0, 100.0, 640.0, 5000.0];

    for &image_width in &dims {
        for &image_height in &dims {
            for &w in &edges {
                for &h in &edges {
                    let grams = estimate_quantity(&bbox(w, h), image_width, image_height);
                    assert!(
                        (50..=500).contains(&grams),
                        "box {w}x{h} in {image_width}x{image_height} gave {grams}"
                    );
                }
            }
        }
    }
}

#[test]
fn monotonically_non_decreasing_in_relative_area() {
    // Grow the box edge by edge; the estimate must never shrink.
    let mut previous = 0;
    for edge in 1..=640 {
        let grams = estimate_quantity(&bbox(f64::from(edge), f64::from(edge)), 640, 640);
        assert!(
            grams >= previous,
            "estimate shrank at edge {edge}: {previous} -> {grams}"
        );
        previous = grams;
    }
}

#[test]
fn known_values() {
    // 50x50 in 640x640: area ratio ~0.0061 -> 50 + 0.0061 * 450 * 5 ~ 63.7
    assert_eq!(estimate_quantity(&bbox(50.0, 50.0), 640, 640), 64);
    // Full frame saturates.
    assert_eq!(estimate_quantity(&bbox(640.0, 640.0), 640, 640), 500);
    // Vanishing box floors.
    assert_eq!(estimate_quantity(&bbox(0.1, 0.1), 640, 640), 50);
}

#[test]
fn saturates_well_before_full_coverage() {
    // The x5 gain hits the 500 g cap at 20% relative area.
    let grams = estimate_quantity(&bbox(286.2, 286.2), 640, 640); // ~20.0% area
    assert_eq!(grams, 500);
}

#[test]
fn oversize_boxes_are_clamped_not_rejected() {
    let grams = estimate_quantity(&bbox(10_000.0, 10_000.0), 640, 640);
    assert_eq!(grams, 500);
}

#[test]
fn degenerate_image_dimensions_stay_bounded() {
    for (w, h) in [(0u32, 0u32), (0, 640), (640, 0)] {
        let grams = estimate_quantity(&bbox(50.0, 50.0), w, h);
        assert!((50..=500).contains(&grams), "dims {w}x{h} gave {grams}");
    }
}
