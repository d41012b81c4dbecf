// ABOUTME: Bounding-box based quantity estimation for detected food items
// ABOUTME: Linear scaling of relative box area into a clamped gram range
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Morsel Labs

//! Quantity estimation.
//!
//! A detected item's mass is estimated from how much of the image its
//! bounding box covers. This is a heuristic, not a measurement: the only
//! contracts are that the output is an integer in
//! [`MIN_QUANTITY_GRAMS`, `MAX_QUANTITY_GRAMS`] and that a larger relative
//! area never yields a smaller estimate.

use crate::models::BoundingBox;

/// Lower bound of the estimated range, grams
pub const MIN_QUANTITY_GRAMS: f64 = 50.0;

/// Upper bound of the estimated range, grams
pub const MAX_QUANTITY_GRAMS: f64 = 500.0;

/// Gain applied to the base range so that modest boxes already register as
/// substantial portions. Saturates the upper bound near 20% relative area.
const AREA_GAIN: f64 = 5.0;

/// Estimate the mass in grams of the item inside `bbox`.
///
/// `relative_area` is the box area divided by the image area. It is not
/// clamped on its own: a malformed box larger than the image overshoots, and
/// the final clamp bounds the output regardless. Dimensions of zero produce a
/// non-finite ratio which likewise ends up clamped.
pub fn estimate_quantity(bbox: &BoundingBox, image_width: u32, image_height: u32) -> u32 {
    let relative_area =
        (bbox.width / f64::from(image_width)) * (bbox.height / f64::from(image_height));

    let quantity =
        MIN_QUANTITY_GRAMS + relative_area * (MAX_QUANTITY_GRAMS - MIN_QUANTITY_GRAMS) * AREA_GAIN;

    quantity
        .min(MAX_QUANTITY_GRAMS)
        .max(MIN_QUANTITY_GRAMS)
        .round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(width: f64, height: f64) -> BoundingBox {
        BoundingBox {
            x: 0.0,
            y: 0.0,
            width,
            height,
        }
    }

    #[test]
    fn tiny_box_floors_at_minimum() {
        assert_eq!(estimate_quantity(&bbox(1.0, 1.0), 640, 640), 50);
    }

    #[test]
    fn full_frame_box_saturates() {
        assert_eq!(estimate_quantity(&bbox(640.0, 640.0), 640, 640), 500);
    }

    #[test]
    fn gain_saturates_at_a_fifth_of_the_frame() {
        // relative area 0.2 -> 50 + 0.2 * 450 * 5 = 500 exactly
        let b = bbox(320.0, 256.0);
        assert_eq!(estimate_quantity(&b, 640, 640), 500);
    }

    #[test]
    fn oversize_box_still_bounded() {
        // Box larger than the image: ratio overshoots 1, output stays capped.
        assert_eq!(estimate_quantity(&bbox(2000.0, 2000.0), 640, 640), 500);
    }

    #[test]
    fn zero_image_dimensions_still_bounded() {
        let grams = estimate_quantity(&bbox(50.0, 50.0), 0, 0);
        assert!((50..=500).contains(&grams));
    }
}
