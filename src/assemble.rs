// ABOUTME: Assembles final detected food items from raw provider predictions
// ABOUTME: Filters non-food and low-confidence hits, formats names, attaches estimates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Morsel Labs

//! Result assembly.
//!
//! Takes the provider's raw prediction list and produces the response items:
//! predictions categorized as `Other` or at/below the confidence floor are
//! dropped, the rest get a display name, a category, and a gram estimate.
//! Output order follows filtered input order; nothing is re-sorted.

use crate::classify::categorize;
use crate::models::{DetectedItem, FoodCategory, RawPrediction};
use crate::quantity::estimate_quantity;

/// Confidence floor. The comparison is strict: a prediction at exactly 0.3 is
/// dropped, 0.31 survives.
pub const MIN_CONFIDENCE: f64 = 0.3;

/// Build the final item list from raw predictions.
pub fn assemble_items(
    predictions: &[RawPrediction],
    image_width: u32,
    image_height: u32,
) -> Vec<DetectedItem> {
    predictions
        .iter()
        .filter_map(|prediction| {
            let category = categorize(&prediction.label);
            if category == FoodCategory::Other || prediction.confidence <= MIN_CONFIDENCE {
                return None;
            }

            Some(DetectedItem {
                name: format_food_name(&prediction.label),
                quantity: estimate_quantity(&prediction.bbox, image_width, image_height),
                category,
                confidence: (prediction.confidence * 100.0).round() as u8,
                bbox: prediction.bbox.clone(),
                original_label: prediction.label.clone(),
            })
        })
        .collect()
}

/// Turn a provider label into a display name: underscore-separated segments,
/// each title-cased, joined with spaces. `"red_apple"` becomes `"Red Apple"`.
pub fn format_food_name(label: &str) -> String {
    label
        .split('_')
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => {
            let mut titled: String = first.to_uppercase().collect();
            titled.extend(chars.flat_map(char::to_lowercase));
            titled
        }
        None => String::new(),
    }
}
