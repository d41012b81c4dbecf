// ABOUTME: Unit tests for result assembly from raw predictions
// ABOUTME: Filtering threshold, name formatting, ordering, and metadata carry-through
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Morsel Labs
#![allow(missing_docs)]

use morsel_api::assemble::{assemble_items, format_food_name};
use morsel_api::models::{BoundingBox, FoodCategory, RawPrediction};

fn prediction(label: &str, confidence: f64) -> RawPrediction {
    RawPrediction {
        label: label.to_string(),
        confidence,
        bbox: BoundingBox {
            x: 100.0,
            y: 100.0,
            width: 50.0,
            height: 50.0,
        },
    }
}

#[test]
fn non_food_predictions_are_dropped() {
    let predictions = vec![prediction("car", 0.99), prediction("red_apple", 0.9)];
    let items = assemble_items(&predictions, 640, 640);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].original_label, "red_apple");
}

#[test]
fn confidence_threshold_is_strict() {
    let predictions = vec![
        prediction("apple", 0.3),  // exactly at the floor: dropped
        prediction("banana", 0.31), // just above: kept
        prediction("carrot", 0.29),
    ];
    let items = assemble_items(&predictions, 640, 640);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].original_label, "banana");
    assert_eq!(items[0].confidence, 31);
}

#[test]
fn items_preserve_prediction_order() {
    let predictions = vec![
        prediction("banana", 0.5),
        prediction("person", 0.9),
        prediction("apple", 0.8),
        prediction("rice", 0.4),
    ];
    let items = assemble_items(&predictions, 640, 640);
    let labels: Vec<&str> = items.iter().map(|i| i.original_label.as_str()).collect();
    assert_eq!(labels, vec!["banana", "apple", "rice"]);
}

#[test]
fn item_fields_are_fully_populated() {
    let predictions = vec![prediction("chicken_breast", 0.876)];
    let items = assemble_items(&predictions, 640, 640);

    assert_eq!(items.len(), 1);
    let item = &items[0];
    assert_eq!(item.name, "Chicken Breast");
    assert_eq!(item.category, FoodCategory::MeatFish);
    assert_eq!(item.confidence, 88); // round(0.876 * 100)
    assert!((50..=500).contains(&item.quantity));
    assert_eq!(item.bbox.width, 50.0);
    assert_eq!(item.original_label, "chicken_breast");
}

#[test]
fn name_formatting_title_cases_segments() {
    assert_eq!(format_food_name("red_apple"), "Red Apple");
    assert_eq!(format_food_name("HOT_DOG"), "Hot Dog");
    assert_eq!(format_food_name("salmon"), "Salmon");
    assert_eq!(format_food_name("stir_fry_noodles"), "Stir Fry Noodles");
}

#[test]
fn empty_prediction_list_yields_empty_items() {
    assert!(assemble_items(&[], 640, 640).is_empty());
}
