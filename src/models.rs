// ABOUTME: Core domain models for food detection results and response envelopes
// ABOUTME: Defines bounding boxes, predictions, food categories, and detected items
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Morsel Labs

//! Domain models for the detection pipeline.
//!
//! Everything here is request-scoped: predictions come in from the detection
//! provider, detected items go out in the response, and nothing is persisted.

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in pixel units.
///
/// The provider reports center coordinates plus extent. Width and height are
/// positive but are not guaranteed to fit inside the reported image
/// dimensions, so consumers must bound anything they derive from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Center x coordinate
    pub x: f64,
    /// Center y coordinate
    pub y: f64,
    /// Box width
    pub width: f64,
    /// Box height
    pub height: f64,
}

/// A single raw prediction as returned by the detection provider.
#[derive(Debug, Clone)]
pub struct RawPrediction {
    /// Provider class label, e.g. `"red_apple"`
    pub label: String,
    /// Confidence score in `[0, 1]`
    pub confidence: f64,
    /// Detection bounding box
    pub bbox: BoundingBox,
}

/// Fixed set of food categories a detection label can map to.
///
/// `Other` is terminal: items categorized as `Other` are dropped from the
/// final response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FoodCategory {
    #[serde(rename = "Vegetables")]
    Vegetables,
    #[serde(rename = "Fruits")]
    Fruits,
    #[serde(rename = "Meat & Fish")]
    MeatFish,
    #[serde(rename = "Dairy")]
    Dairy,
    #[serde(rename = "Grains")]
    Grains,
    #[serde(rename = "Beverages")]
    Beverages,
    #[serde(rename = "Cooked Food")]
    CookedFood,
    #[serde(rename = "Other")]
    Other,
}

impl FoodCategory {
    /// Display name used on the wire
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vegetables => "Vegetables",
            Self::Fruits => "Fruits",
            Self::MeatFish => "Meat & Fish",
            Self::Dairy => "Dairy",
            Self::Grains => "Grains",
            Self::Beverages => "Beverages",
            Self::CookedFood => "Cooked Food",
            Self::Other => "Other",
        }
    }
}

impl std::fmt::Display for FoodCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recognized food item produced from one qualifying prediction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedItem {
    /// Human-readable name derived from the provider label
    pub name: String,
    /// Estimated quantity in grams
    pub quantity: u32,
    /// Assigned food category
    pub category: FoodCategory,
    /// Confidence as an integer percentage, 0-100
    pub confidence: u8,
    /// Bounding box carried through verbatim
    pub bbox: BoundingBox,
    /// Provider label carried through verbatim for traceability
    pub original_label: String,
}

/// Reported dimensions of the analyzed image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

/// Successful detection response envelope.
///
/// Invariant: `detected_count` always equals `items.len()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResponse {
    pub success: bool,
    pub items: Vec<DetectedItem>,
    pub image_size: ImageSize,
    pub detected_count: usize,
}

impl DetectionResponse {
    /// Build a success envelope from assembled items.
    pub fn new(items: Vec<DetectedItem>, image_size: ImageSize) -> Self {
        let detected_count = items.len();
        Self {
            success: true,
            items,
            image_size,
            detected_count,
        }
    }
}
