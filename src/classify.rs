// ABOUTME: Keyword-based food category classification for detection labels
// ABOUTME: Static category table with ordered substring matching, first match wins
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Morsel Labs

//! Label classification.
//!
//! Detection providers return free-form class labels (`"red_apple"`,
//! `"chicken_breast"`). This module maps a label to one of the fixed
//! [`FoodCategory`] values by case-insensitive substring matching against a
//! curated keyword table. The table is `'static` — built into the binary,
//! never reallocated — and is iterated in declared order so that
//! classification is deterministic: the first category with a matching
//! keyword wins.

use crate::models::FoodCategory;

/// Ordered category → keyword table.
///
/// Keywords are lowercase; matching is substring containment against the
/// lowercased label. Order matters: earlier categories shadow later ones for
/// labels that would match both (e.g. `"strawberry_milk"` is Fruits, not
/// Dairy).
pub static CATEGORY_KEYWORDS: &[(FoodCategory, &[&str])] = &[
    (
        FoodCategory::Vegetables,
        &[
            "carrot",
            "broccoli",
            "cabbage",
            "potato",
            "onion",
            "tomato",
            "lettuce",
            "pepper",
            "cucumber",
            "corn",
            "spinach",
            "celery",
            "eggplant",
            "zucchini",
            "mushroom",
            "pumpkin",
            "cauliflower",
        ],
    ),
    (
        FoodCategory::Fruits,
        &[
            "apple",
            "banana",
            "orange",
            "grape",
            "strawberry",
            "watermelon",
            "mango",
            "pineapple",
            "lemon",
            "lime",
            "cherry",
            "peach",
            "pear",
            "kiwi",
            "papaya",
            "avocado",
            "melon",
            "berry",
        ],
    ),
    (
        FoodCategory::MeatFish,
        &[
            "chicken", "beef", "pork", "fish", "salmon", "shrimp", "turkey", "meat", "steak",
            "bacon", "sausage", "ham",
        ],
    ),
    (
        FoodCategory::Dairy,
        &[
            "milk",
            "cheese",
            "yogurt",
            "butter",
            "cream",
            "ice cream",
            "mozzarella",
            "cheddar",
            "dairy",
        ],
    ),
    (
        FoodCategory::Grains,
        &[
            "bread",
            "rice",
            "pasta",
            "cereal",
            "noodle",
            "bagel",
            "tortilla",
            "cracker",
            "croissant",
            "muffin",
            "roll",
            "grain",
        ],
    ),
    (
        FoodCategory::Beverages,
        &[
            "juice", "coffee", "tea", "soda", "wine", "beer", "smoothie", "latte", "drink",
            "beverage",
        ],
    ),
    (
        FoodCategory::CookedFood,
        &[
            "pizza", "burger", "sandwich", "soup", "salad", "fries", "hot dog", "burrito", "taco",
            "wrap", "curry", "stir fry", "fried",
        ],
    ),
];

/// Map a detection label to its food category.
///
/// Case-insensitive; the first category (in table order) with any keyword
/// contained in the label wins. Labels matching nothing return
/// [`FoodCategory::Other`], which downstream filtering drops.
pub fn categorize(label: &str) -> FoodCategory {
    let lowered = label.to_lowercase();

    for (category, keywords) in CATEGORY_KEYWORDS {
        if keywords.iter().any(|keyword| lowered.contains(keyword)) {
            return *category;
        }
    }

    FoodCategory::Other
}
