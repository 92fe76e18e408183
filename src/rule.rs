//! Keyword rules that suggest a category for a transaction description.
//!
//! This is deterministic substring matching over a fixed, ordered rule list.
//! The first rule with a matching keyword wins; descriptions that match
//! nothing fall back to [Category::Other].

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use crate::{AppState, Error, category::Category};

/// The ordered categorization rules. Earlier rules win ties.
const CATEGORY_RULES: &[(Category, &[&str])] = &[
    (
        Category::Food,
        &[
            "pizza", "burger", "restaurant", "cafe", "coffee", "tea", "meal", "dinner", "lunch",
            "breakfast", "groceries", "supermarket", "vegetable", "fruit", "milk", "bread",
            "takeaway", "food",
        ],
    ),
    (
        Category::Transport,
        &[
            "uber", "taxi", "cab", "bus", "train", "metro", "fuel", "petrol", "diesel", "parking",
            "flight", "ticket", "hotel", "travel", "transport",
        ],
    ),
    (
        Category::Entertainment,
        &[
            "netflix", "spotify", "cinema", "movie", "theater", "concert", "game", "streaming",
            "music", "entertainment",
        ],
    ),
    (
        Category::Shopping,
        &[
            "amazon", "mall", "store", "market", "clothes", "shoes", "electronics", "fashion",
            "shopping",
        ],
    ),
    (
        Category::Healthcare,
        &[
            "pharmacy", "medicine", "medical", "hospital", "doctor", "dentist", "clinic",
            "checkup", "health",
        ],
    ),
    (
        Category::Bills,
        &[
            "electricity", "water", "gas", "rent", "mobile", "internet", "wifi", "broadband",
            "insurance", "subscription", "utility", "bill",
        ],
    ),
    (
        Category::Education,
        &[
            "book", "course", "school", "college", "university", "tuition", "training",
            "education",
        ],
    ),
    (
        Category::Savings,
        &["deposit", "savings", "investment", "transfer to savings"],
    ),
];

/// Suggest a category for a transaction description.
///
/// Matching is case-insensitive. Returns [Category::Other] when no rule
/// matches.
pub fn suggest_category(description: &str) -> Category {
    let description = description.to_lowercase();

    for (category, keywords) in CATEGORY_RULES {
        for keyword in *keywords {
            if description.contains(keyword) {
                return *category;
            }
        }
    }

    Category::Other
}

/// Query parameters for the categorization endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct CategorizeQuery {
    description: String,
}

/// The categorization endpoint's response body.
#[derive(Debug, Serialize)]
pub(crate) struct CategorizeResponse {
    category: Category,
}

/// A route handler that suggests a category for a description.
pub(crate) async fn categorize_endpoint(
    State(_state): State<AppState>,
    Query(query): Query<CategorizeQuery>,
) -> Result<Json<CategorizeResponse>, Error> {
    Ok(Json(CategorizeResponse {
        category: suggest_category(&query.description),
    }))
}
