//! Pure validation of submitted recipe ingredient lists
//!
//! Runs before persistence; rejects with a field-scoped error so the caller
//! sees which part of the payload is wrong.

use crate::error::AppError;
use std::collections::HashSet;

/// One submitted ingredient reference with its quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngredientEntry {
    pub ingredient_id: i64,
    pub amount: i64,
}

/// Validate the ingredient list of a recipe create/update payload:
/// non-empty, no repeated ingredient reference, every amount >= 1.
pub fn validate_ingredient_entries(entries: &[IngredientEntry]) -> Result<(), AppError> {
    if entries.is_empty() {
        return Err(AppError::validation(
            "ingredients",
            "This field is required.",
        ));
    }

    let mut seen = HashSet::with_capacity(entries.len());
    for entry in entries {
        if entry.amount < 1 {
            return Err(AppError::validation(
                "amount",
                "The quantity of an ingredient cannot be less than 1!",
            ));
        }
        if !seen.insert(entry.ingredient_id) {
            return Err(AppError::validation(
                "ingredients",
                "Ingredients must not repeat!",
            ));
        }
    }

    Ok(())
}

/// Validate that an image payload is present and non-empty.
pub fn validate_image_present(image: Option<&str>) -> Result<(), AppError> {
    match image {
        Some(payload) if !payload.is_empty() => Ok(()),
        _ => Err(AppError::validation("image", "This field is required.")),
    }
}
