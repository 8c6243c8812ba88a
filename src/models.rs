//! Row types mapped from the relational store

use serde::Serialize;
use sqlx::FromRow;
use strum::{Display, EnumString};

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub avatar: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct IngredientRow {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct RecipeRow {
    pub id: i64,
    pub author_id: i64,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i64,
    pub created_at: i64,
}

/// Join row enriched with the referenced ingredient, as serialized inside a
/// recipe.
#[derive(Debug, Clone, FromRow)]
pub struct RecipeIngredientRow {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

/// One aggregated shopping-list line: SUM(amount) grouped by display key.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct CartLine {
    pub name: String,
    pub measurement_unit: String,
    pub total: i64,
}

/// The two user↔recipe presence collections. Favorite and shopping-cart
/// rows are structurally identical; the enum tags which table a relation
/// operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum CollectionKind {
    Favorite,
    ShoppingCart,
}

impl CollectionKind {
    pub fn table(&self) -> &'static str {
        match self {
            CollectionKind::Favorite => "favorites",
            CollectionKind::ShoppingCart => "shopping_cart",
        }
    }

    pub fn already_present_message(&self) -> &'static str {
        match self {
            CollectionKind::Favorite => "Recipe was already favorited!",
            CollectionKind::ShoppingCart => "Recipe is already in the cart!",
        }
    }

    pub fn not_present_message(&self) -> &'static str {
        match self {
            CollectionKind::Favorite => "Recipe is not in favorites!",
            CollectionKind::ShoppingCart => "Recipe is not in the cart!",
        }
    }
}
