use crate::models::CartLine;
use sqlx::SqlitePool;

/// Aggregate the caller's cart: every recipe in the cart joined to its
/// ingredient rows, grouped by (name, measurement_unit), amounts summed,
/// ordered alphabetically.
///
/// Grouping is by display key, not ingredient id: two reference rows for
/// "flour, g" collapse into one line.
pub async fn cart_totals(pool: &SqlitePool, user_id: i64) -> sqlx::Result<Vec<CartLine>> {
    sqlx::query_as::<_, CartLine>(
        "SELECT i.name, i.measurement_unit, SUM(ri.amount) AS total
         FROM shopping_cart c
         JOIN recipe_ingredients ri ON ri.recipe_id = c.recipe_id
         JOIN ingredients i ON i.id = ri.ingredient_id
         WHERE c.user_id = ?
         GROUP BY i.name, i.measurement_unit
         ORDER BY i.name",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}
