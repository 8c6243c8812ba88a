//! Plain-text rendering of the aggregated shopping list
//!
//! The aggregation itself lives in `queries::shopping_list`; this module
//! turns the summed lines into the downloadable report.

use crate::models::CartLine;
use chrono::{DateTime, Utc};

pub const SHOPPING_LIST_FILENAME: &str = "shopping-list.txt";

/// Render the report: a header naming the user and the generation time,
/// then one numbered line per (name, unit) group, name capitalized.
pub fn render_shopping_list(
    username: &str,
    generated_at: DateTime<Utc>,
    lines: &[CartLine],
) -> String {
    let mut out = format!(
        "Shopping list for {} ({})\n",
        username,
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    // Blank separator only when there is something to separate
    if !lines.is_empty() {
        out.push('\n');
    }

    for (i, line) in lines.iter().enumerate() {
        out.push_str(&format!(
            "{}. {} ({}) - {}\n",
            i + 1,
            capitalize(&line.name),
            line.measurement_unit,
            line.total
        ));
    }

    out
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
