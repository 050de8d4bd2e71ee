//! Helpers for suggesting a category from merchant history.

use finnit_shared::types::CategoryId;

/// How many recent categorized transactions a suggestion looks at.
pub const SUGGESTION_WINDOW: u64 = 10;

/// Lowercased first word of a merchant name, used for fuzzy matching.
#[must_use]
pub fn merchant_key(merchant_name: &str) -> Option<String> {
    merchant_name
        .split_whitespace()
        .next()
        .map(str::to_lowercase)
}

/// Most frequent category; ties go to the one seen first.
#[must_use]
pub fn most_common<I>(categories: I) -> Option<CategoryId>
where
    I: IntoIterator<Item = CategoryId>,
{
    let mut counts: Vec<(CategoryId, usize)> = Vec::new();
    for category in categories {
        match counts.iter_mut().find(|(id, _)| *id == category) {
            Some((_, count)) => *count += 1,
            None => counts.push((category, 1)),
        }
    }

    let mut best: Option<(CategoryId, usize)> = None;
    for (id, count) in counts {
        if best.is_none_or(|(_, top)| count > top) {
            best = Some((id, count));
        }
    }
    best.map(|(id, _)| id)
}
