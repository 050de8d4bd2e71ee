//! Parent-pointer tree checks for categories.

use std::collections::HashSet;

use finnit_shared::types::CategoryId;

use super::error::CategoryError;

/// Whether making `proposed_parent` the parent of `category` closes a loop.
///
/// Walks the ancestors of `proposed_parent` iteratively. Revisiting a node
/// means the stored tree already contains a cycle, which also counts.
#[must_use]
pub fn would_create_cycle<F>(category: CategoryId, proposed_parent: CategoryId, mut parent_of: F) -> bool
where
    F: FnMut(CategoryId) -> Option<CategoryId>,
{
    let mut visited = HashSet::new();
    let mut cursor = Some(proposed_parent);

    while let Some(node) = cursor {
        if node == category || !visited.insert(node) {
            return true;
        }
        cursor = parent_of(node);
    }
    false
}

/// Validates a parent assignment.
///
/// # Errors
///
/// Returns `SelfParent` or `CircularReference`.
pub fn ensure_valid_parent<F>(
    category: CategoryId,
    proposed_parent: CategoryId,
    parent_of: F,
) -> Result<(), CategoryError>
where
    F: FnMut(CategoryId) -> Option<CategoryId>,
{
    if category == proposed_parent {
        return Err(CategoryError::SelfParent);
    }
    if would_create_cycle(category, proposed_parent, parent_of) {
        return Err(CategoryError::CircularReference);
    }
    Ok(())
}
