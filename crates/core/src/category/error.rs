//! Category error types.

use finnit_shared::AppError;
use thiserror::Error;

/// Category-related errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CategoryError {
    /// A category was named as its own parent.
    #[error("Category cannot be its own parent")]
    SelfParent,

    /// The new parent is a descendant of the category.
    #[error("Circular reference detected")]
    CircularReference,

    /// System default categories are shared and read-only.
    #[error("Cannot modify default categories")]
    DefaultImmutable,

    /// Children must be moved or removed first.
    #[error("Cannot delete category with subcategories")]
    HasChildren,

    /// Transactions or budget caps reference the category.
    #[error("Cannot delete category that is in use")]
    InUse,

    /// Sibling names are unique.
    #[error("Category with this name already exists at this level")]
    DuplicateName,
}

impl CategoryError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::SelfParent => "CATEGORY_SELF_PARENT",
            Self::CircularReference => "CATEGORY_CYCLE",
            Self::DefaultImmutable => "CATEGORY_DEFAULT_IMMUTABLE",
            Self::HasChildren => "CATEGORY_HAS_CHILDREN",
            Self::InUse => "CATEGORY_IN_USE",
            Self::DuplicateName => "CATEGORY_DUPLICATE_NAME",
        }
    }
}

impl From<CategoryError> for AppError {
    fn from(err: CategoryError) -> Self {
        Self::Validation(err.to_string())
    }
}
