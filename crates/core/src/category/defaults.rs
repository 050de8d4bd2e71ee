//! The starter category tree offered to new owners.

/// Parent categories with their children, in display order.
pub const DEFAULT_CATEGORIES: &[(&str, &[&str])] = &[
    ("Food & Dining", &["Groceries", "Restaurants", "Coffee & Snacks"]),
    ("Transportation", &["Fuel", "Public Transit", "Parking", "Car Maintenance"]),
    ("Shopping", &["Clothing", "Electronics", "Books", "General"]),
    ("Bills & Utilities", &["Electricity", "Water", "Internet", "Phone", "Insurance"]),
    ("Entertainment", &["Movies", "Sports", "Hobbies", "Subscriptions"]),
    ("Health & Medical", &["Doctor", "Pharmacy", "Fitness"]),
    ("Education", &["Tuition", "Supplies"]),
    ("Personal Care", &["Hair", "Beauty"]),
    ("Income", &["Salary", "Freelance", "Investments", "Other Income"]),
    ("Uncategorized", &[]),
];
