//! Readable messages for unique-constraint violations.
//!
//! Unique constraints follow the `uq_<table>_<column>` naming convention in
//! the migrations, which lets a violation be turned into a message such as
//! "A student with this email already exists".

/// Tables with unique constraints and the singular noun for each.
const TABLE_NOUNS: &[(&str, &str)] = &[
    ("lookup_values", "lookup value"),
    ("applications", "application"),
    ("students", "student"),
    ("leads", "lead"),
    ("users", "user"),
];

/// Constraints whose names do not follow `uq_<table>_<column>`.
const NAMED_MESSAGES: &[(&str, &str)] = &[(
    "uq_lookup_values_default",
    "Another value of this kind is already the default",
)];

/// Describe a unique-constraint violation by constraint name.
pub fn describe_unique_violation(constraint: &str) -> String {
    if let Some((_, message)) = NAMED_MESSAGES.iter().find(|(name, _)| *name == constraint) {
        return (*message).to_string();
    }
    let parsed = constraint.strip_prefix("uq_").and_then(|rest| {
        TABLE_NOUNS.iter().find_map(|(table, noun)| {
            rest.strip_prefix(table)
                .and_then(|r| r.strip_prefix('_'))
                .filter(|column| !column.is_empty())
                .map(|column| (*noun, column.replace('_', " ")))
        })
    });

    match parsed {
        Some((noun, column)) => {
            let article = if noun.starts_with(&['a', 'e', 'i', 'o', 'u'][..]) {
                "An"
            } else {
                "A"
            };
            format!("{article} {noun} with this {column} already exists")
        }
        None => format!("Duplicate value violates unique constraint: {constraint}"),
    }
}
