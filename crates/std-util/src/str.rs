use heck::ToSnakeCase;

pub fn snake_case(src: &str) -> String {
    src.to_snake_case()
}

/// Pluralizes the last word of a snake_case identifier.
///
/// `uber_manager` becomes `uber_managers`, the leading words are untouched.
pub fn pluralize(src: &str) -> String {
    match src.rsplit_once('_') {
        Some((head, last)) => format!("{head}_{}", pluralizer::pluralize(last, 2, false)),
        None => pluralizer::pluralize(src, 2, false),
    }
}

/// The conventional table name for a type name: `UberManager` → `uber_managers`.
pub fn table_name(type_name: &str) -> String {
    pluralize(&snake_case(type_name))
}
