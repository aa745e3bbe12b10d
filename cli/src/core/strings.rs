//! # Name Casing Helpers
//!
//! File: cli/src/core/strings.rs
//!
//! Casing conversions used to turn a user-supplied schematic `name` into
//! file names, collection keys and exported identifiers. They are exposed to
//! templates as the `dasherize` and `camelize` filters.
//!
//! | input        | `dasherize`  | `camelize`  |
//! |--------------|--------------|-------------|
//! | `myThing`    | `my-thing`   | `myThing`   |
//! | `MyThing`    | `my-thing`   | `myThing`   |
//! | `my-thing`   | `my-thing`   | `myThing`   |
//! | `my thing`   | `my-thing`   | `myThing`   |
//!

/// Inserts `_` between a lowercase letter (or digit) and a following
/// uppercase letter, then lowercases everything: `innerHTML` -> `inner_html`.
pub fn decamelize(input: &str) -> String {
    let mut result = String::with_capacity(input.len() + 4);
    let mut prev: Option<char> = None;
    for c in input.chars() {
        if c.is_ascii_uppercase() {
            if let Some(p) = prev {
                if p.is_ascii_lowercase() || p.is_ascii_digit() {
                    result.push('_');
                }
            }
        }
        result.extend(c.to_lowercase());
        prev = Some(c);
    }
    result
}

/// Converts a name to dash-case: decamelizes, then replaces every space or
/// underscore with `-`.
pub fn dasherize(input: &str) -> String {
    decamelize(input)
        .chars()
        .map(|c| if c == ' ' || c == '_' { '-' } else { c })
        .collect()
}

/// Converts a name to lowerCamelCase. Runs of `-`, `_`, `.` or whitespace
/// are removed and the character following them is upper-cased.
pub fn camelize(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut capitalize_next = false;
    for c in input.chars() {
        if c == '-' || c == '_' || c == '.' || c.is_whitespace() {
            capitalize_next = true;
        } else if capitalize_next {
            result.extend(c.to_uppercase());
            capitalize_next = false;
        } else {
            result.push(c);
        }
    }

    let mut chars = result.chars();
    match chars.next() {
        Some(first) if first.is_ascii_uppercase() => {
            first.to_ascii_lowercase().to_string() + chars.as_str()
        }
        _ => result,
    }
}
