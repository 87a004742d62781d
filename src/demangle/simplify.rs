//! Template-aware name simplification.
//!
//! Demangled C++ names carry template arguments and implementation
//! namespaces that drown out the part a reader cares about. The functions
//! here split a rendered name into its nesting components — honoring bracket
//! nesting, so `std::map<int, std::string>::iterator` has three components,
//! not four — and optionally simplify each component by stripping template
//! argument groups, dropping implementation namespaces and collapsing the
//! `basic_*` aliases.
//!
//! # Examples
//!
//! ```rust
//! use binscope::demangle::simplify;
//!
//! assert_eq!(
//!     simplify::to_string("std::__cxx11::basic_string<char, std::char_traits<char>>"),
//!     "std::string"
//! );
//!
//! let name = simplify::to_qualified_name("std::map<int, std::string>::iterator", false);
//! assert_eq!(name.components(), ["std", "map<int, std::string>", "iterator"]);
//! ```

use crate::demangle::QualifiedName;

// TODO: operator<< and friends confuse the bracket tracker; needs the
// operator-name special case before this can run over full symbol listings.

/// Implementation namespaces that add no information for display.
const DROPPED_NAMESPACES: &[&str] = &["__cxx11", "__1", "__detail"];

/// `basic_*` templates that collapse to their common alias once arguments
/// are stripped.
const COLLAPSED_NAMES: &[(&str, &str)] = &[
    ("basic_string", "string"),
    ("basic_string_view", "string_view"),
    ("basic_ostream", "ostream"),
    ("basic_istream", "istream"),
    ("basic_iostream", "iostream"),
    ("basic_stringstream", "stringstream"),
];

/// Fully simplified display rendering of `input`.
#[must_use]
pub fn to_string(input: &str) -> String {
    to_qualified_name(input, true).to_string()
}

/// Split `input` into a qualified name, optionally simplifying each
/// component.
///
/// Splitting happens on `::` at bracket depth zero only. With `simplify`,
/// each component loses its template argument groups, implementation
/// namespaces are dropped, and collapsed aliases are applied.
#[must_use]
pub fn to_qualified_name(input: &str, simplify: bool) -> QualifiedName {
    let mut components = split_components(input);

    if simplify {
        components = components
            .into_iter()
            .map(|component| strip_templates(&component))
            .filter(|component| !DROPPED_NAMESPACES.contains(&component.as_str()))
            .map(|component| {
                COLLAPSED_NAMES
                    .iter()
                    .find(|(from, _)| *from == component)
                    .map_or(component, |(_, to)| (*to).to_string())
            })
            .collect();
    }

    QualifiedName::from(components)
}

/// Split on `::` at bracket depth zero.
fn split_components(input: &str) -> Vec<String> {
    let mut components = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;

    let mut chars = input.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '<' | '(' | '[' | '{' => {
                depth += 1;
                current.push(ch);
            }
            '>' | ')' | ']' | '}' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            ':' if depth == 0 && chars.peek() == Some(&':') => {
                chars.next();
                components.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    if !current.is_empty() || components.is_empty() {
        components.push(current);
    }
    components
}

/// Drop every top-level `<...>` group from one component.
fn strip_templates(component: &str) -> String {
    let mut out = String::with_capacity(component.len());
    let mut depth = 0usize;
    for ch in component.chars() {
        match ch {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(ch),
            _ => {}
        }
    }
    out
}
