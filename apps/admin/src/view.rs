//! Plain-text views derived from controller state.

use std::fmt::Write as _;

use client_core::{FormState, ListState};
use shared::protocol::{Product, User};

pub fn render_products(state: &ListState<Product>) -> String {
    let mut out = String::from("Products\n");
    if let Some(error) = state.error() {
        let _ = writeln!(out, "error: {error}");
    }
    if state.is_loading() {
        out.push_str("Loading products...\n");
    } else if state.entities.is_empty() {
        out.push_str("No products found.\n");
    } else {
        out.push_str("ID\tName\tDescription\tPrice\tCategory\tTags\tIn Stock\n");
        for product in &state.entities {
            let _ = writeln!(
                out,
                "{}\t{}\t{}\t${}\t{}\t{}\t{}",
                product.id,
                product.name,
                product.description,
                product.price,
                product.category,
                product.tags.join(", "),
                if product.in_stock { "Yes" } else { "No" },
            );
        }
    }
    out
}

pub fn render_users(state: &ListState<User>) -> String {
    let mut out = String::from("Users\n");
    if let Some(error) = state.error() {
        let _ = writeln!(out, "error: {error}");
    }
    if state.is_loading() {
        out.push_str("Loading users...\n");
    } else if state.entities.is_empty() {
        out.push_str("No users found.\n");
    } else {
        out.push_str("ID\tName\tEmail\tCreated At\n");
        for user in &state.entities {
            let _ = writeln!(
                out,
                "{}\t{}\t{}\t{}",
                user.id,
                user.name,
                user.email,
                user.created_at.format("%Y-%m-%d %H:%M"),
            );
        }
    }
    out
}

/// Submission-level message first, then one line per blocked field.
pub fn render_form_error<F>(state: &FormState<F>) -> Option<String> {
    if state.error.is_none() && state.issues.is_empty() {
        return None;
    }
    let mut out = String::new();
    if let Some(error) = &state.error {
        let _ = writeln!(out, "error: {error}");
    }
    for issue in &state.issues {
        let _ = writeln!(out, "  {issue}");
    }
    Some(out)
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
