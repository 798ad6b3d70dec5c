//! Pure conversion from raw form fields to typed wire payloads.

use shared::protocol::{NewProduct, NewUser, ProductPatch, UserPatch};

use crate::fields::{ProductFields, UserFields};

/// Parses the raw price text. Input that is not a number yields `NaN`
/// rather than an error; the JSON encoder then emits `null`.
// TODO: decide with the data service owners whether a non-numeric price
// should be rejected here instead of being sent.
pub fn parse_price(raw: &str) -> f64 {
    raw.trim().parse::<f64>().unwrap_or(f64::NAN)
}

/// Splits comma-separated tags, trimming each and dropping blanks. Order and
/// duplicates are kept.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn product_payload(fields: &ProductFields) -> NewProduct {
    NewProduct {
        name: fields.name.clone(),
        description: fields.description.clone(),
        price: parse_price(&fields.price),
        category: fields.category.clone(),
        tags: split_tags(&fields.tags),
        in_stock: fields.in_stock,
    }
}

pub fn product_patch(fields: &ProductFields) -> ProductPatch {
    let payload = product_payload(fields);
    ProductPatch {
        name: Some(payload.name),
        description: Some(payload.description),
        price: Some(payload.price),
        category: Some(payload.category),
        tags: Some(payload.tags),
        in_stock: Some(payload.in_stock),
    }
}

pub fn user_payload(fields: &UserFields) -> NewUser {
    NewUser {
        name: fields.name.clone(),
        email: fields.email.clone(),
        password: fields.password.clone(),
    }
}

/// A blank password means "leave unchanged" and is omitted from the patch.
pub fn user_patch(fields: &UserFields) -> UserPatch {
    UserPatch {
        name: Some(fields.name.clone()),
        email: Some(fields.email.clone()),
        password: (!fields.password.is_empty()).then(|| fields.password.clone()),
    }
}

#[cfg(test)]
#[path = "tests/transform_tests.rs"]
mod tests;
