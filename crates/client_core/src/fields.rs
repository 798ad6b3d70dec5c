//! Raw editable field records and their declared constraints.
//!
//! Each resource has one explicit record holding exactly what the operator
//! typed, plus a field enum addressing its entries. Typed payloads are only
//! produced from these records at submit time (see [`crate::transform`]).

use std::fmt;

use shared::protocol::{Product, User};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Boolean,
    Email,
    Password,
}

impl FieldKind {
    fn expects(self) -> &'static str {
        match self {
            Self::Boolean => "a boolean",
            _ => "text",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Always,
    /// Required when creating; a blank value on edit keeps the stored one.
    OnCreate,
    Optional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitKind {
    Create,
    Update,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec<F: 'static> {
    pub field: F,
    pub name: &'static str,
    pub kind: FieldKind,
    pub requirement: Requirement,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("field `{field}` expects {expected}")]
    TypeMismatch {
        field: &'static str,
        expected: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldProblem {
    Missing,
    NotANumber,
    InvalidEmail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: &'static str,
    pub problem: FieldProblem,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.problem {
            FieldProblem::Missing => write!(f, "{} is required", self.field),
            FieldProblem::NotANumber => write!(f, "{} must be a number", self.field),
            FieldProblem::InvalidEmail => write!(f, "{} must be a valid email address", self.field),
        }
    }
}

pub trait FormFields: Clone + fmt::Debug + PartialEq + Send + Sync + 'static {
    type Field: Copy + Eq + fmt::Debug + Send + Sync + 'static;

    fn schema() -> &'static [FieldSpec<Self::Field>];

    fn value(&self, field: Self::Field) -> FieldValue;

    /// Returns a new record with `field` set to `value` and every other entry
    /// unchanged.
    fn with(&self, field: Self::Field, value: FieldValue) -> Result<Self, FieldError>;
}

/// Runs the required/type checks declared in the record's schema.
pub fn validate<F: FormFields>(fields: &F, kind: SubmitKind) -> Result<(), Vec<FieldIssue>> {
    let mut issues = Vec::new();
    for spec in F::schema() {
        let FieldValue::Text(text) = fields.value(spec.field) else {
            continue;
        };
        let required = match spec.requirement {
            Requirement::Always => true,
            Requirement::OnCreate => kind == SubmitKind::Create,
            Requirement::Optional => false,
        };
        if text.is_empty() {
            if required {
                issues.push(FieldIssue {
                    field: spec.name,
                    problem: FieldProblem::Missing,
                });
            }
            continue;
        }
        let problem = match spec.kind {
            FieldKind::Number if !is_number(&text) => Some(FieldProblem::NotANumber),
            FieldKind::Email if !is_email(&text) => Some(FieldProblem::InvalidEmail),
            _ => None,
        };
        if let Some(problem) = problem {
            issues.push(FieldIssue {
                field: spec.name,
                problem,
            });
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

fn is_number(text: &str) -> bool {
    text.trim()
        .parse::<f64>()
        .map(|value| value.is_finite())
        .unwrap_or(false)
}

fn is_email(text: &str) -> bool {
    if text.chars().any(char::is_whitespace) {
        return false;
    }
    match text.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

fn mismatch<F: FormFields>(field: F::Field) -> FieldError {
    let spec = F::schema().iter().find(|spec| spec.field == field);
    FieldError::TypeMismatch {
        field: spec.map_or("unknown", |spec| spec.name),
        expected: spec.map_or("text", |spec| spec.kind.expects()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductField {
    Name,
    Description,
    Price,
    Category,
    Tags,
    InStock,
}

const PRODUCT_SCHEMA: &[FieldSpec<ProductField>] = &[
    FieldSpec {
        field: ProductField::Name,
        name: "name",
        kind: FieldKind::Text,
        requirement: Requirement::Always,
    },
    FieldSpec {
        field: ProductField::Description,
        name: "description",
        kind: FieldKind::Text,
        requirement: Requirement::Always,
    },
    FieldSpec {
        field: ProductField::Price,
        name: "price",
        kind: FieldKind::Number,
        requirement: Requirement::Always,
    },
    FieldSpec {
        field: ProductField::Category,
        name: "category",
        kind: FieldKind::Text,
        requirement: Requirement::Always,
    },
    FieldSpec {
        field: ProductField::Tags,
        name: "tags",
        kind: FieldKind::Text,
        requirement: Requirement::Optional,
    },
    FieldSpec {
        field: ProductField::InStock,
        name: "in_stock",
        kind: FieldKind::Boolean,
        requirement: Requirement::Optional,
    },
];

/// Raw product form input. `price` and `tags` stay as typed text until submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFields {
    pub name: String,
    pub description: String,
    pub price: String,
    pub category: String,
    pub tags: String,
    pub in_stock: bool,
}

impl Default for ProductFields {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            price: String::new(),
            category: String::new(),
            tags: String::new(),
            in_stock: true,
        }
    }
}

impl ProductFields {
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
            category: product.category.clone(),
            tags: product.tags.join(", "),
            in_stock: product.in_stock,
        }
    }
}

impl FormFields for ProductFields {
    type Field = ProductField;

    fn schema() -> &'static [FieldSpec<ProductField>] {
        PRODUCT_SCHEMA
    }

    fn value(&self, field: ProductField) -> FieldValue {
        match field {
            ProductField::Name => FieldValue::Text(self.name.clone()),
            ProductField::Description => FieldValue::Text(self.description.clone()),
            ProductField::Price => FieldValue::Text(self.price.clone()),
            ProductField::Category => FieldValue::Text(self.category.clone()),
            ProductField::Tags => FieldValue::Text(self.tags.clone()),
            ProductField::InStock => FieldValue::Flag(self.in_stock),
        }
    }

    fn with(&self, field: ProductField, value: FieldValue) -> Result<Self, FieldError> {
        let mut next = self.clone();
        match (field, value) {
            (ProductField::InStock, FieldValue::Flag(flag)) => next.in_stock = flag,
            (ProductField::InStock, FieldValue::Text(_)) | (_, FieldValue::Flag(_)) => {
                return Err(mismatch::<Self>(field));
            }
            (ProductField::Name, FieldValue::Text(text)) => next.name = text,
            (ProductField::Description, FieldValue::Text(text)) => next.description = text,
            (ProductField::Price, FieldValue::Text(text)) => next.price = text,
            (ProductField::Category, FieldValue::Text(text)) => next.category = text,
            (ProductField::Tags, FieldValue::Text(text)) => next.tags = text,
        }
        Ok(next)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserField {
    Name,
    Email,
    Password,
}

const USER_SCHEMA: &[FieldSpec<UserField>] = &[
    FieldSpec {
        field: UserField::Name,
        name: "name",
        kind: FieldKind::Text,
        requirement: Requirement::Always,
    },
    FieldSpec {
        field: UserField::Email,
        name: "email",
        kind: FieldKind::Email,
        requirement: Requirement::Always,
    },
    FieldSpec {
        field: UserField::Password,
        name: "password",
        kind: FieldKind::Password,
        requirement: Requirement::OnCreate,
    },
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFields {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl UserFields {
    /// The password is never part of a read response, so it starts blank.
    pub fn from_user(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            password: String::new(),
        }
    }
}

impl FormFields for UserFields {
    type Field = UserField;

    fn schema() -> &'static [FieldSpec<UserField>] {
        USER_SCHEMA
    }

    fn value(&self, field: UserField) -> FieldValue {
        match field {
            UserField::Name => FieldValue::Text(self.name.clone()),
            UserField::Email => FieldValue::Text(self.email.clone()),
            UserField::Password => FieldValue::Text(self.password.clone()),
        }
    }

    fn with(&self, field: UserField, value: FieldValue) -> Result<Self, FieldError> {
        let FieldValue::Text(text) = value else {
            return Err(mismatch::<Self>(field));
        };
        let mut next = self.clone();
        match field {
            UserField::Name => next.name = text,
            UserField::Email => next.email = text,
            UserField::Password => next.password = text,
        }
        Ok(next)
    }
}

#[cfg(test)]
#[path = "tests/fields_tests.rs"]
mod tests;
