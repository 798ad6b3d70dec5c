//! Resource descriptors tying an entity type to its id, raw form fields,
//! wire payloads, and fixed user-facing strings.

use std::fmt;

use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{ProductId, UserId},
    protocol::{NewProduct, NewUser, Product, ProductPatch, User, UserPatch},
};

use crate::{
    fields::{FormFields, ProductFields, UserFields},
    transform,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Product,
    User,
}

impl ResourceKind {
    /// Collection path segment on the data service.
    pub fn path(self) -> &'static str {
        match self {
            Self::Product => "products",
            Self::User => "users",
        }
    }

    pub fn list_failed(self) -> &'static str {
        match self {
            Self::Product => "Failed to fetch products",
            Self::User => "Failed to fetch users",
        }
    }

    pub fn create_failed(self) -> &'static str {
        match self {
            Self::Product => "Failed to create product",
            Self::User => "Failed to create user",
        }
    }

    pub fn update_failed(self) -> &'static str {
        match self {
            Self::Product => "Failed to update product",
            Self::User => "Failed to update user",
        }
    }

    pub fn delete_failed(self) -> &'static str {
        match self {
            Self::Product => "Failed to delete product",
            Self::User => "Failed to delete user",
        }
    }

    pub fn delete_prompt(self) -> &'static str {
        match self {
            Self::Product => "Are you sure you want to delete this product?",
            Self::User => "Are you sure you want to delete this user?",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Product => f.write_str("product"),
            Self::User => f.write_str("user"),
        }
    }
}

pub trait Resource: Send + Sync + 'static {
    type Id: Copy + Eq + fmt::Debug + fmt::Display + Send + Sync + 'static;
    type Entity: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static;
    type Fields: FormFields;
    type Create: Serialize + fmt::Debug + Send + Sync + 'static;
    type Update: Serialize + fmt::Debug + Send + Sync + 'static;

    const KIND: ResourceKind;

    fn id_of(entity: &Self::Entity) -> Self::Id;

    fn fields_for_create() -> Self::Fields;

    /// Copies an entity into its raw editable representation. The entity is
    /// not retained.
    fn fields_for_edit(entity: &Self::Entity) -> Self::Fields;

    fn to_create(fields: &Self::Fields) -> Self::Create;

    fn to_update(fields: &Self::Fields) -> Self::Update;
}

pub struct Products;

impl Resource for Products {
    type Id = ProductId;
    type Entity = Product;
    type Fields = ProductFields;
    type Create = NewProduct;
    type Update = ProductPatch;

    const KIND: ResourceKind = ResourceKind::Product;

    fn id_of(entity: &Product) -> ProductId {
        entity.id
    }

    fn fields_for_create() -> ProductFields {
        ProductFields::default()
    }

    fn fields_for_edit(entity: &Product) -> ProductFields {
        ProductFields::from_product(entity)
    }

    fn to_create(fields: &ProductFields) -> NewProduct {
        transform::product_payload(fields)
    }

    fn to_update(fields: &ProductFields) -> ProductPatch {
        transform::product_patch(fields)
    }
}

pub struct Users;

impl Resource for Users {
    type Id = UserId;
    type Entity = User;
    type Fields = UserFields;
    type Create = NewUser;
    type Update = UserPatch;

    const KIND: ResourceKind = ResourceKind::User;

    fn id_of(entity: &User) -> UserId {
        entity.id
    }

    fn fields_for_create() -> UserFields {
        UserFields::default()
    }

    fn fields_for_edit(entity: &User) -> UserFields {
        UserFields::from_user(entity)
    }

    fn to_create(fields: &UserFields) -> NewUser {
        transform::user_payload(fields)
    }

    fn to_update(fields: &UserFields) -> UserPatch {
        transform::user_patch(fields)
    }
}
