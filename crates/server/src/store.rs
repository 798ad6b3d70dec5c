//! In-memory data service state. Ids are sequential per resource from 1.

use std::{collections::BTreeMap, sync::Arc};

use chrono::Utc;
use shared::{
    domain::{ProductId, UserId},
    protocol::{NewProduct, NewUser, Product, ProductPatch, User, UserPatch},
};
use tokio::sync::RwLock;

struct StoredUser {
    user: User,
    password: String,
}

struct StoreState {
    products: BTreeMap<ProductId, Product>,
    users: BTreeMap<UserId, StoredUser>,
    next_product_id: i64,
    next_user_id: i64,
}

#[derive(Clone)]
pub struct Store {
    inner: Arc<RwLock<StoreState>>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(StoreState {
                products: BTreeMap::new(),
                users: BTreeMap::new(),
                next_product_id: 1,
                next_user_id: 1,
            })),
        }
    }

    pub async fn seeded() -> Self {
        let store = Self::new();
        for product in sample_products() {
            store.create_product(product).await;
        }
        store
    }

    pub async fn list_products(&self) -> Vec<Product> {
        self.inner.read().await.products.values().cloned().collect()
    }

    pub async fn get_product(&self, id: ProductId) -> Option<Product> {
        self.inner.read().await.products.get(&id).cloned()
    }

    pub async fn create_product(&self, new: NewProduct) -> Product {
        let mut state = self.inner.write().await;
        let id = ProductId(state.next_product_id);
        state.next_product_id += 1;
        let product = Product {
            id,
            name: new.name,
            description: new.description,
            price: new.price,
            category: new.category,
            tags: new.tags,
            in_stock: new.in_stock,
            created_at: Utc::now(),
        };
        state.products.insert(id, product.clone());
        product
    }

    /// Applies only the fields present in `patch`.
    pub async fn update_product(&self, id: ProductId, patch: ProductPatch) -> Option<Product> {
        let mut state = self.inner.write().await;
        let product = state.products.get_mut(&id)?;
        if let Some(name) = patch.name {
            product.name = name;
        }
        if let Some(description) = patch.description {
            product.description = description;
        }
        if let Some(price) = patch.price {
            product.price = price;
        }
        if let Some(category) = patch.category {
            product.category = category;
        }
        if let Some(tags) = patch.tags {
            product.tags = tags;
        }
        if let Some(in_stock) = patch.in_stock {
            product.in_stock = in_stock;
        }
        Some(product.clone())
    }

    pub async fn delete_product(&self, id: ProductId) -> bool {
        self.inner.write().await.products.remove(&id).is_some()
    }

    pub async fn list_users(&self) -> Vec<User> {
        self.inner
            .read()
            .await
            .users
            .values()
            .map(|stored| stored.user.clone())
            .collect()
    }

    pub async fn get_user(&self, id: UserId) -> Option<User> {
        self.inner
            .read()
            .await
            .users
            .get(&id)
            .map(|stored| stored.user.clone())
    }

    pub async fn create_user(&self, new: NewUser) -> User {
        let mut state = self.inner.write().await;
        let id = UserId(state.next_user_id);
        state.next_user_id += 1;
        let user = User {
            id,
            name: new.name,
            email: new.email,
            created_at: Utc::now(),
        };
        state.users.insert(
            id,
            StoredUser {
                user: user.clone(),
                password: new.password,
            },
        );
        user
    }

    /// A missing `password` keeps the stored one.
    pub async fn update_user(&self, id: UserId, patch: UserPatch) -> Option<User> {
        let mut state = self.inner.write().await;
        let stored = state.users.get_mut(&id)?;
        if let Some(name) = patch.name {
            stored.user.name = name;
        }
        if let Some(email) = patch.email {
            stored.user.email = email;
        }
        if let Some(password) = patch.password {
            stored.password = password;
        }
        Some(stored.user.clone())
    }

    pub async fn delete_user(&self, id: UserId) -> bool {
        self.inner.write().await.users.remove(&id).is_some()
    }

    #[cfg(test)]
    pub async fn password_of(&self, id: UserId) -> Option<String> {
        self.inner
            .read()
            .await
            .users
            .get(&id)
            .map(|stored| stored.password.clone())
    }
}

fn sample_products() -> Vec<NewProduct> {
    vec![
        NewProduct {
            name: "Wireless Headphones".into(),
            description: "Noise-cancelling over-ear headphones".into(),
            price: 199.99,
            category: "Electronics".into(),
            tags: vec!["audio".into(), "wireless".into()],
            in_stock: true,
        },
        NewProduct {
            name: "Coffee Maker".into(),
            description: "12-cup programmable drip coffee maker".into(),
            price: 89.99,
            category: "Appliances".into(),
            tags: vec!["kitchen".into()],
            in_stock: true,
        },
        NewProduct {
            name: "Running Shoes".into(),
            description: "Lightweight trail running shoes".into(),
            price: 129.5,
            category: "Sports".into(),
            tags: vec!["fitness".into(), "outdoor".into()],
            in_stock: false,
        },
    ]
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
