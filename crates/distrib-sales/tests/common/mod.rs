//! Shared fixtures for the service tests.

#![allow(dead_code)]

use std::sync::Arc;

use distrib_core::{Customer, Product, RoleOwnershipPolicy};
use distrib_db::{Database, DbConfig};
use distrib_sales::{SalesConfig, SalesService};
use tempfile::TempDir;

pub struct Fixture {
    pub service: SalesService,
    pub customer_id: String,
    // Keeps a file-backed database alive for the test's duration.
    _dir: Option<TempDir>,
}

impl Fixture {
    pub fn db(&self) -> &Database {
        self.service.db()
    }

    pub async fn product(&self, code: &str, price_cents: i64, stock: i64) -> String {
        let product = self
            .db()
            .catalog()
            .insert_product(&Product {
                id: String::new(),
                code: code.to_string(),
                name: format!("Produto {code}"),
                price_cents,
                is_active: true,
            })
            .await
            .unwrap();
        self.db()
            .inventory()
            .set_stock(&product.id, stock, 2, None)
            .await
            .unwrap();
        product.id
    }

    pub async fn customer(&self, name: &str) -> String {
        insert_customer(self.db(), name).await
    }

    pub async fn stock(&self, product_id: &str) -> i64 {
        self.db().inventory().available(product_id).await.unwrap()
    }
}

async fn insert_customer(db: &Database, name: &str) -> String {
    db.catalog()
        .insert_customer(&Customer {
            id: String::new(),
            name: name.to_string(),
            document: None,
            is_active: true,
        })
        .await
        .unwrap()
        .id
}

async fn build(db: Database, dir: Option<TempDir>) -> Fixture {
    let customer_id = insert_customer(&db, "Empresa ABC Ltda").await;
    let service = SalesService::new(db, SalesConfig::default(), Arc::new(RoleOwnershipPolicy));
    Fixture {
        service,
        customer_id,
        _dir: dir,
    }
}

/// Single-connection in-memory database.
pub async fn in_memory() -> Fixture {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    build(db, None).await
}

/// File-backed database with a real pool, for concurrent writers.
pub async fn on_disk() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let config = DbConfig::new(dir.path().join("distrib.db")).max_connections(4);
    let db = Database::new(config).await.unwrap();
    build(db, Some(dir)).await
}
