#![cfg(test)]
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use tokio::sync::OnceCell;

use models::db::{connect_with_config, DatabaseConfig, DATABASE_URL};

// Migrations run once per test process
static MIGRATED: OnceCell<bool> = OnceCell::const_new();

fn test_config() -> DatabaseConfig {
    DatabaseConfig {
        url: DATABASE_URL.clone(),
        min_connections: 1,
        max_connections: 10,
        connect_timeout_secs: 3,
        acquire_timeout_secs: 10,
        ..Default::default()
    }
}

/// A migrated database, or `None` when `SKIP_DB_TESTS` is set or nothing is listening.
pub async fn get_db() -> Option<DatabaseConnection> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return None;
    }
    let ready = *MIGRATED
        .get_or_init(|| async {
            let Ok(db) = connect_with_config(&test_config()).await else {
                eprintln!("skip: database unreachable");
                return false;
            };
            match migration::Migrator::up(&db, None).await {
                Ok(()) => true,
                Err(e) => {
                    eprintln!("skip: migrate up failed: {e}");
                    false
                }
            }
        })
        .await;
    if !ready {
        return None;
    }
    // fresh connection for the current test's runtime
    connect_with_config(&test_config()).await.ok()
}

/// Registers a throwaway user directly through the model layer.
pub async fn make_user(db: &DatabaseConnection, prefix: &str) -> models::user::Model {
    let id = uuid::Uuid::new_v4().simple().to_string();
    models::user::create(db, &format!("{prefix}_{}", &id[..12]), "Test", "User")
        .await
        .expect("create test user")
}
