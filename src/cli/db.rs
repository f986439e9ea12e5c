use sqlx::PgPool;
use tokio::process::Command;

use crate::{repository::permission, settings::Config};

pub async fn db_generate(migration_name: &String) {
    let _ = Command::new("sqlx")
        .arg("migrate")
        .arg("add")
        .arg(migration_name)
        .arg("-r")
        .status()
        .await
        .unwrap();
}

pub async fn db_list(config: &Config) {
    let _ = Command::new("sqlx")
        .arg("migrate")
        .arg("info")
        .arg("-D")
        .arg(&config.database_url)
        .status()
        .await
        .unwrap();
}

pub async fn db_migrate(config: &Config) {
    let _ = Command::new("sqlx")
        .arg("migrate")
        .arg("run")
        .arg("-D")
        .arg(&config.database_url)
        .status()
        .await
        .unwrap();
}

pub async fn db_revert(config: &Config) {
    let _ = Command::new("sqlx")
        .arg("migrate")
        .arg("revert")
        .arg("-D")
        .arg(&config.database_url)
        .status()
        .await
        .unwrap();
}

/// Install or refresh the capability catalog. Safe to rerun.
pub async fn db_seed_permissions(pool: &PgPool) -> anyhow::Result<()> {
    let mut tx = pool.begin().await?;
    for (code, description) in permission::PERMISSION_CATALOG {
        permission::upsert_permission(&mut tx, code, description).await?;
    }
    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use sqlx::PgPool;

    use crate::{
        cli::db::db_seed_permissions,
        repository::permission::{get_permission_by_code, PERMISSION_CATALOG},
    };

    #[sqlx::test]
    async fn test_seed_permissions_is_idempotent(pool: PgPool) -> anyhow::Result<()> {
        // When
        db_seed_permissions(&pool).await?;
        db_seed_permissions(&pool).await?;

        // Expect
        let count: (i64,) = sqlx::query_as("SELECT count(id) FROM public.permissions")
            .fetch_one(&pool)
            .await?;
        assert_eq!(count.0 as usize, PERMISSION_CATALOG.len());

        let mut tx = pool.begin().await?;
        let decide = get_permission_by_code(&mut tx, "leaves.decide").await?;
        assert!(decide.is_some());
        assert_eq!(decide.unwrap().description.as_deref(), Some("Can decide leaves"));
        Ok(())
    }
}
