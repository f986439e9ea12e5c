use chrono::{DateTime, FixedOffset};
use fake::{Dummy, Fake, Faker};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::model::permission::Permission;

pub struct PermissionFactory<T: Clone> {
    modifier_one: fn(x: &Permission, ext: T) -> Permission,
    modifier_many: fn(x: &Permission, idx: usize, ext: T) -> Permission,
}

impl<T: Clone> Default for PermissionFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> PermissionFactory<T> {
    pub fn new() -> Self {
        Self {
            modifier_one: |x, _| x.clone(),
            modifier_many: |x, _, _| x.clone(),
        }
    }

    pub fn modified_one(&mut self, modifier: fn(x: &Permission, ext: T) -> Permission) {
        self.modifier_one = modifier
    }

    pub fn modified_many(&mut self, modifier: fn(x: &Permission, idx: usize, ext: T) -> Permission) {
        self.modifier_many = modifier
    }

    pub async fn generate_one(&mut self, db: &PgPool, ext: T) -> anyhow::Result<Permission> {
        let data = PermissionDummy::new();
        let data = data.generate_one();
        let data = (self.modifier_one)(&data, ext);
        sqlx::query(
            r#"
        INSERT INTO public.permissions (id, code, description, created_date, updated_date)
        VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(data.id)
        .bind(&data.code)
        .bind(&data.description)
        .bind(data.created_date)
        .bind(data.updated_date)
        .execute(db)
        .await?;
        Ok(data.clone())
    }

    pub async fn generate_many(
        &mut self,
        db: &PgPool,
        num: u32,
        ext: T,
    ) -> anyhow::Result<Vec<Permission>> {
        let data = PermissionDummy::new();
        let data = data.generate_many(num);
        let mut result: Vec<Permission> = vec![];
        for (idx, item) in data.iter().enumerate() {
            result.push((self.modifier_many)(item, idx, ext.clone()));
        }
        let mut tx = db.begin().await?;
        for item in result.clone() {
            sqlx::query(
                r#"
            INSERT INTO public.permissions (id, code, description, created_date, updated_date)
            VALUES ($1, $2, $3, $4, $5)"#,
            )
            .bind(item.id)
            .bind(&item.code)
            .bind(&item.description)
            .bind(item.created_date)
            .bind(item.updated_date)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(result)
    }
}

#[allow(dead_code)]
#[derive(Debug, Default, Deserialize, Dummy, Clone)]
struct PermissionDummy {
    pub id: Uuid,
    pub description: Option<String>,
    pub created_date: Option<DateTime<FixedOffset>>,
    pub updated_date: Option<DateTime<FixedOffset>>,
}

impl PermissionDummy {
    pub fn new() -> Self {
        Faker.fake::<Self>()
    }

    fn build(dummy: Self) -> Permission {
        Permission {
            id: dummy.id,
            code: format!("test.{}", dummy.id),
            description: dummy.description,
            created_date: dummy.created_date,
            updated_date: dummy.updated_date,
        }
    }

    pub fn generate_one(&self) -> Permission {
        Self::build(Faker.fake::<Self>())
    }

    pub fn generate_many(&self, num: u32) -> Vec<Permission> {
        let mut result: Vec<Permission> = vec![];
        for _ in 0..num {
            result.push(Self::build(Faker.fake::<Self>()));
        }
        result
    }
}
