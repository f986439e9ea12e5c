use chrono::{DateTime, FixedOffset};
use fake::{Dummy, Fake, Faker};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::model::user::User;

pub struct UserFactory<T: Clone> {
    modifier_one: fn(x: &User, ext: T) -> User,
    modifier_many: fn(x: &User, idx: usize, ext: T) -> User,
}

impl<T: Clone> Default for UserFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> UserFactory<T> {
    pub fn new() -> Self {
        Self {
            modifier_one: |x, _| x.clone(),
            modifier_many: |x, _, _| x.clone(),
        }
    }

    pub fn modified_one(&mut self, modifier: fn(x: &User, ext: T) -> User) {
        self.modifier_one = modifier
    }

    pub fn modified_many(&mut self, modifier: fn(x: &User, idx: usize, ext: T) -> User) {
        self.modifier_many = modifier
    }

    pub async fn generate_one(&mut self, db: &PgPool, ext: T) -> anyhow::Result<User> {
        let data = UserDummy::new();
        let data = data.generate_one();
        let data = (self.modifier_one)(&data, ext);
        sqlx::query(r#"
        INSERT INTO public.users (id, first_name, middle_name, last_name, phone, avatar, email, password, created_by, updated_by, created_date, updated_date, deleted_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)"#)
        .bind(data.id)
        .bind(&data.first_name)
        .bind(&data.middle_name)
        .bind(&data.last_name)
        .bind(&data.phone)
        .bind(&data.avatar)
        .bind(&data.email)
        .bind(&data.password)
        .bind(data.created_by)
        .bind(data.updated_by)
        .bind(data.created_date)
        .bind(data.updated_date)
        .bind(data.deleted_date)
        .execute(db).await?;
        Ok(data.clone())
    }

    pub async fn generate_many(
        &mut self,
        db: &PgPool,
        num: u32,
        ext: T,
    ) -> anyhow::Result<Vec<User>> {
        let data = UserDummy::new();
        let data = data.generate_many(num);
        let mut result: Vec<User> = vec![];
        for (idx, item) in data.iter().enumerate() {
            result.push((self.modifier_many)(item, idx, ext.clone()));
        }
        let mut tx = db.begin().await?;
        for item in result.clone() {
            sqlx::query(r#"
            INSERT INTO public.users (id, first_name, middle_name, last_name, phone, avatar, email, password, created_by, updated_by, created_date, updated_date, deleted_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)"#)
            .bind(item.id)
            .bind(&item.first_name)
            .bind(&item.middle_name)
            .bind(&item.last_name)
            .bind(&item.phone)
            .bind(&item.avatar)
            .bind(&item.email)
            .bind(&item.password)
            .bind(item.created_by)
            .bind(item.updated_by)
            .bind(item.created_date)
            .bind(item.updated_date)
            .bind(item.deleted_date)
            .execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(result)
    }
}

#[allow(dead_code)]
#[derive(Debug, Default, Deserialize, Dummy, Clone)]
struct UserDummy {
    pub id: Uuid,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub created_date: Option<DateTime<FixedOffset>>,
    pub updated_date: Option<DateTime<FixedOffset>>,
}

impl UserDummy {
    pub fn new() -> Self {
        Faker.fake::<Self>()
    }

    fn build(dummy: Self) -> User {
        User {
            id: dummy.id,
            first_name: dummy.first_name,
            middle_name: dummy.middle_name,
            last_name: dummy.last_name,
            phone: None,
            avatar: None,
            // id keeps the unique email constraint satisfied
            email: format!("{}@example.com", dummy.id),
            password: "unusable".to_string(),
            created_by: None,
            updated_by: None,
            created_date: dummy.created_date,
            updated_date: dummy.updated_date,
            deleted_date: None,
        }
    }

    pub fn generate_one(&self) -> User {
        Self::build(Faker.fake::<Self>())
    }

    pub fn generate_many(&self, num: u32) -> Vec<User> {
        let mut result: Vec<User> = vec![];
        for _ in 0..num {
            result.push(Self::build(Faker.fake::<Self>()));
        }
        result
    }
}
