use chrono::{DateTime, FixedOffset};
use fake::{Dummy, Fake, Faker};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::model::leave_type::LeaveType;

pub struct LeaveTypeFactory<T: Clone> {
    modifier_one: fn(x: &LeaveType, ext: T) -> LeaveType,
    modifier_many: fn(x: &LeaveType, idx: usize, ext: T) -> LeaveType,
}

impl<T: Clone> Default for LeaveTypeFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> LeaveTypeFactory<T> {
    pub fn new() -> Self {
        Self {
            modifier_one: |x, _| x.clone(),
            modifier_many: |x, _, _| x.clone(),
        }
    }

    pub fn modified_one(&mut self, modifier: fn(x: &LeaveType, ext: T) -> LeaveType) {
        self.modifier_one = modifier
    }

    pub fn modified_many(&mut self, modifier: fn(x: &LeaveType, idx: usize, ext: T) -> LeaveType) {
        self.modifier_many = modifier
    }

    pub async fn generate_one(&mut self, db: &PgPool, ext: T) -> anyhow::Result<LeaveType> {
        let data = LeaveTypeDummy::new();
        let data = data.generate_one();
        let data = (self.modifier_one)(&data, ext);
        sqlx::query(r#"
        INSERT INTO public.leave_types (id, name, is_paid, description, created_by, updated_by, created_date, updated_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#)
        .bind(data.id)
        .bind(&data.name)
        .bind(data.is_paid)
        .bind(&data.description)
        .bind(data.created_by)
        .bind(data.updated_by)
        .bind(data.created_date)
        .bind(data.updated_date)
        .execute(db).await?;
        Ok(data.clone())
    }

    pub async fn generate_many(
        &mut self,
        db: &PgPool,
        num: u32,
        ext: T,
    ) -> anyhow::Result<Vec<LeaveType>> {
        let data = LeaveTypeDummy::new();
        let data = data.generate_many(num);
        let mut result: Vec<LeaveType> = vec![];
        for (idx, item) in data.iter().enumerate() {
            result.push((self.modifier_many)(item, idx, ext.clone()));
        }
        let mut tx = db.begin().await?;
        for item in result.clone() {
            sqlx::query(r#"
            INSERT INTO public.leave_types (id, name, is_paid, description, created_by, updated_by, created_date, updated_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#)
            .bind(item.id)
            .bind(&item.name)
            .bind(item.is_paid)
            .bind(&item.description)
            .bind(item.created_by)
            .bind(item.updated_by)
            .bind(item.created_date)
            .bind(item.updated_date)
            .execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(result)
    }
}

#[allow(dead_code)]
#[derive(Debug, Default, Deserialize, Dummy, Clone)]
struct LeaveTypeDummy {
    pub id: Uuid,
    pub name: String,
    pub is_paid: bool,
    pub description: Option<String>,
    pub created_date: Option<DateTime<FixedOffset>>,
    pub updated_date: Option<DateTime<FixedOffset>>,
}

impl LeaveTypeDummy {
    pub fn new() -> Self {
        Faker.fake::<Self>()
    }

    fn build(dummy: Self) -> LeaveType {
        LeaveType {
            // uuid suffix keeps the unique name constraint out of the way
            id: dummy.id,
            name: format!("{} {}", dummy.name, dummy.id),
            is_paid: dummy.is_paid,
            description: dummy.description,
            created_by: None,
            updated_by: None,
            created_date: dummy.created_date,
            updated_date: dummy.updated_date,
        }
    }

    pub fn generate_one(&self) -> LeaveType {
        Self::build(Faker.fake::<Self>())
    }

    pub fn generate_many(&self, num: u32) -> Vec<LeaveType> {
        let mut result: Vec<LeaveType> = vec![];
        for _ in 0..num {
            result.push(Self::build(Faker.fake::<Self>()));
        }
        result
    }
}
