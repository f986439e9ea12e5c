use chrono::{DateTime, FixedOffset, NaiveDate};
use fake::{Dummy, Fake, Faker};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::model::holiday::Holiday;

pub struct HolidayFactory<T: Clone> {
    modifier_one: fn(x: &Holiday, ext: T) -> Holiday,
    modifier_many: fn(x: &Holiday, idx: usize, ext: T) -> Holiday,
}

impl<T: Clone> Default for HolidayFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> HolidayFactory<T> {
    pub fn new() -> Self {
        Self {
            modifier_one: |x, _| x.clone(),
            modifier_many: |x, _, _| x.clone(),
        }
    }

    pub fn modified_one(&mut self, modifier: fn(x: &Holiday, ext: T) -> Holiday) {
        self.modifier_one = modifier
    }

    pub fn modified_many(&mut self, modifier: fn(x: &Holiday, idx: usize, ext: T) -> Holiday) {
        self.modifier_many = modifier
    }

    pub async fn generate_one(&mut self, db: &PgPool, ext: T) -> anyhow::Result<Holiday> {
        let data = HolidayDummy::new();
        let data = data.generate_one();
        let data = (self.modifier_one)(&data, ext);
        sqlx::query(r#"
        INSERT INTO public.holidays (id, title, description, date, status, created_by, updated_by, created_date, updated_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"#)
        .bind(data.id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.date)
        .bind(data.status)
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
    ) -> anyhow::Result<Vec<Holiday>> {
        let data = HolidayDummy::new();
        let data = data.generate_many(num);
        let mut result: Vec<Holiday> = vec![];
        for (idx, item) in data.iter().enumerate() {
            result.push((self.modifier_many)(item, idx, ext.clone()));
        }
        let mut tx = db.begin().await?;
        for item in result.clone() {
            sqlx::query(r#"
            INSERT INTO public.holidays (id, title, description, date, status, created_by, updated_by, created_date, updated_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"#)
            .bind(item.id)
            .bind(&item.title)
            .bind(&item.description)
            .bind(item.date)
            .bind(item.status)
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
struct HolidayDummy {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub created_date: Option<DateTime<FixedOffset>>,
    pub updated_date: Option<DateTime<FixedOffset>>,
}

impl HolidayDummy {
    pub fn new() -> Self {
        Faker.fake::<Self>()
    }

    fn build(dummy: Self) -> Holiday {
        Holiday {
            id: dummy.id,
            title: dummy.title,
            description: dummy.description,
            date: dummy.date,
            status: true,
            created_by: None,
            updated_by: None,
            created_date: dummy.created_date,
            updated_date: dummy.updated_date,
        }
    }

    pub fn generate_one(&self) -> Holiday {
        Self::build(Faker.fake::<Self>())
    }

    pub fn generate_many(&self, num: u32) -> Vec<Holiday> {
        let mut result: Vec<Holiday> = vec![];
        for _ in 0..num {
            result.push(Self::build(Faker.fake::<Self>()));
        }
        result
    }
}
