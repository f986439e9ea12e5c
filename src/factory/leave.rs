use chrono::{DateTime, FixedOffset, NaiveDate};
use fake::{Dummy, Fake, Faker};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::utils::inclusive_day_count;
use crate::model::leave::{Leave, LeaveStatus};

pub struct LeaveFactory<T: Clone> {
    modifier_one: fn(x: &Leave, ext: T) -> Leave,
    modifier_many: fn(x: &Leave, idx: usize, ext: T) -> Leave,
}

impl<T: Clone> Default for LeaveFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> LeaveFactory<T> {
    pub fn new() -> Self {
        Self {
            modifier_one: |x, _| x.clone(),
            modifier_many: |x, _, _| x.clone(),
        }
    }

    pub fn modified_one(&mut self, modifier: fn(x: &Leave, ext: T) -> Leave) {
        self.modifier_one = modifier
    }

    pub fn modified_many(&mut self, modifier: fn(x: &Leave, idx: usize, ext: T) -> Leave) {
        self.modifier_many = modifier
    }

    pub async fn generate_one(&mut self, db: &PgPool, ext: T) -> anyhow::Result<Leave> {
        let data = LeaveDummy::new();
        let data = data.generate_one();
        let data = (self.modifier_one)(&data, ext);
        sqlx::query(r#"
        INSERT INTO public.leaves (id, user_id, leave_type_id, from_date, to_date, total_days, reason, status, approved_by, created_by, updated_by, created_date, updated_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)"#)
        .bind(data.id)
        .bind(data.user_id)
        .bind(data.leave_type_id)
        .bind(data.from_date)
        .bind(data.to_date)
        .bind(data.total_days)
        .bind(&data.reason)
        .bind(&data.status)
        .bind(data.approved_by)
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
    ) -> anyhow::Result<Vec<Leave>> {
        let data = LeaveDummy::new();
        let data = data.generate_many(num);
        let mut result: Vec<Leave> = vec![];
        for (idx, item) in data.iter().enumerate() {
            result.push((self.modifier_many)(item, idx, ext.clone()));
        }
        let mut tx = db.begin().await?;
        for item in result.clone() {
            sqlx::query(r#"
            INSERT INTO public.leaves (id, user_id, leave_type_id, from_date, to_date, total_days, reason, status, approved_by, created_by, updated_by, created_date, updated_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)"#)
            .bind(item.id)
            .bind(item.user_id)
            .bind(item.leave_type_id)
            .bind(item.from_date)
            .bind(item.to_date)
            .bind(item.total_days)
            .bind(&item.reason)
            .bind(&item.status)
            .bind(item.approved_by)
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
struct LeaveDummy {
    pub id: Uuid,
    pub user_id: Uuid,
    pub leave_type_id: Uuid,
    pub from_date: NaiveDate,
    pub reason: Option<String>,
    pub created_date: Option<DateTime<FixedOffset>>,
    pub updated_date: Option<DateTime<FixedOffset>>,
}

impl LeaveDummy {
    pub fn new() -> Self {
        Faker.fake::<Self>()
    }

    fn build(dummy: Self) -> Leave {
        let span: i64 = (0..10).fake();
        let to_date = dummy.from_date + chrono::Duration::days(span);
        Leave {
            id: dummy.id,
            user_id: dummy.user_id,
            leave_type_id: dummy.leave_type_id,
            from_date: dummy.from_date,
            to_date,
            total_days: inclusive_day_count(dummy.from_date, to_date),
            reason: dummy.reason,
            status: LeaveStatus::Pending.as_str().to_string(),
            approved_by: None,
            created_by: None,
            updated_by: None,
            created_date: dummy.created_date,
            updated_date: dummy.updated_date,
        }
    }

    pub fn generate_one(&self) -> Leave {
        Self::build(Faker.fake::<Self>())
    }

    pub fn generate_many(&self, num: u32) -> Vec<Leave> {
        let mut result: Vec<Leave> = vec![];
        for _ in 0..num {
            result.push(Self::build(Faker.fake::<Self>()));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use sqlx::PgPool;

    use crate::{factory::leave::LeaveFactory, model::leave::LeaveStatus};

    #[sqlx::test]
    async fn test_generate_one(pool: PgPool) -> anyhow::Result<()> {
        // When
        let mut factory = LeaveFactory::new();
        let leave = factory.generate_one(&pool, ()).await?;

        // Expect
        assert_eq!(leave.status, LeaveStatus::Pending.as_str());
        let num_data: (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM public.leaves"#)
            .fetch_one(&pool)
            .await?;
        assert_eq!(num_data.0, 1);
        Ok(())
    }

    #[sqlx::test]
    async fn test_generate_many(pool: PgPool) -> anyhow::Result<()> {
        // When
        let mut factory = LeaveFactory::new();
        factory.generate_many(&pool, 10, ()).await?;

        // Expect
        let num_data: (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM public.leaves"#)
            .fetch_one(&pool)
            .await?;
        assert_eq!(num_data.0, 10);
        Ok(())
    }
}
