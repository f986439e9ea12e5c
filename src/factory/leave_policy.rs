use chrono::{DateTime, FixedOffset};
use fake::{Dummy, Fake, Faker};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::model::leave_policy::LeavePolicy;

pub struct LeavePolicyFactory<T: Clone> {
    modifier_one: fn(x: &LeavePolicy, ext: T) -> LeavePolicy,
    modifier_many: fn(x: &LeavePolicy, idx: usize, ext: T) -> LeavePolicy,
}

impl<T: Clone> Default for LeavePolicyFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> LeavePolicyFactory<T> {
    pub fn new() -> Self {
        Self {
            modifier_one: |x, _| x.clone(),
            modifier_many: |x, _, _| x.clone(),
        }
    }

    pub fn modified_one(&mut self, modifier: fn(x: &LeavePolicy, ext: T) -> LeavePolicy) {
        self.modifier_one = modifier
    }

    pub fn modified_many(&mut self, modifier: fn(x: &LeavePolicy, idx: usize, ext: T) -> LeavePolicy) {
        self.modifier_many = modifier
    }

    pub async fn generate_one(&mut self, db: &PgPool, ext: T) -> anyhow::Result<LeavePolicy> {
        let data = LeavePolicyDummy::new();
        let data = data.generate_one();
        let data = (self.modifier_one)(&data, ext);
        sqlx::query(r#"
        INSERT INTO public.leave_policies (id, user_id, leave_type_id, policy_name, total_days, remaining_days, created_by, updated_by, created_date, updated_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"#)
        .bind(data.id)
        .bind(data.user_id)
        .bind(data.leave_type_id)
        .bind(&data.policy_name)
        .bind(data.total_days)
        .bind(data.remaining_days)
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
    ) -> anyhow::Result<Vec<LeavePolicy>> {
        let data = LeavePolicyDummy::new();
        let data = data.generate_many(num);
        let mut result: Vec<LeavePolicy> = vec![];
        for (idx, item) in data.iter().enumerate() {
            result.push((self.modifier_many)(item, idx, ext.clone()));
        }
        let mut tx = db.begin().await?;
        for item in result.clone() {
            sqlx::query(r#"
            INSERT INTO public.leave_policies (id, user_id, leave_type_id, policy_name, total_days, remaining_days, created_by, updated_by, created_date, updated_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"#)
            .bind(item.id)
            .bind(item.user_id)
            .bind(item.leave_type_id)
            .bind(&item.policy_name)
            .bind(item.total_days)
            .bind(item.remaining_days)
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
struct LeavePolicyDummy {
    pub id: Uuid,
    pub user_id: Uuid,
    pub leave_type_id: Uuid,
    pub policy_name: Option<String>,
    pub created_date: Option<DateTime<FixedOffset>>,
    pub updated_date: Option<DateTime<FixedOffset>>,
}

impl LeavePolicyDummy {
    pub fn new() -> Self {
        Faker.fake::<Self>()
    }

    pub fn generate_one(&self) -> LeavePolicy {
        let dummy = Faker.fake::<Self>();
        LeavePolicy {
            id: dummy.id,
            user_id: dummy.user_id,
            leave_type_id: dummy.leave_type_id,
            policy_name: dummy.policy_name,
            total_days: (0..30).fake(),
            remaining_days: 0,
            created_by: None,
            updated_by: None,
            created_date: dummy.created_date,
            updated_date: dummy.updated_date,
        }
    }

    pub fn generate_many(&self, num: u32) -> Vec<LeavePolicy> {
        let mut result: Vec<LeavePolicy> = vec![];
        for _ in 0..num {
            let dummy = Faker.fake::<Self>();
            let total_days: i32 = (0..30).fake();
            result.push(LeavePolicy {
                id: dummy.id,
                user_id: dummy.user_id,
                leave_type_id: dummy.leave_type_id,
                policy_name: dummy.policy_name,
                total_days,
                remaining_days: total_days,
                created_by: None,
                updated_by: None,
                created_date: dummy.created_date,
                updated_date: dummy.updated_date,
            });
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use sqlx::PgPool;

    use crate::factory::leave_policy::LeavePolicyFactory;

    #[sqlx::test]
    async fn test_generate_one(pool: PgPool) -> anyhow::Result<()> {
        // When
        let mut factory = LeavePolicyFactory::new();
        factory.generate_one(&pool, ()).await?;

        // Expect
        let num_data: (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM public.leave_policies"#)
            .fetch_one(&pool)
            .await?;
        assert_eq!(num_data.0, 1);
        Ok(())
    }

    #[sqlx::test]
    async fn test_generate_many(pool: PgPool) -> anyhow::Result<()> {
        // When
        let mut factory = LeavePolicyFactory::new();
        factory.generate_many(&pool, 5, ()).await?;

        // Expect
        let num_data: (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM public.leave_policies"#)
            .fetch_one(&pool)
            .await?;
        assert_eq!(num_data.0, 5);
        Ok(())
    }
}
