use chrono::{DateTime, FixedOffset, NaiveDate};
use fake::{Dummy, Fake, Faker};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::model::attendance::Attendance;

pub struct AttendanceFactory<T: Clone> {
    modifier_one: fn(x: &Attendance, ext: T) -> Attendance,
    modifier_many: fn(x: &Attendance, idx: usize, ext: T) -> Attendance,
}

impl<T: Clone> Default for AttendanceFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> AttendanceFactory<T> {
    pub fn new() -> Self {
        Self {
            modifier_one: |x, _| x.clone(),
            modifier_many: |x, _, _| x.clone(),
        }
    }

    pub fn modified_one(&mut self, modifier: fn(x: &Attendance, ext: T) -> Attendance) {
        self.modifier_one = modifier
    }

    pub fn modified_many(&mut self, modifier: fn(x: &Attendance, idx: usize, ext: T) -> Attendance) {
        self.modifier_many = modifier
    }

    pub async fn generate_one(&mut self, db: &PgPool, ext: T) -> anyhow::Result<Attendance> {
        let data = AttendanceDummy::new();
        let data = data.generate_one();
        let data = (self.modifier_one)(&data, ext);
        sqlx::query(r#"
        INSERT INTO public.attendances (id, user_id, date, clock_in, clock_out, in_note, out_note, created_date, updated_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"#)
        .bind(data.id)
        .bind(data.user_id)
        .bind(data.date)
        .bind(data.clock_in)
        .bind(data.clock_out)
        .bind(&data.in_note)
        .bind(&data.out_note)
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
    ) -> anyhow::Result<Vec<Attendance>> {
        let data = AttendanceDummy::new();
        let data = data.generate_many(num);
        let mut result: Vec<Attendance> = vec![];
        for (idx, item) in data.iter().enumerate() {
            result.push((self.modifier_many)(item, idx, ext.clone()));
        }
        let mut tx = db.begin().await?;
        for item in result.clone() {
            sqlx::query(r#"
            INSERT INTO public.attendances (id, user_id, date, clock_in, clock_out, in_note, out_note, created_date, updated_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"#)
            .bind(item.id)
            .bind(item.user_id)
            .bind(item.date)
            .bind(item.clock_in)
            .bind(item.clock_out)
            .bind(&item.in_note)
            .bind(&item.out_note)
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
struct AttendanceDummy {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub in_note: Option<String>,
    pub created_date: Option<DateTime<FixedOffset>>,
    pub updated_date: Option<DateTime<FixedOffset>>,
}

impl AttendanceDummy {
    pub fn new() -> Self {
        Faker.fake::<Self>()
    }

    fn build(dummy: Self) -> Attendance {
        let clock_in = dummy
            .created_date
            .unwrap_or(chrono::Local::now().fixed_offset());
        Attendance {
            id: dummy.id,
            user_id: dummy.user_id,
            date: dummy.date,
            clock_in,
            clock_out: None,
            in_note: dummy.in_note,
            out_note: None,
            created_date: dummy.created_date,
            updated_date: dummy.updated_date,
        }
    }

    pub fn generate_one(&self) -> Attendance {
        Self::build(Faker.fake::<Self>())
    }

    pub fn generate_many(&self, num: u32) -> Vec<Attendance> {
        let mut result: Vec<Attendance> = vec![];
        for _ in 0..num {
            result.push(Self::build(Faker.fake::<Self>()));
        }
        result
    }
}
