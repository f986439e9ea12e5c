use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use sqlx::prelude::FromRow;
use uuid::Uuid;

pub const TABLE_NAME: &str = "public.leave_policies";

/// Per (user, leave type) allotment. `remaining_days` is the single source
/// of truth for the balance; only approval decrements it.
#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct LeavePolicy {
    pub id: Uuid,
    pub user_id: Uuid,
    pub leave_type_id: Uuid,
    pub policy_name: Option<String>,
    pub total_days: i32,
    pub remaining_days: i32,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_date: Option<DateTime<FixedOffset>>,
    pub updated_date: Option<DateTime<FixedOffset>>,
}
