use serde::Deserialize;
use sqlx::prelude::FromRow;
use uuid::Uuid;

pub const TABLE_NAME: &str = "public.role_user";

#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct RoleUser {
    pub role_id: Uuid,
    pub user_id: Uuid,
}
