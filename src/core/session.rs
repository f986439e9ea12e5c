use redis::ConnectionLike;
use serde::{Deserialize, Serialize};

use crate::{model::user::User, settings::Config};

fn session_key(token: &str) -> String {
    format!("session:{}", token)
}

/// Server-side session record, keyed by the access token. Logout removes
/// the record, which invalidates the token before its JWT expiry.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionData {
    pub user_id: String,
    pub refresh_token: String,
}

pub fn add_session<C: ConnectionLike>(
    redis_conn: &mut C,
    user: &User,
    config: &Config,
    token: String,
    refresh_token: String,
) -> anyhow::Result<()> {
    let session_data = SessionData {
        user_id: user.id.to_string(),
        refresh_token,
    };
    let session_json = serde_json::to_string(&session_data)?;
    // the record expires with the access token
    let ttl_seconds = config.jwt_exp as u64 * 60;
    redis::Cmd::set_ex(session_key(&token), session_json, ttl_seconds).exec(redis_conn)?;
    Ok(())
}

pub fn get_session<C: ConnectionLike>(
    redis_conn: &mut C,
    token: String,
) -> anyhow::Result<Option<SessionData>> {
    let res: Option<String> = redis::Cmd::get(session_key(&token)).query(redis_conn)?;
    match res {
        Some(raw) => {
            let session_data: SessionData = serde_json::from_str(raw.as_str())?;
            Ok(Some(session_data))
        }
        None => Ok(None),
    }
}

/// Returns false when there was no session to remove.
pub fn remove_session<C: ConnectionLike>(
    redis_conn: &mut C,
    token: String,
) -> anyhow::Result<bool> {
    let removed: u64 = redis::Cmd::del(session_key(&token)).query(redis_conn)?;
    Ok(removed > 0)
}
