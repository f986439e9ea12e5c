use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2, PasswordHash, PasswordVerifier,
};
use chrono::{Duration, Local};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use poem::Request;
use poem_openapi::{auth::Bearer, SecurityScheme};
use redis::ConnectionLike;
use serde::{Deserialize, Serialize};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{model::user::User, repository::user::get_user_by_id, settings::Config};

use super::session::get_session;

/// password hashing
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);

    // Argon2 with default params (Argon2id v19)
    let argon2 = Argon2::default();

    // Hash password to PHC string ($argon2id$v=19$...)
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)?
        .to_string();

    Ok(password_hash)
}

/// password hash verification
pub fn verify_hash_password(
    password: &str,
    password_hash: &str,
) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(password_hash)?;
    let verify = Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok();
    Ok(verify)
}

#[cfg(test)]
mod test_token_claims {
    use uuid::Uuid;

    use super::*;
    use crate::settings::Config;

    fn test_config() -> Config {
        Config {
            env: "file".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8000,
            prefix: None,
            database_url: "postgres://localhost/test".to_string(),
            jwt_secret: "test-secret".to_string(),
            jwt_exp: 15,
            jwt_refresh_exp: 60,
            redis_url: "redis://localhost".to_string(),
            log_dir: None,
        }
    }

    #[test]
    fn test_claims_round_trip() {
        let config = test_config();
        let user_id = Uuid::now_v7().to_string();
        let claims = Claims::new(&user_id, "someone@example.com", config.clone());
        let token = encode_token(&claims, config.jwt_secret.clone()).unwrap();

        let decoded = decode_token(&token, config.jwt_secret.clone()).unwrap();
        assert_eq!(decoded.id, user_id);
        assert_eq!(decoded.email, "someone@example.com");

        // a token signed with another secret does not decode
        assert!(decode_token(&token, "other-secret".to_string()).is_err());
    }
}

#[cfg(test)]
mod test_hash_password {
    use super::*;

    #[test]
    fn test_hashing_password() {
        let password = "secretpassword";
        let hash = hash_password(&password);
        assert!(hash.is_ok());
        let hash = hash.unwrap();
        let verify = verify_hash_password(&password, &hash);
        assert!(verify.is_ok());
        assert!(verify.unwrap());
        let verify_false = verify_hash_password("wrongpassword", &hash);
        assert!(verify_false.is_ok());
        assert_eq!(verify_false.unwrap(), false);
    }
}

pub struct Keys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
}

impl Keys {
    fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub id: String,
    pub email: String,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: &str, email: &str, config: Config) -> Self {
        let exp = (Local::now() + Duration::minutes(config.jwt_exp as i64)).timestamp();

        Self {
            id: user_id.to_string(),
            email: email.to_string(),
            exp,
        }
    }
}

/// Generate token
pub fn encode_token(claims: &Claims, jwt_secret: String) -> anyhow::Result<String> {
    let keys = Keys::new(jwt_secret.as_bytes());
    let token = encode(&Header::default(), &claims, &keys.encoding)?;
    Ok(token)
}

/// Extract payload and Validate token
pub fn decode_token(token: &str, jwt_secret: String) -> anyhow::Result<Claims> {
    let keys = Keys::new(jwt_secret.as_bytes());
    let token_data = decode::<Claims>(token, &keys.decoding, &Validation::default())?;
    Ok(token_data.claims)
}

pub async fn generate_token_from_user(user: User, config: Config) -> anyhow::Result<String> {
    let claims = Claims::new(
        user.id.to_string().as_str(),
        user.email.as_str(),
        config.clone(),
    );
    let token = encode_token(&claims, config.jwt_secret)?;
    Ok(token)
}

/// Resolve the request principal: session lookup by access token, then the
/// user row. None means unauthenticated, never an error.
pub async fn get_user_from_token<C: ConnectionLike>(
    tx: &mut Transaction<'_, Postgres>,
    redis_conn: &mut C,
    jwt_token: Option<String>,
) -> anyhow::Result<Option<User>> {
    if jwt_token.is_none() {
        return Ok(None);
    }
    let session = get_session(redis_conn, jwt_token.unwrap())?;
    if session.is_none() {
        return Ok(None);
    }
    let user_id = Uuid::parse_str(&session.unwrap().user_id)?;
    let user = get_user_by_id(tx, &user_id, None).await?;
    Ok(user)
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ClaimsRefresh {
    pub id: String,
    pub email: String,
    pub exp: i64,
    pub type_key: String,
}

impl ClaimsRefresh {
    pub fn new(user_id: &str, email: &str, config: Config) -> Self {
        let exp = (Local::now() + Duration::minutes(config.jwt_refresh_exp as i64)).timestamp();

        Self {
            id: user_id.to_string(),
            email: email.to_string(),
            exp,
            type_key: "refresh".to_string(),
        }
    }
}

/// Generate refresh token
pub fn encode_refresh_token(claims: &ClaimsRefresh, jwt_secret: String) -> anyhow::Result<String> {
    let keys = Keys::new(jwt_secret.as_bytes());
    let token = encode(&Header::default(), &claims, &keys.encoding)?;
    Ok(token)
}

/// Extract payload and Validate referesh token
pub fn decode_refresh_token(token: &str, jwt_secret: String) -> anyhow::Result<ClaimsRefresh> {
    let keys = Keys::new(jwt_secret.as_bytes());
    let token_data = decode::<ClaimsRefresh>(token, &keys.decoding, &Validation::default())?;
    Ok(token_data.claims)
}

pub async fn generate_refresh_token_from_user(
    user: User,
    config: Config,
) -> anyhow::Result<String> {
    let claims = ClaimsRefresh::new(
        user.id.to_string().as_str(),
        user.email.as_str(),
        config.clone(),
    );
    let token = encode_refresh_token(&claims, config.jwt_secret)?;
    Ok(token)
}

pub async fn get_user_from_refresh_token(
    tx: &mut Transaction<'_, Postgres>,
    refresh_token: Option<String>,
    config: Config,
) -> anyhow::Result<Option<User>> {
    if refresh_token.is_none() {
        return Ok(None);
    }
    let claims = decode_refresh_token(refresh_token.unwrap().as_str(), config.jwt_secret)?;
    if claims.type_key != "refresh" {
        return Ok(None);
    }
    let user_id = Uuid::parse_str(&claims.id)?;
    let user = get_user_by_id(tx, &user_id, None).await?;
    Ok(user)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserApiKey {
    pub token: Option<String>,
}

/// ApiKey authorization
#[derive(SecurityScheme)]
#[oai(ty = "bearer", checker = "bearer_checker")]
pub struct BearerAuthorization(pub UserApiKey);

pub async fn bearer_checker(_req: &Request, api_key: Bearer) -> Option<UserApiKey> {
    Some(UserApiKey {
        token: Some(api_key.token),
    })
}
