use std::env;

use serde::Deserialize;
use tracing::info;

/// Process configuration, deserialized from the environment. With
/// `env=file` (the default) a `.env` file is loaded first.
#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    pub env: String, // file / server
    pub host: String,
    pub port: u16,
    pub prefix: Option<String>,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_exp: u16,         // minutes
    pub jwt_refresh_exp: u16, // minutes
    pub redis_url: String,
    pub log_dir: Option<String>,
}

pub fn get_config() -> Config {
    let env_var = env::var("env").unwrap_or("file".to_string());
    if env_var == "file" {
        info!("loading environment from .env file");
        let _ = dotenvy::dotenv();
    } else {
        info!("loading environment from the server process");
    }
    envy::from_env::<Config>().unwrap()
}
