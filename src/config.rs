use serde::{Deserialize, Serialize};
use std::env;

use crate::entities::ticket_entity as tickets;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub admin: AdminConfig,
    #[serde(default)]
    pub lottery: LotteryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expires_in: i64, // seconds
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AdminConfig {
    /// bcrypt hash of the operator password (empty disables operator login)
    pub password_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LotteryConfig {
    /// Tickets created per round, numbered 1..=pool_size
    pub pool_size: i32,
    pub owner_name_min: usize,
    pub owner_name_max: usize,
    pub leaderboard_size: u64,
    pub frequency_size: u64,
    pub recent_winners_size: u64,
}

impl Default for LotteryConfig {
    fn default() -> Self {
        Self {
            pool_size: 200,
            owner_name_min: 2,
            owner_name_max: 50,
            leaderboard_size: 10,
            frequency_size: 5,
            recent_winners_size: 3,
        }
    }
}

impl LotteryConfig {
    pub fn validate(&self) -> AppResult<()> {
        if self.pool_size < 1 {
            return Err(AppError::ConfigError(format!(
                "lottery.pool_size must be at least 1, got {}",
                self.pool_size
            )));
        }
        if self.owner_name_min == 0 || self.owner_name_min > self.owner_name_max {
            return Err(AppError::ConfigError(format!(
                "invalid owner name bounds [{}, {}]",
                self.owner_name_min, self.owner_name_max
            )));
        }
        if self.owner_name_max > tickets::OWNER_NAME_MAX_LEN {
            return Err(AppError::ConfigError(format!(
                "lottery.owner_name_max must be at most {}, got {}",
                tickets::OWNER_NAME_MAX_LEN,
                self.owner_name_max
            )));
        }
        if self.leaderboard_size == 0 || self.frequency_size == 0 || self.recent_winners_size == 0
        {
            return Err(AppError::ConfigError(
                "statistics sizes must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn get_env(name: &str) -> Option<String> {
    env::var(name).ok()
}

fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        let mut config: Config = match std::fs::read_to_string(&config_path) {
            // config file present: parse it, env vars still override below
            Ok(config_str) => Self::parse(&config_str)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let database_url = get_env("DATABASE_URL")
                    .ok_or("DATABASE_URL is not set and no config.toml was found")?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    jwt: JwtConfig {
                        secret: get_env("JWT_SECRET")
                            .unwrap_or_else(|| "change-me-in-production".to_string()),
                        access_token_expires_in: get_env_parse("JWT_ACCESS_EXPIRES_IN", 86_400i64),
                    },
                    admin: AdminConfig {
                        password_hash: get_env("ADMIN_PASSWORD_HASH").unwrap_or_default(),
                    },
                    lottery: LotteryConfig::default(),
                }
            }
            Err(e) => {
                return Err(format!("Unable to read config file {config_path}: {e}").into());
            }
        };

        config.apply_env_overrides();
        config.lottery.validate()?;

        Ok(config)
    }

    pub fn parse(config_str: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: Config =
            toml::from_str(config_str).map_err(|e| format!("Failed to parse config file: {e}"))?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            self.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            self.database.max_connections = mc;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.jwt.secret = v;
        }
        if let Ok(v) = env::var("JWT_ACCESS_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            self.jwt.access_token_expires_in = n;
        }
        if let Ok(v) = env::var("ADMIN_PASSWORD_HASH") {
            self.admin.password_hash = v;
        }

        // lottery
        if let Ok(v) = env::var("LOTTERY_POOL_SIZE")
            && let Ok(n) = v.parse()
        {
            self.lottery.pool_size = n;
        }
        if let Ok(v) = env::var("LOTTERY_LEADERBOARD_SIZE")
            && let Ok(n) = v.parse()
        {
            self.lottery.leaderboard_size = n;
        }
        if let Ok(v) = env::var("LOTTERY_FREQUENCY_SIZE")
            && let Ok(n) = v.parse()
        {
            self.lottery.frequency_size = n;
        }
        if let Ok(v) = env::var("LOTTERY_RECENT_WINNERS_SIZE")
            && let Ok(n) = v.parse()
        {
            self.lottery.recent_winners_size = n;
        }
    }
}
