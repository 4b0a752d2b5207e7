use anyhow::{bail, Context, Result};
use std::{env, str::FromStr};

pub struct AppConfig {
    pub store: StoreConfig,
    pub booking: BookingConfig,
}

impl AppConfig {
    pub fn new() -> Result<Self> {
        let store = match env_or("STORE_BACKEND", "postgres".to_string())?.as_str() {
            "postgres" => StoreConfig::Postgres(DatabaseConfig::from_env()?),
            "memory" => StoreConfig::Memory,
            other => bail!("unknown STORE_BACKEND: {other}"),
        };
        let booking = BookingConfig::from_env()?;
        Ok(Self { store, booking })
    }
}

// 予約データの保存先
pub enum StoreConfig {
    Postgres(DatabaseConfig),
    Memory,
}

pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
}

impl DatabaseConfig {
    fn from_env() -> Result<Self> {
        Ok(Self {
            host: env::var("DATABASE_HOST").context("DATABASE_HOST must be set")?,
            port: env::var("DATABASE_PORT")
                .context("DATABASE_PORT must be set")?
                .parse()?,
            username: env::var("DATABASE_USERNAME").context("DATABASE_USERNAME must be set")?,
            password: env::var("DATABASE_PASSWORD").context("DATABASE_PASSWORD must be set")?,
            database: env::var("DATABASE_NAME").context("DATABASE_NAME must be set")?,
        })
    }
}

/// Booking policy shared by admission and the availability bands.
#[derive(Debug, Clone)]
pub struct BookingConfig {
    /// Upper bound on players in a single reservation.
    pub max_players_per_booking: i32,
    /// Slot capacity given to turfs created without an explicit one.
    pub default_capacity: i32,
    /// Occupancy, in percent of capacity, at which a slot turns "filling".
    pub filling_percent: u32,
    /// Occupancy, in percent of capacity, at which a slot turns "closed".
    pub closing_percent: u32,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            max_players_per_booking: 30,
            default_capacity: 22,
            filling_percent: 50,
            closing_percent: 86,
        }
    }
}

impl BookingConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            max_players_per_booking: env_or(
                "BOOKING_MAX_PLAYERS_PER_BOOKING",
                defaults.max_players_per_booking,
            )?,
            default_capacity: env_or("BOOKING_DEFAULT_CAPACITY", defaults.default_capacity)?,
            filling_percent: env_or("BOOKING_FILLING_PERCENT", defaults.filling_percent)?,
            closing_percent: env_or("BOOKING_CLOSING_PERCENT", defaults.closing_percent)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_players_per_booking < 1 {
            bail!("BOOKING_MAX_PLAYERS_PER_BOOKING must be positive");
        }
        if self.default_capacity < 1 {
            bail!("BOOKING_DEFAULT_CAPACITY must be positive");
        }
        if self.filling_percent > self.closing_percent || self.closing_percent > 100 {
            bail!("band thresholds must satisfy filling <= closing <= 100");
        }
        Ok(())
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(v) => v
            .parse()
            .with_context(|| format!("{key} has an invalid value: {v}")),
        Err(_) => Ok(default),
    }
}
