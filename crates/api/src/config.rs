use std::path::PathBuf;

use sborrowhub_core::lifecycle::DEFAULT_MAX_LOAN_DAYS;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long background tasks get to stop after the server stops
    /// accepting connections (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
    pub lending: LendingConfig,
    pub backup: BackupConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    ///
    /// See [`JwtConfig::from_env`], [`LendingConfig::from_env`] and
    /// [`BackupConfig::from_env`] for the nested sections.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt: JwtConfig::from_env(),
            lending: LendingConfig::from_env(),
            backup: BackupConfig::from_env(),
        }
    }
}

/// Lending rules.
#[derive(Debug, Clone)]
pub struct LendingConfig {
    /// Late fee per overdue day, in minor currency units (default: `500`).
    pub late_penalty_per_day: i64,
    /// Longest loan a borrower may request, in days (default: `30`).
    pub max_loan_days: i64,
    /// How often the overdue sweeper runs, in seconds (default: `3600`).
    pub overdue_sweep_interval_secs: u64,
}

/// Default late fee per day in minor units.
const DEFAULT_LATE_PENALTY_PER_DAY: i64 = 500;
/// Default overdue sweep interval in seconds.
const DEFAULT_OVERDUE_SWEEP_INTERVAL_SECS: u64 = 3600;

impl LendingConfig {
    /// | Env Var                      | Default |
    /// |------------------------------|---------|
    /// | `LATE_PENALTY_PER_DAY`       | `500`   |
    /// | `MAX_LOAN_DAYS`              | `30`    |
    /// | `OVERDUE_SWEEP_INTERVAL_SECS`| `3600`  |
    pub fn from_env() -> Self {
        let late_penalty_per_day: i64 = std::env::var("LATE_PENALTY_PER_DAY")
            .unwrap_or_else(|_| DEFAULT_LATE_PENALTY_PER_DAY.to_string())
            .parse()
            .expect("LATE_PENALTY_PER_DAY must be a valid i64");
        assert!(
            late_penalty_per_day >= 0,
            "LATE_PENALTY_PER_DAY must not be negative"
        );

        let max_loan_days: i64 = std::env::var("MAX_LOAN_DAYS")
            .unwrap_or_else(|_| DEFAULT_MAX_LOAN_DAYS.to_string())
            .parse()
            .expect("MAX_LOAN_DAYS must be a valid i64");
        assert!(max_loan_days > 0, "MAX_LOAN_DAYS must be positive");

        let overdue_sweep_interval_secs: u64 = std::env::var("OVERDUE_SWEEP_INTERVAL_SECS")
            .unwrap_or_else(|_| DEFAULT_OVERDUE_SWEEP_INTERVAL_SECS.to_string())
            .parse()
            .expect("OVERDUE_SWEEP_INTERVAL_SECS must be a valid u64");

        Self {
            late_penalty_per_day,
            max_loan_days,
            overdue_sweep_interval_secs,
        }
    }
}

impl Default for LendingConfig {
    fn default() -> Self {
        Self {
            late_penalty_per_day: DEFAULT_LATE_PENALTY_PER_DAY,
            max_loan_days: DEFAULT_MAX_LOAN_DAYS,
            overdue_sweep_interval_secs: DEFAULT_OVERDUE_SWEEP_INTERVAL_SECS,
        }
    }
}

/// Where backup files are written.
#[derive(Debug, Clone)]
pub struct BackupConfig {
    /// Directory holding `backup-*.json` files (default: `./backups`).
    pub dir: PathBuf,
}

impl BackupConfig {
    /// | Env Var      | Default     |
    /// |--------------|-------------|
    /// | `BACKUP_DIR` | `./backups` |
    pub fn from_env() -> Self {
        let dir = std::env::var("BACKUP_DIR").unwrap_or_else(|_| "./backups".into());
        Self {
            dir: PathBuf::from(dir),
        }
    }
}
