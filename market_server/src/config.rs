use std::env;

use chrono::Duration;
use log::*;
use market_common::Secret;
use razorpay_tools::RazorpayConfig;

const DEFAULT_MARKET_HOST: &str = "127.0.0.1";
const DEFAULT_MARKET_PORT: u16 = 8360;
const DEFAULT_SIGNUP_TTL: Duration = Duration::hours(24);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Redis connection URL for the cache. When unset, an in-process memory cache is used.
    pub cache_url: Option<String>,
    /// Signs access tokens. Payment callbacks are verified with `razorpay.key_secret`.
    pub api_secret: Secret<String>,
    /// How long an unverified signup survives before the sweep removes it.
    pub signup_ttl: Duration,
    pub razorpay: RazorpayConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_MARKET_HOST.to_string(),
            port: DEFAULT_MARKET_PORT,
            database_url: String::default(),
            cache_url: None,
            api_secret: Secret::default(),
            signup_ttl: DEFAULT_SIGNUP_TTL,
            razorpay: RazorpayConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("MARKET_HOST").ok().unwrap_or_else(|| DEFAULT_MARKET_HOST.into());
        let port = env::var("MARKET_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for MARKET_PORT. {e} Using the default, {DEFAULT_MARKET_PORT}, \
                         instead."
                    );
                    DEFAULT_MARKET_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_MARKET_PORT);
        let database_url = env::var("MARKET_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ MARKET_DATABASE_URL is not set. Please set it to the URL for the market database.");
            String::default()
        });
        let cache_url = env::var("MARKET_CACHE_URL").ok();
        if cache_url.is_none() {
            info!("🪛️ MARKET_CACHE_URL is not set. Using the in-process memory cache.");
        }
        let api_secret = Secret::new(env::var("MARKET_API_SECRET").unwrap_or_else(|_| {
            warn!(
                "🚨️ MARKET_API_SECRET is not set. I'm using a random value for this session. Access tokens will \
                 not survive a restart. Do not run production like this."
            );
            format!("{:032x}", rand::random::<u128>())
        }));
        let signup_ttl = env::var("MARKET_SIGNUP_TTL_HOURS")
            .map_err(|_| {
                info!(
                    "🪛️ MARKET_SIGNUP_TTL_HOURS is not set. Using the default value of {} hrs.",
                    DEFAULT_SIGNUP_TTL.num_hours()
                )
            })
            .and_then(|s| {
                s.parse::<i64>()
                    .map(Duration::hours)
                    .map_err(|e| warn!("🪛️ Invalid configuration value for MARKET_SIGNUP_TTL_HOURS. {e}"))
            })
            .ok()
            .unwrap_or(DEFAULT_SIGNUP_TTL);
        let razorpay = RazorpayConfig::new_from_env_or_default();
        Self { host, port, database_url, cache_url, api_secret, signup_ttl, razorpay }
    }
}
