use log::*;
use market_common::Secret;

const DEFAULT_BASE_URL: &str = "https://api.razorpay.com";

#[derive(Debug, Clone)]
pub struct RazorpayConfig {
    pub key_id: String,
    pub key_secret: Secret<String>,
    pub base_url: String,
}

impl Default for RazorpayConfig {
    fn default() -> Self {
        Self { key_id: String::new(), key_secret: Secret::default(), base_url: DEFAULT_BASE_URL.to_string() }
    }
}

impl RazorpayConfig {
    pub fn new_from_env_or_default() -> Self {
        let key_id = std::env::var("MARKET_RAZORPAY_KEY_ID").unwrap_or_else(|_| {
            warn!("MARKET_RAZORPAY_KEY_ID not set, using (probably useless) default");
            "rzp_test_0000000000".to_string()
        });
        let key_secret = Secret::new(std::env::var("MARKET_RAZORPAY_KEY_SECRET").unwrap_or_else(|_| {
            warn!("MARKET_RAZORPAY_KEY_SECRET not set, using (probably useless) default");
            "00000000000000".to_string()
        }));
        let base_url = std::env::var("MARKET_RAZORPAY_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self { key_id, key_secret, base_url }
    }
}
