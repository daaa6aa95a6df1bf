use log::*;
use market_engine::{AuthApi, SqliteDatabase};
use tokio::task::JoinHandle;

/// Starts the pending-signup expiry worker. Do not await the returned JoinHandle, as it will run
/// indefinitely.
///
/// Expiry deadlines are stored on each pending signup, so a restart never loses a scheduled
/// cleanup; the sweep just deletes whatever is past its `expires_at` on each pass.
pub fn start_expiry_worker(auth_api: AuthApi<SqliteDatabase>, interval: std::time::Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        info!("🕰️ Pending signup expiry worker started");
        loop {
            timer.tick().await;
            debug!("🕰️ Running pending signup expiry job");
            match auth_api.purge_expired().await {
                Ok(0) => {},
                Ok(n) => info!("🕰️ {n} expired pending signups removed"),
                Err(e) => error!("🕰️ Error running pending signup expiry job: {e}"),
            }
        }
    })
}
