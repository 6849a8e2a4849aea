//! Background scheduled tasks for the application.
//!
//! Currently only the notification cleanup job. Call `spawn_all` once during startup.

use crate::config::NotificationConfig;
use crate::services::NotificationService;

/// Spawn all background tasks. Detaches via `tokio::spawn`; does not block.
pub fn spawn_all(notification_service: NotificationService, config: NotificationConfig) {
    // 定期清理过期的已读通知
    {
        let svc = notification_service.clone();
        let interval = std::time::Duration::from_secs(config.cleanup_interval_secs.max(1));
        tokio::spawn(async move {
            loop {
                match svc.cleanup_old_notifications(config.retention_days).await {
                    Ok(n) if n > 0 => log::info!("Old read notifications removed: {n}"),
                    Ok(_) => {}
                    Err(e) => log::error!("Failed to clean up notifications: {e:?}"),
                }
                tokio::time::sleep(interval).await;
            }
        });
    }
}
