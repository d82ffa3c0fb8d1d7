use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::info;

use crate::router::Router;

/// Cron-driven broadcast of the daily reminder.
///
/// The cron expression is read in local time, the same clock that decides
/// when the daily card rolls over.
pub struct ReminderScheduler {
    inner: JobScheduler,
    router: Arc<Router>,
    cron: String,
}

impl ReminderScheduler {
    pub async fn new(cron: &str, router: Arc<Router>) -> Result<Self> {
        let inner = JobScheduler::new()
            .await
            .context("Failed to create job scheduler")?;
        Ok(Self {
            inner,
            router,
            cron: cron.to_string(),
        })
    }

    /// Register the reminder job and start ticking.
    pub async fn start(&self) -> Result<()> {
        let job = reminder_job(&self.cron, self.router.clone())?;
        self.inner
            .add(job)
            .await
            .context("Failed to add daily reminder job")?;
        self.inner
            .start()
            .await
            .context("Failed to start scheduler")?;
        info!("Daily reminder scheduled with cron (local time): {}", self.cron);
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<()> {
        self.inner
            .shutdown()
            .await
            .context("Failed to shutdown scheduler")?;
        info!("Reminder scheduler stopped");
        Ok(())
    }
}

/// Build the job that sends the reminder to every known chat.
fn reminder_job(cron: &str, router: Arc<Router>) -> Result<Job> {
    Job::new_async_tz(cron, Local, move |_uuid, _lock| {
        let router = router.clone();
        Box::pin(async move {
            let chats = router.audience().len().await;
            info!("Sending daily reminder to {} chats", chats);
            router.broadcast_reminder().await;
        })
    })
    .with_context(|| format!("Invalid reminder cron expression: {}", cron))
}

/// Schedule the daily reminder broadcast and start the scheduler.
pub async fn start_daily_reminder(cron: &str, router: Arc<Router>) -> Result<ReminderScheduler> {
    let scheduler = ReminderScheduler::new(cron, router).await?;
    scheduler.start().await?;
    Ok(scheduler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use async_trait::async_trait;

    use crate::catalog::Catalog;
    use crate::config::MessagesConfig;
    use crate::platform::{Keyboard, MenuCommand, Messenger};

    struct SilentMessenger;

    #[async_trait]
    impl Messenger for SilentMessenger {
        async fn send_text(&self, _: i64, _: &str, _: Option<&Keyboard>) -> Result<()> {
            Ok(())
        }

        async fn send_photo(&self, _: i64, _: &Path, _: &str, _: Option<&Keyboard>) -> Result<()> {
            Ok(())
        }

        async fn answer_callback(&self, _: &str) -> Result<()> {
            Ok(())
        }

        async fn set_commands(&self, _: &[MenuCommand]) -> Result<()> {
            Ok(())
        }
    }

    fn router() -> Arc<Router> {
        Arc::new(Router::new(
            Arc::new(Catalog::from_entries("images", Vec::new())),
            MessagesConfig::default(),
            Arc::new(SilentMessenger),
        ))
    }

    #[tokio::test]
    async fn test_rejects_invalid_cron() {
        assert!(reminder_job("not a cron", router()).is_err());
    }

    #[tokio::test]
    async fn test_accepts_default_reminder_cron() {
        assert!(reminder_job("0 0 9 * * *", router()).is_ok());
    }

    #[tokio::test]
    async fn test_start_fails_on_invalid_cron() {
        let scheduler = ReminderScheduler::new("every morning", router()).await.unwrap();
        assert!(scheduler.start().await.is_err());
    }

    #[tokio::test]
    async fn test_start_and_shutdown() {
        let mut scheduler = start_daily_reminder("0 0 9 * * *", router()).await.unwrap();
        scheduler.shutdown().await.unwrap();
    }
}
