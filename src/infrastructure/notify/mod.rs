pub mod digest;
pub mod email;
pub mod log_notifier;

pub use email::EmailNotifier;
pub use log_notifier::LogNotifier;

use async_trait::async_trait;

use crate::shared::config::EmailSettings;
use crate::shared::errors::NotifyError;
use crate::shared::types::DealResult;

/// Consumer of the deals found in one cycle
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, deals: &[DealResult]) -> Result<(), NotifyError>;
}

/// Email when enabled in the config, the log otherwise
pub fn notifier_from_settings(settings: &EmailSettings) -> Box<dyn Notifier> {
    if settings.enabled {
        Box::new(EmailNotifier::new(settings.clone()))
    } else {
        Box::new(LogNotifier)
    }
}
