use async_trait::async_trait;
use tracing::info;

use super::digest::{digest_subject, digest_text};
use super::Notifier;
use crate::shared::errors::NotifyError;
use crate::shared::types::DealResult;

/// Writes the digest to the log; used when email is disabled
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, deals: &[DealResult]) -> Result<(), NotifyError> {
        info!("{}", digest_subject(deals));
        for line in digest_text(deals).lines() {
            info!("{}", line);
        }
        Ok(())
    }
}
