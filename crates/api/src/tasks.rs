//! Best-effort post-commit side effects.
//!
//! A task dispatched here runs after the primary write has been committed.
//! Its failure is logged and never reaches the client.

use std::fmt::Display;
use std::future::Future;

use async_trait::async_trait;
use staywatch_db::models::guest::Guest;
use staywatch_db::models::user::User;

/// Spawn `task` on its own tokio task, logging (not propagating) failure.
pub fn spawn_best_effort<F, E>(name: &'static str, task: F) -> tokio::task::JoinHandle<()>
where
    F: Future<Output = Result<(), E>> + Send + 'static,
    E: Display + Send + 'static,
{
    tokio::spawn(async move {
        match task.await {
            Ok(()) => tracing::debug!(task = name, "Best-effort task completed"),
            Err(e) => tracing::warn!(task = name, error = %e, "Best-effort task failed"),
        }
    })
}

/// Outbound mail could not be handed off.
#[derive(Debug, thiserror::Error)]
#[error("mail delivery failed: {0}")]
pub struct MailError(pub String);

/// Outbound mail. Delivery is always best-effort.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send a freshly provisioned account its temporary credentials.
    async fn send_credentials(
        &self,
        email: &str,
        username: &str,
        temporary_password: &str,
    ) -> Result<(), MailError>;

    /// Send a guest the receipt for a completed stay.
    async fn send_checkout_receipt(&self, guest: &Guest, hotel: &User) -> Result<(), MailError>;
}

/// Mailer that records each message in the trace log instead of sending it.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_credentials(
        &self,
        email: &str,
        username: &str,
        _temporary_password: &str,
    ) -> Result<(), MailError> {
        tracing::info!(%email, %username, "Credentials mail queued");
        Ok(())
    }

    async fn send_checkout_receipt(&self, guest: &Guest, hotel: &User) -> Result<(), MailError> {
        let Some(email) = guest.email.as_deref() else {
            tracing::debug!(guest_id = guest.id, "Guest has no email, skipping receipt");
            return Ok(());
        };
        tracing::info!(
            guest_id = guest.id,
            customer_id = %guest.customer_id,
            %email,
            hotel = hotel.hotel_name.as_deref().unwrap_or(&hotel.username),
            "Checkout receipt queued",
        );
        Ok(())
    }
}
