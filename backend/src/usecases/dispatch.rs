use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use staydesk::{
    domain::{
        entities::notifications::InsertNotificationEntity,
        repositories::notifications::NotificationRepository,
        value_objects::enums::notification_types::NotificationType,
    },
    notifications::{EmailMessage, EmailSender},
};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

const SIDE_EFFECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fire-and-forget side effects. Each one runs on its own task, so a slow
/// e-mail provider or notification store never holds up the request that
/// triggered it. Failures are logged and never returned.
pub struct Dispatcher {
    notifications: Arc<dyn NotificationRepository + Send + Sync>,
    email: Option<Arc<dyn EmailSender + Send + Sync>>,
    in_flight: Mutex<Vec<JoinHandle<()>>>,
}

impl Dispatcher {
    pub fn new(
        notifications: Arc<dyn NotificationRepository + Send + Sync>,
        email: Option<Arc<dyn EmailSender + Send + Sync>>,
    ) -> Self {
        Self {
            notifications,
            email,
            in_flight: Mutex::new(Vec::new()),
        }
    }

    pub fn notify(
        &self,
        type_: NotificationType,
        title: String,
        message: String,
        reference_id: Option<Uuid>,
    ) {
        let notifications = Arc::clone(&self.notifications);
        let notification = InsertNotificationEntity {
            type_: type_.to_string(),
            title,
            message,
            reference_id,
        };

        self.track(tokio::spawn(async move {
            match tokio::time::timeout(SIDE_EFFECT_TIMEOUT, notifications.notify(notification)).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => warn!(
                    notification_type = %type_,
                    reference_id = ?reference_id,
                    error = ?err,
                    "dispatch: notification not stored"
                ),
                Err(_) => warn!(
                    notification_type = %type_,
                    reference_id = ?reference_id,
                    "dispatch: notification store timed out"
                ),
            }
        }));
    }

    pub fn send_email(&self, message: EmailMessage) {
        let Some(email) = self.email.as_ref().map(Arc::clone) else {
            info!(subject = %message.subject, "dispatch: e-mail disabled, skipping");
            return;
        };

        self.track(tokio::spawn(async move {
            let subject = message.subject.clone();
            match tokio::time::timeout(SIDE_EFFECT_TIMEOUT, email.send(message)).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => warn!(subject = %subject, error = ?err, "dispatch: e-mail not sent"),
                Err(_) => warn!(subject = %subject, "dispatch: e-mail provider timed out"),
            }
        }));
    }

    /// Waits for every side effect started so far. Called on shutdown.
    pub async fn drain(&self) {
        let handles = std::mem::take(&mut *self.in_flight());
        for handle in handles {
            if let Err(err) = handle.await {
                warn!(error = ?err, "dispatch: side effect task failed");
            }
        }
    }

    fn track(&self, handle: JoinHandle<()>) {
        let mut in_flight = self.in_flight();
        in_flight.retain(|task| !task.is_finished());
        in_flight.push(handle);
    }

    fn in_flight(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
