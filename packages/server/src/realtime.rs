//! Per-user notification fanout over Server-Sent Events.
//!
//! Each user id has at most one broadcast channel, created when the first
//! client subscribes and dropped when its last stream ends or a publish finds
//! nobody listening.
//! Publishing never blocks and never fails the caller: a notification for a
//! user without subscribers is simply not delivered.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use actix_web::web::Bytes;
use actix_web::{HttpResponse, web};
use road_assets_server_models::ApiNotificationEvent;
use tokio::sync::broadcast::{self, error::RecvError};

/// Events buffered per user before slow subscribers start lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Interval between keepalive comments on an idle stream.
pub const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// In-process registry of per-user broadcast channels.
pub struct NotificationHub {
    channels: Mutex<BTreeMap<i32, broadcast::Sender<ApiNotificationEvent>>>,
    capacity: usize,
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl NotificationHub {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: Mutex::new(BTreeMap::new()),
            capacity: capacity.max(1),
        }
    }

    fn channels(&self) -> MutexGuard<'_, BTreeMap<i32, broadcast::Sender<ApiNotificationEvent>>> {
        self.channels.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Joins `user_id`'s group.
    pub fn subscribe(&self, user_id: i32) -> broadcast::Receiver<ApiNotificationEvent> {
        self.channels()
            .entry(user_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Sends `event` to every current subscriber of `user_id`, returning how
    /// many received it.
    pub fn publish(&self, user_id: i32, event: ApiNotificationEvent) -> usize {
        let mut channels = self.channels();
        let Some(sender) = channels.get(&user_id) else {
            log::debug!("No subscribers for user {user_id}, dropping notification");
            return 0;
        };

        if let Ok(delivered) = sender.send(event) {
            log::debug!("Delivered notification to {delivered} subscriber(s) of user {user_id}");
            delivered
        } else {
            channels.remove(&user_id);
            log::debug!("Last subscriber of user {user_id} left, closing group");
            0
        }
    }

    /// Drops `user_id`'s group if it has no receivers left.
    pub fn release(&self, user_id: i32) {
        let mut channels = self.channels();
        if channels
            .get(&user_id)
            .is_some_and(|sender| sender.receiver_count() == 0)
        {
            channels.remove(&user_id);
            log::debug!("Closed notification group of user {user_id}");
        }
    }

    /// Number of users with an open group.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.channels().len()
    }
}

/// One stream's membership in a user group. Dropping it leaves the group
/// and closes the group if it is now empty.
struct Subscription {
    hub: web::Data<NotificationHub>,
    user_id: i32,
    receiver: Option<broadcast::Receiver<ApiNotificationEvent>>,
}

impl Subscription {
    fn new(hub: web::Data<NotificationHub>, user_id: i32) -> Self {
        let receiver = Some(hub.subscribe(user_id));
        Self {
            hub,
            user_id,
            receiver,
        }
    }

    async fn recv(&mut self) -> Result<ApiNotificationEvent, RecvError> {
        match self.receiver.as_mut() {
            Some(receiver) => receiver.recv().await,
            None => Err(RecvError::Closed),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        drop(self.receiver.take());
        self.hub.release(self.user_id);
        log::info!("User {} unsubscribed from notifications", self.user_id);
    }
}

/// Formats one SSE frame.
fn sse_frame(event: &str, data: &str) -> Bytes {
    Bytes::from(format!("event: {event}\ndata: {data}\n\n"))
}

/// `GET /api/notifications/stream/{user_id}`
///
/// Streams `notification` events for one user until the client disconnects.
pub async fn notification_stream(
    hub: web::Data<NotificationHub>,
    path: web::Path<i32>,
) -> HttpResponse {
    let user_id = path.into_inner();
    let mut subscription = Subscription::new(hub, user_id);
    log::info!("User {user_id} subscribed to notifications");

    let stream = async_stream::stream! {
        yield Ok::<_, actix_web::Error>(Bytes::from_static(b"retry: 3000\n\n"));

        let mut keepalive = tokio::time::interval(KEEPALIVE_INTERVAL);
        keepalive.tick().await;

        loop {
            let frame = tokio::select! {
                received = subscription.recv() => match received {
                    Ok(event) => match serde_json::to_string(&event) {
                        Ok(payload) => Some(sse_frame("notification", &payload)),
                        Err(e) => {
                            log::error!("Failed to serialize notification {}: {e}", event.id);
                            None
                        }
                    },
                    Err(RecvError::Lagged(skipped)) => {
                        log::warn!("Notification stream for user {user_id} skipped {skipped} event(s)");
                        None
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = keepalive.tick() => Some(Bytes::from_static(b": keepalive\n\n")),
            };

            if let Some(frame) = frame {
                yield Ok(frame);
            }
        }
    };

    HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .streaming(stream)
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use super::*;

    fn event(id: i32, user_id: i32) -> ApiNotificationEvent {
        ApiNotificationEvent {
            id,
            user_id,
            title: "Incident assigned".to_string(),
            message: None,
            link: None,
            created_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        }
    }

    #[test]
    fn publish_without_subscribers_is_dropped() {
        let hub = NotificationHub::default();
        assert_eq!(hub.publish(1, event(1, 1)), 0);
        assert_eq!(hub.group_count(), 0);
    }

    #[tokio::test]
    async fn subscribers_receive_only_their_own_events() {
        let hub = NotificationHub::default();
        let mut alice = hub.subscribe(1);
        let mut bob = hub.subscribe(2);

        assert_eq!(hub.publish(1, event(10, 1)), 1);

        assert_eq!(alice.recv().await.unwrap().id, 10);
        assert!(matches!(
            bob.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[test]
    fn group_closes_after_last_subscriber_leaves() {
        let hub = NotificationHub::default();
        drop(hub.subscribe(3));
        assert_eq!(hub.group_count(), 1);

        assert_eq!(hub.publish(3, event(1, 3)), 0);
        assert_eq!(hub.group_count(), 0);
    }

    #[test]
    fn frames_are_sse_formatted() {
        assert_eq!(
            sse_frame("notification", "{\"id\":1}"),
            Bytes::from_static(b"event: notification\ndata: {\"id\":1}\n\n")
        );
    }

    #[test]
    fn ended_stream_closes_its_group() {
        let hub = web::Data::new(NotificationHub::default());

        let subscription = Subscription::new(hub.clone(), 4);
        assert_eq!(hub.group_count(), 1);

        drop(subscription);
        assert_eq!(hub.group_count(), 0);
    }

    #[test]
    fn group_stays_open_while_another_stream_listens() {
        let hub = web::Data::new(NotificationHub::default());
        let first = Subscription::new(hub.clone(), 5);
        let second = Subscription::new(hub.clone(), 5);

        drop(first);
        assert_eq!(hub.group_count(), 1);
        assert_eq!(hub.publish(5, event(2, 5)), 1);

        drop(second);
        assert_eq!(hub.group_count(), 0);
    }

    #[test]
    fn release_keeps_groups_with_receivers() {
        let hub = NotificationHub::default();
        let _rx = hub.subscribe(6);
        hub.release(6);
        assert_eq!(hub.group_count(), 1);
        hub.release(7);
        assert_eq!(hub.group_count(), 1);
    }
}
