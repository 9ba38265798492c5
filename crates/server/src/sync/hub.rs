use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::Value as JsonValue;
use tokio::sync::broadcast;

use super::Publisher;

/// In-process pub/sub: one broadcast channel per topic, created on first
/// subscribe and dropped once its last receiver is gone.
#[derive(Debug)]
pub struct BroadcastHub {
    capacity: usize,
    topics: Mutex<HashMap<String, broadcast::Sender<JsonValue>>>,
}

impl BroadcastHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            topics: Mutex::new(HashMap::new()),
        }
    }

    fn topics(&self) -> MutexGuard<'_, HashMap<String, broadcast::Sender<JsonValue>>> {
        self.topics.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn subscribe(&self, topic: &str) -> broadcast::Receiver<JsonValue> {
        let mut topics = self.topics();
        match topics.get(topic) {
            Some(sender) => sender.subscribe(),
            None => {
                let (sender, receiver) = broadcast::channel(self.capacity);
                topics.insert(topic.to_string(), sender);
                receiver
            }
        }
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics()
            .get(topic)
            .map_or(0, broadcast::Sender::receiver_count)
    }
}

impl Publisher for BroadcastHub {
    fn publish(&self, topic: &str, message: JsonValue) {
        let mut topics = self.topics();
        let Some(sender) = topics.get(topic) else {
            tracing::trace!(topic, "no subscribers");
            return;
        };
        if sender.send(message).is_err() {
            topics.remove(topic);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn subscribers_receive_events_for_their_topic_only() {
        let hub = BroadcastHub::new(8);
        let mut game = hub.subscribe("game_1_channel");
        let mut other = hub.subscribe("game_2_channel");

        hub.publish("game_1_channel", json!({ "newGame": true }));

        assert_eq!(game.recv().await.unwrap(), json!({ "newGame": true }));
        assert!(other.try_recv().is_err());
    }

    #[tokio::test]
    async fn every_subscriber_gets_a_copy() {
        let hub = BroadcastHub::new(8);
        let mut first = hub.subscribe("t");
        let mut second = hub.subscribe("t");
        assert_eq!(hub.subscriber_count("t"), 2);

        hub.publish("t", json!(1));
        assert_eq!(first.recv().await.unwrap(), json!(1));
        assert_eq!(second.recv().await.unwrap(), json!(1));
    }

    #[test]
    fn publishing_without_listeners_is_a_no_op() {
        let hub = BroadcastHub::new(8);
        hub.publish("nobody", json!({}));

        let receiver = hub.subscribe("gone");
        drop(receiver);
        hub.publish("gone", json!({}));
        assert_eq!(hub.subscriber_count("gone"), 0);
        assert!(hub.topics().is_empty());
    }
}
