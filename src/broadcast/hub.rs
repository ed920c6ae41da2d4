//! In-process channel fan-out.
//!
//! Best-effort delivery. No guarantee of delivery or ordering once a
//! payload leaves the hub.

use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value;
use tokio::sync::mpsc;

use super::errors::BroadcastResult;
use super::Transport;

/// Payload sender for a subscriber
pub type PayloadSender = mpsc::UnboundedSender<Value>;

/// Payload receiver for a subscriber
pub type PayloadReceiver = mpsc::UnboundedReceiver<Value>;

/// Fans published payloads out to channel subscribers.
///
/// Subscribers whose receiver has been dropped are pruned on the next
/// publish to their channel.
#[derive(Debug, Default)]
pub struct ChannelHub {
    /// Live senders by channel name
    channels: RwLock<HashMap<String, Vec<PayloadSender>>>,
}

impl ChannelHub {
    /// Create an empty hub
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to a channel, receiving every payload published after
    /// this call
    pub fn subscribe(&self, channel: &str) -> PayloadReceiver {
        let (tx, rx) = mpsc::unbounded_channel();

        if let Ok(mut channels) = self.channels.write() {
            channels.entry(channel.to_string()).or_default().push(tx);
        }

        rx
    }

    /// Number of live subscribers on a channel
    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.channels
            .read()
            .ok()
            .and_then(|c| c.get(channel).map(|senders| senders.len()))
            .unwrap_or(0)
    }

    /// Drop all subscribers on a channel
    pub fn close_channel(&self, channel: &str) {
        if let Ok(mut channels) = self.channels.write() {
            channels.remove(channel);
        }
    }
}

impl Transport for ChannelHub {
    /// Publish to every subscriber on the channel (non-blocking).
    ///
    /// A channel with no subscribers accepts the publish and discards it.
    fn publish(&self, channel: &str, payload: &Value) -> BroadcastResult<()> {
        let mut channels = match self.channels.write() {
            Ok(c) => c,
            Err(_) => return Ok(()),
        };

        if let Some(senders) = channels.get_mut(channel) {
            senders.retain(|sender| sender.send(payload.clone()).is_ok());
            if senders.is_empty() {
                channels.remove(channel);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_publish_reaches_subscriber() {
        let hub = ChannelHub::new();
        let mut rx = hub.subscribe("match:abc");

        hub.publish("match:abc", &json!({"seq": 1}))
            .expect("publish should succeed");

        let received = rx.try_recv().expect("payload should be queued");
        assert_eq!(received, json!({"seq": 1}));
    }

    #[test]
    fn test_publish_without_subscribers_is_ok() {
        let hub = ChannelHub::new();
        assert!(hub.publish("match:nobody", &json!({})).is_ok());
    }

    #[test]
    fn test_channels_are_isolated() {
        let hub = ChannelHub::new();
        let mut first = hub.subscribe("match:a");
        let mut second = hub.subscribe("match:b");

        hub.publish("match:a", &json!({"for": "a"}))
            .expect("publish should succeed");

        assert_eq!(first.try_recv().expect("queued"), json!({"for": "a"}));
        assert!(second.try_recv().is_err(), "other channel must stay quiet");
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let hub = ChannelHub::new();
        let rx = hub.subscribe("match:abc");
        let mut kept = hub.subscribe("match:abc");
        assert_eq!(hub.subscriber_count("match:abc"), 2);

        drop(rx);
        hub.publish("match:abc", &json!({"seq": 1}))
            .expect("publish should succeed");

        assert_eq!(hub.subscriber_count("match:abc"), 1);
        assert_eq!(kept.try_recv().expect("queued"), json!({"seq": 1}));
    }

    #[test]
    fn test_close_channel_drops_subscribers() {
        let hub = ChannelHub::new();
        let mut rx = hub.subscribe("match:abc");
        hub.close_channel("match:abc");

        assert_eq!(hub.subscriber_count("match:abc"), 0);
        hub.publish("match:abc", &json!({"seq": 1}))
            .expect("publish should succeed");
        assert!(rx.try_recv().is_err(), "closed channel must not deliver");
    }
}
