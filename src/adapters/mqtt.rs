//! MQTT transport adapter.
//!
//! Wraps the synchronous `rumqttc` client:
//!
//! - [`MqttPublisher`] implements [`Publisher`] with `try_publish`, so a
//!   publish issued from inside the receive loop never blocks on the
//!   request queue the same loop is supposed to drain.
//! - [`MqttTransport`] owns the connection, (re)subscribes every active
//!   rule's source topic on each ConnAck and feeds incoming publishes to
//!   the [`Dispatcher`] in arrival order.
//!
//! The first connection must succeed; after that, errors are logged and
//! `rumqttc` reconnects on the next poll.

use std::time::Duration;

use log::{error, info, warn};
use rumqttc::{Client, Connection, ConnectReturnCode, Event, MqttOptions, Packet, QoS};

use crate::app::ports::{Clock, EventSink, Publisher};
use crate::app::service::Dispatcher;
use crate::config::BrokerConfig;
use crate::error::{PublishError, TransportError};
use crate::rules::RuleTable;

/// Pause between polls after a connection error.
const RECONNECT_BACKOFF: Duration = Duration::from_secs(1);

/// Map a configured QoS level onto the wire enum.
pub fn qos_from_level(level: u8) -> Result<QoS, PublishError> {
    match level {
        0 => Ok(QoS::AtMostOnce),
        1 => Ok(QoS::AtLeastOnce),
        2 => Ok(QoS::ExactlyOnce),
        other => Err(PublishError::InvalidQos(other)),
    }
}

/// Client options from broker configuration.
pub fn mqtt_options(broker: &BrokerConfig) -> MqttOptions {
    let mut opts = MqttOptions::new(broker.client_id.clone(), broker.host.clone(), broker.port);
    opts.set_keep_alive(Duration::from_secs(broker.keepalive_secs));
    if !broker.username.is_empty() {
        opts.set_credentials(broker.username.clone(), broker.password.clone());
    }
    opts
}

// ───────────────────────────────────────────────────────────────
// Publisher
// ───────────────────────────────────────────────────────────────

/// `rumqttc` reports a full request queue and a closed one with the same
/// `ClientError::TryRequest`, so the publisher tracks the link itself: a
/// rejected publish while the broker session is down is `Disconnected`,
/// while it is up `QueueFull`.
pub struct MqttPublisher {
    client: Client,
    nul_terminate: bool,
    connected: bool,
}

impl MqttPublisher {
    /// Starts out disconnected until the first ConnAck.
    pub fn new(client: Client, nul_terminate: bool) -> Self {
        Self {
            client,
            nul_terminate,
            connected: false,
        }
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }
}

impl Publisher for MqttPublisher {
    fn publish(&mut self, topic: &str, payload: &[u8], qos: u8) -> Result<(), PublishError> {
        let qos = qos_from_level(qos)?;
        let mut body = Vec::with_capacity(payload.len() + 1);
        body.extend_from_slice(payload);
        if self.nul_terminate {
            body.push(0);
        }
        self.client
            .try_publish(topic, qos, false, body)
            .map_err(|_| {
                if self.connected {
                    PublishError::QueueFull
                } else {
                    PublishError::Disconnected
                }
            })
    }
}

// ───────────────────────────────────────────────────────────────
// Transport
// ───────────────────────────────────────────────────────────────

pub struct MqttTransport {
    publisher: MqttPublisher,
    connection: Connection,
    subscriptions: Vec<(String, QoS)>,
}

impl MqttTransport {
    /// Prepare a session for `rules`.  No network traffic happens until
    /// [`run`](Self::run).
    pub fn new(broker: &BrokerConfig, rules: &RuleTable) -> Result<Self, TransportError> {
        let subscriptions = rules
            .iter()
            .map(|r| {
                qos_from_level(r.qos)
                    .map(|q| (r.source_topic.clone(), q))
                    .map_err(|_| TransportError::SubscribeFailed(r.source_topic.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        // Room for a full resubscribe plus a burst of publishes.
        let capacity = (subscriptions.len() * 2).max(64);
        let (client, connection) = Client::new(mqtt_options(broker), capacity);
        info!(
            "MQTT session prepared for {}:{} ({} subscription(s))",
            broker.host,
            broker.port,
            subscriptions.len()
        );

        Ok(Self {
            publisher: MqttPublisher::new(client, broker.nul_terminate_payloads),
            connection,
            subscriptions,
        })
    }

    /// Drive the session until the connection is closed.
    ///
    /// Returns an error only when the first connection or its subscriptions
    /// fail.
    pub fn run<C: Clock>(
        self,
        dispatcher: &mut Dispatcher<C>,
        sink: &mut impl EventSink,
    ) -> Result<(), TransportError> {
        let Self {
            mut publisher,
            mut connection,
            subscriptions,
        } = self;
        let mut connected_once = false;

        for notification in connection.iter() {
            match notification {
                Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                    if ack.code != ConnectReturnCode::Success {
                        publisher.set_connected(false);
                        let msg = format!("broker refused connection: {:?}", ack.code);
                        if !connected_once {
                            return Err(TransportError::ConnectFailed(msg));
                        }
                        warn!("{}", msg);
                        continue;
                    }
                    info!("Connected to MQTT broker");
                    publisher.set_connected(true);
                    for (topic, qos) in &subscriptions {
                        if publisher.client.try_subscribe(topic.as_str(), *qos).is_err() {
                            if !connected_once {
                                return Err(TransportError::SubscribeFailed(topic.clone()));
                            }
                            warn!("Unable to resubscribe to {}", topic);
                        }
                    }
                    connected_once = true;
                }
                Ok(Event::Incoming(Packet::Publish(msg))) => {
                    dispatcher.on_message(&msg.topic, &msg.payload, &mut publisher, sink);
                }
                Ok(_) => {}
                Err(e) => {
                    publisher.set_connected(false);
                    if !connected_once {
                        return Err(TransportError::ConnectFailed(e.to_string()));
                    }
                    error!("MQTT connection error: {} (retrying)", e);
                    std::thread::sleep(RECONNECT_BACKOFF);
                }
            }
        }

        info!("MQTT connection closed");
        Ok(())
    }
}
