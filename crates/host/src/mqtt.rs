//! MQTT control plane
//!
//! Subscribes to `<prefix>/<node>/#` and applies the JSON commands posted to
//! `set`, `text` and `display`. The ready state goes out on `ready`, and the
//! marquee announces itself to Home Assistant as an RGB light on connect.

use std::time::Duration;

use marquee_protocol::{DisplayCommand, LightCommand, ReadyState, TextCommand};
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::MqttConfig;
use crate::marquee::{Marquee, SharedMarquee};
use crate::user_config::UserConfig;

const DEFAULT_PORT: u16 = 1883;

/// Broker connection, taken from the user parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MqttSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub node: String,
    /// Client id, also the Home Assistant `unique_id`
    pub client_id: String,
}

impl MqttSettings {
    /// `None` when no broker host is set
    pub fn from_user_config(config: &UserConfig) -> Option<Self> {
        let host = config.string_value("mqtt_host")?.trim();
        if host.is_empty() {
            return None;
        }

        let value = |name: &str| config.string_value(name).unwrap_or_default().to_string();
        let node = value("mqtt_node");
        let hostname = value("hostname");
        let port = config
            .int_value("mqtt_port")
            .and_then(|p| u16::try_from(p).ok())
            .filter(|&p| p != 0)
            .unwrap_or(DEFAULT_PORT);

        let base = if node.is_empty() { "led-marquee" } else { node.as_str() };
        let client_id = if hostname.is_empty() {
            base.to_string()
        } else {
            format!("{base}-{hostname}")
        };

        Some(Self {
            host: host.to_string(),
            port,
            user: value("mqtt_user"),
            pass: value("mqtt_pass"),
            node,
            client_id,
        })
    }
}

/// Topic names for one node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topics {
    pub node: String,
    pub set: String,
    pub text: String,
    pub display: String,
    pub ota: String,
    pub ready: String,
    pub subscription: String,
    /// Retained discovery config; `None` without a node name
    pub discovery: Option<String>,
}

impl Topics {
    pub fn new(config: &MqttConfig, node: &str) -> Self {
        let base = format!("{}/{node}", config.prefix);
        Self {
            set: format!("{base}/set"),
            text: format!("{base}/text"),
            display: format!("{base}/display"),
            ota: format!("{base}/ota"),
            ready: format!("{base}/ready"),
            subscription: format!("{base}/#"),
            discovery: (!node.is_empty()).then(|| format!("{}/light/{node}/config", config.discovery_prefix)),
            node: base,
        }
    }
}

/// Home Assistant JSON-schema light config
pub fn discovery_payload(topics: &Topics, settings: &MqttSettings) -> Value {
    json!({
        "name": settings.node,
        "unique_id": settings.client_id,
        "schema": "json",
        "command_topic": topics.set,
        "brightness": true,
        "color_mode": true,
        "supported_color_modes": ["rgb"],
        "device": {
            "identifiers": [settings.client_id],
            "name": settings.node,
        },
    })
}

/// A command received on one of the node topics
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MqttCommand {
    Light(LightCommand),
    Text(TextCommand),
    Display(DisplayCommand),
}

impl MqttCommand {
    pub fn apply(&self, marquee: &mut Marquee) {
        match self {
            Self::Light(cmd) => marquee.apply_light(cmd),
            Self::Text(cmd) => marquee.apply_text(cmd),
            Self::Display(cmd) => marquee.apply_display(cmd),
        }
    }
}

fn parse<T: DeserializeOwned>(topic: &str, payload: &[u8]) -> Option<T> {
    serde_json::from_slice(payload)
        .map_err(|e| warn!(topic, "bad MQTT payload: {e}"))
        .ok()
}

/// Map a message to a command. Our own `ready` messages, OTA requests,
/// unknown topics and bad JSON give `None`.
pub fn route(topics: &Topics, topic: &str, payload: &[u8]) -> Option<MqttCommand> {
    if topic == topics.set {
        parse(topic, payload).map(MqttCommand::Light)
    } else if topic == topics.text {
        parse(topic, payload).map(MqttCommand::Text)
    } else if topic == topics.display {
        parse(topic, payload).map(MqttCommand::Display)
    } else if topic == topics.ready {
        None
    } else if topic == topics.ota {
        debug!("OTA request ignored");
        None
    } else {
        debug!(topic, "unknown topic");
        None
    }
}

fn on_connect(client: &AsyncClient, topics: &Topics, settings: &MqttSettings) {
    info!(host = %settings.host, "connected to MQTT");

    // Called from the event loop, so nothing here may wait on it
    match client.try_subscribe(&topics.subscription, QoS::AtMostOnce) {
        Ok(()) => info!(topic = %topics.subscription, "subscribed"),
        Err(e) => warn!("subscribe failed: {e}"),
    }

    if let Some(topic) = &topics.discovery {
        let payload = discovery_payload(topics, settings).to_string();
        match client.try_publish(topic, QoS::AtMostOnce, true, payload) {
            Ok(()) => info!(%topic, "published Home Assistant discovery"),
            Err(e) => warn!("discovery publish failed: {e}"),
        }
    }
}

async fn handle_events(
    mut eventloop: EventLoop,
    client: AsyncClient,
    marquee: SharedMarquee,
    topics: &Topics,
    settings: &MqttSettings,
    reconnect: Duration,
) {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => on_connect(&client, topics, settings),
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                if let Some(cmd) = route(topics, &publish.topic, &publish.payload) {
                    debug!(topic = %publish.topic, ?cmd, "MQTT command");
                    cmd.apply(&mut *marquee.write().await);
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!("MQTT connection lost: {e}; retrying in {}ms", reconnect.as_millis());
                tokio::time::sleep(reconnect).await;
            }
        }
    }
}

/// Forward every ready change until the client is gone
async fn publish_ready(client: AsyncClient, topic: String, mut ready: watch::Receiver<ReadyState>) {
    while ready.changed().await.is_ok() {
        let state = *ready.borrow_and_update();
        let payload = match serde_json::to_vec(&state) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("ready state not encoded: {e}");
                continue;
            }
        };
        if client.publish(&topic, QoS::AtMostOnce, false, payload).await.is_err() {
            return;
        }
    }
}

/// Run the MQTT connection until the task is dropped
pub async fn run(marquee: SharedMarquee, settings: MqttSettings, config: MqttConfig) {
    let topics = Topics::new(&config, &settings.node);

    let mut options = MqttOptions::new(&settings.client_id, &settings.host, settings.port);
    options.set_keep_alive(Duration::from_secs(config.keep_alive_secs.max(5)));
    if !settings.user.is_empty() {
        options.set_credentials(&settings.user, &settings.pass);
    }
    let (client, eventloop) = AsyncClient::new(options, 16);

    info!(
        host = %settings.host,
        port = settings.port,
        user = %settings.user,
        client_id = %settings.client_id,
        "connecting to MQTT"
    );

    let ready = marquee.read().await.subscribe_ready();
    let reconnect = Duration::from_millis(config.reconnect_ms);

    tokio::select! {
        () = handle_events(eventloop, client.clone(), marquee, &topics, &settings, reconnect) => {}
        () = publish_ready(client, topics.ready.clone(), ready) => {}
    }
}
