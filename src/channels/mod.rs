//! Channel abstraction for message I/O.
//!
//! A channel owns its transport end-to-end: connection establishment,
//! pairing, reconnection, and teardown all live behind the trait. The core
//! only sees inbound `IncomingMessage`s on a merged stream and pushes
//! outbound text/presence back through the manager.

pub mod cli;
pub mod gateway;

pub use cli::CliChannel;
pub use gateway::GatewayChannel;

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use uuid::Uuid;

use crate::error::ChannelError;

/// One inbound text event.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub id: Uuid,
    /// Name of the channel that produced this message.
    pub channel: String,
    /// Conversation the reply goes back to.
    pub chat_id: String,
    pub sender_id: String,
    pub display_name: String,
    pub text: String,
    /// Channel-native message id, for read receipts.
    pub external_id: Option<String>,
}

impl IncomingMessage {
    pub fn new(
        channel: &str,
        chat_id: &str,
        sender_id: &str,
        display_name: &str,
        text: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel: channel.to_string(),
            chat_id: chat_id.to_string(),
            sender_id: sender_id.to_string(),
            display_name: display_name.to_string(),
            text: text.to_string(),
            external_id: None,
        }
    }

    pub fn with_external_id(mut self, external_id: &str) -> Self {
        self.external_id = Some(external_id.to_string());
        self
    }
}

/// Typing indicator states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Composing,
    Paused,
}

impl Presence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Composing => "composing",
            Self::Paused => "paused",
        }
    }
}

/// Stream of inbound messages from one channel (or all of them, merged).
pub type MessageStream = Pin<Box<dyn Stream<Item = IncomingMessage> + Send>>;

/// A message transport.
#[async_trait]
pub trait Channel: Send + Sync {
    fn name(&self) -> &str;

    /// Start the transport and return its inbound stream.
    async fn start(&self) -> Result<MessageStream, ChannelError>;

    /// Send a text reply into the conversation `msg` came from.
    async fn send_text(&self, msg: &IncomingMessage, text: &str) -> Result<(), ChannelError>;

    /// Signal a typing indicator. Best-effort.
    async fn set_presence(
        &self,
        msg: &IncomingMessage,
        presence: Presence,
    ) -> Result<(), ChannelError>;

    /// Acknowledge that `msg` was read. Best-effort.
    async fn mark_read(&self, msg: &IncomingMessage) -> Result<(), ChannelError>;

    async fn shutdown(&self) -> Result<(), ChannelError>;
}

/// Owns the registered channels and routes outbound calls back to the one
/// a message arrived on.
#[derive(Default)]
pub struct ChannelManager {
    channels: Vec<Box<dyn Channel>>,
}

impl ChannelManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, channel: Box<dyn Channel>) {
        self.channels.push(channel);
    }

    /// Start every channel and merge their inbound streams into one.
    pub async fn start_all(&self) -> Result<MessageStream, ChannelError> {
        let mut streams = Vec::with_capacity(self.channels.len());
        for channel in &self.channels {
            streams.push(channel.start().await?);
            tracing::info!(channel = channel.name(), "channel started");
        }
        Ok(Box::pin(futures::stream::select_all(streams)))
    }

    fn channel_for(&self, msg: &IncomingMessage) -> Result<&dyn Channel, ChannelError> {
        self.channels
            .iter()
            .find(|c| c.name() == msg.channel)
            .map(|c| &**c)
            .ok_or_else(|| ChannelError::UnknownChannel(msg.channel.clone()))
    }

    pub async fn send_text(&self, msg: &IncomingMessage, text: &str) -> Result<(), ChannelError> {
        self.channel_for(msg)?.send_text(msg, text).await
    }

    pub async fn set_presence(
        &self,
        msg: &IncomingMessage,
        presence: Presence,
    ) -> Result<(), ChannelError> {
        self.channel_for(msg)?.set_presence(msg, presence).await
    }

    pub async fn mark_read(&self, msg: &IncomingMessage) -> Result<(), ChannelError> {
        self.channel_for(msg)?.mark_read(msg).await
    }

    pub async fn shutdown_all(&self) -> Result<(), ChannelError> {
        for channel in &self.channels {
            channel.shutdown().await?;
        }
        Ok(())
    }
}
