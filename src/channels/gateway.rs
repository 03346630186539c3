//! WhatsApp gateway channel — long-polls a bridge sidecar over HTTP.
//!
//! The sidecar owns the socket to WhatsApp: pairing, reconnects, and
//! session teardown never reach this process. The bridge surface is three
//! POSTs (`/send`, `/presence`, `/read`) and one long-poll GET (`/events`)
//! returning the inbound text events queued since the last poll.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::channels::{Channel, IncomingMessage, MessageStream, Presence};
use crate::error::ChannelError;

/// How long to back off after a failed poll before retrying.
const POLL_RETRY_DELAY: std::time::Duration = std::time::Duration::from_secs(5);

/// Channel bridging to a WhatsApp gateway sidecar.
pub struct GatewayChannel {
    base_url: String,
    client: Client,
}

impl GatewayChannel {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn post(&self, path: &str, body: &impl Serialize) -> Result<(), ChannelError> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| ChannelError::SendFailed {
                name: "gateway".into(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ChannelError::SendFailed {
                name: "gateway".into(),
                reason: format!("{path} returned {status}: {body}"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Channel for GatewayChannel {
    fn name(&self) -> &str {
        "gateway"
    }

    async fn start(&self) -> Result<MessageStream, ChannelError> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let client = self.client.clone();
        let events_url = self.url("events");

        tokio::spawn(async move {
            loop {
                let batch = match client.get(&events_url).send().await {
                    Ok(response) if response.status().is_success() => {
                        match response.json::<Vec<GatewayEvent>>().await {
                            Ok(events) => events,
                            Err(e) => {
                                tracing::warn!(error = %e, "gateway sent unparseable events");
                                tokio::time::sleep(POLL_RETRY_DELAY).await;
                                continue;
                            }
                        }
                    }
                    Ok(response) => {
                        tracing::warn!(status = %response.status(), "gateway poll rejected");
                        tokio::time::sleep(POLL_RETRY_DELAY).await;
                        continue;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "gateway unreachable, retrying");
                        tokio::time::sleep(POLL_RETRY_DELAY).await;
                        continue;
                    }
                };

                for event in batch {
                    let msg = IncomingMessage::new(
                        "gateway",
                        &event.chat_id,
                        &event.sender_id,
                        event.display_name.as_deref().unwrap_or(&event.sender_id),
                        &event.text,
                    )
                    .with_external_id(&event.message_id);
                    if tx.send(msg).is_err() {
                        return; // dispatcher gone
                    }
                }
            }
        });

        Ok(Box::pin(UnboundedReceiverStream::new(rx)))
    }

    async fn send_text(&self, msg: &IncomingMessage, text: &str) -> Result<(), ChannelError> {
        self.post(
            "send",
            &SendRequest {
                chat_id: &msg.chat_id,
                text,
            },
        )
        .await
    }

    async fn set_presence(
        &self,
        msg: &IncomingMessage,
        presence: Presence,
    ) -> Result<(), ChannelError> {
        self.post(
            "presence",
            &PresenceRequest {
                chat_id: &msg.chat_id,
                state: presence.as_str(),
            },
        )
        .await
    }

    async fn mark_read(&self, msg: &IncomingMessage) -> Result<(), ChannelError> {
        let Some(external_id) = msg.external_id.as_deref() else {
            return Ok(());
        };
        self.post("read", &ReadRequest { message_id: external_id }).await
    }

    async fn shutdown(&self) -> Result<(), ChannelError> {
        Ok(())
    }
}

// ── Bridge wire types ───────────────────────────────────────────────

#[derive(Deserialize)]
struct GatewayEvent {
    message_id: String,
    chat_id: String,
    sender_id: String,
    #[serde(default)]
    display_name: Option<String>,
    text: String,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Serialize)]
struct PresenceRequest<'a> {
    chat_id: &'a str,
    state: &'a str,
}

#[derive(Serialize)]
struct ReadRequest<'a> {
    message_id: &'a str,
}
