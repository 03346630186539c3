//! Conversation dispatcher — routes one inbound text event per turn.
//!
//! New users get the combined welcome, onboarding users get the interview,
//! everyone else goes through the classifier and the ledger. The run loop
//! drains a single merged stream sequentially; `turn_lock` additionally
//! guards each store read-modify-write so direct `handle_event` callers get
//! the same no-interleaving guarantee as the loop.

use std::sync::Arc;

use chrono::Utc;
use futures::StreamExt;
use tokio::sync::Mutex;

use crate::channels::{ChannelManager, IncomingMessage, Presence};
use crate::classifier::{FoodClassifier, ProfileSnapshot};
use crate::error::Error;
use crate::ledger;
use crate::onboarding::{self, prompts};
use crate::profile::Profile;
use crate::store::ProfileStore;

pub struct Dispatcher {
    store: Arc<dyn ProfileStore>,
    classifier: Arc<dyn FoodClassifier>,
    channels: Arc<ChannelManager>,
    turn_lock: Mutex<()>,
}

impl Dispatcher {
    pub fn new(
        store: Arc<dyn ProfileStore>,
        classifier: Arc<dyn FoodClassifier>,
        channels: Arc<ChannelManager>,
    ) -> Self {
        Self {
            store,
            classifier,
            channels,
            turn_lock: Mutex::new(()),
        }
    }

    /// Run the main loop until ctrl-c or all channel streams end.
    pub async fn run(self) -> Result<(), Error> {
        let mut messages = self.channels.start_all().await?;

        tracing::info!("nutribot ready and listening");

        loop {
            let message = tokio::select! {
                biased;
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("ctrl-c received, shutting down");
                    break;
                }
                msg = messages.next() => {
                    match msg {
                        Some(m) => m,
                        None => {
                            tracing::info!("all channel streams ended, shutting down");
                            break;
                        }
                    }
                }
            };

            self.handle_event(&message).await;
        }

        self.channels.shutdown_all().await?;
        Ok(())
    }

    /// Handle one inbound event end-to-end.
    ///
    /// A failed turn is dropped — logged, unanswered, and without partial
    /// mutation visible to the next turn — never propagated to the loop.
    pub async fn handle_event(&self, msg: &IncomingMessage) {
        // Read receipt is fire-and-forget, like every outbound call.
        if let Err(e) = self.channels.mark_read(msg).await {
            tracing::debug!(error = %e, "mark_read failed");
        }

        match self.handle_turn(msg).await {
            Ok(Some(reply)) => {
                // Delivery failure does not roll back the already-persisted
                // mutation.
                if let Err(e) = self.channels.send_text(msg, &reply).await {
                    tracing::warn!(error = %e, sender = %msg.sender_id, "reply send failed");
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::error!(error = %e, sender = %msg.sender_id, "turn dropped");
            }
        }
    }

    /// The turn body: resolve the profile, route by phase, persist, and
    /// decide the single outbound reply (or none).
    async fn handle_turn(&self, msg: &IncomingMessage) -> Result<Option<String>, Error> {
        // Two rapid messages from one user must not interleave their
        // read-modify-write cycles; last-write-wins would lose an update.
        let _guard = self.turn_lock.lock().await;

        let now = Utc::now();
        let seed = Profile::seed(&msg.sender_id, &msg.display_name, now);
        let (mut profile, created) = self.store.get_or_create(&msg.sender_id, seed).await?;

        if created {
            tracing::info!(user = %msg.sender_id, "new user, starting interview");
            return Ok(Some(prompts::welcome(&msg.display_name)));
        }

        if !profile.phase.is_terminal() {
            let step = onboarding::handle_answer(&mut profile, &msg.text);
            self.store.update(profile.clone()).await?;
            if profile.phase.is_terminal() {
                tracing::info!(
                    user = %profile.id,
                    target = profile.daily_calorie_target,
                    "interview complete"
                );
            }
            return Ok(Some(step.reply));
        }

        self.presence(msg, Presence::Composing).await;

        let snapshot = ProfileSnapshot::of(&profile);
        let detection = match self
            .classifier
            .classify(&msg.display_name, &msg.text, &snapshot)
            .await
        {
            Ok(detection) => detection,
            Err(e) => {
                // Malformed or absent model output: no mutation, no reply.
                tracing::warn!(error = %e, user = %profile.id, "classifier failed, dropping turn");
                self.presence(msg, Presence::Paused).await;
                return Ok(None);
            }
        };

        if ledger::apply_detection(&mut profile, detection.calories_detected, now) {
            self.store.update(profile.clone()).await?;
            tracing::info!(
                user = %profile.id,
                detected = detection.calories_detected,
                consumed = profile.calories_consumed_today,
                percent = ledger::progress_percent(
                    profile.calories_consumed_today,
                    profile.daily_calorie_target.unwrap_or(0),
                ),
                "ledger updated"
            );
        }

        self.presence(msg, Presence::Paused).await;
        Ok(Some(detection.response_message))
    }

    async fn presence(&self, msg: &IncomingMessage, presence: Presence) {
        if let Err(e) = self.channels.set_presence(msg, presence).await {
            tracing::debug!(error = %e, "presence update failed");
        }
    }
}
