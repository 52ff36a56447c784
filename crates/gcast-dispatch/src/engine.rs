use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::Utc;
use futures_util::{stream, FutureExt, StreamExt};
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use gcast_core::config::DispatchConfig;
use gcast_core::{
    BroadcastResult, DeliveryOutcome, FailureReason, MessageRef, Payload, RecipientId, Result,
};

use crate::batcher::batched;
use crate::directory::{dedupe, RecipientDirectory};
use crate::transport::MessageTransport;

/// Delivers one payload to every recipient of a directory snapshot.
///
/// The engine holds no per-run state: every call to
/// [`run_broadcast`](DispatchEngine::run_broadcast) owns its own counters, so
/// one engine (and its shared transport) can serve overlapping runs.
pub struct DispatchEngine {
    transport: Arc<dyn MessageTransport>,
    directory: Arc<dyn RecipientDirectory>,
    config: DispatchConfig,
}

impl DispatchEngine {
    /// Build an engine. Fails with `InvalidArgument` if `config` does not validate.
    pub fn new(
        transport: Arc<dyn MessageTransport>,
        directory: Arc<dyn RecipientDirectory>,
        config: DispatchConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            transport,
            directory,
            config,
        })
    }

    /// Run a broadcast to completion.
    pub async fn run_broadcast(&self, payload: &Payload) -> Result<BroadcastResult> {
        self.run_broadcast_until(payload, &CancellationToken::new())
            .await
    }

    /// Run a broadcast, stopping before the next batch once `cancel` fires.
    ///
    /// A batch that has started is always finished. The only `Err` is a failed
    /// directory fetch; per-recipient failures end up in `failed`.
    pub async fn run_broadcast_until(
        &self,
        payload: &Payload,
        cancel: &CancellationToken,
    ) -> Result<BroadcastResult> {
        let run_id = Uuid::new_v4();

        let recipients = match self.directory.fetch_recipients().await {
            Ok(list) => dedupe(list),
            Err(e) => {
                error!(%run_id, error = %e, "broadcast aborted: recipient directory unavailable");
                return Err(e.into());
            }
        };

        let started_at = Utc::now();
        let start = Instant::now();
        let total_recipients = recipients.len();
        info!(
            %run_id,
            total = total_recipients,
            payload = payload.kind(),
            batch_size = self.config.batch_size,
            "broadcast started"
        );

        let delay = self.config.inter_batch_delay();
        let mut tally = Tally::default();
        let mut cancelled = false;
        let mut batches = batched(recipients, self.config.batch_size)?.peekable();
        let mut batch_no = 0usize;

        while let Some(batch) = batches.next() {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            batch_no += 1;
            let size = batch.len();
            self.run_batch(payload, batch, &mut tally).await;
            debug!(
                %run_id,
                batch = batch_no,
                size,
                delivered = tally.delivered,
                failed = tally.failed,
                "batch finished"
            );

            let is_last = batches.peek().is_none();
            if is_last && !self.config.pause_after_final_batch {
                break;
            }
            tokio::select! {
                _ = sleep(delay) => {}
                _ = cancel.cancelled(), if !is_last => {
                    cancelled = true;
                    break;
                }
            }
        }

        let result = BroadcastResult {
            run_id,
            started_at,
            total_recipients,
            delivered: tally.delivered,
            failed: tally.failed,
            elapsed: start.elapsed(),
            cancelled,
        };
        info!(
            %run_id,
            total = result.total_recipients,
            delivered = result.delivered,
            failed = result.failed,
            elapsed_secs = result.elapsed_secs(),
            cancelled,
            "broadcast finished"
        );
        Ok(result)
    }

    /// Deliver `payload` to a single recipient, retrying while the transport
    /// reports a rate limit.
    ///
    /// Never returns [`DeliveryOutcome::RetryableFailure`]: a rate limit is
    /// either retried or, past the configured cap, turned into
    /// [`FailureReason::RateLimitExhausted`].
    pub async fn deliver_one(&self, payload: &Payload, recipient: RecipientId) -> DeliveryOutcome {
        let cap = self.config.retry_cap();
        let mut retries: u32 = 0;

        loop {
            match self.attempt(payload, recipient).await {
                DeliveryOutcome::Success => return DeliveryOutcome::Success,
                DeliveryOutcome::RetryableFailure(wait) => {
                    if cap.is_some_and(|max| retries >= max) {
                        let attempts = retries.saturating_add(1);
                        warn!(%recipient, attempts, "rate limit retries exhausted, giving up");
                        return DeliveryOutcome::PermanentFailure(
                            FailureReason::RateLimitExhausted { attempts },
                        );
                    }
                    retries = retries.saturating_add(1);
                    warn!(
                        %recipient,
                        wait = ?wait,
                        retry = retries,
                        "rate limited by transport, waiting before retry"
                    );
                    sleep(wait).await;
                }
                DeliveryOutcome::PermanentFailure(reason) => {
                    match &reason {
                        FailureReason::Unknown(detail) => {
                            warn!(%recipient, error = %detail, "delivery failed with unclassified error")
                        }
                        other => debug!(%recipient, reason = %other, "recipient unreachable"),
                    }
                    return DeliveryOutcome::PermanentFailure(reason);
                }
            }
        }
    }

    // --- private helpers ---------------------------------------------------

    /// One delivery attempt, no retries.
    async fn attempt(&self, payload: &Payload, recipient: RecipientId) -> DeliveryOutcome {
        let sent = match payload {
            Payload::Copy { source, pin } => {
                match self.transport.duplicate(source, recipient).await {
                    Ok(copy) => {
                        if *pin {
                            self.pin_best_effort(&copy).await;
                        }
                        Ok(())
                    }
                    Err(e) => Err(e),
                }
            }
            Payload::Forward { source } => self.transport.forward(recipient, source).await,
            Payload::Text { body } => self.transport.send_text(recipient, body).await,
        };

        match sent {
            Ok(()) => DeliveryOutcome::Success,
            Err(e) => e.into(),
        }
    }

    /// Pin, then pin for both sides; a double failure is logged and dropped.
    async fn pin_best_effort(&self, message: &MessageRef) {
        let Err(first) = self.transport.pin(message).await else {
            return;
        };
        if let Err(second) = self.transport.pin_both_sides(message).await {
            debug!(
                chat_id = message.chat_id,
                message_id = message.message_id,
                pin_error = %first,
                pin_both_sides_error = %second,
                "could not pin delivered copy, ignoring"
            );
        }
    }

    /// Deliver every recipient of one batch, up to `concurrency` at a time.
    ///
    /// Outcomes are collected first and tallied by this single caller.
    async fn run_batch(&self, payload: &Payload, batch: Vec<RecipientId>, tally: &mut Tally) {
        let outcomes: Vec<DeliveryOutcome> = stream::iter(batch)
            .map(|recipient| self.guarded_delivery(payload, recipient))
            .buffer_unordered(self.config.concurrency)
            .collect()
            .await;

        for outcome in &outcomes {
            tally.record(outcome);
        }
    }

    /// [`deliver_one`](Self::deliver_one) with panics turned into a failed outcome.
    async fn guarded_delivery(&self, payload: &Payload, recipient: RecipientId) -> DeliveryOutcome {
        match AssertUnwindSafe(self.deliver_one(payload, recipient))
            .catch_unwind()
            .await
        {
            Ok(outcome) => outcome,
            Err(panic) => {
                let detail = panic_message(panic.as_ref());
                error!(%recipient, panic = %detail, "delivery path panicked, counting as failed");
                DeliveryOutcome::PermanentFailure(FailureReason::Unknown(format!(
                    "delivery panicked: {detail}"
                )))
            }
        }
    }
}

/// Per-run counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Tally {
    delivered: usize,
    failed: usize,
}

impl Tally {
    fn record(&mut self, outcome: &DeliveryOutcome) {
        // RetryableFailure never reaches here; counting it as failed keeps the sum exact.
        if outcome.is_success() {
            self.delivered += 1;
        } else {
            self.failed += 1;
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
