//! Refresh-channel subscriber
//!
//! Every message on the refresh channel names a key some peer wrote or
//! deleted; the key is dropped from the local tier. A payload equal to the
//! channel name is a liveness marker and is ignored. When the message stream
//! ends the subscriber re-subscribes with capped exponential back-off until
//! it is cancelled.

use crate::cache::local::LocalStore;
use crate::cache::stats::CacheCounters;
use crate::constants::{CACHE_RESUBSCRIBE_INITIAL_BACKOFF, CACHE_RESUBSCRIBE_MAX_BACKOFF};
use futures::StreamExt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use webmods_domain::ports::{KvClient, KvMessage, KvMessageStream};

pub(crate) struct RefreshSubscriber {
    pub(crate) kv: Arc<dyn KvClient>,
    pub(crate) channel: String,
    pub(crate) local: LocalStore,
    pub(crate) counters: Arc<CacheCounters>,
    pub(crate) token: CancellationToken,
}

impl RefreshSubscriber {
    /// Consume `stream`, then keep re-subscribing, until cancelled
    pub(crate) async fn run(self, mut stream: KvMessageStream) {
        loop {
            loop {
                tokio::select! {
                    biased;
                    () = self.token.cancelled() => {
                        debug!(channel = %self.channel, "Refresh subscriber stopped");
                        return;
                    }
                    message = stream.next() => match message {
                        Some(message) => self.apply(message).await,
                        None => break,
                    },
                }
            }

            warn!(channel = %self.channel, "Refresh subscription ended, re-subscribing");
            match self.resubscribe().await {
                Some(next) => stream = next,
                None => return,
            }
        }
    }

    async fn apply(&self, message: KvMessage) {
        if message.payload == self.channel {
            return;
        }
        self.local.invalidate(&message.payload).await;
        self.counters.invalidation();
        debug!(key = %message.payload, "Evicted key on refresh event");
    }

    /// New stream, or `None` once cancelled
    async fn resubscribe(&self) -> Option<KvMessageStream> {
        let mut backoff = CACHE_RESUBSCRIBE_INITIAL_BACKOFF;
        loop {
            tokio::select! {
                biased;
                () = self.token.cancelled() => return None,
                () = tokio::time::sleep(backoff) => {}
            }

            let attempt = tokio::select! {
                biased;
                () = self.token.cancelled() => return None,
                attempt = self.kv.subscribe(&self.channel) => attempt,
            };
            match attempt {
                Ok(stream) => {
                    info!(channel = %self.channel, "Re-subscribed to refresh channel");
                    return Some(stream);
                }
                Err(e) => {
                    backoff = (backoff * 2).min(CACHE_RESUBSCRIBE_MAX_BACKOFF);
                    warn!(channel = %self.channel, error = %e, retry_in = ?backoff, "Re-subscribe failed");
                }
            }
        }
    }
}
