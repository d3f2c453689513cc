use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    mutations: AtomicU64,
    envelopes: AtomicU64,
    deliveries: AtomicU64,
    delivery_failures: AtomicU64,
    channels_opened: AtomicU64,
    channels_closed: AtomicU64,
    malformed_inbound: AtomicU64,
    chat_requests: AtomicU64,
    chat_fallbacks: AtomicU64,
}

impl Metrics {
    pub fn record_mutation(&self) {
        self.mutations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_broadcast(&self, delivered: usize) {
        self.envelopes.fetch_add(1, Ordering::Relaxed);
        self.deliveries
            .fetch_add(delivered as u64, Ordering::Relaxed);
    }

    pub fn record_delivery_failure(&self) {
        self.delivery_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_channel_opened(&self) {
        self.channels_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_channels_closed(&self, count: usize) {
        self.channels_closed
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_malformed_inbound(&self) {
        self.malformed_inbound.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_chat(&self, degraded: bool) {
        self.chat_requests.fetch_add(1, Ordering::Relaxed);
        if degraded {
            self.chat_fallbacks.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn delivery_failures(&self) -> u64 {
        self.delivery_failures.load(Ordering::Relaxed)
    }

    pub fn malformed_inbound(&self) -> u64 {
        self.malformed_inbound.load(Ordering::Relaxed)
    }

    pub fn render_prometheus(&self, live_channels: usize) -> String {
        let mutations = self.mutations.load(Ordering::Relaxed);
        let envelopes = self.envelopes.load(Ordering::Relaxed);
        let deliveries = self.deliveries.load(Ordering::Relaxed);
        let failures = self.delivery_failures.load(Ordering::Relaxed);
        let opened = self.channels_opened.load(Ordering::Relaxed);
        let closed = self.channels_closed.load(Ordering::Relaxed);
        let malformed = self.malformed_inbound.load(Ordering::Relaxed);
        let chats = self.chat_requests.load(Ordering::Relaxed);
        let fallbacks = self.chat_fallbacks.load(Ordering::Relaxed);

        format!(
            "# TYPE sentinel_mutations_total counter\n\
sentinel_mutations_total {}\n\
# TYPE sentinel_envelopes_emitted_total counter\n\
sentinel_envelopes_emitted_total {}\n\
# TYPE sentinel_deliveries_total counter\n\
sentinel_deliveries_total {}\n\
# TYPE sentinel_delivery_failures_total counter\n\
sentinel_delivery_failures_total {}\n\
# TYPE sentinel_channels_opened_total counter\n\
sentinel_channels_opened_total {}\n\
# TYPE sentinel_channels_closed_total counter\n\
sentinel_channels_closed_total {}\n\
# TYPE sentinel_malformed_inbound_total counter\n\
sentinel_malformed_inbound_total {}\n\
# TYPE sentinel_chat_requests_total counter\n\
sentinel_chat_requests_total {}\n\
# TYPE sentinel_chat_fallbacks_total counter\n\
sentinel_chat_fallbacks_total {}\n\
# TYPE sentinel_live_channels gauge\n\
sentinel_live_channels {}\n",
            mutations,
            envelopes,
            deliveries,
            failures,
            opened,
            closed,
            malformed,
            chats,
            fallbacks,
            live_channels
        )
    }
}
