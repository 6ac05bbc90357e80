#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use iota_mam::*;
use tracing_subscriber::EnvFilter;

pub const SEED: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ9ABCDEFGHIJKLMNOPQRSTUVWXYZ9ABCDEFGHIJKLMNOPQRSTUVWXYZ9";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn seed() -> Seed {
    SEED.parse().unwrap()
}

/// Publish every payload in order and attach it, returning the final state.
pub async fn publish_all(
    ledger: &MemoryLedger,
    mut state: ChannelState,
    payloads: &[Vec<Trit>],
) -> (Vec<Published>, ChannelState) {
    let mut published = Vec::new();
    for payload in payloads {
        let (message, next) = state.publish(payload).unwrap();
        attach(ledger, &message, &RetryPolicy::none()).await.unwrap();
        published.push(message);
        state = next;
    }
    (published, state)
}

/// Fails the first `failures` lookups, then defers to the memory ledger.
#[derive(Default)]
pub struct FlakyLedger {
    pub inner: MemoryLedger,
    pub failures: AtomicU32,
    pub lookups: AtomicU32,
}

impl FlakyLedger {
    pub fn failing(failures: u32) -> Self {
        FlakyLedger {
            failures: AtomicU32::new(failures),
            ..Default::default()
        }
    }
}

#[async_trait]
impl Ledger for FlakyLedger {
    async fn lookup(&self, address: &Digest) -> std::result::Result<Option<Vec<Trit>>, LookupError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(LookupError::new(address, "node unavailable"));
        }
        self.inner.lookup(address).await
    }

    async fn store(&self, address: &Digest, payload: &[Trit]) -> std::result::Result<(), StoreError> {
        self.inner.store(address, payload).await
    }
}
