//! The ledger a channel is published to and read from.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use iota_trinary::{Digest, Trit};
use parking_lot::RwLock;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::channel::Published;
use crate::errors::Result;
use crate::retry::RetryPolicy;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("ledger lookup at {address} failed: {reason}")]
pub struct LookupError {
    pub address: Digest,
    pub reason: String,
}

impl LookupError {
    pub fn new(address: &Digest, reason: impl Into<String>) -> Self {
        LookupError {
            address: *address,
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("ledger store at {address} failed: {reason}")]
pub struct StoreError {
    pub address: Digest,
    pub reason: String,
    /// Whether trying again may succeed.
    pub transient: bool,
}

impl StoreError {
    /// A failure that may clear up, such as an unreachable node.
    pub fn new(address: &Digest, reason: impl Into<String>) -> Self {
        StoreError {
            address: *address,
            reason: reason.into(),
            transient: true,
        }
    }

    /// The address already holds something else; retrying cannot help.
    pub fn conflict(address: &Digest, reason: impl Into<String>) -> Self {
        StoreError {
            transient: false,
            ..StoreError::new(address, reason)
        }
    }

    pub fn is_transient(&self) -> bool {
        self.transient
    }
}

/// Address-keyed storage for masked messages.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Blob stored at `address`, or `None` if nothing is there (yet).
    async fn lookup(&self, address: &Digest) -> std::result::Result<Option<Vec<Trit>>, LookupError>;

    async fn store(&self, address: &Digest, payload: &[Trit]) -> std::result::Result<(), StoreError>;
}

#[async_trait]
impl<L: Ledger + ?Sized> Ledger for Arc<L> {
    async fn lookup(&self, address: &Digest) -> std::result::Result<Option<Vec<Trit>>, LookupError> {
        (**self).lookup(address).await
    }

    async fn store(&self, address: &Digest, payload: &[Trit]) -> std::result::Result<(), StoreError> {
        (**self).store(address, payload).await
    }
}

#[async_trait]
impl<'a, L: Ledger + ?Sized> Ledger for &'a L {
    async fn lookup(&self, address: &Digest) -> std::result::Result<Option<Vec<Trit>>, LookupError> {
        (**self).lookup(address).await
    }

    async fn store(&self, address: &Digest, payload: &[Trit]) -> std::result::Result<(), StoreError> {
        (**self).store(address, payload).await
    }
}

/// In-process ledger. An address holds one blob; storing the same blob
/// again is a no-op, storing a different one is refused.
#[derive(Default)]
pub struct MemoryLedger {
    entries: RwLock<HashMap<Digest, Vec<Trit>>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn get(&self, address: &Digest) -> Option<Vec<Trit>> {
        self.entries.read().get(address).cloned()
    }

    /// Overwrite whatever is at `address`.
    pub fn replace(&self, address: &Digest, payload: Vec<Trit>) {
        self.entries.write().insert(*address, payload);
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn lookup(&self, address: &Digest) -> std::result::Result<Option<Vec<Trit>>, LookupError> {
        Ok(self.get(address))
    }

    async fn store(&self, address: &Digest, payload: &[Trit]) -> std::result::Result<(), StoreError> {
        let mut entries = self.entries.write();
        match entries.get(address) {
            Some(existing) if existing.as_slice() == payload => Ok(()),
            Some(_) => Err(StoreError::conflict(
                address,
                "address already holds a different message",
            )),
            None => {
                entries.insert(*address, payload.to_vec());
                Ok(())
            }
        }
    }
}

impl std::fmt::Debug for MemoryLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryLedger")
            .field("entries", &self.len())
            .finish()
    }
}

/// Store a published message at its address. Transient store failures are
/// retried under `retry`; a conflict is returned at once.
#[instrument(skip_all, fields(address = %published.address, leaf = published.leaf_index))]
pub async fn attach<L: Ledger + ?Sized>(
    ledger: &L,
    published: &Published,
    retry: &RetryPolicy,
) -> Result<()> {
    retry
        .execute_while(
            || ledger.store(&published.address, &published.payload),
            StoreError::is_transient,
        )
        .await?;
    debug!("attached message");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::MamError;

    fn address(tryte: char) -> Digest {
        tryte.to_string().repeat(81).parse().unwrap()
    }

    #[tokio::test]
    async fn lookups_see_stored_blobs() {
        let ledger = MemoryLedger::new();
        assert!(ledger.is_empty());
        assert_eq!(ledger.lookup(&address('A')).await, Ok(None));

        ledger.store(&address('A'), &[1, 0, -1]).await.unwrap();
        assert_eq!(ledger.lookup(&address('A')).await, Ok(Some(vec![1, 0, -1])));
        assert_eq!(ledger.lookup(&address('B')).await, Ok(None));
        assert_eq!(ledger.len(), 1);
    }

    #[tokio::test]
    async fn stores_are_idempotent_but_not_overwriting() {
        let ledger = Arc::new(MemoryLedger::new());
        ledger.store(&address('A'), &[1, 1, 1]).await.unwrap();
        ledger.store(&address('A'), &[1, 1, 1]).await.unwrap();
        let err = ledger.store(&address('A'), &[0, 0, 0]).await.unwrap_err();
        assert_eq!(err.address, address('A'));
        assert!(!err.is_transient());
        assert_eq!(ledger.get(&address('A')), Some(vec![1, 1, 1]));
    }

    #[tokio::test]
    async fn attach_surfaces_store_errors() {
        let ledger = MemoryLedger::new();
        let published = Published {
            payload: vec![0, 1, -1],
            root: address('R'),
            next_root: address('N'),
            address: address('R'),
            leaf_index: 0,
        };
        attach(&ledger, &published, &RetryPolicy::none()).await.unwrap();
        assert_eq!(ledger.get(&address('R')), Some(vec![0, 1, -1]));

        let conflicting = Published {
            payload: vec![1, 1, 1],
            ..published
        };
        assert!(matches!(
            attach(&ledger, &conflicting, &RetryPolicy::none()).await,
            Err(MamError::Store(_))
        ));
    }

    #[tokio::test]
    async fn attach_does_not_retry_conflicts() {
        let ledger = MemoryLedger::new();
        ledger.replace(&address('R'), vec![1, 1, 1]);
        let published = Published {
            payload: vec![0, 1, -1],
            root: address('R'),
            next_root: address('N'),
            address: address('R'),
            leaf_index: 0,
        };
        let patient = RetryPolicy::fixed(std::time::Duration::from_secs(60)).with_max_attempts(5);
        let attached = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            attach(&ledger, &published, &patient),
        )
        .await
        .expect("a conflict is returned without backing off");
        assert!(matches!(attached, Err(MamError::Store(ref e)) if !e.is_transient()));
    }
}
