//! Reader side of a channel: walk a chain of messages from a root.

use futures::Stream;
use iota_trinary::{Digest, Trit};
use tracing::{debug, instrument, warn};

use crate::cancel::{CancellationToken, NeverCancel};
use crate::config::FetchConfig;
use crate::errors::{AuthFailure, MamError, Result};
use crate::ledger::Ledger;
use crate::mam::{decode, Message};
use crate::mode::Mode;
use crate::retry::RetryPolicy;

/// Outcome of a single [`Fetcher::step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Message(Message),
    /// Nothing is stored at the cursor's address.
    Exhausted,
    Cancelled,
}

/// Why a fetch stopped without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Exhausted,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    pub messages: Vec<Message>,
    /// Root to resume from.
    pub next_root: Digest,
    pub status: FetchStatus,
}

/// End of a [`Fetcher::fetch_with`] run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchEnd {
    pub next_root: Digest,
    pub status: FetchStatus,
    /// Messages handed to the callback.
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CursorState {
    Fetching,
    Done,
    Failed(AuthFailure),
}

/// Position in a channel.
///
/// An exhausted cursor keeps its root: a message that is absent now may
/// still be on its way to this node, so [`Cursor::resume`] lets the caller
/// try again later. A cursor that hit a message failing authentication
/// stays failed.
#[derive(Debug, Clone)]
pub struct Cursor {
    root: Digest,
    mode: Mode,
    state: CursorState,
}

impl Cursor {
    pub fn new(root: Digest, mode: Mode) -> Self {
        Cursor {
            root,
            mode,
            state: CursorState::Fetching,
        }
    }

    /// Root of the next message to read.
    pub fn root(&self) -> &Digest {
        &self.root
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn is_done(&self) -> bool {
        self.state != CursorState::Fetching
    }

    /// Look at the current root again after it came up empty.
    pub fn resume(&mut self) {
        if self.state == CursorState::Done {
            self.state = CursorState::Fetching;
        }
    }
}

enum Lookup {
    Found(Vec<Trit>),
    Absent,
    Cancelled,
}

pub struct Fetcher<L> {
    ledger: L,
    retry: RetryPolicy,
}

impl<L: Ledger> Fetcher<L> {
    pub fn new(ledger: L) -> Self {
        Fetcher {
            ledger,
            retry: RetryPolicy::default(),
        }
    }

    pub fn from_config(ledger: L, config: &FetchConfig) -> Self {
        Fetcher {
            ledger,
            retry: config.retry_policy(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    async fn lookup(&self, address: &Digest, cancel: &dyn CancellationToken) -> Result<Lookup> {
        let mut attempt = 0;
        loop {
            if cancel.is_cancelled() {
                return Ok(Lookup::Cancelled);
            }
            match self.ledger.lookup(address).await {
                Ok(Some(payload)) => return Ok(Lookup::Found(payload)),
                Ok(None) => return Ok(Lookup::Absent),
                Err(e) if attempt < self.retry.max_attempts => {
                    let delay = self.retry.calculate_delay(attempt);
                    warn!(%address, attempt, ?delay, error = %e, "ledger lookup failed, retrying");
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = cancel.cancelled() => return Ok(Lookup::Cancelled),
                    }
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Read the message at the cursor and move past it.
    pub async fn step(&self, cursor: &mut Cursor, cancel: &dyn CancellationToken) -> Result<Step> {
        match cursor.state {
            CursorState::Fetching => {}
            CursorState::Done => return Ok(Step::Exhausted),
            CursorState::Failed(failure) => return Err(failure.into()),
        }

        let address = cursor.mode.address(&cursor.root);
        let blob = match self.lookup(&address, cancel).await? {
            Lookup::Found(blob) => blob,
            Lookup::Absent => {
                debug!(%address, "no message at address");
                cursor.state = CursorState::Done;
                return Ok(Step::Exhausted);
            }
            Lookup::Cancelled => return Ok(Step::Cancelled),
        };

        match decode(&blob, cursor.mode.side_key(), &cursor.root) {
            Ok(message) => {
                debug!(root = %cursor.root, next_root = %message.next_root, "read message");
                cursor.root = message.next_root;
                Ok(Step::Message(message))
            }
            Err(MamError::AuthenticationFailed(failure)) => {
                warn!(%address, root = %cursor.root, %failure, "message failed authentication");
                cursor.state = CursorState::Failed(failure);
                Err(failure.into())
            }
            Err(e) => Err(e),
        }
    }

    /// Hand every message from `root` onwards to `callback`, stopping at the
    /// first empty address or on cancellation.
    #[instrument(skip_all, fields(mode = %mode, root = %root))]
    pub async fn fetch_with<F>(
        &self,
        root: Digest,
        mode: &Mode,
        cancel: &dyn CancellationToken,
        mut callback: F,
    ) -> Result<FetchEnd>
    where
        F: FnMut(Message) + Send,
    {
        let mut cursor = Cursor::new(root, mode.clone());
        let mut count = 0;
        let status = loop {
            match self.step(&mut cursor, cancel).await? {
                Step::Message(message) => {
                    callback(message);
                    count += 1;
                }
                Step::Exhausted => break FetchStatus::Exhausted,
                Step::Cancelled => break FetchStatus::Cancelled,
            }
        };
        debug!(count, ?status, "fetch finished");
        Ok(FetchEnd {
            next_root: cursor.root,
            status,
            count,
        })
    }

    /// Collect every message from `root` onwards.
    pub async fn fetch(
        &self,
        root: Digest,
        mode: &Mode,
        cancel: &dyn CancellationToken,
    ) -> Result<Fetched> {
        let mut messages = Vec::new();
        let end = self
            .fetch_with(root, mode, cancel, |message| messages.push(message))
            .await?;
        Ok(Fetched {
            messages,
            next_root: end.next_root,
            status: end.status,
        })
    }

    /// The message at `root`, if any.
    pub async fn fetch_single(&self, root: Digest, mode: &Mode) -> Result<Option<Message>> {
        let mut cursor = Cursor::new(root, mode.clone());
        match self.step(&mut cursor, &NeverCancel).await? {
            Step::Message(message) => Ok(Some(message)),
            Step::Exhausted | Step::Cancelled => Ok(None),
        }
    }

    /// Messages from the cursor onwards as a stream, moving `cursor` past
    /// each one it yields. The stream ends at the first empty address, on
    /// cancellation, or after yielding an error. If it ended without an
    /// error, [`Cursor::is_done`] is `false` exactly when it was cancelled.
    pub fn stream_from<'a>(
        &'a self,
        cursor: &'a mut Cursor,
        cancel: &'a dyn CancellationToken,
    ) -> impl Stream<Item = Result<Message>> + 'a {
        futures::stream::try_unfold(cursor, move |cursor| async move {
            let next = match self.step(cursor, cancel).await? {
                Step::Message(message) => Some((message, cursor)),
                Step::Exhausted | Step::Cancelled => None,
            };
            Ok::<_, MamError>(next)
        })
    }

    /// Messages from `root` onwards as a stream. Exhaustion and cancellation
    /// both end it quietly; use [`Fetcher::stream_from`] to tell them apart
    /// or to resume afterwards.
    pub fn stream<'a>(
        &'a self,
        root: Digest,
        mode: Mode,
        cancel: &'a dyn CancellationToken,
    ) -> impl Stream<Item = Result<Message>> + 'a {
        futures::stream::try_unfold(Cursor::new(root, mode), move |mut cursor| async move {
            let next = match self.step(&mut cursor, cancel).await? {
                Step::Message(message) => Some((message, cursor)),
                Step::Exhausted | Step::Cancelled => None,
            };
            Ok::<_, MamError>(next)
        })
    }
}

impl<L> std::fmt::Debug for Fetcher<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher")
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}
