//! Masked authenticated messaging.
//!
//! A channel is a chain of messages on an append-only ledger. Each message
//! is signed with a one-time key that is a leaf of a Merkle tree, masked
//! with a keystream derived from that tree's root, and carries the root of
//! the next tree. Anyone holding a root can follow the chain from there;
//! nobody without the seed can extend it.
//!
//! # Example
//!
//! ```
//! use iota_mam::*;
//! use iota_trinary::trytes::trits_from_trytes;
//!
//! let seed: Seed = "ABCDEFGHIJKLMNOPQRSTUVWXYZ9ABCDEFGHIJKLMNOPQRSTUVWXYZ9ABCDEFGHIJKLMNOPQRSTUVWXYZ9"
//!     .parse()
//!     .unwrap();
//! let channel = ChannelState::init(seed, Security::LOW, 0)
//!     .unwrap()
//!     .with_mode(Mode::Restricted("SIDEKEY".parse().unwrap()));
//!
//! let message = trits_from_trytes("HELLOWORLD").unwrap();
//! let (published, channel) = channel.publish(&message).unwrap();
//!
//! let read = decode(&published.payload, channel.mode().side_key(), &published.root).unwrap();
//! assert_eq!(read.payload, message);
//! assert_eq!(&read.next_root, channel.root());
//! ```

pub mod auth;
pub mod cancel;
pub mod channel;
pub mod config;
pub mod errors;
pub mod fetch;
pub mod ledger;
pub mod mask;
mod mam;
pub mod mode;
pub mod retry;

pub use cancel::{CancelFlag, CancellationToken, NeverCancel};
pub use channel::{ChannelState, Published};
pub use config::{ChannelConfig, FetchConfig, MamConfig};
pub use errors::*;
pub use fetch::{Cursor, FetchEnd, FetchStatus, Fetched, Fetcher, Step};
pub use iota_merkle::Seed;
pub use iota_trinary::{Digest, Security, Trit};
pub use ledger::{attach, Ledger, LookupError, MemoryLedger, StoreError};
pub use mam::*;
pub use mode::{Mode, SideKey};
pub use retry::{BackoffStrategy, RetryPolicy};
