//! Balanced ternary building blocks for masked authenticated messaging.
//!
//! The sponge and the signature scheme are `iota-crypto`'s, conversions are
//! `iota-conversion`'s. What lives here is the validation and the few
//! helpers a channel needs on top:
//!
//! * [`trytes`] - checked trit/tryte conversion and byte packing
//! * [`num`] - integer <-> trit conversion and trit arithmetic
//! * [`curl`] - the [`Curl`](curl::Curl) trait over Curl-P-81
//! * [`iss`] - security levels, ISS over Curl-P-81 and the checksum
//!   security of a hash
//!
//! ```
//! use iota_trinary::curl::{CpuCurl, Curl};
//! use iota_trinary::trytes::*;
//!
//! let trits = trits_from_trytes("HELLOWORLD").unwrap();
//! let mut curl = CpuCurl::default();
//! curl.absorb(&trits);
//! let mut hash = [0 as Trit; HASH_LENGTH];
//! curl.squeeze(&mut hash);
//! assert_eq!(trytes_from_trits(&hash).unwrap().len(), 81);
//! ```

pub mod curl;
pub mod digest;
pub mod error;
pub mod iss;
pub mod num;
pub mod trytes;

pub use digest::Digest;
pub use error::TrinaryError;
pub use iss::Security;
pub use trytes::{Trit, HASH_LENGTH, TRITS_PER_TRYTE};
