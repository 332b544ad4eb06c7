//! Snowflake-style 64-bit ID generation.
//!
//! Every ID packs a 41-bit millisecond timestamp (relative to a configurable
//! epoch), a 5-bit data-center ID, a 5-bit worker ID and a 12-bit sequence:
//!
//! ```text
//!  Bit Index:  63           63 62            22 21           17 16         12 11             0
//!              +--------------+----------------+---------------+-------------+---------------+
//!  Field:      | reserved (1) | timestamp (41) | data ctr (5)  | worker (5)  | sequence (12) |
//!              +--------------+----------------+---------------+-------------+---------------+
//! ```
//!
//! ```
//! use snowmint::Snowflake;
//!
//! let generator = Snowflake::new(1, 2)?;
//! let id = generator.next_id()?;
//! assert_eq!(generator.decode_worker_id(id), 1);
//! assert_eq!(generator.decode_data_center_id(id), 2);
//! # Ok::<(), snowmint::Error>(())
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

mod config;
mod error;
#[cfg(feature = "async-tokio")]
mod futures;
mod generator;
mod id;
mod rand;
mod registry;
mod time;

pub use crate::config::*;
pub use crate::error::*;
#[cfg_attr(docsrs, doc(cfg(feature = "async-tokio")))]
#[cfg(feature = "async-tokio")]
pub use crate::futures::*;
pub use crate::generator::*;
pub use crate::id::*;
pub use crate::rand::*;
pub use crate::registry::*;
pub use crate::time::*;
