//! Padlock core
//!
//! Per-conversation state for one-time pad messaging: the consumption ledger
//! that decides which pad bytes each frame may use, and the conversation that
//! combines the ledger with the frame codec.
//!
//! # Architecture
//!
//! ```text
//! ConversationRegistry ── id ──► Arc<Mutex<Conversation>>
//!                                      │
//!                                      ├── pad (zeroized on burn/drop)
//!                                      ├── DerivedTokens
//!                                      └── Ledger ── Role (direction)
//! ```
//!
//! The core performs no I/O. Callers persist [`LedgerSnapshot`]s and move
//! frame bytes to and from the relay.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod conversation;
pub mod error;
pub mod ledger;
pub mod registry;
pub mod role;

pub use config::LedgerConfig;
pub use conversation::{Conversation, ReceiveOutcome, ReceivedMessage, SkipReason};
pub use error::LedgerError;
pub use ledger::{Classification, Ledger, LedgerSnapshot, LedgerState, PeerUpdate, Reservation};
pub use registry::{ConversationRegistry, SharedConversation, lock};
pub use role::Role;
