//! Conversation registry
//!
//! Maps conversation ids to shared conversations. The map lock is held only
//! for lookup and insertion; each conversation has its own mutex, so send,
//! receive and burn on one conversation are a single critical section while
//! different conversations proceed in parallel.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, RwLock},
};

use padlock_proto::RelayEnvelope;
use tracing::debug;

use crate::{
    conversation::{Conversation, ReceiveOutcome},
    error::LedgerError,
};

/// A conversation behind its own lock
pub type SharedConversation = Arc<Mutex<Conversation>>;

/// Lock a shared conversation, mapping poisoning to `LockPoisoned`.
pub fn lock(shared: &SharedConversation) -> Result<MutexGuard<'_, Conversation>, LedgerError> {
    shared.lock().map_err(|_| LedgerError::LockPoisoned)
}

/// Conversations known to this host
#[derive(Default)]
pub struct ConversationRegistry {
    conversations: RwLock<HashMap<String, SharedConversation>>,
}

impl ConversationRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a conversation under its derived id.
    ///
    /// # Errors
    ///
    /// - `DuplicateConversation` if the id is taken
    pub fn insert(&self, conversation: Conversation) -> Result<SharedConversation, LedgerError> {
        let id = conversation.id().to_owned();
        let mut map = self.conversations.write().map_err(|_| LedgerError::LockPoisoned)?;

        if map.contains_key(&id) {
            return Err(LedgerError::DuplicateConversation(id));
        }

        let shared = Arc::new(Mutex::new(conversation));
        map.insert(id.clone(), Arc::clone(&shared));
        debug!(conversation_id = %id, "conversation registered");

        Ok(shared)
    }

    /// Look up a conversation.
    ///
    /// # Errors
    ///
    /// - `UnknownConversation` if no conversation has this id
    pub fn get(&self, id: &str) -> Result<SharedConversation, LedgerError> {
        let map = self.conversations.read().map_err(|_| LedgerError::LockPoisoned)?;
        map.get(id).cloned().ok_or_else(|| LedgerError::UnknownConversation(id.to_owned()))
    }

    /// Unregister a conversation without burning it.
    ///
    /// # Errors
    ///
    /// - `UnknownConversation` if no conversation has this id
    pub fn remove(&self, id: &str) -> Result<SharedConversation, LedgerError> {
        let mut map = self.conversations.write().map_err(|_| LedgerError::LockPoisoned)?;
        map.remove(id).ok_or_else(|| LedgerError::UnknownConversation(id.to_owned()))
    }

    /// Burn and unregister a conversation.
    ///
    /// # Errors
    ///
    /// - `UnknownConversation` if no conversation has this id
    pub fn burn(&self, id: &str) -> Result<(), LedgerError> {
        let shared = self.remove(id)?;
        lock(&shared)?.burn();
        Ok(())
    }

    /// Encrypt a message for a registered conversation.
    ///
    /// # Errors
    ///
    /// - `UnknownConversation`, or anything [`Conversation::send`] returns
    pub fn send(&self, id: &str, plaintext: &[u8]) -> Result<Vec<u8>, LedgerError> {
        let shared = self.get(id)?;
        let mut conversation = lock(&shared)?;
        conversation.send(plaintext)
    }

    /// Route a relay envelope to its conversation.
    ///
    /// # Errors
    ///
    /// - `UnknownConversation`, or anything [`Conversation::receive`] returns
    pub fn receive(&self, envelope: &RelayEnvelope) -> Result<ReceiveOutcome, LedgerError> {
        let shared = self.get(&envelope.conversation_id)?;
        let mut conversation = lock(&shared)?;
        conversation.receive_envelope(envelope)
    }

    /// Number of registered conversations.
    pub fn len(&self) -> usize {
        self.conversations.read().map_or(0, |map| map.len())
    }

    /// Whether no conversations are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered conversation ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> =
            self.conversations.read().map(|map| map.keys().cloned().collect()).unwrap_or_default();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use padlock_proto::Frame;

    use super::*;
    use crate::Role;

    fn pad(seed: u8) -> Vec<u8> {
        (0..1160).map(|i| (i as u8).wrapping_mul(7).wrapping_add(seed)).collect()
    }

    #[test]
    fn insert_and_get() {
        let registry = ConversationRegistry::new();
        let conv = Conversation::new(pad(1), Role::Initiator).unwrap();
        let id = conv.id().to_owned();

        registry.insert(conv).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(lock(&registry.get(&id).unwrap()).unwrap().id(), id);
    }

    #[test]
    fn reject_duplicate_id() {
        let registry = ConversationRegistry::new();
        registry.insert(Conversation::new(pad(1), Role::Initiator).unwrap()).unwrap();

        let result = registry.insert(Conversation::new(pad(1), Role::Responder).unwrap());
        assert!(matches!(result, Err(LedgerError::DuplicateConversation(_))));
    }

    #[test]
    fn unknown_id() {
        let registry = ConversationRegistry::new();
        assert!(matches!(registry.get("nope"), Err(LedgerError::UnknownConversation(_))));
        assert!(matches!(registry.burn("nope"), Err(LedgerError::UnknownConversation(_))));
    }

    #[test]
    fn burn_removes_and_wipes() {
        let registry = ConversationRegistry::new();
        let shared = registry.insert(Conversation::new(pad(2), Role::Initiator).unwrap()).unwrap();
        let id = lock(&shared).unwrap().id().to_owned();

        registry.burn(&id).unwrap();

        assert!(registry.is_empty());
        assert_eq!(lock(&shared).unwrap().send(b"x"), Err(LedgerError::Burned));
    }

    #[test]
    fn routes_envelopes() {
        let alice = ConversationRegistry::new();
        let bob = ConversationRegistry::new();
        alice.insert(Conversation::new(pad(3), Role::Initiator).unwrap()).unwrap();
        bob.insert(Conversation::new(pad(3), Role::Responder).unwrap()).unwrap();

        let id = alice.ids().remove(0);
        let frame = Frame::decode(alice.send(&id, b"routed").unwrap()).unwrap();
        let envelope = RelayEnvelope::from_frame(id, &frame, 0);

        match bob.receive(&envelope).unwrap() {
            ReceiveOutcome::Delivered(msg) => assert_eq!(msg.plaintext.as_slice(), b"routed"),
            ReceiveOutcome::Skipped(reason) => panic!("skipped: {reason}"),
        }
    }

    #[test]
    fn ids_sorted() {
        let registry = ConversationRegistry::new();
        for seed in [9, 4, 6] {
            registry.insert(Conversation::new(pad(seed), Role::Initiator).unwrap()).unwrap();
        }
        let ids = registry.ids();
        assert_eq!(ids.len(), 3);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }
}
