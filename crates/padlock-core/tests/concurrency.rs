//! Concurrent access to shared conversations
//!
//! Many threads sending on one conversation must never be handed the same
//! pad bytes, and the peer must be able to decrypt every frame.

use std::{sync::Arc, thread};

use padlock_core::{
    Conversation, ConversationRegistry, ReceiveOutcome, Role, SharedConversation, lock,
};
use padlock_proto::Frame;

const THREADS: usize = 8;
const SENDS_PER_THREAD: usize = 25;

fn pad() -> Vec<u8> {
    (0..160 + 64 * 1024).map(|i: usize| (i.wrapping_mul(2_654_435_761) >> 7) as u8).collect()
}

#[test]
fn concurrent_sends_never_overlap() {
    let alice: SharedConversation =
        Arc::new(std::sync::Mutex::new(Conversation::new(pad(), Role::Initiator).unwrap()));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let alice = Arc::clone(&alice);
            thread::spawn(move || {
                (0..SENDS_PER_THREAD)
                    .map(|i| {
                        let msg = format!("thread {t} message {i}");
                        lock(&alice).unwrap().send(msg.as_bytes()).unwrap()
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut frames: Vec<Frame> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .map(|bytes| Frame::decode(bytes).unwrap())
        .collect();
    frames.sort_by_key(Frame::offset);

    // Every frame starts where the previous one ended
    let mut expected = 0u64;
    for frame in &frames {
        assert_eq!(frame.offset(), expected);
        expected += (frame.ciphertext.len() + 64) as u64;
    }
    assert_eq!(lock(&alice).unwrap().ledger().send_offset(), expected);

    // In-order delivery decrypts everything
    let mut bob = Conversation::new(pad(), Role::Responder).unwrap();
    for frame in &frames {
        assert!(matches!(bob.receive(&frame.to_bytes()).unwrap(), ReceiveOutcome::Delivered(_)));
    }
}

#[test]
fn conversations_proceed_independently() {
    let registry = Arc::new(ConversationRegistry::new());
    let ids: Vec<String> = (0..4u8)
        .map(|seed| {
            let mut pad = pad();
            pad[0] = seed;
            let shared = registry.insert(Conversation::new(pad, Role::Responder).unwrap()).unwrap();
            let id = lock(&shared).unwrap().id().to_owned();
            id
        })
        .collect();

    let handles: Vec<_> = ids
        .iter()
        .cloned()
        .map(|id| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for _ in 0..50 {
                    registry.send(&id, b"parallel").unwrap();
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    for id in &ids {
        let shared = registry.get(id).unwrap();
        assert_eq!(lock(&shared).unwrap().ledger().send_offset(), 50 * 96);
    }
}
