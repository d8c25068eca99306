//! Colloquy Benchmark Suite
//!
//! Turn-loop costs a host pays per player action:
//!   session_start_40_cards ...... open a session over a 40-card deck
//!   listen_neutral_40_cards ..... one LISTEN in an ongoing conversation
//!   listen_speak_round .......... LISTEN then SPEAK the first drawn card
//!   deck_draw_3_from_200 ........ raw filtered draw from a large pool

use std::collections::HashSet;
use std::sync::Arc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use colloquy_core::card::{ConversationCard, ConversationEffect, InstanceAllocator, Mechanics};
use colloquy_core::deck::{DrawRequest, SessionDeck};
use colloquy_core::{
    CardCatalog, CardId, CardKind, CardTemplate, ColloquyConfig, ConnectionType,
    ConversationEngine, EmotionalState, NpcId, Persistence, RelationshipLedger, SessionId,
    SessionOptions,
};

fn make_card(i: u8) -> CardTemplate {
    let persistence = if i % 2 == 0 {
        Persistence::Persistent
    } else {
        Persistence::Fleeting
    };
    CardTemplate::new(
        format!("card-{i}"),
        ConnectionType::Trust,
        CardKind::Conversation(ConversationCard {
            mechanics: Mechanics::new(i % 3, i % 5, persistence),
            effect: ConversationEffect::Comfort,
            base_comfort: 1,
            override_success: None,
        }),
    )
}

fn make_engine() -> (ConversationEngine, Vec<CardId>) {
    let templates: Vec<CardTemplate> = (0..40).map(make_card).collect();
    let pool = templates.iter().map(|t| t.id.clone()).collect();
    let catalog = CardCatalog::from_templates(templates).expect("catalog");
    let engine =
        ConversationEngine::new(Arc::new(catalog), ColloquyConfig::default()).expect("engine");
    (engine, pool)
}

/// Benchmark: Opening a session instantiates and shuffles the deck.
fn bench_session_start(c: &mut Criterion) {
    let (mut engine, pool) = make_engine();
    c.bench_function("session_start_40_cards", |b| {
        b.iter(|| {
            let handle = engine
                .start_session(
                    NpcId::new("elena"),
                    black_box(&pool),
                    SessionOptions::default().seeded(7),
                )
                .expect("start session");
            engine.end_session(handle).expect("end session");
        });
    });
}

/// Benchmark: One LISTEN in a long-running NEUTRAL conversation.
fn bench_listen(c: &mut Criterion) {
    let (mut engine, pool) = make_engine();
    let handle = engine
        .start_session(
            NpcId::new("elena"),
            &pool,
            SessionOptions::default().seeded(7).with_patience(u32::MAX),
        )
        .expect("start session");
    c.bench_function("listen_neutral_40_cards", |b| {
        b.iter(|| black_box(engine.listen(handle).expect("listen")));
    });
}

/// Benchmark: A full LISTEN / SPEAK round in an OPEN conversation.
fn bench_listen_speak_round(c: &mut Criterion) {
    let (mut engine, pool) = make_engine();
    let handle = engine
        .start_session(
            NpcId::new("elena"),
            &pool,
            SessionOptions::default()
                .seeded(11)
                .in_state(EmotionalState::Open)
                .with_patience(u32::MAX),
        )
        .expect("start session");
    let mut ledger = RelationshipLedger::new().with_tokens(ConnectionType::Trust, 4);

    c.bench_function("listen_speak_round", |b| {
        b.iter(|| {
            let listened = engine.listen(handle).expect("listen");
            if let Some(first) = listened.drawn.first() {
                black_box(engine.speak(handle, &[*first], &mut ledger).expect("speak"));
            }
        });
    });
}

/// Benchmark: Filtered draw of three from a 200-instance persistent pool.
fn bench_deck_draw(c: &mut Criterion) {
    let template = Arc::new(make_card(0));
    let mut alloc = InstanceAllocator::new(SessionId::new());
    let mut deck =
        SessionDeck::new((0..200).map(|_| alloc.spawn(Arc::clone(&template))).collect());
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let held = HashSet::new();
    let request = DrawRequest {
        count: 3,
        state: EmotionalState::Open,
        depth_gate: 10,
        category: None,
        goal_priority: true,
        held: &held,
    };

    c.bench_function("deck_draw_3_from_200", |b| {
        b.iter(|| black_box(deck.draw(black_box(&request), &mut rng)));
    });
}

criterion_group!(
    benches,
    bench_session_start,
    bench_listen,
    bench_listen_speak_round,
    bench_deck_draw,
);
criterion_main!(benches);
