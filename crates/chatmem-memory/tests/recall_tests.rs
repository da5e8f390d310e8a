// SPDX-FileCopyrightText: 2026 Chatmem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end recall, cascade deletion, and pagination through the memory facade.

use std::collections::HashSet;
use std::sync::Arc;

use chatmem_core::{Role, SearchFilter, SimilarityIndex, TurnStore};
use chatmem_memory::{ConversationMemory, ListQuery, Listing};
use chatmem_test_utils::{in_memory_backends, HashingEmbedder};

struct Fixture {
    memory: Arc<ConversationMemory>,
    store: Arc<dyn TurnStore>,
    index: Arc<dyn SimilarityIndex>,
}

async fn fixture() -> Fixture {
    let (store, index) = in_memory_backends().await.unwrap();
    let memory = ConversationMemory::builder()
        .with_store(store.clone())
        .with_index(index.clone())
        .with_embedder(Arc::new(HashingEmbedder::new()))
        .build()
        .unwrap();
    Fixture {
        memory: Arc::new(memory),
        store,
        index,
    }
}

async fn page(memory: &ConversationMemory, session: &str, query: ListQuery) -> Vec<String> {
    match memory.list_messages(session, &query).await.unwrap() {
        Listing::Page(turns) => turns.into_iter().map(|t| t.message_id).collect(),
        Listing::Count(_) => panic!("expected a page"),
    }
}

#[tokio::test]
async fn recall_finds_brazil_capital() {
    let f = fixture().await;
    let exchanges = [
        ("Hi, how are you?", "I'm fine, thanks for asking."),
        ("What's your favourite colour?", "I like blue."),
        ("Can you recommend a book?", "Try Dom Casmurro by Machado de Assis."),
        ("What is the largest ocean?", "The Pacific Ocean is the largest."),
        ("How many legs does a spider have?", "A spider has eight legs."),
        ("Which language is spoken in Brazil?", "Portuguese is spoken in Brazil."),
        ("What is the tallest mountain?", "Mount Everest is the tallest mountain."),
        ("What is the capital of Brazil?", "The capital of Brazil is Brasília."),
    ];

    let mut session = None;
    for (question, answer) in exchanges {
        let receipt = f
            .memory
            .record(question, answer, session.as_deref())
            .await
            .unwrap();
        session = Some(receipt.session_id);
    }
    let session = session.unwrap();

    let recollection = f.memory.recall(&session, "capital of Brazil?").await.unwrap();
    assert!(
        recollection.suggested_text.to_lowercase().contains("brasília"),
        "{}",
        recollection.suggested_text
    );
    assert_eq!(recollection.recent.len(), 4);
}

#[tokio::test]
async fn recall_stays_inside_session() {
    let f = fixture().await;
    f.memory
        .record("What is the capital of Italy?", "The capital of Italy is Rome.", Some("italy"))
        .await
        .unwrap();
    f.memory
        .record("Tell me about the Colosseum.", "It is an amphitheatre in Rome.", Some("italy"))
        .await
        .unwrap();
    f.memory
        .record(
            "What is the capital of Germany?",
            "The capital of Germany is Berlin.",
            Some("germany"),
        )
        .await
        .unwrap();

    let recollection = f.memory.recall_with("italy", "capital of Italy", 0).await.unwrap();
    assert!(!recollection.context.is_empty());
    assert!(!recollection.suggested_text.to_lowercase().contains("berlin"));
    assert!(recollection.context.iter().all(|h| h.chunk.session_id == "italy"));
}

#[tokio::test]
async fn context_excludes_recency_window() {
    let f = fixture().await;
    let s = Some("s1");
    let old = f
        .memory
        .record("What is the capital of France?", "The capital of France is Paris.", s)
        .await
        .unwrap();
    f.memory.record("How do I bake bread?", "Mix flour, water and yeast.", s).await.unwrap();
    f.memory.record("Do you like music?", "Jazz is my favourite.", s).await.unwrap();

    let recollection = f.memory.recall_with("s1", "capital of France", 4).await.unwrap();
    let recent: HashSet<&str> = recollection.recent.iter().map(|t| t.message_id.as_str()).collect();
    assert_eq!(recent.len(), 4);
    assert!(!recollection.context.is_empty());
    for hit in &recollection.context {
        assert!(!recent.contains(hit.chunk.message_id.as_str()));
        assert!(hit.chunk.message_id == old.question_id || hit.chunk.message_id == old.answer_id);
    }
    assert!(recollection.suggested_text.contains("Previous context ("));
    assert!(recollection.suggested_text.contains("Paris"));
    assert!(recollection.suggested_text.ends_with("Previous answer: Jazz is my favourite."));

    // Every turn inside the window: nothing left for context.
    let all = f.memory.recall_with("s1", "capital of France", 6).await.unwrap();
    assert!(all.context.is_empty());
}

#[tokio::test]
async fn forget_message_cascades_to_chunks() {
    let f = fixture().await;
    let s = Some("s1");
    let paris = f
        .memory
        .record("What is the capital of France?", "The capital of France is Paris.", s)
        .await
        .unwrap();
    f.memory.record("How do I bake bread?", "Mix flour, water and yeast.", s).await.unwrap();

    assert!(f.memory.forget_message("s1", &paris.answer_id).await.unwrap());
    // Idempotent.
    assert!(!f.memory.forget_message("s1", &paris.answer_id).await.unwrap());
    assert!(!f.memory.forget_message("s1", "no-such-message").await.unwrap());

    let recollection = f.memory.recall_with("s1", "capital of France Paris", 0).await.unwrap();
    assert!(recollection
        .context
        .iter()
        .all(|h| h.chunk.message_id != paris.answer_id));

    let listed = page(&f.memory, "s1", ListQuery::default()).await;
    assert_eq!(listed.len(), 3);
    assert!(!listed.contains(&paris.answer_id));
}

#[tokio::test]
async fn forget_session_cascades_to_index() {
    let f = fixture().await;
    f.memory.record("q1 about cats", "a1 about cats", Some("gone")).await.unwrap();
    f.memory.record("q2 about dogs", "a2 about dogs", Some("gone")).await.unwrap();
    f.memory.record("q3 about birds", "a3 about birds", Some("kept")).await.unwrap();

    assert_eq!(f.memory.forget_session("gone").await.unwrap(), 4);
    assert_eq!(f.memory.forget_session("gone").await.unwrap(), 0);

    assert_eq!(f.store.count("gone").await.unwrap(), 0);
    let hits = f
        .index
        .search(&vec![1.0; 256], &SearchFilter::session("gone"), 10)
        .await
        .unwrap();
    assert!(hits.is_empty());

    assert_eq!(f.store.count("kept").await.unwrap(), 2);
    assert!(!f
        .index
        .matching_ids(&SearchFilter::session("kept"))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn pages_cover_the_session_without_overlap() {
    let f = fixture().await;
    for i in 0..5 {
        f.memory
            .record(&format!("question {i}"), &format!("answer {i}"), Some("s1"))
            .await
            .unwrap();
    }

    let count = f
        .memory
        .list_messages("s1", &ListQuery { count: true, ..ListQuery::default() })
        .await
        .unwrap();
    assert_eq!(count, Listing::Count(10));

    for recent_first in [true, false] {
        let mut seen = Vec::new();
        for p in 1..=4 {
            let ids = page(
                &f.memory,
                "s1",
                ListQuery {
                    page: p,
                    limit: 3,
                    recent_first,
                    count: false,
                },
            )
            .await;
            assert!(ids.len() <= 3);
            assert!(ids.iter().all(|id| !seen.contains(id)));
            seen.extend(ids);
        }
        assert_eq!(seen.len(), 10);

        let chronological = f.memory.last_turns("s1", 10, recent_first).await.unwrap();
        let expected: Vec<String> = chronological.into_iter().map(|t| t.message_id).collect();
        assert_eq!(seen, expected);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_records_keep_exchanges_adjacent() {
    let f = fixture().await;
    let mut handles = Vec::new();
    for i in 0..12 {
        let memory = f.memory.clone();
        handles.push(tokio::spawn(async move {
            memory
                .record(&format!("question {i}"), &format!("answer {i}"), Some("busy"))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let turns = f.memory.last_turns("busy", 24, false).await.unwrap();
    assert_eq!(turns.len(), 24);
    for pair in turns.chunks(2) {
        assert_eq!(pair[0].role, Role::Question);
        assert_eq!(pair[1].role, Role::Answer);
        let n = pair[0].text.trim_start_matches("question ");
        assert_eq!(pair[1].text, format!("answer {n}"));
        assert!(pair[0].timestamp < pair[1].timestamp);
    }
    for window in turns.windows(2) {
        assert!(window[0].timestamp <= window[1].timestamp);
    }
}

#[tokio::test]
async fn concurrent_records_are_all_persisted() {
    let f = fixture().await;
    let mut handles = Vec::new();
    for i in 0..8 {
        let memory = f.memory.clone();
        handles.push(tokio::spawn(async move {
            memory
                .record(&format!("question {i}"), &format!("answer {i}"), Some("shared"))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(f.store.count("shared").await.unwrap(), 16);
    assert_eq!(
        f.index
            .matching_ids(&SearchFilter::session("shared"))
            .await
            .unwrap()
            .len(),
        16
    );
}
