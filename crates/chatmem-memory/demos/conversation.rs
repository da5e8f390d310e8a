// SPDX-FileCopyrightText: 2026 Chatmem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Records a short conversation and prints what memory recalls for a new prompt.
//!
//! ```text
//! cargo run -p chatmem-memory --example conversation            # configured backends
//! cargo run -p chatmem-memory --example conversation -- --mock  # in-memory, no model download
//! ```

use std::sync::Arc;

use chatmem_config::model::ChatmemConfig;
use chatmem_core::ChatmemError;
use chatmem_memory::{ConversationMemory, ListQuery, Listing};
use chatmem_test_utils::{in_memory_backends, HashingEmbedder};

const EXCHANGES: &[(&str, &str)] = &[
    ("Hi! I'm planning a trip to South America.", "Great, where would you like to go?"),
    ("Which language is spoken in Brazil?", "Portuguese is the official language of Brazil."),
    ("Do I need a visa?", "It depends on your nationality; check the consulate's website."),
    ("What is the capital of Brazil?", "The capital of Brazil is Brasília."),
    ("Any tips for Rio de Janeiro?", "Visit Sugarloaf Mountain early to avoid the queues."),
    ("What about food?", "Try feijoada, a black bean stew with pork."),
];

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("chatmem={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

async fn build(config: &ChatmemConfig, mock: bool) -> Result<ConversationMemory, ChatmemError> {
    if !mock {
        return ConversationMemory::from_config(config).await;
    }
    let (store, index) = in_memory_backends().await?;
    ConversationMemory::builder()
        .with_config(config.clone())
        .with_store(store)
        .with_index(index)
        .with_embedder(Arc::new(HashingEmbedder::new()))
        .build()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match chatmem_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            chatmem_config::render_errors(&errors);
            std::process::exit(1);
        }
    };
    init_tracing(&config.logging.level);

    let mock = std::env::args().any(|a| a == "--mock");
    let memory = build(&config, mock).await?;

    let mut session = None;
    for (question, answer) in EXCHANGES {
        let receipt = memory.record(question, answer, session.as_deref()).await?;
        session = Some(receipt.session_id);
    }
    let session = session.unwrap_or_default();

    if let Listing::Count(n) = memory
        .list_messages(&session, &ListQuery { count: true, ..ListQuery::default() })
        .await?
    {
        println!("session {session}: {n} turns stored\n");
    }

    let prompt = "Remind me, what's the capital city?";
    let recollection = memory.recall(&session, prompt).await?;
    println!("{}\n\nNew prompt: {prompt}", recollection.suggested_text);

    for (name, status) in memory.health().await {
        println!("[health] {name}: {status:?}");
    }

    memory.forget_session(&session).await?;
    Ok(())
}
