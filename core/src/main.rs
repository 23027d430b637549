/// msgstore - replay a raw message feed through the store
use anyhow::Context;
use colored::*;
use msgstore_core::collaborators::{
    Collaborators, PmConversations, RecentSendersIndex, StreamTopicHistory,
};
use msgstore_core::types::Conversation;
use msgstore_core::{MessageStore, People, RawMessage, StoreConfig};
use std::cell::RefCell;
use std::env;
use std::io::{BufRead, BufReader};
use std::rc::Rc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse configuration
    let args: Vec<String> = env::args().collect();
    let config = StoreConfig::from_args(&args)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

    let people = People::from_file(&config.people_path, config.current_user_id)
        .with_context(|| format!("loading people from {:?}", config.people_path))?;

    let topics = Rc::new(RefCell::new(StreamTopicHistory::default()));
    let senders = Rc::new(RefCell::new(RecentSendersIndex::default()));
    let partners = Rc::new(RefCell::new(PmConversations::default()));
    let mut store = MessageStore::new(
        people,
        Collaborators::new(topics.clone(), senders, partners.clone()),
    );

    let file = std::fs::File::open(&config.messages_path)
        .with_context(|| format!("opening {:?}", config.messages_path))?;

    let mut rejected = 0usize;
    for (lineno, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let raw: RawMessage = serde_json::from_str(&line)
            .with_context(|| format!("line {}: malformed message", lineno + 1))?;

        match store.process_new_message(raw) {
            Ok(message) if config.json_output => {
                println!("{}", serde_json::to_string(&*message.borrow())?);
            }
            Ok(_) => {}
            Err(e) => {
                warn!("line {}: {}", lineno + 1, e);
                rejected += 1;
            }
        }
    }

    info!(
        "Stored {} messages ({} rejected)",
        store.len(),
        rejected
    );

    if !config.json_output {
        print_summary(&store, &topics.borrow(), &partners.borrow());
    }

    Ok(())
}

fn print_summary(store: &MessageStore, topics: &StreamTopicHistory, partners: &PmConversations) {
    let mut streams: Vec<(u64, String)> = store
        .all_messages()
        .iter()
        .filter_map(|m| {
            let m = m.borrow();
            let entry = match &m.conversation {
                Conversation::Stream {
                    stream_id: Some(stream_id),
                    stream,
                    ..
                } => Some((*stream_id, stream.clone())),
                _ => None,
            };
            entry
        })
        .collect();
    streams.sort();
    streams.dedup_by_key(|(id, _)| *id);

    println!("{}", "Channels:".bright_white().bold());
    for (stream_id, name) in streams {
        let ids = store.get_message_ids_in_stream(stream_id);
        println!(
            "  {} {} ({} messages)",
            format!("#{}", name).cyan(),
            format!("[{}]", stream_id).dimmed(),
            ids.len()
        );
        for topic in topics.get_recent_topic_names(stream_id) {
            println!("    {} {}", "-".dimmed(), topic);
        }
    }

    println!("{}", "Private conversations:".bright_white().bold());
    for (user_ids, last_id) in partners.recent() {
        println!(
            "  {} last message {}",
            user_ids.cyan(),
            last_id.to_string().yellow()
        );
    }

    let unread = store
        .all_messages()
        .iter()
        .filter(|m| m.borrow().unread)
        .count();
    let mentions = store
        .all_messages()
        .iter()
        .filter(|m| m.borrow().booleans.mentioned)
        .count();
    println!(
        "{} {} unread, {} mentioning you",
        "✓".green().bold(),
        unread.to_string().cyan(),
        mentions.to_string().cyan()
    );
}
