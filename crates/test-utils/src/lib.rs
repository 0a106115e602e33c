//! # Shared Test Utilities
//!
//! A scripted stand-in for the generation service plus small fixture helpers.

use anyhow::Result;
use async_trait::async_trait;
use knowbatch::{errors::PromptError, providers::ai::AiProvider};
use std::collections::VecDeque;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// One scripted reply: either text or a service failure.
#[derive(Clone, Debug)]
pub enum MockReply {
    Text(String),
    Failure(String),
}

// --- Mock AI Provider ---

/// Replays queued replies in order and records every prompt it receives.
///
/// Once the queue is empty it answers with an empty string, which the reply
/// parser turns into all-default records.
#[derive(Clone, Debug, Default)]
pub struct MockAiProvider {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockAiProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a provider that answers with `replies`, one per call.
    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let provider = Self::new();
        for reply in replies {
            provider.push_reply(reply);
        }
        provider
    }

    pub fn push_reply(&self, reply: impl Into<String>) {
        self.replies
            .lock()
            .unwrap()
            .push_back(MockReply::Text(reply.into()));
    }

    /// Queues a failing call.
    pub fn push_failure(&self, message: impl Into<String>) {
        self.replies
            .lock()
            .unwrap()
            .push_back(MockReply::Failure(message.into()));
    }

    /// Prompts received so far, in call order.
    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate(&self, prompt: &str) -> Result<String, PromptError> {
        self.calls.lock().unwrap().push(prompt.to_string());
        match self.replies.lock().unwrap().pop_front() {
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Failure(message)) => Err(PromptError::AiApi(message)),
            None => Ok(String::new()),
        }
    }
}

// --- Fixture Helpers ---

/// Writes `content` to `dir/name` and returns the path.
pub fn write_fixture(dir: &Path, name: &str, content: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    std::fs::write(&path, content)?;
    Ok(path)
}

/// A `knowledge_term` CSV with one row per term plus a `note` column.
pub fn terms_csv(terms: &[&str]) -> String {
    let mut csv = String::from("knowledge_term,note\n");
    for (i, term) in terms.iter().enumerate() {
        csv.push_str(&format!("{term},row{i}\n"));
    }
    csv
}

/// A well-formed reply with one JSON object per definition, joined by `delimiter`.
pub fn delimited_reply(definitions: &[&str], delimiter: &str) -> String {
    definitions
        .iter()
        .map(|d| format!("{{\"definition\": \"{d}\"}}"))
        .collect::<Vec<_>>()
        .join(&format!("\n{delimiter}\n"))
}
