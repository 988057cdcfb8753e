use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use schemars::gen::SchemaSettings;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: ChatRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }
}

/// Named JSON Schema the backend must answer with.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResponseSchema {
    pub name: String,
    pub schema: Value,
}

impl ResponseSchema {
    pub fn of<T: JsonSchema>(name: impl Into<String>) -> Self {
        // Inline subschemas; several backends reject `$ref`.
        let settings = SchemaSettings::draft07().with(|s| {
            s.inline_subschemas = true;
        });
        let schema = settings.into_generator().into_root_schema_for::<T>();

        Self { name: name.into(), schema: serde_json::to_value(schema).unwrap_or_default() }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub schema: ResponseSchema,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CompletionError {
    #[error("completion backend unavailable: {0}")]
    BackendUnavailable(String),
    #[error("completion did not match schema: {0}")]
    Schema(String),
}

impl CompletionError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BackendUnavailable(_) => "backend_unavailable",
            Self::Schema(_) => "schema",
        }
    }
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<Value, CompletionError>;
}

/// Runs a completion and decodes the answer into `T`.
pub async fn complete_as<T>(
    client: &dyn CompletionClient,
    request: CompletionRequest,
) -> Result<T, CompletionError>
where
    T: DeserializeOwned,
{
    let schema_name = request.schema.name.clone();
    let value = client.complete(request).await?;
    serde_json::from_value(value)
        .map_err(|error| CompletionError::Schema(format!("{schema_name}: {error}")))
}

/// In-memory client answering from canned replies keyed by schema name.
///
/// Replies for a schema are consumed in order; the last one is repeated once the queue is
/// down to a single entry. A schema with no replies answers `BackendUnavailable`.
#[derive(Clone, Default)]
pub struct ScriptedCompletionClient {
    replies: Arc<Mutex<BTreeMap<String, VecDeque<Result<Value, CompletionError>>>>>,
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl ScriptedCompletionClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(self, schema_name: impl Into<String>, reply: Value) -> Self {
        self.push(schema_name.into(), Ok(reply));
        self
    }

    pub fn with_failure(self, schema_name: impl Into<String>, error: CompletionError) -> Self {
        self.push(schema_name.into(), Err(error));
        self
    }

    pub fn calls(&self) -> Vec<CompletionRequest> {
        match self.calls.lock() {
            Ok(calls) => calls.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls().len()
    }

    fn push(&self, schema_name: String, reply: Result<Value, CompletionError>) {
        let mut replies = match self.replies.lock() {
            Ok(replies) => replies,
            Err(poisoned) => poisoned.into_inner(),
        };
        replies.entry(schema_name).or_default().push_back(reply);
    }

    fn next_reply(&self, schema_name: &str) -> Result<Value, CompletionError> {
        let mut replies = match self.replies.lock() {
            Ok(replies) => replies,
            Err(poisoned) => poisoned.into_inner(),
        };
        let Some(queue) = replies.get_mut(schema_name) else {
            return Err(CompletionError::BackendUnavailable(format!(
                "no scripted reply for `{schema_name}`"
            )));
        };
        let reply = if queue.len() > 1 { queue.pop_front() } else { queue.front().cloned() };
        reply.unwrap_or_else(|| {
            Err(CompletionError::BackendUnavailable(format!(
                "no scripted reply for `{schema_name}`"
            )))
        })
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletionClient {
    async fn complete(&self, request: CompletionRequest) -> Result<Value, CompletionError> {
        let reply = self.next_reply(&request.schema.name);
        match self.calls.lock() {
            Ok(mut calls) => calls.push(request),
            Err(poisoned) => poisoned.into_inner().push(request),
        }
        reply
    }
}
