//! The `notes` demo agent: lists and saves short notes in a JSON file.
//!
//! `save_note` writes to disk, so it sits behind the approval gate.

use agentry_application::{
    AgentBuildContext, AgentDescriptor, AgentFactory, AgentHandler, AgentRegistry, DomainAgent,
    DomainTool, DomainToolContext, ReactController, RegistryError, ToolHandler, ToolRegistry,
};
use agentry_domain::ToolError;
use agentry_domain::tool::require_str;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

pub const AGENT_NAME: &str = "notes";

const SYSTEM_PROMPT: &str = "You keep the user's notes. Use list_notes to look \
    notes up and save_note to store a new one. Keep titles short. When you are \
    done, answer in one or two sentences.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub title: String,
    pub body: String,
}

/// Notes persisted as a JSON array.
#[derive(Debug, Clone)]
pub struct NoteBook {
    path: PathBuf,
}

impl NoteBook {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub async fn load(&self) -> Result<Vec<Note>, ToolError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| ToolError::execution_failed(format!("notes file is corrupt: {}", e))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(ToolError::execution_failed(e.to_string())),
        }
    }

    pub async fn append(&self, note: Note) -> Result<usize, ToolError> {
        let mut notes = self.load().await?;
        notes.push(note);
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ToolError::execution_failed(e.to_string()))?;
        }
        let body = serde_json::to_vec_pretty(&notes)
            .map_err(|e| ToolError::execution_failed(e.to_string()))?;
        tokio::fs::write(&self.path, body)
            .await
            .map_err(|e| ToolError::execution_failed(e.to_string()))?;
        Ok(notes.len())
    }
}

struct ListNotes {
    book: Arc<NoteBook>,
}

#[async_trait]
impl ToolHandler for ListNotes {
    async fn execute(
        &self,
        args: &Map<String, Value>,
        _ctx: &DomainToolContext,
    ) -> Result<String, ToolError> {
        let query = args
            .get("query")
            .and_then(Value::as_str)
            .map(str::to_lowercase);
        let notes = self.book.load().await?;
        let lines: Vec<String> = notes
            .iter()
            .filter(|n| match &query {
                Some(q) => {
                    n.title.to_lowercase().contains(q.as_str())
                        || n.body.to_lowercase().contains(q.as_str())
                }
                None => true,
            })
            .map(|n| format!("- {}: {}", n.title, n.body))
            .collect();
        if lines.is_empty() {
            Ok("No notes found.".to_string())
        } else {
            Ok(lines.join("\n"))
        }
    }
}

struct SaveNote {
    book: Arc<NoteBook>,
}

#[async_trait]
impl ToolHandler for SaveNote {
    async fn execute(
        &self,
        args: &Map<String, Value>,
        _ctx: &DomainToolContext,
    ) -> Result<String, ToolError> {
        let title = require_str(args, "title")?.trim();
        if title.is_empty() {
            return Err(ToolError::invalid_argument("title cannot be empty"));
        }
        let body = args.get("body").and_then(Value::as_str).unwrap_or_default();
        let count = self
            .book
            .append(Note {
                title: title.to_string(),
                body: body.to_string(),
            })
            .await?;
        Ok(format!("Saved note '{}' ({} notes total).", title, count))
    }

    async fn preview(
        &self,
        args: &Map<String, Value>,
        _ctx: &DomainToolContext,
    ) -> Option<Result<String, ToolError>> {
        let preview = require_str(args, "title").map(|title| {
            let body = args.get("body").and_then(Value::as_str).unwrap_or_default();
            format!("Save a note titled '{}'?\n\n{}\n\nReply yes or no.", title, body)
        });
        Some(preview)
    }
}

fn tools(book: Arc<NoteBook>) -> Result<ToolRegistry, RegistryError> {
    ToolRegistry::from_tools([
        DomainTool::new(
            "list_notes",
            "List saved notes, optionally filtered by a search term",
            ListNotes { book: book.clone() },
        )
        .with_parameters(json!({
            "type": "object",
            "properties": {
                "query": {"type": "string", "description": "Case-insensitive filter"}
            }
        })),
        DomainTool::new("save_note", "Save a new note", SaveNote { book })
            .with_parameters(json!({
                "type": "object",
                "properties": {
                    "title": {"type": "string"},
                    "body": {"type": "string"}
                },
                "required": ["title"]
            }))
            .requiring_approval(),
    ])
}

/// Register the `notes` agent type, backed by the notes file at `notes_path`.
pub fn register(registry: &mut AgentRegistry, notes_path: PathBuf) -> Result<(), RegistryError> {
    let book = Arc::new(NoteBook::new(notes_path));
    let descriptor = AgentDescriptor::new(AGENT_NAME, "Keeps short notes")
        .with_capabilities(&["list notes", "save notes"])
        .with_triggers(&["note", "remember", "jot"]);

    let factory: AgentFactory = Arc::new(move |ctx: &AgentBuildContext| {
        let mut controller = ReactController::new(
            Arc::new(tools(book.clone())?),
            ctx.tool_context.clone(),
            SYSTEM_PROMPT,
        )
        .with_params(ctx.params.clone())
        .with_logger(ctx.logger.clone());
        if let Some(token) = &ctx.cancellation_token {
            controller = controller.with_cancellation(token.clone());
        }
        Ok(Box::new(DomainAgent::new(controller)) as Box<dyn AgentHandler>)
    });
    registry.register(descriptor, factory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentry_application::{LlmClient, LlmError};
    use agentry_domain::{AgentStatus, ChatMessage, LlmResponse, ToolCall, ToolChoice, ToolSchema};
    use agentry_infrastructure::KeywordApprovalParser;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct Replay(Mutex<VecDeque<LlmResponse>>);

    #[async_trait]
    impl LlmClient for Replay {
        async fn chat_completion(
            &self,
            _messages: &[ChatMessage],
            _tools: Option<&[ToolSchema]>,
            _tool_choice: ToolChoice,
        ) -> Result<LlmResponse, LlmError> {
            self.0
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| LlmError::Other("script exhausted".to_string()))
        }
    }

    fn build_ctx(responses: Vec<LlmResponse>) -> AgentBuildContext {
        let llm = Arc::new(Replay(Mutex::new(responses.into())));
        AgentBuildContext::new(
            Arc::new(DomainToolContext::new(llm, "local")),
            Arc::new(KeywordApprovalParser::new().unwrap()),
        )
    }

    #[tokio::test]
    async fn test_notebook_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let book = NoteBook::new(dir.path().join("nested/notes.json"));
        assert!(book.load().await.unwrap().is_empty());

        book.append(Note { title: "a".into(), body: "b".into() }).await.unwrap();
        let count = book.append(Note { title: "c".into(), body: "d".into() }).await.unwrap();
        assert_eq!(count, 2);
        assert_eq!(book.load().await.unwrap()[1].title, "c");
    }

    #[tokio::test]
    async fn test_save_waits_for_approval_then_writes() {
        let dir = tempfile::tempdir().unwrap();
        let notes_path = dir.path().join("notes.json");
        let mut registry = AgentRegistry::new();
        register(&mut registry, notes_path.clone()).unwrap();

        let ctx = build_ctx(vec![
            LlmResponse::with_tool_calls(vec![ToolCall::new(
                "c1",
                "save_note",
                json!({"title": "Milk", "body": "buy oat milk"}),
            )]),
            LlmResponse::from_text("Saved your note about milk."),
        ]);
        let mut agent = registry.create(AGENT_NAME, &ctx).unwrap();

        let r = agent.handle_message("note: buy oat milk").await;
        assert_eq!(r.status, AgentStatus::WaitingForApproval);
        assert!(r.raw_message.starts_with("Save a note titled 'Milk'?"));
        assert!(!notes_path.exists());

        let r = agent.handle_message("yes please").await;
        assert_eq!(r.status, AgentStatus::Completed);
        assert_eq!(r.raw_message, "Saved your note about milk.");

        let saved = NoteBook::new(&notes_path).load().await.unwrap();
        assert_eq!(saved, vec![Note { title: "Milk".into(), body: "buy oat milk".into() }]);
    }

    #[tokio::test]
    async fn test_rejected_save_leaves_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let notes_path = dir.path().join("notes.json");
        let mut registry = AgentRegistry::new();
        register(&mut registry, notes_path.clone()).unwrap();

        let ctx = build_ctx(vec![LlmResponse::with_tool_calls(vec![ToolCall::new(
            "c1",
            "save_note",
            json!({"title": "Milk"}),
        )])]);
        let mut agent = registry.create(AGENT_NAME, &ctx).unwrap();

        agent.handle_message("remember milk").await;
        let r = agent.handle_message("no").await;

        assert_eq!(r.status, AgentStatus::Cancelled);
        assert!(!notes_path.exists());
    }

    #[tokio::test]
    async fn test_list_filters_by_query() {
        let dir = tempfile::tempdir().unwrap();
        let book = Arc::new(NoteBook::new(dir.path().join("notes.json")));
        book.append(Note { title: "Milk".into(), body: "oat".into() }).await.unwrap();
        book.append(Note { title: "Call".into(), body: "dentist".into() }).await.unwrap();

        let ctx = build_ctx(vec![]);
        let list = ListNotes { book };
        let args = json!({"query": "DENT"}).as_object().cloned().unwrap();
        let out = list.execute(&args, &ctx.tool_context).await.unwrap();
        assert_eq!(out, "- Call: dentist");
    }
}
