//! One conversation turn against a persisted agent instance.

use agentry_application::{AgentBuildContext, AgentInstance, AgentRegistry, SnapshotStore};
use agentry_domain::AgentResult;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

/// Out-of-band commands addressed to the instance rather than the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Pause,
    Resume,
    Cancel,
}

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "/pause" => Some(Command::Pause),
            "/resume" => Some(Command::Resume),
            "/cancel" => Some(Command::Cancel),
            _ => None,
        }
    }
}

/// Loads, drives and stores the agent of a single session id.
pub struct SessionRunner {
    registry: Arc<AgentRegistry>,
    ctx: AgentBuildContext,
    store: Arc<dyn SnapshotStore>,
    session_id: String,
    default_agent: String,
}

impl SessionRunner {
    pub fn new(
        registry: Arc<AgentRegistry>,
        ctx: AgentBuildContext,
        store: Arc<dyn SnapshotStore>,
        session_id: impl Into<String>,
        default_agent: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            ctx,
            store,
            session_id: session_id.into(),
            default_agent: default_agent.into(),
        }
    }

    /// Deliver one inbound line and persist the resulting state.
    pub async fn send(&self, line: &str) -> Result<AgentResult> {
        if let Some(command) = Command::parse(line) {
            return self.command(command).await;
        }

        let mut agent = match self.load().await? {
            Some(agent) => agent,
            None => self.create(line)?,
        };
        let result = agent.handle_message(line).await;
        self.persist(&agent, &result).await?;
        Ok(result)
    }

    async fn command(&self, command: Command) -> Result<AgentResult> {
        let Some(mut agent) = self.load().await? else {
            return Ok(AgentResult::error("No active agent in this session."));
        };
        let result = match command {
            Command::Pause => agent.pause(),
            Command::Resume => agent
                .unpause()
                .map(|status| AgentResult::new(status, format!("Resumed ({}).", status))),
            Command::Cancel => agent.cancel(),
        };
        let result = match result {
            Ok(result) => result,
            Err(e) => return Ok(AgentResult::error(e.to_string())),
        };
        self.persist(&agent, &result).await?;
        Ok(result)
    }

    async fn load(&self) -> Result<Option<AgentInstance>> {
        let Some(snapshot) = self
            .store
            .load(&self.session_id)
            .await
            .with_context(|| format!("Failed to load session '{}'", self.session_id))?
        else {
            return Ok(None);
        };
        debug!(session = %self.session_id, agent_type = %snapshot.agent_type, "Restoring agent");
        Ok(Some(self.registry.restore(snapshot, &self.ctx)?))
    }

    fn create(&self, line: &str) -> Result<AgentInstance> {
        let name = self
            .registry
            .route(line)
            .map(|d| d.name.clone())
            .unwrap_or_else(|| self.default_agent.clone());
        info!(session = %self.session_id, agent_type = %name, "Starting agent");
        Ok(self.registry.create(&name, &self.ctx)?)
    }

    async fn persist(&self, agent: &AgentInstance, result: &AgentResult) -> Result<()> {
        if result.is_terminal() {
            self.store.delete(&self.session_id).await?;
        } else {
            self.store.save(&self.session_id, &agent.snapshot()).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes;
    use agentry_application::{DomainToolContext, InMemorySnapshotStore, LlmClient, LlmError};
    use agentry_domain::{
        AgentStatus, ChatMessage, LlmResponse, ToolCall, ToolChoice, ToolSchema,
    };
    use agentry_infrastructure::KeywordApprovalParser;
    use async_trait::async_trait;
    use serde_json::json;
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

    fn runner(
        dir: &std::path::Path,
        responses: Vec<LlmResponse>,
    ) -> (SessionRunner, Arc<InMemorySnapshotStore>) {
        let mut registry = AgentRegistry::new();
        notes::register(&mut registry, dir.join("notes.json")).unwrap();
        let llm = Arc::new(Replay(Mutex::new(responses.into())));
        let ctx = AgentBuildContext::new(
            Arc::new(DomainToolContext::new(llm, "local")),
            Arc::new(KeywordApprovalParser::new().unwrap()),
        );
        let store = Arc::new(InMemorySnapshotStore::new());
        let runner = SessionRunner::new(
            Arc::new(registry),
            ctx,
            store.clone(),
            "s1",
            notes::AGENT_NAME,
        );
        (runner, store)
    }

    fn save_call() -> LlmResponse {
        LlmResponse::with_tool_calls(vec![ToolCall::new(
            "c1",
            "save_note",
            json!({"title": "Milk", "body": "oat"}),
        )])
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(Command::parse(" /pause "), Some(Command::Pause));
        assert_eq!(Command::parse("/resume"), Some(Command::Resume));
        assert_eq!(Command::parse("/cancel"), Some(Command::Cancel));
        assert_eq!(Command::parse("pause"), None);
    }

    #[tokio::test]
    async fn test_approval_survives_between_turns() {
        let dir = tempfile::tempdir().unwrap();
        let (runner, store) = runner(
            dir.path(),
            vec![save_call(), LlmResponse::from_text("Done.")],
        );

        let r = runner.send("remember to buy milk").await.unwrap();
        assert_eq!(r.status, AgentStatus::WaitingForApproval);
        assert_eq!(store.len(), 1);

        let r = runner.send("yes").await.unwrap();
        assert_eq!(r.status, AgentStatus::Completed);
        assert_eq!(r.raw_message, "Done.");
        assert!(store.is_empty());
        assert!(dir.path().join("notes.json").exists());
    }

    #[tokio::test]
    async fn test_pause_blocks_until_resume() {
        let dir = tempfile::tempdir().unwrap();
        let (runner, _store) = runner(
            dir.path(),
            vec![save_call(), LlmResponse::from_text("Done.")],
        );

        runner.send("note milk").await.unwrap();
        let r = runner.send("/pause").await.unwrap();
        assert_eq!(r.status, AgentStatus::Paused);

        let r = runner.send("yes").await.unwrap();
        assert_eq!(r.status, AgentStatus::Paused);
        assert!(!dir.path().join("notes.json").exists());

        let r = runner.send("/resume").await.unwrap();
        assert_eq!(r.status, AgentStatus::WaitingForApproval);

        let r = runner.send("yes").await.unwrap();
        assert_eq!(r.status, AgentStatus::Completed);
    }

    #[tokio::test]
    async fn test_cancel_clears_session() {
        let dir = tempfile::tempdir().unwrap();
        let (runner, store) = runner(dir.path(), vec![save_call()]);

        runner.send("note milk").await.unwrap();
        let r = runner.send("/cancel").await.unwrap();
        assert_eq!(r.status, AgentStatus::Cancelled);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_command_without_session() {
        let dir = tempfile::tempdir().unwrap();
        let (runner, _store) = runner(dir.path(), vec![]);

        let r = runner.send("/pause").await.unwrap();
        assert_eq!(r.status, AgentStatus::Error);
    }
}
