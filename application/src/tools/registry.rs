//! Tool Registry
//!
//! The ordered set of [`DomainTool`]s owned by one agent. Names are unique;
//! schemas are exposed to the LLM in registration order.

use super::domain_tool::DomainTool;
use crate::agents::RegistryError;
use agentry_domain::ToolSchema;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<DomainTool>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry, rejecting duplicate names.
    pub fn from_tools(tools: impl IntoIterator<Item = DomainTool>) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for tool in tools {
            registry.register(tool)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, tool: DomainTool) -> Result<(), RegistryError> {
        if self.index.contains_key(&tool.name) {
            return Err(RegistryError::DuplicateTool(tool.name));
        }
        self.index.insert(tool.name.clone(), self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&DomainTool> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.iter().map(|t| t.name.as_str())
    }

    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools.iter().map(DomainTool::schema).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FnTool;

    #[test]
    fn test_registration_order_and_lookup() {
        let registry = ToolRegistry::from_tools([
            DomainTool::new("search", "Search", FnTool::ok("")),
            DomainTool::new("create_event", "Create", FnTool::ok("")).requiring_approval(),
        ])
        .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["search", "create_event"]);
        assert!(registry.get("create_event").unwrap().needs_approval);
        assert!(registry.get("delete_universe").is_none());
        assert_eq!(registry.schemas()[0].name, "search");
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = ToolRegistry::from_tools([
            DomainTool::new("search", "a", FnTool::ok("")),
            DomainTool::new("search", "b", FnTool::ok("")),
        ])
        .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateTool(name) if name == "search"));
    }
}
