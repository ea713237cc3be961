//! Tool capabilities and the registry that names them.
//!
//! Tools are what give the agent the ability to act: look up a company,
//! search the web, format a briefing. Each tool is one of two closed
//! capability kinds:
//!
//! - [`ScalarCapability`] — takes a single string
//! - [`StructuredCapability`] — takes a keyed mapping and declares its
//!   fields (accepted key names, defaults) up front
//!
//! The kind decides the tool's [`ArgumentMode`] at registration time, so a
//! descriptor can never disagree with the capability behind it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::ToolError;

/// Decoded arguments for a structured tool.
pub type ParsedArguments = serde_json::Map<String, serde_json::Value>;

/// How a tool expects its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentMode {
    /// One plain string.
    Scalar,
    /// A keyed mapping, written by the model as a JSON-ish object.
    Structured,
}

impl std::fmt::Display for ArgumentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scalar => write!(f, "scalar"),
            Self::Structured => write!(f, "structured"),
        }
    }
}

/// Immutable description of a registered tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Unique tool name (the identifier the model writes after `Action:`)
    pub name: String,

    /// Whether the tool takes a scalar or a structured input
    pub argument_mode: ArgumentMode,

    /// Description shown to the model
    pub description: String,
}

impl ToolDescriptor {
    /// The `name: description` line embedded in the prompt.
    pub fn prompt_line(&self) -> String {
        format!("{}: {}", self.name, self.description)
    }
}

/// The shape of a structured field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A string (other scalars are stringified).
    Text,
    /// A nested mapping.
    Mapping,
}

/// One logical field of a structured tool's input.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    /// Canonical field name, also the first accepted key.
    pub name: &'static str,

    /// Additional accepted key names, in priority order.
    pub aliases: Vec<&'static str>,

    /// Expected value shape.
    pub kind: FieldKind,

    /// Value used when no accepted key is present. `None` = required.
    pub default: Option<serde_json::Value>,
}

impl FieldSpec {
    /// A required text field.
    pub fn required(name: &'static str) -> Self {
        Self {
            name,
            aliases: Vec::new(),
            kind: FieldKind::Text,
            default: None,
        }
    }

    /// An optional field with a default value.
    pub fn optional(name: &'static str, default: serde_json::Value) -> Self {
        Self {
            name,
            aliases: Vec::new(),
            kind: FieldKind::Text,
            default: Some(default),
        }
    }

    /// Accept another key name for this field.
    pub fn alias(mut self, key: &'static str) -> Self {
        self.aliases.push(key);
        self
    }

    /// Mark the field as a nested mapping.
    pub fn mapping(mut self) -> Self {
        self.kind = FieldKind::Mapping;
        self
    }

    /// All accepted keys, canonical name first.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        std::iter::once(self.name).chain(self.aliases.iter().copied())
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// A tool that takes one string.
#[async_trait]
pub trait ScalarCapability: Send + Sync {
    /// The unique name of this tool (e.g., "get_company_info").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the model).
    fn description(&self) -> &str;

    /// Run the tool. The input is already stripped of quotes and whitespace.
    async fn invoke(&self, input: &str) -> std::result::Result<serde_json::Value, ToolError>;
}

/// A tool that takes a keyed mapping.
#[async_trait]
pub trait StructuredCapability: Send + Sync {
    /// The unique name of this tool (e.g., "translate_document").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the model).
    fn description(&self) -> &str;

    /// The fields this tool reads, with their aliases and defaults.
    fn fields(&self) -> Vec<FieldSpec>;

    /// Run the tool. Every declared field is present under its canonical
    /// name; undeclared keys are dropped.
    async fn invoke(
        &self,
        arguments: ParsedArguments,
    ) -> std::result::Result<serde_json::Value, ToolError>;
}

/// A registered tool, discriminated by argument kind.
pub enum Capability {
    Scalar(Box<dyn ScalarCapability>),
    Structured(Box<dyn StructuredCapability>),
}

impl Capability {
    pub fn name(&self) -> &str {
        match self {
            Self::Scalar(tool) => tool.name(),
            Self::Structured(tool) => tool.name(),
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Self::Scalar(tool) => tool.description(),
            Self::Structured(tool) => tool.description(),
        }
    }

    pub fn argument_mode(&self) -> ArgumentMode {
        match self {
            Self::Scalar(_) => ArgumentMode::Scalar,
            Self::Structured(_) => ArgumentMode::Structured,
        }
    }

    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name().to_string(),
            argument_mode: self.argument_mode(),
            description: self.description().to_string(),
        }
    }
}

struct Entry {
    descriptor: ToolDescriptor,
    capability: Capability,
}

/// An ordered registry of available tools.
///
/// Registration order is preserved: it is the order in which tools are
/// described to the model, so it must be stable for the process lifetime.
pub struct ToolRegistry {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register a tool. Names must be unique.
    pub fn register(&mut self, capability: Capability) -> std::result::Result<(), ToolError> {
        let descriptor = capability.descriptor();
        if self.index.contains_key(&descriptor.name) {
            return Err(ToolError::DuplicateTool(descriptor.name));
        }
        self.index.insert(descriptor.name.clone(), self.entries.len());
        self.entries.push(Entry {
            descriptor,
            capability,
        });
        Ok(())
    }

    /// Register a scalar tool.
    pub fn register_scalar(
        &mut self,
        tool: impl ScalarCapability + 'static,
    ) -> std::result::Result<(), ToolError> {
        self.register(Capability::Scalar(Box::new(tool)))
    }

    /// Register a structured tool.
    pub fn register_structured(
        &mut self,
        tool: impl StructuredCapability + 'static,
    ) -> std::result::Result<(), ToolError> {
        self.register(Capability::Structured(Box::new(tool)))
    }

    /// Look up a tool's descriptor by name.
    pub fn lookup(&self, name: &str) -> std::result::Result<&ToolDescriptor, ToolError> {
        self.index
            .get(name)
            .map(|&i| &self.entries[i].descriptor)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))
    }

    /// Get the capability behind a tool name.
    pub fn capability(&self, name: &str) -> Option<&Capability> {
        self.index.get(name).map(|&i| &self.entries[i].capability)
    }

    /// `name: description` lines in registration order.
    pub fn list_descriptions(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| e.descriptor.prompt_line())
            .collect()
    }

    /// All descriptors in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.entries.iter().map(|e| &e.descriptor)
    }

    /// All registered tool names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|e| e.descriptor.name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
