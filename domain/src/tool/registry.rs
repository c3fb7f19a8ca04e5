//! In-memory snapshot of the tool registry.

use super::entities::ToolDescriptor;
use std::collections::{BTreeSet, HashMap};

/// Ordered, name-unique collection of [`ToolDescriptor`]s.
///
/// Insertion order is preserved so manifests are stable between builds.
/// Registering a name twice replaces the earlier descriptor in place.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<ToolDescriptor>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_descriptors(descriptors: impl IntoIterator<Item = ToolDescriptor>) -> Self {
        descriptors.into_iter().fold(Self::new(), Self::register)
    }

    pub fn register(mut self, tool: ToolDescriptor) -> Self {
        let tool = tool.normalized();
        match self.index.get(&tool.name) {
            Some(&position) => self.tools[position] = tool,
            None => {
                self.index.insert(tool.name.clone(), self.tools.len());
                self.tools.push(tool);
            }
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.index.get(name).map(|&position| &self.tools[position])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn all(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.iter()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Distinct non-empty provider identifiers, sorted.
    pub fn providers(&self) -> Vec<String> {
        self.tools
            .iter()
            .map(|t| t.provider.as_str())
            .filter(|p| !p.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Providers whose identifier literally occurs in the lower-cased prompt.
    pub fn detect_providers(&self, prompt: &str) -> Vec<String> {
        let prompt = prompt.to_lowercase();
        self.providers()
            .into_iter()
            .filter(|provider| prompt.contains(provider.as_str()))
            .collect()
    }

    /// Enabled primary-search tools, optionally restricted to a provider set.
    ///
    /// An empty `providers` slice means no restriction.
    pub fn manifest(&self, providers: &[String]) -> Vec<ToolDescriptor> {
        self.tools
            .iter()
            .filter(|t| t.is_primary())
            .filter(|t| providers.is_empty() || providers.iter().any(|p| p == &t.provider))
            .cloned()
            .collect()
    }

    /// Full default tool set, never restricted by provider.
    pub fn primary_search_tools(&self) -> Vec<ToolDescriptor> {
        self.manifest(&[])
    }
}
