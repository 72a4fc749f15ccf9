use serde::Deserialize;
use uuid::Uuid;

/// Settings attached to a group in the scene manifest.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Rule {
    /// Enables material processing for the group.
    Material,
    /// Compiles every selected node into a single merged node.
    MergeAllNodes,
    /// Marks selected nodes as default physics proxies.
    PhysicsProxy { nodes: Vec<String> },
}

#[derive(Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct RuleContainer {
    rules: Vec<Rule>,
}

impl RuleContainer {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn add(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn find_first<F>(&self, predicate: F) -> Option<&Rule>
    where
        F: Fn(&Rule) -> bool,
    {
        self.rules.iter().find(|rule| predicate(rule))
    }

    pub fn has_material_rule(&self) -> bool {
        self.find_first(|rule| matches!(rule, Rule::Material)).is_some()
    }

    pub fn merges_all_nodes(&self) -> bool {
        self.find_first(|rule| matches!(rule, Rule::MergeAllNodes)).is_some()
    }

    pub fn is_physics_proxy(&self, node_name: &str) -> bool {
        self.rules.iter().any(|rule| match rule {
            Rule::PhysicsProxy { nodes } => nodes.iter().any(|n| n == node_name),
            _ => false,
        })
    }
}

/// A named selection of scene nodes compiled into one container.
#[derive(Deserialize, Clone, Debug)]
pub struct MeshGroup {
    // Identity of this group for the lifetime of one compiler run
    #[serde(skip_deserializing, default = "Uuid::new_v4")]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub node_selection: Vec<String>,
    #[serde(default)]
    pub rules: RuleContainer,
}

impl MeshGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            node_selection: Vec::new(),
            rules: RuleContainer::default(),
        }
    }

    pub fn with_nodes<I, S>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.node_selection.extend(nodes.into_iter().map(Into::into));
        self
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.add(rule);
        self
    }

    pub fn is_selected(&self, node_name: &str) -> bool {
        self.node_selection.iter().any(|n| n == node_name)
    }
}
