//! Identifiers for nodes of the produces/consumes graph.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of node in the bipartite production graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    /// A recipe node.
    Recipe,
    /// An item node.
    Item,
}

impl NodeKind {
    /// Prefix used in the string form of a [`NodeId`].
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Recipe => "recipe",
            Self::Item => "item",
        }
    }
}

/// Identifier of a node in an exported graph.
///
/// Recipes and items frequently share a name (an `iron-plate` recipe
/// produces the `iron-plate` item), so the kind is part of the identity.
/// Serializes as `"<kind>:<name>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    kind: NodeKind,
    name: String,
}

impl NodeId {
    /// Identifier for the recipe with key `key`.
    #[must_use]
    pub fn recipe(key: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Recipe,
            name: key.into(),
        }
    }

    /// Identifier for the item named `name`.
    #[must_use]
    pub fn item(name: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Item,
            name: name.into(),
        }
    }

    /// Node kind.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Recipe key or item name, without the kind prefix.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parses the `"<kind>:<name>"` form.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let (prefix, name) = s.split_once(':')?;
        match prefix {
            "recipe" => Some(Self::recipe(name)),
            "item" => Some(Self::item(name)),
            _ => None,
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.prefix(), self.name)
    }
}

impl Serialize for NodeId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid node id '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_parse() {
        let id = NodeId::recipe("advanced-circuit");
        assert_eq!(id.to_string(), "recipe:advanced-circuit");
        assert_eq!(NodeId::parse("recipe:advanced-circuit"), Some(id));
        assert_eq!(NodeId::parse("fluid:water"), None);
        assert_eq!(NodeId::parse("water"), None);
    }

    #[test]
    fn test_name_may_contain_colon() {
        let id = NodeId::item("mod:widget");
        assert_eq!(NodeId::parse(&id.to_string()), Some(id));
    }

    #[test]
    fn test_serde_string_form() {
        let id = NodeId::item("copper-cable");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"item:copper-cable\"");
        let back: NodeId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, id);
    }

    #[test]
    fn test_kind_accessor() {
        assert_eq!(NodeId::recipe("a").kind(), NodeKind::Recipe);
        assert_eq!(NodeId::item("a").kind(), NodeKind::Item);
    }
}
