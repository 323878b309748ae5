use super::errors::CompileError;
use super::terminals::TokenId;
use crate::runtime::Location;
use serde::{Deserialize, Serialize};

/// Rules of a grammar, in declaration order
///
/// Duplicate names are kept as declared until validation rejects them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleGraph {
    rules: Vec<Rule>,
}

impl RuleGraph {
    pub(crate) fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub(crate) fn rules_mut(&mut self) -> &mut [Rule] {
        &mut self.rules
    }

    /// Get a rule from its name
    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.name == name)
    }

    /// Get the position of a rule from its name
    pub fn position(&self, name: &str) -> Option<usize> {
        self.rules.iter().position(|rule| rule.name == name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// A named grammar rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    name: String,
    definition: Definition,

    /// Location of the rule's name in the grammar
    #[serde(skip)]
    location: Location,
}

impl Rule {
    pub(crate) fn new(name: &str, definition: Definition, location: Location) -> Self {
        Self {
            name: name.to_string(),
            definition,
            location,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn definition(&self) -> &Definition {
        &self.definition
    }

    pub(crate) fn definition_mut(&mut self) -> &mut Definition {
        &mut self.definition
    }

    pub fn location(&self) -> Location {
        self.location
    }
}

/// Mutually exclusive alternatives (never empty)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Definition {
    alternatives: Vec<Sequence>,
}

impl Definition {
    pub(crate) fn new(alternatives: Vec<Sequence>) -> Self {
        Self { alternatives }
    }

    pub fn alternatives(&self) -> &[Sequence] {
        &self.alternatives
    }

    pub(crate) fn alternatives_mut(&mut self) -> &mut [Sequence] {
        &mut self.alternatives
    }
}

/// Elements matched one after the other
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Sequence {
    elements: Vec<Element>,
}

impl Sequence {
    pub(crate) fn new(elements: Vec<Element>) -> Self {
        Self { elements }
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub(crate) fn elements_mut(&mut self) -> &mut [Element] {
        &mut self.elements
    }
}

/// Building block of a [`Sequence`]
///
/// Occurrence indexes start at 1 and are assigned by the validator; they stay at 0 before that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Element {
    /// Zero or one match of the definition (`[ ... ]`)
    Optional {
        definition: Definition,
        occurrence: usize,
    },

    /// Zero or more matches of the definition (`{ ... }`)
    Repeated {
        definition: Definition,
        occurrence: usize,
    },

    /// Parenthesized definition (`( ... )`)
    Group {
        definition: Definition,
        occurrence: usize,
    },

    /// Literal text, matched by a token
    Terminal {
        literal: String,
        token: TokenId,
        occurrence: usize,
    },

    /// Invocation of another rule
    Reference {
        name: String,
        occurrence: usize,

        #[serde(skip)]
        location: Location,
    },
}

impl Element {
    /// Get the element's occurrence index
    pub fn occurrence(&self) -> usize {
        match self {
            Self::Optional { occurrence, .. }
            | Self::Repeated { occurrence, .. }
            | Self::Group { occurrence, .. }
            | Self::Terminal { occurrence, .. }
            | Self::Reference { occurrence, .. } => *occurrence,
        }
    }

    /// Get the definition nested in this element, if any
    pub fn definition(&self) -> Option<&Definition> {
        match self {
            Self::Optional { definition, .. }
            | Self::Repeated { definition, .. }
            | Self::Group { definition, .. } => Some(definition),
            Self::Terminal { .. } | Self::Reference { .. } => None,
        }
    }
}

/// Caller-provided token definitions, tried in order when resolving literals
///
/// Serialized as a plain list:
///
/// ```json
/// [
///     { "name": "Number", "pattern": "[0-9]+" },
///     { "name": "Space", "pattern": "\\s+", "skipped": true }
/// ]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenMap {
    entries: Vec<TokenMapEntry>,
}

/// A single [`TokenMap`] entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMapEntry {
    /// Token kind's name
    pub name: String,

    /// Regular expression matching the token
    pub pattern: String,

    /// Drop matches from the token stream instead of emitting them
    #[serde(default)]
    pub skipped: bool,
}

impl TokenMap {
    /// Create an empty token map
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry
    pub fn with(mut self, name: &str, pattern: &str) -> Self {
        self.entries.push(TokenMapEntry {
            name: name.to_string(),
            pattern: pattern.to_string(),
            skipped: false,
        });
        self
    }

    /// Add an entry whose matches are dropped by the generated lexers
    pub fn with_skipped(mut self, name: &str, pattern: &str) -> Self {
        self.entries.push(TokenMapEntry {
            name: name.to_string(),
            pattern: pattern.to_string(),
            skipped: true,
        });
        self
    }

    pub fn entries(&self) -> &[TokenMapEntry] {
        &self.entries
    }

    /// Load a token map from its JSON representation
    pub fn from_json(json: &str) -> Result<Self, CompileError> {
        serde_json::from_str(json).map_err(CompileError::InvalidTokenMap)
    }
}
