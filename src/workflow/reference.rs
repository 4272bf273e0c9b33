// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Reference model: pure identity values pointing at workflow parameters or at
//! named node outputs. References carry no behaviour of their own; they are
//! resolved by the compiler (structurally) and by the executor (against a run's
//! accumulated results).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to a declared workflow parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParamRef {
    pub name: String,
}

impl ParamRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Reference to one named output of a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OutputRef {
    pub node: String,
    pub output: String,
}

impl OutputRef {
    pub fn new(node: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            output: output.into(),
        }
    }
}

/// Either kind of reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reference {
    Param(ParamRef),
    Output(OutputRef),
}

impl Reference {
    /// Name under which the referenced value is visible to gate predicates.
    pub fn value_name(&self) -> &str {
        match self {
            Reference::Param(p) => &p.name,
            Reference::Output(o) => &o.output,
        }
    }

    /// The producing node, for output references.
    pub fn producer(&self) -> Option<&str> {
        match self {
            Reference::Param(_) => None,
            Reference::Output(o) => Some(&o.node),
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Param(p) => write!(f, "params.{}", p.name),
            Reference::Output(o) => write!(f, "{}.{}", o.node, o.output),
        }
    }
}

impl From<ParamRef> for Reference {
    fn from(p: ParamRef) -> Self {
        Reference::Param(p)
    }
}

impl From<OutputRef> for Reference {
    fn from(o: OutputRef) -> Self {
        Reference::Output(o)
    }
}

impl From<&ParamRef> for Reference {
    fn from(p: &ParamRef) -> Self {
        Reference::Param(p.clone())
    }
}

impl From<&OutputRef> for Reference {
    fn from(o: &OutputRef) -> Self {
        Reference::Output(o.clone())
    }
}

/// A node input: a reference plus whether the input may be absent.
///
/// Mandatory inputs cascade a skip when their producer is skipped; optional
/// inputs bind an explicit absent value instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputRef {
    pub reference: Reference,
    pub optional: bool,
}

impl InputRef {
    pub fn mandatory(reference: impl Into<Reference>) -> Self {
        InputRef {
            reference: reference.into(),
            optional: false,
        }
    }
}

impl From<Reference> for InputRef {
    fn from(reference: Reference) -> Self {
        InputRef::mandatory(reference)
    }
}

impl From<ParamRef> for InputRef {
    fn from(reference: ParamRef) -> Self {
        InputRef::mandatory(reference)
    }
}

impl From<OutputRef> for InputRef {
    fn from(reference: OutputRef) -> Self {
        InputRef::mandatory(reference)
    }
}

impl From<&ParamRef> for InputRef {
    fn from(reference: &ParamRef) -> Self {
        InputRef::mandatory(reference)
    }
}

impl From<&OutputRef> for InputRef {
    fn from(reference: &OutputRef) -> Self {
        InputRef::mandatory(reference)
    }
}

/// Mark a reference as optional.
///
/// ```
/// use flowlet::workflow::{optional, OutputRef};
///
/// let input = optional(OutputRef::new("step_a", "result"));
/// assert!(input.optional);
/// ```
pub fn optional(reference: impl Into<Reference>) -> InputRef {
    InputRef {
        reference: reference.into(),
        optional: true,
    }
}
