// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Declarative surface: parameters, references, node definitions and the
//! runtime value containers passed to callables.

mod declaration;
mod node;
mod reference;
mod values;

pub use declaration::{ParameterDeclaration, ValueType, Workflow};
pub use node::{Gate, GatePredicate, NodeDefinition, NodeHandle, OutputDeclaration};
pub use reference::{optional, InputRef, OutputRef, ParamRef, Reference};
pub use values::{GateContext, NodeInputs, NodeOutput};

pub use serde_json::Value;
