//! Tools module - what the repair loop acts with
//!
//! Contains the DOM snapshotter, the script store with its syntax
//! validator, and the execution sandbox.

pub mod browser;
pub mod sandbox;
pub mod script;
pub mod syntax;

pub use browser::Snapshotter;
pub use sandbox::{ExecutionOutput, Sandbox};
pub use script::ScriptStore;
pub use syntax::{PythonSyntax, SyntaxValidator};
