//! Shared types used across healer modules
//!
//! Contains the chat message structure and the serialized DOM element record.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A message sent to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender (user, assistant, system)
    pub role: String,
    /// Content of the message
    pub content: String,
}

impl Message {
    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// Create a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }
}

/// Top-left corner of an element in page coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub x: i64,
    pub y: i64,
}

/// Rendered size of an element
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: i64,
    pub height: i64,
}

/// One scraped DOM node.
///
/// Only attributes that were present with a non-empty value are kept in
/// `attributes`; absent ones are omitted rather than null-filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementRecord {
    /// Lowercase tag name
    pub tag: String,
    /// Visible text, trimmed
    pub text: String,
    /// Allow-listed attributes
    pub attributes: BTreeMap<String, String>,
    /// Whether the element is displayed
    pub visible: bool,
    /// Whether the element is enabled
    pub enabled: bool,
    pub location: Location,
    pub size: Size,
}

impl ElementRecord {
    /// Create a record with no attributes and zero geometry
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            text: String::new(),
            attributes: BTreeMap::new(),
            visible: false,
            enabled: false,
            location: Location::default(),
            size: Size::default(),
        }
    }

    /// Get an attribute value by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }
}
