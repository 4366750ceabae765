//-
// Copyright (c) 2025, 2026, the Airsync authors
//
// This file is part of Airsync.
//
// Airsync is free software: you can redistribute it and/or modify it under
// the terms of  the GNU General Public  License as published by  the Free
// Software Foundation, either version 3 of the License, or (at your option)
// any later version.
//
// Airsync is distributed  in the hope that  it will be useful,  but WITHOUT
// ANY WARRANTY; without even  the implied warranty of  MERCHANTABILITY or
// FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for
// more details.
//
// You should have received a copy of the GNU General Public License along
// with Airsync. If not, see <http://www.gnu.org/licenses/>.

//! The hierarchical request/response document the handlers consume and
//! produce.
//!
//! This is a plain owned tree built top-down. Handlers never need to rewind
//! to an earlier position: a subtree is built as a value and appended to its
//! parent when complete.

use std::fmt;

/// A document is just its root node.
pub type Document = Node;

/// One named node in a document tree, carrying an optional text value and
/// any number of children.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Node {
    name: String,
    value: Option<String>,
    children: Vec<Node>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Node {
            name: name.into(),
            value: None,
            children: Vec::new(),
        }
    }

    /// A leaf node with a text value.
    pub fn text(name: impl Into<String>, value: impl ToString) -> Self {
        Node {
            name: name.into(),
            value: Some(value.to_string()),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Append a completed child subtree.
    pub fn push(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Set the named field, replacing the first existing leaf of that name
    /// or appending a new one.
    pub fn set(&mut self, name: &str, value: impl ToString) {
        if let Some(child) =
            self.children.iter_mut().find(|c| c.name == name)
        {
            child.value = Some(value.to_string());
        } else {
            self.children.push(Node::text(name, value));
        }
    }

    /// The text value of the first child with the given name, if any.
    ///
    /// A present-but-valueless element reads as the empty string, which is
    /// distinct from an absent element.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.value.as_deref().unwrap_or(""))
    }

    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children(&self) -> impl Iterator<Item = &Node> {
        self.children.iter()
    }

    pub fn children_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a Node> {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn has_child(&self, name: &str) -> bool {
        self.child(name).is_some()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(ref value) = self.value {
            write!(f, "={:?}", value)?;
        }
        if !self.children.is_empty() {
            write!(f, "(")?;
            for (ix, child) in self.children.iter().enumerate() {
                if ix > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", child)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}
