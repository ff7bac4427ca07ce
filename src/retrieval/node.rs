// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Query operator trees.
//!
//! A `Node` is what the query side hands over after parsing and rewriting:
//! an operator name, string parameters, and children. Trees arrive as JSON
//! (`{"operator": "combine", "parameters": {"0": "2"}, "children": [...]}`)
//! or are built in code with the helpers below.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{IndexError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub operator: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(operator: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            operator: operator.into(),
            parameters: BTreeMap::new(),
            children,
        }
    }

    /// Leaf reading the position list of `term`.
    pub fn extents(term: &str) -> Self {
        Self::new("extents", Vec::new()).with("term", term)
    }

    /// Leaf reading only the counts of `term`.
    pub fn counts(term: &str) -> Self {
        Self::new("counts", Vec::new()).with("term", term)
    }

    pub fn with(mut self, name: &str, value: impl ToString) -> Self {
        self.parameters.insert(name.to_string(), value.to_string());
        self
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    /// Parse parameter `name`, falling back to `default` when it is absent.
    pub fn get_or<T: FromStr>(&self, name: &str, default: T) -> Result<T> {
        match self.get(name) {
            None => Ok(default),
            Some(raw) => raw.trim().parse().map_err(|_| IndexError::InvalidParameter {
                name: name.to_string(),
                value: raw.to_string(),
            }),
        }
    }

    pub fn get_f64(&self, name: &str, default: f64) -> Result<f64> {
        self.get_or(name, default)
    }

    pub fn get_i64(&self, name: &str, default: i64) -> Result<i64> {
        self.get_or(name, default)
    }

    pub fn get_bool(&self, name: &str, default: bool) -> Result<bool> {
        self.get_or(name, default)
    }

    /// Weight of child `index`, stored under the child's ordinal.
    pub fn weight(&self, index: usize) -> Result<f64> {
        self.get_f64(&index.to_string(), 1.0)
    }
}

/// `#operator:name=value(child child)`, the form the query log uses.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.operator)?;
        for (name, value) in &self.parameters {
            write!(f, ":{}={}", name, value)?;
        }
        write!(f, "(")?;
        for (i, child) in self.children.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", child)?;
        }
        write!(f, ")")
    }
}
