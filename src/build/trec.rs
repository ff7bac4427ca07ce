// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Minimal TREC text splitter: enough to feed the builder from a file of
//! `<DOC>` records.
//!
//! ```text
//! <DOC>
//! <DOCNO> d-1 </DOCNO>
//! <TITLE> optional </TITLE>
//! <TEXT>
//! body
//! </TEXT>
//! </DOC>
//! ```
//!
//! No entities, no nested markup, no attributes.

use serde::{Deserialize, Serialize};

use crate::error::{IndexError, Result};

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct TrecDocument {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    pub text: String,
}

impl TrecDocument {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            text: text.into(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Split `input` into documents, in file order.
pub fn parse_trec(input: &str) -> Result<Vec<TrecDocument>> {
    let mut documents = Vec::new();
    let mut rest = input;
    while let Some((record, after)) = next_element(rest, "DOC") {
        let name = next_element(record, "DOCNO")
            .map(|(n, _)| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| {
                IndexError::format(format!("TREC record {} has no DOCNO", documents.len() + 1))
            })?;
        let title = next_element(record, "TITLE").map(|(t, _)| t.trim().to_string());
        let text = next_element(record, "TEXT")
            .map(|(t, _)| t.trim().to_string())
            .unwrap_or_default();
        documents.push(TrecDocument { name, title, text });
        rest = after;
    }
    if documents.is_empty() && rest.contains("<DOC>") {
        return Err(IndexError::format("unterminated <DOC> record"));
    }
    Ok(documents)
}

/// Contents of the first `<tag>...</tag>` in `input`, and what follows it.
fn next_element<'a>(input: &'a str, tag: &str) -> Option<(&'a str, &'a str)> {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);
    let start = input.find(&open)? + open.len();
    let end = start + input[start..].find(&close)?;
    Some((&input[start..end], &input[end + close.len()..]))
}
