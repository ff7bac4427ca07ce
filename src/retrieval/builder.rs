// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Turns an operator tree into an iterator tree.
//!
//! | operator                 | children                 | produces   |
//! |--------------------------|--------------------------|------------|
//! | `extents`, `counts`      | none (`term`, `part`)    | extents    |
//! | `syn`                    | extents...               | extents    |
//! | `od` / `ordered`         | extents... (`width`)     | extents    |
//! | `uw` / `unordered`       | extents... (`width`)     | extents    |
//! | `inside`                 | extents, extents         | extents    |
//! | `band`, `bor`            | any...                   | indicator  |
//! | `all`, `any`             | any...                   | indicator  |
//! | `feature[:scorer]`       | counts                   | scores     |
//! | `combine`, `maxscore`    | scores or counts...      | scores     |
//! | `require`, `reject`      | any, scores or counts    | scores     |
//!
//! A count node where a score is expected is wrapped in a feature with the
//! default scorer. Capability mismatches fail here, before any document is
//! read.

use crate::config::Parameters;
use crate::error::{IndexError, Result};
use crate::index::{DiskIndex, POSTINGS_PART};
use crate::iterator::window::{DEFAULT_ORDERED_WIDTH, DEFAULT_UNORDERED_WIDTH};
use crate::iterator::{
    collect_statistics, AllIndicator, AnyIndicator, ConjunctionIterator, Countable,
    DisjunctionIterator, Extentable, InsideIterator, MemoryListIterator, NodeIterator,
    NodeStatistics, OrderedWindowIterator, Positional, RejectScorer, RequireScorer, Scorable,
    SynonymIterator, UnorderedWindowIterator,
};
use crate::scoring::{
    create_function, CombineIterator, FeatureScorer, MaxScoreIterator, ScorerSettings,
};
use crate::utils::normalize;

use super::node::Node;

pub struct IteratorBuilder<'a> {
    index: &'a DiskIndex,
    parameters: &'a Parameters,
}

impl<'a> IteratorBuilder<'a> {
    pub fn new(index: &'a DiskIndex, parameters: &'a Parameters) -> Self {
        Self { index, parameters }
    }

    pub fn build(&self, node: &Node) -> Result<NodeIterator> {
        let operator = node.operator.as_str();
        match operator {
            "extents" | "counts" => {
                arity(node, 0, Some(0))?;
                let list = self.leaf(node)?;
                Ok(if operator == "counts" {
                    NodeIterator::Counts(Box::new(list))
                } else {
                    NodeIterator::Extents(list)
                })
            }
            "syn" | "synonym" => {
                arity(node, 1, None)?;
                Ok(NodeIterator::Extents(Box::new(SynonymIterator::new(
                    self.extent_children(node)?,
                ))))
            }
            "od" | "ordered" => {
                arity(node, 1, None)?;
                let width = node.get_i64("width", DEFAULT_ORDERED_WIDTH)?;
                Ok(NodeIterator::Extents(Box::new(OrderedWindowIterator::new(
                    self.extent_children(node)?,
                    width,
                )?)))
            }
            "uw" | "unordered" => {
                arity(node, 1, None)?;
                let width = node.get_i64("width", DEFAULT_UNORDERED_WIDTH)?;
                let overlap = node.get_bool("overlap", false)?;
                Ok(NodeIterator::Extents(Box::new(UnorderedWindowIterator::new(
                    self.extent_children(node)?,
                    width,
                    overlap,
                )?)))
            }
            "inside" => {
                arity(node, 2, Some(2))?;
                let mut children = self.extent_children(node)?.into_iter();
                match (children.next(), children.next()) {
                    (Some(inner), Some(outer)) => Ok(NodeIterator::Extents(Box::new(
                        InsideIterator::new(inner, outer)?,
                    ))),
                    _ => Err(IndexError::unsupported("#inside needs two children")),
                }
            }
            "band" => {
                arity(node, 1, None)?;
                Ok(NodeIterator::Indicator(Box::new(ConjunctionIterator::new(
                    self.positional_children(node)?,
                )?)))
            }
            "bor" => {
                arity(node, 1, None)?;
                Ok(NodeIterator::Indicator(Box::new(DisjunctionIterator::new(
                    self.positional_children(node)?,
                ))))
            }
            "all" => {
                arity(node, 1, None)?;
                Ok(NodeIterator::Indicator(Box::new(AllIndicator::new(
                    self.positional_children(node)?,
                )?)))
            }
            "any" => {
                arity(node, 1, None)?;
                Ok(NodeIterator::Indicator(Box::new(AnyIndicator::new(
                    self.positional_children(node)?,
                ))))
            }
            "require" | "reject" => {
                arity(node, 2, Some(2))?;
                let filter = self.build(&node.children[0])?.into_indicator();
                let scorer = self.build_scorer(&node.children[1])?;
                Ok(NodeIterator::Scores(if operator == "require" {
                    Box::new(RequireScorer::new(filter, scorer))
                } else {
                    Box::new(RejectScorer::new(filter, scorer)?)
                }))
            }
            "combine" => {
                let (children, weights) = self.weighted_children(node)?;
                Ok(NodeIterator::Scores(Box::new(CombineIterator::new(
                    children, weights,
                )?)))
            }
            "maxscore" => {
                let (children, weights) = self.weighted_children(node)?;
                Ok(NodeIterator::Scores(Box::new(MaxScoreIterator::new(
                    children, weights,
                )?)))
            }
            "feature" => {
                arity(node, 1, Some(1))?;
                let scorer = node.get("scorer").unwrap_or(self.parameters.default_scorer.as_str());
                Ok(NodeIterator::Scores(self.feature(node, &node.children[0], scorer)?))
            }
            _ => match operator.strip_prefix("feature:") {
                Some(scorer) => {
                    arity(node, 1, Some(1))?;
                    Ok(NodeIterator::Scores(self.feature(node, &node.children[0], scorer)?))
                }
                None => Err(IndexError::unsupported(format!(
                    "unknown operator '{}'",
                    operator
                ))),
            },
        }
    }

    /// Build `node` as a scorer, wrapping count nodes with the default
    /// scoring function.
    pub fn build_scorer(&self, node: &Node) -> Result<Box<dyn Scorable>> {
        let iterator = self.build(node)?;
        if iterator.is_countable() {
            let counts = iterator.into_counts()?;
            return self.score_counts(node, node, counts, &self.parameters.default_scorer);
        }
        iterator.into_scores()
    }

    /// The root scorer of a ranked query. A root `combine` is evaluated with
    /// MaxScore when `max_score` is set and its weights allow it.
    pub fn build_root(&self, node: &Node, max_score: bool) -> Result<Box<dyn Scorable>> {
        if max_score && node.operator == "combine" && !node.children.is_empty() {
            let (children, weights) = self.weighted_children(node)?;
            if weights.iter().all(|&w| w >= 0.0) {
                log::debug!("evaluating {} with maxscore", node);
                return Ok(Box::new(MaxScoreIterator::new(children, weights)?));
            }
            return Ok(Box::new(CombineIterator::new(children, weights)?));
        }
        self.build_scorer(node)
    }

    /// Collection statistics of a count-producing node: from the list header
    /// when it has one, by scanning otherwise.
    pub fn statistics(&self, node: &Node) -> Result<NodeStatistics> {
        let mut counts = self.build(node)?.into_counts()?;
        match counts.statistics() {
            Some(stats) => Ok(stats),
            None => collect_statistics(&mut counts),
        }
    }

    fn leaf(&self, node: &Node) -> Result<Box<dyn Extentable>> {
        let term = node
            .get("term")
            .or_else(|| node.get("default"))
            .ok_or_else(|| IndexError::InvalidParameter {
                name: "term".to_string(),
                value: format!("missing on {}", node),
            })?;
        let part = node.get("part").unwrap_or(POSTINGS_PART);
        let key = if part == POSTINGS_PART {
            normalize(term)
        } else {
            term.to_string()
        };
        match self.index.list(part, &key)? {
            Some(list) => Ok(Box::new(list)),
            None => {
                log::debug!("no list for '{}' in part {}", key, part);
                Ok(Box::new(MemoryListIterator::empty()))
            }
        }
    }

    fn feature(&self, node: &Node, child: &Node, scorer: &str) -> Result<Box<dyn Scorable>> {
        let counts = self.build(child)?.into_counts()?;
        self.score_counts(node, child, counts, scorer)
    }

    /// Wrap `counts` (built from `child`) in a scoring function. Scorer knobs
    /// on `settings_node` override the retrieval-wide ones.
    fn score_counts(
        &self,
        settings_node: &Node,
        child: &Node,
        counts: Box<dyn Countable>,
        scorer: &str,
    ) -> Result<Box<dyn Scorable>> {
        let defaults = ScorerSettings::from(self.parameters);
        let settings = ScorerSettings {
            k1: settings_node.get_f64("k1", defaults.k1)?,
            b: settings_node.get_f64("b", defaults.b)?,
            mu: settings_node.get_f64("mu", defaults.mu)?,
            lambda: settings_node.get_f64("lambda", defaults.lambda)?,
        };
        let stats = match counts.statistics() {
            Some(stats) => stats,
            None => self.statistics(child)?,
        };
        let function = create_function(scorer, &settings, &self.index.collection(), &stats)?;
        log::debug!(
            "{} scored with {} (df {}, cf {}, max count {})",
            child,
            function.name(),
            stats.node_document_count,
            stats.node_frequency,
            stats.maximum_count
        );
        Ok(Box::new(FeatureScorer::new(counts, function)))
    }

    fn extent_children(&self, node: &Node) -> Result<Vec<Box<dyn Extentable>>> {
        node.children
            .iter()
            .map(|child| self.build(child)?.into_extents())
            .collect()
    }

    fn positional_children(&self, node: &Node) -> Result<Vec<Box<dyn Positional>>> {
        node.children
            .iter()
            .map(|child| Ok(self.build(child)?.into_positional()))
            .collect()
    }

    fn weighted_children(&self, node: &Node) -> Result<(Vec<Box<dyn Scorable>>, Vec<f64>)> {
        if node.children.is_empty() {
            log::warn!("#{} without children matches nothing", node.operator);
        }
        let mut children = Vec::with_capacity(node.children.len());
        let mut weights = Vec::with_capacity(node.children.len());
        for (i, child) in node.children.iter().enumerate() {
            children.push(self.build_scorer(child)?);
            weights.push(node.weight(i)?);
        }
        Ok((children, weights))
    }
}

fn arity(node: &Node, min: usize, max: Option<usize>) -> Result<()> {
    let n = node.children.len();
    if n < min || max.is_some_and(|max| n > max) {
        let expected = match max {
            Some(max) if max == min => format!("{}", min),
            Some(max) => format!("{} to {}", min, max),
            None => format!("at least {}", min),
        };
        return Err(IndexError::unsupported(format!(
            "#{} takes {} children, got {}",
            node.operator, expected, n
        )));
    }
    Ok(())
}
