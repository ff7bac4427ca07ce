// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! A count iterator plus a scoring function: the leaf of every ranked query.

use super::functions::ScoringFunction;
use crate::error::Result;
use crate::iterator::{Countable, DocId, Positional, Scorable, ScoringContext};

pub struct FeatureScorer {
    counts: Box<dyn Countable>,
    function: Box<dyn ScoringFunction>,
}

impl FeatureScorer {
    pub fn new(counts: Box<dyn Countable>, function: Box<dyn ScoringFunction>) -> Self {
        Self { counts, function }
    }

    pub fn function(&self) -> &dyn ScoringFunction {
        self.function.as_ref()
    }
}

impl Positional for FeatureScorer {
    fn is_done(&self) -> bool {
        self.counts.is_done()
    }

    fn current_id(&self) -> DocId {
        self.counts.current_id()
    }

    fn move_to(&mut self, target: DocId) -> Result<bool> {
        self.counts.move_to(target)
    }

    fn reset(&mut self) -> Result<()> {
        self.counts.reset()
    }

    fn total_entries(&self) -> u64 {
        self.counts.total_entries()
    }
}

impl Scorable for FeatureScorer {
    /// The caller positions this iterator first; a list that is not on the
    /// document scores it with a count of 0.
    fn score(&mut self, context: &ScoringContext) -> Result<f64> {
        let count = if self.counts.has_match(context.document) {
            self.counts.count()
        } else {
            0
        };
        Ok(self.function.score(count, context.length))
    }

    fn maximum_score(&self) -> f64 {
        self.function.maximum_score()
    }

    fn minimum_score(&self) -> f64 {
        self.function.minimum_score()
    }

    fn maximum_background_score(&self) -> f64 {
        self.function.maximum_background_score()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Parameters;
    use crate::iterator::{MemoryListIterator, NodeStatistics};
    use crate::scoring::functions::{create_function, CollectionStatistics, ScorerSettings};

    #[test]
    fn test_absent_document_scores_background() {
        let counts = MemoryListIterator::from_counts(&[(2, 3)]);
        let stats = counts.statistics().unwrap_or_else(NodeStatistics::default);
        let collection = CollectionStatistics {
            collection_length: 100,
            document_count: 10,
            max_length: 20,
            min_length: 5,
        };
        let function = create_function(
            "dirichlet",
            &ScorerSettings::from(&Parameters::default()),
            &collection,
            &stats,
        )
        .unwrap();
        let expected_present = function.score(3, 10);
        let expected_absent = function.score(0, 10);

        let mut scorer = FeatureScorer::new(Box::new(counts), function);
        let present = scorer
            .score(&ScoringContext {
                document: 2,
                length: 10,
            })
            .unwrap();
        let absent = scorer
            .score(&ScoringContext {
                document: 1,
                length: 10,
            })
            .unwrap();
        assert_eq!(present, expected_present);
        assert_eq!(absent, expected_absent);
        assert!(present > absent);
    }
}
