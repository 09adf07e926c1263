//! Naive Bayes scoring over exact rationals.
//!
//! Every candidate collection gets a Laplace-smoothed prior and one
//! smoothed likelihood per vocabulary word, multiplied into a single
//! relative score. All arithmetic is exact `BigRational`: the product
//! spans one factor per vocabulary word, and precision loss here would
//! make the final comparison silently non-deterministic. Floating
//! point appears only in display formatting, never in comparisons.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{pow, One, ToPrimitive};
use tracing::debug;

use crate::collection::Collection;
use crate::vocabulary::Vocabulary;

/// One collection's label and relative score, in processing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRecord {
    pub label: String,
    pub score: BigRational,
}

impl ScoreRecord {
    /// Scale the relative score to a true probability using the global
    /// smoothed prior denominator.
    pub fn probability(&self, total_emails: u64, class_count: usize) -> BigRational {
        &self.score / integer(total_emails + class_count as u64)
    }

    /// Approximate probability for display only.
    pub fn approx_probability(&self, total_emails: u64, class_count: usize) -> f64 {
        self.probability(total_emails, class_count)
            .to_f64()
            .unwrap_or(0.0)
    }
}

fn integer(n: u64) -> BigRational {
    BigRational::from_integer(BigInt::from(n))
}

/// Total email count across all collections, measured or declared.
pub fn total_emails(collections: &[Collection]) -> u64 {
    collections.iter().map(Collection::email_count).sum()
}

/// Score every collection against the vocabulary, in declaration
/// order.
///
/// For a real collection with `n` emails the score starts at `n + 1`
/// and each vocabulary word contributes `(doc_freq + 1) / (n +
/// class_count)`. A synthetic collection instead contributes its
/// single closed-form factor `((M + 1) / (E + class_count))^|V|`,
/// which already encodes the per-word normalization.
pub fn score_collections(collections: &[Collection], vocabulary: &Vocabulary) -> Vec<ScoreRecord> {
    let class_count = collections.len() as u64;

    collections
        .iter()
        .map(|collection| {
            let email_count = collection.email_count();
            let mut score = integer(email_count + 1);

            match collection {
                Collection::Real(stats) => {
                    let denominator = integer(email_count + class_count);
                    for word in vocabulary.iter() {
                        score *= integer(stats.doc_freq(word) + 1);
                        score /= &denominator;
                    }
                }
                Collection::Synthetic(synthetic) => {
                    let factor = (synthetic.match_count() + BigRational::one())
                        / integer(email_count + class_count);
                    score *= pow(factor, vocabulary.len());
                }
            }

            debug!(collection = collection.label(), score = %score, "scored");

            ScoreRecord {
                label: collection.label().to_owned(),
                score,
            }
        })
        .collect()
}

/// The strictly greatest score wins; the earliest-seen maximum keeps
/// an exact tie.
pub fn pick_winner(records: &[ScoreRecord]) -> Option<&ScoreRecord> {
    let mut winner: Option<&ScoreRecord> = None;
    for record in records {
        let better = match winner {
            None => true,
            Some(best) => record.score > best.score,
        };
        if better {
            winner = Some(record);
        }
    }
    winner
}
