//! Training collections: statistics measured from a mailbox stream,
//! and the analytically declared synthetic class.

use std::collections::{HashMap, HashSet};
use std::io::BufRead;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Pow, Zero};
use tracing::{debug, warn};

use crate::error::{ClassifyError, Result};
use crate::mailbox::MailboxReader;
use crate::vocabulary::{tokenize, Vocabulary};

/// Per-collection document-frequency counts over the frozen
/// vocabulary, plus the collection's total email count.
#[derive(Debug, Clone)]
pub struct CollectionStats {
    label: String,
    email_count: u64,
    doc_freq: HashMap<String, u64>,
}

impl CollectionStats {
    /// Build statistics from already-measured counts.
    pub fn new(label: impl Into<String>, email_count: u64, doc_freq: HashMap<String, u64>) -> Self {
        Self {
            label: label.into(),
            email_count,
            doc_freq,
        }
    }

    /// Drain a mailbox stream and measure its statistics.
    ///
    /// Blank or whitespace-only emails are skipped entirely: they count
    /// neither toward the email total nor toward any word. Each
    /// vocabulary word is counted at most once per email, regardless of
    /// how often it repeats within that email.
    pub fn collect<R: BufRead>(
        label: impl Into<String>,
        vocabulary: &Vocabulary,
        reader: &mut MailboxReader<R>,
    ) -> Result<Self> {
        let label = label.into();
        let mut email_count = 0u64;
        let mut doc_freq: HashMap<String, u64> = HashMap::new();

        while let Some(email) = reader.next_email()? {
            if tokenize(&email).next().is_none() {
                continue;
            }
            email_count += 1;

            let mut seen: HashSet<&str> = HashSet::new();
            for word in tokenize(&email) {
                if vocabulary.contains(word) && seen.insert(word) {
                    *doc_freq.entry(word.to_owned()).or_insert(0) += 1;
                }
            }
        }

        if email_count == 0 {
            warn!(collection = %label, "collection contains no usable emails");
        } else {
            debug!(
                collection = %label,
                emails = email_count,
                tracked_words = doc_freq.len(),
                "collection statistics complete"
            );
        }

        Ok(Self {
            label,
            email_count,
            doc_freq,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn email_count(&self) -> u64 {
        self.email_count
    }

    /// Number of distinct emails in this collection containing `word`.
    pub fn doc_freq(&self, word: &str) -> u64 {
        self.doc_freq.get(word).copied().unwrap_or(0)
    }
}

/// A declared virtual class with no backing stream: `email_count`
/// virtual emails in which every tracked word matches `match_count`
/// of them on geometric average.
#[derive(Debug, Clone)]
pub struct SyntheticCollection {
    label: String,
    email_count: u64,
    match_count: BigRational,
}

impl SyntheticCollection {
    /// The match count may not exceed the declared email count.
    pub fn new(
        label: impl Into<String>,
        email_count: u64,
        match_count: BigRational,
    ) -> Result<Self> {
        if match_count < BigRational::zero() {
            return Err(ClassifyError::Configuration(format!(
                "synthetic match count must be non-negative, got {match_count}"
            )));
        }
        if match_count > BigRational::from_integer(BigInt::from(email_count)) {
            return Err(ClassifyError::Configuration(format!(
                "synthetic match count {match_count} exceeds email count {email_count}"
            )));
        }
        Ok(Self {
            label: label.into(),
            email_count,
            match_count,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn email_count(&self) -> u64 {
        self.email_count
    }

    pub fn match_count(&self) -> &BigRational {
        &self.match_count
    }
}

/// A candidate class: measured from a stream, or declared analytically.
#[derive(Debug, Clone)]
pub enum Collection {
    Real(CollectionStats),
    Synthetic(SyntheticCollection),
}

impl Collection {
    pub fn label(&self) -> &str {
        match self {
            Collection::Real(stats) => stats.label(),
            Collection::Synthetic(synthetic) => synthetic.label(),
        }
    }

    pub fn email_count(&self) -> u64 {
        match self {
            Collection::Real(stats) => stats.email_count(),
            Collection::Synthetic(synthetic) => synthetic.email_count(),
        }
    }
}

/// Parse a non-negative rational match count: an integer (`9`), a
/// decimal (`4.5`), or a fraction (`9/2`).
pub fn parse_match_count(input: &str) -> Result<BigRational> {
    let input = input.trim();
    let invalid =
        || ClassifyError::Configuration(format!("invalid synthetic match count {input:?}"));

    if let Some((numerator, denominator)) = input.split_once('/') {
        let numerator: BigInt = numerator.trim().parse().map_err(|_| invalid())?;
        let denominator: BigInt = denominator.trim().parse().map_err(|_| invalid())?;
        if denominator.is_zero() {
            return Err(invalid());
        }
        return Ok(BigRational::new(numerator, denominator));
    }

    if let Some((integral, fractional)) = input.split_once('.') {
        if fractional.is_empty() || !fractional.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let digits: BigInt = format!("{integral}{fractional}")
            .parse()
            .map_err(|_| invalid())?;
        let scale = Pow::pow(BigInt::from(10), fractional.len() as u32);
        return Ok(BigRational::new(digits, scale));
    }

    let value: BigInt = input.parse().map_err(|_| invalid())?;
    Ok(BigRational::from_integer(value))
}
