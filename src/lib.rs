//! Naive Bayes email classification over mbox collections.
//!
//! Given a set of labeled mailbox archives and one target email, this
//! crate retrains a multinomial naive Bayes model from scratch and
//! reports which collection the target most plausibly belongs to. An
//! optional synthetic "spam" collection can stand in for a corpus that
//! is only known by its aggregate statistics.
//!
//! Scoring uses exact rational arithmetic end to end, so the same
//! inputs always produce the same winner and the same scores.

pub mod collection;
pub mod error;
pub mod mailbox;
pub mod scorer;
pub mod vocabulary;

pub use collection::{parse_match_count, Collection, CollectionStats, SyntheticCollection};
pub use error::{ClassifyError, Result};
pub use mailbox::{MailboxReader, Source};
pub use scorer::{pick_winner, score_collections, total_emails, ScoreRecord};
pub use vocabulary::{tokenize, Vocabulary};
