//! The `Transaction` entity: a balanced collection of splits posted as of
//! an effective date. See [`crate::builder`] for how one is constructed.

use crate::ids::{BookId, SplitId, TransactionId};
use chrono::NaiveDateTime;

#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: TransactionId,
    pub book_id: BookId,
    pub description: String,
    /// The effective date, used for FIFO/chronological ordering.
    pub transaction_date: NaiveDateTime,
    pub creation_date: NaiveDateTime,
    pub splits: Vec<SplitId>,
}
