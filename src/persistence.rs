//! The persistence boundary.
//!
//! The kernel owns its object graph in memory (see [`crate::Ledger`]); a
//! host that backs it with a relational store implements
//! [`PersistencePort`] and the `Ledger` mirrors every mutation made
//! during [`crate::Ledger::create_transaction`] into one
//! [`PersistenceTransaction`], committing at the end or rolling back on
//! the first [`crate::error::KorovaError`]. A `Ledger` with no port
//! configured is simply its own durable state.

use crate::chart::Account;
use crate::error::KorovaError;
use crate::ids::PocketId;
use crate::pocket::Pocket;
use crate::split::Split;
use crate::transaction::Transaction;

pub trait PersistencePort: Send + Sync {
    fn begin(&self) -> Result<Box<dyn PersistenceTransaction>, KorovaError>;
}

pub trait PersistenceTransaction {
    fn save_account(&mut self, account: &Account) -> Result<(), KorovaError>;
    fn save_pocket(&mut self, pocket: &Pocket) -> Result<(), KorovaError>;
    fn delete_pocket(&mut self, pocket_id: PocketId) -> Result<(), KorovaError>;
    fn save_transaction(&mut self, transaction: &Transaction) -> Result<(), KorovaError>;
    fn save_split(&mut self, split: &Split) -> Result<(), KorovaError>;
    fn commit(self: Box<Self>) -> Result<(), KorovaError>;
    fn rollback(self: Box<Self>) -> Result<(), KorovaError>;
}
