//! A double-entry, multi-currency bookkeeping kernel.
//!
//! Balances are tracked as FIFO lots ("pockets") so that deducting from a
//! foreign-currency account always consumes the oldest stock first and
//! carries its original local-currency cost basis forward. Splits are
//! linked chronologically regardless of insertion order: inserting a
//! back-dated transaction unlinks every later split on the same account,
//! relinks the new one, then relinks the later ones, so final balances
//! never depend on the order transactions were entered in.
//!
//! The kernel is a pure in-memory [`Ledger`]; a host application wires in
//! an [`ExchangeRateProvider`] per profile and, optionally, a
//! [`PersistencePort`] to mirror every mutation into its own storage.

mod account_ops;
mod builder;
mod chart;
mod currency;
mod error;
mod exchange;
mod ids;
mod ledger;
mod money;
mod persistence;
mod pocket;
mod split;
mod split_processor;
mod transaction;

pub use chart::{Account, AccountType, AccountingMode, Book, Group, Profile};
pub use currency::{Currency, CurrencyRegistry};
pub use error::KorovaError;
pub use exchange::ExchangeRateProvider;
#[cfg(any(test, feature = "test-util"))]
pub use exchange::MockExchangeRateProvider;
pub use ids::{
    AccountId, BookId, CurrencyCode, GroupId, PocketId, ProfileId, SplitId, TransactionId,
};
pub use ledger::Ledger;
pub use money::{is_zero, quantize};
pub use pocket::Pocket;
pub use split::{decrease_side, increase_side, NewSplit, Split, SplitType};
pub use transaction::Transaction;
