//! The error taxonomy surfaced by every fallible operation in the kernel.
//!
//! The split processor and transaction builder never swallow an error:
//! they catch one only long enough to drive a rollback, then re-raise it
//! to the caller unchanged.

use crate::ids::{AccountId, BookId, CurrencyCode, GroupId, PocketId, ProfileId, SplitId};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KorovaError {
    #[error("account {0:?} is local but was credited with different account/profile amounts")]
    DifferentAmountsInLocalAccount(AccountId),

    #[error("account type {account_type:?} cannot hold a foreign currency ({currency})")]
    ForeignResultAccount {
        account_type: crate::chart::AccountType,
        currency: CurrencyCode,
    },

    #[error("duplicate code {code:?} in scope {scope}")]
    DuplicateCode { code: String, scope: &'static str },

    #[error("transaction does not balance: debits {debits} != credits {credits}")]
    ImbalancedTransaction { debits: String, credits: String },

    #[error("more than one foreign increase split on the same side is not supported")]
    UnsupportedMultipleForeignIncrease,

    #[error("nothing left to assign to the foreign debit increase split")]
    NothingLeftForForeignDebit,

    #[error("book {0:?} is not ready: one or more designated accounts are unset")]
    BookNotReady(BookId),

    #[error("split {0:?} has already been processed")]
    AlreadyProcessed(SplitId),

    #[error("split {0:?} is not linked")]
    NotLinked(SplitId),

    #[error("exchange rate unavailable for {from} -> {to}")]
    ExchangeRateUnavailable { from: CurrencyCode, to: CurrencyCode },

    #[error("splits in a single transaction must all belong to book {0:?}")]
    CrossBookTransaction(BookId),

    #[error("unknown account {0:?}")]
    UnknownAccount(AccountId),

    #[error("unknown profile {0:?}")]
    UnknownProfile(ProfileId),

    #[error("unknown book {0:?}")]
    UnknownBook(BookId),

    #[error("unknown group {0:?}")]
    UnknownGroup(GroupId),

    #[error("unknown pocket {0:?}")]
    UnknownPocket(PocketId),

    #[error("unknown currency {0}")]
    UnknownCurrency(CurrencyCode),

    #[error("accounting mode {0} is declared but not implemented")]
    UnimplementedAccountingMode(&'static str),

    #[error("persistence backend failed: {0}")]
    Persistence(String),
}
