//! Chart-of-accounts entities: Profile, Book, Group, Account.
//!
//! Each is a plain record with explicit fields; cross-entity references
//! (a `Book`'s designated accounts, a `Group`'s parent, an `Account`'s
//! group) are stored as identifiers and resolved against the owning
//! [`crate::Ledger`], never embedded or looked up by attribute.

use crate::ids::{AccountId, BookId, CurrencyCode, GroupId, ProfileId};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Only FIFO is implemented; `LIFO` is declared so the data model can
/// carry the tag, but any attempt to act on it fails fast rather than
/// silently behaving like FIFO.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountingMode {
    Fifo,
    Lifo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountType {
    Asset,
    Liability,
    Income,
    Expense,
    Equity,
}

impl AccountType {
    /// `true` for result accounts, which must stay in the profile's
    /// local currency.
    pub fn is_result_account(self) -> bool {
        matches!(self, AccountType::Income | AccountType::Expense)
    }
}

#[derive(Debug, Clone)]
pub struct Profile {
    pub id: ProfileId,
    pub name: String,
    pub owner: String,
    pub default_currency: CurrencyCode,
    pub accounting_mode: AccountingMode,
}

#[derive(Debug, Clone)]
pub struct Book {
    pub id: BookId,
    pub profile_id: ProfileId,
    pub code: String,
    pub name: String,
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
    pub initial_balances: Option<AccountId>,
    pub profit_loss: Option<AccountId>,
    pub currency_xe_income: Option<AccountId>,
    pub currency_xe_expense: Option<AccountId>,
}

impl Book {
    /// A book may accept transactions only once all four designated
    /// accounts are set.
    pub fn is_ready(&self) -> bool {
        self.initial_balances.is_some()
            && self.profit_loss.is_some()
            && self.currency_xe_income.is_some()
            && self.currency_xe_expense.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct Group {
    pub id: GroupId,
    pub book_id: BookId,
    pub code: String,
    pub name: String,
    pub parent: Option<GroupId>,
}

#[derive(Debug, Clone)]
pub struct Account {
    pub id: AccountId,
    pub group_id: GroupId,
    pub book_id: BookId,
    pub code: String,
    pub name: String,
    pub account_type: AccountType,
    pub currency: CurrencyCode,
    pub imbalance: Decimal,
}

impl Account {
    pub fn is_foreign(&self, profile_default_currency: &CurrencyCode) -> bool {
        &self.currency != profile_default_currency
    }

    pub fn is_local(&self, profile_default_currency: &CurrencyCode) -> bool {
        !self.is_foreign(profile_default_currency)
    }
}
