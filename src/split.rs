//! Splits: one leg of a transaction, and the per-account-type table that
//! decides which side of a split increases or decreases a balance.

use crate::chart::AccountType;
use crate::ids::{AccountId, SplitId, TransactionId};
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SplitType {
    Debit,
    Credit,
}

impl SplitType {
    pub fn opposite(self) -> SplitType {
        match self {
            SplitType::Debit => SplitType::Credit,
            SplitType::Credit => SplitType::Debit,
        }
    }
}

/// The split side that increases a balance, for each account type. Modeled
/// as a free function over a tagged enum rather than a cached strategy
/// object living on the account.
pub fn increase_side(account_type: AccountType) -> SplitType {
    match account_type {
        AccountType::Asset | AccountType::Expense => SplitType::Debit,
        AccountType::Liability | AccountType::Income | AccountType::Equity => SplitType::Credit,
    }
}

/// The split side that decreases a balance, for each account type.
pub fn decrease_side(account_type: AccountType) -> SplitType {
    increase_side(account_type).opposite()
}

#[derive(Debug, Clone)]
pub struct Split {
    pub id: SplitId,
    pub account_id: AccountId,
    pub transaction_id: Option<TransactionId>,
    pub account_amount: Decimal,
    pub profile_amount: Decimal,
    pub split_type: SplitType,
    pub is_linked: bool,
}

impl Split {
    /// `+1` if this split increases its account's balance, `-1` otherwise.
    pub fn operation_sign(&self, account_type: AccountType) -> i8 {
        if self.split_type == increase_side(account_type) {
            1
        } else {
            -1
        }
    }
}

/// A split as supplied by a caller to [`crate::Ledger::create_transaction`],
/// before it has an id or a transaction to belong to.
#[derive(Debug, Clone)]
pub struct NewSplit {
    pub account_id: AccountId,
    pub account_amount: Decimal,
    pub split_type: SplitType,
    /// Usually left at zero; the transaction builder imputes it for
    /// credits and local debits, and the split processor overwrites it
    /// with the actual cost for decreasing splits.
    pub profile_amount: Decimal,
}

impl NewSplit {
    pub fn new(account_id: AccountId, account_amount: Decimal, split_type: SplitType) -> Self {
        NewSplit {
            account_id,
            account_amount,
            split_type,
            profile_amount: Decimal::ZERO,
        }
    }
}
