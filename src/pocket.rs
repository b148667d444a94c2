//! A single lot of currency held by an account.

use crate::ids::{AccountId, PocketId};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;

#[derive(Debug, Clone)]
pub struct Pocket {
    pub id: PocketId,
    pub account_id: AccountId,
    /// Creation amount in the account's currency.
    pub account_amount: Decimal,
    /// Creation amount in the profile's (local) currency — the cost basis.
    pub profile_amount: Decimal,
    /// Remaining balance in the account's currency.
    pub account_balance: Decimal,
    /// Remaining balance in the profile's currency.
    pub profile_balance: Decimal,
    /// When this lot was acquired. Pockets are always consumed in the
    /// order they were inserted into the ledger's per-account index, so
    /// this field is for display/audit rather than for ordering.
    pub date: NaiveDateTime,
}
