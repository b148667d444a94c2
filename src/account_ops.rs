//! `increase_amount` and `deduct_amount`: the two primitives every split
//! ultimately reduces to, and the only places pockets are created,
//! partially consumed, or deleted.

use crate::chart::AccountingMode;
use crate::error::KorovaError;
use crate::ids::AccountId;
use crate::ledger::Ledger;
use crate::money::{is_zero, quantize};
use crate::pocket::Pocket;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;

impl Ledger {
    /// Creates at most one pocket and/or reduces existing imbalance.
    /// Returns the local-currency cost actually credited.
    pub fn increase_amount(
        &mut self,
        account_id: AccountId,
        account_amount: Decimal,
        profile_amount: Option<Decimal>,
        now: NaiveDateTime,
    ) -> Result<Decimal, KorovaError> {
        let profile_default_currency = self.profile_for_account(account_id)?.default_currency.clone();
        let account_amount = quantize(account_amount);
        let profile_amount = quantize(profile_amount.unwrap_or(account_amount));

        let account = self.account(account_id)?;
        if account.is_local(&profile_default_currency) && profile_amount != account_amount {
            return Err(KorovaError::DifferentAmountsInLocalAccount(account_id));
        }

        let imbalance = account.imbalance;
        let consumed = account_amount.min(imbalance);
        let inc_account = account_amount - consumed;
        let new_imbalance = imbalance - consumed;

        let account_mut = self.account_mut(account_id)?;
        account_mut.imbalance = new_imbalance;
        self.record_account_touched(account_id);

        if inc_account <= Decimal::ZERO {
            tracing::debug!(?account_id, %new_imbalance, "imbalance reduced, no pocket created");
            return Ok(Decimal::ZERO);
        }

        let inc_profile = quantize((profile_amount * inc_account) / account_amount);

        self.create_pocket_for(account_id, inc_account, inc_profile, now);
        tracing::debug!(?account_id, %inc_account, %inc_profile, "pocket created");
        Ok(inc_profile)
    }

    fn create_pocket_for(
        &mut self,
        account_id: AccountId,
        account_amount: Decimal,
        profile_amount: Decimal,
        now: NaiveDateTime,
    ) {
        let id = self.alloc_pocket_id();
        let pocket = Pocket {
            id,
            account_id,
            account_amount,
            profile_amount,
            account_balance: account_amount,
            profile_balance: profile_amount,
            date: now,
        };
        self.pockets.insert(id, pocket);
        self.account_pockets.entry(account_id).or_default().push(id);
        self.record_pocket_saved(id);
    }

    /// Consumes pockets for `account_id` in FIFO order until `amount` is
    /// covered; any residual becomes imbalance. Returns the local-currency
    /// cost of the deduction.
    pub fn deduct_amount(
        &mut self,
        account_id: AccountId,
        amount: Decimal,
    ) -> Result<Decimal, KorovaError> {
        if self.profile_for_account(account_id)?.accounting_mode == AccountingMode::Lifo {
            return Err(KorovaError::UnimplementedAccountingMode("LIFO"));
        }

        let mut remaining = quantize(amount);
        let mut profile_cost = Decimal::ZERO;

        let pocket_ids = self.account_pockets.get(&account_id).cloned().unwrap_or_default();
        let mut consumed_entirely = Vec::new();

        for pocket_id in pocket_ids {
            if remaining <= Decimal::ZERO {
                break;
            }
            let pocket = self.pockets.get_mut(&pocket_id).expect("pocket index is consistent");
            if is_zero(pocket.account_balance) {
                continue;
            }

            if pocket.account_balance > remaining {
                let profile_part = quantize((pocket.profile_amount * remaining) / pocket.account_amount);
                pocket.account_balance -= remaining;
                pocket.profile_balance -= profile_part;
                profile_cost += profile_part;
                remaining = Decimal::ZERO;
                self.record_pocket_saved(pocket_id);
            } else {
                remaining -= pocket.account_balance;
                profile_cost += pocket.profile_balance;
                consumed_entirely.push(pocket_id);
            }
        }

        for &pocket_id in &consumed_entirely {
            self.pockets.remove(&pocket_id);
            self.record_pocket_deleted(pocket_id);
        }
        if !consumed_entirely.is_empty() {
            if let Some(ids) = self.account_pockets.get_mut(&account_id) {
                ids.retain(|id| !consumed_entirely.contains(id));
            }
        }

        if remaining > Decimal::ZERO {
            self.account_mut(account_id)?.imbalance = remaining;
            self.record_account_touched(account_id);
            tracing::warn!(?account_id, %remaining, "deduction left residual imbalance");
        }

        Ok(profile_cost)
    }

    /// Sum of `account_balance` and `profile_balance` over all live
    /// pockets of an account.
    pub fn get_balances(&self, account_id: AccountId) -> Result<(Decimal, Decimal), KorovaError> {
        self.account(account_id)?;
        let mut account_balance = Decimal::ZERO;
        let mut profile_balance = Decimal::ZERO;
        if let Some(ids) = self.account_pockets.get(&account_id) {
            for id in ids {
                if let Some(pocket) = self.pockets.get(id) {
                    account_balance += pocket.account_balance;
                    profile_balance += pocket.profile_balance;
                }
            }
        }
        Ok((account_balance, profile_balance))
    }
}
