//! Split processing: applies a split to its account, and enforces that
//! final balances are a function of transaction dates, not insertion
//! order, by unlinking and re-processing any split that was posted to a
//! date later than the one currently being linked.

use crate::error::KorovaError;
use crate::ids::{AccountId, SplitId};
use crate::ledger::Ledger;
use crate::split::increase_side;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;

impl Ledger {
    /// Links `split_id` to its account, returning the local-currency cost
    /// it produced. `now` is used as the creation timestamp of any pocket
    /// this call creates.
    pub fn process_split(
        &mut self,
        split_id: SplitId,
        now: NaiveDateTime,
    ) -> Result<Decimal, KorovaError> {
        let split = self.splits.get(&split_id).ok_or(KorovaError::NotLinked(split_id))?;
        if split.is_linked {
            return Err(KorovaError::AlreadyProcessed(split_id));
        }
        let account_id = split.account_id;
        let split_date = self.transaction_date_of(split_id)?;

        let future = self.future_linked_splits(account_id, split_date)?;
        for &f_split_id in &future {
            self.unlink_split(f_split_id, now)?;
        }

        let split = self.splits.get(&split_id).expect("split exists");
        let account_type = self.account(account_id)?.account_type;
        let split_type = split.split_type;
        let account_amount = split.account_amount;
        let profile_amount = split.profile_amount;

        let local_cost = if split_type == increase_side(account_type) {
            self.increase_amount(account_id, account_amount, Some(profile_amount), now)?
        } else {
            let cost = self.deduct_amount(account_id, account_amount)?;
            let split = self.splits.get_mut(&split_id).expect("split exists");
            split.profile_amount = cost;
            cost
        };

        let split = self.splits.get_mut(&split_id).expect("split exists");
        split.is_linked = true;

        tracing::debug!(?split_id, ?account_id, %local_cost, "split linked");

        for &f_split_id in &future {
            self.process_split(f_split_id, now)?;
        }

        Ok(local_cost)
    }

    /// Reverses the effect `process_split` had on the account: the
    /// inverse account operation of the one the split originally drove.
    /// `now` timestamps any pocket this re-introduces.
    pub fn unlink_split(
        &mut self,
        split_id: SplitId,
        now: NaiveDateTime,
    ) -> Result<Decimal, KorovaError> {
        let split = self.splits.get(&split_id).ok_or(KorovaError::NotLinked(split_id))?;
        let account_id = split.account_id;
        let account_type = self.account(account_id)?.account_type;
        let split_type = split.split_type;
        let account_amount = split.account_amount;
        let profile_amount = split.profile_amount;

        let result = if split_type == increase_side(account_type) {
            self.deduct_amount(account_id, account_amount)?
        } else {
            self.increase_amount(account_id, account_amount, Some(profile_amount), now)?
        };

        let split = self.splits.get_mut(&split_id).expect("split exists");
        split.is_linked = false;

        tracing::debug!(?split_id, ?account_id, "split unlinked");
        Ok(result)
    }

    fn transaction_date_of(&self, split_id: SplitId) -> Result<NaiveDateTime, KorovaError> {
        let split = self.splits.get(&split_id).ok_or(KorovaError::NotLinked(split_id))?;
        let transaction_id = split.transaction_id.ok_or(KorovaError::NotLinked(split_id))?;
        let transaction = self
            .transactions
            .get(&transaction_id)
            .ok_or(KorovaError::NotLinked(split_id))?;
        Ok(transaction.transaction_date)
    }

    /// Splits on `account_id`, currently linked, whose transaction date is
    /// strictly later than `after`, ordered by transaction date ascending.
    fn future_linked_splits(
        &self,
        account_id: AccountId,
        after: NaiveDateTime,
    ) -> Result<Vec<SplitId>, KorovaError> {
        let mut candidates: Vec<(NaiveDateTime, SplitId)> = Vec::new();
        if let Some(split_ids) = self.account_splits.get(&account_id) {
            for &split_id in split_ids {
                let split = self.splits.get(&split_id).expect("index is consistent");
                if !split.is_linked {
                    continue;
                }
                let date = self.transaction_date_of(split_id)?;
                if date > after {
                    candidates.push((date, split_id));
                }
            }
        }
        candidates.sort_by_key(|(date, _)| *date);
        Ok(candidates.into_iter().map(|(_, id)| id).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{AccountType, AccountingMode};
    use crate::ids::CurrencyCode;
    use crate::split::{Split, SplitType};
    use crate::transaction::Transaction;
    use rust_decimal_macros::dec;

    fn now() -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    /// Builds a one-account ledger and stages (but does not link) a split
    /// tied to a real transaction, bypassing `create_transaction` so the
    /// split-processor methods can be exercised directly.
    fn staged_split() -> (Ledger, SplitId) {
        let mut ledger = Ledger::with_seeded_currencies();
        let brl = CurrencyCode::from("BRL");
        let profile_id = ledger
            .create_profile(brl.clone(), "Main", "tester", AccountingMode::Fifo)
            .unwrap();
        let book_id = ledger
            .create_book(
                profile_id,
                "BOOK1",
                "Main Book",
                chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                None,
            )
            .unwrap();
        let group_id = ledger.create_top_level_group(book_id, "Root", "ROOT").unwrap();
        let account_id = ledger
            .create_account(group_id, "1.01", "Caixa", brl, AccountType::Asset)
            .unwrap();

        let tx_id = ledger.alloc_transaction_id();
        ledger.transactions.insert(
            tx_id,
            Transaction {
                id: tx_id,
                book_id,
                description: "seed".to_string(),
                transaction_date: now(),
                creation_date: now(),
                splits: Vec::new(),
            },
        );

        let split_id = ledger.alloc_split_id();
        ledger.splits.insert(
            split_id,
            Split {
                id: split_id,
                account_id,
                transaction_id: Some(tx_id),
                account_amount: dec!(10),
                profile_amount: dec!(10),
                split_type: SplitType::Debit,
                is_linked: false,
            },
        );
        ledger.account_splits.entry(account_id).or_default().push(split_id);

        (ledger, split_id)
    }

    #[test]
    fn processing_an_unknown_split_is_not_linked() {
        let (mut ledger, _split_id) = staged_split();
        let err = ledger.process_split(SplitId(9_999), now()).unwrap_err();
        assert!(matches!(err, KorovaError::NotLinked(_)));
    }

    #[test]
    fn processing_an_already_linked_split_fails() {
        let (mut ledger, split_id) = staged_split();
        ledger.process_split(split_id, now()).unwrap();
        let err = ledger.process_split(split_id, now()).unwrap_err();
        assert!(matches!(err, KorovaError::AlreadyProcessed(_)));
    }
}

