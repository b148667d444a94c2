//! The transaction builder: validates a batch of splits, imputes missing
//! local amounts, links every split, and books the synthetic exchange
//! gain/loss split that keeps the transaction balanced in local currency.
//! The whole operation is atomic — any error unwinds every split already
//! linked, in reverse order, before propagating.

use crate::error::KorovaError;
use crate::ids::{BookId, SplitId, TransactionId};
use crate::ledger::Ledger;
use crate::money::quantize;
use crate::split::{increase_side, NewSplit, Split, SplitType};
use crate::transaction::Transaction;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;

impl Ledger {
    /// Builds and links a balanced transaction. `date` is the effective
    /// (ordering) date; the splits are applied to their accounts in the
    /// order supplied.
    pub fn create_transaction(
        &mut self,
        book_id: BookId,
        date: NaiveDateTime,
        description: impl Into<String>,
        new_splits: Vec<NewSplit>,
        creation_date: NaiveDateTime,
    ) -> Result<TransactionId, KorovaError> {
        let book = self.book(book_id)?;
        if !book.is_ready() {
            return Err(KorovaError::BookNotReady(book_id));
        }
        for split in &new_splits {
            let account = self.account(split.account_id)?;
            if account.book_id != book_id {
                return Err(KorovaError::CrossBookTransaction(book_id));
            }
        }

        self.validate_foreign_increase_counts(&new_splits)?;

        let profile = self.profile_for_book(book_id)?.clone();

        let tx_id = self.alloc_transaction_id();
        self.transactions.insert(
            tx_id,
            Transaction {
                id: tx_id,
                book_id,
                description: description.into(),
                transaction_date: date,
                creation_date,
                splits: Vec::new(),
            },
        );

        let mut splits: Vec<Split> = Vec::with_capacity(new_splits.len());
        for new_split in new_splits {
            let id = self.alloc_split_id();
            splits.push(Split {
                id,
                account_id: new_split.account_id,
                transaction_id: Some(tx_id),
                account_amount: quantize(new_split.account_amount),
                profile_amount: quantize(new_split.profile_amount),
                split_type: new_split.split_type,
                is_linked: false,
            });
        }

        // Step 2: impute local amounts on credits lacking one.
        let mut credit_total_local = Decimal::ZERO;
        let mut foreign_debit_increase: Option<usize> = None;
        for (idx, split) in splits.iter_mut().enumerate() {
            let account = self.account(split.account_id)?;
            if split.split_type == SplitType::Credit {
                if split.profile_amount == Decimal::ZERO {
                    split.profile_amount = if account.is_foreign(&profile.default_currency) {
                        let rate = self.exchange_rate(
                            profile.id,
                            &account.currency,
                            &profile.default_currency,
                        )?;
                        quantize(rate * split.account_amount)
                    } else {
                        split.account_amount
                    };
                }
                credit_total_local += split.profile_amount;
            }
            if split.split_type == SplitType::Debit
                && account.is_foreign(&profile.default_currency)
                && split.split_type == increase_side(account.account_type)
            {
                foreign_debit_increase = Some(idx);
            }
        }

        // Step 3: local debits get their profile amount set to the
        // account-currency amount (same currency by definition).
        let mut local_debit_total = Decimal::ZERO;
        for split in splits.iter_mut() {
            let account = self.account(split.account_id)?;
            if split.split_type == SplitType::Debit && account.is_local(&profile.default_currency) {
                split.profile_amount = split.account_amount;
                local_debit_total += split.profile_amount;
            }
        }

        // Step 4: residual to the foreign debit increase, if one exists.
        if let Some(idx) = foreign_debit_increase {
            let residual = credit_total_local - local_debit_total;
            if residual <= Decimal::ZERO {
                return Err(KorovaError::NothingLeftForForeignDebit);
            }
            splits[idx].profile_amount = quantize(residual);
        }

        // Step 5: link every split, tracking a rollback list. A split is
        // staged (inserted into `self.splits`/`self.account_splits`) before
        // it is processed, so a failure must clean up that one split too —
        // it never made it into `rollback`, since it is only pushed there
        // once `process_split` succeeds.
        let mut rollback: Vec<SplitId> = Vec::new();
        for split in splits {
            let id = split.id;
            let account_id = split.account_id;
            self.splits.insert(id, split);
            self.account_splits.entry(account_id).or_default().push(id);

            if let Err(err) = self.process_split(id, creation_date) {
                self.rollback_splits(&rollback, creation_date);
                self.rollback_splits(&[id], creation_date);
                self.transactions.remove(&tx_id);
                self.take_mutations();
                return Err(err);
            }
            rollback.push(id);
        }

        // Step 6: balance check and exchange reconciliation.
        if let Err(err) = self.reconcile_balance(tx_id, book_id, &profile.default_currency, &mut rollback, creation_date) {
            self.rollback_splits(&rollback, creation_date);
            self.transactions.remove(&tx_id);
            self.take_mutations();
            return Err(err);
        }

        // Step 7: commit. Every account/pocket mutation Steps 2-6 made was
        // recorded in the mutation log; persist it in one host-side
        // transaction alongside the transaction and its splits.
        {
            let transaction = self.transactions.get_mut(&tx_id).expect("transaction exists");
            transaction.splits = rollback;
        }

        if let Err(err) = self.persist_transaction(tx_id) {
            let splits = self.transactions[&tx_id].splits.clone();
            self.rollback_splits(&splits, creation_date);
            self.transactions.remove(&tx_id);
            return Err(err);
        }

        tracing::debug!(?tx_id, ?book_id, "transaction linked");
        Ok(tx_id)
    }

    fn persist_transaction(&mut self, tx_id: TransactionId) -> Result<(), KorovaError> {
        let mutations = self.take_mutations();
        let Some(port) = self.persistence.clone() else {
            return Ok(());
        };

        let mut ptx = port.begin()?;
        if let Err(err) = self.mirror_mutations(ptx.as_mut(), tx_id, &mutations) {
            let _ = ptx.rollback();
            return Err(err);
        }
        ptx.commit()
    }

    /// Writes one `create_transaction` call's worth of mutations into an
    /// already-open persistence transaction. Left to the caller to commit
    /// or roll back depending on the result.
    fn mirror_mutations(
        &self,
        ptx: &mut dyn crate::persistence::PersistenceTransaction,
        tx_id: TransactionId,
        mutations: &crate::ledger::MutationLog,
    ) -> Result<(), KorovaError> {
        for account_id in &mutations.accounts {
            ptx.save_account(self.account(*account_id)?)?;
        }
        for pocket_id in &mutations.pocket_saves {
            if let Some(pocket) = self.pockets.get(pocket_id) {
                ptx.save_pocket(pocket)?;
            }
        }
        for pocket_id in &mutations.pocket_deletes {
            ptx.delete_pocket(*pocket_id)?;
        }

        let transaction = self.transactions.get(&tx_id).expect("transaction exists");
        ptx.save_transaction(transaction)?;
        for split_id in &transaction.splits {
            if let Some(split) = self.splits.get(split_id) {
                ptx.save_split(split)?;
            }
        }
        Ok(())
    }

    fn validate_foreign_increase_counts(&self, new_splits: &[NewSplit]) -> Result<(), KorovaError> {
        let mut foreign_debit_increases = 0u32;
        let mut foreign_credit_increases = 0u32;
        for split in new_splits {
            let account = self.account(split.account_id)?;
            let profile = self.profile_for_account(split.account_id)?;
            if !account.is_foreign(&profile.default_currency) {
                continue;
            }
            if split.split_type == increase_side(account.account_type) {
                match split.split_type {
                    SplitType::Debit => foreign_debit_increases += 1,
                    SplitType::Credit => foreign_credit_increases += 1,
                }
            }
        }
        if foreign_debit_increases > 1 || foreign_credit_increases > 1 {
            return Err(KorovaError::UnsupportedMultipleForeignIncrease);
        }
        Ok(())
    }

    fn exchange_rate(
        &self,
        profile_id: crate::ids::ProfileId,
        from: &crate::ids::CurrencyCode,
        to: &crate::ids::CurrencyCode,
    ) -> Result<Decimal, KorovaError> {
        let provider = self.rate_providers.get(&profile_id).ok_or_else(|| {
            KorovaError::ExchangeRateUnavailable {
                from: from.clone(),
                to: to.clone(),
            }
        })?;
        provider.get_exchange_rate(from, to)
    }

    fn reconcile_balance(
        &mut self,
        tx_id: TransactionId,
        book_id: BookId,
        local_currency: &crate::ids::CurrencyCode,
        rollback: &mut Vec<SplitId>,
        now: NaiveDateTime,
    ) -> Result<(), KorovaError> {
        let (tot_debits, tot_credits) = self.sum_transaction_splits(tx_id);
        if tot_debits == tot_credits {
            return Ok(());
        }

        let has_foreign_credit = rollback.iter().any(|&id| {
            let split = &self.splits[&id];
            split.split_type == SplitType::Credit
                && self
                    .accounts
                    .get(&split.account_id)
                    .map(|a| a.is_foreign(local_currency))
                    .unwrap_or(false)
        });
        if !has_foreign_credit {
            return Err(KorovaError::ImbalancedTransaction {
                debits: tot_debits.to_string(),
                credits: tot_credits.to_string(),
            });
        }

        let book = self.book(book_id)?;
        let (target_account, split_type, amount) = if tot_credits > tot_debits {
            (
                book.currency_xe_expense.expect("book is ready"),
                SplitType::Debit,
                tot_credits - tot_debits,
            )
        } else {
            (
                book.currency_xe_income.expect("book is ready"),
                SplitType::Credit,
                tot_debits - tot_credits,
            )
        };

        let synthetic_id = self.alloc_split_id();
        let synthetic = Split {
            id: synthetic_id,
            account_id: target_account,
            transaction_id: Some(tx_id),
            account_amount: quantize(amount),
            profile_amount: quantize(amount),
            split_type,
            is_linked: false,
        };
        self.splits.insert(synthetic_id, synthetic);
        self.account_splits.entry(target_account).or_default().push(synthetic_id);

        // Staged before processing, same as every other split in Step 5 —
        // a failure here must clean up the synthetic split itself rather
        // than rely on the caller's `rollback`, which it never joined.
        if let Err(err) = self.process_split(synthetic_id, now) {
            self.rollback_splits(&[synthetic_id], now);
            return Err(err);
        }
        rollback.push(synthetic_id);
        Ok(())
    }

    fn sum_transaction_splits(&self, tx_id: TransactionId) -> (Decimal, Decimal) {
        let mut debits = Decimal::ZERO;
        let mut credits = Decimal::ZERO;
        for split in self.splits.values() {
            if split.transaction_id != Some(tx_id) {
                continue;
            }
            match split.split_type {
                SplitType::Debit => debits += split.profile_amount,
                SplitType::Credit => credits += split.profile_amount,
            }
        }
        (debits, credits)
    }

    fn rollback_splits(&mut self, linked: &[SplitId], now: NaiveDateTime) {
        for &id in linked.iter().rev() {
            if let Some(split) = self.splits.get(&id) {
                if split.is_linked {
                    let _ = self.unlink_split(id, now);
                }
            }
            self.remove_split(id);
        }
    }

    fn remove_split(&mut self, id: SplitId) {
        if let Some(split) = self.splits.remove(&id) {
            if let Some(ids) = self.account_splits.get_mut(&split.account_id) {
                ids.retain(|&sid| sid != id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{AccountType, AccountingMode};
    use crate::ids::CurrencyCode;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    /// A transaction whose first split hits an unimplemented-mode error
    /// must leave no trace: no split, no account-split index entry, no
    /// transaction record. Regression test for a staged-but-never-rolled-
    /// back split leaking out of Step 5.
    #[test]
    fn a_failed_lifo_deduction_leaves_no_orphan_split() {
        let mut ledger = Ledger::with_seeded_currencies();
        let brl = CurrencyCode::from("BRL");
        let profile_id = ledger
            .create_profile(brl.clone(), "Main", "tester", AccountingMode::Lifo)
            .unwrap();
        let book_id = ledger
            .create_book(profile_id, "BOOK1", "Main Book", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), None)
            .unwrap();
        let group_id = ledger.create_top_level_group(book_id, "Root", "ROOT").unwrap();
        let asset = ledger
            .create_account(group_id, "1.01", "Caixa", brl.clone(), AccountType::Asset)
            .unwrap();
        let liability = ledger
            .create_account(group_id, "2.01", "Fornecedores", brl.clone(), AccountType::Liability)
            .unwrap();
        let initial_balances = ledger
            .create_account(group_id, "3.01", "Saldos Iniciais", brl.clone(), AccountType::Equity)
            .unwrap();
        let profit_loss = ledger
            .create_account(group_id, "3.02", "Resultado", brl.clone(), AccountType::Equity)
            .unwrap();
        let xe_income = ledger
            .create_account(group_id, "4.01", "Receitas de Cambio", brl.clone(), AccountType::Income)
            .unwrap();
        let xe_expense = ledger
            .create_account(group_id, "5.01", "Despesas de Cambio", brl, AccountType::Expense)
            .unwrap();
        ledger
            .set_designated_accounts(book_id, initial_balances, profit_loss, xe_income, xe_expense)
            .unwrap();

        let err = ledger
            .create_transaction(
                book_id,
                now(),
                "lifo decrease",
                vec![
                    NewSplit::new(asset, dec!(10), SplitType::Credit),
                    NewSplit::new(liability, dec!(10), SplitType::Debit),
                ],
                now(),
            )
            .unwrap_err();

        assert!(matches!(err, KorovaError::UnimplementedAccountingMode("LIFO")));
        assert!(ledger.splits.is_empty());
        assert!(ledger.account_splits.values().all(|ids| ids.is_empty()));
        assert!(ledger.transactions.is_empty());
    }
}
