//! The ledger: the in-memory object graph every kernel operation works
//! against, plus the chart-of-accounts construction surface.

use crate::chart::{Account, AccountType, AccountingMode, Book, Group, Profile};
use crate::currency::CurrencyRegistry;
use crate::error::KorovaError;
use crate::exchange::ExchangeRateProvider;
use crate::ids::{AccountId, BookId, CurrencyCode, GroupId, PocketId, ProfileId, SplitId, TransactionId};
use crate::persistence::PersistencePort;
use crate::pocket::Pocket;
use crate::split::Split;
use crate::transaction::Transaction;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Records which entities an in-progress `create_transaction` call has
/// touched, so the persistence port (if any) can be told exactly what to
/// mirror at commit time without re-deriving it from the final state.
#[derive(Default)]
pub(crate) struct MutationLog {
    pub(crate) accounts: HashSet<AccountId>,
    pub(crate) pocket_saves: Vec<PocketId>,
    pub(crate) pocket_deletes: Vec<PocketId>,
}

#[derive(Default)]
struct IdCounters {
    profile: u64,
    book: u64,
    group: u64,
    account: u64,
    pocket: u64,
    transaction: u64,
    split: u64,
}

/// The accounting kernel's in-memory store. Owns the chart of accounts,
/// pockets, transactions and splits; hands out identifiers; and carries
/// the two runtime collaborators (`exchange_rate_provider` per profile,
/// and an optional `persistence` port) that are not themselves part of
/// the persisted state.
pub struct Ledger {
    pub(crate) currencies: CurrencyRegistry,
    pub(crate) profiles: HashMap<ProfileId, Profile>,
    pub(crate) books: HashMap<BookId, Book>,
    pub(crate) groups: HashMap<GroupId, Group>,
    pub(crate) accounts: HashMap<AccountId, Account>,
    pub(crate) pockets: HashMap<PocketId, Pocket>,
    /// Per-account pockets, FIFO-ordered (oldest first) by insertion.
    pub(crate) account_pockets: HashMap<AccountId, Vec<PocketId>>,
    pub(crate) transactions: HashMap<TransactionId, Transaction>,
    pub(crate) splits: HashMap<SplitId, Split>,
    /// Per-account splits, in the order they were linked; used to find
    /// "future" splits during chronological re-linking.
    pub(crate) account_splits: HashMap<AccountId, Vec<SplitId>>,
    pub(crate) rate_providers: HashMap<ProfileId, Arc<dyn ExchangeRateProvider>>,
    pub(crate) persistence: Option<Arc<dyn PersistencePort>>,
    pub(crate) mutations: MutationLog,
    ids: IdCounters,
}

impl Ledger {
    pub fn new() -> Self {
        Ledger {
            currencies: CurrencyRegistry::new(),
            profiles: HashMap::new(),
            books: HashMap::new(),
            groups: HashMap::new(),
            accounts: HashMap::new(),
            pockets: HashMap::new(),
            account_pockets: HashMap::new(),
            transactions: HashMap::new(),
            splits: HashMap::new(),
            account_splits: HashMap::new(),
            rate_providers: HashMap::new(),
            persistence: None,
            mutations: MutationLog::default(),
            ids: IdCounters::default(),
        }
    }

    /// A ledger pre-seeded with the default currency table (BRL, USD,
    /// EUR, CLP), the common starting point for embedders and for this
    /// crate's own tests.
    pub fn with_seeded_currencies() -> Self {
        let mut ledger = Self::new();
        ledger.currencies = CurrencyRegistry::seeded();
        ledger
    }

    pub fn set_persistence(&mut self, port: Arc<dyn PersistencePort>) {
        self.persistence = Some(port);
    }

    // -- Currencies ---------------------------------------------------

    pub fn register_currency(
        &mut self,
        code: impl Into<CurrencyCode>,
        name: impl Into<String>,
        fraction: u32,
    ) -> Result<(), KorovaError> {
        self.currencies.register(code.into(), name.into(), fraction)
    }

    pub fn get_currency(&self, code: &CurrencyCode) -> Result<&crate::currency::Currency, KorovaError> {
        self.currencies.get(code)
    }

    // -- Profile / Book / Group / Account creation --------------------

    pub fn create_profile(
        &mut self,
        default_currency: CurrencyCode,
        name: impl Into<String>,
        owner: impl Into<String>,
        accounting_mode: AccountingMode,
    ) -> Result<ProfileId, KorovaError> {
        self.currencies.get(&default_currency)?;
        self.ids.profile += 1;
        let id = ProfileId(self.ids.profile);
        self.profiles.insert(
            id,
            Profile {
                id,
                name: name.into(),
                owner: owner.into(),
                default_currency,
                accounting_mode,
            },
        );
        Ok(id)
    }

    pub fn set_exchange_rate_provider(
        &mut self,
        profile_id: ProfileId,
        provider: Arc<dyn ExchangeRateProvider>,
    ) -> Result<(), KorovaError> {
        self.profile(profile_id)?;
        self.rate_providers.insert(profile_id, provider);
        Ok(())
    }

    pub fn create_book(
        &mut self,
        profile_id: ProfileId,
        code: impl Into<String>,
        name: impl Into<String>,
        start: NaiveDate,
        end: Option<NaiveDate>,
    ) -> Result<BookId, KorovaError> {
        self.profile(profile_id)?;
        let code = code.into();
        if self.books.values().any(|b| b.code == code) {
            return Err(KorovaError::DuplicateCode {
                code,
                scope: "book",
            });
        }
        self.ids.book += 1;
        let id = BookId(self.ids.book);
        self.books.insert(
            id,
            Book {
                id,
                profile_id,
                code,
                name: name.into(),
                start,
                end,
                initial_balances: None,
                profit_loss: None,
                currency_xe_income: None,
                currency_xe_expense: None,
            },
        );
        Ok(id)
    }

    pub fn set_designated_accounts(
        &mut self,
        book_id: BookId,
        initial_balances: AccountId,
        profit_loss: AccountId,
        currency_xe_income: AccountId,
        currency_xe_expense: AccountId,
    ) -> Result<(), KorovaError> {
        let book = self.book_mut(book_id)?;
        book.initial_balances = Some(initial_balances);
        book.profit_loss = Some(profit_loss);
        book.currency_xe_income = Some(currency_xe_income);
        book.currency_xe_expense = Some(currency_xe_expense);
        Ok(())
    }

    pub fn create_top_level_group(
        &mut self,
        book_id: BookId,
        name: impl Into<String>,
        code: impl Into<String>,
    ) -> Result<GroupId, KorovaError> {
        self.book(book_id)?;
        self.create_group_inner(book_id, None, name, code)
    }

    pub fn create_child_group(
        &mut self,
        parent_id: GroupId,
        name: impl Into<String>,
        code: impl Into<String>,
    ) -> Result<GroupId, KorovaError> {
        let book_id = self.group(parent_id)?.book_id;
        self.create_group_inner(book_id, Some(parent_id), name, code)
    }

    fn create_group_inner(
        &mut self,
        book_id: BookId,
        parent: Option<GroupId>,
        name: impl Into<String>,
        code: impl Into<String>,
    ) -> Result<GroupId, KorovaError> {
        let code = code.into();
        if self
            .groups
            .values()
            .any(|g| g.book_id == book_id && g.code == code)
        {
            return Err(KorovaError::DuplicateCode {
                code,
                scope: "group",
            });
        }
        self.ids.group += 1;
        let id = GroupId(self.ids.group);
        self.groups.insert(
            id,
            Group {
                id,
                book_id,
                code,
                name: name.into(),
                parent,
            },
        );
        Ok(id)
    }

    pub fn create_account(
        &mut self,
        group_id: GroupId,
        code: impl Into<String>,
        name: impl Into<String>,
        currency: CurrencyCode,
        account_type: AccountType,
    ) -> Result<AccountId, KorovaError> {
        let group = self.group(group_id)?.clone();
        let profile = self.profile_for_book(group.book_id)?;

        if account_type.is_result_account() && currency != profile.default_currency {
            return Err(KorovaError::ForeignResultAccount {
                account_type,
                currency,
            });
        }

        let code = code.into();
        if self
            .accounts
            .values()
            .any(|a| a.book_id == group.book_id && a.code == code)
        {
            return Err(KorovaError::DuplicateCode {
                code,
                scope: "account",
            });
        }

        self.ids.account += 1;
        let id = AccountId(self.ids.account);
        self.accounts.insert(
            id,
            Account {
                id,
                group_id,
                book_id: group.book_id,
                code,
                name: name.into(),
                account_type,
                currency,
                imbalance: rust_decimal::Decimal::ZERO,
            },
        );
        self.account_pockets.insert(id, Vec::new());
        self.account_splits.insert(id, Vec::new());
        Ok(id)
    }

    // -- Lookups --------------------------------------------------------

    pub fn profile(&self, id: ProfileId) -> Result<&Profile, KorovaError> {
        self.profiles
            .get(&id)
            .ok_or(KorovaError::UnknownProfile(id))
    }

    pub fn book(&self, id: BookId) -> Result<&Book, KorovaError> {
        self.books.get(&id).ok_or(KorovaError::UnknownBook(id))
    }

    fn book_mut(&mut self, id: BookId) -> Result<&mut Book, KorovaError> {
        self.books.get_mut(&id).ok_or(KorovaError::UnknownBook(id))
    }

    pub fn group(&self, id: GroupId) -> Result<&Group, KorovaError> {
        self.groups
            .get(&id)
            .ok_or(KorovaError::UnknownGroup(id))
    }

    pub fn account(&self, id: AccountId) -> Result<&Account, KorovaError> {
        self.accounts
            .get(&id)
            .ok_or(KorovaError::UnknownAccount(id))
    }

    pub(crate) fn account_mut(&mut self, id: AccountId) -> Result<&mut Account, KorovaError> {
        self.accounts
            .get_mut(&id)
            .ok_or(KorovaError::UnknownAccount(id))
    }

    pub(crate) fn profile_for_book(&self, book_id: BookId) -> Result<&Profile, KorovaError> {
        let book = self.book(book_id)?;
        self.profile(book.profile_id)
    }

    pub(crate) fn profile_for_account(&self, account_id: AccountId) -> Result<&Profile, KorovaError> {
        let account = self.account(account_id)?;
        self.profile_for_book(account.book_id)
    }

    // -- Id allocation ----------------------------------------------------

    pub(crate) fn alloc_pocket_id(&mut self) -> PocketId {
        self.ids.pocket += 1;
        PocketId(self.ids.pocket)
    }

    pub(crate) fn alloc_transaction_id(&mut self) -> TransactionId {
        self.ids.transaction += 1;
        TransactionId(self.ids.transaction)
    }

    pub(crate) fn alloc_split_id(&mut self) -> SplitId {
        self.ids.split += 1;
        SplitId(self.ids.split)
    }

    // -- Mutation log -----------------------------------------------------

    pub(crate) fn record_account_touched(&mut self, id: AccountId) {
        self.mutations.accounts.insert(id);
    }

    pub(crate) fn record_pocket_saved(&mut self, id: PocketId) {
        self.mutations.pocket_saves.push(id);
    }

    pub(crate) fn record_pocket_deleted(&mut self, id: PocketId) {
        self.mutations.pocket_deletes.push(id);
    }

    pub(crate) fn take_mutations(&mut self) -> MutationLog {
        std::mem::take(&mut self.mutations)
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}
