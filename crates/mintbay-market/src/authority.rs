//! Seam to the external ledger authority. The market issues custody and
//! payment commands through this trait and never settles funds itself.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::future::Future;
use std::sync::Mutex;

use mintbay_types::{AccountId, Amount, TokenId};

/// `Rejected` is a definitive authority answer (wrong owner, short funds)
/// and is never retried. `Unavailable` is transient I/O.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthorityError {
    Rejected(String),
    Unavailable(String),
}

impl std::fmt::Display for AuthorityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected(msg) => write!(f, "Authority rejected: {}", msg),
            Self::Unavailable(msg) => write!(f, "Authority unavailable: {}", msg),
        }
    }
}

impl std::error::Error for AuthorityError {}

pub trait LedgerAuthority: Send + Sync {
    /// Current owner of a token, `None` when the token does not exist.
    fn owner_of(
        &self,
        token: &TokenId,
    ) -> impl Future<Output = Result<Option<AccountId>, AuthorityError>> + Send;

    /// Whether the marketplace may move the token on the owner's behalf.
    fn custody_approved(
        &self,
        owner: &AccountId,
        token: &TokenId,
    ) -> impl Future<Output = Result<bool, AuthorityError>> + Send;

    fn mint_tokens(
        &self,
        receiver: &AccountId,
        tokens: &[TokenId],
    ) -> impl Future<Output = Result<(), AuthorityError>> + Send;

    fn transfer_token(
        &self,
        from: &AccountId,
        to: &AccountId,
        token: &TokenId,
    ) -> impl Future<Output = Result<(), AuthorityError>> + Send;

    /// Direct payment between accounts.
    fn charge(
        &self,
        payer: &AccountId,
        payee: &AccountId,
        amount: Amount,
    ) -> impl Future<Output = Result<(), AuthorityError>> + Send;

    /// Move funds from an account into marketplace-held escrow.
    fn hold_escrow(
        &self,
        payer: &AccountId,
        amount: Amount,
    ) -> impl Future<Output = Result<(), AuthorityError>> + Send;

    /// Pay out marketplace-held escrow.
    fn release_escrow(
        &self,
        payee: &AccountId,
        amount: Amount,
    ) -> impl Future<Output = Result<(), AuthorityError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AuthorityOp {
    OwnerOf,
    CustodyApproved,
    MintTokens,
    TransferToken,
    Charge,
    HoldEscrow,
    ReleaseEscrow,
}

#[derive(Default)]
struct Books {
    balances: BTreeMap<AccountId, u128>,
    escrow_pool: u128,
    owners: BTreeMap<TokenId, AccountId>,
    custody_revoked: BTreeSet<TokenId>,
    scripted_failures: BTreeMap<AuthorityOp, VecDeque<AuthorityError>>,
}

impl Books {
    fn take_failure(&mut self, op: AuthorityOp) -> Option<AuthorityError> {
        self.scripted_failures.get_mut(&op).and_then(VecDeque::pop_front)
    }
}

/// In-process authority for tests and dev mode. Tokens minted through the
/// marketplace stay custodial, so `custody_approved` holds unless a test
/// revokes it; failures are scripted per operation.
pub struct MemoryAuthority {
    books: Mutex<Books>,
}

impl Default for MemoryAuthority {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAuthority {
    pub fn new() -> Self {
        Self {
            books: Mutex::new(Books::default()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Books> {
        self.books.lock().unwrap_or_else(|e| e.into_inner())
    }

    // --- Test helpers ---

    /// Queue a failure for the next call of `op`.
    pub fn fail_next(&self, op: AuthorityOp, error: AuthorityError) {
        self.lock()
            .scripted_failures
            .entry(op)
            .or_default()
            .push_back(error);
    }

    pub fn deposit(&self, account: &AccountId, amount: Amount) {
        let mut books = self.lock();
        *books.balances.entry(account.clone()).or_insert(0) += amount.0;
    }

    pub fn balance(&self, account: &AccountId) -> Amount {
        Amount(self.lock().balances.get(account).copied().unwrap_or(0))
    }

    pub fn escrow_total(&self) -> Amount {
        Amount(self.lock().escrow_pool)
    }

    pub fn token_owner(&self, token: &TokenId) -> Option<AccountId> {
        self.lock().owners.get(token).cloned()
    }

    pub fn revoke_custody(&self, token: &TokenId) {
        self.lock().custody_revoked.insert(token.clone());
    }

    pub fn restore_custody(&self, token: &TokenId) {
        self.lock().custody_revoked.remove(token);
    }
}

impl LedgerAuthority for MemoryAuthority {
    async fn owner_of(&self, token: &TokenId) -> Result<Option<AccountId>, AuthorityError> {
        let mut books = self.lock();
        if let Some(err) = books.take_failure(AuthorityOp::OwnerOf) {
            return Err(err);
        }
        Ok(books.owners.get(token).cloned())
    }

    async fn custody_approved(
        &self,
        owner: &AccountId,
        token: &TokenId,
    ) -> Result<bool, AuthorityError> {
        let mut books = self.lock();
        if let Some(err) = books.take_failure(AuthorityOp::CustodyApproved) {
            return Err(err);
        }
        Ok(books.owners.get(token) == Some(owner) && !books.custody_revoked.contains(token))
    }

    async fn mint_tokens(
        &self,
        receiver: &AccountId,
        tokens: &[TokenId],
    ) -> Result<(), AuthorityError> {
        let mut books = self.lock();
        if let Some(err) = books.take_failure(AuthorityOp::MintTokens) {
            return Err(err);
        }
        for token in tokens {
            if books.owners.contains_key(token) {
                return Err(AuthorityError::Rejected(format!(
                    "token {} already exists",
                    token
                )));
            }
        }
        for token in tokens {
            books.owners.insert(token.clone(), receiver.clone());
        }
        Ok(())
    }

    async fn transfer_token(
        &self,
        from: &AccountId,
        to: &AccountId,
        token: &TokenId,
    ) -> Result<(), AuthorityError> {
        let mut books = self.lock();
        if let Some(err) = books.take_failure(AuthorityOp::TransferToken) {
            return Err(err);
        }
        match books.owners.get(token) {
            Some(owner) if owner == from => {
                books.owners.insert(token.clone(), to.clone());
                Ok(())
            }
            Some(_) => Err(AuthorityError::Rejected(format!(
                "{} does not own token {}",
                from, token
            ))),
            None => Err(AuthorityError::Rejected(format!("unknown token {}", token))),
        }
    }

    async fn charge(
        &self,
        payer: &AccountId,
        payee: &AccountId,
        amount: Amount,
    ) -> Result<(), AuthorityError> {
        let mut books = self.lock();
        if let Some(err) = books.take_failure(AuthorityOp::Charge) {
            return Err(err);
        }
        let available = books.balances.get(payer).copied().unwrap_or(0);
        if available < amount.0 {
            return Err(AuthorityError::Rejected(format!(
                "insufficient balance: {} has {}, needs {}",
                payer, available, amount
            )));
        }
        *books.balances.entry(payer.clone()).or_insert(0) -= amount.0;
        *books.balances.entry(payee.clone()).or_insert(0) += amount.0;
        Ok(())
    }

    async fn hold_escrow(&self, payer: &AccountId, amount: Amount) -> Result<(), AuthorityError> {
        let mut books = self.lock();
        if let Some(err) = books.take_failure(AuthorityOp::HoldEscrow) {
            return Err(err);
        }
        let available = books.balances.get(payer).copied().unwrap_or(0);
        if available < amount.0 {
            return Err(AuthorityError::Rejected(format!(
                "insufficient balance: {} has {}, needs {}",
                payer, available, amount
            )));
        }
        *books.balances.entry(payer.clone()).or_insert(0) -= amount.0;
        books.escrow_pool += amount.0;
        Ok(())
    }

    async fn release_escrow(&self, payee: &AccountId, amount: Amount) -> Result<(), AuthorityError> {
        let mut books = self.lock();
        if let Some(err) = books.take_failure(AuthorityOp::ReleaseEscrow) {
            return Err(err);
        }
        if books.escrow_pool < amount.0 {
            return Err(AuthorityError::Rejected(format!(
                "escrow pool {} cannot cover {}",
                books.escrow_pool, amount
            )));
        }
        books.escrow_pool -= amount.0;
        *books.balances.entry(payee.clone()).or_insert(0) += amount.0;
        Ok(())
    }
}
