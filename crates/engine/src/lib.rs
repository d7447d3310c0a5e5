//! # Txpanel Engine
//!
//! Contracts for the services a node tree consumes but does not implement:
//! account/contract lookup, currency validation, function-signature parsing,
//! transaction building and transaction submission. Each contract ships with a
//! small in-memory implementation so trees can run headless.
//!
//! ## Modules
//!
//! - **`directory`**: account and contract metadata lookup
//! - **`validation`**: currency and function-signature validation
//! - **`transaction`**: build/submit contracts and the per-method builder registry
//! - **`error`**: the validation/build/submit failure taxonomy

mod directory;
mod error;
mod transaction;
mod validation;

use std::sync::Arc;

pub use directory::{AccountDirectory, DirectoryEntry, NullDirectory, StaticDirectory};
pub use error::{BuildError, SubmitError, ValidationError};
pub use transaction::{BuildFn, BuilderRegistry, EchoBuilder, NoopSubmitter, TransactionBuilder, TransactionSubmitter};
pub use validation::{CurrencyValidator, DecimalCurrencyValidator, FunctionParser, SignatureParser};

/// The shared collaborators a tree calls into.
#[derive(Clone)]
pub struct Services {
    pub accounts: Arc<dyn AccountDirectory>,
    pub currency: Arc<dyn CurrencyValidator>,
    pub functions: Arc<dyn FunctionParser>,
    pub submitter: Arc<dyn TransactionSubmitter>,
}

impl Services {
    pub fn with_accounts(mut self, accounts: Arc<dyn AccountDirectory>) -> Self {
        self.accounts = accounts;
        self
    }

    pub fn with_currency(mut self, currency: Arc<dyn CurrencyValidator>) -> Self {
        self.currency = currency;
        self
    }

    pub fn with_functions(mut self, functions: Arc<dyn FunctionParser>) -> Self {
        self.functions = functions;
        self
    }

    pub fn with_submitter(mut self, submitter: Arc<dyn TransactionSubmitter>) -> Self {
        self.submitter = submitter;
        self
    }
}

impl Default for Services {
    fn default() -> Self {
        Self {
            accounts: Arc::new(NullDirectory),
            currency: Arc::new(DecimalCurrencyValidator),
            functions: Arc::new(SignatureParser),
            submitter: Arc::new(NoopSubmitter),
        }
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}
