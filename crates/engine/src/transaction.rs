//! Transaction build and submission contracts.
//!
//! A workflow node owns one [`TransactionBuilder`] that turns the current
//! argument values into a [`Transaction`]; a single shared
//! [`TransactionSubmitter`] sends built transactions.

use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::debug;
use txpanel_types::{ArgValues, Transaction};

use crate::{BuildError, SubmitError};

/// Turns collected argument values into a submittable transaction.
#[async_trait]
pub trait TransactionBuilder: Send + Sync {
    async fn build_transaction(&self, args: &ArgValues) -> Result<Transaction, BuildError>;
}

/// Sends a built transaction.
#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    /// Submit `transaction` as `kind` and return the receipt.
    async fn submit(&self, transaction: &Transaction, kind: &str) -> Result<Value, SubmitError>;
}

/// Builder whose transaction payload is the argument map itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct EchoBuilder;

#[async_trait]
impl TransactionBuilder for EchoBuilder {
    async fn build_transaction(&self, args: &ArgValues) -> Result<Transaction, BuildError> {
        let payload: Map<String, Value> = args
            .iter()
            .map(|(name, value)| (name.clone(), Value::String(value.clone())))
            .collect();
        Ok(Transaction::new(Value::Object(payload)))
    }
}

/// Adapts a synchronous closure into a [`TransactionBuilder`].
pub struct BuildFn<F>(pub F);

#[async_trait]
impl<F> TransactionBuilder for BuildFn<F>
where
    F: Fn(&ArgValues) -> Result<Transaction, BuildError> + Send + Sync,
{
    async fn build_transaction(&self, args: &ArgValues) -> Result<Transaction, BuildError> {
        (self.0)(args)
    }
}

/// Submitter that accepts everything and echoes the request back.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSubmitter;

#[async_trait]
impl TransactionSubmitter for NoopSubmitter {
    async fn submit(&self, transaction: &Transaction, kind: &str) -> Result<Value, SubmitError> {
        debug!(kind = %kind, "noop submitter accepting transaction");
        let mut receipt = Map::new();
        receipt.insert("kind".into(), Value::String(kind.to_string()));
        receipt.insert("transaction".into(), transaction.payload.clone());
        Ok(Value::Object(receipt))
    }
}

/// Transaction builders keyed by function method name.
#[derive(Clone, Default)]
pub struct BuilderRegistry {
    builders: IndexMap<String, Arc<dyn TransactionBuilder>>,
    fallback: Option<Arc<dyn TransactionBuilder>>,
}

impl BuilderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builder(mut self, method_name: impl Into<String>, builder: Arc<dyn TransactionBuilder>) -> Self {
        self.builders.insert(method_name.into(), builder);
        self
    }

    /// Builder used for methods without a dedicated entry.
    pub fn with_fallback(mut self, builder: Arc<dyn TransactionBuilder>) -> Self {
        self.fallback = Some(builder);
        self
    }

    pub fn resolve(&self, method_name: &str) -> Option<Arc<dyn TransactionBuilder>> {
        self.builders.get(method_name).or(self.fallback.as_ref()).cloned()
    }
}

impl std::fmt::Debug for BuilderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuilderRegistry")
            .field("methods", &self.builders.keys().collect::<Vec<_>>())
            .field("has_fallback", &self.fallback.is_some())
            .finish()
    }
}
