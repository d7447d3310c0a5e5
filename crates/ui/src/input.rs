//! Input node values and change validation.

use std::sync::Arc;

use tracing::debug;
use txpanel_types::{ArgType, ArgValues, Denomination, InputSpec, LookupKind, NodeId};

use crate::error::UiError;
use crate::node::NodeKind;
use crate::tree::Tree;

impl Tree {
    fn input_spec(&self, id: NodeId) -> Result<InputSpec, UiError> {
        match &self.lock().node(id)?.kind {
            NodeKind::Input(spec) => Ok(spec.clone()),
            _ => Err(UiError::WrongKind {
                node: id,
                expected: "an input",
            }),
        }
    }

    /// Account substituted for an empty sending address.
    pub fn default_account(&self) -> String {
        self.config
            .default_account
            .clone()
            .or_else(|| self.services.accounts.default_account())
            .unwrap_or_default()
    }

    /// Current value of an input, read from its bound region.
    ///
    /// An empty `addressfrom` input yields [`Tree::default_account`].
    pub fn input_value(&self, id: NodeId) -> Result<String, UiError> {
        let arg_type = self.input_spec(id)?.arg_type;
        let handle = Arc::clone(&self.lock().binding(id)?.primary);
        let value = handle.value();
        if value.is_empty() && arg_type == ArgType::AddressFrom {
            return Ok(self.default_account());
        }
        Ok(value)
    }

    /// The input's value keyed by its argument name.
    pub fn input_arg_values(&self, id: NodeId) -> Result<ArgValues, UiError> {
        let name = self.input_spec(id)?.name;
        let mut values = ArgValues::new();
        values.insert(name, self.input_value(id)?);
        Ok(values)
    }

    /// Run the validation selected by the input's type and show the outcome
    /// in its info region. Untyped inputs are not validated.
    pub async fn validate_input(&self, id: NodeId) -> Result<(), UiError> {
        let spec = self.input_spec(id)?;
        let value = self.input_value(id)?;
        let services = &self.services;
        let outcome = match spec.arg_type {
            ArgType::Address => services.accounts.lookup(&value, LookupKind::Unspecified).await,
            ArgType::AddressFrom => services.accounts.lookup(&value, LookupKind::Person).await,
            ArgType::Contract => services.accounts.lookup(&value, LookupKind::Contract).await,
            ArgType::Erc721 => services.accounts.lookup(&value, LookupKind::Erc721).await,
            ArgType::Ether => {
                services
                    .currency
                    .validate_currency(&value, Denomination::Ether, self.config.show_base_units)
            }
            ArgType::Gwei => {
                services
                    .currency
                    .validate_currency(&value, Denomination::Gwei, self.config.show_base_units)
            }
            ArgType::Function => services.functions.parse_function(&value, spec.allow_negate).await,
            ArgType::Untyped => return Ok(()),
        };

        let text = match outcome {
            Ok(description) => description,
            Err(error) => {
                debug!(node = %id, arg = %spec.name, error = %error, "input rejected");
                error.to_string()
            }
        };
        self.set_info(id, &text)
    }
}
