use pactum_schema::{Schemer, ValidationErrorRecord, ValidationReport, Validator};
use pactum_terms::Terms;
use serde_json::Value;

use crate::compat::Incompatibility;
use crate::config::ContractOptions;
use crate::error::{ContractError, Result};
use crate::negotiate::{negotiate, Negotiation};

/// A negotiated (or one-sided) agreement on the shape of exchanged data.
///
/// A contract is negotiated exactly when it holds a validator; both are
/// fixed at construction.
#[derive(Debug, Clone)]
pub struct Contract {
    name: Option<String>,
    provider_terms: Option<Terms>,
    consumer_terms: Option<Terms>,
    validator: Option<Validator>,
    incompatibilities: Vec<Incompatibility>,
    debug: bool,
}

impl Contract {
    /// Negotiate with default options and the shared schemer.
    pub fn new(provider: Terms, consumer: Terms) -> Result<Self> {
        Self::with_options(provider, consumer, &ContractOptions::default())
    }

    /// Negotiate with explicit options and the shared schemer.
    pub fn with_options(provider: Terms, consumer: Terms, options: &ContractOptions) -> Result<Self> {
        Self::with_schemer(provider, consumer, Schemer::shared(), options)
    }

    /// Negotiate with an explicit schemer.
    ///
    /// Malformed terms or schemas are returned as errors. Incompatible terms
    /// yield a contract that is not negotiated.
    pub fn with_schemer(
        provider: Terms,
        consumer: Terms,
        schemer: &Schemer,
        options: &ContractOptions,
    ) -> Result<Self> {
        let name = match (provider.name(), consumer.name()) {
            (Some(p), Some(c)) => Some(format!("{p}->{c}")),
            (p, c) => p.or(c).map(str::to_string),
        };

        let (validator, incompatibilities) =
            match negotiate(&provider, &consumer, schemer, options) {
                Negotiation::Negotiated { validator } => (Some(validator), Vec::new()),
                Negotiation::Incompatible { reasons } => (None, reasons),
                Negotiation::Malformed { error } => {
                    tracing::warn!(contract = name.as_deref(), %error, "malformed contract terms");
                    return Err(error);
                }
            };

        let contract = Self {
            name,
            provider_terms: Some(provider),
            consumer_terms: Some(consumer),
            validator,
            incompatibilities,
            debug: options.debug,
        };
        contract.log_outcome();
        Ok(contract)
    }

    /// Build a contract from one party's terms and a validator supplied by
    /// the other party.
    ///
    /// The local definition is kept as consumer terms. The contract is
    /// negotiated whenever `validator` is present.
    pub fn from_terms(
        name: impl Into<String>,
        definition: Value,
        validator: Option<Validator>,
        debug: bool,
    ) -> Self {
        let contract = Self {
            name: Some(name.into()),
            provider_terms: None,
            consumer_terms: Some(Terms::new(definition)),
            validator,
            incompatibilities: Vec::new(),
            debug,
        };
        contract.log_outcome();
        contract
    }

    /// Check `data` against the negotiated shape.
    ///
    /// A mismatch is `Ok(false)`; inspect [`Contract::validation_errors`]
    /// for the reasons. Fails only when the contract is not negotiated.
    pub fn validate(&self, data: &Value) -> Result<bool> {
        let validator = self
            .validator
            .as_ref()
            .ok_or_else(|| ContractError::NotNegotiated {
                name: self.display_name().to_string(),
            })?;

        let valid = validator.validate(data);
        if !valid && self.debug {
            tracing::debug!(
                contract = self.display_name(),
                errors = validator.errors().len(),
                "data rejected"
            );
        }
        Ok(valid)
    }

    pub fn is_negotiated(&self) -> bool {
        self.validator.is_some()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn provider_terms(&self) -> Option<&Terms> {
        self.provider_terms.as_ref()
    }

    pub fn consumer_terms(&self) -> Option<&Terms> {
        self.consumer_terms.as_ref()
    }

    pub fn validator(&self) -> Option<&Validator> {
        self.validator.as_ref()
    }

    /// Why negotiation failed. Empty for negotiated and one-sided contracts.
    pub fn incompatibilities(&self) -> &[Incompatibility] {
        &self.incompatibilities
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Errors recorded by the most recent [`Contract::validate`] call.
    pub fn validation_errors(&self) -> Vec<ValidationErrorRecord> {
        self.validator
            .as_ref()
            .map(Validator::errors)
            .unwrap_or_default()
    }

    /// [`Contract::validation_errors`] formatted as a report.
    pub fn report(&self) -> ValidationReport {
        Schemer::report_validation_errors(&self.validation_errors())
    }

    fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }

    fn log_outcome(&self) {
        let name = self.display_name();
        let negotiated = self.is_negotiated();
        if self.debug {
            tracing::info!(contract = name, negotiated, "contract negotiation finished");
            for reason in &self.incompatibilities {
                tracing::warn!(contract = name, path = %reason.path, rule = %reason.rule, "{}", reason.detail);
            }
        } else {
            tracing::debug!(
                contract = name,
                negotiated,
                incompatibilities = self.incompatibilities.len(),
                "contract negotiation finished"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::error::ErrorKind;

    use super::*;

    fn terms(name: &str, schema: Value) -> Terms {
        Terms::new(json!({ "name": name, "declaredSchema": schema }))
    }

    fn provider() -> Terms {
        terms(
            "orders",
            json!({
                "type": "object",
                "required": ["id"],
                "properties": { "id": { "type": "string" } }
            }),
        )
    }

    #[test]
    fn negotiated_contract_validates() {
        let contract = Contract::new(
            provider(),
            terms("billing", json!({"type": "object", "required": ["id"]})),
        )
        .unwrap();

        assert!(contract.is_negotiated());
        assert_eq!(contract.name(), Some("orders->billing"));
        assert!(contract.validate(&json!({"id": "abc"})).unwrap());
        assert!(!contract.validate(&json!({})).unwrap());

        let errors = contract.validation_errors();
        assert!(!errors.is_empty());
        assert!(errors.iter().any(|e| e.message.contains("id")));
        assert!(contract.report().to_string().contains("id"));
    }

    #[test]
    fn incompatible_contract_refuses_validation() {
        let contract = Contract::new(
            provider(),
            terms("mailer", json!({"type": "object", "required": ["email"]})),
        )
        .unwrap();

        assert!(!contract.is_negotiated());
        assert!(contract.validator().is_none());
        assert_eq!(contract.incompatibilities().len(), 1);

        let err = contract.validate(&json!({"id": "abc"})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotNegotiated);
        assert!(err.to_string().contains("orders->mailer"));
    }

    #[test]
    fn malformed_terms_are_errors() {
        let err = Contract::new(provider(), Terms::new(json!({"name": "bare"}))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaExtraction);
    }

    #[test]
    fn terms_are_kept_unchanged() {
        let provider = provider();
        let consumer = terms("billing", json!({"type": "object"}));
        let contract = Contract::new(provider.clone(), consumer.clone()).unwrap();

        assert_eq!(contract.provider_terms(), Some(&provider));
        assert_eq!(contract.consumer_terms(), Some(&consumer));
    }

    #[test]
    fn one_sided_contract_uses_supplied_validator() {
        let validator = Schemer::new()
            .get_validator(&json!({"type": "integer"}), &Default::default())
            .unwrap();
        let contract = Contract::from_terms(
            "counter",
            json!({"declaredSchema": {"type": "number"}}),
            Some(validator),
            true,
        );

        assert!(contract.is_negotiated());
        assert!(contract.is_debug());
        assert!(contract.provider_terms().is_none());
        assert!(contract.consumer_terms().is_some());
        assert!(contract.validate(&json!(3)).unwrap());
        assert!(!contract.validate(&json!(3.5)).unwrap());
    }

    #[test]
    fn one_sided_contract_without_validator_is_not_negotiated() {
        let contract = Contract::from_terms("idle", json!({}), None, false);
        assert!(!contract.is_negotiated());
        assert_eq!(contract.name(), Some("idle"));
        assert!(contract.validation_errors().is_empty());
        assert_eq!(
            contract.validate(&json!(null)).unwrap_err().kind(),
            ErrorKind::NotNegotiated
        );
    }
}
