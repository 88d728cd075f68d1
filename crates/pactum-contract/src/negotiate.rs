use pactum_schema::{Schemer, Validator};
use pactum_terms::Terms;

use crate::compat::{check_compatibility, Incompatibility};
use crate::config::{ContractOptions, Enforce};
use crate::error::{ContractError, Side};

/// Outcome of comparing provider terms with consumer terms.
#[derive(Debug)]
pub enum Negotiation {
    /// The terms are compatible; `validator` enforces the agreed shape.
    Negotiated { validator: Validator },
    /// The terms are well formed but the provider does not satisfy the consumer.
    Incompatible { reasons: Vec<Incompatibility> },
    /// The terms or a schema are structurally broken.
    Malformed { error: ContractError },
}

impl Negotiation {
    pub fn is_negotiated(&self) -> bool {
        matches!(self, Negotiation::Negotiated { .. })
    }
}

/// Decide compatibility and compile the runtime validator.
///
/// Neither input is modified. The only shared state touched is the
/// schemer's compilation cache.
pub fn negotiate(
    provider: &Terms,
    consumer: &Terms,
    schemer: &Schemer,
    options: &ContractOptions,
) -> Negotiation {
    let provider_schema = match provider.declared_schema() {
        Ok(declared) => declared.schema(),
        Err(source) => {
            return Negotiation::Malformed {
                error: ContractError::Extraction {
                    side: Side::Provider,
                    source,
                },
            }
        }
    };
    let consumer_schema = match consumer.declared_schema() {
        Ok(declared) => declared.schema(),
        Err(source) => {
            return Negotiation::Malformed {
                error: ContractError::Extraction {
                    side: Side::Consumer,
                    source,
                },
            }
        }
    };

    let reasons = check_compatibility(provider_schema, consumer_schema);
    if !reasons.is_empty() {
        return Negotiation::Incompatible { reasons };
    }

    let enforced = match options.enforce {
        Enforce::Provider => provider_schema,
        Enforce::Consumer => consumer_schema,
    };
    match schemer.get_validator(enforced, &options.schemer) {
        Ok(validator) => Negotiation::Negotiated { validator },
        Err(err) => Negotiation::Malformed {
            error: ContractError::Schema(err),
        },
    }
}
