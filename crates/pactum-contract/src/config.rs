use pactum_schema::SchemerOptions;

/// Which side's schema the runtime validator enforces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Enforce {
    /// Enforce what the provider declares it emits.
    #[default]
    Provider,
    /// Enforce what the consumer declares it accepts.
    Consumer,
}

/// Controls negotiation and validator compilation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContractOptions {
    /// Log the negotiation outcome and every incompatibility at `info`/`warn`.
    pub debug: bool,
    pub schemer: SchemerOptions,
    pub enforce: Enforce,
}
