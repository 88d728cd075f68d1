use clap::{Args, Subcommand, ValueEnum};
use pactum_contract::{Contract, ContractOptions, Enforce};
use pactum_schema::{SchemaDraft, SchemerOptions};
use pactum_terms::Terms;

use crate::exit::{contract_error, terms_error, CliResult};
use crate::output::OutputFormat;

pub mod check;
pub mod negotiate;
pub mod validate;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decide whether provider terms satisfy consumer terms.
    Negotiate(NegotiateArgs),
    /// Negotiate, then validate data documents against the contract.
    Validate(ValidateArgs),
    /// Compile a bare schema and optionally validate instances against it.
    Check(CheckArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Negotiate(args) => negotiate::run(args, format),
        Command::Validate(args) => validate::run(args, format),
        Command::Check(args) => check::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum DraftArg {
    #[value(name = "4")]
    Draft4,
    #[value(name = "6")]
    Draft6,
    #[value(name = "7")]
    Draft7,
    #[value(name = "2019-09")]
    Draft201909,
    #[value(name = "2020-12")]
    Draft202012,
}

impl From<DraftArg> for SchemaDraft {
    fn from(draft: DraftArg) -> Self {
        match draft {
            DraftArg::Draft4 => SchemaDraft::Draft4,
            DraftArg::Draft6 => SchemaDraft::Draft6,
            DraftArg::Draft7 => SchemaDraft::Draft7,
            DraftArg::Draft201909 => SchemaDraft::Draft201909,
            DraftArg::Draft202012 => SchemaDraft::Draft202012,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, ValueEnum)]
pub enum EnforceArg {
    #[default]
    Provider,
    Consumer,
}

impl EnforceArg {
    pub fn as_str(self) -> &'static str {
        match self {
            EnforceArg::Provider => "provider",
            EnforceArg::Consumer => "consumer",
        }
    }
}

impl From<EnforceArg> for Enforce {
    fn from(enforce: EnforceArg) -> Self {
        match enforce {
            EnforceArg::Provider => Enforce::Provider,
            EnforceArg::Consumer => Enforce::Consumer,
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct SchemerArgs {
    /// JSON Schema draft to compile against. Default: detect from `$schema`.
    #[arg(long, value_name = "DRAFT", env = "PACTUM_DRAFT")]
    pub draft: Option<DraftArg>,
    /// Reject properties that object schemas do not declare.
    #[arg(long)]
    pub strict: bool,
}

impl SchemerArgs {
    pub fn options(&self) -> SchemerOptions {
        SchemerOptions {
            draft: self.draft.map(SchemaDraft::from),
            strict_mode: self.strict,
        }
    }
}

#[derive(Args, Debug)]
pub struct ContractArgs {
    /// Provider terms (JSON or TOML file).
    pub provider: String,
    /// Consumer terms (JSON or TOML file).
    pub consumer: String,
    /// Which side's schema the runtime validator enforces.
    #[arg(long, value_name = "SIDE", default_value = "provider")]
    pub enforce: EnforceArg,
    /// Log negotiation details at info level.
    #[arg(long)]
    pub debug: bool,
    #[command(flatten)]
    pub schemer: SchemerArgs,
}

impl ContractArgs {
    pub fn options(&self) -> ContractOptions {
        ContractOptions {
            debug: self.debug,
            schemer: self.schemer.options(),
            enforce: self.enforce.into(),
        }
    }

    /// Load both sides and negotiate. Relative paths resolve against the
    /// working directory.
    pub fn build(&self) -> CliResult<Contract> {
        let provider = Terms::load(self.provider.as_str(), None)
            .map_err(|err| terms_error("load provider terms", err))?;
        let consumer = Terms::load(self.consumer.as_str(), None)
            .map_err(|err| terms_error("load consumer terms", err))?;
        Contract::with_options(provider, consumer, &self.options())
            .map_err(|err| contract_error("negotiate", err))
    }
}

#[derive(Args, Debug)]
pub struct NegotiateArgs {
    #[command(flatten)]
    pub contract: ContractArgs,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub contract: ContractArgs,
    /// Data documents to validate (JSON or TOML files).
    #[arg(required = true, num_args = 1.., value_name = "DATA")]
    pub data: Vec<String>,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Bare JSON Schema file.
    pub schema: String,
    /// Validate this instance document against the schema (repeatable).
    #[arg(long = "instance", value_name = "FILE")]
    pub instances: Vec<String>,
    #[command(flatten)]
    pub schemer: SchemerArgs,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
