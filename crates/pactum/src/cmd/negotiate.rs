use crate::cmd::NegotiateArgs;
use crate::exit::{CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_negotiation, NegotiationOutput, OutputFormat};

pub fn run(args: NegotiateArgs, format: OutputFormat) -> CliResult<i32> {
    let contract = args.contract.build()?;

    let digest = contract.validator().map(|v| v.digest().to_string());
    print_negotiation(
        &NegotiationOutput {
            name: contract.name(),
            negotiated: contract.is_negotiated(),
            enforced: args.contract.enforce.as_str(),
            digest,
            incompatibilities: contract.incompatibilities(),
        },
        format,
    )?;

    if contract.is_negotiated() {
        Ok(SUCCESS)
    } else {
        tracing::info!(
            reasons = contract.incompatibilities().len(),
            "terms are incompatible"
        );
        Ok(DATA_INVALID)
    }
}
