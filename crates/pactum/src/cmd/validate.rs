use pactum_source::SourceLoader;

use crate::cmd::ValidateArgs;
use crate::exit::{contract_error, source_error, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_validation, DataResult, OutputFormat};

pub fn run(args: ValidateArgs, format: OutputFormat) -> CliResult<i32> {
    let contract = args.contract.build()?;
    let loader = SourceLoader::new();

    let mut results = Vec::with_capacity(args.data.len());
    for reference in &args.data {
        let document = loader
            .load(reference, None)
            .map_err(|err| source_error(&format!("load data {reference}"), err))?;
        let valid = contract
            .validate(&document.content)
            .map_err(|err| contract_error("validate", err))?;
        tracing::debug!(source = %reference, valid, "validated data document");
        results.push(DataResult {
            source: reference.clone(),
            valid,
            errors: contract.validation_errors(),
        });
    }

    print_validation(contract.name(), &results, format)?;

    if results.iter().all(|r| r.valid) {
        Ok(SUCCESS)
    } else {
        Ok(DATA_INVALID)
    }
}
