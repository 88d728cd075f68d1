use std::path::Path;

use pactum_schema::Schemer;
use pactum_source::SourceLoader;

use crate::cmd::CheckArgs;
use crate::exit::{schema_error, source_error, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_check, print_validation, CheckOutput, DataResult, OutputFormat};

pub fn run(args: CheckArgs, format: OutputFormat) -> CliResult<i32> {
    let options = args.schemer.options();
    let validator = Schemer::shared()
        .from_file(Path::new(&args.schema), &options)
        .map_err(|err| schema_error(&format!("check {}", args.schema), err))?;

    if args.instances.is_empty() {
        print_check(
            &CheckOutput {
                path: args.schema.clone(),
                digest: validator.digest().to_string(),
                draft: options.draft.map(|d| format!("{d:?}")),
                strict: options.strict_mode,
            },
            format,
        )?;
        return Ok(SUCCESS);
    }

    let loader = SourceLoader::new();
    let mut results = Vec::with_capacity(args.instances.len());
    for reference in &args.instances {
        let document = loader
            .load(reference, None)
            .map_err(|err| source_error(&format!("load instance {reference}"), err))?;
        let valid = validator.validate(&document.content);
        results.push(DataResult {
            source: reference.clone(),
            valid,
            errors: validator.take_errors(),
        });
    }

    print_validation(None, &results, format)?;

    if results.iter().all(|r| r.valid) {
        Ok(SUCCESS)
    } else {
        Ok(DATA_INVALID)
    }
}
