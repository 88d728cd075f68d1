mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "pactum", version, about = "Provider/consumer contract negotiation CLI")]
struct Cli {
    /// Output format. Default: table on a terminal, json otherwise.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(
        long,
        value_name = "FORMAT",
        default_value = "text",
        env = "PACTUM_LOG_FORMAT",
        global = true
    )]
    log_format: LogFormat,

    /// Minimum log level (stderr). PACTUM_LOG adds per-crate directives.
    #[arg(
        long,
        value_name = "LEVEL",
        default_value = "warn",
        env = "PACTUM_LOG_LEVEL",
        global = true
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() { exit::USAGE } else { exit::SUCCESS };
            let _ = err.print();
            std::process::exit(code);
        }
    };
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            tracing::debug!(code = err.code, "command failed");
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_negotiate_subcommand() {
        let cli = Cli::try_parse_from([
            "pactum",
            "negotiate",
            "provider.json",
            "consumer.toml",
            "--enforce",
            "consumer",
            "--draft",
            "2020-12",
        ])
        .expect("negotiate args should parse");

        let Command::Negotiate(args) = cli.command else {
            panic!("expected negotiate");
        };
        assert_eq!(args.contract.provider, "provider.json");
        assert!(matches!(args.contract.enforce, cmd::EnforceArg::Consumer));
        assert!(args.contract.schemer.draft.is_some());
    }

    #[test]
    fn validate_requires_data() {
        let err = Cli::try_parse_from(["pactum", "validate", "p.json", "c.json"])
            .expect_err("missing data should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn parses_check_with_instances() {
        let cli = Cli::try_parse_from([
            "pactum",
            "--format",
            "json",
            "check",
            "schema.json",
            "--instance",
            "a.json",
            "--instance",
            "b.json",
            "--strict",
        ])
        .expect("check args should parse");

        let Command::Check(args) = cli.command else {
            panic!("expected check");
        };
        assert_eq!(args.instances, vec!["a.json", "b.json"]);
        assert!(args.schemer.strict);
    }
}
