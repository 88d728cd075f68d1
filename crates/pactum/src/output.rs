use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use pactum_contract::Incompatibility;
use pactum_schema::ValidationErrorRecord;
use serde::Serialize;

use crate::exit::{encode_error, write_error, CliResult};

const SCHEMA_BASE: &str = "https://schemas.3leaps.dev/pactum/cli/v1";

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
pub struct NegotiationOutput<'a> {
    pub name: Option<&'a str>,
    pub negotiated: bool,
    pub enforced: &'static str,
    pub digest: Option<String>,
    pub incompatibilities: &'a [Incompatibility],
}

#[derive(Serialize)]
pub struct DataResult {
    pub source: String,
    pub valid: bool,
    pub errors: Vec<ValidationErrorRecord>,
}

#[derive(Serialize)]
pub struct CheckOutput {
    pub path: String,
    pub digest: String,
    pub draft: Option<String>,
    pub strict: bool,
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    schema_id: String,
    #[serde(flatten)]
    body: &'a T,
}

fn render_json<T: Serialize>(kind: &str, body: &T) -> CliResult<String> {
    let out = Envelope {
        schema_id: format!("{SCHEMA_BASE}/{kind}.schema.json"),
        body,
    };
    serde_json::to_string(&out).map_err(|err| encode_error(kind, err))
}

fn emit(text: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{text}")
        .and_then(|()| stdout.flush())
        .map_err(write_error)
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub fn print_negotiation(out: &NegotiationOutput<'_>, format: OutputFormat) -> CliResult<()> {
    let text = match format {
        OutputFormat::Json => render_json("negotiation", out)?,
        OutputFormat::Table => {
            let mut table = new_table(vec!["CONTRACT", "NEGOTIATED", "ENFORCED", "DIGEST"]);
            table.add_row(vec![
                out.name.unwrap_or("-").to_string(),
                out.negotiated.to_string(),
                out.enforced.to_string(),
                out.digest.clone().unwrap_or_else(|| "-".to_string()),
            ]);
            let mut text = table.to_string();

            if !out.incompatibilities.is_empty() {
                let mut reasons = new_table(vec!["PATH", "RULE", "DETAIL"]);
                for reason in out.incompatibilities {
                    reasons.add_row(vec![
                        pointer_or_root(&reason.path).to_string(),
                        reason.rule.to_string(),
                        reason.detail.clone(),
                    ]);
                }
                text.push('\n');
                text.push_str(&reasons.to_string());
            }
            text
        }
        OutputFormat::Pretty => {
            let mut lines = vec![format!(
                "contract={} negotiated={} enforced={}",
                out.name.unwrap_or("-"),
                out.negotiated,
                out.enforced
            )];
            lines.extend(out.incompatibilities.iter().map(|reason| format!("  {reason}")));
            lines.join("\n")
        }
    };
    emit(&text)
}

pub fn print_validation(
    contract: Option<&str>,
    results: &[DataResult],
    format: OutputFormat,
) -> CliResult<()> {
    let text = match format {
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct ValidationOutput<'a> {
                contract: Option<&'a str>,
                valid: bool,
                results: &'a [DataResult],
            }
            render_json(
                "validation",
                &ValidationOutput {
                    contract,
                    valid: results.iter().all(|r| r.valid),
                    results,
                },
            )?
        }
        OutputFormat::Table => {
            let mut table = new_table(vec!["SOURCE", "VALID", "PATH", "MESSAGE"]);
            for result in results {
                if result.errors.is_empty() {
                    table.add_row(vec![
                        result.source.clone(),
                        result.valid.to_string(),
                        String::new(),
                        String::new(),
                    ]);
                }
                for error in &result.errors {
                    table.add_row(vec![
                        result.source.clone(),
                        result.valid.to_string(),
                        pointer_or_root(&error.instance_path).to_string(),
                        error.message.clone(),
                    ]);
                }
            }
            table.to_string()
        }
        OutputFormat::Pretty => {
            let mut lines = Vec::new();
            for result in results {
                let verdict = if result.valid { "ok" } else { "invalid" };
                lines.push(format!("{}: {verdict}", result.source));
                lines.extend(result.errors.iter().map(|error| format!("  {error}")));
            }
            lines.join("\n")
        }
    };
    emit(&text)
}

pub fn print_check(out: &CheckOutput, format: OutputFormat) -> CliResult<()> {
    let text = match format {
        OutputFormat::Json => render_json("check", out)?,
        OutputFormat::Table => {
            let mut table = new_table(vec!["SCHEMA", "DIGEST", "DRAFT", "STRICT"]);
            table.add_row(vec![
                out.path.clone(),
                out.digest.clone(),
                out.draft.clone().unwrap_or_else(|| "auto".to_string()),
                out.strict.to_string(),
            ]);
            table.to_string()
        }
        OutputFormat::Pretty => format!("{}: ok (sha256 {})", out.path, out.digest),
    };
    emit(&text)
}

fn pointer_or_root(pointer: &str) -> &str {
    if pointer.is_empty() {
        "/"
    } else {
        pointer
    }
}
