//! Purpose: `sharpspring` CLI entry point.
//! Role: Binary crate root; parses args, builds the client, emits JSON on stdout.
//! Invariants: Successful commands print exactly one JSON document on stdout.
//! Invariants: Errors are emitted as JSON on stderr (plain text on a terminal).
//! Invariants: Process exit code is derived from `api::to_exit_code`.
#![allow(clippy::result_large_err)]
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum, ValueHint, error::ErrorKind as ClapErrorKind};
use clap_complete::aot::Shell;
use serde_json::{Map, Value, json};
use sharpspring::api::{
    ApiVersion, ClientConfig, ENV_ACCOUNT_ID, ENV_API_VERSION, ENV_BASE_URL, ENV_SECRET_KEY,
    Error, ErrorKind, to_exit_code,
};
use std::error::Error as StdError;
use tracing_subscriber::EnvFilter;

mod command_dispatch;

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, Error> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    Error::new(ErrorKind::Internal)
                        .with_message("failed to write help")
                        .with_source(io_err)
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message(clap_error_summary(&err))
                    .with_hint("Try `sharpspring --help`."));
            }
        },
    };

    init_tracing();

    if let Command::Completion { shell } = cli.command {
        command_dispatch::emit_completion(shell);
        return Ok(RunOutcome::ok());
    }

    let config = resolve_config(&cli.connection)?;
    command_dispatch::dispatch_command(cli.command, config).map_err(add_remote_hint)
}

/// Diagnostics go to stderr so stdout stays machine-readable.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

#[derive(Debug, Parser)]
#[command(
    name = "sharpspring",
    version,
    about = "Command-line client for the SharpSpring API",
    long_about = None,
    after_help = r#"EXAMPLES
  $ sharpspring get lead 1234
  $ sharpspring list lead --where '{"emailAddress":"ana@example.com"}' --limit 10
  $ sharpspring range opportunity --start '2024-01-01 00:00:00' --end '2024-02-01 00:00:00' --timestamp update
  $ sharpspring call getFields --params '{"where":{}}'

Credentials come from --account-id/--secret-key, a --config file, or
SHARPSPRING_ACCOUNT_ID / SHARPSPRING_SECRET_KEY."#,
    arg_required_else_help = true
)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, clap::Args)]
struct ConnectionArgs {
    #[arg(
        long,
        global = true,
        help = "JSON config file with account_id, secret_key, api_version",
        value_hint = ValueHint::FilePath
    )]
    config: Option<PathBuf>,
    #[arg(long, global = true, env = ENV_ACCOUNT_ID, help = "API account id")]
    account_id: Option<String>,
    #[arg(
        long,
        global = true,
        env = ENV_SECRET_KEY,
        hide_env_values = true,
        help = "API secret key"
    )]
    secret_key: Option<String>,
    #[arg(
        long,
        global = true,
        env = ENV_API_VERSION,
        help = "API version: v1 (account timezone) or v1.2 (UTC)"
    )]
    api_version: Option<String>,
    #[arg(long, global = true, env = ENV_BASE_URL, help = "Override the API base url")]
    base_url: Option<String>,
    #[arg(long, global = true, help = "Request timeout in seconds")]
    timeout: Option<u64>,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Invoke any API method with raw JSON params and print its result")]
    Call {
        #[arg(help = "API method name, e.g. getLeads")]
        method: String,
        #[arg(long, default_value = "{}", help = "Params object as inline JSON")]
        params: String,
    },
    #[command(about = "Fetch one record by id")]
    Get {
        #[arg(value_enum)]
        entity: Entity,
        id: u64,
    },
    #[command(about = "List records matching a where clause")]
    List {
        #[arg(value_enum)]
        entity: Entity,
        #[arg(long = "where", default_value = "{}", help = "Where clause as inline JSON")]
        where_clause: String,
        #[arg(long)]
        limit: Option<u64>,
        #[arg(long)]
        offset: Option<u64>,
        #[arg(long, value_delimiter = ',', help = "Comma-separated lead fields to return")]
        fields: Vec<String>,
    },
    #[command(about = "List records created or updated within a date range")]
    Range {
        #[arg(value_enum)]
        entity: Entity,
        #[arg(long, help = "Start, YYYY-MM-DD HH:MM:SS")]
        start: String,
        #[arg(long, help = "End, YYYY-MM-DD HH:MM:SS")]
        end: String,
        #[arg(long, default_value = "update", help = "create|update")]
        timestamp: String,
    },
    #[command(about = "Delete records by id")]
    Delete {
        #[arg(value_enum)]
        entity: Entity,
        #[arg(required = true, num_args = 1..)]
        ids: Vec<u64>,
    },
    #[command(about = "Generate shell completions")]
    Completion {
        #[arg(help = "Shell to generate completions for")]
        shell: Shell,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Entity {
    Account,
    ActiveList,
    Campaign,
    Client,
    DealStage,
    Email,
    EmailListing,
    Field,
    Lead,
    ListMembership,
    ListTag,
    Opportunity,
    OpportunityLead,
    UserProfile,
}

impl Entity {
    fn name(self) -> &'static str {
        match self {
            Entity::Account => "account",
            Entity::ActiveList => "active-list",
            Entity::Campaign => "campaign",
            Entity::Client => "client",
            Entity::DealStage => "deal-stage",
            Entity::Email => "email",
            Entity::EmailListing => "email-listing",
            Entity::Field => "field",
            Entity::Lead => "lead",
            Entity::ListMembership => "list-membership",
            Entity::ListTag => "list-tag",
            Entity::Opportunity => "opportunity",
            Entity::OpportunityLead => "opportunity-lead",
            Entity::UserProfile => "user-profile",
        }
    }
}

fn resolve_config(args: &ConnectionArgs) -> Result<ClientConfig, Error> {
    let mut config = match (&args.config, &args.account_id, &args.secret_key) {
        (_, Some(account_id), Some(secret_key)) => ClientConfig::new(account_id, secret_key),
        (Some(path), _, _) => ClientConfig::from_json_file(path)?,
        _ => {
            return Err(Error::new(ErrorKind::Usage)
                .with_message("missing API credentials")
                .with_hint(format!(
                    "Pass --account-id and --secret-key, --config, or set {ENV_ACCOUNT_ID} and {ENV_SECRET_KEY}."
                )));
        }
    };
    if let Some(version) = &args.api_version {
        config = config.with_api_version(ApiVersion::parse_lenient(version));
    }
    if let Some(base_url) = &args.base_url {
        config = config.with_base_url(base_url)?;
    }
    if let Some(secs) = args.timeout {
        config = config.with_timeout(std::time::Duration::from_secs(secs));
    }
    Ok(config)
}

fn add_remote_hint(err: Error) -> Error {
    if err.hint().is_some() {
        return err;
    }
    match err.kind() {
        ErrorKind::Remote => err.with_hint("The API rejected the call; see code and data."),
        ErrorKind::Decode => err.with_hint("The endpoint did not answer with an API envelope."),
        _ => err,
    }
}

fn emit_json(value: &Value) {
    let rendered = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    println!("{rendered}");
}

fn emit_error(err: &Error) {
    if io::stderr().is_terminal() {
        eprintln!("{}", error_text(err));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::Transport => "transport failure".to_string(),
        ErrorKind::Decode => "malformed response".to_string(),
        ErrorKind::Remote => "remote api error".to_string(),
        ErrorKind::Cast => "unexpected result shape".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(method) = err.method() {
        inner.insert("method".to_string(), json!(method));
    }
    if let Some(code) = err.code() {
        inner.insert("code".to_string(), json!(code));
    }
    if let Some(data) = err.data() {
        inner.insert("data".to_string(), data.clone());
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error) -> String {
    let mut lines = vec![format!("error: {}", error_message(err))];
    if let Some(method) = err.method() {
        lines.push(format!("method: {method}"));
    }
    if let Some(code) = err.code() {
        lines.push(format!("code: {code}"));
    }
    if let Some(hint) = err.hint() {
        lines.push(format!("hint: {hint}"));
    }
    if let Some(cause) = error_causes(err).first() {
        lines.push(format!("caused by: {cause}"));
    }
    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command, Entity, error_json, resolve_config};
    use clap::Parser;
    use clap::error::ErrorKind as ClapErrorKind;
    use serde_json::json;
    use sharpspring::api::{ApiVersion, Error, ErrorKind};

    #[test]
    fn explicit_credentials_win_over_config_file() {
        let cli = Cli::try_parse_from([
            "sharpspring",
            "--account-id",
            "acc",
            "--secret-key",
            "key",
            "--api-version",
            "v1.2",
            "get",
            "lead",
            "7",
        ])
        .expect("parse");
        let config = resolve_config(&cli.connection).expect("config");
        assert_eq!(config.account_id(), "acc");
        assert_eq!(config.api_version(), ApiVersion::V1_2);
        assert!(matches!(
            cli.command,
            Command::Get {
                entity: Entity::Lead,
                id: 7
            }
        ));
    }

    #[test]
    fn help_and_version_use_standard_flags() {
        let err = Cli::try_parse_from(["sharpspring", "--help"]).expect_err("help");
        assert_eq!(err.kind(), ClapErrorKind::DisplayHelp);
        let err = Cli::try_parse_from(["sharpspring", "--version"]).expect_err("version");
        assert_eq!(err.kind(), ClapErrorKind::DisplayVersion);
        let err = Cli::try_parse_from(["sharpspring", "---help"]).expect_err("unknown flag");
        assert_eq!(err.kind(), ClapErrorKind::UnknownArgument);
    }

    #[test]
    fn list_fields_split_on_commas() {
        let cli = Cli::try_parse_from([
            "sharpspring",
            "list",
            "lead",
            "--fields",
            "id,emailAddress",
        ])
        .expect("parse");
        let Command::List { fields, .. } = cli.command else {
            panic!("expected list");
        };
        assert_eq!(fields, vec!["id", "emailAddress"]);
    }

    #[test]
    fn remote_errors_render_code_and_data() {
        let err = Error::new(ErrorKind::Remote)
            .with_message("Invalid ID")
            .with_method("getLead")
            .with_code(301)
            .with_data(json!({"id": 7}));
        let value = error_json(&err);
        assert_eq!(value["error"]["kind"], json!("Remote"));
        assert_eq!(value["error"]["code"], json!(301));
        assert_eq!(value["error"]["method"], json!("getLead"));
        assert_eq!(value["error"]["data"], json!({"id": 7}));
    }
}
