//! Partner triage command line
//!
//! One orchestration operation per subcommand; the resulting envelope is
//! printed as JSON and an error envelope exits non-zero.

use anyhow::{anyhow, Context};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use triage_core::{DataSource, SendOptions, Transport, TriageClient, TriageConfig};
use triage_types::{
    CompanyFilter, CompanyId, CompanyStatus, Envelope, LetterFilter, LetterHandle, LetterId,
    LetterStatus, LetterTemplate, SortOrder,
};

/// Address the demo run sends its letter to
const DEMO_RECIPIENT: &str = "partners@example.com";

fn cli() -> Command {
    Command::new("triage")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Review partner companies, draft outreach letters and send them")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("FILE")
                .help("Configuration file path")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("mock")
                .long("mock")
                .help("Use the in-memory backend instead of the REST API")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Debug logging")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(Command::new("top").about("Top 20 companies by score"))
        .subcommand(
            Command::new("list")
                .about("List companies")
                .arg(
                    Arg::new("status")
                        .long("status")
                        .value_parser(|s: &str| s.parse::<CompanyStatus>()),
                )
                .arg(Arg::new("industry").long("industry"))
                .arg(
                    Arg::new("min-score")
                        .long("min-score")
                        .value_parser(value_parser!(f64)),
                )
                .arg(
                    Arg::new("sort-by")
                        .long("sort-by")
                        .value_parser(|s: &str| s.parse::<SortOrder>()),
                )
                .arg(page_arg())
                .arg(limit_arg()),
        )
        .subcommand(
            Command::new("show")
                .about("Show one company")
                .arg(company_arg()),
        )
        .subcommand(
            Command::new("approve")
                .about("Approve a company")
                .arg(company_arg())
                .arg(Arg::new("comment").long("comment")),
        )
        .subcommand(
            Command::new("reject")
                .about("Reject a company")
                .arg(company_arg())
                .arg(Arg::new("reason").long("reason").required(true)),
        )
        .subcommand(
            Command::new("letter")
                .about("Show the active letter of a company")
                .arg(company_arg()),
        )
        .subcommand(
            Command::new("letters")
                .about("List letters")
                .arg(
                    Arg::new("status")
                        .long("status")
                        .value_parser(|s: &str| s.parse::<LetterStatus>()),
                )
                .arg(
                    Arg::new("company-id")
                        .long("company-id")
                        .value_parser(value_parser!(i64)),
                )
                .arg(page_arg())
                .arg(limit_arg()),
        )
        .subcommand(
            Command::new("generate")
                .about("Generate a letter draft for a company")
                .arg(company_arg())
                .arg(
                    Arg::new("template")
                        .long("template")
                        .value_parser(|s: &str| s.parse::<LetterTemplate>())
                        .default_value("formal"),
                ),
        )
        .subcommand(
            Command::new("update-letter")
                .about("Replace a letter body; the letter returns to draft")
                .arg(company_arg())
                .arg(letter_arg())
                .arg(Arg::new("body").long("body").required(true)),
        )
        .subcommand(
            Command::new("approve-letter")
                .about("Approve a letter draft, optionally with an edited body")
                .arg(company_arg())
                .arg(letter_arg())
                .arg(Arg::new("body").long("body")),
        )
        .subcommand(
            Command::new("reject-letter")
                .about("Reject a letter draft")
                .arg(company_arg())
                .arg(letter_arg())
                .arg(Arg::new("reason").long("reason").required(true)),
        )
        .subcommand(
            Command::new("send")
                .about("Send the approved letter of a company")
                .arg(company_arg())
                .arg(Arg::new("email").long("email").required(true))
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .help("Check everything but send nothing")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("email-status")
                .about("Delivery status of the e-mail sent to a company")
                .arg(company_arg()),
        )
        .subcommand(
            Command::new("demo")
                .about("Approve, draft, approve the letter and send, against the in-memory backend"),
        )
}

fn company_arg() -> Arg {
    Arg::new("company-id")
        .value_name("COMPANY_ID")
        .required(true)
        .value_parser(value_parser!(i64))
}

fn letter_arg() -> Arg {
    Arg::new("letter-id")
        .value_name("LETTER_ID")
        .required(true)
        .value_parser(value_parser!(i64))
}

fn page_arg() -> Arg {
    Arg::new("page").long("page").value_parser(value_parser!(u32))
}

fn limit_arg() -> Arg {
    Arg::new("limit").long("limit").value_parser(value_parser!(u32))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();

    // INFO unless RUST_LOG says otherwise
    let default_filter = if matches.get_flag("verbose") { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config_path = matches.get_one::<PathBuf>("config");
    let mut config = TriageConfig::load(config_path.map(PathBuf::as_path))
        .context("Failed to load configuration")?;

    let (command, args) = matches
        .subcommand()
        .ok_or_else(|| anyhow!("No command given"))?;

    if matches.get_flag("mock") || command == "demo" {
        config.data_source = DataSource::Mock;
    }

    let transport = triage_core::transport_from_config(&config)
        .context("Failed to set up the backend transport")?;
    let client = TriageClient::new(transport);

    let output = run(&client, command, args).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    if is_error(&output) {
        std::process::exit(1);
    }
    Ok(())
}

async fn run<T: Transport>(
    client: &TriageClient<T>,
    command: &str,
    args: &ArgMatches,
) -> anyhow::Result<Value> {
    let output = match command {
        "top" => to_json(client.top_companies().await)?,
        "list" => {
            let filter = CompanyFilter {
                status: args.get_one::<CompanyStatus>("status").copied(),
                industry: args.get_one::<String>("industry").cloned(),
                min_score: args.get_one::<f64>("min-score").copied(),
                sort_by: args.get_one::<SortOrder>("sort-by").copied(),
                page: args.get_one::<u32>("page").copied(),
                limit: args.get_one::<u32>("limit").copied(),
            };
            to_json(client.list_companies(&filter).await)?
        }
        "show" => to_json(client.company(company_id(args)?).await)?,
        "approve" => {
            let comment = args.get_one::<String>("comment").map(String::as_str);
            to_json(client.approve_company(company_id(args)?, comment).await)?
        }
        "reject" => {
            let reason = required(args, "reason")?;
            to_json(client.reject_company(company_id(args)?, reason).await)?
        }
        "letter" => to_json(client.letter(company_id(args)?).await)?,
        "letters" => {
            let filter = LetterFilter {
                status: args.get_one::<LetterStatus>("status").copied(),
                company_id: args.get_one::<i64>("company-id").copied().map(CompanyId::new),
                page: args.get_one::<u32>("page").copied(),
                limit: args.get_one::<u32>("limit").copied(),
            };
            to_json(client.list_letters(&filter).await)?
        }
        "generate" => {
            let template = args
                .get_one::<LetterTemplate>("template")
                .copied()
                .unwrap_or_default();
            to_json(client.generate_letter(company_id(args)?, template).await)?
        }
        "update-letter" => {
            let body = required(args, "body")?;
            to_json(client.update_letter(letter_handle(args)?, body).await)?
        }
        "approve-letter" => {
            let body = args.get_one::<String>("body").map(String::as_str);
            to_json(client.approve_letter(letter_handle(args)?, body).await)?
        }
        "reject-letter" => {
            let reason = args.get_one::<String>("reason").map(String::as_str);
            to_json(client.reject_letter(letter_handle(args)?, reason).await)?
        }
        "send" => {
            let email = required(args, "email")?;
            let options = SendOptions {
                dry_run: args.get_flag("dry-run"),
            };
            to_json(client.send_email(company_id(args)?, email, options).await)?
        }
        "email-status" => to_json(client.email_status(company_id(args)?).await)?,
        "demo" => run_demo(client).await?,
        other => return Err(anyhow!("Unknown command '{}'", other)),
    };

    Ok(output)
}

/// Walk the first fixture company from `new` to `sent`, stopping at the first error
async fn run_demo<T: Transport>(client: &TriageClient<T>) -> anyhow::Result<Value> {
    let company_id = CompanyId::new(1);
    let mut steps = Vec::new();

    let approved = client.approve_company(company_id, Some("demo run")).await;
    let failed = !approved.is_success();
    steps.push(to_json(approved)?);
    if failed {
        return Ok(Value::Array(steps));
    }

    let draft = client
        .generate_letter(company_id, LetterTemplate::Formal)
        .await;
    let handle = draft.data().map(|letter| letter.handle());
    steps.push(to_json(draft)?);
    let Some(handle) = handle else {
        return Ok(Value::Array(steps));
    };

    let letter = client.approve_letter(handle, None).await;
    let failed = !letter.is_success();
    steps.push(to_json(letter)?);
    if failed {
        return Ok(Value::Array(steps));
    }

    log::info!("Demo: sending to {}", DEMO_RECIPIENT);
    steps.push(to_json(
        client
            .send_email(company_id, DEMO_RECIPIENT, SendOptions::default())
            .await,
    )?);

    Ok(Value::Array(steps))
}

fn to_json<D: Serialize>(envelope: Envelope<D>) -> anyhow::Result<Value> {
    Ok(serde_json::to_value(envelope)?)
}

fn is_error(output: &Value) -> bool {
    match output {
        Value::Array(steps) => steps.iter().any(is_error),
        other => other.get("status").and_then(Value::as_str) == Some("error"),
    }
}

fn company_id(args: &ArgMatches) -> anyhow::Result<CompanyId> {
    args.get_one::<i64>("company-id")
        .copied()
        .map(CompanyId::new)
        .context("COMPANY_ID is required")
}

fn letter_handle(args: &ArgMatches) -> anyhow::Result<LetterHandle> {
    let letter_id = args
        .get_one::<i64>("letter-id")
        .copied()
        .context("LETTER_ID is required")?;
    Ok(LetterHandle::new(LetterId::new(letter_id), company_id(args)?))
}

fn required<'a>(args: &'a ArgMatches, name: &str) -> anyhow::Result<&'a str> {
    args.get_one::<String>(name)
        .map(String::as_str)
        .with_context(|| format!("--{} is required", name))
}
