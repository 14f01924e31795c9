//! Purpose: Execute parsed CLI commands against a live client.
//! Role: Glue between clap types in `main.rs` and the typed library operations.
//! Invariants: Each command prints one JSON document via `emit_json`.
//! Invariants: Entity/command pairs the API does not offer are usage errors.
use std::io;

use clap::CommandFactory;
use clap_complete::aot::Shell;
use serde::Serialize;
use serde_json::{Map, Value};
use sharpspring::api::{ClientConfig, DateRange, Error, ErrorKind, Query, SharpspringClient};

use super::{Cli, Command, Entity, RunOutcome, emit_json};

pub(super) fn emit_completion(shell: Shell) {
    let mut cmd = Cli::command();
    clap_complete::aot::generate(shell, &mut cmd, "sharpspring", &mut io::stdout());
}

pub(super) fn dispatch_command(
    command: Command,
    config: ClientConfig,
) -> Result<RunOutcome, Error> {
    let mut client = SharpspringClient::new(config);
    let output = match command {
        Command::Call { method, params } => {
            let params = parse_object("--params", &params)?;
            client.execute(&method, params)?
        }
        Command::Get { entity, id } => get(&mut client, entity, id)?,
        Command::List {
            entity,
            where_clause,
            limit,
            offset,
            fields,
        } => {
            let mut query = Query::new().with_where(parse_object("--where", &where_clause)?);
            if let Some(limit) = limit {
                query = query.limit(limit);
            }
            if let Some(offset) = offset {
                query = query.offset(offset);
            }
            if !fields.is_empty() {
                query = query.fields(fields);
            }
            list(&mut client, entity, &query)?
        }
        Command::Range {
            entity,
            start,
            end,
            timestamp,
        } => {
            let range = DateRange::parse(&start, &end, &timestamp)?;
            range_of(&mut client, entity, &range)?
        }
        Command::Delete { entity, ids } => delete(&mut client, entity, &ids)?,
        Command::Completion { shell } => {
            emit_completion(shell);
            return Ok(RunOutcome::ok());
        }
    };
    emit_json(&output);
    Ok(RunOutcome::ok())
}

fn get(client: &mut SharpspringClient, entity: Entity, id: u64) -> Result<Value, Error> {
    match entity {
        Entity::Account => to_json(client.get_account(id)?),
        Entity::ActiveList => to_json(client.get_active_list(id)?),
        Entity::Campaign => to_json(client.get_campaign(id)?),
        Entity::DealStage => to_json(client.get_deal_stage(id)?),
        Entity::Email => to_json(client.get_email(id)?),
        Entity::Lead => to_json(client.get_lead(id)?),
        Entity::Opportunity => to_json(client.get_opportunity(id)?),
        Entity::OpportunityLead => to_json(client.get_opportunity_lead(id)?),
        other => Err(unsupported("get", other)),
    }
}

fn list(client: &mut SharpspringClient, entity: Entity, query: &Query) -> Result<Value, Error> {
    match entity {
        Entity::Account => to_json(client.get_accounts(query)?),
        Entity::ActiveList => to_json(client.get_active_lists(query)?),
        Entity::Campaign => to_json(client.get_campaigns(query)?),
        Entity::Client => to_json(client.get_clients()?),
        Entity::DealStage => to_json(client.get_deal_stages(query)?),
        Entity::EmailListing => to_json(client.get_email_listing(query)?),
        Entity::Field => to_json(client.get_fields(query)?),
        Entity::Lead => to_json(client.get_leads(query)?),
        Entity::ListMembership => to_json(client.get_contact_list_memberships(query)?),
        Entity::ListTag => to_json(client.get_list_tags()?),
        Entity::Opportunity => to_json(client.get_opportunities(query)?),
        Entity::OpportunityLead => to_json(client.get_opportunity_leads(query)?),
        Entity::UserProfile => to_json(client.get_user_profiles(query)?),
        other => Err(unsupported("list", other)),
    }
}

fn range_of(
    client: &mut SharpspringClient,
    entity: Entity,
    range: &DateRange,
) -> Result<Value, Error> {
    match entity {
        Entity::Account => to_json(client.get_accounts_date_range(range)?),
        Entity::Campaign => to_json(client.get_campaigns_date_range(range)?),
        Entity::DealStage => to_json(client.get_deal_stages_date_range(range)?),
        Entity::Lead => to_json(client.get_leads_date_range(range)?),
        Entity::Opportunity => to_json(client.get_opportunities_date_range(range)?),
        Entity::OpportunityLead => to_json(client.get_opportunity_leads_date_range(range)?),
        other => Err(unsupported("range", other)),
    }
}

fn delete(client: &mut SharpspringClient, entity: Entity, ids: &[u64]) -> Result<Value, Error> {
    match entity {
        Entity::Account => to_json(client.delete_accounts(ids)?),
        Entity::ActiveList => to_json(client.delete_lists(ids)?),
        Entity::Campaign => to_json(client.delete_campaigns(ids)?),
        Entity::DealStage => to_json(client.delete_deal_stages(ids)?),
        Entity::Email => to_json(client.delete_emails(ids)?),
        Entity::Lead => to_json(client.delete_leads(ids)?),
        Entity::Opportunity => to_json(client.delete_opportunities(ids)?),
        Entity::OpportunityLead => to_json(client.delete_opportunity_leads(ids)?),
        other => Err(unsupported("delete", other)),
    }
}

fn to_json<T: Serialize>(value: T) -> Result<Value, Error> {
    serde_json::to_value(value).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("failed to encode output json")
            .with_source(err)
    })
}

fn parse_object(flag: &str, raw: &str) -> Result<Map<String, Value>, Error> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(Error::new(ErrorKind::Usage)
            .with_message(format!("{flag} must be a JSON object"))),
        Err(err) => Err(Error::new(ErrorKind::Usage)
            .with_message(format!("{flag} is not valid JSON"))
            .with_source(err)),
    }
}

fn unsupported(command: &str, entity: Entity) -> Error {
    Error::new(ErrorKind::Usage)
        .with_message(format!("`{command}` is not available for {}", entity.name()))
        .with_hint("Use `sharpspring call <method>` for anything not covered by a subcommand.")
}
