use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use client_core::{
    flows::{password_reset::PasswordReset, signup::ConfirmSignup},
    forms::Outcome,
    inject_query,
    routes::{body_route, campaign_route, circle_route, member_route},
    typeahead::{fetch_bodies, fetch_circles, fetch_permissions},
    Collaborators, EventBus, ListLoader, LoadOutcome, OmsClient, PageParams, ParamInjector,
};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{BodyId, CampaignId, CircleId, MemberId, Resource},
    error::FieldErrors,
    protocol::{
        Body, BodyMembership, Campaign, Circle, CircleMembership, JoinRequest, Member,
        Permission,
    },
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, validate, Settings, DEFAULT_CONFIG_FILE};

#[derive(Parser, Debug)]
#[command(name = "omsctl", about = "Command-line front-end for the OMS admin API")]
struct Cli {
    /// Settings file; missing files are ignored.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pages through a collection and prints one JSON item per line.
    List {
        resource: ListResource,
        #[arg(long, default_value = "")]
        query: String,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long, default_value_t = 1)]
        pages: usize,
        /// Keep loading until the collection is exhausted.
        #[arg(long)]
        all: bool,
        #[arg(long)]
        body: Option<i64>,
        #[arg(long)]
        circle: Option<i64>,
        /// Include circles outside the caller's scope.
        #[arg(long)]
        all_circles: bool,
    },
    Show {
        resource: ShowResource,
        id: i64,
    },
    Suggest {
        resource: SuggestResource,
        query: String,
    },
    PasswordReset {
        #[command(subcommand)]
        step: ResetStep,
    },
    ConfirmMail {
        token: String,
    },
}

#[derive(Subcommand, Debug)]
enum ResetStep {
    Request {
        #[arg(long)]
        email: String,
    },
    Confirm {
        #[arg(long)]
        token: String,
        #[arg(long)]
        password: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ListResource {
    Members,
    Bodies,
    Circles,
    Permissions,
    Campaigns,
    BodyMembers,
    JoinRequests,
    CircleMembers,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ShowResource {
    Member,
    Body,
    Circle,
    Campaign,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SuggestResource {
    Bodies,
    Circles,
    Permissions,
}

struct ListRequest {
    endpoint: String,
    injector: ParamInjector,
    query: String,
    limit: usize,
    max_pages: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings(&cli.config)?;
    if let Some(api_url) = &cli.api_url {
        settings.api_url = api_url.clone();
        validate(&settings)?;
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let client = OmsClient::connect(&settings.api_url, settings.request_timeout())
        .with_context(|| format!("cannot use api url '{}'", settings.api_url))?;
    let ui = Collaborators::from_bus(EventBus::new());
    debug!(api_url = %settings.api_url, "client ready");

    match cli.command {
        Command::List {
            resource,
            query,
            limit,
            pages,
            all,
            body,
            circle,
            all_circles,
        } => {
            let resource = list_target(resource, body, circle)?;
            let injector = if all_circles {
                Arc::new(|params: PageParams, query: &str| {
                    params.with("query", query).with("all", true)
                }) as ParamInjector
            } else {
                inject_query()
            };
            let request = ListRequest {
                endpoint: resource.path(),
                injector,
                query,
                limit: limit.unwrap_or(settings.page_size),
                max_pages: (!all).then_some(pages.max(1)),
            };
            match resource {
                Resource::Members => list::<Member>(&client, &ui, request).await,
                Resource::Bodies => list::<Body>(&client, &ui, request).await,
                Resource::Circles => list::<Circle>(&client, &ui, request).await,
                Resource::CircleMembers(_) => {
                    list::<CircleMembership>(&client, &ui, request).await
                }
                Resource::Permissions => list::<Permission>(&client, &ui, request).await,
                Resource::Campaigns => list::<Campaign>(&client, &ui, request).await,
                Resource::BodyMembers(_) => list::<BodyMembership>(&client, &ui, request).await,
                Resource::JoinRequests(_) => list::<JoinRequest>(&client, &ui, request).await,
            }
        }
        Command::Show { resource, id } => match resource {
            ShowResource::Member => show::<Member>(&client, &member_route(MemberId(id))).await,
            ShowResource::Body => show::<Body>(&client, &body_route(BodyId(id))).await,
            ShowResource::Circle => show::<Circle>(&client, &circle_route(CircleId(id))).await,
            ShowResource::Campaign => {
                show::<Campaign>(&client, &campaign_route(CampaignId(id))).await
            }
        },
        Command::Suggest { resource, query } => {
            let timeout = Some(settings.suggest_timeout());
            match resource {
                SuggestResource::Bodies => print_all(&fetch_bodies(&client, &query, timeout).await?),
                SuggestResource::Circles => {
                    print_all(&fetch_circles(&client, &query, timeout).await?)
                }
                SuggestResource::Permissions => {
                    print_all(&fetch_permissions(&client, &query, timeout).await?)
                }
            }
        }
        Command::PasswordReset { step } => match step {
            ResetStep::Request { email } => {
                let mut reset = PasswordReset::new(&client, &ui, None);
                reset.email = email;
                let outcome = reset.send_reset_request().await;
                finish(outcome, &reset.errors)
            }
            ResetStep::Confirm { token, password } => {
                let mut reset = PasswordReset::new(&client, &ui, Some(token));
                reset.new_password_copy = password.clone();
                reset.new_password = password;
                let outcome = reset.confirm_reset_request().await;
                finish(outcome, &reset.errors)
            }
        },
        Command::ConfirmMail { token } => {
            let mut confirm = ConfirmSignup::new(&client, &ui, Some(token), None);
            let outcome = confirm.submit().await;
            finish(outcome, &confirm.errors)
        }
    }
}

fn list_target(
    resource: ListResource,
    body: Option<i64>,
    circle: Option<i64>,
) -> Result<Resource> {
    let body_id = || {
        body.map(BodyId)
            .context("--body is required for body-members and join-requests")
    };
    let circle_id = || {
        circle
            .map(CircleId)
            .context("--circle is required for circle-members")
    };
    Ok(match resource {
        ListResource::Members => Resource::Members,
        ListResource::Bodies => Resource::Bodies,
        ListResource::Circles => Resource::Circles,
        ListResource::Permissions => Resource::Permissions,
        ListResource::Campaigns => Resource::Campaigns,
        ListResource::BodyMembers => Resource::BodyMembers(body_id()?),
        ListResource::JoinRequests => Resource::JoinRequests(body_id()?),
        ListResource::CircleMembers => Resource::CircleMembers(circle_id()?),
    })
}

async fn list<T>(client: &OmsClient, ui: &Collaborators, request: ListRequest) -> Result<()>
where
    T: DeserializeOwned + Serialize + Clone + Send + Sync + 'static,
{
    let loader: ListLoader<T> = ListLoader::new(
        client.clone(),
        request.endpoint,
        request.injector,
        request.limit,
        ui.notifier.clone(),
    )?;
    // A fresh loader has an empty query, so `None` means "nothing to change".
    let first = match loader.set_query(request.query).await {
        Some(outcome) => outcome,
        None => loader.load_more().await,
    };

    let mut pages = 1;
    let mut outcome = first;
    loop {
        match outcome {
            LoadOutcome::Failed(err) => return Err(err.into()),
            LoadOutcome::Loaded { exhausted: false, .. }
                if request.max_pages.map_or(true, |max| pages < max) =>
            {
                pages += 1;
                outcome = loader.load_more().await;
            }
            _ => break,
        }
    }

    let snapshot = loader.snapshot();
    info!(
        endpoint = loader.endpoint(),
        items = snapshot.items.len(),
        exhausted = snapshot.exhausted,
        "listing done"
    );
    print_all(&snapshot.items)
}

async fn show<T: DeserializeOwned + Serialize>(client: &OmsClient, path: &str) -> Result<()> {
    let entity: T = client.fetch(path).await?;
    println!("{}", serde_json::to_string(&entity)?);
    Ok(())
}

fn print_all<T: Serialize>(items: &[T]) -> Result<()> {
    for item in items {
        println!("{}", serde_json::to_string(item)?);
    }
    Ok(())
}

fn finish<T>(outcome: Outcome<T>, errors: &FieldErrors) -> Result<()> {
    match outcome {
        Outcome::Done(_) => Ok(()),
        Outcome::Skipped | Outcome::Rejected => {
            eprintln!("{}", serde_json::to_string(errors)?);
            bail!("input was rejected")
        }
        Outcome::Failed(err) => Err(err.into()),
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
