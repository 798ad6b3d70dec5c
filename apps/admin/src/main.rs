use std::{
    io::{self, Write},
    process::ExitCode,
    sync::Arc,
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use clap::{Args, Parser, Subcommand};
use client_core::{
    fields::{FieldValue, FormFields, ProductField, UserField},
    load_settings, AlwaysConfirm, Confirm, FormController, HttpGateway, ListController,
    ListState, Products, RemoveOutcome, Resource, SubmitOutcome, Users,
};
use shared::domain::{ProductId, UserId};
use tracing_subscriber::EnvFilter;

mod view;

use view::{render_form_error, render_products, render_users};

#[derive(Parser, Debug)]
#[command(name = "admin", about = "Manage products and users on the catalog service")]
struct Cli {
    /// Overrides `server_url` from admin.toml and the environment.
    #[arg(long, global = true)]
    server_url: Option<String>,
    /// Skip the delete confirmation prompt.
    #[arg(long, global = true)]
    yes: bool,
    #[command(subcommand)]
    resource: ResourceCommand,
}

#[derive(Subcommand, Debug)]
enum ResourceCommand {
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    Users {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand, Debug)]
enum ProductAction {
    List,
    Create(ProductArgs),
    Edit {
        id: i64,
        #[command(flatten)]
        fields: ProductArgs,
    },
    Delete {
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
enum UserAction {
    List,
    Create(UserArgs),
    Edit {
        id: i64,
        #[command(flatten)]
        fields: UserArgs,
    },
    Delete {
        id: i64,
    },
}

#[derive(Args, Debug, Default)]
struct ProductArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    price: Option<String>,
    #[arg(long)]
    category: Option<String>,
    /// Comma-separated.
    #[arg(long)]
    tags: Option<String>,
    #[arg(long)]
    in_stock: Option<bool>,
}

impl ProductArgs {
    fn assignments(self) -> Vec<(ProductField, FieldValue)> {
        let mut out = Vec::new();
        push_text(&mut out, ProductField::Name, self.name);
        push_text(&mut out, ProductField::Description, self.description);
        push_text(&mut out, ProductField::Price, self.price);
        push_text(&mut out, ProductField::Category, self.category);
        push_text(&mut out, ProductField::Tags, self.tags);
        if let Some(flag) = self.in_stock {
            out.push((ProductField::InStock, FieldValue::Flag(flag)));
        }
        out
    }
}

#[derive(Args, Debug, Default)]
struct UserArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    /// Left out on edit to keep the current password.
    #[arg(long)]
    password: Option<String>,
}

impl UserArgs {
    fn assignments(self) -> Vec<(UserField, FieldValue)> {
        let mut out = Vec::new();
        push_text(&mut out, UserField::Name, self.name);
        push_text(&mut out, UserField::Email, self.email);
        push_text(&mut out, UserField::Password, self.password);
        out
    }
}

fn push_text<F>(out: &mut Vec<(F, FieldValue)>, field: F, value: Option<String>) {
    if let Some(text) = value {
        out.push((field, FieldValue::Text(text)));
    }
}

type Assignments<R> = Vec<(<<R as Resource>::Fields as FormFields>::Field, FieldValue)>;

enum Action<R: Resource> {
    List,
    Create(Assignments<R>),
    Edit(R::Id, Assignments<R>),
    Delete(R::Id),
}

impl<R: Resource> Action<R> {
    fn name(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Create(_) => "create",
            Self::Edit(..) => "edit",
            Self::Delete(_) => "delete",
        }
    }
}

struct TerminalConfirm;

#[async_trait]
impl Confirm for TerminalConfirm {
    async fn confirm(&self, prompt: &str) -> bool {
        let prompt = prompt.to_string();
        tokio::task::spawn_blocking(move || {
            print!("{prompt} [y/N] ");
            if io::stdout().flush().is_err() {
                return false;
            }
            let mut line = String::new();
            if io::stdin().read_line(&mut line).is_err() {
                return false;
            }
            matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
        })
        .await
        .unwrap_or(false)
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings();
    if let Some(server_url) = cli.server_url {
        settings.server_url = server_url;
    }
    let confirm: Arc<dyn Confirm> = if cli.yes {
        Arc::new(AlwaysConfirm)
    } else {
        Arc::new(TerminalConfirm)
    };

    let ok = match cli.resource {
        ResourceCommand::Products { action } => {
            let action = match action {
                ProductAction::List => Action::List,
                ProductAction::Create(fields) => Action::Create(fields.assignments()),
                ProductAction::Edit { id, fields } => {
                    Action::Edit(ProductId(id), fields.assignments())
                }
                ProductAction::Delete { id } => Action::Delete(ProductId(id)),
            };
            let gateway = Arc::new(HttpGateway::<Products>::new(&settings)?);
            let list = ListController::<Products>::new(gateway, confirm);
            drive(&list, action, render_products).await?
        }
        ResourceCommand::Users { action } => {
            let action = match action {
                UserAction::List => Action::List,
                UserAction::Create(fields) => Action::Create(fields.assignments()),
                UserAction::Edit { id, fields } => Action::Edit(UserId(id), fields.assignments()),
                UserAction::Delete { id } => Action::Delete(UserId(id)),
            };
            let gateway = Arc::new(HttpGateway::<Users>::new(&settings)?);
            let list = ListController::<Users>::new(gateway, confirm);
            drive(&list, action, render_users).await?
        }
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Loads the collection, runs one action, prints the resulting list view.
/// Returns `false` when the controllers end in an error state.
async fn drive<R: Resource>(
    list: &Arc<ListController<R>>,
    action: Action<R>,
    render: fn(&ListState<R::Entity>) -> String,
) -> Result<bool> {
    tracing::debug!(resource = R::KIND.path(), action = action.name(), "running");
    list.load().await;

    let ok = match action {
        Action::List => true,
        Action::Create(assignments) => {
            let form = list.start_create().await;
            submit(&form, assignments).await?
        }
        Action::Edit(id, assignments) => {
            let loaded = list.snapshot().await;
            let found = loaded.entities.iter().find(|entity| R::id_of(entity) == id);
            let Some(entity) = found.cloned() else {
                if loaded.error().is_none() {
                    return Err(anyhow!("no {} with id {id}", R::KIND));
                }
                print!("{}", render(&loaded));
                return Ok(false);
            };
            let form = list.start_edit(&entity).await;
            submit(&form, assignments).await?
        }
        Action::Delete(id) => match list.remove(id).await {
            RemoveOutcome::Removed => {
                println!("deleted {} {id}", R::KIND);
                true
            }
            RemoveOutcome::Declined => {
                println!("delete cancelled");
                true
            }
            RemoveOutcome::Failed | RemoveOutcome::Cancelled => false,
        },
    };

    let state = list.snapshot().await;
    print!("{}", render(&state));
    Ok(ok && state.error().is_none())
}

async fn submit<R: Resource>(form: &FormController<R>, assignments: Assignments<R>) -> Result<bool> {
    for (field, value) in assignments {
        form.set_field(field, value).await?;
    }
    match form.submit().await {
        SubmitOutcome::Committed(entity) => {
            println!("saved {} {}", R::KIND, R::id_of(&entity));
            Ok(true)
        }
        SubmitOutcome::Invalid(_) | SubmitOutcome::Failed => {
            if let Some(message) = render_form_error(&form.snapshot().await) {
                eprint!("{message}");
            }
            form.cancel().await?;
            Ok(false)
        }
        SubmitOutcome::Busy | SubmitOutcome::Cancelled => Ok(false),
    }
}
