//! `cambio_admin`: bootstraps users and accounts directly in the database.

use clap::{Parser, Subcommand};
use engine::{Currency, Engine};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection, EntityTrait, QueryOrder, Set};

mod prompt;

use prompt::PromptResult;

mod users {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub username: String,
        pub password: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

const PASSWORD_ATTEMPTS: usize = 3;

#[derive(Debug, Parser)]
#[command(name = "cambio_admin", about = "Bootstrap users and accounts for Cambio")]
struct Cli {
    /// Database URL, also read from `DATABASE_URL`.
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:./cambio.db?mode=rwc")]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Manage users.
    #[command(subcommand)]
    User(UserCommand),
    /// Manage accounts.
    #[command(subcommand)]
    Account(AccountCommand),
}

#[derive(Debug, Subcommand)]
enum UserCommand {
    /// Create a user, asking for the password on the terminal.
    Create {
        #[arg(long)]
        username: String,
    },
    List,
}

#[derive(Debug, Subcommand)]
enum AccountCommand {
    /// Create an account for an existing user.
    Create {
        #[arg(long)]
        owner: String,
        #[arg(long)]
        name: String,
        /// EUR, USD, CHF, GBP, THB or JPY.
        #[arg(long, default_value = "EUR", value_parser = parse_currency)]
        currency: Currency,
    },
    /// List the accounts of a user, archived ones included.
    List {
        #[arg(long)]
        owner: String,
    },
}

fn parse_currency(raw: &str) -> Result<Currency, String> {
    raw.parse::<Currency>().map_err(|err| err.to_string())
}

async fn open(url: &str) -> PromptResult<DatabaseConnection> {
    let db = Database::connect(url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

async fn find_user(db: &DatabaseConnection, username: &str) -> PromptResult<Option<users::Model>> {
    Ok(users::Entity::find_by_id(username.to_string()).one(db).await?)
}

async fn run_user(db: &DatabaseConnection, command: UserCommand) -> PromptResult<()> {
    match command {
        UserCommand::Create { username } => {
            let username = username.trim().to_string();
            if username.is_empty() {
                return Err("username must not be empty".into());
            }
            if find_user(db, &username).await?.is_some() {
                return Err(format!("user {username} already exists").into());
            }

            let password = prompt::new_password(PASSWORD_ATTEMPTS)?;
            users::Entity::insert(users::ActiveModel {
                username: Set(username.clone()),
                password: Set(password),
            })
            .exec(db)
            .await?;
            println!("user {username} created");
        }
        UserCommand::List => {
            let all = users::Entity::find()
                .order_by_asc(users::Column::Username)
                .all(db)
                .await?;
            for user in all {
                println!("{}", user.username);
            }
        }
    }
    Ok(())
}

async fn run_account(db: &DatabaseConnection, command: AccountCommand) -> PromptResult<()> {
    let owner = match &command {
        AccountCommand::Create { owner, .. } | AccountCommand::List { owner } => owner.clone(),
    };
    if find_user(db, &owner).await?.is_none() {
        return Err(format!("no user named {owner}").into());
    }

    let engine = Engine::builder().database(db.clone()).build().await?;
    match command {
        AccountCommand::Create { name, currency, .. } => {
            let id = engine.new_account(&name, currency, &owner).await?;
            println!("account {name} [{currency}] created for {owner}: {id}");
        }
        AccountCommand::List { .. } => {
            for account in engine.list_accounts(&owner, true).await? {
                let archived = if account.archived { " (archived)" } else { "" };
                println!("{}  {} [{}]{archived}", account.id, account.name, account.currency);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> PromptResult<()> {
    let cli = Cli::parse();
    let db = open(&cli.database_url).await?;

    match cli.command {
        Command::User(command) => run_user(&db, command).await,
        Command::Account(command) => run_account(&db, command).await,
    }
}
