//! Invoicing CLI - Database migrations and customer management.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! inv-cli migrate
//!
//! # Create a customer
//! inv-cli customer create --name "Acme Corp" --email billing@acme.com --tax-id TAX-001
//!
//! # Change a customer's phone number
//! inv-cli customer update 1 --phone 555-0199
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `customer` - Create, read, update and delete customers

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Args, Parser, Subcommand};

use invoicing_core::{CustomerId, NewCustomer};
use invoicing_db::CustomerRepository;

mod commands;

#[derive(Parser)]
#[command(name = "inv-cli")]
#[command(author, version, about = "Invoicing CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage customers
    Customer {
        #[command(subcommand)]
        action: CustomerAction,
    },
}

#[derive(Subcommand)]
enum CustomerAction {
    /// Create a new customer
    Create {
        /// Customer display name (max 100 characters)
        #[arg(short, long)]
        name: String,

        /// Billing email address, unique per customer (max 100 characters)
        #[arg(short, long)]
        email: String,

        /// Postal address (max 300 characters)
        #[arg(short, long)]
        address: Option<String>,

        /// Tax identifier, unique when present (max 50 characters)
        #[arg(short, long)]
        tax_id: Option<String>,

        /// Phone number (max 50 characters)
        #[arg(short, long)]
        phone: Option<String>,
    },
    /// Show a customer by ID
    Get {
        /// Customer ID
        id: i64,
    },
    /// Find a customer by email or tax ID
    Find {
        #[command(flatten)]
        key: FindKey,
    },
    /// List all customers
    List,
    /// Update fields of an existing customer
    Update(UpdateArgs),
    /// Delete a customer
    Delete {
        /// Customer ID
        id: i64,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct FindKey {
    /// Email address to look up
    #[arg(long)]
    email: Option<String>,

    /// Tax ID to look up
    #[arg(long)]
    tax_id: Option<String>,
}

#[derive(Args)]
struct UpdateArgs {
    /// Customer ID
    id: i64,

    #[arg(short, long)]
    name: Option<String>,

    #[arg(short, long)]
    email: Option<String>,

    #[arg(short, long, conflicts_with = "clear_address")]
    address: Option<String>,

    #[arg(short, long, conflicts_with = "clear_tax_id")]
    tax_id: Option<String>,

    #[arg(short, long, conflicts_with = "clear_phone")]
    phone: Option<String>,

    /// Remove the stored address
    #[arg(long)]
    clear_address: bool,

    /// Remove the stored tax ID
    #[arg(long)]
    clear_tax_id: bool,

    /// Remove the stored phone number
    #[arg(long)]
    clear_phone: bool,
}

impl From<UpdateArgs> for commands::customer::CustomerPatch {
    fn from(args: UpdateArgs) -> Self {
        Self {
            name: args.name,
            email: args.email,
            address: optional_change(args.address, args.clear_address),
            tax_id: optional_change(args.tax_id, args.clear_tax_id),
            phone: optional_change(args.phone, args.clear_phone),
        }
    }
}

/// `Some(None)` clears the column, `None` leaves it alone.
fn optional_change(value: Option<String>, clear: bool) -> Option<Option<String>> {
    if clear { Some(None) } else { value.map(Some) }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "invoicing_cli=info,invoicing_db=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    use commands::customer;

    let action = match cli.command {
        Commands::Migrate => {
            commands::migrate::run().await?;
            return Ok(());
        }
        Commands::Customer { action } => action,
    };

    let pool = commands::connect().await?;
    let store = CustomerRepository::new(&pool);

    match action {
        CustomerAction::Create {
            name,
            email,
            address,
            tax_id,
            phone,
        } => {
            let mut new_customer = NewCustomer::new(name, email);
            new_customer.set_address(address);
            new_customer.set_tax_id(tax_id);
            new_customer.set_phone(phone);
            customer::print(&customer::create(&store, new_customer).await?)?;
        }
        CustomerAction::Get { id } => customer::print(&customer::get(&store, id.into()).await?)?,
        CustomerAction::Find { key } => {
            let found =
                customer::find(&store, key.email.as_deref(), key.tax_id.as_deref()).await?;
            customer::print(&found)?;
        }
        CustomerAction::List => customer::print(&customer::list(&store).await?)?,
        CustomerAction::Update(args) => {
            let id = CustomerId::new(args.id);
            customer::print(&customer::update(&store, id, args.into()).await?)?;
        }
        CustomerAction::Delete { id } => customer::delete(&store, id.into()).await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_optional_change() {
        assert_eq!(optional_change(None, false), None);
        assert_eq!(optional_change(None, true), Some(None));
        assert_eq!(
            optional_change(Some("555-0100".to_owned()), false),
            Some(Some("555-0100".to_owned()))
        );
    }

    #[test]
    fn test_find_requires_exactly_one_key() {
        assert!(Cli::try_parse_from(["inv-cli", "customer", "find"]).is_err());
        assert!(
            Cli::try_parse_from([
                "inv-cli", "customer", "find", "--email", "a@b.c", "--tax-id", "T"
            ])
            .is_err()
        );
        assert!(Cli::try_parse_from(["inv-cli", "customer", "find", "--tax-id", "T"]).is_ok());
    }

    #[test]
    fn test_update_rejects_set_and_clear_together() {
        let result = Cli::try_parse_from([
            "inv-cli",
            "customer",
            "update",
            "1",
            "--phone",
            "555-0100",
            "--clear-phone",
        ]);
        assert!(result.is_err());
    }
}
