//! Fake Store CLI - browse products, manage the cart, and check out.
//!
//! # Usage
//!
//! ```bash
//! # First page of products, then narrow it down
//! fakestore products list
//! fakestore products list --search lamp --category 2 --max 100
//!
//! # Product detail with related products
//! fakestore products show 4
//!
//! # Cart
//! fakestore cart add 4 --quantity 2
//! fakestore cart update 4 5
//! fakestore cart remove 4
//! fakestore cart show
//!
//! # Checkout
//! fakestore checkout --name "Jane Doe" --phone "555 123 4567" \
//!     --email jane@example.com --address "1 Main St" --account 12345678901
//!
//! # Admin product management
//! fakestore admin login
//! fakestore admin products create --title Lamp --price 25 --category-id 1 \
//!     --image https://placehold.co/600x400
//! ```
//!
//! # Commands
//!
//! - `products list|show|related` - Browse the catalog
//! - `categories` - List categories
//! - `cart show|add|update|remove|clear` - Manage the cart
//! - `checkout` - Validate details and place the order
//! - `admin login|logout|whoami|products` - Product management

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use fakestore_core::{CategoryId, ProductId};
use fakestore_storefront::catalog::CatalogError;
use fakestore_storefront::config::{ConfigError, StorefrontConfig, parse_api_url};
use fakestore_storefront::{AppError, StorefrontSession};
use rust_decimal::Decimal;
use sentry::integrations::tracing as sentry_tracing;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "fakestore")]
#[command(author, version, about = "Fake Store command-line storefront")]
struct Cli {
    /// Directory for local storage (overrides `FAKESTORE_DATA_DIR`)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Catalog API base URL (overrides `FAKESTORE_API_URL`)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse products
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// List product categories
    Categories,
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Check out the cart
    Checkout(CheckoutArgs),
    /// Product management
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List products, one page at a time
    List {
        /// Number of products to skip
        #[arg(long, default_value_t = 0)]
        offset: u32,

        /// Page size (defaults to `FAKESTORE_PAGE_SIZE`)
        #[arg(long)]
        limit: Option<u32>,

        /// Match against title and description
        #[arg(short, long)]
        search: Option<String>,

        /// Only products in this category
        #[arg(short, long)]
        category: Option<CategoryId>,

        /// Minimum price
        #[arg(long)]
        min: Option<Decimal>,

        /// Maximum price
        #[arg(long)]
        max: Option<Decimal>,

        /// Keep loading pages until the catalog runs out
        #[arg(long)]
        all: bool,
    },
    /// Show one product with related products
    Show {
        /// Product ID
        id: ProductId,
    },
    /// Products from the same category
    Related {
        /// Product ID
        id: ProductId,

        /// Maximum number of products
        #[arg(long, default_value_t = 4)]
        limit: u32,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show items and totals
    Show,
    /// Add a product
    Add {
        /// Product ID
        id: ProductId,

        /// Units to add
        #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Set a product's quantity (0 or less removes it)
    Update {
        /// Product ID
        id: ProductId,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a product
    Remove {
        /// Product ID
        id: ProductId,
    },
    /// Remove everything
    Clear,
}

#[derive(clap::Args)]
struct CheckoutArgs {
    /// Full name
    #[arg(long, default_value = "")]
    name: String,

    /// Phone number
    #[arg(long, default_value = "")]
    phone: String,

    /// Email address
    #[arg(long, default_value = "")]
    email: String,

    /// Shipping address
    #[arg(long, default_value = "")]
    address: String,

    /// Account number
    #[arg(long, default_value = "")]
    account: String,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Log in (defaults to `FAKESTORE_ADMIN_EMAIL`/`FAKESTORE_ADMIN_PASSWORD`)
    Login {
        /// Login email
        #[arg(short, long, requires = "password")]
        email: Option<String>,

        /// Login password
        #[arg(short, long, requires = "email")]
        password: Option<String>,
    },
    /// Forget the stored login
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Create, update, or delete products
    Products {
        #[command(subcommand)]
        action: AdminProductsAction,
    },
}

#[derive(Subcommand)]
enum AdminProductsAction {
    /// Create a product
    Create {
        #[arg(long)]
        title: String,

        #[arg(long)]
        price: Decimal,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long)]
        category_id: CategoryId,

        /// Image URL (repeatable)
        #[arg(long = "image", required = true)]
        images: Vec<String>,
    },
    /// Update fields of a product
    Update {
        /// Product ID
        id: ProductId,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        price: Option<Decimal>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        category_id: Option<CategoryId>,

        /// Image URL (repeatable, replaces all images)
        #[arg(long = "image")]
        images: Vec<String>,
    },
    /// Delete a product
    Delete {
        /// Product ID
        id: ProductId,
    },
}

/// Errors surfaced by the CLI.
#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    App(#[from] AppError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Output error: {0}")]
    Io(#[from] io::Error),
}

impl From<CatalogError> for CliError {
    fn from(err: CatalogError) -> Self {
        Self::App(AppError::from(err))
    }
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Apply command-line overrides on top of the environment.
fn load_config(cli: &Cli) -> Result<StorefrontConfig, ConfigError> {
    let mut config = StorefrontConfig::from_env()?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir.clone_from(dir);
    }
    if let Some(url) = &cli.api_url {
        config.catalog.api_url = parse_api_url(url)?;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            let _ = writeln!(io::stderr().lock(), "Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Logs go to stderr so command output stays clean on stdout
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "fakestore_storefront=info,fakestore_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    match run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

fn report(err: &CliError) {
    let mut stderr = io::stderr().lock();
    match err {
        CliError::App(app) => {
            app.report();
            let _ = writeln!(stderr, "Error: {}", app.user_message());
            if let Some(route) = app.redirect() {
                let _ = writeln!(stderr, "Redirecting to {route}");
            }
        }
        other => {
            tracing::error!("Command failed: {other}");
            let _ = writeln!(stderr, "Error: {other}");
        }
    }
}

async fn run(command: Commands, config: StorefrontConfig) -> Result<(), CliError> {
    let mut session = StorefrontSession::open(config)?;

    match command {
        Commands::Products { action } => match action {
            ProductsAction::List {
                offset,
                limit,
                search,
                category,
                min,
                max,
                all,
            } => {
                let filter = commands::products::filter(
                    offset,
                    limit.unwrap_or(0),
                    search,
                    category,
                    min,
                    max,
                )?;
                commands::products::list(&session, &filter, all).await?;
            }
            ProductsAction::Show { id } => commands::products::show(&session, id).await?,
            ProductsAction::Related { id, limit } => {
                commands::products::related(&session, id, limit).await?;
            }
        },
        Commands::Categories => commands::products::categories(&session).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&session)?,
            CartAction::Add { id, quantity } => {
                commands::cart::add(&mut session, id, quantity).await?;
            }
            CartAction::Update { id, quantity } => {
                commands::cart::update(&mut session, id, quantity)?;
            }
            CartAction::Remove { id } => commands::cart::remove(&mut session, id)?,
            CartAction::Clear => commands::cart::clear(&mut session)?,
        },
        Commands::Checkout(args) => {
            let form = fakestore_storefront::checkout::CheckoutForm {
                full_name: args.name,
                phone: args.phone,
                email: args.email,
                address: args.address,
                account_number: args.account,
            };
            commands::checkout::run(&mut session, &form)?;
        }
        Commands::Admin { action } => match action {
            AdminAction::Login { email, password } => {
                commands::admin::login(&session, email, password).await?;
            }
            AdminAction::Logout => commands::admin::logout(&session)?,
            AdminAction::Whoami => commands::admin::whoami(&session)?,
            AdminAction::Products { action } => match action {
                AdminProductsAction::Create {
                    title,
                    price,
                    description,
                    category_id,
                    images,
                } => {
                    let product = fakestore_storefront::catalog::NewProduct {
                        title,
                        price,
                        description,
                        category_id,
                        images,
                    };
                    commands::admin::create(&session, &product).await?;
                }
                AdminProductsAction::Update {
                    id,
                    title,
                    price,
                    description,
                    category_id,
                    images,
                } => {
                    let update = fakestore_storefront::catalog::ProductUpdate {
                        title,
                        price,
                        description,
                        category_id,
                        images: (!images.is_empty()).then_some(images),
                    };
                    commands::admin::update(&session, id, &update).await?;
                }
                AdminProductsAction::Delete { id } => {
                    commands::admin::delete(&session, id).await?;
                }
            },
        },
    }
    Ok(())
}
