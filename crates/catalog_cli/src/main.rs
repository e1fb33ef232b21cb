//! Command-line front end for the product catalog.
//!
//! # Responsibility
//! - Load configuration from the environment and open the configured store.
//! - Map subcommands onto `ProductService` calls and print JSON results.

use catalog_core::{
    init_db, init_from_config, AppConfig, Category, Product, ProductId, ProductListQuery,
    ProductService, RepoError, SqliteProductRepository,
};
use clap::{Args, Parser, Subcommand};
use log::info;
use rust_decimal::Decimal;
use std::error::Error;
use std::process::ExitCode;
use std::str::FromStr;

#[derive(Debug, Parser)]
#[command(name = "catalog", version, about = "Manage products in the catalog store")]
struct Cli {
    /// Overrides DATABASE_URI for this invocation.
    #[arg(long, global = true)]
    database_uri: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a product and print it with its assigned id.
    Create(CreateArgs),
    /// Print one product.
    Get { id: ProductId },
    /// List products, optionally filtered.
    List(ListArgs),
    /// Change fields of an existing product.
    Update(UpdateArgs),
    /// Delete a product.
    Delete { id: ProductId },
}

#[derive(Debug, Args)]
struct CreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    description: Option<String>,
    #[arg(long, value_parser = parse_price)]
    price: Decimal,
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    available: bool,
    #[arg(long, value_parser = parse_category, default_value = "UNKNOWN")]
    category: Category,
}

#[derive(Debug, Args)]
struct ListArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    available: Option<bool>,
    #[arg(long, value_parser = parse_category)]
    category: Option<Category>,
    #[arg(long, value_parser = parse_price)]
    price: Option<Decimal>,
    #[arg(long)]
    limit: Option<u32>,
    #[arg(long, default_value_t = 0)]
    offset: u32,
}

#[derive(Debug, Args)]
struct UpdateArgs {
    id: ProductId,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// Clears the description.
    #[arg(long, conflicts_with = "description")]
    clear_description: bool,
    #[arg(long, value_parser = parse_price)]
    price: Option<Decimal>,
    #[arg(long)]
    available: Option<bool>,
    #[arg(long, value_parser = parse_category)]
    category: Option<Category>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut config = AppConfig::from_env()?;
    if let Some(uri) = cli.database_uri {
        config.database_uri = uri;
    }
    init_from_config(&config)?;

    let conn = init_db(&config)?;
    let service = ProductService::new(SqliteProductRepository::try_new(&conn)?);
    info!("event=cli_command module=cli status=start");

    match cli.command {
        Command::Create(args) => {
            let mut product = Product::new(
                args.name,
                args.description,
                args.price,
                args.available,
                args.category,
            );
            service.create(&mut product)?;
            print_products(&[product])
        }
        Command::Get { id } => {
            let product = service.find(id)?.ok_or(RepoError::NotFound(id))?;
            print_products(&[product])
        }
        Command::List(args) => {
            let products = service
                .query(ProductListQuery {
                    name: args.name,
                    available: args.available,
                    category: args.category,
                    price: args.price,
                    limit: args.limit,
                    offset: args.offset,
                })
                .fetch()?;
            print_products(&products)
        }
        Command::Update(args) => {
            let mut product = service
                .find(args.id)?
                .ok_or(RepoError::NotFound(args.id))?;
            if let Some(name) = args.name {
                product.name = name;
            }
            if args.clear_description {
                product.description = None;
            } else if let Some(description) = args.description {
                product.description = Some(description);
            }
            if let Some(price) = args.price {
                product.price = price;
            }
            if let Some(available) = args.available {
                product.available = available;
            }
            if let Some(category) = args.category {
                product.category = category;
            }
            service.update(&mut product)?;
            print_products(&[product])
        }
        Command::Delete { id } => {
            let product = service.find(id)?.ok_or(RepoError::NotFound(id))?;
            service.delete(&product)?;
            println!("deleted {product}");
            Ok(())
        }
    }
}

fn print_products(products: &[Product]) -> Result<(), Box<dyn Error>> {
    let values = products
        .iter()
        .map(Product::to_json)
        .collect::<Result<Vec<_>, _>>()?;
    println!("{}", serde_json::to_string_pretty(&values)?);
    Ok(())
}

fn parse_price(value: &str) -> Result<Decimal, String> {
    Decimal::from_str(value.trim()).map_err(|err| format!("invalid price `{value}`: {err}"))
}

fn parse_category(value: &str) -> Result<Category, String> {
    Category::from_str(value).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::{parse_category, parse_price, Cli, Command};
    use catalog_core::Category;
    use clap::Parser;
    use rust_decimal::Decimal;

    #[test]
    fn parses_create_command() {
        let cli = Cli::try_parse_from([
            "catalog",
            "create",
            "--name",
            "Fedora",
            "--price",
            "12.50",
            "--category",
            "cloths",
        ])
        .unwrap();

        match cli.command {
            Command::Create(args) => {
                assert_eq!(args.name, "Fedora");
                assert_eq!(args.price, Decimal::new(1250, 2));
                assert!(args.available);
                assert_eq!(args.category, Category::Cloths);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_list_filters() {
        let cli = Cli::try_parse_from([
            "catalog",
            "--database-uri",
            ":memory:",
            "list",
            "--available",
            "false",
            "--limit",
            "3",
        ])
        .unwrap();

        assert_eq!(cli.database_uri.as_deref(), Some(":memory:"));
        match cli.command {
            Command::List(args) => {
                assert_eq!(args.available, Some(false));
                assert_eq!(args.limit, Some(3));
                assert_eq!(args.offset, 0);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn update_rejects_conflicting_description_flags() {
        let result = Cli::try_parse_from([
            "catalog",
            "update",
            "4",
            "--description",
            "new",
            "--clear-description",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn value_parsers_report_bad_input() {
        assert!(parse_price("abc").is_err());
        assert!(parse_category("GADGETS").is_err());
        assert_eq!(parse_category("food").unwrap(), Category::Food);
    }
}
