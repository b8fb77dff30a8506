//! rowwire CLI Client
//!
//! Runs a single operation against a server and prints the result.

use clap::{Parser, Subcommand};
use rowwire::schema::TableDecl;
use rowwire::{
    Client, Config, Operator, Result, RowWireError, ScanPredicate, Schema, Value, VersionCheck,
};
use tracing_subscriber::{fmt, EnvFilter};

/// rowwire CLI
#[derive(Parser, Debug)]
#[command(name = "rowwire-cli")]
#[command(about = "One-shot client for a rowwire database server")]
#[command(version)]
struct Args {
    /// Server address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    server: String,

    /// Table declaration, repeatable, in order: "User(firstName: string, age: int)"
    #[arg(short, long = "table", required = true)]
    tables: Vec<String>,

    /// Read timeout in milliseconds (0 = wait forever)
    #[arg(long, default_value = "5000")]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Insert a row
    Insert {
        table: String,
        /// One value per column, in column order
        values: Vec<String>,
    },

    /// Replace a row's values
    Update {
        table: String,
        id: i64,
        /// Expected current version (omit to update unconditionally)
        #[arg(long)]
        version: Option<i64>,
        values: Vec<String>,
    },

    /// Delete a row
    Drop { table: String, id: i64 },

    /// Fetch a row
    Get { table: String, id: i64 },

    /// List ids matching a predicate (all rows by default)
    Scan {
        table: String,
        #[arg(long, default_value = "all")]
        op: Operator,
        /// Column name, or "id" for the primary key
        #[arg(long)]
        column: Option<String>,
        #[arg(long)]
        value: Option<String>,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,rowwire=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let decls = args
        .tables
        .iter()
        .map(|t| t.parse::<TableDecl>())
        .collect::<Result<Vec<_>>>()?;
    let schema = Schema::from_decls(decls)?;

    let config = Config::builder()
        .server_addr(&args.server)
        .read_timeout_ms(args.timeout_ms)
        .build();

    let mut client: Client = Client::new(schema);
    client.connect(&config)?;
    tracing::info!("Connected to {}", args.server);

    let outcome = execute(&mut client, args.command);
    client.close()?;
    outcome
}

fn execute(client: &mut Client, command: Commands) -> Result<()> {
    match command {
        Commands::Insert { table, values } => {
            let row = parse_row(client.schema(), &table, &values)?;
            let (id, version) = client.insert(&table, &row)?;
            println!("id={} version={}", id, version);
        }
        Commands::Update {
            table,
            id,
            version,
            values,
        } => {
            let row = parse_row(client.schema(), &table, &values)?;
            let version = client.update(&table, id, &row, VersionCheck::from(version))?;
            println!("version={}", version);
        }
        Commands::Drop { table, id } => {
            client.drop(&table, id)?;
            println!("dropped {}", id);
        }
        Commands::Get { table, id } => {
            let (row, version) = client.get(&table, id)?;
            let columns = client.schema().table(&table)?.columns();
            println!("version={}", version);
            for (column, value) in columns.iter().zip(&row) {
                println!("{}={}", column.name, value);
            }
        }
        Commands::Scan {
            table,
            op,
            column,
            value,
        } => {
            let predicate = parse_predicate(client.schema(), &table, op, column, value)?;
            for id in client.scan(&table, &predicate)? {
                println!("{}", id);
            }
        }
    }
    Ok(())
}

fn parse_row(schema: &Schema, table: &str, values: &[String]) -> Result<Vec<Value>> {
    let table = schema.table(table)?;
    if values.len() != table.column_count() {
        return Err(RowWireError::ArityMismatch {
            table: table.name().to_string(),
            expected: table.column_count(),
            found: values.len(),
        });
    }

    table
        .columns()
        .iter()
        .zip(values)
        .map(|(column, text)| Value::parse_as(column, text))
        .collect()
}

fn parse_predicate(
    schema: &Schema,
    table: &str,
    op: Operator,
    column: Option<String>,
    value: Option<String>,
) -> Result<ScanPredicate> {
    if op == Operator::All {
        return Ok(ScanPredicate::all());
    }

    let (column, text) = match (column, value) {
        (Some(c), Some(v)) => (c, v),
        _ => {
            return Err(RowWireError::InvalidPredicate(
                "--column and --value are required unless --op all".to_string(),
            ))
        }
    };

    let value = if column == rowwire::schema::PRIMARY_KEY {
        text.trim().parse().map(Value::Foreign).map_err(|_| {
            RowWireError::InvalidPredicate(format!("id must be an integer, got {:?}", text))
        })?
    } else {
        let table = schema.table(table)?;
        let (_, def) = table
            .column(&column)
            .ok_or_else(|| RowWireError::UnknownColumn {
                table: table.name().to_string(),
                column: column.clone(),
            })?;
        Value::parse_as(def, &text)?
    };

    Ok(ScanPredicate::compare(op, column, value))
}
