use clap::{Parser, Subcommand};

mod cmd;
mod utils;

/// Australian individual tax position calculator
#[derive(Parser, Debug)]
#[command(name = "taxpos", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Taxable income and tax payable for a financial year
    Summary(cmd::summary::SummaryCommand),
    /// Capital gains per disposal, matched first-in first-out
    Gains(cmd::gains::GainsCommand),
    /// Check records and config for problems
    Validate(cmd::validate::ValidateCommand),
    /// Print the expected input formats
    Schema(cmd::schema::SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Summary(c) => c.exec(),
        Command::Gains(c) => c.exec(),
        Command::Validate(c) => c.exec(),
        Command::Schema(c) => c.exec(),
    }
}
