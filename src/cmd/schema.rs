//! Schema command - print expected input formats

use clap::Args;
use schemars::schema_for;
use taxpos::config::TaxConfigFile;
use taxpos::core::{TaxRecords, TransactionRecord};

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Output format
    #[arg(value_enum, default_value = "json-schema")]
    format: SchemaFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemaFormat {
    /// JSON Schema for the record file
    JsonSchema,
    /// JSON Schema for the config file
    ConfigSchema,
    /// CSV header row for transactions
    CsvHeader,
    /// Transaction CSV column descriptions
    CsvFields,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match self.format {
            SchemaFormat::JsonSchema => {
                let schema = schema_for!(TaxRecords);
                println!("{}", serde_json::to_string_pretty(&schema)?);
            }
            SchemaFormat::ConfigSchema => {
                let schema = schema_for!(TaxConfigFile);
                println!("{}", serde_json::to_string_pretty(&schema)?);
            }
            SchemaFormat::CsvHeader => println!("{}", TransactionRecord::csv_header()),
            SchemaFormat::CsvFields => print_csv_fields(),
        }
        Ok(())
    }
}

fn print_csv_fields() {
    println!("Transaction CSV Format");
    println!("======================");
    println!();
    for field in TransactionRecord::csv_schema() {
        let req = if field.required { "required" } else { "optional" };
        println!("{:15} ({:8})  {}", field.name, req, field.description);
    }
    println!();
    println!("Amounts are AUD; '$' and thousands separators are accepted.");
}
