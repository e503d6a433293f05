use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use sheet_table::commands::{self, Command, Destination, SheetSelection};
use sheet_table::excel;
use sheet_table::logging;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Workbook path (.xlsx, .xlsm, .xls, .ods)
    #[arg(required = true)]
    file_path: PathBuf,

    /// Sheet to use as the table (defaults to the first sheet)
    #[arg(long, short = 's')]
    sheet: Option<String>,

    /// Number of frozen rows; the header is the last frozen row
    #[arg(long, short = 'f')]
    frozen_rows: Option<usize>,

    /// Overwrite the source file instead of writing a timestamped copy
    #[arg(long, conflicts_with = "output")]
    in_place: bool,

    /// Write the modified workbook to this path
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Log more (-v info, -vv debug, -vvv trace). SHEET_TABLE_LOG overrides
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Print the header row
    Headers,

    /// Print records as JSON
    List {
        /// Only rows in this range, e.g. 3:10 or A3:C10
        #[arg(long, short = 'r')]
        range: Option<String>,

        /// Write the records to a JSON file instead of stdout
        #[arg(long, short = 'j')]
        json_out: Option<PathBuf>,
    },

    /// Append records from a JSON object/array and/or --set pairs
    Add {
        json: Option<String>,

        #[arg(long = "set", value_name = "HEADER=VALUE")]
        set: Vec<String>,
    },

    /// Overwrite one row
    Update {
        row: usize,

        json: Option<String>,

        #[arg(long = "set", value_name = "HEADER=VALUE")]
        set: Vec<String>,

        /// Leave cells alone for headers the record does not mention
        #[arg(long)]
        keep_missing: bool,
    },

    /// Delete the rows covered by a range, e.g. 3:5
    Delete { range: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose);

    let command = match cli.command {
        CliCommand::Headers => Command::Headers,
        CliCommand::List { range, json_out } => Command::List { range, json_out },
        CliCommand::Add { json, set } => Command::Add {
            records: commands::parse_record_input(json.as_deref(), &set)?,
        },
        CliCommand::Update {
            row,
            json,
            set,
            keep_missing,
        } => {
            let mut records = commands::parse_record_input(json.as_deref(), &set)?;
            if records.len() != 1 {
                anyhow::bail!("update takes exactly one record, got {}", records.len());
            }
            Command::Update {
                row,
                record: records.remove(0),
                keep_missing,
            }
        }
        CliCommand::Delete { range } => Command::Delete { range },
    };

    let destination = match (cli.output, cli.in_place) {
        (Some(path), _) => Destination::Path(path),
        (None, true) => Destination::InPlace,
        (None, false) => Destination::Timestamped,
    };

    let selection = SheetSelection {
        name: cli.sheet,
        frozen_rows: cli.frozen_rows,
    };

    let mut workbook = excel::open_workbook(&cli.file_path)?;
    let execution = commands::execute(&mut workbook, &selection, command, &destination)?;

    println!("{}", execution.output);
    if let Some(path) = execution.saved_to {
        eprintln!("Saved to {}", path.display());
    }

    Ok(())
}
