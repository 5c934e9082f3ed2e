//! Sheetsift CLI - Clean contact sheets and extract columns
//!
//! # Commands
//!
//! ```bash
//! sheetsift inspect contacts.xlsx              # Headers, detected mapping, stats, preview
//! sheetsift sheets contacts.xlsx               # List workbook sheets
//! sheetsift detect "Full Name" "E-mail"        # Detect columns from literal headers
//! sheetsift clean contacts.csv --rule either   # Write cleaned_<timestamp>.csv
//! sheetsift extract contacts.csv --types email --shape lines
//! ```
//!
//! Mapping overrides (`--email`, `--phone`, `--name`, `--domain`, `--unmap`)
//! apply on top of the detected mapping for `clean` and `extract`.

use clap::{Args, Parser, Subcommand};
use sheetsift::{
    detect_with_confidence,
    export::{write_delimited, write_output},
    load_sheet_list,
    parser::format_delimiter,
    CleanOutputFormat, CleanRule, ColumnType, Config, OutputShape, Session, LOG_BROADCASTER,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sheetsift")]
#[command(
    about = "Clean contact sheets and extract email/phone/name/domain columns",
    long_about = None
)]
struct Cli {
    /// Do not echo progress logs to stderr
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a file and show headers, detected mapping, statistics and a preview
    Inspect {
        /// Input file (.csv, .tsv, .xlsx, .xls)
        input: PathBuf,

        /// Workbook sheet (default: first sheet)
        #[arg(short, long)]
        sheet: Option<String>,

        /// Number of preview rows (default: SHEETSIFT_PREVIEW_ROWS or 100)
        #[arg(long)]
        rows: Option<usize>,

        /// Print the whole session as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the sheets of a workbook
    Sheets {
        /// Input workbook (.xlsx, .xls)
        input: PathBuf,
    },

    /// Run column detection on literal header names
    Detect {
        /// Header names in file order
        #[arg(required = true)]
        headers: Vec<String>,
    },

    /// Remove rows by email/phone completeness
    Clean {
        /// Input file
        input: PathBuf,

        /// Workbook sheet (default: first sheet)
        #[arg(short, long)]
        sheet: Option<String>,

        /// email_required, phone_required, both_required or either_required
        #[arg(short, long)]
        rule: CleanRule,

        /// original (workbooks stay .xlsx, text becomes .csv) or csv
        #[arg(short, long, default_value = "original")]
        format: CleanOutputFormat,

        /// Output file (default: cleaned_<timestamp>.<ext> in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only show how many rows would be kept
        #[arg(long)]
        dry_run: bool,

        #[command(flatten)]
        mapping: MappingOverrides,
    },

    /// Extract mapped columns
    Extract {
        /// Input file
        input: PathBuf,

        /// Workbook sheet (default: first sheet)
        #[arg(short, long)]
        sheet: Option<String>,

        /// Column types to extract, comma separated
        #[arg(short, long, value_delimiter = ',', required = true)]
        types: Vec<ColumnType>,

        /// table (CSV) or lines (TXT)
        #[arg(long, default_value = "table")]
        shape: OutputShape,

        /// Output file (default: extract_<timestamp>.<ext> in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        mapping: MappingOverrides,
    },
}

/// Manual edits to the detected mapping.
#[derive(Args)]
struct MappingOverrides {
    /// Header to use as the email column
    #[arg(long)]
    email: Option<String>,

    /// Header to use as the phone column
    #[arg(long)]
    phone: Option<String>,

    /// Header to use as the name column
    #[arg(long)]
    name: Option<String>,

    /// Header to use as the domain column
    #[arg(long)]
    domain: Option<String>,

    /// Column type to leave unmapped (repeatable)
    #[arg(long)]
    unmap: Vec<ColumnType>,
}

impl MappingOverrides {
    fn assignments(&self) -> Vec<(ColumnType, &str)> {
        [
            (ColumnType::Email, &self.email),
            (ColumnType::Phone, &self.phone),
            (ColumnType::Name, &self.name),
            (ColumnType::Domain, &self.domain),
        ]
        .into_iter()
        .filter_map(|(t, h)| h.as_deref().map(|h| (t, h)))
        .collect()
    }

    /// Unmap first so reassigned headers are free, then assign.
    fn apply(&self, session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
        let assignments = self.assignments();

        for &column_type in &self.unmap {
            session.update_mapping(column_type, None)?;
        }
        for (column_type, _) in &assignments {
            session.update_mapping(*column_type, None)?;
        }
        for (column_type, header) in assignments {
            session.update_mapping(column_type, Some(header.to_string()))?;
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    LOG_BROADCASTER.set_echo(!cli.quiet);

    let config = Config::from_env();

    let result = match cli.command {
        Commands::Inspect {
            input,
            sheet,
            rows,
            json,
        } => cmd_inspect(&input, sheet, rows, json, config).await,

        Commands::Sheets { input } => cmd_sheets(&input, &config).await,

        Commands::Detect { headers } => cmd_detect(&headers),

        Commands::Clean {
            input,
            sheet,
            rule,
            format,
            output,
            dry_run,
            mapping,
        } => {
            let output = output.as_deref();
            cmd_clean(&input, sheet, rule, format, output, dry_run, &mapping, &config).await
        }

        Commands::Extract {
            input,
            sheet,
            types,
            shape,
            output,
            mapping,
        } => {
            cmd_extract(&input, sheet, &types, shape, output.as_deref(), &mapping, &config).await
        }
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn cmd_inspect(
    input: &Path,
    sheet: Option<String>,
    rows: Option<usize>,
    json: bool,
    mut config: Config,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(rows) = rows {
        config.max_preview_rows = rows;
    }
    let session = Session::open(input, sheet, &config).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&session.summary())?);
        return Ok(());
    }

    let data = session.data();
    println!("📄 {} ({})", input.display(), data.format);
    if let Some(ref encoding) = data.encoding {
        println!("   Encoding: {}", encoding);
    }
    if let Some(delimiter) = data.delimiter {
        println!("   Delimiter: '{}'", format_delimiter(delimiter));
    }
    if let Some(ref sheet) = data.sheet {
        println!("   Sheet: {}", sheet);
    }
    println!("   Columns: {}", data.headers.join(", "));

    println!("\n🔎 Mapping:");
    for column_type in ColumnType::ALL {
        let detected = session.detection().get(column_type);
        match &detected.column {
            Some(header) => println!(
                "   {:<7} {} ({:?})",
                column_type.label(),
                header,
                detected.confidence
            ),
            None => println!("   {:<7} -", column_type.label()),
        }
    }

    let stats = session.statistics();
    let mapping = session.mapping();
    println!("\n📊 Statistics:");
    println!("   Rows: {}", stats.total_rows);
    println!("   Columns: {}", stats.total_columns);
    if let Some(pct) = stats.email_fill_percent(mapping) {
        println!("   Emails: {} ({}%), empty: {}", stats.email_count, pct, stats.empty_email_count);
    }
    if let Some(pct) = stats.phone_fill_percent(mapping) {
        println!("   Phones: {} ({}%), empty: {}", stats.phone_count, pct, stats.empty_phone_count);
    }

    println!("\n🧹 Rules:");
    for rule in session.available_rules() {
        let status = match session.clean_preview(rule.rule) {
            Ok(preview) => format!("keeps {} of {}", preview.keep_count, preview.total),
            Err(_) => "unavailable".to_string(),
        };
        println!("   {:<16} {}", rule.rule.as_str(), status);
    }

    let preview = session.preview_rows();
    println!("\n👀 Preview ({} of {} rows):", preview.len(), stats.total_rows);
    println!("{}", write_delimited(&data.headers, preview, b'\t')?.trim_end());

    Ok(())
}

async fn cmd_sheets(input: &Path, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let sheets = load_sheet_list(input, config).await?;
    for sheet in sheets {
        println!("{}\t{}", sheet.index, sheet.name);
    }
    Ok(())
}

fn cmd_detect(headers: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let detection = detect_with_confidence(headers);
    println!("{}", serde_json::to_string_pretty(&detection)?);
    Ok(())
}

async fn cmd_clean(
    input: &Path,
    sheet: Option<String>,
    rule: CleanRule,
    format: CleanOutputFormat,
    output: Option<&Path>,
    dry_run: bool,
    overrides: &MappingOverrides,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::open(input, sheet, config).await?;
    overrides.apply(&mut session)?;

    if dry_run {
        let preview = session.clean_preview(rule)?;
        println!("{}", serde_json::to_string_pretty(&preview)?);
        return Ok(());
    }

    let export = session.export_clean(rule, format)?;
    let path = output.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from(&export.filename));
    write_output(&path, &export.content).await?;

    eprintln!("💾 Output written to: {}", path.display());
    println!("{}", serde_json::to_string_pretty(&export.report)?);
    Ok(())
}

async fn cmd_extract(
    input: &Path,
    sheet: Option<String>,
    types: &[ColumnType],
    shape: OutputShape,
    output: Option<&Path>,
    overrides: &MappingOverrides,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::open(input, sheet, config).await?;
    overrides.apply(&mut session)?;

    let export = session.export_extraction(types, shape)?;
    let path = output.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from(&export.filename));
    write_output(&path, &export.content).await?;

    eprintln!("💾 {} records written to: {}", export.record_count, path.display());
    Ok(())
}
