//! Mailing Labels CLI
//!
//! Usage:
//!   mailing-labels [OPTIONS] [RECORDS]
//!
//! Options:
//!   -t, --template <KEY>      Label sheet template (default: 5160)
//!   -c, --config <FILE>       Label customization (TOML format)
//!       --templates <FILE>    Additional templates (TOML format)
//!   -f, --format <FORMAT>     pdf, html, print, svg or layout
//!   -o, --output <FILE>       Output file
//!   -a, --auto                Derive layout settings from the label size
//!   -l, --list-templates      List available templates
//!   -v, --verbose             Increase log output (repeatable)
//!   -h, --help                Print help

use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use clap::{Parser, ValueEnum};
use log::{info, LevelFilter};

use mailing_labels::export::export_file_name;
use mailing_labels::records::{read_records_json, MailingLabelRecord};
use mailing_labels::{
    render_with_config, LabelCustomization, OutputFormat, RenderConfig, Rendered,
    TemplateRegistry,
};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Pdf,
    Html,
    Print,
    Svg,
    Layout,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Pdf => OutputFormat::Pdf,
            Format::Html => OutputFormat::Html,
            Format::Print => OutputFormat::Print,
            Format::Svg => OutputFormat::Svg,
            Format::Layout => OutputFormat::Layout,
        }
    }
}

#[derive(Parser)]
#[command(name = "mailing-labels")]
#[command(about = "Lay out and render mailing labels for commercial label sheets")]
struct Cli {
    /// JSON array of address records (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Label sheet template key
    #[arg(short, long, default_value = "5160")]
    template: String,

    /// Label customization file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Additional template definitions (TOML format)
    #[arg(long)]
    templates: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Pdf)]
    format: Format,

    /// Output file (PDF defaults to a dated file name, text formats to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Derive layout settings from the label size instead of the manual controls
    #[arg(short, long)]
    auto: bool,

    /// List available templates and exit
    #[arg(short, long)]
    list_templates: bool,

    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .init();

    // Load templates
    let mut registry = TemplateRegistry::builtin();
    if let Some(path) = &cli.templates {
        match registry.load_file(path) {
            Ok(count) => info!("loaded {} template(s) from {}", count, path.display()),
            Err(e) => fail(&format!("Error loading templates '{}': {}", path.display(), e)),
        }
    }

    if cli.list_templates {
        print_templates(&registry);
        return;
    }

    // If no input file and stdin is a terminal (interactive), show intro help
    if cli.input.is_none() && io::stdin().is_terminal() {
        print_intro();
        return;
    }

    let template = match registry.require(&cli.template) {
        Ok(t) => t.clone(),
        Err(e) => fail(&format!("Error: {}", e)),
    };

    // Load customization
    let mut customization = match &cli.config {
        Some(path) => match LabelCustomization::from_file(path) {
            Ok(c) => c,
            Err(e) => fail(&format!(
                "Error loading customization '{}': {}",
                path.display(),
                e
            )),
        },
        None => LabelCustomization::default(),
    };
    if cli.auto {
        customization.use_auto_optimization = true;
    }

    // Read records
    let records = match read_input(cli.input.as_deref()) {
        Ok(records) => records,
        Err(e) => fail(&format!("Error: {}", e)),
    };

    let config = RenderConfig::new();
    let rendered = match render_with_config(
        &template,
        &customization,
        &records,
        cli.format.into(),
        &config,
    ) {
        Ok(rendered) => rendered,
        Err(e) => fail(&format!("Error: {}", e.user_message())),
    };

    let output = match (&cli.output, cli.format) {
        (Some(path), _) => Some(path.clone()),
        (None, Format::Pdf) => Some(PathBuf::from(export_file_name(
            &template.key,
            Local::now().date_naive(),
        ))),
        (None, _) => None,
    };

    if let Err(e) = write_output(rendered, output.as_deref()) {
        fail(&format!("Error writing output: {}", e));
    }
}

fn fail(message: &str) -> ! {
    eprintln!("{}", message);
    std::process::exit(1);
}

fn read_input(path: Option<&Path>) -> Result<Vec<MailingLabelRecord>, mailing_labels::RecordError> {
    match path {
        Some(path) => read_records_json(fs::File::open(path)?),
        None => read_records_json(io::stdin().lock()),
    }
}

fn write_output(rendered: Rendered, output: Option<&Path>) -> io::Result<()> {
    match (rendered, output) {
        (Rendered::Document(bytes), Some(path)) => {
            fs::write(path, &bytes)?;
            info!("wrote {}", path.display());
        }
        (Rendered::Document(bytes), None) => {
            io::stdout().write_all(&bytes)?;
        }
        (Rendered::Pages(pages), Some(path)) => {
            for (index, page) in pages.iter().enumerate() {
                let page_path = numbered_path(path, index + 1, pages.len());
                fs::write(&page_path, page)?;
                info!("wrote {}", page_path.display());
            }
        }
        (Rendered::Pages(pages), None) => {
            let mut stdout = io::stdout().lock();
            for page in pages {
                writeln!(stdout, "{}", page)?;
            }
        }
    }
    Ok(())
}

/// `labels.svg` -> `labels-2.svg` when there is more than one page
fn numbered_path(path: &Path, number: usize, total: usize) -> PathBuf {
    if total <= 1 {
        return path.to_path_buf();
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "labels".to_string());
    let name = match path.extension() {
        Some(ext) => format!("{}-{}.{}", stem, number, ext.to_string_lossy()),
        None => format!("{}-{}", stem, number),
    };
    path.with_file_name(name)
}

fn print_templates(registry: &TemplateRegistry) {
    println!("{:<14} {:<34} {:>14} {:>8}", "KEY", "NAME", "SIZE (in)", "PER PAGE");
    for template in registry.templates() {
        println!(
            "{:<14} {:<34} {:>14} {:>8}",
            template.key,
            template.name,
            format!("{} x {}", template.width, template.height),
            template.labels_per_page()
        );
    }
}

fn print_intro() {
    println!(
        r#"Mailing Labels - lay out and render address labels

USAGE:
    mailing-labels [OPTIONS] [RECORDS]
    cat records.json | mailing-labels -f html > preview.html

OPTIONS:
    -t, --template <KEY>    Label sheet template (default: 5160)
    -c, --config <FILE>     Label customization (TOML file)
        --templates <FILE>  Additional templates (TOML file)
    -f, --format <FORMAT>   pdf, html, print, svg or layout
    -o, --output <FILE>     Output file
    -a, --auto              Derive layout settings from the label size
    -l, --list-templates    List available templates
    -v, --verbose           More log output
    -h, --help              Print help

RECORDS:
    A JSON array of objects with contact_name, address_line1, address_line2,
    city, state and zip (camelCase keys are accepted too)."#
    );
}
