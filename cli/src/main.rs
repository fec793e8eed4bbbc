//! danfe CLI - DANFE PDF generation tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use danfe::{fields_from_file, render_batch, render_file_with_options, RenderOptions};

#[derive(Parser)]
#[command(name = "danfe")]
#[command(version)]
#[command(about = "Render DANFE PDFs from NF-e XML", long_about = None)]
struct Cli {
    /// Input NF-e XML file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output directory
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Truncate line items to a single page
    #[arg(long)]
    single_page: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render an NF-e XML file to a DANFE PDF
    Render {
        /// Input NF-e XML file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory (current directory if not specified)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Truncate line items to a single page
        #[arg(long)]
        single_page: bool,

        /// PDF title metadata
        #[arg(long)]
        title: Option<String>,
    },

    /// Render every NF-e XML file in a directory
    Batch {
        /// Directory containing NF-e XML files
        #[arg(value_name = "DIR")]
        input: PathBuf,

        /// Output directory (input directory if not specified)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Truncate line items to a single page
        #[arg(long)]
        single_page: bool,
    },

    /// Print the extracted field set as JSON
    Inspect {
        /// Input NF-e XML file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show document information
    Info {
        /// Input NF-e XML file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Render {
            input,
            output,
            single_page,
            title,
        }) => cmd_render(&input, output.as_deref(), single_page, title),
        Some(Commands::Batch {
            input,
            output,
            single_page,
        }) => cmd_batch(&input, output.as_deref(), single_page),
        Some(Commands::Inspect {
            input,
            output,
            compact,
        }) => cmd_inspect(&input, output.as_deref(), compact),
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: render if input is provided
            if let Some(input) = cli.input {
                cmd_render(&input, cli.output.as_deref(), cli.single_page, None)
            } else {
                println!("{}", "Usage: danfe <FILE> [OUTPUT]".yellow());
                println!("       danfe --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn render_options(single_page: bool, title: Option<String>) -> RenderOptions {
    let mut options = RenderOptions::new();
    if single_page {
        options = options.single_page();
    }
    if let Some(title) = title {
        options = options.with_title(title);
    }
    options
}

fn cmd_render(
    input: &Path,
    output: Option<&Path>,
    single_page: bool,
    title: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = output.map(Path::to_path_buf).unwrap_or_else(|| ".".into());
    fs::create_dir_all(&output_dir)?;

    let options = render_options(single_page, title);
    let rendered = render_file_with_options(input, &options)?;
    let path = rendered.save_to(&output_dir)?;

    println!(
        "{} {} ({} page{})",
        "Saved to".green(),
        path.display(),
        rendered.pages,
        if rendered.pages == 1 { "" } else { "s" }
    );

    Ok(())
}

fn cmd_batch(
    input: &Path,
    output: Option<&Path>,
    single_page: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = output.map(Path::to_path_buf).unwrap_or_else(|| input.to_path_buf());
    fs::create_dir_all(&output_dir)?;

    let mut paths: Vec<PathBuf> = fs::read_dir(input)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .map(|ext| ext.eq_ignore_ascii_case("xml"))
                .unwrap_or(false)
        })
        .collect();
    paths.sort();

    if paths.is_empty() {
        println!("{}", "No XML files found".yellow());
        return Ok(());
    }
    log::debug!("rendering {} files from {}", paths.len(), input.display());

    let pb = ProgressBar::new(paths.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let options = render_options(single_page, None);
    let results = render_batch(&paths, &options);

    let mut rendered_count = 0usize;
    let mut failures: Vec<(PathBuf, String)> = Vec::new();
    for (path, result) in paths.iter().zip(results) {
        match result {
            Ok(rendered) => {
                rendered.save_to(&output_dir)?;
                rendered_count += 1;
            }
            Err(e) => failures.push((path.clone(), e.to_string())),
        }
        pb.inc(1);
    }
    pb.finish_with_message("Done!");

    println!(
        "\n{} {} of {} files to {}",
        "Rendered".green().bold(),
        rendered_count,
        paths.len(),
        output_dir.display()
    );
    for (path, error) in &failures {
        eprintln!("{}: {}: {}", "Failed".red(), path.display(), error);
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(format!("{} file(s) failed", failures.len()).into())
    }
}

fn cmd_inspect(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let fields = fields_from_file(input)?;

    let json = if compact {
        serde_json::to_string(&fields)?
    } else {
        serde_json::to_string_pretty(&fields)?
    };

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let fields = fields_from_file(input)?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    if !fields.identification.number.is_empty() {
        println!("{}: {}", "Number".bold(), fields.identification.number);
    }
    if !fields.identification.series.is_empty() {
        println!("{}: {}", "Series".bold(), fields.identification.series);
    }
    if !fields.access_key.is_empty() {
        println!("{}: {}", "Access key".bold(), fields.access_key);
    }
    if !fields.issuer.name.is_empty() {
        println!("{}: {}", "Issuer".bold(), fields.issuer.name);
    }
    if !fields.recipient.name.is_empty() {
        println!("{}: {}", "Recipient".bold(), fields.recipient.name);
    }
    if !fields.identification.issued_at.is_empty() {
        println!("{}: {}", "Issued".bold(), fields.identification.issued_at);
    }
    println!(
        "{}: {}",
        "Authorized".bold(),
        if fields.protocol.is_present() {
            "Yes"
        } else {
            "No"
        }
    );

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "Items".bold(), fields.items.len());
    if !fields.totals.v_nf.is_empty() {
        println!("{}: {}", "Total".bold(), fields.totals.v_nf);
    }

    Ok(())
}

fn cmd_version() {
    println!("danfe {}", env!("CARGO_PKG_VERSION"));
}
