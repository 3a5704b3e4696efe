//! docstruct CLI - document structure extraction tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use docstruct::render::{self, ExtractionStats};
use docstruct::{
    convert_many, detect_format_from_bytes, detect_format_from_path, extract_instructions,
    DocumentTree, JsonFormat, MappingDict, ParseOptions, RenderOptions, SourceFormat,
};

#[derive(Parser)]
#[command(name = "docstruct")]
#[command(version)]
#[command(about = "Extract the section structure of HTML, PDF and text documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that parses a document.
#[derive(Args, Clone)]
struct SourceArgs {
    /// Mapping dict (JSON rule list or font-size-only directive)
    #[arg(short, long, value_name = "FILE", env = "DOCSTRUCT_MAPPING")]
    mapping: Option<PathBuf>,

    /// Encoding of plain-text input
    #[arg(short, long, default_value = "utf-8")]
    encoding: String,

    /// Override format detection
    #[arg(short, long, value_enum)]
    format: Option<InputFormat>,

    /// Skip unreadable PDF pages instead of failing
    #[arg(long)]
    lenient: bool,

    /// Keep header runs inside their paragraphs
    #[arg(long)]
    no_split_headers: bool,
}

impl SourceArgs {
    fn parse_options(&self) -> Result<ParseOptions, Box<dyn std::error::Error>> {
        let mut options = ParseOptions::new()
            .with_encoding(self.encoding.clone())
            .with_split_headers(!self.no_split_headers);
        if let Some(path) = &self.mapping {
            options = options.with_mapping(MappingDict::from_file(path)?);
        }
        if self.lenient {
            options = options.lenient();
        }
        Ok(options)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Convert documents to JSON, Markdown and text files
    Convert {
        /// Input files
        #[arg(value_name = "FILE", required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory (`<name>_output` next to each input if not specified)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Print the document tree as JSON
    Json {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Render the document tree as Markdown
    #[command(alias = "md")]
    Markdown {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Maximum heading level (1-6)
        #[arg(long, default_value = "6")]
        max_heading: u8,

        /// Leave out images
        #[arg(long)]
        no_images: bool,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Render the document tree as plain text
    Text {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Dump the grouped instructions a producer emits
    Instructions {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Show document information
    Info {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum InputFormat {
    Html,
    Pdf,
    Text,
}

impl From<InputFormat> for SourceFormat {
    fn from(format: InputFormat) -> Self {
        match format {
            InputFormat::Html => SourceFormat::Html,
            InputFormat::Pdf => SourceFormat::Pdf,
            InputFormat::Text => SourceFormat::Text,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert {
            inputs,
            output,
            source,
        } => cmd_convert(&inputs, output.as_deref(), &source),
        Commands::Json {
            input,
            output,
            compact,
            source,
        } => cmd_json(&input, output.as_deref(), compact, &source),
        Commands::Markdown {
            input,
            output,
            max_heading,
            no_images,
            source,
        } => cmd_markdown(&input, output.as_deref(), max_heading, no_images, &source),
        Commands::Text {
            input,
            output,
            source,
        } => cmd_text(&input, output.as_deref(), &source),
        Commands::Instructions {
            input,
            compact,
            source,
        } => cmd_instructions(&input, compact, &source),
        Commands::Info { input, source } => cmd_info(&input, &source),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn resolve_format(
    input: &Path,
    bytes: &[u8],
    source: &SourceArgs,
) -> Result<SourceFormat, Box<dyn std::error::Error>> {
    if let Some(format) = source.format {
        return Ok(format.into());
    }
    Ok(detect_format_from_path(input).or_else(|_| detect_format_from_bytes(bytes))?)
}

fn load_tree(input: &Path, source: &SourceArgs) -> Result<DocumentTree, Box<dyn std::error::Error>> {
    let bytes = fs::read(input)?;
    let format = resolve_format(input, &bytes, source)?;
    let options = source.parse_options()?;
    Ok(docstruct::convert_with_format(&bytes, format, &options)?)
}

fn write_or_print(output: Option<&Path>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn cmd_convert(
    inputs: &[PathBuf],
    output: Option<&Path>,
    source: &SourceArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(dir) = output {
        fs::create_dir_all(dir)?;
    }

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    // A forced format applies to every input, so the batch path cannot be used.
    let results: Vec<(PathBuf, docstruct::Result<DocumentTree>)> = if source.format.is_some() {
        inputs
            .iter()
            .map(|input| {
                let tree = load_tree(input, source)
                    .map_err(|e| docstruct::Error::Other(e.to_string()));
                (input.clone(), tree)
            })
            .collect()
    } else {
        pb.set_message("Parsing...");
        convert_many(inputs, &source.parse_options()?)
    };

    let render_options = RenderOptions::new();
    let mut failures = 0;
    let mut written = Vec::new();
    for (input, result) in results {
        pb.set_message(input.display().to_string());
        match result {
            Ok(tree) => {
                let stem = input.file_stem().unwrap_or_default().to_string_lossy();
                let dir = match output {
                    Some(dir) => dir.to_path_buf(),
                    None => {
                        let dir = input
                            .parent()
                            .unwrap_or_else(|| Path::new("."))
                            .join(format!("{}_output", stem));
                        fs::create_dir_all(&dir)?;
                        dir
                    }
                };

                let json = render::to_json(&tree, JsonFormat::Pretty)?;
                let markdown = render::to_markdown(&tree, &render_options)?;
                let text = render::to_text(&tree, &render_options)?;
                for (ext, content) in [("json", json), ("md", markdown), ("txt", text)] {
                    let path = dir.join(format!("{}.{}", stem, ext));
                    fs::write(&path, content)?;
                    written.push(path);
                }
            }
            Err(e) => {
                failures += 1;
                pb.println(format!("{} {}: {}", "Failed".red(), input.display(), e));
            }
        }
        pb.inc(1);
    }
    pb.finish_with_message("Done!");

    println!("\n{}", "Output files:".green().bold());
    for (i, path) in written.iter().enumerate() {
        let branch = if i + 1 == written.len() { "└─" } else { "├─" };
        println!("  {} {}", branch.dimmed(), path.display());
    }

    if failures > 0 {
        return Err(format!("{} of {} documents failed", failures, inputs.len()).into());
    }
    Ok(())
}

fn cmd_json(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    source: &SourceArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let tree = load_tree(input, source)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let json = render::to_json(&tree, format)?;
    write_or_print(output, &json)
}

fn cmd_markdown(
    input: &Path,
    output: Option<&Path>,
    max_heading: u8,
    no_images: bool,
    source: &SourceArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let tree = load_tree(input, source)?;

    let render_options = RenderOptions::new()
        .with_max_heading(max_heading)
        .with_images(!no_images);

    let markdown = render::to_markdown(&tree, &render_options)?;
    write_or_print(output, &markdown)
}

fn cmd_text(
    input: &Path,
    output: Option<&Path>,
    source: &SourceArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let tree = load_tree(input, source)?;
    let text = render::to_text(&tree, &RenderOptions::new())?;
    write_or_print(output, &text)
}

fn cmd_instructions(
    input: &Path,
    compact: bool,
    source: &SourceArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = fs::read(input)?;
    let format = resolve_format(input, &bytes, source)?;
    let groups = extract_instructions(&bytes, format, &source.parse_options()?)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    println!("{}", render::instructions_to_json(&groups, format)?);
    Ok(())
}

fn cmd_info(input: &Path, source: &SourceArgs) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = fs::read(input)?;
    let format = resolve_format(input, &bytes, source)?;
    let tree = docstruct::convert_with_format(&bytes, format, &source.parse_options()?)?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Format".bold(), format);
    println!("{}: {}", "Parser".bold(), tree.metadata.parser_name);
    if format == SourceFormat::Pdf {
        if let Ok(version) = docstruct::detect::pdf_version(&bytes) {
            println!("{}: {}", "PDF version".bold(), version);
        }
    }

    println!();
    println!("{}", "Structure".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let mut stats = ExtractionStats::from_tree(&tree);
    stats.count_text(&render::to_text(&tree, &RenderOptions::new())?);

    println!("{}: {}", "Sections".bold(), stats.section_count);
    println!("{}: {}", "Max depth".bold(), stats.max_depth);
    println!("{}: {}", "Paragraphs".bold(), stats.text_count);
    println!("{}: {}", "Small print".bold(), stats.textsmall_count);
    println!("{}: {}", "Tables".bold(), stats.table_count);
    println!("{}: {}", "Images".bold(), stats.image_count);
    println!("{}: {}", "Words".bold(), stats.word_count);
    println!("{}: {}", "Characters".bold(), stats.char_count);

    let outline: Vec<_> = tree.sections().map(|(_, node)| &node.title).collect();
    if !outline.is_empty() {
        println!();
        println!("{}", "Top-level sections".cyan().bold());
        for title in outline {
            println!("  {} {}", "•".dimmed(), title);
        }
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "docstruct".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Document structure extraction tool");
    println!();
    println!("License: MIT");
}
