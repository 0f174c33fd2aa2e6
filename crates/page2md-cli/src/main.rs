//! page2md command-line front end
//!
//! Reads an HTML page from a file or stdin, picks the region to convert
//! (whole body, a CSS selector, or the detected main content), strips the
//! configured exclude regions and writes the Markdown.
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use clap::{ArgAction, Parser, ValueEnum};
use page2md::filename::render_template;
use page2md::{
    parse_document, remove_matching, select_fragment, CodeBlockStyle, HeadingStyle, Node,
    Selector, Settings,
};

#[derive(Parser)]
#[command(name = "page2md", version)]
#[command(about = "Convert a web page, or part of one, to Markdown")]
struct Cli {
    /// HTML file to convert (reads stdin when omitted)
    input: Option<PathBuf>,

    /// Convert only the elements matching this CSS selector
    #[arg(long, value_name = "CSS", conflicts_with = "main")]
    selector: Option<String>,

    /// Convert only the detected main content
    #[arg(long)]
    main: bool,

    /// JSON settings file
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Title used for the filename (defaults to the page's <title>)
    #[arg(long)]
    title: Option<String>,

    /// Output file or directory
    #[arg(short, long, value_name = "PATH", conflicts_with = "stdout")]
    output: Option<PathBuf>,

    /// Print the Markdown instead of writing a file
    #[arg(long)]
    stdout: bool,

    #[arg(long, value_enum)]
    heading_style: Option<HeadingArg>,

    #[arg(long, value_enum)]
    code_block_style: Option<CodeBlockArg>,

    /// List bullet: -, * or +
    #[arg(long, value_parser = parse_bullet)]
    bullet: Option<char>,

    /// Drop images
    #[arg(long)]
    no_images: bool,

    /// Keep link text but drop the targets
    #[arg(long)]
    no_links: bool,

    /// Verbose logging (repeat for more)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum HeadingArg {
    Atx,
    Setext,
}

#[derive(Clone, Copy, ValueEnum)]
enum CodeBlockArg {
    Fenced,
    Indented,
}

fn parse_bullet(value: &str) -> std::result::Result<char, String> {
    match value {
        "-" | "*" | "+" => Ok(value.chars().next().unwrap_or('-')),
        _ => Err(format!("`{value}` is not one of -, * or +")),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let mut settings = match &cli.settings {
        Some(path) => Settings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };
    apply_overrides(&cli, &mut settings);
    // html5ever has already decoded character references
    settings.markdown.decode_entities = false;

    let html = read_input(cli.input.as_deref())?;
    let document = parse_document(&html);

    let fragment;
    let region: &Node = if let Some(css) = &cli.selector {
        let selector = Selector::parse(css)?;
        fragment = select_fragment(&document, &selector)
            .with_context(|| format!("Selector `{css}` matched nothing"))?;
        &fragment
    } else if cli.main {
        settings
            .locator()
            .locate(&document)
            .context("No main content found; choose a region with --selector")?
    } else {
        document.find_first("body").unwrap_or(&document)
    };

    let cleaned = remove_matching(region, settings.locator().excludes());
    let markdown = settings.transformer().transform(&cleaned);

    if cli.stdout {
        print!("{markdown}");
        return Ok(());
    }

    let title = cli.title.clone().or_else(|| page_title(&document));
    let filename = render_template(
        &settings.file.filename_template,
        title.as_deref(),
        Local::now().date_naive(),
    );
    let path = output_path(cli.output.as_deref(), &filename);

    fs::write(&path, &markdown).with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("wrote {} bytes to {}", markdown.len(), path.display());
    println!("{}", path.display());

    Ok(())
}

fn apply_overrides(cli: &Cli, settings: &mut Settings) {
    let config = &mut settings.markdown;
    if let Some(style) = cli.heading_style {
        config.heading_style = match style {
            HeadingArg::Atx => HeadingStyle::Atx,
            HeadingArg::Setext => HeadingStyle::Setext,
        };
    }
    if let Some(style) = cli.code_block_style {
        config.code_block_style = match style {
            CodeBlockArg::Fenced => CodeBlockStyle::Fenced,
            CodeBlockArg::Indented => CodeBlockStyle::Indented,
        };
    }
    if let Some(bullet) = cli.bullet {
        config.bullet_list_marker = bullet;
    }
    if cli.no_images {
        config.preserve_images = false;
    }
    if cli.no_links {
        config.preserve_links = false;
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
        }
        None => {
            let mut html = String::new();
            io::stdin()
                .read_to_string(&mut html)
                .context("Failed to read HTML from stdin")?;
            Ok(html)
        }
    }
}

fn page_title(document: &Node) -> Option<String> {
    document
        .find_first("title")
        .map(|title| title.text_content().trim().to_string())
        .filter(|title| !title.is_empty())
}

/// An existing directory receives the derived filename; anything else is
/// taken as the file to write
fn output_path(output: Option<&Path>, filename: &str) -> PathBuf {
    match output {
        Some(dir) if dir.is_dir() => dir.join(filename),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(filename),
    }
}
