use adaptive_picture::options::Resolution;
use adaptive_picture::render::{HtmlRenderer, Renderer};
use adaptive_picture::{FileHandle, batch, build_picture_tree, config, output};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// The file to build pictures for.
#[derive(clap::Args, Clone)]
struct HandleArgs {
    /// File handle on the CDN
    handle: String,

    /// API key: turns the handle into a storage alias
    #[arg(long)]
    api_key: Option<String>,
}

impl HandleArgs {
    fn file_handle(&self) -> Result<FileHandle, adaptive_picture::PictureError> {
        match &self.api_key {
            Some(key) => FileHandle::storage_alias(self.handle.as_str(), key.as_str()),
            None => FileHandle::new(self.handle.as_str()),
        }
    }
}

/// Option flags. Each one overrides the preset file.
#[derive(clap::Args, Clone, Default)]
struct OptionArgs {
    /// alt text for the img element
    #[arg(long)]
    alt: Option<String>,

    /// Static display width, e.g. 768px (enables 1x/2x densities)
    #[arg(long)]
    width: Option<String>,

    /// Output format, one source each (repeatable)
    #[arg(long = "format", value_name = "FORMAT")]
    formats: Vec<String>,

    /// srcset entry: 320, 320w or 2x (repeatable)
    #[arg(long = "resolution", value_name = "RES")]
    resolutions: Vec<Resolution>,

    /// MEDIA=SIZE pair, in order; use fallback=SIZE for the default size (repeatable)
    #[arg(long = "size", value_name = "MEDIA=SIZE", value_parser = parse_size)]
    sizes: Vec<(String, String)>,

    /// Serve links from cdn.<CNAME>
    #[arg(long)]
    cname: Option<String>,

    /// Security policy for signed URLs
    #[arg(long, requires = "signature")]
    policy: Option<String>,

    /// Security signature for signed URLs
    #[arg(long, requires = "policy")]
    signature: Option<String>,

    /// Attach a key attribute to every source
    #[arg(long)]
    keys: bool,

    /// Skip transformation parameter validation
    #[arg(long)]
    no_validate: bool,
}

fn parse_size(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(media, size)| (media.trim().to_string(), size.trim().to_string()))
        .ok_or_else(|| format!("expected MEDIA=SIZE, got `{s}`"))
}

impl OptionArgs {
    /// The flags that were given, as an overlay table.
    fn overlay(&self) -> Result<toml::Value, toml::ser::Error> {
        let mut table = toml::Table::new();
        if let Some(alt) = &self.alt {
            table.insert("alt".into(), alt.clone().into());
        }
        if let Some(width) = &self.width {
            table.insert("width".into(), width.clone().into());
        }
        if !self.formats.is_empty() {
            table.insert("formats".into(), toml::Value::try_from(&self.formats)?);
        }
        if !self.resolutions.is_empty() {
            table.insert("resolutions".into(), toml::Value::try_from(&self.resolutions)?);
        }
        if !self.sizes.is_empty() {
            let sizes: toml::Table = self
                .sizes
                .iter()
                .map(|(media, size)| (media.clone(), toml::Value::from(size.as_str())))
                .collect();
            table.insert("sizes".into(), sizes.into());
        }
        if let Some(cname) = &self.cname {
            table.insert("cname".into(), cname.clone().into());
        }
        if let (Some(policy), Some(signature)) = (&self.policy, &self.signature) {
            let mut security = toml::Table::new();
            security.insert("policy".into(), policy.clone().into());
            security.insert("signature".into(), signature.clone().into());
            table.insert("security".into(), security.into());
        }
        if self.keys {
            table.insert("keys".into(), true.into());
        }
        if self.no_validate {
            table.insert("use_validator".into(), false.into());
        }
        Ok(toml::Value::Table(table))
    }
}

#[derive(Parser)]
#[command(name = "adaptive-picture")]
#[command(about = "Responsive <picture> markup from a single CDN file handle")]
#[command(long_about = "\
Responsive <picture> markup from a single CDN file handle

Computes the srcset, sizes, media and type attributes of a <picture> element
and its <img> fallback. Every candidate is a CDN link that resizes and
converts the original file on the fly.

Options are layered, later layers winning:

  stock defaults → adaptive.toml → command-line flags

Resolution rules:
  widths (320, 320w)  need at least one --size
  densities (2x)      need --width and exclude --size

Run 'adaptive-picture gen-config' to generate a documented adaptive.toml.")]
#[command(version)]
struct Cli {
    /// Preset file (default: ./adaptive.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the picture tree as JSON
    Tree {
        #[command(flatten)]
        handle: HandleArgs,
        #[command(flatten)]
        options: OptionArgs,
        /// Indent the JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Print the rendered <picture> element
    Html {
        #[command(flatten)]
        handle: HandleArgs,
        #[command(flatten)]
        options: OptionArgs,
    },
    /// Summarize the picture tree
    Inspect {
        #[command(flatten)]
        handle: HandleArgs,
        #[command(flatten)]
        options: OptionArgs,
    },
    /// Build every {handle, options} entry of a JSON file
    Batch {
        /// JSON array of entries
        input: PathBuf,
        #[command(flatten)]
        options: OptionArgs,
        /// Indent the JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Validate the preset and flags without building anything
    Check {
        #[command(flatten)]
        options: OptionArgs,
    },
    /// Print a stock adaptive.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    match &cli.command {
        Command::Tree {
            handle,
            options,
            pretty,
        } => {
            let resolved = resolve(cli.config.as_deref(), options)?;
            let tree = build_picture_tree(&handle.file_handle()?, &resolved)?;
            println!("{}", to_json(&tree, *pretty)?);
        }
        Command::Html { handle, options } => {
            let resolved = resolve(cli.config.as_deref(), options)?;
            let tree = build_picture_tree(&handle.file_handle()?, &resolved)?;
            println!("{}", HtmlRenderer.render(&tree).into_string());
        }
        Command::Inspect { handle, options } => {
            let resolved = resolve(cli.config.as_deref(), options)?;
            let tree = build_picture_tree(&handle.file_handle()?, &resolved)?;
            let formats = resolved.format_list().map_or(0, |f| f.len());
            output::print_tree(&handle.handle, &tree, formats);
        }
        Command::Batch {
            input,
            options,
            pretty,
        } => {
            let base = base_layers(cli.config.as_deref(), options)?;
            let entries = batch::parse_batch(&std::fs::read_to_string(input)?)?;
            let outcomes = batch::run_batch(&base, &entries);
            println!("{}", to_json(&outcomes, *pretty)?);
            let failed = outcomes.iter().filter(|o| o.is_failed()).count();
            if failed > 0 {
                tracing::warn!(failed, total = outcomes.len(), "some entries failed");
            }
        }
        Command::Check { options } => {
            let resolved = resolve(cli.config.as_deref(), options)?;
            output::print_options(&resolved);
            println!("==> Options are valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Stock defaults merged with the preset file and the flags.
fn base_layers(
    preset: Option<&Path>,
    flags: &OptionArgs,
) -> Result<toml::Value, Box<dyn std::error::Error>> {
    let file = match preset {
        Some(path) => Some(config::load_raw_file(path)?),
        None => config::load_raw_config(Path::new("."))?,
    };
    let layers = file.into_iter().chain(Some(flags.overlay()?));
    Ok(config::merge_layers(config::stock_defaults_value(), layers))
}

fn resolve(
    preset: Option<&Path>,
    flags: &OptionArgs,
) -> Result<adaptive_picture::PictureOptions, Box<dyn std::error::Error>> {
    let base = base_layers(preset, flags)?;
    Ok(config::resolve_options(base, std::iter::empty())?)
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}
