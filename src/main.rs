use clap::{Parser, Subcommand};
use simple_cover::compose::{AssetSizes, Compositor, CoverAssets, CoverRequest, plan_cover};
use simple_cover::config::{self, CoverConfig};
use simple_cover::imaging::Quality;
use simple_cover::provider::{BodDimensionService, CachedDimensions, DimensionService};
use simple_cover::text::{GlyphRasterizer, TypographyMode};
use simple_cover::output;
use simple_cover::variant::{self, LayoutVariant, SpecSource};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

/// Author and title, shared by every command that lays out text.
#[derive(clap::Args, Clone)]
struct TextArgs {
    /// Author name
    #[arg(long)]
    author: String,

    /// Book title; a line break (or a literal `\n`) splits it over two lines
    #[arg(long)]
    title: String,

    /// Use --font-size and --black-text instead of automatic sizing and colour
    #[arg(long = "override")]
    override_typography: bool,

    /// Base title size in pt at a 2100 px tall cover (with --override)
    #[arg(long)]
    font_size: Option<f64>,

    /// Draw band text in black instead of white (with --override)
    #[arg(long)]
    black_text: bool,
}

impl TextArgs {
    fn title(&self) -> String {
        self.title.replace("\\n", "\n")
    }

    fn typography(&self) -> TypographyMode {
        if self.override_typography {
            TypographyMode::Override {
                font_size: self.font_size,
                black_text: self.black_text,
            }
        } else {
            TypographyMode::Auto
        }
    }
}

#[derive(clap::Args)]
struct DigitalArgs {
    /// Cover photograph
    #[arg(long)]
    image: PathBuf,

    #[command(flatten)]
    text: TextArgs,

    /// Layout variant (see `simple-cover variants`)
    #[arg(long, default_value = "digital")]
    variant: String,

    /// Directory the JPEG is written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[derive(clap::Args)]
struct PrintArgs {
    /// Photograph for the blurred back panel (and the front, unless --front is given)
    #[arg(long)]
    background: PathBuf,

    /// Sharp front-panel image
    #[arg(long)]
    front: Option<PathBuf>,

    /// ISBN barcode image for the back panel
    #[arg(long)]
    barcode: PathBuf,

    /// Spine logo; defaults to `[assets] logo` from the config
    #[arg(long)]
    logo: Option<PathBuf>,

    /// Page count, which sets the spine width
    #[arg(long)]
    pages: u32,

    #[command(flatten)]
    text: TextArgs,

    /// Layout variant (see `simple-cover variants`)
    #[arg(long, default_value = "print-simple")]
    variant: String,

    /// Directory the JPEG is written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[derive(clap::Args)]
struct PlanArgs {
    /// Cover photograph; only its header is read
    #[arg(long)]
    image: PathBuf,

    /// ISBN barcode image (print variants)
    #[arg(long)]
    barcode: Option<PathBuf>,

    /// Spine logo; defaults to `[assets] logo` from the config
    #[arg(long)]
    logo: Option<PathBuf>,

    /// Page count (print variants)
    #[arg(long)]
    pages: Option<u32>,

    #[command(flatten)]
    text: TextArgs,

    #[arg(long, default_value = "digital")]
    variant: String,

    /// Print JSON instead of the summary
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
#[command(name = "simple-cover")]
#[command(about = "Book cover generator for e-books and paperbacks")]
#[command(long_about = "\
Book cover generator for e-books and paperbacks

A photograph becomes a cover: the bottom of the image is frosted into a soft
band carrying the author and title. Print covers add a blurred back panel, a
spine sized from the page count with logo and rotated text, and the ISBN
barcode.

Layout variants:
  digital          the photograph with a frosted band (2x2 placeholder grid)
  digital-classic  same, with the finer 4x3 grid of the first covers
  print-simple     paperback spread at a fixed 30.158 x 22.225 cm
  print-bod        paperback spread measured by the Books-on-Demand calculator

Run 'simple-cover gen-config' to generate a documented cover.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Configuration file (missing file = stock defaults)
    #[arg(long, default_value = "cover.toml", global = true)]
    config: PathBuf,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compose an e-book cover
    Digital(DigitalArgs),
    /// Compose a print spread: back, spine and front
    Print(PrintArgs),
    /// Show the layout of a cover without drawing it
    Plan(PlanArgs),
    /// List the layout variants
    Variants,
    /// Print a stock cover.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Digital(args) => {
            let config = config::load_config(&cli.config)?;
            let variant = variant::find_variant(&args.variant)?;
            let assets = CoverAssets::load(&args.image, None, None, None)?;
            let rasterizer = GlyphRasterizer::from_config(&config.fonts)?;
            let request = CoverRequest {
                variant,
                author: args.text.author.clone(),
                title: args.text.title(),
                typography: args.text.typography(),
                spec: variant.resolve_spec(None, None)?,
            };
            let cover = Compositor::new(&config, &rasterizer).compose(&request, &assets)?;
            let path = cover.save(&args.out_dir, Quality::new(config.output.quality))?;
            output::print_cover_report(&cover, &path);
        }
        Command::Print(args) => {
            let config = config::load_config(&cli.config)?;
            let variant = variant::find_variant(&args.variant)?;
            let spec = resolve_spec(variant, Some(args.pages), &config)?;
            let logo = args.logo.clone().unwrap_or_else(|| config.assets.logo.clone());
            let assets = CoverAssets::load(
                &args.background,
                args.front.as_deref(),
                Some(logo.as_path()),
                Some(args.barcode.as_path()),
            )?;
            let rasterizer = GlyphRasterizer::from_config(&config.fonts)?;
            let request = CoverRequest {
                variant,
                author: args.text.author.clone(),
                title: args.text.title(),
                typography: args.text.typography(),
                spec,
            };
            let cover = Compositor::new(&config, &rasterizer).compose(&request, &assets)?;
            let path = cover.save(&args.out_dir, Quality::new(config.output.quality))?;
            output::print_cover_report(&cover, &path);
        }
        Command::Plan(args) => {
            let config = config::load_config(&cli.config)?;
            let variant = variant::find_variant(&args.variant)?;
            let spec = resolve_spec(variant, args.pages, &config)?;
            let mut sizes = AssetSizes {
                source: Some(image::image_dimensions(&args.image)?),
                ..AssetSizes::default()
            };
            if variant.is_print() {
                let logo = args.logo.clone().unwrap_or_else(|| config.assets.logo.clone());
                sizes.logo = Some(image::image_dimensions(&logo)?);
                sizes.barcode = args
                    .barcode
                    .as_deref()
                    .map(image::image_dimensions)
                    .transpose()?;
            }
            let rasterizer = GlyphRasterizer::from_config(&config.fonts)?;
            let request = CoverRequest {
                variant,
                author: args.text.author.clone(),
                title: args.text.title(),
                typography: args.text.typography(),
                spec,
            };
            let plan = plan_cover(&request, &sizes, &config, &rasterizer)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                output::print_plan(&plan);
            }
        }
        Command::Variants => {
            output::print_variants(variant::VARIANTS);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout carries only the report.
fn init_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Physical spec for `variant`, asking the provider only when the variant
/// needs one.
fn resolve_spec(
    variant: &LayoutVariant,
    pages: Option<u32>,
    config: &CoverConfig,
) -> Result<Option<simple_cover::imaging::PhysicalSpec>, Box<dyn std::error::Error>> {
    match variant.spec_source {
        SpecSource::Provider => {
            let service = CachedDimensions::new(BodDimensionService::new(&config.provider)?);
            let service: &dyn DimensionService = &service;
            Ok(variant.resolve_spec(pages, Some(service))?)
        }
        _ => Ok(variant.resolve_spec(pages, None)?),
    }
}
