use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, Level};

use coverme::render::{composed_filter, Background, FilterPreset, Frame};
use coverme::simulate::{self, CONTACT_SEND_DELAY, SAVE_FEEDBACK_DELAY, SHARE_DELAY};
use coverme::source;
use coverme::state::contact;
use coverme::state::data::GalleryFilter;
use coverme::state::edit::AdjustmentKind;
use coverme::state::gallery::time_ago;
use coverme::state::layer::STICKER_PALETTE;
use coverme::{Config, CoverResult, EditingSession, Gallery, SqliteStore};

#[derive(Parser, Debug)]
#[command(name = "coverme", version, about = "Photo cover editor with a local gallery")]
struct Cli {
    /// Gallery database (defaults to the user data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Edit a picture and export or save the result
    Edit(EditArgs),
    /// Browse and manage saved creations
    #[command(subcommand)]
    Gallery(GalleryCommand),
    /// List filter presets, frames, slider ranges and stickers
    Presets,
    /// Send a (simulated) contact message
    Contact {
        /// Only show the counters
        #[arg(long)]
        stats: bool,
    },
}

#[derive(Args, Debug)]
struct EditArgs {
    /// Picture to edit
    input: PathBuf,

    /// Filter preset (vintage, bw, sepia, vibrant, cool, warm, retro)
    #[arg(long)]
    preset: Option<String>,

    /// Slider value, e.g. `brightness=120` (repeatable)
    #[arg(long = "adjust", value_parser = parse_adjustment)]
    adjustments: Vec<(AdjustmentKind, i32)>,

    /// Sticker content, placed at the center (repeatable)
    #[arg(long = "sticker")]
    stickers: Vec<String>,

    /// Frame style (classic, modern, vintage)
    #[arg(long)]
    frame: Option<String>,

    /// Background: `#rrggbb` or `linear-gradient(45deg, #a, #b)`
    #[arg(long, value_parser = parse_background)]
    background: Option<Background>,

    /// Font used to draw stickers
    #[arg(long)]
    sticker_font: Option<PathBuf>,

    /// Undo this many of the edits above before output
    #[arg(long, default_value_t = 0)]
    undo: usize,

    /// Write the result as PNG
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Save the result to the gallery
    #[arg(long)]
    save: bool,
}

#[derive(Subcommand, Debug)]
enum GalleryCommand {
    /// List saved creations, newest first
    List {
        #[arg(long, default_value_t = GalleryFilter::All)]
        filter: GalleryFilter,
    },
    /// Totals of photos, downloads and shares
    Stats,
    /// Toggle the favorite flag
    Favorite { id: String },
    /// Write an item to a PNG file and count the download
    Download {
        id: String,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Share an item (simulated)
    Share { id: String },
    /// Delete one item
    Delete {
        id: String,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Delete every item
    Clear {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

fn parse_adjustment(s: &str) -> Result<(AdjustmentKind, i32), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got {:?}", s))?;
    let kind = name.parse::<AdjustmentKind>().map_err(|e| e.to_string())?;
    let value = value
        .trim()
        .parse::<i32>()
        .map_err(|e| format!("{}: {}", kind, e))?;
    Ok((kind, value))
}

fn parse_background(s: &str) -> Result<Background, String> {
    s.parse::<Background>().map_err(|e| e.to_string())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> CoverResult<()> {
    let mut config = Config::load()?;
    if let Some(db) = cli.db {
        config.db_path = Some(db);
    }

    match cli.cmd {
        Command::Edit(args) => cmd_edit(&config, args).await,
        Command::Gallery(cmd) => cmd_gallery(&config, cmd).await,
        Command::Presets => {
            cmd_presets();
            Ok(())
        }
        Command::Contact { stats } => cmd_contact(&config, stats).await,
    }
}

fn open_store(config: &Config) -> CoverResult<SqliteStore> {
    SqliteStore::open(&config.database_path()?)
}

async fn cmd_edit(config: &Config, args: EditArgs) -> CoverResult<()> {
    let image = source::load_path(args.input.clone()).await?;

    let mut session = EditingSession::new(config);
    if let Some(font) = args.sticker_font.as_ref().or(config.sticker_font.as_ref()) {
        session.atlas_mut().load_font(font)?;
    }
    session.load_image(&image);

    if let Some(background) = args.background {
        session.set_background(background);
    }
    if let Some(name) = &args.preset {
        let preset = session.apply_filter_preset(name);
        if preset == FilterPreset::None && !name.eq_ignore_ascii_case("none") {
            eprintln!("unknown preset {:?}, using no filter", name);
        }
    }
    for (kind, value) in &args.adjustments {
        if !kind.in_range(*value) {
            let (min, max) = kind.range();
            eprintln!("{} = {} is outside the slider range {}..={}, stored as given", kind, value, min, max);
        }
        session.set_adjustment(*kind, *value);
    }
    for content in &args.stickers {
        session.add_sticker(content);
    }
    if let Some(name) = &args.frame {
        session.set_frame(name);
    }
    for _ in 0..args.undo {
        if !session.undo() {
            break;
        }
    }

    let state = session.state();
    println!("filter: {}", composed_filter(state));
    println!("frame:  {}", state.frame);
    println!("layers: {}", state.layers.len());

    if let Some(output) = &args.output {
        session.export_png(output)?;
        println!("wrote {}", output.display());
    }

    if args.save {
        let store = open_store(config)?;
        let mut gallery = Gallery::open(&store)?;
        if let Some(id) = simulate::save_with_feedback(&session, &mut gallery, SAVE_FEEDBACK_DELAY).await? {
            println!("saved to gallery as {}", id);
        }
    }
    Ok(())
}

async fn cmd_gallery(config: &Config, cmd: GalleryCommand) -> CoverResult<()> {
    let store = open_store(config)?;
    let mut gallery = Gallery::open(&store)?;

    match cmd {
        GalleryCommand::List { filter } => {
            let now = Utc::now();
            let items = gallery.filter_at(filter, now);
            if items.is_empty() {
                println!("No creations ({})", filter);
            }
            for item in items {
                println!(
                    "{}  {:<12} {:<8} {:<8} {} {:>3} downloads {:>3} shares",
                    item.id,
                    time_ago(item.timestamp, now),
                    item.filter_label(),
                    item.frame,
                    if item.favorite { "♥" } else { " " },
                    item.downloads,
                    item.shares
                );
            }
        }
        GalleryCommand::Stats => {
            let stats = gallery.stats();
            println!("photos:    {}", stats.photos);
            println!("downloads: {}", stats.downloads);
            println!("shares:    {}", stats.shares);
        }
        GalleryCommand::Favorite { id } => match gallery.toggle_favorite(&id)? {
            Some(true) => println!("{} added to favorites", id),
            Some(false) => println!("{} removed from favorites", id),
            None => println!("no item {}", id),
        },
        GalleryCommand::Download { id, output } => {
            let Some(item) = gallery.get(&id) else {
                println!("no item {}", id);
                return Ok(());
            };
            let decoded = source::decode_data_uri(&item.data_url)?;
            decoded.save_with_format(&output, image::ImageFormat::Png)?;
            gallery.increment_download(&id)?;
            println!("wrote {}", output.display());
        }
        GalleryCommand::Share { id } => match simulate::share(&mut gallery, &id, SHARE_DELAY).await? {
            Some(shares) => println!("shared {} ({} shares)", id, shares),
            None => println!("no item {}", id),
        },
        GalleryCommand::Delete { id, yes } => {
            if !yes {
                println!("pass --yes to delete {}", id);
            } else if gallery.delete(&id)? {
                println!("deleted {}", id);
            } else {
                println!("no item {}", id);
            }
        }
        GalleryCommand::Clear { yes } => {
            if yes {
                gallery.clear()?;
                info!("Cleared gallery at {:?}", store.path());
                println!("gallery cleared");
            } else {
                println!("pass --yes to delete all {} items", gallery.len());
            }
        }
    }
    Ok(())
}

fn cmd_presets() {
    for preset in FilterPreset::ALL {
        println!("{:<8} {:<9} {}", preset.name(), preset.display_name(), preset.chain());
    }
    for frame in Frame::ALL {
        println!("frame: {}", frame.name());
    }
    for kind in AdjustmentKind::ALL {
        let (min, max) = kind.range();
        println!("{:<10} {}..={} (neutral {})", kind.name(), min, max, kind.neutral());
    }
    println!("stickers: {}", STICKER_PALETTE.join(" "));
}

async fn cmd_contact(config: &Config, stats_only: bool) -> CoverResult<()> {
    let store = open_store(config)?;
    let stats = if stats_only {
        contact::load_contact_stats(&store)?
    } else {
        let stats = simulate::submit_contact(&store, CONTACT_SEND_DELAY).await?;
        println!("message sent");
        stats
    };

    println!("messages: {}", stats.messages);
    match stats.last_contact {
        Some(at) => println!("last:     {}", at.to_rfc3339()),
        None => println!("last:     never"),
    }
    Ok(())
}
