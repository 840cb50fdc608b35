use anyhow::Context;
use chrono::{NaiveDate, NaiveTime, Utc};
use clap::{Parser, Subcommand};
use clinic_core::announcement::{self, AnnouncementRecord, Status};
use clinic_core::manifest::{MAX_SCALE, MIN_SCALE};
use clinic_fs::read_announcements;
use clinic_google::{GoogleSession, GoogleStore, ServiceAccountCredentials};
use clinic_sync::{Preflight, SiteLayout, crop_to_fixed_aspect, preflight, run_sync};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "clinic")]
#[command(about = "Content synchronizer for the clinic website")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Site root receiving manifests, images and documents
    #[arg(short, long, env = "CLINIC_SITE_ROOT", default_value = ".")]
    root: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Mirror the Sheets/Drive content into the site
    Sync,
    /// List synced announcements in display order
    Announcements {
        /// Announcement directory (defaults to the site's messages folder)
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Evaluate as of this UTC day instead of today (YYYY-MM-DD)
        #[arg(long)]
        today: Option<NaiveDate>,

        #[arg(long)]
        json: bool,
    },
    /// Show the announcement that is live
    Live {
        #[arg(long)]
        dir: Option<PathBuf>,

        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Crop a local image to the 1200x630 social preview format
    Crop {
        source: PathBuf,
        dest: PathBuf,

        #[arg(long, default_value_t = 1.0)]
        scale: f64,

        /// Horizontal focus point in percent
        #[arg(short, long, default_value_t = 50.0)]
        x: f64,

        /// Vertical focus point in percent
        #[arg(short, long, default_value_t = 50.0)]
        y: f64,
    },
}

#[derive(Serialize)]
struct Listed<'a> {
    status: Status,
    #[serde(flatten)]
    record: &'a AnnouncementRecord,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let cli = Cli::parse();
    let layout = SiteLayout::new(&cli.root);

    match cli.command {
        Commands::Sync => {
            let config = match preflight(|key| std::env::var(key).ok())? {
                Preflight::Ready(config) => config,
                Preflight::Skip { .. } => {
                    println!("⏭️  Sync skipped for dependency bot build.");
                    return Ok(());
                }
            };

            let credentials =
                ServiceAccountCredentials::new(&config.service_account_email, &config.private_key);
            let session = GoogleSession::initialize(&credentials)
                .await
                .context("Failed to authenticate with Google")?;
            let store = GoogleStore::new(session, &config.spreadsheet_id);

            println!("🔄 Syncing content into {:?}...", layout.root());
            let report = run_sync(&store, &config, &layout).await?;

            for collection in &report.collections {
                println!("   {collection}");
            }
            println!("   {}", report.cover);
            println!(
                "✅ Sync complete: {} downloaded, {} deleted.",
                report.total_downloads(),
                report.total_deletions()
            );
        }
        Commands::Announcements { dir, today, json } => {
            let dir = dir.unwrap_or_else(|| layout.messages_dir());
            let today = today.unwrap_or_else(|| announcement::utc_day(Utc::now()));
            let records = read_announcements(&dir).await?;
            let sorted = announcement::sort(&records, today);

            if json {
                let listed: Vec<_> = sorted
                    .iter()
                    .map(|record| Listed {
                        status: announcement::classify(record, today),
                        record,
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&listed)?);
            } else if sorted.is_empty() {
                println!("No announcements in {dir:?}.");
            } else {
                for record in &sorted {
                    println!(
                        "{:<8} {} → {}  {}",
                        announcement::classify(record, today),
                        record.start_date,
                        record.end_date.as_deref().unwrap_or("open"),
                        record.title
                    );
                }
            }
        }
        Commands::Live { dir, today } => {
            let dir = dir.unwrap_or_else(|| layout.messages_dir());
            let now = today
                .map(|day| day.and_time(NaiveTime::MIN).and_utc())
                .unwrap_or_else(Utc::now);
            let records = read_announcements(&dir).await?;

            match announcement::select_live(&records, now) {
                Some(record) => {
                    println!("📢 {}", record.title);
                    if !record.body.is_empty() {
                        println!("\n{}", record.body);
                    }
                }
                None => println!("No live announcement."),
            }
        }
        Commands::Crop {
            source,
            dest,
            scale,
            x,
            y,
        } => {
            let plan = crop_to_fixed_aspect(
                &source,
                &dest,
                scale.clamp(MIN_SCALE, MAX_SCALE),
                x.clamp(0.0, 100.0),
                y.clamp(0.0, 100.0),
            )
            .await?;
            println!(
                "✅ Resized to {}x{}, cropped at ({}, {}) → {dest:?}",
                plan.resize_width, plan.resize_height, plan.origin_x, plan.origin_y
            );
        }
    }

    Ok(())
}
