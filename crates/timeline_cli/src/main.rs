//! CLI smoke entry point.
//!
//! # Responsibility
//! - Open (or create) a timeline database and seed it when empty.
//! - Print the events visible in the default window, one per line.
//!
//! Usage: `timeline_cli [DB_PATH] [CONFIG_JSON]`

use std::error::Error;
use std::path::PathBuf;
use timeline_core::db::open_db;
use timeline_core::model::datetime::format_date_time;
use timeline_core::{
    init_logging, SqliteEventRepository, SystemClock, TimelineConfig, ViewController,
};

fn main() {
    if let Err(err) = run() {
        eprintln!("timeline_cli error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let db_arg = args.next();
    let mut config = match args.next() {
        Some(path) => TimelineConfig::from_json_str(&std::fs::read_to_string(path)?)?,
        None => TimelineConfig::default(),
    };
    if let Some(db_path) = db_arg {
        config.db_path = PathBuf::from(db_path);
    }
    if let Some(log_dir) = config.log_dir.as_ref().and_then(|dir| dir.to_str()) {
        init_logging(&config.log_level, log_dir)?;
    }

    println!("timeline_core version={}", timeline_core::core_version());

    let mut conn = open_db(&config.db_path)?;
    let repo = SqliteEventRepository::try_new(&mut conn)?;
    let mut controller = ViewController::new(repo, SystemClock, config.initial_window()?)?;
    if config.seed_when_empty && controller.seed_if_empty()? {
        println!("seeded sample data into {}", config.db_path.display());
    }

    let snapshot = controller.snapshot();
    println!(
        "window {} .. {} zoom={}d visible={}/{}",
        snapshot.range_start,
        snapshot.range_end,
        snapshot.zoom_width_days,
        snapshot.visible.len(),
        snapshot.total_events
    );
    for visible in &snapshot.visible {
        let event = &visible.event;
        let tags = event
            .tags
            .iter()
            .map(|tag| tag.name.as_str())
            .collect::<Vec<_>>()
            .join(",");
        println!(
            "{:>4}  {}  {}  [{}]",
            event.id,
            format_date_time(&event.start),
            event.title,
            tags
        );
    }
    Ok(())
}
