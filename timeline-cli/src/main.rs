use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use timeline_core::{TimelineConfig, TimelineConfigPatch, TimelineLayout};
use timeline_dataset::layout_dataset_str;
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "timeline-cli",
    about = "Dàn trang dataset timeline JSON thành các hàng và toạ độ pixel."
)]
struct Args {
    /// Đường dẫn file JSON dataset.
    #[arg(short, long)]
    input: PathBuf,

    /// Trường dùng để nhóm mục (ghi đè groupBy trong dataset).
    #[arg(short, long)]
    group_by: Option<String>,

    /// Nhãn mức zoom, ví dụ "Week" hoặc "Month".
    #[arg(short, long, conflicts_with = "day_width")]
    zoom: Option<String>,

    /// Số pixel cho một ngày.
    #[arg(long)]
    day_width: Option<f64>,

    /// File JSON ghi đè cấu hình dàn trang.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// In toàn bộ layout dạng JSON thay vì bản tóm tắt.
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    let data = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Không đọc được file {:?}", args.input))?;
    let layout = layout_dataset_str(&data, args.group_by.as_deref(), &config)
        .with_context(|| format!("Không dàn trang được {:?}", args.input))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&layout)?);
    } else {
        print_summary(&layout);
    }

    Ok(())
}

fn load_config(args: &Args) -> anyhow::Result<TimelineConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Không đọc được cấu hình {path:?}"))?;
            let patch: TimelineConfigPatch =
                serde_json::from_str(&raw).with_context(|| format!("Cấu hình sai {path:?}"))?;
            TimelineConfig::from(patch)
        }
        None => TimelineConfig::default(),
    };

    if let Some(zoom) = &args.zoom {
        config.apply_zoom(zoom)?;
    }
    if let Some(day_width) = args.day_width {
        config.day_width = day_width;
    }
    config.validate()?;

    debug!(
        day_width = config.day_width,
        cell_height = config.cell_height,
        "đã nạp cấu hình dàn trang"
    );
    Ok(config)
}

fn print_summary(layout: &TimelineLayout) {
    let years = match (layout.interval.years.first(), layout.interval.years.last()) {
        (Some(first), Some(last)) if first != last => format!("{first}-{last}"),
        (Some(first), _) => first.to_string(),
        _ => String::from("-"),
    };

    println!("Năm: {years} (từ tháng {})", layout.interval.start_month + 1);
    println!(
        "Canvas: {:.1} x {:.1} px, {} px/ngày",
        layout.canvas_width, layout.canvas_height, layout.day_width
    );
    println!("Nhóm: {}", layout.groups.len());
    println!("Mục: {}", layout.item_count());

    for group in &layout.groups {
        println!(
            "\n[{}] hàng {} / cột {} / cao {:.1}",
            group.title, group.cardinality, group.columns, group.height
        );
        for item in &group.items {
            println!(
                "  cột {:>2}  {} .. {}  x={:.1} w={:.1}  {}",
                item.column, item.start_date, item.end_date, item.left, item.width, item.name
            );
        }
    }
}
