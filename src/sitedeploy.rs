use anyhow::Result;
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

use sitedeploy::{
    deploy, plan_uploads, Config, DeployError, DeployOptions, DeploySummary, ProbeOutcome,
    S3Client, UploadedObject,
};

#[derive(Parser, Debug)]
#[command(
    name = "sitedeploy",
    version = env!("CARGO_PKG_VERSION"),
    author = "Tyr Chen <tyr.chen@gmail.com>",
    about = "Publish a static site directory to S3 with per-file content types",
    long_about = "Checks write/delete access with a canary object, then uploads every top-level entry \
                  of the site directory keyed by its file name. Content-Type is inferred from the extension. \
                  The first failed upload stops the run.",
    after_help = "Examples:\n  \
                  sitedeploy                              # Publish ./website to the default bucket\n  \
                  sitedeploy --dir public --bucket my-site # Publish another directory\n  \
                  sitedeploy --dry-run                    # Show what would be uploaded\n\n\
                  Configuration (.env):\n  \
                  AWS_REGION=us-west-2\n  \
                  AWS_PROFILE=deploy\n  \
                  S3_BUCKET=my-site\n  \
                  SITE_DIR=./website\n\n\
                  For more information: https://github.com/tyrchen/swiss-knife"
)]
struct Cli {
    /// Target bucket (overrides S3_BUCKET)
    #[arg(long, short = 'b')]
    bucket: Option<String>,

    /// Site directory to publish (overrides SITE_DIR)
    #[arg(long, short = 'd')]
    dir: Option<PathBuf>,

    /// Show what would be uploaded without touching the bucket
    #[arg(long)]
    dry_run: bool,

    /// Abort when the permission check is denied instead of continuing
    #[arg(long)]
    strict_permissions: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file early to get LOG_LEVEL
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL")
        .ok()
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new(&log_level))
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    info!("Site Deploy v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?.with_overrides(cli.bucket, cli.dir)?;

    println!(
        "{}",
        style(format!(
            "📦 Target: s3://{} ← {}",
            config.bucket,
            config.site_dir.display()
        ))
        .cyan()
        .bold()
    );

    if cli.dry_run {
        return dry_run(&config);
    }

    let start = Instant::now();
    let s3_client = S3Client::new(config.clone()).await;
    let options = DeployOptions {
        strict_permissions: cli.strict_permissions,
    };

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let result = deploy(&s3_client, &config.site_dir, &options, Some(&pb)).await;
    pb.finish_and_clear();

    match result {
        Ok(summary) => {
            print_summary(&summary, start);
            Ok(())
        }
        Err(e) => {
            if let DeployError::Upload { completed, .. } = &e {
                print_uploaded(completed);
            }
            eprintln!("{} {}", style("✗").red(), style(e.user_message()).red());
            std::process::exit(1);
        }
    }
}

fn dry_run(config: &Config) -> Result<()> {
    println!(
        "{}",
        style("🔍 DRY RUN MODE - No files will be uploaded")
            .yellow()
            .bold()
    );
    println!();

    let plan = plan_uploads(&config.site_dir)?;
    if plan.is_empty() {
        println!(
            "{}",
            style(format!("No entries found in {}", config.site_dir.display())).yellow()
        );
    }
    for item in &plan {
        println!(
            "  {} {} → s3://{}/{} ({})",
            style("WOULD UPLOAD").green().bold(),
            item.path.display(),
            config.bucket,
            item.key,
            style(item.content_type).dim()
        );
    }

    Ok(())
}

fn print_summary(summary: &DeploySummary, start: Instant) {
    if let ProbeOutcome::Denied { .. } = summary.probe {
        println!(
            "{} {}",
            style("⚠").yellow(),
            style("Permission check was denied; uploads ran anyway").yellow()
        );
    }

    print_uploaded(&summary.uploaded);

    println!("\n{}", style("═".repeat(70)).dim());
    println!(
        "{}",
        style(format!(
            "Summary: {} uploaded, {} total in {:.2}s",
            summary.uploaded.len(),
            format_size(summary.total_bytes()),
            start.elapsed().as_secs_f64()
        ))
        .bold()
    );
}

fn print_uploaded(objects: &[UploadedObject]) {
    for object in objects {
        println!(
            "{} {} ({}, {})",
            style("✓").green(),
            style(&object.key).green(),
            style(object.content_type).dim(),
            style(format_size(object.bytes)).dim()
        );
    }
}

/// Format file size for display
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.00 MB");
    }

    #[test]
    fn test_cli_defaults_and_flags() {
        let cli = Cli::parse_from(["sitedeploy"]);
        assert!(cli.bucket.is_none());
        assert!(cli.dir.is_none());
        assert!(!cli.dry_run);
        assert!(!cli.strict_permissions);

        let cli = Cli::parse_from([
            "sitedeploy",
            "--bucket",
            "my-site",
            "-d",
            "public",
            "--strict-permissions",
        ]);
        assert_eq!(cli.bucket.as_deref(), Some("my-site"));
        assert_eq!(cli.dir, Some(PathBuf::from("public")));
        assert!(cli.strict_permissions);
    }
}
