//! drop-queue - Manage the drop schedule
//!
//! Unix-style tool for staging, inspecting, and publishing scheduled
//! short-video drops.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use libdropdeck::composer::{self, CaptionSpec, Industry};
use libdropdeck::publisher::endpoint::EndpointTarget;
use libdropdeck::publisher::instagram::{InstagramConfig, InstagramUpstream};
use libdropdeck::publisher::{Dispatcher, PublishTarget};
use libdropdeck::{
    schedule, Config, DropdeckError, JsonFileStore, LifecycleManager, Result, TaskDraft, TaskEdits,
    VideoTask,
};

#[derive(Parser, Debug)]
#[command(name = "drop-queue")]
#[command(version)]
#[command(about = "Manage the drop schedule")]
#[command(long_about = "\
drop-queue - Manage the drop schedule

DESCRIPTION:
    drop-queue is a Unix-style tool for managing scheduled short-video drops.
    Use it to stage new tasks, inspect the upcoming week, surface overdue
    work, and push a task through the publish pipeline.

COMMANDS:
    stage       Stage a new drop
    list        List all tasks
    upcoming    Show the next 7 days as day buckets
    overdue     Show tasks past their slot that never published
    toggle      Flip a task between ready and queued
    reset       Return a failed task to ready
    publish     Publish one task now (single attempt, no retry)
    edit        Edit fields on an existing task
    delete      Remove a task

USAGE EXAMPLES:
    # Stage a drop with an explicit caption
    drop-queue stage --title \"Launch teaser\" --date 2026-09-01 --time 09:30 \\
        --video-url https://cdn.example.com/teaser.mp4 \\
        --caption \"It's almost here\" --hashtag \"#launch\"

    # Compose the caption from structured parts instead
    drop-queue stage --title \"Launch teaser\" --date 2026-09-01 --time 09:30 \\
        --video-url https://cdn.example.com/teaser.mp4 \\
        --hook \"Stop scrolling.\" --topic \"Launch day\" --industry creator

    # Inspect the week, then publish
    drop-queue upcoming
    drop-queue publish <TASK_ID>

CONFIGURATION:
    Configuration file: ~/.config/dropdeck/config.toml
    Task store:         ~/.local/share/dropdeck/tasks.json

    Override with environment variables:
        DROPDECK_CONFIG          - Path to config file
        INSTAGRAM_ACCOUNT_ID     - Provider account (direct publish)
        INSTAGRAM_ACCESS_TOKEN   - Provider token (direct publish)
        INSTAGRAM_API_VERSION    - Provider API version (optional)

EXIT CODES:
    0 - Success
    1 - Operation failed
    3 - Invalid input (bad task ID, time format, etc.)
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Stage a new drop
    Stage {
        /// Task title
        #[arg(long)]
        title: String,

        /// Scheduled date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,

        /// Scheduled time (HH:MM, 24-hour)
        #[arg(long)]
        time: String,

        /// Public URL of the video file
        #[arg(long)]
        video_url: String,

        /// Caption text; omit to compose from --hook/--topic/--cta
        #[arg(long)]
        caption: Option<String>,

        /// Free-form notes
        #[arg(long, default_value = "")]
        notes: String,

        /// Hashtag, repeatable
        #[arg(long = "hashtag")]
        hashtags: Vec<String>,

        /// Seed the task as queued instead of ready
        #[arg(long)]
        autopost: bool,

        /// Caption hook line (composed captions only)
        #[arg(long, default_value = "")]
        hook: String,

        /// Caption topic (composed captions only)
        #[arg(long, default_value = "")]
        topic: String,

        /// Caption call to action (composed captions only)
        #[arg(long, default_value = "")]
        cta: String,

        /// Industry tagline: fitness, real-estate, ecommerce, coaching, creator
        #[arg(long)]
        industry: Option<String>,
    },

    /// List all tasks
    List {
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show the next 7 days as day buckets
    Upcoming,

    /// Show tasks past their slot that never published
    Overdue,

    /// Flip a task between ready and queued
    Toggle {
        /// Task ID
        task_id: String,
    },

    /// Return a failed task to ready
    Reset {
        /// Task ID
        task_id: String,
    },

    /// Publish one task now (single attempt, no retry)
    Publish {
        /// Task ID
        task_id: String,
    },

    /// Edit fields on an existing task
    Edit {
        /// Task ID
        task_id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long)]
        time: Option<String>,

        #[arg(long)]
        caption: Option<String>,

        #[arg(long)]
        notes: Option<String>,

        /// Replace the hashtag list, repeatable
        #[arg(long = "hashtag")]
        hashtags: Option<Vec<String>>,

        #[arg(long)]
        video_url: Option<String>,
    },

    /// Remove a task
    Delete {
        /// Task ID
        task_id: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("error")
            .with_writer(std::io::stderr)
            .init();
    }

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load_or_default()?;
    let store = JsonFileStore::new(config.expand_store_path());
    let lifecycle = Arc::new(LifecycleManager::new(Arc::new(store)));

    match cli.command {
        Commands::Stage {
            title,
            date,
            time,
            video_url,
            caption,
            notes,
            hashtags,
            autopost,
            hook,
            topic,
            cta,
            industry,
        } => {
            let industry = industry
                .as_deref()
                .map(|s| s.parse::<Industry>().map_err(DropdeckError::InvalidInput))
                .transpose()?;

            // An explicit caption wins; otherwise compose one from parts and
            // harvest its hashtags.
            let (caption, hashtags) = match caption {
                Some(caption) => (caption, hashtags),
                None => {
                    let composed = composer::compose(&CaptionSpec {
                        hook,
                        topic,
                        call_to_action: cta,
                        industry,
                    });
                    let mut tags = hashtags;
                    tags.extend(composer::extract_hashtags(&composed));
                    (composed, tags)
                }
            };

            let task = lifecycle
                .stage(TaskDraft {
                    date,
                    time,
                    title,
                    caption,
                    notes,
                    hashtags,
                    video_url,
                    autopost,
                })
                .await?;
            println!("{} {}", task.id, task.status);
        }
        Commands::List { format } => {
            cmd_list(&lifecycle, &format).await?;
        }
        Commands::Upcoming => {
            cmd_upcoming(&lifecycle).await;
        }
        Commands::Overdue => {
            cmd_overdue(&lifecycle).await;
        }
        Commands::Toggle { task_id } => {
            let task = lifecycle.toggle(&task_id).await?;
            println!("{} {}", task.id, task.status);
        }
        Commands::Reset { task_id } => {
            let task = lifecycle.reset_failed(&task_id).await?;
            println!("{} {}", task.id, task.status);
        }
        Commands::Publish { task_id } => {
            let target = publish_target(&config)?;
            let dispatcher = Dispatcher::new(lifecycle.clone(), target);
            let task = dispatcher.dispatch(&task_id).await?;
            match task.status {
                libdropdeck::TaskStatus::Published => {
                    println!("{} published ({})", task.id, task.notes);
                }
                _ => {
                    println!("{} failed: {}", task.id, task.notes);
                }
            }
        }
        Commands::Edit {
            task_id,
            title,
            date,
            time,
            caption,
            notes,
            hashtags,
            video_url,
        } => {
            let task = lifecycle
                .update(
                    &task_id,
                    TaskEdits {
                        date,
                        time,
                        title,
                        caption,
                        notes,
                        hashtags,
                        video_url,
                    },
                )
                .await?;
            println!("{} {}", task.id, task.status);
        }
        Commands::Delete { task_id } => {
            lifecycle.delete(&task_id).await?;
            println!("deleted {}", task_id);
        }
    }

    Ok(())
}

/// Pick the publish boundary: a configured publish route when one is set,
/// the provider API with env credentials otherwise.
fn publish_target(config: &Config) -> Result<Arc<dyn PublishTarget>> {
    match &config.publish.endpoint {
        Some(endpoint) => Ok(Arc::new(EndpointTarget::new(endpoint.clone()))),
        None => {
            let instagram = InstagramConfig::from_env()?;
            Ok(Arc::new(InstagramUpstream::new(instagram)))
        }
    }
}

/// List all tasks
async fn cmd_list(lifecycle: &LifecycleManager, format: &str) -> Result<()> {
    if format != "text" && format != "json" {
        return Err(DropdeckError::InvalidInput(format!(
            "Invalid format '{}'. Must be 'text' or 'json'",
            format
        )));
    }

    let tasks = lifecycle.tasks().await;
    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&tasks).map_err(|e| {
            DropdeckError::InvalidInput(format!("Failed to serialize tasks: {}", e))
        })?);
    } else {
        for task in &tasks {
            println!("{}", task_line(task));
        }
    }
    Ok(())
}

/// Show the 7-day window, one header per day, empty days included
async fn cmd_upcoming(lifecycle: &LifecycleManager) {
    let tasks = lifecycle.tasks().await;
    let today = Local::now().date_naive();

    for (day, bucket) in schedule::upcoming_window(&tasks, today) {
        println!("{}:", day);
        if bucket.is_empty() {
            println!("  (nothing scheduled)");
        }
        for task in &bucket {
            println!("  {}", task_line(task));
        }
    }
}

/// Show overdue tasks, oldest first
async fn cmd_overdue(lifecycle: &LifecycleManager) {
    let tasks = lifecycle.tasks().await;
    let now = Local::now().naive_local();

    for task in schedule::overdue(&tasks, now) {
        println!("{}", task_line(&task));
    }
}

fn task_line(task: &VideoTask) -> String {
    format!(
        "{} | {} {} | {:10} | {}",
        task.id,
        task.date,
        task.time,
        task.status.to_string(),
        truncate(&task.title, 50)
    )
}

/// Truncate to max length with ellipsis
fn truncate(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        text.to_string()
    } else {
        let prefix: String = text.chars().take(max_len).collect();
        format!("{}...", prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text_untouched() {
        assert_eq!(truncate("short", 50), "short");
    }

    #[test]
    fn test_truncate_long_text_gets_ellipsis() {
        let long = "x".repeat(60);
        let out = truncate(&long, 50);
        assert_eq!(out.len(), 53);
        assert!(out.ends_with("..."));
    }
}
