//! steve CLI
//!
//! Verify local video metadata and sync it with a richard instance.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::Value;
use steve::{
    create_video, get_all_categories, get_video, get_video_id, is_falsy, load_records,
    save_record, strip_server_fields, update_video, verify_records, ApiError, FieldError,
    ProjectConfig, Requirements, VideoRecord,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "steve")]
#[command(about = "Aggregate, verify and push video metadata for a richard instance")]
#[command(version)]
struct Cli {
    /// Log requests and other progress to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify the project's JSON files against the video requirements
    Verify {
        /// Requirements file (default: built-in richard video requirements)
        #[arg(long)]
        requirements: Option<PathBuf>,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,
    },

    /// Push the project's JSON files to the richard instance
    Push {
        /// API key (default: api_key from steve.toml)
        #[arg(long)]
        api_key: Option<String>,

        /// Requirements file (default: built-in richard video requirements)
        #[arg(long)]
        requirements: Option<PathBuf>,
    },

    /// Pull a video from the richard instance into the project
    Pull {
        /// Video id or video URL
        video: String,

        /// API key (default: api_key from steve.toml)
        #[arg(long)]
        api_key: Option<String>,
    },

    /// List category titles on the richard instance
    Categories,

    /// Show which videos still have whiteboard notes
    Status {
        /// Only list the files that are in progress
        #[arg(long)]
        list: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Verify { requirements, json } => run_verify(requirements.as_deref(), json),
        Commands::Push {
            api_key,
            requirements,
        } => run_push(api_key, requirements.as_deref()),
        Commands::Pull { video, api_key } => run_pull(&video, api_key),
        Commands::Categories => run_categories(),
        Commands::Status { list } => run_status(list),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "steve=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Print an error to stderr and turn its exit code into a process exit code.
fn fail(context: &str, message: impl std::fmt::Display, code: i32) -> u8 {
    if context.is_empty() {
        eprintln!("Error: {}", message);
    } else {
        eprintln!("Error {}: {}", context, message);
    }
    u8::try_from(code).unwrap_or(1)
}

fn load_config() -> Result<ProjectConfig, u8> {
    let cwd = std::env::current_dir().map_err(|e| fail("reading current directory", e, 3))?;
    ProjectConfig::load(&cwd).map_err(|e| fail("", &e, e.exit_code()))
}

fn load_requirements(path: Option<&Path>) -> Result<Requirements, u8> {
    let loaded = match path {
        Some(path) => Requirements::from_file(path),
        None => Requirements::bundled(),
    };
    loaded.map_err(|e| fail("loading requirements", &e, e.exit_code()))
}

fn api_key(flag: Option<String>, config: &ProjectConfig) -> Result<String, u8> {
    match flag {
        Some(key) => Ok(key),
        None => config
            .require_api_key()
            .map(str::to_string)
            .map_err(|e| fail("", &e, e.exit_code())),
    }
}

fn print_errors(filename: &str, errors: &[FieldError]) {
    eprintln!("{}:", filename);
    for error in errors {
        eprintln!("  {}", error);
    }
}

fn run_verify(requirements: Option<&Path>, json_output: bool) -> Result<(), u8> {
    let config = load_config()?;
    let requirements = load_requirements(requirements)?;
    let records = load_records(&config.json_path).map_err(|e| fail("", &e, e.exit_code()))?;

    let results = verify_records(&records, config.category.as_deref(), &requirements);
    let failed = results.iter().filter(|(_, errors)| !errors.is_empty()).count();

    if json_output {
        let files: serde_json::Map<String, Value> = results
            .iter()
            .map(|(name, errors)| (name.clone(), serde_json::json!(errors)))
            .collect();
        let output = serde_json::json!({
            "valid": failed == 0,
            "files": files,
        });
        println!("{}", output);
    } else {
        for (name, errors) in results.iter().filter(|(_, errors)| !errors.is_empty()) {
            print_errors(name, errors);
        }
        println!(
            "{} files checked: {} passed, {} failed",
            results.len(),
            results.len() - failed,
            failed
        );
    }

    if failed == 0 {
        Ok(())
    } else {
        Err(1)
    }
}

fn run_push(api_key_flag: Option<String>, requirements: Option<&Path>) -> Result<(), u8> {
    let config = load_config()?;
    let api_url = config
        .require_api_url()
        .map_err(|e| fail("", &e, e.exit_code()))?;
    let api_key = api_key(api_key_flag, &config)?;
    let requirements = load_requirements(requirements)?;
    let mut records =
        load_records(&config.json_path).map_err(|e| fail("", &e, e.exit_code()))?;
    // Pulled and previously pushed files carry fields the server won't take back
    for (_, record) in &mut records {
        strip_server_fields(record);
    }

    // Nothing goes out unless every file is valid
    let results = verify_records(&records, config.category.as_deref(), &requirements);
    let mut invalid = false;
    for (name, errors) in results.iter().filter(|(_, errors)| !errors.is_empty()) {
        print_errors(name, errors);
        invalid = true;
    }
    if invalid {
        eprintln!("Error: fix the errors above before pushing.");
        return Err(1);
    }

    println!("Pushing to: {}", api_url);
    for (filename, mut record) in records {
        if let Some(category) = &config.category {
            record
                .entry("category")
                .or_insert_with(|| Value::String(category.clone()));
        }

        let pushed = match record.get("id").and_then(Value::as_u64) {
            Some(id) => update_video(api_url, &api_key, id, record, &requirements),
            None => create_video(api_url, &api_key, &record, &requirements),
        };

        let mut saved = match pushed {
            Ok(saved) => saved,
            Err(ApiError::MissingRequiredData { errors }) => {
                print_errors(&filename, &errors);
                return Err(1);
            }
            Err(e) => return Err(fail(&format!("pushing {}", filename), &e, e.exit_code())),
        };

        strip_server_fields(&mut saved);
        save_record(&config.json_path, &filename, &saved)
            .map_err(|e| fail("", &e, e.exit_code()))?;
        let id = saved.get("id").cloned().unwrap_or(Value::Null);
        println!("  {}: pushed (id {})", filename, id);
    }

    Ok(())
}

fn run_pull(video: &str, api_key_flag: Option<String>) -> Result<(), u8> {
    let config = load_config()?;
    let api_url = config
        .require_api_url()
        .map_err(|e| fail("", &e, e.exit_code()))?;
    let api_key = api_key_flag.or_else(|| config.api_key.clone());

    let video_id = match video.parse::<u64>() {
        Ok(id) => id,
        Err(_) => get_video_id(video).map_err(|e| fail("", &e, e.exit_code()))?,
    };

    let mut data = get_video(api_url, api_key.as_deref(), video_id)
        .map_err(|e| fail(&format!("pulling video {}", video_id), &e, e.exit_code()))?;

    let records = load_records(&config.json_path).map_err(|e| fail("", &e, e.exit_code()))?;
    let filename =
        existing_file_for(&records, video_id).unwrap_or_else(|| format!("{}.json", video_id));

    strip_server_fields(&mut data);
    save_record(&config.json_path, &filename, &data).map_err(|e| fail("", &e, e.exit_code()))?;
    println!("Saved video {} to {}", video_id, filename);
    Ok(())
}

/// The local file already holding the video with this id, if any.
fn existing_file_for(records: &[(String, VideoRecord)], video_id: u64) -> Option<String> {
    records
        .iter()
        .find(|(_, record)| record.get("id").and_then(Value::as_u64) == Some(video_id))
        .map(|(name, _)| name.clone())
}

fn run_categories() -> Result<(), u8> {
    let config = load_config()?;
    let api_url = config
        .require_api_url()
        .map_err(|e| fail("", &e, e.exit_code()))?;

    let categories = get_all_categories(api_url).map_err(|e| fail("", &e, e.exit_code()))?;
    for category in categories {
        println!("{}", category.title);
    }
    Ok(())
}

fn run_status(list: bool) -> Result<(), u8> {
    let config = load_config()?;
    let records = load_records(&config.json_path).map_err(|e| fail("", &e, e.exit_code()))?;

    if records.is_empty() {
        if !list {
            println!("No files");
        }
        return Ok(());
    }

    let (in_progress, done): (Vec<_>, Vec<_>) = records
        .iter()
        .partition(|(_, record)| record.get("whiteboard").is_some_and(|w| !is_falsy(w)));

    if list {
        for (filename, _) in &in_progress {
            println!("{}", filename);
        }
        return Ok(());
    }

    for (filename, record) in &in_progress {
        match record.get("whiteboard") {
            Some(Value::String(note)) => println!("{}: {}", filename, note),
            Some(other) => println!("{}: {}", filename, other),
            None => println!("{}", filename),
        }
    }
    if !done.is_empty() {
        println!();
        for (filename, _) in &done {
            println!("{}: Done!", filename);
        }
    }

    println!();
    println!("In progress: {:>3}", in_progress.len());
    println!("Done:        {:>3}", done.len());
    Ok(())
}
