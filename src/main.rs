mod cli;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use anyhow::{bail, Context};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use gpcli::api::{download_file, save_bytes, ApiConfig, HttpPhotosApi, DEFAULT_ENDPOINT};
use gpcli::config::DEFAULT_CONFIG_PATH;
use gpcli::core::{
    FileOutcome, GpError, PhotosApi, ThumbnailRequest, UploadEvent, UploadManager, UploadOptions,
};
use gpcli::credentials::{email_from_auth, CredentialStore};
use gpcli::utils::{format_bytes, format_duration};
use cli::{AuthCommand, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.quiet { "error" } else { log_filter(&cli.log_level) };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let mut store = CredentialStore::open(&config_path)
        .with_context(|| format!("error loading config {}", config_path.display()))?;

    match cli.command {
        Command::Auth(args) => run_auth(&mut store, cli.auth.as_deref(), args.command),
        Command::Upload(args) => {
            let api = connect(&store, cli.auth.as_deref())?;
            run_upload(api, args).await
        }
        Command::Download(args) => {
            let api = connect(&store, cli.auth.as_deref())?;
            run_download(&api, args).await
        }
        Command::Thumbnail(args) => {
            let api = connect(&store, cli.auth.as_deref())?;
            run_thumbnail(&api, args).await
        }
        Command::Delete(args) => {
            let api = connect(&store, cli.auth.as_deref())?;
            let item_key = api.resolve_item_key(&args.input).await?;
            if args.restore {
                api.restore_from_trash(&[item_key]).await?;
                tracing::info!("restored from trash");
            } else {
                api.move_to_trash(&[item_key]).await?;
                tracing::info!("moved to trash");
            }
            Ok(())
        }
        Command::Archive(args) => {
            let api = connect(&store, cli.auth.as_deref())?;
            let item_key = api.resolve_item_key(&args.input).await?;
            api.set_archived(&[item_key], !args.unarchive).await?;
            tracing::info!(archived = !args.unarchive, "archive state updated");
            Ok(())
        }
        Command::Favourite(args) => {
            let api = connect(&store, cli.auth.as_deref())?;
            let item_key = api.resolve_item_key(&args.input).await?;
            api.set_favourite(&item_key, !args.remove).await?;
            tracing::info!(favourite = !args.remove, "favourite state updated");
            Ok(())
        }
        Command::Caption(args) => {
            let api = connect(&store, cli.auth.as_deref())?;
            let item_key = api.resolve_item_key(&args.input).await?;
            api.set_caption(&item_key, &args.caption).await?;
            tracing::info!("caption updated");
            Ok(())
        }
    }
}

/// Dependency crates stay at info when debugging; unknown levels mean info
fn log_filter(level: &str) -> &'static str {
    match level.to_ascii_lowercase().as_str() {
        "debug" => "gpcli=debug,info",
        "warn" | "warning" => "warn",
        "error" => "error",
        _ => "info",
    }
}

/// No `-o` means the current directory
fn output_or_cwd(output: Option<&Path>) -> &Path {
    output.unwrap_or(Path::new(""))
}

/// `--auth` wins over the selected account
fn auth_data(store: &CredentialStore, override_auth: Option<&str>) -> Result<String, GpError> {
    if let Some(raw) = override_auth.map(str::trim).filter(|raw| !raw.is_empty()) {
        return Ok(raw.to_string());
    }
    store
        .selected()
        .map(|record| record.raw().to_string())
        .ok_or(GpError::NoCredentials)
}

fn connect(store: &CredentialStore, override_auth: Option<&str>) -> anyhow::Result<HttpPhotosApi> {
    let config = store.config();
    let api = HttpPhotosApi::new(ApiConfig {
        auth_data: auth_data(store, override_auth)?,
        proxy: config.proxy.clone(),
        endpoint: config.endpoint.clone().unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
    })?;
    Ok(api)
}

fn run_auth(
    store: &mut CredentialStore,
    override_auth: Option<&str>,
    command: Option<AuthCommand>,
) -> anyhow::Result<()> {
    match command {
        None => {
            if let Some(raw) = override_auth {
                let email = email_from_auth(raw).context("invalid --auth string")?;
                println!("Current authentication (from --auth): {email}");
                return Ok(());
            }
            match store.selected().and_then(|record| record.email()) {
                Some(email) => println!("Current authentication: {email}"),
                None => println!("No active authentication"),
            }
            print_accounts(store);
        }
        Some(AuthCommand::List) => print_accounts(store),
        Some(AuthCommand::Add { auth_string }) => {
            let email = store.add_credential(&auth_string)?;
            tracing::info!(%email, "authentication added");
        }
        Some(AuthCommand::Remove { identifier }) => {
            let email = resolve_account(store, &identifier)?;
            store.remove_credential(&email)?;
            tracing::info!(%email, "authentication removed");
        }
        Some(AuthCommand::Set { identifier }) => {
            let email = resolve_account(store, &identifier)?;
            store.set_selected(&email)?;
            tracing::info!(%email, "active account set");
        }
        Some(AuthCommand::File) => println!("{}", store.config_path().display()),
    }
    Ok(())
}

fn print_accounts(store: &CredentialStore) {
    if store.records().is_empty() {
        println!("No authentications configured. Use 'gpcli auth add <auth-string>' to add one.");
        return;
    }

    let selected = store.config().selected.as_str();
    println!("Accounts:");
    for (index, record) in store.records().iter().enumerate() {
        match record.email() {
            Some(email) => {
                let marker = if email == selected { " *" } else { "" };
                println!("  {}. {email}{marker}", index + 1);
            }
            None => println!("  {}. <invalid auth string>", index + 1),
        }
    }
}

fn resolve_account(store: &CredentialStore, identifier: &str) -> anyhow::Result<String> {
    match store.resolve_identifier(identifier) {
        Err(GpError::AmbiguousMatch { query, candidates }) => {
            eprintln!("Multiple accounts match '{query}':");
            for candidate in &candidates {
                eprintln!("  {candidate}");
            }
            bail!("be more specific, or use the account number from 'gpcli auth list'")
        }
        other => Ok(other?),
    }
}

fn log_event(event: UploadEvent) {
    match event {
        UploadEvent::BatchStart { total } => tracing::info!(total, "starting upload"),
        UploadEvent::WorkerStatus { worker_id, status, file_name } => {
            tracing::debug!(worker_id, %status, file = %file_name, "worker status");
        }
        UploadEvent::FileStatus { path, outcome, media_key } => match outcome {
            FileOutcome::Uploaded => {
                tracing::info!(path = %path.display(), media_key = media_key.as_deref().unwrap_or(""), "upload success");
            }
            FileOutcome::Existing => {
                tracing::info!(path = %path.display(), media_key = media_key.as_deref().unwrap_or(""), "already in library");
            }
            FileOutcome::Failed(reason) => {
                tracing::error!(path = %path.display(), error = %reason, "upload failed");
            }
        },
        UploadEvent::BatchStop { .. } => tracing::debug!("batch finished"),
    }
}

async fn run_upload(api: HttpPhotosApi, args: cli::UploadArgs) -> anyhow::Result<()> {
    if !tokio::fs::try_exists(&args.path).await? {
        bail!("path does not exist: {}", args.path.display());
    }

    let options = UploadOptions {
        recursive: args.recursive,
        workers: args.threads,
        force_upload: args.force,
        delete_source: args.delete,
        disable_filter: args.disable_filter,
    };

    let manager = UploadManager::new(Arc::new(api), Arc::new(log_event));
    let summary = manager.upload(&args.path, &options).await?;

    tracing::info!(
        total = summary.total,
        succeeded = summary.succeeded(),
        failed = summary.failed,
        uploaded = summary.uploaded,
        existing = summary.existing,
        bytes = %format_bytes(summary.bytes_uploaded),
        elapsed = %format_duration(summary.elapsed),
        "upload complete"
    );
    Ok(())
}

async fn run_download(api: &HttpPhotosApi, args: cli::DownloadArgs) -> anyhow::Result<()> {
    let media_key = api.resolve_media_key(&args.input).await?;
    let found = api.download_url(&media_key).await?;
    if found.url.is_empty() {
        bail!("no download URL available for {media_key}");
    }

    if args.url {
        println!("{}", found.url);
        return Ok(());
    }

    tracing::info!(%media_key, edited = found.is_edited, "downloading");
    let saved = download_file(api.http_client(), &found.url, output_or_cwd(args.output.as_deref())).await?;
    tracing::info!(path = %saved.display(), "download complete");
    Ok(())
}

async fn run_thumbnail(api: &HttpPhotosApi, args: cli::ThumbnailArgs) -> anyhow::Result<()> {
    let media_key = api.resolve_media_key(&args.input).await?;
    let request = ThumbnailRequest {
        width: args.width,
        height: args.height,
        force_jpeg: args.jpeg,
        no_overlay: !args.overlay,
    };

    let bytes = api.thumbnail(&media_key, &request).await?;
    let saved = save_bytes(&bytes, output_or_cwd(args.output.as_deref()), &format!("{media_key}.jpg")).await?;
    tracing::info!(path = %saved.display(), size = %format_bytes(bytes.len() as u64), "thumbnail saved");
    Ok(())
}
