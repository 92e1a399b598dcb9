use std::path::PathBuf;
use clap::{Args, Parser, Subcommand};
use gpcli::core::DEFAULT_WORKERS;

#[derive(Parser, Debug)]
#[command(name = "gpcli", version, about = "Google Photos unofficial CLI client")]
pub struct Cli {
    /// Path to config file (default: ./gpcli.config)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Set log level: debug, info, warn, error
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,

    /// Suppress all log output except errors (overrides --log-level)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Authentication string (overrides config file)
    #[arg(long, global = true)]
    pub auth: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Upload a file or directory
    Upload(UploadArgs),

    /// Manage authentication
    Auth(AuthArgs),

    /// Download a media item
    Download(DownloadArgs),

    /// Download a thumbnail of a media item
    Thumbnail(ThumbnailArgs),

    /// Move an item to trash, or restore it
    Delete(DeleteArgs),

    /// Archive or unarchive an item
    Archive(ArchiveArgs),

    /// Add or remove an item from favourites
    #[command(alias = "favorite")]
    Favourite(FavouriteArgs),

    /// Set the caption of an item
    Caption(CaptionArgs),
}

#[derive(Args, Debug)]
pub struct UploadArgs {
    pub path: PathBuf,

    /// Include subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Number of upload workers
    #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
    pub threads: usize,

    /// Force upload even if the file exists
    #[arg(short, long)]
    pub force: bool,

    /// Delete from host after upload
    #[arg(short, long)]
    pub delete: bool,

    /// Disable file type filtering
    #[arg(long, alias = "df")]
    pub disable_filter: bool,
}

#[derive(Args, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: Option<AuthCommand>,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommand {
    /// Add a new authentication
    Add { auth_string: String },

    /// Remove an authentication by number or email
    #[command(alias = "rm")]
    Remove { identifier: String },

    /// List all authentications
    #[command(alias = "ls")]
    List,

    /// Set active authentication (supports partial matching)
    #[command(alias = "select")]
    Set { identifier: String },

    /// Print the config file path
    File,
}

#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Media key, dedup key or URL
    pub input: String,

    /// Only print the download URL
    #[arg(long)]
    pub url: bool,

    /// Output file or directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ThumbnailArgs {
    /// Media key, dedup key or URL
    pub input: String,

    /// Output file or directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[arg(long)]
    pub width: Option<u32>,

    #[arg(long)]
    pub height: Option<u32>,

    /// Force JPEG output
    #[arg(long)]
    pub jpeg: bool,

    /// Keep the video play-button overlay
    #[arg(long)]
    pub overlay: bool,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    pub input: String,

    /// Restore from trash instead
    #[arg(long)]
    pub restore: bool,
}

#[derive(Args, Debug)]
pub struct ArchiveArgs {
    pub input: String,

    #[arg(long)]
    pub unarchive: bool,
}

#[derive(Args, Debug)]
pub struct FavouriteArgs {
    pub input: String,

    /// Remove from favourites instead
    #[arg(long)]
    pub remove: bool,
}

#[derive(Args, Debug)]
pub struct CaptionArgs {
    pub input: String,
    pub caption: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_flags() {
        let cli = Cli::try_parse_from(["gpcli", "-q", "upload", "-r", "-t", "5", "-fd", "--df", "photos"]).unwrap();
        assert!(cli.quiet);
        match cli.command {
            Command::Upload(args) => {
                assert_eq!(args.path, PathBuf::from("photos"));
                assert!(args.recursive && args.force && args.delete && args.disable_filter);
                assert_eq!(args.threads, 5);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_upload_defaults() {
        let cli = Cli::try_parse_from(["gpcli", "upload", "a.jpg"]).unwrap();
        assert_eq!(cli.log_level, "info");
        match cli.command {
            Command::Upload(args) => assert_eq!(args.threads, DEFAULT_WORKERS),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_auth_aliases() {
        let cli = Cli::try_parse_from(["gpcli", "auth", "rm", "2"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Auth(AuthArgs { command: Some(AuthCommand::Remove { ref identifier }) }) if identifier == "2"
        ));

        let cli = Cli::try_parse_from(["gpcli", "--config", "x.toml", "auth"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        assert!(matches!(cli.command, Command::Auth(AuthArgs { command: None })));
    }

    #[test]
    fn test_output_is_optional() {
        let cli = Cli::try_parse_from(["gpcli", "download", "AF1Qxyz"]).unwrap();
        match cli.command {
            Command::Download(args) => {
                assert_eq!(args.input, "AF1Qxyz");
                assert_eq!(args.output, None);
                assert!(!args.url);
            }
            other => panic!("unexpected command {other:?}"),
        }

        let cli = Cli::try_parse_from(["gpcli", "thumbnail", "AF1Qxyz"]).unwrap();
        match cli.command {
            Command::Thumbnail(args) => assert_eq!(args.output, None),
            other => panic!("unexpected command {other:?}"),
        }

        let cli = Cli::try_parse_from(["gpcli", "download", "AF1Qxyz", "-o", "out"]).unwrap();
        match cli.command {
            Command::Download(args) => assert_eq!(args.output, Some(PathBuf::from("out"))),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
