use clap::{Parser, Subcommand};

/// upyun - command-line client for UpYun storage
#[derive(Parser, Debug)]
#[command(name = "upyun")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path (YAML); environment variables are used otherwise
    #[arg(long, global = true, env = "UPYUN_CONFIG")]
    pub config: Option<String>,

    /// Profile to use from config
    #[arg(long, global = true, env = "UPYUN_PROFILE")]
    pub profile: Option<String>,

    /// Endpoint override: v0 (auto), v1 (telecom), v2 (unicom), v3 (mobile) or a URL
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Disable SSL certificate verification
    #[arg(long, global = true)]
    pub insecure: bool,

    /// Output format (text, json)
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload a local file
    Put {
        /// Local file path
        #[arg(value_name = "LOCAL")]
        local: String,

        /// Remote path inside the bucket (e.g. /images/a.jpg)
        #[arg(value_name = "REMOTE")]
        remote: String,
    },

    /// Download a file (to stdout when no local path is given)
    Get {
        /// Remote path inside the bucket
        #[arg(value_name = "REMOTE")]
        remote: String,

        /// Local destination file
        #[arg(value_name = "LOCAL")]
        local: Option<String>,
    },

    /// Show file or folder info
    Stat {
        /// Remote path inside the bucket
        #[arg(value_name = "REMOTE")]
        remote: String,
    },

    /// Delete a file
    Rm {
        /// Remote path inside the bucket
        #[arg(value_name = "REMOTE")]
        remote: String,
    },

    /// Create a folder (parents included)
    Mkdir {
        /// Remote folder path, e.g. /a/b/
        #[arg(value_name = "REMOTE")]
        remote: String,
    },

    /// Delete an empty folder
    Rmdir {
        /// Remote folder path, e.g. /a/b/
        #[arg(value_name = "REMOTE")]
        remote: String,
    },

    /// List a folder
    Ls {
        /// Remote folder path
        #[arg(value_name = "REMOTE", default_value = "/")]
        remote: String,
    },

    /// Show bucket usage
    Usage,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Make sure a remote path starts with `/`
pub fn normalize_remote(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

/// Folder operations want a trailing `/`
pub fn normalize_folder(path: &str) -> String {
    let mut path = normalize_remote(path);
    if !path.ends_with('/') {
        path.push('/');
    }
    path
}
