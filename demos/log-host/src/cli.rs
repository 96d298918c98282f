use plugin_logger::{Level, LogFormat, DEFAULT_SERVICE};

#[derive(clap::Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(arg_required_else_help = true)]
pub struct Args {
    /// Path of the socket plugins connect to
    #[clap(long, value_name = "PATH_TO_SOCKET")]
    pub socket: std::path::PathBuf,

    /// Threshold for plugin messages (all, trace, debug, info, warn, error, fatal, off)
    #[clap(long, env = "PLUGIN_LOG_LEVEL", default_value = "warn")]
    pub level: Level,

    /// Line format for plugin messages (can also be set via PLUGIN_LOG_FORMAT env var)
    #[clap(long, env = "PLUGIN_LOG_FORMAT", default_value = "standard")]
    pub format: LogFormat,

    /// Append plugin messages to this file instead of stderr
    #[clap(short, long, env = "PLUGIN_LOG_FILE")]
    pub log_file: Option<std::path::PathBuf>,

    /// Service name plugins address
    #[clap(long, default_value = DEFAULT_SERVICE)]
    pub service: String,

    /// Route plugin messages through the host's own `log` backend
    #[clap(long, conflicts_with_all = ["log_file", "format"])]
    pub facade: bool,
}

impl Args {
    pub fn socket(&self) -> &std::path::Path {
        &self.socket
    }
}
