use plugin_logger::DEFAULT_SERVICE;

#[derive(clap::Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(arg_required_else_help = true)]
pub struct Args {
    /// Path of the host's logger socket
    #[clap(long, value_name = "PATH_TO_SOCKET", env = "PLUGIN_LOGGER_SOCKET")]
    pub socket: std::path::PathBuf,

    /// Socket read/write timeout in seconds (0 waits forever)
    #[clap(long, default_value_t = 5)]
    pub timeout: u64,

    /// Service name registered by the host
    #[clap(long, default_value = DEFAULT_SERVICE)]
    pub service: String,

    /// Raise the host threshold before logging
    #[clap(long)]
    pub level: Option<plugin_logger::Level>,

    /// End with a fatal message, which terminates this process
    #[clap(long)]
    pub fatal: bool,
}

impl Args {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout)
    }
}
