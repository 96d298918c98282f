mod cli;

use clap::Parser;
use plugin_logger::prelude::*;
use plugin_logger::ThriftTransport;

fn main() {
    let args = cli::Args::parse();

    let transport = ThriftTransport::connect(&args.socket, args.timeout())
        .unwrap_or_else(|e| {
            eprintln!("Failed to connect to host logger: {e}");
            std::process::exit(1);
        })
        .with_service(args.service.clone());

    let logger = LoggerClient::with_transport(transport)
        .install()
        .unwrap_or_else(|e| {
            eprintln!("Failed to install logger: {e}");
            std::process::exit(1);
        });

    if let Some(level) = args.level {
        if let Err(e) = logger.set_level(level) {
            eprintln!("Host rejected level change: {e}");
        }
    }

    log::info!("plugin {} started", std::process::id());
    log::warn!("disk usage at {}%", 91);

    let context = Context::new()
        .with("mount", "secret/")
        .with("kind", "kv");
    logger.info("mounted backend", Some(&context));

    if logger.is_debug() {
        logger.debug("walking mount table", Some(&context));
    }

    if let Err(e) = logger.log(Level::Error, "seal check failed", None) {
        eprintln!("Host did not record error: {e}");
    }

    if args.fatal {
        logger.fatal("cannot continue without storage", Some(&context));
    }
}
