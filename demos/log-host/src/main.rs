mod cli;

use clap::Parser;
use log::info;
use plugin_logger::prelude::*;
use std::fs::OpenOptions;
use std::sync::Arc;

fn host_logger(args: &cli::Args) -> Result<Arc<dyn Logger>, std::io::Error> {
    if args.facade {
        return Ok(Arc::new(FacadeLogger::new(
            format!("plugin::{}", args.service),
            args.level,
        )));
    }
    let logger: Arc<dyn Logger> = match args.log_file {
        Some(ref path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Arc::new(
                WriterLogger::new(file, args.level)
                    .with_name(args.service.clone())
                    .with_format(args.format),
            )
        }
        None => Arc::new(
            WriterLogger::new(std::io::stderr(), args.level)
                .with_name(args.service.clone())
                .with_format(args.format),
        ),
    };
    Ok(logger)
}

fn main() {
    env_logger::init();
    let args = cli::Args::parse();

    let logger = host_logger(&args).unwrap_or_else(|e| {
        eprintln!("Failed to open plugin log sink: {e}");
        std::process::exit(1);
    });

    let mut handler = Handler::new();
    handler.register_name(args.service.clone(), LoggerServer::from_arc(logger));

    info!("Serving {} on {}", args.service, args.socket().display());
    let mut server = Server::new(args.socket(), handler);
    match server.run_with_signal_handling() {
        Ok(()) => info!("Server stopped normally"),
        Err(e) => {
            eprintln!("Server error: {e}");
            std::process::exit(1);
        }
    }
}
