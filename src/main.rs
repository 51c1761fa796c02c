//! Command line front end: runs one intake over paths from the command line.

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::process::ExitCode;
    use std::rc::Rc;

    use clap::Parser;
    use lep_intake::platform::native::{NativeDir, PathSelection, payload_from_paths};
    use lep_intake::{Dropzone, ExtractedImage, IntakeConfig, IntakeOutcome, LogLevel};

    fn parse_log_level(value: &str) -> Result<LogLevel, String> {
        LogLevel::from_name(value).ok_or_else(|| {
            let names: Vec<&str> = LogLevel::all().iter().map(LogLevel::name).collect();
            format!("expected one of: {}", names.join(", "))
        })
    }

    /// Collect survey photos from files, ZIP archives and folders.
    #[derive(Debug, Parser)]
    #[command(name = "lep-intake", version, about)]
    struct Cli {
        /// Treat the paths as a file picker selection (folders are skipped)
        #[arg(long)]
        pick: bool,

        /// Configuration file (defaults to the per-user config, if present)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Override the configured log level
        #[arg(long, value_name = "LEVEL", value_parser = parse_log_level)]
        log_level: Option<LogLevel>,

        /// Files, archives and folders to take in
        #[arg(required = true, value_name = "PATHS")]
        paths: Vec<PathBuf>,
    }

    fn load_config(path: Option<&PathBuf>) -> Result<IntakeConfig, String> {
        match path {
            Some(path) => IntakeConfig::load_from_path(path)
                .map_err(|e| format!("loading config from {}: {}", path.display(), e)),
            None => Ok(IntakeConfig::load_from_default_path().unwrap_or_default()),
        }
    }

    pub fn run() -> ExitCode {
        let cli = Cli::parse();

        let mut config = match load_config(cli.config.as_ref()) {
            Ok(config) => config,
            Err(message) => {
                eprintln!("error: {}", message);
                return ExitCode::from(2);
            }
        };
        if let Some(level) = cli.log_level {
            config.log_level = level;
        }
        lep_intake::logging::init_logging(config.log_level);

        let received: Rc<RefCell<Vec<ExtractedImage>>> = Rc::default();
        let sink = received.clone();
        let dropzone = Dropzone::<NativeDir>::new(&config, move |images| {
            sink.borrow_mut().extend(images)
        });

        let outcome = if cli.pick {
            let selection = PathSelection::new(&cli.paths);
            pollster::block_on(dropzone.handle_selection(&selection))
        } else {
            let payload = payload_from_paths(&cli.paths, config.directory_batch_size);
            pollster::block_on(dropzone.handle_drop(payload))
        };

        for image in received.borrow().iter() {
            println!("{}\t{}\t{}", image.name, image.media_type, image.size());
        }

        match &outcome {
            IntakeOutcome::Delivered(summary) | IntakeOutcome::Empty(summary) => {
                for rejection in &summary.rejected {
                    log::info!("Skipped {}: {}", rejection.name, rejection.reason);
                }
                eprintln!(
                    "{} images, {} skipped, {} failed",
                    summary.images,
                    summary.rejected.len(),
                    summary.failures.len()
                );
            }
            IntakeOutcome::Busy => eprintln!("intake already running"),
        }

        if outcome.delivered() > 0 {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    cli::run()
}

// WASM doesn't use main(), it uses wasm_bindgen's start function
#[cfg(target_arch = "wasm32")]
fn main() {}
