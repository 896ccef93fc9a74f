use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use gloo2gateway::{Configuration, ConversionError};
use tracing::error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    Layer, Registry,
};

#[derive(Parser, Debug)]
#[command(version, about = "Converts Gloo VirtualServices and RouteTables into Gateway API HTTPRoutes", long_about = None)]
pub struct CommandArgs {
    /// Manifest file holding the legacy resources
    input: PathBuf,
    /// File the converted manifests are written to
    output: PathBuf,
    #[arg(long)]
    with_config_file: Option<PathBuf>,
}

fn init_tracing_logging(configuration: &Configuration) -> Option<WorkerGuard> {
    let console_filter = tracing_subscriber::EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_owned()));
    let console_layer = fmt::layer()
        .event_format(fmt::format().compact())
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::NONE)
        .with_ansi(false)
        .with_filter(filter::filter_fn(|meta| !meta.is_span()))
        .with_filter(console_filter);

    let registry = Registry::default().with(console_layer);

    if let Some(log_file) = configuration.log_file.as_ref() {
        let log_file = PathBuf::from(log_file);
        let directory = log_file.parent().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
        let file_name = log_file.file_name().map_or_else(|| "gloo2gateway.log".into(), std::ffi::OsStr::to_os_string);
        let file_appender = tracing_appender::rolling::never(directory, file_name);
        let (non_blocking_appender, guard) = tracing_appender::non_blocking(file_appender);
        let file_filter = tracing_subscriber::EnvFilter::new(std::env::var("RUST_FILE_LOG").unwrap_or_else(|_| "debug".to_owned()));
        let file_layer = fmt::layer()
            .with_writer(non_blocking_appender)
            .with_span_events(FmtSpan::NONE)
            .with_target(true)
            .with_ansi(false)
            .with_filter(filter::filter_fn(|meta| !meta.is_span()))
            .with_filter(file_filter);
        registry.with(file_layer).init();
        Some(guard)
    } else {
        registry.init();
        None
    }
}

fn load_configuration(args: &CommandArgs) -> gloo2gateway::Result<Configuration> {
    let configuration = match args.with_config_file.as_ref() {
        Some(path) => Configuration::from_yaml(&std::fs::read_to_string(path)?)?,
        None => Configuration::default(),
    };
    configuration.validate()?;
    Ok(configuration)
}

fn main() -> ExitCode {
    let args = CommandArgs::parse();
    let configuration = match load_configuration(&args) {
        Ok(configuration) => configuration,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        },
    };
    let _guard = init_tracing_logging(&configuration);

    match gloo2gateway::convert_file(&args.input, &args.output, &configuration) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<ConversionError>().and_then(ConversionError::resource_key) {
                Some(key) => error!(kind = %key.kind, namespace = %key.namespace, name = %key.name, "Conversion failed: {e}"),
                None => error!("Conversion failed: {e}"),
            }
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}
