use mail_csv_import_core::adapters::config::{app_config::AppConfig, logging_config::LoggingConfig};
use mail_csv_import_core::ports::command_handler::CommandHandler;
use mail_csv_import_core::prettyprint::prettyprint::PrettyFormatter;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace as sdktrace;
use opentelemetry_sdk::Resource;
use std::env;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_indicatif::IndicatifLayer;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Registry};

mod application_service_factory;
mod cli_adapter;

use application_service_factory::ApplicationServiceFactory;
use cli_adapter::{parse_args, CliAdapter, USAGE};

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    let invocation = match parse_args(&args) {
        Ok(invocation) => invocation,
        Err(e) => {
            eprintln!("{}\n\n{}", e, USAGE);
            return ExitCode::from(2);
        }
    };

    let config = match AppConfig::load_from(invocation.config_path.as_deref()) {
        Ok(config) => config,
        Err(report) => {
            eprintln!("{:?}", report);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = setup_tracing(&config.logging) {
        eprintln!("Failed to set up logging: {}", e);
        return ExitCode::FAILURE;
    }
    setup_panic_hook();

    info!("Starting mail-csv-import");

    let bundle = match ApplicationServiceFactory::create(&config, invocation.dry_run).await {
        Ok(bundle) => bundle,
        Err(report) => {
            error!("Failed to initialize services: {:?}", report);
            opentelemetry::global::shutdown_tracer_provider();
            return ExitCode::FAILURE;
        }
    };

    let mut cli_adapter = CliAdapter::new(bundle.service);
    if let Some(sheets) = bundle.dry_run_sheets {
        info!("🧪 Dry run: nothing will be written to the spreadsheet");
        cli_adapter = cli_adapter.with_dry_run_sheets(sheets, bundle.sheet_names);
    }
    if let Some(sender) = bundle.dry_run_mail {
        info!("🧪 Dry run: exports are downloaded but not mailed");
        cli_adapter = cli_adapter.with_dry_run_mail(sender);
    }

    let exit_code = match cli_adapter.handle(invocation.command).await {
        Ok(report) => {
            println!("{}", report.output);
            if report.success {
                info!("CLI execution completed successfully");
                ExitCode::SUCCESS
            } else {
                error!("One or more routines failed");
                ExitCode::FAILURE
            }
        }
        Err(report) => {
            error!("CLI execution failed: {:?}", report);
            ExitCode::FAILURE
        }
    };

    opentelemetry::global::shutdown_tracer_provider();
    exit_code
}

fn setup_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let indicatif_layer = IndicatifLayer::new();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .event_format(PrettyFormatter::new(true))
        .with_writer(indicatif_layer.get_stderr_writer());

    let log_file_layer = match &logging.file {
        Some(path) => Some(
            tracing_subscriber::fmt::layer()
                .event_format(PrettyFormatter::new(false))
                .with_writer(std::fs::File::create(path)?)
                .with_ansi(false),
        ),
        None => None,
    };

    let otel_layer = match &logging.otlp_endpoint {
        Some(endpoint) => {
            let exporter = opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(endpoint.as_str());

            let tracer = opentelemetry_otlp::new_pipeline()
                .tracing()
                .with_exporter(exporter)
                .with_trace_config(sdktrace::config().with_resource(Resource::new(vec![
                    KeyValue::new("service.name", "mail_csv_import_cli"),
                ])))
                .install_batch(opentelemetry_sdk::runtime::Tokio)?;

            Some(OpenTelemetryLayer::new(tracer))
        }
        None => None,
    };

    Registry::default()
        .with(
            tracing_subscriber::filter::Targets::new()
                .with_target("mail_csv_import", tracing::Level::TRACE)
                .with_target("mail_csv_import_core", tracing::Level::TRACE),
        )
        .with(otel_layer)
        .with(indicatif_layer)
        .with(log_file_layer)
        .with(stderr_layer)
        .init();

    Ok(())
}

fn setup_panic_hook() {
    tracing::trace!("Setting panic hook");
    std::panic::set_hook(Box::new(|info| {
        tracing::error!("panic: {info}");
        opentelemetry::global::shutdown_tracer_provider();
    }));
}
