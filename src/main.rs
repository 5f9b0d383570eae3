use clap::Parser;
use vsx_meta::domain::model::Target;
use vsx_meta::utils::{logger, validation::Validate};
use vsx_meta::{
    open_file_sink, read_targets_from_path, BatchEngine, CliConfig, MatchClient, MetaError,
    TomlConfig, VizierClient,
};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting vsx-meta");

    if let Err(e) = run(&cli).await {
        tracing::error!("❌ Cross-match failed: {} (Category: {:?})", e, e.category());
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: &CliConfig) -> Result<(), MetaError> {
    let config = cli.resolve()?;
    config.validate()?;
    tracing::debug!("Resolved config: {:?}", config);

    let targets = read_targets_from_path(&config.input.path)?;
    tracing::info!("📁 Read {} targets from {}", targets.len(), config.input.path);

    if cli.dry_run {
        print_plan(&config, &targets);
        return Ok(());
    }

    let service = VizierClient::new(&config.catalog)?;
    let client = MatchClient::new(service, config.catalog.clone(), config.columns.clone());
    let engine = BatchEngine::new(client, config.batch.clone());

    let mut sink = open_file_sink(
        &config.output.csv_path,
        &config.output.text_path,
        config.output.append,
    )?
    .with_id_label(config.output.id_label.clone());

    let summary = engine.run(&targets, &mut sink).await?;

    println!(
        "✅ Done: {} written ({} matched, {} unmatched, {} malformed)",
        summary.processed, summary.matched, summary.unmatched, summary.malformed
    );
    println!("📁 {}", config.output.csv_path);
    println!("📁 {}", config.output.text_path);
    for failure in &summary.failures {
        println!("⚠️  {} not written: {}", failure.target_id, failure.error);
    }

    Ok(())
}

fn print_plan(config: &TomlConfig, targets: &[Target]) {
    let start = config.batch.skip.min(targets.len());
    let count = config
        .batch
        .limit
        .map_or(targets.len() - start, |limit| limit.min(targets.len() - start));

    println!("📋 Dry run");
    println!("  Catalog: {} at {}", config.catalog.catalog_name, config.catalog.endpoint);
    println!("  Radius: {}\"", config.catalog.radius_arcsec);
    match config.catalog.row_limit {
        Some(limit) => println!("  Row limit: {}", limit),
        None => println!("  Row limit: unlimited"),
    }
    println!("  Targets: {} of {} (skip {})", count, targets.len(), start);
    println!(
        "  Outputs: {} / {} ({})",
        config.output.csv_path,
        config.output.text_path,
        if config.output.append { "append" } else { "truncate" }
    );
    println!("  On service fault: {:?}", config.batch.on_service_fault);
}
