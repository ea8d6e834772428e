use clap::Parser;
use pdf_form_etl::adapters::csv_loader;
use pdf_form_etl::adapters::pdf_form::FormDocument;
use pdf_form_etl::core::output;
use pdf_form_etl::domain::model::FieldKind;
use pdf_form_etl::domain::normalize::{checkbox_state, normalize_field, MONTH_FIELD, YEAR_FIELD};
use pdf_form_etl::domain::ports::ConfigProvider;
use pdf_form_etl::utils::error::ErrorSeverity;
use pdf_form_etl::utils::{logger, validation::Validate};
use pdf_form_etl::{
    CliConfig, ErrorPolicy, EtlEngine, FormConfig, FormError, FormPipeline, FormTemplate,
    LocalStorage, RowOutcome,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting pdf-form-etl");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match cli.resolve().and_then(|config| config.validate().map(|_| config)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No files will be written");
        if let Err(e) = perform_dry_run(&config) {
            exit_with(&e);
        }
        return Ok(());
    }

    let storage = LocalStorage::new(config.output_dir());
    let policy = ErrorPolicy::from_flag(config.continue_on_error());
    let report_path = config.report_path.clone();

    let pipeline = match FormPipeline::from_config(storage, config) {
        Ok(pipeline) => pipeline,
        Err(e) => exit_with(&e),
    };
    let engine = EtlEngine::with_policy(pipeline, policy);

    match engine.run().await {
        Ok(summary) => {
            if let Some(report_path) = report_path {
                output::write_report(&summary, &report_path)?;
                tracing::info!("📝 Report written to {}", report_path);
            }

            println!(
                "🎉 Completed: {} forms generated in {}/",
                summary.written(),
                summary.output_dir.display()
            );
            for path in summary.written_paths() {
                println!("   → {}", path.display());
            }
            if summary.failed() > 0 {
                eprintln!("❌ {} rows failed", summary.failed());
                for outcome in &summary.outcomes {
                    if let RowOutcome::Failed { row, error } = outcome {
                        eprintln!("   row {}: {}", row, error);
                    }
                }
                std::process::exit(2);
            }
        }
        Err(e) => exit_with(&e),
    }

    Ok(())
}

fn exit_with(e: &FormError) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ Form generation failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

fn perform_dry_run(config: &FormConfig) -> pdf_form_etl::Result<()> {
    let template = FormTemplate::open(config.template_path())?;
    let document = FormDocument::load(template.bytes())?;
    let rows = csv_loader::load_rows(config.csv_path())?;

    println!("🔍 Dry Run Analysis:");
    println!("  Template: {} ({} fields)", template.path(), template.field_count());
    println!("  CSV: {} ({} rows)", config.csv_path(), rows.len());
    println!("  Output: {}", config.output_dir());
    println!(
        "  On row error: {}",
        if config.continue_on_error() { "continue" } else { "stop" }
    );
    println!();

    println!("  Template fields:");
    for name in document.field_names() {
        if let Some(field) = document.field(name) {
            println!(
                "    {} ({:?}, {} widgets)",
                name,
                field.kind,
                field.widget_count()
            );
        }
    }
    println!();

    for (i, row) in rows.iter().enumerate() {
        let index = i + 1;
        let month = row.get(MONTH_FIELD).map(|raw| normalize_field(MONTH_FIELD, raw));
        let year = row.get(YEAR_FIELD).map(|raw| normalize_field(YEAR_FIELD, raw));
        println!(
            "  Row {}: {} fields -> {}",
            index,
            row.len(),
            output::output_filename(index, month.as_deref(), year.as_deref())
        );

        for (name, raw) in row.iter() {
            match document.field(name).map(|field| field.kind) {
                Some(FieldKind::Checkbox) => {
                    println!("    {}: {}", name, checkbox_state(raw).as_str());
                }
                Some(FieldKind::Text) => {}
                None => println!("    {}: not in template", name),
            }
        }
    }

    Ok(())
}
