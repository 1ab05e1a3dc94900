use clap::Parser;
use credits_fin::app::render;
use credits_fin::app::Session;
use credits_fin::config::cli::Command;
use credits_fin::domain::model::UploadFile;
use credits_fin::utils::error::DeskError;
use credits_fin::utils::{logger, validation::Validate};
use credits_fin::{CliConfig, ConfiguredBlobStore, DealDesk, DeskConfig, GoogleSheetsStore};

type Desk = DealDesk<GoogleSheetsStore, ConfiguredBlobStore>;

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 載入 TOML 配置
    let config = match DeskConfig::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            logger::init_cli_logger(cli.verbose, None);
            tracing::error!("❌ Failed to load config file '{}': {}", cli.config, e);
            eprintln!("❌ Failed to load config file '{}': {}", cli.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(e.exit_code());
        }
    };

    // 初始化日誌
    if config.json_logs() && !cli.verbose {
        logger::init_json_logger(config.log_level());
    } else {
        logger::init_cli_logger(cli.verbose, config.log_level());
    }
    tracing::debug!("CLI config: {:?}", cli);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    let desk = DealDesk::with_folders(
        GoogleSheetsStore::from_config(&config.sheets),
        ConfiguredBlobStore::from_config(&config.blob_store),
        config.upload_folders(),
    );
    let mut session = Session::new();

    // CSV 輸出時 stdout 只放資料
    let machine_output = matches!(cli.command, Command::OpenDeals { csv: true, .. });
    let outcome = run(&desk, &mut session, cli.command).await;

    if let Err(e) = render::write_notices(
        &session.take_notices(),
        std::io::stdout().lock(),
        std::io::stderr().lock(),
        machine_output,
    ) {
        tracing::warn!("Could not print notices: {}", e);
    }

    if let Err(e) = outcome {
        tracing::error!(
            "❌ Action failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }
}

async fn run(desk: &Desk, session: &mut Session, command: Command) -> Result<(), DeskError> {
    match command {
        Command::Branches => {
            let branches = desk.list_branches().await?;
            print!("{}", render::render_branches(&branches));
        }
        Command::FinClose(args) => {
            session.open_fin_close();
            let submission = args.into_submission().await?;
            let deal = session.submit_fin_close(desk, submission).await?;
            println!(
                "{} | {} | {} | {}",
                deal.account_number, deal.customer_name, deal.branch, deal.certificate_url
            );
        }
        Command::OpenDeals { search, csv } => {
            session.open_deals();
            session.set_search(search.unwrap_or_default());
            let deals = session.refresh(desk).await?;
            if csv {
                write_csv(deals)?;
            } else if !deals.is_empty() {
                print!("{}", render::render_open_deals(deals));
            }
        }
        Command::Bid {
            account_number,
            branch,
            document,
        } => {
            session.open_deals();
            session.select_bid_branch(&account_number, branch);
            if let Some(path) = document {
                session.attach_bid_document(&account_number, UploadFile::from_path(&path).await?);
            }
            let bid = session.bid(desk, &account_number).await?;
            println!(
                "{} booked by {} | {}",
                bid.account_number, bid.bidding_branch, bid.document_url
            );
        }
    }
    Ok(())
}

fn write_csv(deals: &[credits_fin::domain::model::Deal]) -> Result<(), DeskError> {
    let stdout = std::io::stdout();
    render::write_open_deals_csv(stdout.lock(), deals)
}
