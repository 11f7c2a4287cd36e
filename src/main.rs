use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use log::{error, info};
use std::path::PathBuf;

use hospital_billing::billing::BillRequest;
use hospital_billing::config::price_list::PriceList;
use hospital_billing::config::Config;
use hospital_billing::dosage::{format_dosage_for_bill, DosageCalculator, DosageRequest};
use hospital_billing::medicine::RuleTable;
use hospital_billing::output;

#[derive(Parser)]
#[command(name = "hospital_billing")]
#[command(about = "Hospital billing calculator with medicine dosage pricing")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Price a single medicine course
    Calculate(CalculateArgs),
    /// Assemble a bill from a request file and save it
    Bill(BillArgs),
    /// List price list items by category
    Prices(PricesArgs),
}

#[derive(Args)]
struct CalculateArgs {
    /// Dose per administration, in the medicine's unit
    #[arg(long)]
    dose: String,

    /// Medicine form (Tablet, Capsule, Syrup, Solution, ml/cc, tsp, tbsp, Mg, ...)
    #[arg(long = "type")]
    med_type: String,

    /// Frequency code (QD, BID, TID, QID, QOD, QWEEK)
    #[arg(long)]
    frequency: String,

    /// Treatment duration in days
    #[arg(long, allow_negative_numbers = true)]
    days: i64,

    /// Price per billing unit
    #[arg(long)]
    price: f64,

    /// Medicine name for the bill line
    #[arg(long, default_value = "Medicine")]
    name: String,

    /// Inpatient encounter
    #[arg(long)]
    inpatient: bool,

    /// Dispensed at discharge (inpatient only)
    #[arg(long)]
    discharge: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct BillArgs {
    /// Bill request (JSON)
    #[arg(short, long)]
    request: PathBuf,

    /// Price list (CSV); defaults to the one named in the configuration
    #[arg(short, long)]
    prices: Option<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Args)]
struct PricesArgs {
    /// Price list (CSV); defaults to the one named in the configuration
    #[arg(short, long)]
    prices: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    let config = match &cli.config {
        Some(path) => {
            let config = Config::from_file(path)
                .with_context(|| format!("failed to load configuration from {:?}", path))?;
            info!("Loaded configuration from {:?}", path);
            config
        }
        None => Config::default(),
    };

    let rules = RuleTable::from_config(&config.calculator);
    let calculator = DosageCalculator::new(&rules);

    match cli.command {
        Command::Calculate(args) => run_calculate(&calculator, args),
        Command::Bill(args) => run_bill(&calculator, &config, args),
        Command::Prices(args) => run_prices(&config, args),
    }
}

fn run_calculate(calculator: &DosageCalculator, args: CalculateArgs) -> anyhow::Result<()> {
    let request = DosageRequest {
        dose_prescribed: args.dose,
        med_type: args.med_type.parse()?,
        dose_frequency: args.frequency.parse()?,
        total_days: args.days,
        base_price: args.price,
        is_inpatient: args.inpatient,
        is_discharge_medicine: args.discharge,
    };

    let result = match calculator.calculate(&request) {
        Ok(result) => result,
        Err(err) => {
            error!("Calculation failed, item not added: {}", err);
            return Err(err.into());
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "{}",
            format_dosage_for_bill(
                &args.name,
                &request.dose_prescribed,
                &request.med_type,
                request.dose_frequency,
                request.total_days,
                &result,
            )
        );
        println!("{}", result.calculation_details);
        println!("Total price: {:.2}", result.total_price);
    }

    Ok(())
}

fn run_bill(calculator: &DosageCalculator, config: &Config, args: BillArgs) -> anyhow::Result<()> {
    let price_list = load_price_list(args.prices, config)?;
    let request = BillRequest::from_file(&args.request)
        .with_context(|| format!("failed to read bill request {:?}", args.request))?;

    let assembled = request.assemble(&price_list, calculator)?;

    // Create output directory if it doesn't exist
    std::fs::create_dir_all(&args.output)?;

    output::save_bill(&assembled, &args.output)?;
    output::generate_report(&assembled, &config.billing.currency, &args.output)?;
    info!(
        "Bill {} total {} {:.2}",
        assembled.bill.id,
        config.billing.currency,
        assembled.bill.total()
    );

    Ok(())
}

fn run_prices(config: &Config, args: PricesArgs) -> anyhow::Result<()> {
    let price_list = load_price_list(args.prices, config)?;
    if price_list.is_empty() {
        println!("Price list is empty");
        return Ok(());
    }

    for (category, items) in price_list.by_category() {
        println!("{}", category);
        for item in items {
            let form = item.med_type.as_ref().map(|t| t.to_string()).unwrap_or_default();
            println!(
                "  {:<12} {:<40} {:>10.2} {} {}",
                item.code, item.name, item.price, config.billing.currency, form
            );
        }
    }
    info!("{} items listed", price_list.len());

    Ok(())
}

fn load_price_list(explicit: Option<PathBuf>, config: &Config) -> anyhow::Result<PriceList> {
    let path = match explicit.or_else(|| config.billing.price_list.clone()) {
        Some(path) => path,
        None => bail!("no price list given; pass --prices or set billing.price_list"),
    };

    PriceList::from_csv_path(&path)
        .with_context(|| format!("failed to load price list from {:?}", path))
}
