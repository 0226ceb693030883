use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use wacc_core::cost_of_capital::{self, InstrumentInput};

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum EquityMethod {
    Capm,
    Dgm,
}

/// Arguments for cost of equity
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct CostOfEquityArgs {
    /// Estimation method
    #[arg(long, value_enum, default_value = "dgm")]
    pub method: EquityMethod,

    /// Risk-free rate (CAPM, e.g. 0.042 for 4.2%)
    #[arg(long)]
    pub risk_free_rate: Option<Decimal>,

    /// Equity beta (CAPM)
    #[arg(long)]
    pub beta: Option<Decimal>,

    /// Market risk premium (CAPM)
    #[arg(long, alias = "mrp")]
    pub market_risk_premium: Option<Decimal>,

    /// Dividend just paid, D0 (DGM)
    #[arg(long, alias = "d0")]
    pub last_dividend: Option<Decimal>,

    /// Annual dividend growth rate (DGM)
    #[arg(long)]
    pub growth_rate: Option<Decimal>,

    /// Market price per share, P0 (DGM)
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for cost of preference shares
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct CostOfPreferenceArgs {
    /// Preference dividend per share
    #[arg(long)]
    pub dividend: Option<Decimal>,

    /// Market price per preference share
    #[arg(long)]
    pub price: Option<Decimal>,

    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for cost of redeemable debt
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct CostOfRedeemableDebtArgs {
    /// Annual coupon per 100 nominal
    #[arg(long)]
    pub coupon: Option<Decimal>,

    /// Market price per 100 nominal
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Redemption value per 100 nominal
    #[arg(long, default_value = "100")]
    pub redemption_value: Decimal,

    /// Whole years to redemption
    #[arg(long)]
    pub years: Option<u32>,

    /// Corporate tax rate
    #[arg(long)]
    pub tax_rate: Option<Decimal>,

    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for cost of irredeemable debt
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct CostOfIrredeemableDebtArgs {
    /// Annual coupon per 100 nominal
    #[arg(long)]
    pub coupon: Option<Decimal>,

    /// Market price per 100 nominal
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Corporate tax rate
    #[arg(long)]
    pub tax_rate: Option<Decimal>,

    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for cost of bank borrowing
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct CostOfBankLoanArgs {
    /// Bank loan interest rate
    #[arg(long)]
    pub interest_rate: Option<Decimal>,

    /// Corporate tax rate
    #[arg(long)]
    pub tax_rate: Option<Decimal>,

    #[arg(long)]
    pub input: Option<String>,
}

fn price_instrument(input: &InstrumentInput) -> Result<Value, Box<dyn std::error::Error>> {
    let result = cost_of_capital::calculate_cost(input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_cost_of_equity(args: CostOfEquityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let instrument = match input::load::<InstrumentInput>(args.input.as_deref())? {
        Some(loaded) => loaded,
        None => match args.method {
            EquityMethod::Capm => InstrumentInput::EquityCapm {
                risk_free_rate: args
                    .risk_free_rate
                    .ok_or("--risk-free-rate is required for CAPM (or provide --input)")?,
                beta: args
                    .beta
                    .ok_or("--beta is required for CAPM (or provide --input)")?,
                market_risk_premium: args
                    .market_risk_premium
                    .ok_or("--market-risk-premium is required for CAPM (or provide --input)")?,
            },
            EquityMethod::Dgm => InstrumentInput::EquityDgm {
                last_dividend: args
                    .last_dividend
                    .ok_or("--last-dividend is required for DGM (or provide --input)")?,
                growth_rate: args
                    .growth_rate
                    .ok_or("--growth-rate is required for DGM (or provide --input)")?,
                price: args
                    .price
                    .ok_or("--price is required for DGM (or provide --input)")?,
            },
        },
    };
    price_instrument(&instrument)
}

pub fn run_cost_of_preference(args: CostOfPreferenceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let instrument = match input::load::<InstrumentInput>(args.input.as_deref())? {
        Some(loaded) => loaded,
        None => InstrumentInput::Preference {
            dividend: args
                .dividend
                .ok_or("--dividend is required (or provide --input)")?,
            price: args.price.ok_or("--price is required (or provide --input)")?,
        },
    };
    price_instrument(&instrument)
}

pub fn run_cost_of_redeemable_debt(
    args: CostOfRedeemableDebtArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let instrument = match input::load::<InstrumentInput>(args.input.as_deref())? {
        Some(loaded) => loaded,
        None => InstrumentInput::RedeemableDebt {
            coupon: args.coupon.ok_or("--coupon is required (or provide --input)")?,
            price: args.price.ok_or("--price is required (or provide --input)")?,
            redemption_value: args.redemption_value,
            years_to_redemption: args.years.ok_or("--years is required (or provide --input)")?,
            tax_rate: args
                .tax_rate
                .ok_or("--tax-rate is required (or provide --input)")?,
        },
    };
    price_instrument(&instrument)
}

pub fn run_cost_of_irredeemable_debt(
    args: CostOfIrredeemableDebtArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let instrument = match input::load::<InstrumentInput>(args.input.as_deref())? {
        Some(loaded) => loaded,
        None => InstrumentInput::IrredeemableDebt {
            coupon: args.coupon.ok_or("--coupon is required (or provide --input)")?,
            price: args.price.ok_or("--price is required (or provide --input)")?,
            tax_rate: args
                .tax_rate
                .ok_or("--tax-rate is required (or provide --input)")?,
        },
    };
    price_instrument(&instrument)
}

pub fn run_cost_of_bank_loan(args: CostOfBankLoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let instrument = match input::load::<InstrumentInput>(args.input.as_deref())? {
        Some(loaded) => loaded,
        None => InstrumentInput::BankLoan {
            interest_rate: args
                .interest_rate
                .ok_or("--interest-rate is required (or provide --input)")?,
            tax_rate: args
                .tax_rate
                .ok_or("--tax-rate is required (or provide --input)")?,
        },
    };
    price_instrument(&instrument)
}
