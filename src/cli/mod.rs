//! Command-line parsing for the diamond price calculator.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! pricing code: every subcommand's args convert into plain domain values
//! (`StoneRequest`, `PriceSourcePaths`, ...) before anything is computed.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::app::pipeline::StoneRequest;
use crate::data::rate_cache::FALLBACK_USD_INR;
use crate::domain::{Clarity, Color, DiscountDirection, DiscountToggle, PriceInputs, Shape, StoneSpec};
use crate::io::PriceSourcePaths;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "dpx", version, about = "Diamond price calculator (reference table + recut comparison)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Price a single stone and print the summary.
    Quote(QuoteArgs),
    /// Price a rough stone (A) and its recut (B) and compare the totals.
    Recut(RecutArgs),
    /// Print price-source diagnostics (record counts, latest date, overlaps).
    Table(TableArgs),
    /// Launch the interactive TUI.
    ///
    /// Uses the same quote pipeline as `dpx quote` / `dpx recut`, rendered
    /// with Ratatui.
    Tui(TuiArgs),
}

/// Price source locations.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// Round (`BR`) price list CSV.
    #[arg(long, value_name = "CSV", default_value = "data/round.csv")]
    pub round_csv: PathBuf,

    /// Fancy (`PS`) price list CSV.
    #[arg(long, value_name = "CSV", default_value = "data/fancy.csv")]
    pub fancy_csv: PathBuf,
}

impl SourceArgs {
    pub fn paths(&self) -> PriceSourcePaths {
        PriceSourcePaths {
            round: self.round_csv.clone(),
            fancy: self.fancy_csv.clone(),
        }
    }
}

/// Exchange-rate options.
#[derive(Debug, Args, Clone)]
pub struct RateArgs {
    /// Use this USD→INR rate instead of fetching a live one.
    #[arg(long, value_name = "RATE", value_parser = parse_positive)]
    pub fx_rate: Option<f64>,

    /// Rate used when the live fetch fails.
    #[arg(long, value_parser = parse_positive, default_value_t = FALLBACK_USD_INR)]
    pub fallback_rate: f64,

    /// Timeout for the live rate request.
    #[arg(long, default_value_t = 5)]
    pub fx_timeout_secs: u64,
}

impl RateArgs {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.fx_timeout_secs)
    }
}

#[derive(Debug, Args, Clone)]
pub struct QuoteArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub rate: RateArgs,

    /// Weight in carats.
    #[arg(short = 'w', long, value_parser = parse_weight)]
    pub weight: f64,

    #[arg(long, value_enum, ignore_case = true, default_value_t = Shape::Round)]
    pub shape: Shape,

    #[arg(long, value_enum, ignore_case = true, default_value_t = Color::D)]
    pub color: Color,

    #[arg(long, value_enum, ignore_case = true, default_value_t = Clarity::If)]
    pub clarity: Clarity,

    /// Price 5ct+ stones from the 5ct band.
    #[arg(long)]
    pub bulk_tier: bool,

    /// Whether the discount control raises (premium) or lowers (discount) the price.
    #[arg(long, value_enum, default_value_t = DiscountDirection::Premium)]
    pub direction: DiscountDirection,

    /// Discount magnitude in percent.
    #[arg(long, value_parser = parse_percent, default_value_t = 10.0)]
    pub discount: f64,

    /// Override the price per carat (USD). Takes priority over `--total`.
    #[arg(long, value_name = "USD")]
    pub price_per_ct: Option<f64>,

    /// Override the total price (USD).
    #[arg(long, value_name = "USD")]
    pub total: Option<f64>,

    /// Print JSON instead of the text summary.
    #[arg(long)]
    pub json: bool,
}

impl QuoteArgs {
    pub fn request(&self) -> StoneRequest {
        StoneRequest {
            stone: StoneSpec {
                weight: self.weight,
                shape: self.shape,
                color: self.color,
                clarity: self.clarity,
                use_bulk_weight_tier: self.bulk_tier,
            },
            toggle: DiscountToggle::new(self.direction, self.discount),
            inputs: PriceInputs {
                price_per_unit: self.price_per_ct,
                total: self.total,
            },
        }
    }
}

/// Two stones: A (rough / current) and B (recut target).
#[derive(Debug, Args, Clone)]
pub struct RecutArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub rate: RateArgs,

    /// Price 5ct+ stones from the 5ct band (applies to both stones).
    #[arg(long)]
    pub bulk_tier: bool,

    #[arg(long, value_parser = parse_weight)]
    pub weight_a: f64,
    #[arg(long, value_enum, ignore_case = true, default_value_t = Shape::Round)]
    pub shape_a: Shape,
    #[arg(long, value_enum, ignore_case = true, default_value_t = Color::D)]
    pub color_a: Color,
    #[arg(long, value_enum, ignore_case = true, default_value_t = Clarity::If)]
    pub clarity_a: Clarity,
    #[arg(long, value_enum, default_value_t = DiscountDirection::Premium)]
    pub direction_a: DiscountDirection,
    #[arg(long, value_parser = parse_percent, default_value_t = 10.0)]
    pub discount_a: f64,
    #[arg(long, value_name = "USD")]
    pub price_per_ct_a: Option<f64>,
    #[arg(long, value_name = "USD")]
    pub total_a: Option<f64>,

    #[arg(long, value_parser = parse_weight)]
    pub weight_b: f64,
    #[arg(long, value_enum, ignore_case = true, default_value_t = Shape::Round)]
    pub shape_b: Shape,
    #[arg(long, value_enum, ignore_case = true, default_value_t = Color::D)]
    pub color_b: Color,
    #[arg(long, value_enum, ignore_case = true, default_value_t = Clarity::If)]
    pub clarity_b: Clarity,
    #[arg(long, value_enum, default_value_t = DiscountDirection::Premium)]
    pub direction_b: DiscountDirection,
    #[arg(long, value_parser = parse_percent, default_value_t = 10.0)]
    pub discount_b: f64,
    #[arg(long, value_name = "USD")]
    pub price_per_ct_b: Option<f64>,
    #[arg(long, value_name = "USD")]
    pub total_b: Option<f64>,

    /// Print JSON instead of the text summary.
    #[arg(long)]
    pub json: bool,
}

impl RecutArgs {
    pub fn request_a(&self) -> StoneRequest {
        StoneRequest {
            stone: StoneSpec {
                weight: self.weight_a,
                shape: self.shape_a,
                color: self.color_a,
                clarity: self.clarity_a,
                use_bulk_weight_tier: self.bulk_tier,
            },
            toggle: DiscountToggle::new(self.direction_a, self.discount_a),
            inputs: PriceInputs {
                price_per_unit: self.price_per_ct_a,
                total: self.total_a,
            },
        }
    }

    pub fn request_b(&self) -> StoneRequest {
        StoneRequest {
            stone: StoneSpec {
                weight: self.weight_b,
                shape: self.shape_b,
                color: self.color_b,
                clarity: self.clarity_b,
                use_bulk_weight_tier: self.bulk_tier,
            },
            toggle: DiscountToggle::new(self.direction_b, self.discount_b),
            inputs: PriceInputs {
                price_per_unit: self.price_per_ct_b,
                total: self.total_b,
            },
        }
    }
}

#[derive(Debug, Args, Clone)]
pub struct TableArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Debug, Args, Clone)]
pub struct TuiArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub rate: RateArgs,

    /// Start in recut (two-stone) mode.
    #[arg(long)]
    pub recut: bool,
}

fn parse_weight(raw: &str) -> Result<f64, String> {
    let v: f64 = raw.trim().parse().map_err(|_| format!("invalid weight '{raw}'"))?;
    if v.is_finite() && v >= 0.01 {
        Ok(v)
    } else {
        Err(format!("weight must be at least 0.01ct (got {raw})"))
    }
}

fn parse_percent(raw: &str) -> Result<f64, String> {
    let v: f64 = raw.trim().parse().map_err(|_| format!("invalid percentage '{raw}'"))?;
    if (0.0..=100.0).contains(&v) {
        Ok(v)
    } else {
        Err(format!("percentage must be between 0 and 100 (got {raw})"))
    }
}

fn parse_positive(raw: &str) -> Result<f64, String> {
    let v: f64 = raw.trim().parse().map_err(|_| format!("invalid number '{raw}'"))?;
    if v.is_finite() && v > 0.0 {
        Ok(v)
    } else {
        Err(format!("value must be positive (got {raw})"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn quote_defaults() {
        let cli = parse(&["dpx", "quote", "--weight", "1.2"]);
        let Command::Quote(args) = cli.command else {
            panic!("expected quote");
        };
        let req = args.request();
        assert_eq!(req.stone.shape, Shape::Round);
        assert_eq!(req.toggle, DiscountToggle::default());
        assert_eq!(req.inputs, PriceInputs::default());
        assert_eq!(args.source.round_csv, PathBuf::from("data/round.csv"));
        assert_eq!(args.rate.fallback_rate, 85.5);
        assert_eq!(args.rate.fx_rate, None);
    }

    #[test]
    fn grades_parse_case_insensitively() {
        let cli = parse(&[
            "dpx", "quote", "-w", "0.9", "--shape", "cushion-brilliant", "--color", "g", "--clarity", "VVS2",
            "--direction", "discount", "--discount", "12.5", "--total", "5000",
        ]);
        let Command::Quote(args) = cli.command else {
            panic!("expected quote");
        };
        let req = args.request();
        assert_eq!(req.stone.shape, Shape::CushionBrilliant);
        assert_eq!(req.stone.color, Color::G);
        assert_eq!(req.stone.clarity, Clarity::Vvs2);
        assert_eq!(req.toggle.internal_discount(), 12.5);
        assert_eq!(req.inputs.total, Some(5000.0));
    }

    #[test]
    fn recut_shares_the_bulk_tier_flag() {
        let cli = parse(&[
            "dpx", "recut", "--bulk-tier", "--weight-a", "7", "--weight-b", "5.2", "--shape-b", "oval",
        ]);
        let Command::Recut(args) = cli.command else {
            panic!("expected recut");
        };
        assert!(args.request_a().stone.use_bulk_weight_tier);
        assert!(args.request_b().stone.use_bulk_weight_tier);
        assert_eq!(args.request_b().stone.shape, Shape::Oval);
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(Cli::try_parse_from(["dpx", "quote", "--weight", "0"]).is_err());
        assert!(Cli::try_parse_from(["dpx", "quote", "--weight", "1", "--discount", "120"]).is_err());
        assert!(Cli::try_parse_from(["dpx", "quote", "--weight", "1", "--fx-rate", "-3"]).is_err());
        assert!(Cli::try_parse_from(["dpx", "quote", "--weight", "1", "--clarity", "VS3"]).is_err());
    }
}
