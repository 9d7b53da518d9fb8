use crate::{
    dice::DicePool,
    parse::GroupList,
    prob::{self, hits_pmf, scored_distributions, Context, HitsPmf, ScoredDistribution},
    simulate::{goodness_of_fit, Roller},
    TotalSize, DEFAULT_FACES,
};
use bytesize::ByteSize;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use tabular::{row, Table};
use trice::Instant;

const DEFAULT_SAMPLES: usize = 100_000;
const DEFAULT_SEED: u64 = 0xd15c0;

///////////////////////////
// String parser helpers //
///////////////////////////

fn parse_req<T>(label: &'static str, s: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    T::from_str(s).map_err(|err| format!("invalid {label}: {err}"))
}

fn parse_opt<T>(label: &'static str, opt_s: Option<&str>) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    opt_s
        .map(T::from_str)
        .transpose()
        .map_err(|err| format!("invalid {label}: {err}"))
}

//////////////////////
// CLI Args Wrapper //
//////////////////////

pub struct Args(pico_args::Arguments);

impl Args {
    pub fn new(inner: pico_args::Arguments) -> Self {
        Self(inner)
    }

    fn subcommand(&mut self) -> Result<Option<String>, String> {
        self.0.subcommand().map_err(|err| err.to_string())
    }

    fn opt_value(&mut self, keys: impl Into<pico_args::Keys>) -> Result<Option<String>, String> {
        self.0
            .opt_value_from_fn(keys, |s| Result::<_, pico_args::Error>::Ok(s.to_owned()))
            .map_err(|err| err.to_string())
    }

    fn free_value(&mut self) -> Result<String, String> {
        self.0
            .free_from_fn(|s| Result::<_, pico_args::Error>::Ok(s.to_owned()))
            .map_err(|err| err.to_string())
    }

    fn expect_finished(self) -> Result<(), String> {
        let remaining = self.0.finish();
        if !remaining.is_empty() {
            Err(format!("unexpected arguments left: '{:?}'", remaining))
        } else {
            Ok(())
        }
    }

    fn maybe_help(&mut self, usage: &str) {
        if self.0.contains(["-h", "--help"]) {
            print!("{}", usage);
            std::process::exit(0);
        }
    }
}

/////////////
// Metrics //
/////////////

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Metrics(pub Vec<(String, String)>);

impl Metrics {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, label: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.0.push((label.into(), value.into()));
        self
    }

    /// The evaluation statistics every command reports.
    fn push_context(&mut self, ctxt: &Context) -> &mut Self {
        self.push(
            "distributions explored",
            ctxt.distributions_explored().to_string(),
        );
        self.push(
            "weight cache size",
            ctxt.weight_cache().cache_size().to_string(),
        );
        self.push(
            "weight cache hit rate",
            format!(
                "{:0.3} (h: {}, m: {})",
                ctxt.weight_cache().cache_hit_rate(),
                ctxt.weight_cache().cache_hits(),
                ctxt.weight_cache().cache_misses(),
            ),
        )
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new("{:>}  {:<}");

        for (label, value) in &self.0 {
            table.add_row(row!(label, value));
        }

        table
    }
}

///////////////////
// Command trait //
///////////////////

pub trait Command: Sized {
    const USAGE: &'static str;

    type Output: fmt::Display;

    fn try_from_cli_args(args: Args) -> Result<Self, String>;
    fn run(self) -> Result<Self::Output, String>;
}

//////////////
// PoolArgs //
//////////////

/// The pool-describing options shared by every subcommand.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PoolArgs {
    faces: u32,
    groups: GroupList,
    max_distributions: Option<usize>,
}

impl PoolArgs {
    fn try_from_str_args(
        faces: Option<&str>,
        limit: Option<&str>,
        groups: &str,
    ) -> Result<Self, String> {
        let args = Self {
            faces: parse_opt("faces", faces)?.unwrap_or(DEFAULT_FACES),
            groups: parse_req("pool", groups)?,
            max_distributions: parse_opt("limit", limit)?,
        };

        // fail early on a bad pool, before any subcommand runs
        args.to_pool()?;

        Ok(args)
    }

    fn from_cli_args(args: &mut Args) -> Result<(Option<String>, Option<String>), String> {
        let faces = args.opt_value(["-f", "--faces"])?;
        let limit = args.opt_value(["-l", "--limit"])?;
        Ok((faces, limit))
    }

    fn to_pool(&self) -> Result<DicePool, String> {
        DicePool::new(self.faces, self.groups.as_slice()).map_err(|err| err.to_string())
    }

    fn to_context(&self) -> Context {
        let mut ctxt = Context::new();
        ctxt.set_max_distributions(self.max_distributions);
        ctxt
    }
}

const POOL_OPTIONS: &str = "\
OPTIONS:
    · --faces / -f faces (default: 6)
      The number of faces on every die in the pool.

    · --limit / -l count (default: none)
      Fail instead of enumerating more than this many distributions for a
      single hit count.
";

/////////////////
// HitsCommand //
/////////////////

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HitsCommand {
    pool: PoolArgs,
    hits: i64,
}

impl HitsCommand {
    pub fn try_from_str_args(
        faces: Option<&str>,
        limit: Option<&str>,
        pool: &str,
        hits: &str,
    ) -> Result<Self, String> {
        Ok(Self {
            pool: PoolArgs::try_from_str_args(faces, limit, pool)?,
            hits: parse_req("hits", hits)?,
        })
    }
}

impl Command for HitsCommand {
    const USAGE: &'static str = "\
hitpool hits - the probability of rolling exactly some number of hits

USAGE:
    hitpool hits [option ...] <pool> <hits>

EXAMPLES:
    # two dice hitting on 1-3 and one die hitting on a 1
    hitpool hits [3:2,1:1] 2

    hitpool hits -f 10 [7:3,2:4] 4

POOL:
    [threshold:capacity, ...], where each group holds `capacity` dice that hit
    when they roll `threshold` or under. Group order matters.

";

    type Output = ProbabilityOutput;

    fn try_from_cli_args(mut args: Args) -> Result<Self, String> {
        args.maybe_help(&format!("{}{}", Self::USAGE, POOL_OPTIONS));

        let (faces, limit) = PoolArgs::from_cli_args(&mut args)?;
        let pool = args.free_value()?;
        let hits = args.free_value()?;
        args.expect_finished()?;

        Self::try_from_str_args(faces.as_deref(), limit.as_deref(), &pool, &hits)
    }

    fn run(self) -> Result<Self::Output, String> {
        let pool = self.pool.to_pool()?;
        let mut ctxt = self.pool.to_context();

        let start_time = Instant::now();
        let p = prob::hits_probability_with(&pool, self.hits, &mut ctxt)
            .map_err(|err| err.to_string())?;
        let search_duration = start_time.elapsed();

        let mut metrics = Metrics::new();
        metrics.push("search duration", format!("{:.2?}", search_duration));
        metrics.push_context(&ctxt);

        Ok(ProbabilityOutput {
            pool,
            label: format!("P[hits = {}]", self.hits),
            p,
            metrics,
        })
    }
}

#[derive(Debug)]
pub struct ProbabilityOutput {
    pool: DicePool,
    label: String,
    p: f64,
    metrics: Metrics,
}

impl fmt::Display for ProbabilityOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut table = Table::new("{:>}  {:<}");
        table.add_row(row!("pool", &self.pool));
        table.add_row(row!(&self.label, self.p));

        write!(f, "\n{}\n{}", table, self.metrics.to_table())
    }
}

////////////////////
// MinHitsCommand //
////////////////////

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MinHitsCommand {
    pool: PoolArgs,
    min_hits: i64,
}

impl MinHitsCommand {
    pub fn try_from_str_args(
        faces: Option<&str>,
        limit: Option<&str>,
        pool: &str,
        min_hits: &str,
    ) -> Result<Self, String> {
        Ok(Self {
            pool: PoolArgs::try_from_str_args(faces, limit, pool)?,
            min_hits: parse_req("min hits", min_hits)?,
        })
    }
}

impl Command for MinHitsCommand {
    const USAGE: &'static str = "\
hitpool min-hits - the probability of rolling at least some number of hits

USAGE:
    hitpool min-hits [option ...] <pool> <min-hits>

EXAMPLES:
    hitpool min-hits [3:2,1:1] 1

    # asking for more hits than there are dice is always 0
    hitpool min-hits [6:2] 3

";

    type Output = ProbabilityOutput;

    fn try_from_cli_args(mut args: Args) -> Result<Self, String> {
        args.maybe_help(&format!("{}{}", Self::USAGE, POOL_OPTIONS));

        let (faces, limit) = PoolArgs::from_cli_args(&mut args)?;
        let pool = args.free_value()?;
        let min_hits = args.free_value()?;
        args.expect_finished()?;

        Self::try_from_str_args(faces.as_deref(), limit.as_deref(), &pool, &min_hits)
    }

    fn run(self) -> Result<Self::Output, String> {
        let pool = self.pool.to_pool()?;
        let mut ctxt = self.pool.to_context();

        let start_time = Instant::now();
        let p = prob::min_hits_probability_with(&pool, self.min_hits, &mut ctxt)
            .map_err(|err| err.to_string())?;
        let search_duration = start_time.elapsed();

        let mut metrics = Metrics::new();
        metrics.push("search duration", format!("{:.2?}", search_duration));
        metrics.push_context(&ctxt);

        Ok(ProbabilityOutput {
            pool,
            label: format!("P[hits >= {}]", self.min_hits),
            p,
            metrics,
        })
    }
}

//////////////////
// TableCommand //
//////////////////

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TableCommand {
    pool: PoolArgs,
}

impl TableCommand {
    pub fn try_from_str_args(
        faces: Option<&str>,
        limit: Option<&str>,
        pool: &str,
    ) -> Result<Self, String> {
        Ok(Self {
            pool: PoolArgs::try_from_str_args(faces, limit, pool)?,
        })
    }
}

impl Command for TableCommand {
    const USAGE: &'static str = "\
hitpool table - the full hits probability table for a pool

USAGE:
    hitpool table [option ...] <pool>

EXAMPLES:
    hitpool table [3:2,1:1]
    hitpool table -f 20 [12:3,5:3,1:2]

";

    type Output = TableCommandOutput;

    fn try_from_cli_args(mut args: Args) -> Result<Self, String> {
        args.maybe_help(&format!("{}{}", Self::USAGE, POOL_OPTIONS));

        let (faces, limit) = PoolArgs::from_cli_args(&mut args)?;
        let pool = args.free_value()?;
        args.expect_finished()?;

        Self::try_from_str_args(faces.as_deref(), limit.as_deref(), &pool)
    }

    fn run(self) -> Result<Self::Output, String> {
        let pool = self.pool.to_pool()?;
        let mut ctxt = self.pool.to_context();

        let start_time = Instant::now();
        let max_hits = pool.total_dice() as usize;
        let mut probs = Vec::with_capacity(max_hits + 1);
        let mut num_distrs = Vec::with_capacity(max_hits + 1);
        for hits in 0..=i64::from(pool.total_dice()) {
            let explored = ctxt.distributions_explored();
            let p = prob::hits_probability_with(&pool, hits, &mut ctxt)
                .map_err(|err| err.to_string())?;
            probs.push(p);
            num_distrs.push(ctxt.distributions_explored() - explored);
        }
        let pmf = HitsPmf::from(probs);
        let search_duration = start_time.elapsed();

        let mut metrics = Metrics::new();
        metrics.push("search duration", format!("{:.2?}", search_duration));
        metrics.push("pmf expected hits", format!("{:.3}", pmf.expected_hits()));
        metrics.push("pmf total mass", format!("{}", pmf.total_mass()));
        metrics.push_context(&ctxt);

        Ok(TableCommandOutput {
            pool,
            pmf,
            num_distrs,
            metrics,
        })
    }
}

pub struct TableCommandOutput {
    pool: DicePool,
    pmf: HitsPmf,
    num_distrs: Vec<u64>,
    metrics: Metrics,
}

impl fmt::Display for TableCommandOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut table = Table::new("{:>}  {:<}  {:<}  {:>}").with_row(row!(
            format!("{:>8}", "hits"),
            "P[= hits]",
            "P[>= hits]",
            "distrs"
        ));

        let survival = self.pmf.survival();
        for (hits, num_distrs) in self.num_distrs.iter().enumerate() {
            table.add_row(row!(
                hits,
                self.pmf.view()[hits],
                survival[hits],
                num_distrs
            ));
        }

        write!(
            f,
            "\n{}\n\n{}\n{}",
            self.pool,
            table,
            self.metrics.to_table()
        )
    }
}

//////////////////////////
// DistributionsCommand //
//////////////////////////

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DistributionsCommand {
    pool: PoolArgs,
    hits: i64,
}

impl DistributionsCommand {
    pub fn try_from_str_args(
        faces: Option<&str>,
        limit: Option<&str>,
        pool: &str,
        hits: &str,
    ) -> Result<Self, String> {
        Ok(Self {
            pool: PoolArgs::try_from_str_args(faces, limit, pool)?,
            hits: parse_req("hits", hits)?,
        })
    }
}

impl Command for DistributionsCommand {
    const USAGE: &'static str = "\
hitpool distributions - list every way the hits can land across the groups,
    along with how much each way contributes to the total probability

USAGE:
    hitpool distributions [option ...] <pool> <hits>

EXAMPLES:
    hitpool distributions [3:2,1:1] 2

";

    type Output = DistributionsCommandOutput;

    fn try_from_cli_args(mut args: Args) -> Result<Self, String> {
        args.maybe_help(&format!("{}{}", Self::USAGE, POOL_OPTIONS));

        let (faces, limit) = PoolArgs::from_cli_args(&mut args)?;
        let pool = args.free_value()?;
        let hits = args.free_value()?;
        args.expect_finished()?;

        Self::try_from_str_args(faces.as_deref(), limit.as_deref(), &pool, &hits)
    }

    fn run(self) -> Result<Self::Output, String> {
        let pool = self.pool.to_pool()?;
        let mut ctxt = self.pool.to_context();

        let start_time = Instant::now();
        let scored =
            scored_distributions(&pool, self.hits, &mut ctxt).map_err(|err| err.to_string())?;
        let search_duration = start_time.elapsed();

        let p = scored.iter().map(ScoredDistribution::probability).sum::<f64>();
        let distrs_size = scored
            .iter()
            .map(|scored| scored.distr.clone())
            .collect::<Vec<_>>()
            .total_size();

        let mut metrics = Metrics::new();
        metrics.push("search duration", format!("{:.2?}", search_duration));
        metrics.push(format!("P[hits = {}]", self.hits), format!("{}", p.min(1.0)));
        metrics.push(
            "distributions size",
            format!("{}", ByteSize::b(distrs_size as u64)),
        );
        metrics.push_context(&ctxt);

        Ok(DistributionsCommandOutput { scored, metrics })
    }
}

pub struct DistributionsCommandOutput {
    scored: Vec<ScoredDistribution>,
    metrics: Metrics,
}

impl fmt::Display for DistributionsCommandOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut table = Table::new("{:>}  {:<}  {:>}  {:<}  {:<}").with_row(row!(
            format!("{:>12}", "distr"),
            "partition",
            "weight",
            "p event",
            "p"
        ));

        for scored in &self.scored {
            table.add_row(row!(
                &scored.distr,
                scored.distr.to_partition_string(),
                &scored.weight,
                scored.p_event,
                scored.probability()
            ));
        }

        write!(f, "\n{}\n{}", table, self.metrics.to_table())
    }
}

/////////////////////
// SimulateCommand //
/////////////////////

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulateCommand {
    pool: PoolArgs,
    samples: usize,
    seed: u64,
}

impl SimulateCommand {
    pub fn try_from_str_args(
        faces: Option<&str>,
        limit: Option<&str>,
        samples: Option<&str>,
        seed: Option<&str>,
        pool: &str,
    ) -> Result<Self, String> {
        let cmd = Self {
            pool: PoolArgs::try_from_str_args(faces, limit, pool)?,
            samples: parse_opt("samples", samples)?.unwrap_or(DEFAULT_SAMPLES),
            seed: parse_opt("seed", seed)?.unwrap_or(DEFAULT_SEED),
        };

        if cmd.samples == 0 {
            return Err("the number of samples must be positive".to_string());
        }

        Ok(cmd)
    }
}

impl Command for SimulateCommand {
    const USAGE: &'static str = "\
hitpool simulate - roll the pool many times and compare the observed hits
    distribution against the exact one

USAGE:
    hitpool simulate [option ...] <pool>

EXAMPLES:
    hitpool simulate [3:2,1:1]
    hitpool simulate -n 1000000 --seed 42 [4:5,2:5]

SIMULATE OPTIONS:
    · -n samples (default: 100000)
      The number of times to roll the pool.

    · --seed seed (default: 857536)
      The random seed.

";

    type Output = SimulateCommandOutput;

    fn try_from_cli_args(mut args: Args) -> Result<Self, String> {
        args.maybe_help(&format!("{}{}", Self::USAGE, POOL_OPTIONS));

        let (faces, limit) = PoolArgs::from_cli_args(&mut args)?;
        let samples = args.opt_value("-n")?;
        let seed = args.opt_value("--seed")?;
        let pool = args.free_value()?;
        args.expect_finished()?;

        Self::try_from_str_args(
            faces.as_deref(),
            limit.as_deref(),
            samples.as_deref(),
            seed.as_deref(),
            &pool,
        )
    }

    fn run(self) -> Result<Self::Output, String> {
        let pool = self.pool.to_pool()?;
        let mut ctxt = self.pool.to_context();

        let start_time = Instant::now();
        let pmf = hits_pmf(&pool, &mut ctxt).map_err(|err| err.to_string())?;
        let search_duration = start_time.elapsed();

        let start_time = Instant::now();
        let p_hat = Roller::new(&pool, self.seed).sample_pmf(self.samples);
        let sample_duration = start_time.elapsed();

        let p_value = goodness_of_fit(&pmf, self.samples, &p_hat);

        let mut metrics = Metrics::new();
        metrics.push("search duration", format!("{:.2?}", search_duration));
        metrics.push("sample duration", format!("{:.2?}", sample_duration));
        metrics.push("samples", self.samples.to_string());
        metrics.push("G-test p-value", format!("{:0.4}", p_value));
        metrics.push_context(&ctxt);

        Ok(SimulateCommandOutput {
            exact: pmf.view().to_vec(),
            sampled: p_hat.to_vec(),
            metrics,
        })
    }
}

pub struct SimulateCommandOutput {
    exact: Vec<f64>,
    sampled: Vec<f64>,
    metrics: Metrics,
}

impl fmt::Display for SimulateCommandOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut table = Table::new("{:>}  {:<}  {:<}").with_row(row!(
            format!("{:>8}", "hits"),
            "exact",
            "sampled"
        ));

        for (hits, (p, p_hat)) in self.exact.iter().zip(&self.sampled).enumerate() {
            table.add_row(row!(hits, p, p_hat));
        }

        write!(f, "\n{}\n{}", table, self.metrics.to_table())
    }
}

/////////////////
// BaseCommand //
/////////////////

#[derive(Debug)]
pub enum BaseCommand {
    Hits(HitsCommand),
    MinHits(MinHitsCommand),
    Table(TableCommand),
    Distributions(DistributionsCommand),
    Simulate(SimulateCommand),
}

impl Command for BaseCommand {
    const USAGE: &'static str = "\
hitpool - exact hit probabilities for pools of dice

USAGE:
    hitpool [option ...] <subcommand>

SUBCOMMANDS:
    · hitpool hits - probability of exactly some number of hits
    · hitpool min-hits - probability of at least some number of hits
    · hitpool table - full hits probability table for a pool
    · hitpool distributions - every way the hits can land, and their weights
    · hitpool simulate - compare the exact odds against sampled rolls
";

    type Output = String;

    fn try_from_cli_args(mut args: Args) -> Result<Self, String> {
        let maybe_subcommand = args.subcommand()?;

        match maybe_subcommand.as_deref() {
            Some("hits") => Ok(Self::Hits(HitsCommand::try_from_cli_args(args)?)),
            Some("min-hits") => Ok(Self::MinHits(MinHitsCommand::try_from_cli_args(args)?)),
            Some("table") => Ok(Self::Table(TableCommand::try_from_cli_args(args)?)),
            Some("distributions") => Ok(Self::Distributions(
                DistributionsCommand::try_from_cli_args(args)?,
            )),
            Some("simulate") => Ok(Self::Simulate(SimulateCommand::try_from_cli_args(args)?)),
            Some(command) => Err(format!("'{}' is not a recognized command", command)),
            None => {
                args.maybe_help(Self::USAGE);
                Err("no subcommand specified".to_string())
            }
        }
    }

    fn run(self) -> Result<String, String> {
        match self {
            Self::Hits(cmd) => cmd.run().map(|out| out.to_string()),
            Self::MinHits(cmd) => cmd.run().map(|out| out.to_string()),
            Self::Table(cmd) => cmd.run().map(|out| out.to_string()),
            Self::Distributions(cmd) => cmd.run().map(|out| out.to_string()),
            Self::Simulate(cmd) => cmd.run().map(|out| out.to_string()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use claim::{assert_err, assert_ok};
    use std::ffi::OsString;

    fn args(argv: &[&str]) -> Args {
        Args::new(pico_args::Arguments::from_vec(
            argv.iter().map(OsString::from).collect(),
        ))
    }

    #[test]
    fn test_parse_base_command() {
        assert_ok!(BaseCommand::try_from_cli_args(args(&["hits", "[3:2,1:1]", "2"])));
        assert_ok!(BaseCommand::try_from_cli_args(args(&[
            "min-hits", "-f", "10", "[3:2]", "1"
        ])));
        assert_ok!(BaseCommand::try_from_cli_args(args(&["table", "[3:2]"])));
        assert_ok!(BaseCommand::try_from_cli_args(args(&[
            "simulate", "-n", "100", "--seed", "7", "[3:2]"
        ])));

        assert_err!(BaseCommand::try_from_cli_args(args(&["roll", "[3:2]"])));
        assert_err!(BaseCommand::try_from_cli_args(args(&[])));
        // leftover arguments
        assert_err!(BaseCommand::try_from_cli_args(args(&["table", "[3:2]", "1"])));
        // bad pools are rejected before anything runs
        assert_err!(BaseCommand::try_from_cli_args(args(&["table", "[7:2]"])));
        assert_err!(BaseCommand::try_from_cli_args(args(&["table", "[3:-1]"])));
        assert_err!(BaseCommand::try_from_cli_args(args(&[
            "simulate", "-n", "0", "[3:2]"
        ])));
    }

    #[test]
    fn test_hits_command() {
        let out = HitsCommand::try_from_str_args(None, None, "[3:2]", "1")
            .unwrap()
            .run()
            .unwrap();
        assert_relative_eq!(0.5, out.p);

        let out = MinHitsCommand::try_from_str_args(None, None, "[3:2]", "1")
            .unwrap()
            .run()
            .unwrap();
        assert_relative_eq!(0.75, out.p);

        let cmd = HitsCommand::try_from_str_args(None, None, "[3:2]", "3").unwrap();
        assert_err!(cmd.run());
    }

    #[test]
    fn test_limit_option() {
        // [2, 0, 0], [1, 1, 0], [1, 0, 1], [0, 1, 1], ...
        let cmd = HitsCommand::try_from_str_args(None, Some("2"), "[3:2,3:2,3:2]", "2").unwrap();
        assert_err!(cmd.run());

        let cmd = HitsCommand::try_from_str_args(None, Some("100"), "[3:2,3:2,3:2]", "2").unwrap();
        assert_ok!(cmd.run());
    }

    #[test]
    fn test_table_command() {
        let out = TableCommand::try_from_str_args(None, None, "[3:2,1:1]")
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(vec![1, 2, 2, 1], out.num_distrs);
        assert!(out.pmf.is_normalized());

        // each hit count is enumerated exactly once
        let explored = out
            .metrics
            .0
            .iter()
            .find(|(label, _)| label == "distributions explored")
            .map(|(_, value)| value.clone());
        assert_eq!(Some("6".to_string()), explored);
    }

    #[test]
    fn test_command_output_debug() {
        let out = HitsCommand::try_from_str_args(None, None, "[3:2]", "1")
            .unwrap()
            .run();
        assert!(format!("{:?}", out).contains("ProbabilityOutput"));
    }

    #[test]
    fn test_distributions_command() {
        let out = DistributionsCommand::try_from_str_args(None, None, "[3:2,1:1]", "2")
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(2, out.scored.len());
        let rendered = out.to_string();
        assert!(rendered.contains("| X X | |"));
        assert!(rendered.contains("| X | X |"));
    }
}
