use std::env;
use std::error::Error;
use std::fs;
use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use tracing::{debug, info};

use scoreline::data::{self, HistoryColumns};
use scoreline::export;
use scoreline::linear::glm::FitConfig;
use scoreline::mc;
use scoreline::model::ModelHandle;
use scoreline::predict::Fixture;
use scoreline::print;
use scoreline::DEFAULT_MAX_GOALS;

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// CSV of historical results to train on
    #[clap(short = 'f', long)]
    history: Option<PathBuf>,

    /// CSV of previously exported parameters, in lieu of training
    #[clap(short = 'p', long)]
    params: Option<PathBuf>,

    /// history headers are in Spanish
    #[clap(long)]
    spanish_headers: bool,

    /// maximum IRLS iterations
    #[clap(long, default_value_t = FitConfig::default().max_iterations)]
    max_iterations: u64,

    /// relative deviance change at which the fit is deemed converged
    #[clap(long, default_value_t = FitConfig::default().tolerance)]
    tolerance: f64,

    /// home team to predict
    #[clap(long)]
    home: Option<String>,

    /// away team to predict
    #[clap(long)]
    away: Option<String>,

    /// maximum goals per side in the scoregrid
    #[clap(short = 'g', long, default_value_t = DEFAULT_MAX_GOALS)]
    max_goals: u8,

    /// Monte Carlo trials to cross-check the prediction with
    #[clap(long)]
    trials: Option<u64>,

    /// Monte Carlo seed
    #[clap(long, default_value_t = 42)]
    seed: u64,

    /// number of teams to list in each ranking
    #[clap(short = 'n', long)]
    top: Option<usize>,

    /// teams to compare side by side
    #[clap(long, value_delimiter = ',')]
    compare: Vec<String>,

    /// team to profile
    #[clap(long)]
    profile: Option<String>,

    /// matchday fixture, as home:away (may be repeated)
    #[clap(long = "fixture")]
    fixtures: Vec<Fixture>,

    /// directory to export parameters, rankings and matchday predictions to
    #[clap(short = 'o', long)]
    output: Option<PathBuf>,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        match (&self.history, &self.params) {
            (None, None) => bail!("either a history or a parameters file must be specified"),
            (Some(_), Some(_)) => bail!("history and parameters files are mutually exclusive"),
            _ => {}
        }
        if self.home.is_some() != self.away.is_some() {
            bail!("both home and away teams must be specified");
        }
        if self.trials.is_some() && self.home.is_none() {
            bail!("Monte Carlo trials require a prediction");
        }
        self.fit_config().validate()?;
        Ok(())
    }

    fn fit_config(&self) -> FitConfig {
        FitConfig {
            max_iterations: self.max_iterations,
            tolerance: self.tolerance,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    if env::var("RUST_BACKTRACE").is_err() {
        env::set_var("RUST_BACKTRACE", "full")
    }
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info")
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    args.validate()?;
    debug!("args: {args:?}");

    let mut handle = ModelHandle::default();
    if let Some(path) = &args.history {
        let columns = if args.spanish_headers {
            HistoryColumns::spanish()
        } else {
            HistoryColumns::default()
        };
        let history = data::load_history(path, &columns)?;
        let model = handle.train(&history, &args.fit_config())?;
        if let Some(fit) = model.fit() {
            info!(
                "regression:\n{}",
                Console::default().render(&fit.tabulate(model.params.teams()))
            );
        }
    } else if let Some(path) = &args.params {
        handle.install_parameters(export::load_parameters(path)?);
    }

    info!(
        "summary:\n{}",
        Console::default().render(&print::tabulate_summary(&handle.summary()?))
    );
    let attack = handle.rank_attack(args.top)?;
    let defense = handle.rank_defense(args.top)?;
    info!(
        "attack ranking:\n{}",
        Console::default().render(&print::tabulate_ranking("Attack", &attack))
    );
    info!(
        "defense ranking:\n{}",
        Console::default().render(&print::tabulate_ranking("Defense", &defense))
    );

    if !args.compare.is_empty() {
        let comparison = handle.compare(args.compare.as_slice())?;
        info!(
            "comparison:\n{}",
            Console::default().render(&print::tabulate_comparison(&comparison))
        );
    }

    if let Some(team) = &args.profile {
        let profile = handle.team_profile(team)?;
        info!(
            "profile:\n{}",
            Console::default().render(&print::tabulate_profile(&profile))
        );
    }

    if let (Some(home), Some(away)) = (&args.home, &args.away) {
        let prediction = handle.predict(home, away, args.max_goals)?;
        info!(
            "prediction:\n{}",
            Console::default().render(&print::tabulate_prediction(&prediction))
        );
        info!(
            "scoregrid:\n{}",
            Console::default().render(&print::tabulate_scoregrid(&prediction))
        );
        if let Some(trials) = args.trials {
            let tally = mc::monte_carlo_outcome(
                prediction.expected_goals_home,
                prediction.expected_goals_away,
                trials,
                args.seed,
            );
            info!(
                "simulated {trials} matches: home {:.1}%, draw {:.1}%, away {:.1}%",
                tally.home_win_fraction() * 100.0,
                tally.draw_fraction() * 100.0,
                tally.away_win_fraction() * 100.0
            );
        }
    }

    let matchday = handle.simulate_matchday(&args.fixtures, args.max_goals)?;
    if !matchday.is_empty() {
        info!(
            "matchday:\n{}",
            Console::default().render(&print::tabulate_matchday(&matchday))
        );
    }

    if let Some(dir) = &args.output {
        fs::create_dir_all(dir)?;
        handle.export_parameters(dir.join("parameters.csv"))?;
        export::save_rankings(dir.join("attack_ranking.csv"), &attack)?;
        export::save_rankings(dir.join("defense_ranking.csv"), &defense)?;
        if !matchday.is_empty() {
            export::save_matchday(dir.join("matchday.csv"), &matchday)?;
        }
    }

    Ok(())
}
