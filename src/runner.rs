use anyhow::Result;

use indicatif::{ProgressBar, ProgressStyle};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::args::Args;
use crate::config::Settings;
use crate::core::{ExtinctionPolicy, RandomStream, Sampling, Seed};
use crate::readwrite::{OutputFormat, TreeIO};
use crate::simulation::{Simulation, simulate_tree, tree_stream};

pub struct Runner {
    args: Args,
    settings: Settings,
    stream: RandomStream,
    simulations: Vec<Simulation>,
}

impl Runner {
    pub fn new(args: Args) -> Result<Runner> {
        Self::setup_logger(&args)?;
        #[cfg(feature = "parallel")]
        Self::setup_rayon(&args)?;

        let settings = Self::load_settings(&args)?;
        settings.validate()?;
        if let Some(path) = &args.dump_config {
            settings.write_to_file(path)?;
        }

        let stream = RandomStream::new(settings.parameters.seed.as_ref());

        Ok(Self {
            args,
            settings,
            stream,
            simulations: Vec::new(),
        })
    }

    pub fn start(&mut self) -> Result<()> {
        self.run()?;
        self.finish()
    }

    pub fn simulations(&self) -> &[Simulation] {
        &self.simulations
    }

    /// Setup logging level and file
    fn setup_logger(args: &Args) -> Result<()> {
        let log_level = match args.verbose {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };
        simple_logging::log_to_file(args.log_file.as_str(), log_level)?;
        Ok(())
    }

    /// Setup rayon thread pool
    #[cfg(feature = "parallel")]
    fn setup_rayon(args: &Args) -> Result<()> {
        if let Some(n_threads) = args.threads {
            log::info!("Setting number of threads to {}.", n_threads);
            rayon::ThreadPoolBuilder::new()
                .num_threads(n_threads)
                .build_global()?;
        }
        Ok(())
    }

    /// Load settings from file, if any, and apply command line overrides
    fn load_settings(args: &Args) -> Result<Settings> {
        let mut settings = match &args.config {
            Some(path) => Settings::read_from_file(path)?,
            None => Settings::default(),
        };
        Self::apply_args(&mut settings, args)?;
        log::info!("Loaded settings\n{}", settings);
        Ok(settings)
    }

    fn apply_args(settings: &mut Settings, args: &Args) -> Result<()> {
        let parameters = &mut settings.parameters;
        if let Some(seed) = &args.seed {
            parameters.seed = Some(seed.parse::<Seed>().unwrap_or_else(|never| match never {}));
        }
        if let Some(birth) = args.birth {
            parameters.birth = birth;
        }
        if args.death.is_some() {
            parameters.death = args.death;
        }
        if args.max_time.is_some() {
            parameters.max_time = args.max_time;
        }
        if let Some(min_leaves) = args.min_leaves {
            parameters.min_leaves = (min_leaves > 0).then_some(min_leaves);
        }
        if let Some(lam) = args.lam {
            parameters.lam = lam;
        }
        if let Some(max_attempts) = args.max_attempts {
            parameters.max_attempts = max_attempts;
        }
        if args.keep_extinct {
            parameters.extinction = ExtinctionPolicy::Keep;
        }
        if args.prune {
            parameters.prune = true;
        }
        if let Some(num_chars) = args.num_chars {
            parameters.num_chars = num_chars;
        }
        if let Some(k_mut) = args.k_mut {
            parameters.k_mut = k_mut;
        }
        if let Some(th_mut) = args.th_mut {
            parameters.th_mut = th_mut;
        }
        if let Some(e_mut) = args.e_mut {
            parameters.e_mut = e_mut;
        }
        if args.k_hgt.is_some() {
            parameters.k_hgt = args.k_hgt;
        }
        if args.th_hgt.is_some() {
            parameters.th_hgt = args.th_hgt;
        }
        if let Some(fraction) = args.sampling {
            parameters.sampling = Some(Sampling::Fraction(fraction));
        }
        if let Some(count) = args.sample_count {
            parameters.sampling = Some(Sampling::Count(count));
        }
        if let Some(labels) = &args.labels {
            parameters.labels = labels.parse()?;
        }
        if let Some(output) = &args.output {
            settings.format = output.parse::<OutputFormat>()?;
        }
        if let Some(n_trees) = args.n_trees {
            settings.n_trees = n_trees;
        }
        Ok(())
    }

    fn progress_bar(&self) -> Result<Option<ProgressBar>> {
        if self.args.disable_progress_bar || self.settings.n_trees < 2 {
            return Ok(None);
        }
        let bar = ProgressBar::new(self.settings.n_trees as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{bar:40}] {pos:>7}/{len:7} [{elapsed_precise} / {duration_precise}] {msg}")?
                .progress_chars("=> "),
        );
        Ok(Some(bar))
    }

    fn run(&mut self) -> Result<()> {
        let bar = self.progress_bar()?;
        let parameters = &self.settings.parameters;
        let stream = &self.stream;

        let simulate = |index: usize| {
            log::debug!("Simulating tree {index}...");
            let simulation = simulate_tree(parameters, &mut tree_stream(stream, index));
            if let Some(bar) = bar.as_ref() {
                bar.inc(1);
            }
            simulation
        };

        #[cfg(feature = "parallel")]
        let simulations: crate::errors::Result<Vec<Simulation>> =
            (0..self.settings.n_trees).into_par_iter().map(simulate).collect();
        #[cfg(not(feature = "parallel"))]
        let simulations: crate::errors::Result<Vec<Simulation>> =
            (0..self.settings.n_trees).map(simulate).collect();

        if let Some(bar) = bar {
            bar.finish_with_message("Done.");
        }
        self.simulations = simulations?;

        for (index, simulation) in self.simulations.iter().enumerate() {
            log::info!(
                r###"
        tree={index}
        leaves={}
        attempts={}
        elapsed={}
        extinct={}
        removed={}"###,
                simulation.tree.num_leaves(),
                simulation.attempts,
                simulation.elapsed,
                simulation.extinct,
                simulation.removed,
            );
        }
        log::info!("Finished simulation.");
        Ok(())
    }

    fn finish(&self) -> Result<()> {
        let format = self.settings.format;
        match &self.args.outdir {
            Some(outdir) => {
                let outdir = Path::new(outdir);
                fs::create_dir_all(outdir)?;
                for (index, simulation) in self.simulations.iter().enumerate() {
                    let path = outdir.join(format!(
                        "{}_{index}.{}",
                        self.args.name,
                        format.extension()
                    ));
                    log::info!("Storing tree {index} in {}...", path.display());
                    simulation.tree.write_to_file(&path, format)?;
                }
            }
            None => {
                let stdout = io::stdout();
                let mut handle = stdout.lock();
                for simulation in &self.simulations {
                    simulation.tree.write(&mut handle, format)?;
                }
                handle.flush()?;
            }
        }
        Ok(())
    }
}
