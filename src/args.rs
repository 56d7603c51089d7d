use clap::Parser;

/// Command line options. Options given here override values from `--config`.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None, name = "phylosim")]
pub struct Args {
    /// Path to a YAML settings file.
    #[clap(short, long)]
    pub config: Option<String>,

    /// Write the effective settings to this file.
    #[clap(long)]
    pub dump_config: Option<String>,

    /// Seed of the random stream. Integers are used as integer seeds.
    #[clap(short = 'r', long, allow_hyphen_values = true)]
    pub seed: Option<String>,

    /// Birth rate (default 1.0).
    #[clap(short, long)]
    pub birth: Option<f64>,

    /// Death rate (default half the birth rate).
    #[clap(short, long)]
    pub death: Option<f64>,

    /// Maximum time stopping criterion.
    #[clap(short = 't', long)]
    pub max_time: Option<f64>,

    /// Minimum number of live leaves stopping criterion (default 10, 0 disables).
    #[clap(short = 'l', long)]
    pub min_leaves: Option<usize>,

    /// Expected number of extra descendants per birth (default 0.0).
    #[clap(long)]
    pub lam: Option<f64>,

    /// Maximum number of attempts after total extinction.
    #[clap(long)]
    pub max_attempts: Option<usize>,

    /// Return extinct trees instead of retrying.
    #[clap(long, default_value_t = false)]
    pub keep_extinct: bool,

    /// Remove extinct lineages.
    #[clap(long, default_value_t = false)]
    pub prune: bool,

    /// Number of characters to simulate (default 0).
    #[clap(short, long)]
    pub num_chars: Option<usize>,

    /// Mutation gamma shape (default 5.0).
    #[clap(long)]
    pub k_mut: Option<f64>,

    /// Mutation gamma scale (default 1.0).
    #[clap(long)]
    pub th_mut: Option<f64>,

    /// Damping of change rates by prior changes (default 1.05).
    #[clap(long)]
    pub e_mut: Option<f64>,

    /// Transfer gamma shape; enables horizontal transfer.
    #[clap(long)]
    pub k_hgt: Option<f64>,

    /// Transfer gamma scale (default `th_mut`).
    #[clap(long)]
    pub th_hgt: Option<f64>,

    /// Probability of discarding each leaf when simulating bad sampling.
    #[clap(short, long, conflicts_with = "sample_count")]
    pub sampling: Option<f64>,

    /// Exact number of leaves to discard when simulating bad sampling.
    #[clap(long)]
    pub sample_count: Option<usize>,

    /// Leaf label model.
    #[clap(short = 'x', long, value_parser = ["none", "enum", "human", "bio"])]
    pub labels: Option<String>,

    /// Output format.
    #[clap(short, long, value_parser = ["newick", "nexus", "wordlist"])]
    pub output: Option<String>,

    /// Number of trees to generate.
    #[clap(long)]
    pub n_trees: Option<usize>,

    /// Write each tree to its own file in this directory instead of stdout.
    #[clap(long)]
    pub outdir: Option<String>,

    /// File name prefix of trees written to `--outdir`.
    #[clap(long, default_value = "tree")]
    pub name: String,

    /// Path to log file.
    #[clap(long, default_value = "phylosim.log")]
    pub log_file: String,

    /// Increase log verbosity.
    #[clap(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable the progress bar.
    #[clap(long, default_value_t = false)]
    pub disable_progress_bar: bool,

    /// Number of threads for batch generation.
    #[clap(long)]
    pub threads: Option<usize>,
}
