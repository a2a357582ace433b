mod config;
mod plot;
mod server;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use eqgft_core::constants::M_EQGFT;
use eqgft_core::field::{DEFAULT_CORE_RADIUS, DEFAULT_GRID_EXTENT, DEFAULT_GRID_SIDE};
use eqgft_core::sensitivity::DISCOVERY_SIGMA;
use eqgft_core::{
    AnalysisResult, ExperimentConfig, SensitivityCurve, SimulationResult, analyze,
    critical_field, default_sensitivity_curve, events_for_significance, generate_q_field,
    hopf_ring, hopfion_field, polarization_asymmetry, zitterbewegung_amplitude,
    zitterbewegung_frequency,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::Serialize;

use crate::config::Config;

/// Example counts analysed by the report.
const REPORT_COUNTS: (u64, u64) = (25_380, 24_620);

const DEFAULT_PLOT: &str = "eqgft_sensitivity.svg";

#[derive(Parser)]
#[command(name = "eqgft", about = "EQGFT field generator, experiment simulator and dashboard")]
struct Cli {
    /// TOML config file (falls back to $EQGFT_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predictions, hopfion, simulated run, example analysis and sensitivity plot
    Report {
        /// Seed for the simulated run
        #[arg(long)]
        seed: Option<u64>,

        /// Where to write the sensitivity plot
        #[arg(long, default_value = DEFAULT_PLOT)]
        plot: PathBuf,
    },

    /// Simulate one polarization-asymmetry counting run
    Simulate {
        #[arg(long)]
        events: Option<u64>,

        #[arg(long, allow_negative_numbers = true)]
        kappa: Option<f64>,

        #[arg(long)]
        sys_error: Option<f64>,

        #[arg(long)]
        seed: Option<u64>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Analyse raw positive/negative counts
    Analyze {
        #[arg(long)]
        plus: u64,

        #[arg(long)]
        minus: u64,

        #[arg(long)]
        sys_error: Option<f64>,

        #[arg(long)]
        json: bool,
    },

    /// Print random S³ field samples as JSON
    Field {
        #[arg(long, default_value_t = 1000)]
        samples: usize,

        #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
        amp: f64,

        #[arg(long)]
        seed: Option<u64>,

        /// Also emit the reference ring with this many points
        #[arg(long)]
        ring: Option<usize>,
    },

    /// Generate the analytic hopfion and estimate its topological charge
    Hopfion {
        #[arg(long, default_value_t = DEFAULT_GRID_SIDE)]
        side: usize,

        #[arg(long, default_value_t = DEFAULT_GRID_EXTENT)]
        extent: f64,

        #[arg(long, default_value_t = DEFAULT_CORE_RADIUS)]
        radius: f64,

        /// Print the full lattice as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write the significance-vs-events plot
    Sensitivity {
        #[arg(long, default_value = DEFAULT_PLOT)]
        output: PathBuf,

        #[arg(long, allow_negative_numbers = true)]
        kappa: Option<f64>,
    },

    /// Serve the websocket dashboard
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,

        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
}

fn init_tracing(verbose: bool, default_level: tracing::Level) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(default_level.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn make_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_os_rng(),
    }
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("failed to serialize output")?
    );
    Ok(())
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if matches!(cli.command, Commands::Serve { .. }) {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    init_tracing(cli.verbose, level);

    let config = config::load(cli.config.as_deref())?;

    match &cli.command {
        Commands::Report { seed, plot } => cmd_report(&config, *seed, plot),
        Commands::Simulate {
            events,
            kappa,
            sys_error,
            seed,
            json,
        } => {
            let experiment = ExperimentConfig {
                n_events: events.unwrap_or(config.experiment.n_events),
                kappa: kappa.unwrap_or(config.experiment.kappa),
                systematic_error: sys_error.unwrap_or(config.experiment.systematic_error),
            };
            cmd_simulate(&experiment, *seed, *json)
        }
        Commands::Analyze {
            plus,
            minus,
            sys_error,
            json,
        } => cmd_analyze(
            *plus,
            *minus,
            sys_error.unwrap_or(config.experiment.systematic_error),
            *json,
        ),
        Commands::Field {
            samples,
            amp,
            seed,
            ring,
        } => cmd_field(*samples, *amp, *seed, *ring),
        Commands::Hopfion {
            side,
            extent,
            radius,
            json,
        } => cmd_hopfion(*side, *extent, *radius, *json),
        Commands::Sensitivity { output, kappa } => {
            cmd_sensitivity(kappa.unwrap_or(config.experiment.kappa), output)
        }
        Commands::Serve {
            host,
            port,
            static_dir,
        } => {
            let mut server = config.server.clone();
            if let Some(host) = host {
                server.host = host.clone();
            }
            if let Some(port) = port {
                server.port = *port;
            }
            if let Some(dir) = static_dir {
                server.static_dir = dir.clone();
            }
            server::run(&server, config.experiment.clone()).await
        }
    }
}

fn print_simulation(sim: &SimulationResult) {
    println!(
        "   Measured asymmetry: {:.3e} ± {:.1e}",
        sim.a_meas, sim.total_error
    );
    println!("   Significance vs QED: {:.1}σ", sim.significance_vs_qed);
    println!(
        "   Consistent with EQGFT: {}",
        yes_no(sim.consistent_with_eqgft)
    );
}

fn print_analysis(analysis: &AnalysisResult) {
    let [lo, hi] = analysis.confidence_interval_95;
    let [null_lo, null_hi] = analysis.null_band_95;
    println!(
        "   Asymmetry: {:.3e} ± {:.1e}",
        analysis.asymmetry, analysis.total_error
    );
    println!("   95% CI: [{lo:.3e}, {hi:.3e}]");
    println!("   Null band (A=0, 95%): [{null_lo:.3e}, {null_hi:.3e}]");
    println!(
        "   EQGFT: {:.3e} -> {}",
        analysis.eqgft_prediction,
        if analysis.consistent_with_eqgft {
            "inside interval"
        } else {
            "outside interval"
        }
    );
    if analysis.consistent_with_qed {
        println!("   QED (A=0): compatible");
    } else {
        println!(
            "   QED (A=0): excluded ({:.1}σ)",
            analysis.sigma_deviation_from_qed
        );
    }
}

/// Discovery reach: analytic event count for 5σ, and whether the plotted
/// sweep gets there.
fn print_reach(curve: &SensitivityCurve, indent: &str) {
    println!(
        "{indent}Events needed for {DISCOVERY_SIGMA}σ: {:.3e}",
        events_for_significance(curve.asymmetry, DISCOVERY_SIGMA)
    );
    match curve.first_reaching(DISCOVERY_SIGMA) {
        Some(n) => println!("{indent}Sweep reaches {DISCOVERY_SIGMA}σ at N = {n:.3e}"),
        None => println!("{indent}Sweep stays below {DISCOVERY_SIGMA}σ"),
    }
}

fn cmd_report(config: &Config, seed: Option<u64>, plot: &Path) -> Result<()> {
    let rule = "=".repeat(60);
    println!("{rule}");
    println!("EQGFT v2.2 - theoretical and experimental check");
    println!("{rule}");

    let kappa = config.experiment.kappa;
    println!("\nTheoretical predictions:");
    println!(
        " - Zitterbewegung frequency: {:.3e} Hz",
        zitterbewegung_frequency()
    );
    println!(
        " - Zitterbewegung amplitude: {:.3e} m",
        zitterbewegung_amplitude()
    );
    println!(" - Critical field E_crit:   {:.3e} V/m", critical_field(M_EQGFT));
    println!(
        " - Polarization asymmetry:  {:.3e}",
        polarization_asymmetry(kappa)
    );

    println!("\nTopological soliton (hopfion):");
    match hopfion_field(DEFAULT_GRID_SIDE, DEFAULT_GRID_EXTENT, DEFAULT_CORE_RADIUS) {
        Ok(field) => println!(
            "   Generated {} lattice points, N_H ≈ {:.2}",
            field.len(),
            field.topological_charge().abs()
        ),
        Err(e) => println!("   skipped: {e}"),
    }

    println!(
        "\nSimulated experiment ({} events):",
        config.experiment.n_events
    );
    let mut rng = make_rng(seed);
    let sim = config
        .experiment
        .simulate(&mut rng)
        .context("simulation failed")?;
    print_simulation(&sim);

    let (plus, minus) = REPORT_COUNTS;
    println!("\nData analysis ({plus} / {minus} counts):");
    let analysis = analyze(plus, minus, config.experiment.systematic_error)
        .context("analysis failed")?;
    print_analysis(&analysis);

    println!("\nSensitivity curve:");
    let curve = default_sensitivity_curve(polarization_asymmetry(kappa))?;
    print_reach(&curve, "   ");
    match plot::render_sensitivity(&curve, plot) {
        Ok(()) => println!("   saved: {}", plot.display()),
        Err(e) => {
            tracing::warn!("sensitivity plot failed: {e:#}");
            println!("   skipped: {e}");
        }
    }

    println!("\nDone.");
    Ok(())
}

fn cmd_simulate(experiment: &ExperimentConfig, seed: Option<u64>, json: bool) -> Result<()> {
    let mut rng = make_rng(seed);
    let sim = experiment.simulate(&mut rng).context("simulation failed")?;
    if json {
        return print_json(&sim);
    }
    println!(
        "events: {} (+{} / -{})",
        sim.n_events, sim.n_plus, sim.n_minus
    );
    println!("true asymmetry: {:.3e}", sim.a_true);
    print_simulation(&sim);
    println!("   Consistent with QED: {}", yes_no(sim.consistent_with_qed));
    Ok(())
}

fn cmd_analyze(plus: u64, minus: u64, sys_error: f64, json: bool) -> Result<()> {
    let analysis = analyze(plus, minus, sys_error).context("analysis failed")?;
    if json {
        return print_json(&analysis);
    }
    print_analysis(&analysis);
    Ok(())
}

#[derive(Serialize)]
struct FieldOutput {
    samples: Vec<[f64; 4]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ring: Option<Vec<[f64; 3]>>,
}

fn cmd_field(samples: usize, amp: f64, seed: Option<u64>, ring: Option<usize>) -> Result<()> {
    let mut rng = make_rng(seed);
    let output = FieldOutput {
        samples: generate_q_field(samples, amp, &mut rng)
            .into_iter()
            .map(|q| q.to_array())
            .collect(),
        ring: ring.map(hopf_ring),
    };
    print_json(&output)
}

fn cmd_hopfion(side: usize, extent: f64, radius: f64, json: bool) -> Result<()> {
    let field = hopfion_field(side, extent, radius).context("hopfion generation failed")?;
    if json {
        return print_json(&field);
    }
    println!("lattice:  {side}³ over [-{extent}, {extent}]³");
    println!("spacing:  {:.4}", field.spacing);
    println!("points:   {}", field.len());
    println!("N_H:      {:.3}", field.topological_charge().abs());
    Ok(())
}

fn cmd_sensitivity(kappa: f64, output: &Path) -> Result<()> {
    let curve = default_sensitivity_curve(polarization_asymmetry(kappa))?;
    plot::render_sensitivity(&curve, output)?;
    println!("saved: {}", output.display());
    print_reach(&curve, "");
    Ok(())
}
