use std::path::PathBuf;

use anyhow::Context;
use astrovel_core::{Body, Engine, EngineConfig, EphemerisSelection};
use astrovel_frames::{ReferenceFrame, convert_velocity};
use astrovel_time::{Instant, TimeScale};
use clap::{Args, Parser, Subcommand};

const DEFAULT_TIME: &str = "2025-08-09T00:00:00";
const DEFAULT_EPHEM: &str = "de440";

#[derive(Parser)]
#[command(
    name = "astrovel",
    about = "Relative body velocities from JPL ephemerides",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// With no subcommand, behaves as `earth-velocity`
    #[command(flatten)]
    earth: EarthVelocityArgs,

    /// Directory holding `<ephem>.bsp` kernels
    #[arg(long, global = true, env = "ASTROVEL_KERNEL_DIR", default_value = "kernels/data")]
    kernel_dir: PathBuf,

    /// Leap second kernel (naif0012.tls); built-in table if omitted
    #[arg(long, global = true, env = "ASTROVEL_LSK")]
    lsk: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Velocity of Earth relative to the Sun
    EarthVelocity(EarthVelocityArgs),
    /// Velocity of one body relative to another in a chosen frame
    RelativeVelocity {
        /// Target body name or NAIF code
        target: Body,
        /// Observer body name or NAIF code
        observer: Body,
        /// Calendar time
        #[arg(long, default_value = DEFAULT_TIME)]
        time: String,
        /// Ephemeris model name or .bsp path
        #[arg(long, default_value = DEFAULT_EPHEM)]
        ephem: String,
        /// Time scale of --time
        #[arg(long, default_value = "tt")]
        scale: TimeScale,
        /// Output frame
        #[arg(long, default_value = "icrs")]
        frame: ReferenceFrame,
    },
    /// Re-express a velocity vector in another frame
    ConvertVelocity {
        /// Velocity components in km/s
        #[arg(num_args = 3, allow_negative_numbers = true,
              default_values_t = [-25.841, -244.657, 275.938])]
        velocity: Vec<f64>,
        /// Frame of the input velocity
        #[arg(long, default_value = "galactic")]
        from: ReferenceFrame,
        /// Frame of the output velocity
        #[arg(long, default_value = "icrs")]
        to: ReferenceFrame,
    },
}

#[derive(Args)]
struct EarthVelocityArgs {
    /// Calendar time, e.g. 2025-08-09T00:00:00
    #[arg(default_value = DEFAULT_TIME)]
    time: String,
    /// Ephemeris model name (de440, de430, ...) or .bsp path
    #[arg(default_value = DEFAULT_EPHEM)]
    ephem: String,
    /// Time scale of TIME
    #[arg(long, default_value = "tt")]
    scale: TimeScale,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn load_engine(cli: &Cli) -> anyhow::Result<Engine> {
    let mut config = EngineConfig::new(&cli.kernel_dir);
    if let Some(lsk) = &cli.lsk {
        config = config.with_lsk(lsk);
    }
    log::debug!("kernel directory {}", cli.kernel_dir.display());
    Engine::new(config).context("failed to initialize ephemeris engine")
}

fn parse_instant(text: &str, scale: TimeScale) -> anyhow::Result<Instant> {
    Instant::parse(text, scale).with_context(|| format!("invalid {scale} time '{text}'"))
}

fn format_vector(v: &[f64; 3]) -> String {
    format!("[{:.9}, {:.9}, {:.9}]", v[0], v[1], v[2])
}

fn earth_velocity(cli: &Cli, args: &EarthVelocityArgs) -> anyhow::Result<()> {
    let instant = parse_instant(&args.time, args.scale)?;
    let selection: EphemerisSelection = args.ephem.parse()?;
    let engine = load_engine(cli)?;
    let rel = engine.earth_velocity_wrt_sun(&instant, &selection)?;
    let [vx, vy, vz] = rel.velocity_km_s;
    // Echo the inputs as given.
    println!("{}: {}, ephem: {}", args.scale, args.time, args.ephem);
    println!("vx, vy, vz (km/s): {vx:.9}, {vy:.9}, {vz:.9}");
    println!("speed (km/s): {:.9}", rel.speed_km_s);
    Ok(())
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        None => earth_velocity(cli, &cli.earth),
        Some(Commands::EarthVelocity(args)) => earth_velocity(cli, args),
        Some(Commands::RelativeVelocity {
            target,
            observer,
            time,
            ephem,
            scale,
            frame,
        }) => {
            let instant = parse_instant(time, *scale)?;
            let selection: EphemerisSelection = ephem.parse()?;
            let engine = load_engine(cli)?;
            let rel = engine.relative_velocity(*target, *observer, &instant, &selection, *frame)?;
            println!("{scale}: {time}, ephem: {ephem}, frame: {frame}");
            println!(
                "v_{target} wrt {observer} (km/s): {}",
                format_vector(&rel.velocity_km_s)
            );
            println!("speed (km/s): {:.9}", rel.speed_km_s);
            Ok(())
        }
        Some(Commands::ConvertVelocity { velocity, from, to }) => {
            let v: [f64; 3] = velocity
                .as_slice()
                .try_into()
                .context("expected exactly three velocity components")?;
            let out = convert_velocity(v, *from, *to)?;
            println!("v_{from} (km/s): {}", format_vector(&v));
            println!("v_{to} (km/s):   {}", format_vector(&out));
            Ok(())
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
