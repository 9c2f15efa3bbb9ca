use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use gs_twin::{Command, DisplayTiming, GsTwin, TwinConfig};
use image::ImageFormat;

mod scenes;

use scenes::Scene;

#[derive(Parser)]
#[command(name = "gs-twin-cli")]
#[command(about = "Render reference scenes through the pico-gs digital twin", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Only show errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one scene and write the color buffer as PNG
    Render {
        #[arg(value_enum)]
        scene: Scene,

        /// Output PNG path
        #[arg(short, long)]
        out: PathBuf,

        /// Also write the Z buffer as a grayscale PNG
        #[arg(long)]
        depth: Option<PathBuf>,

        /// Attach the display controller and run it for two frames
        #[arg(long)]
        display: bool,

        /// Write the frame the display controller scanned out (implies --display)
        #[arg(long)]
        scanout: Option<PathBuf>,

        /// Print pipeline, cache and memory port counters
        #[arg(long)]
        stats: bool,
    },
    /// List the available scenes
    Scenes,
}

fn main() {
    let cli = Cli::parse();

    if !cli.quiet {
        let level = match cli.verbose {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };
        env_logger::Builder::from_default_env()
            .filter_level(level)
            .init();
    }

    let result = match cli.command {
        Commands::Render {
            scene,
            out,
            depth,
            display,
            scanout,
            stats,
        } => render(scene, &out, depth, display || scanout.is_some(), scanout, stats),
        Commands::Scenes => {
            for scene in Scene::value_variants() {
                if let Some(v) = scene.to_possible_value() {
                    let help = v.get_help().map(ToString::to_string).unwrap_or_default();
                    println!("{:<16} {help}", v.get_name());
                }
            }
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn render(
    scene: Scene,
    out: &Path,
    depth: Option<PathBuf>,
    display: bool,
    scanout: Option<PathBuf>,
    stats: bool,
) -> anyhow::Result<()> {
    let timing = DisplayTiming::default();
    let mut twin = GsTwin::new(TwinConfig {
        display: display.then_some(timing),
        ..TwinConfig::default()
    });
    if display {
        twin.execute(Command::fb_display(scenes::COLOR_BASE, 10, false))?;
    }

    scenes::render(&mut twin, scene).with_context(|| format!("rendering {scene:?}"))?;
    twin.end_frame()?;

    twin.save_png(out)
        .with_context(|| format!("writing {}", out.display()))?;
    log::info!("{scene:?} written to {}", out.display());

    if let Some(path) = depth {
        let Some(img) = twin.depth_image() else {
            bail!("no depth target bound");
        };
        img.save_with_format(&path, ImageFormat::Png)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    if display {
        // One frame to finish the one in progress, one to scan ours.
        twin.advance(2 * timing.frame_cycles());
        let scan = twin.display().context("display not attached")?;
        log::info!(
            "scanout: {} frames, {} underruns",
            scan.stats().frames,
            scan.stats().underruns
        );
        if let Some(path) = scanout {
            let Some(frame) = scan.last_frame() else {
                bail!("display captured no frame");
            };
            frame
                .save_with_format(&path, ImageFormat::Png)
                .with_context(|| format!("writing {}", path.display()))?;
        }
    }

    if stats {
        println!("{}", twin.stats());
    }
    Ok(())
}
