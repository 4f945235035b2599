use std::error::Error;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use log::info;
use padviz::prelude::*;

const FRAME: Duration = Duration::from_micros(16_667);

#[derive(Parser)]
#[command(name = "padviz")]
#[command(version = "0.1.0")]
#[command(about = "Live gamepad input visualization", long_about = None)]
struct Cli {
    /// Directory holding storage.json (defaults to the user config dir)
    #[arg(long, global = true)]
    storage_dir: Option<PathBuf>,

    /// Log at debug level
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drive the render loop against scripted controllers
    Simulate {
        /// Number of refresh ticks to run
        #[arg(short, long, default_value = "120")]
        frames: u32,

        /// Number of Xbox controllers to plug in
        #[arg(short, long, default_value = "1")]
        devices: usize,

        /// Canvas width in pixels
        #[arg(long, default_value = "1280")]
        width: u32,

        /// Canvas height in pixels
        #[arg(long, default_value = "720")]
        height: u32,

        /// Also plug in a controller no profile recognizes
        #[arg(short, long)]
        unknown: bool,
    },

    /// List stored user profiles
    Profiles {
        /// Only list profiles of this visualization (chromium, firefox,
        /// unknown or a full profile name)
        #[arg(short, long, value_parser = parse_visualization)]
        visualization: Option<VisualizationProfile>,
    },

    /// Write a user profile to a JSON file
    Export {
        /// Identity string of the controller the profile belongs to
        #[arg(long)]
        device_id: String,

        #[arg(short, long, value_parser = parse_visualization)]
        visualization: VisualizationProfile,

        /// User profile name (defaults to the last used one)
        #[arg(short, long)]
        profile: Option<String>,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },

    /// Store a user profile from a JSON file and make it the last used one
    Import {
        file: PathBuf,

        #[arg(short, long, value_parser = parse_visualization)]
        visualization: VisualizationProfile,
    },

    /// Forget every stored user profile and setting
    Reset,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logger_verbose(cli.verbose);

    match cli.command {
        Commands::Simulate {
            frames,
            devices,
            width,
            height,
            unknown,
        } => simulate(frames, devices, width, height, unknown),
        Commands::Profiles { visualization } => {
            let app = App::new(open_storage(cli.storage_dir)?);
            list_profiles(&app, visualization);
            Ok(())
        }
        Commands::Export {
            device_id,
            visualization,
            profile,
            out,
        } => {
            let mut app = App::new(open_storage(cli.storage_dir)?);
            let mut source = ScriptedSource::new();
            connect_stand_in(
                &mut app,
                &mut source,
                &device_id,
                visualization,
            )?;
            if let Some(name) = profile {
                app.select_user_profile(0, &name)?;
            }
            let path = app.export_user_profile_to(0, &out)?;
            println!("{}", path.display());
            Ok(())
        }
        Commands::Import {
            file,
            visualization,
        } => {
            let mut app = App::new(open_storage(cli.storage_dir)?);
            let mut source = ScriptedSource::new();
            connect_stand_in(&mut app, &mut source, "import", visualization)?;

            let mut slot = ImportSlot::new();
            slot.stage_file(&file);
            slot.wait();
            let document = slot.take().ok_or("nothing importable in file")?;

            let changed = app.import_user_profile(
                0,
                visualization,
                Some(&document),
            )?;
            let entry = app.registry().get(0).ok_or("device vanished")?;
            println!(
                "{} '{}' for {}",
                if changed { "Stored" } else { "Unchanged" },
                entry.user_profile,
                visualization
            );
            Ok(())
        }
        Commands::Reset => {
            let mut app = App::new(open_storage(cli.storage_dir)?);
            app.reset_all();
            Ok(())
        }
    }
}

fn open_storage(
    dir: Option<PathBuf>,
) -> Result<Rc<dyn KeyValueStore>, Box<dyn Error>> {
    let store = match dir {
        Some(dir) => FileStore::new(dir),
        None => FileStore::in_config_dir()?,
    };
    info!("Using storage at {}", store.path().display());
    Ok(Rc::new(store))
}

fn parse_visualization(s: &str) -> Result<VisualizationProfile, String> {
    match s.to_ascii_lowercase().as_str() {
        "chromium" => Ok(VisualizationProfile::XboxChromium),
        "firefox" => Ok(VisualizationProfile::XboxFirefox),
        "unknown" => Ok(VisualizationProfile::Unknown),
        _ => VisualizationProfile::from_name(s)
            .ok_or_else(|| format!("unknown visualization profile '{}'", s)),
    }
}

/// Plug in a controller rendered by `visualization` at index 0
fn connect_stand_in(
    app: &mut App,
    source: &mut ScriptedSource,
    device_id: &str,
    visualization: VisualizationProfile,
) -> padviz::Result<()> {
    let (buttons, axes) = match visualization {
        VisualizationProfile::XboxChromium => (17, 4),
        VisualizationProfile::XboxFirefox => (11, 8),
        VisualizationProfile::Unknown => (0, 0),
    };
    let snapshot = DeviceSnapshot::with_layout(0, device_id, buttons, axes);
    app.handle_device_event(DeviceEvent::Connected(snapshot), source);
    app.select_visualization(0, visualization)
}

fn list_profiles(app: &App, only: Option<VisualizationProfile>) {
    let profiles = match only {
        Some(profile) => vec![profile],
        None => VisualizationProfile::ALL.to_vec(),
    };

    for profile in profiles {
        println!("{}", profile);
        let last_used = app
            .store()
            .last_used(profile)
            .map(|p| p.profile_name().to_string());
        for (i, user_profile) in
            app.store().user_profiles(profile).iter().enumerate()
        {
            let name = user_profile.profile_name();
            let mut marks = Vec::new();
            if i == 0 {
                marks.push("default");
            }
            if last_used.as_deref() == Some(name) {
                marks.push("last used");
            }
            if marks.is_empty() {
                println!("  {}", name);
            } else {
                println!("  {} ({})", name, marks.join(", "));
            }
        }
    }
}

fn simulate(
    frames: u32,
    devices: usize,
    width: u32,
    height: u32,
    unknown: bool,
) -> Result<(), Box<dyn Error>> {
    let (event_tx, event_rx) = event_channel();
    let mut app =
        App::new(Rc::new(MemoryStore::new())).with_events(event_tx);
    let mut source = ScriptedSource::new();
    let mut surface = RecordingSurface::new(width, height);
    let mut scheduler = Scheduler::new(ManualRequester::new());

    let ids = [
        "Xbox 360 Controller (XInput STANDARD GAMEPAD)",
        "045e-028e-Microsoft X-Box 360 pad",
    ];
    for index in 0..devices {
        let id = ids[index % ids.len()];
        let mut snapshot = if index % 2 == 0 {
            DeviceSnapshot::with_layout(index, id, 17, 4)
        } else {
            DeviceSnapshot::with_layout(index, id, 11, 8)
        };
        snapshot.rumble = true;
        source.plug(snapshot);
    }
    if unknown {
        source.plug(DeviceSnapshot::with_layout(
            devices,
            "0810-0001-Twin USB Joystick",
            6,
            2,
        ));
    }

    scheduler.start();
    let start = Instant::now();
    let (mut drawn, mut skipped, mut redundant) = (0, 0, 0);

    for frame in 0..frames {
        wiggle(&mut source, frame, devices + usize::from(unknown));
        let now = start + FRAME * frame;
        match scheduler.tick(now, &mut app, &mut source, &mut surface) {
            TickOutcome::Drawn => drawn += 1,
            TickOutcome::Skipped => skipped += 1,
            TickOutcome::Redundant => redundant += 1,
        }
        surface.take_commands();
    }

    let rebuilds = event_rx
        .try_iter()
        .filter(|e| *e == AppEvent::RebuildList)
        .count();

    println!(
        "{} ticks: {} drawn, {} skipped, {} redundant, {} list rebuilds",
        frames, drawn, skipped, redundant, rebuilds
    );
    println!("average fps: {:.1}", scheduler.average_fps());
    println!(
        "rumbles: {}, requests: {}",
        source.rumbles().len(),
        scheduler.requester().requested()
    );

    for entry in app.registry().entries() {
        println!(
            "\nDevice {} '{}' via {} / '{}'",
            entry.index(),
            entry.snapshot.id,
            entry.visualization,
            entry.user_profile
        );
        print!("{}", entry.input_report());
    }

    Ok(())
}

/// Sweep sticks and cycle buttons so every frame carries new input
fn wiggle(source: &mut ScriptedSource, frame: u32, devices: usize) {
    let phase = frame as f32 / 30.0;
    for index in 0..devices {
        let Some(snapshot) = source.snapshot_mut(index) else {
            continue;
        };
        for axis in 0..snapshot.axes.len() {
            snapshot.set_axis(axis, (phase + axis as f32).sin());
        }
        let buttons = snapshot.buttons.len();
        if buttons > 0 {
            let active = frame as usize / 15 % buttons;
            for button in 0..buttons {
                let state = if button == active {
                    ButtonState::pressed(1.0)
                } else {
                    ButtonState::released()
                };
                snapshot.set_button(button, state);
            }
        }
    }
}
