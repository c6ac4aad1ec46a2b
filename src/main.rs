//! dsax - Dark Souls III Audio Extracting Tool
//!
//! Console entry point. The program is a thin orchestrator over four external
//! extraction utilities, run strictly in sequence:
//!
//! 1. BinderTool - unpack the audio-bearing `*.bdt` archives
//! 2. fsbext - decrypt the FSB sound banks under the game's `sound/` folder
//! 3. fsb5_split - split multitrack FSBs into per-track files
//! 4. fsb_aud_extr - decode each track to WAV
//!
//! Every stage is idempotent: work whose output artifact already exists is
//! skipped, so an interrupted run can simply be restarted.
//!
//! # Execution Flow
//!
//! 1. Parse CLI flags; zero arguments means interactive menu mode
//! 2. Load optional settings from `DSAX Data/DSAX Settings.yaml`
//! 3. Initialize logging -> logs/dsax.<date>
//! 4. Build the tokio runtime (subprocess execution)
//! 5. Interactive mode only: run the configuration menu, re-prompt for the
//!    game directory if it is invalid
//! 6. Create the output tree (raw/, wav/, raw/sound/) and run the enabled
//!    stages in order
//! 7. Interactive mode only: wait for a final keypress

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::Parser;
use dsax::cli::Args;
use dsax::models::DEFAULT_GAME_DIR;
use dsax::{ConfigManager, ExtractionService, PipelineConfig, ToolKit, APP_NAME, VERSION};

fn main() -> Result<()> {
    // Bare invocation drops into the interactive menu.
    let interactive = std::env::args().len() <= 1;
    let args = Args::parse();

    let config_manager = ConfigManager::new("DSAX Data")?;
    let settings = config_manager.load_settings()?;

    // Console logging would trample the progress bars, so it only comes on
    // in debug mode; the rotating file log is always active.
    let debug_mode = args.debug || settings.dsax_settings.debug_mode;
    let _guard = dsax::logging::setup_logging("logs", "dsax", debug_mode, debug_mode)?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    // Create tokio runtime for subprocess execution. The pipeline itself is
    // strictly sequential; the runtime just hosts the process futures.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(2)
        .thread_name("dsax-worker")
        .build()?;

    // CLI flags win over the settings file, which wins over the defaults.
    let game_dir = args
        .input
        .clone()
        .or_else(|| settings.game_path().map(Utf8PathBuf::from))
        .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_GAME_DIR));
    let output_root = args
        .output
        .clone()
        .or_else(|| settings.output_path().map(Utf8PathBuf::from))
        .unwrap_or_else(|| Utf8PathBuf::from("output"));
    let tools_dir = settings
        .tools_path()
        .map(Utf8PathBuf::from)
        .unwrap_or_else(|| Utf8PathBuf::from("dependencies"));

    let mut config = PipelineConfig::new(game_dir, output_root, args.stage_flags(), tools_dir);
    tracing::info!(
        "Configuration: game={}, output={}, tools={}, stages={:?}",
        config.game_dir,
        config.layout.output,
        config.tools_dir,
        config.stages
    );

    if interactive {
        dsax::ui::run_menu(&mut config);
        // Unpack and decrypt read the game directory; make sure it is real
        // before starting a long run.
        if config.stages.unpack || config.stages.decrypt {
            dsax::ui::ensure_game_dir(&mut config);
        }
    }

    if config.stages.any() {
        println!(
            "\n\"Very well. Then touch the data within me. \
             Take nourishment from these sovereignless sounds...\"\n"
        );

        config
            .layout
            .ensure_dirs()
            .with_context(|| format!("Failed to create output tree at {}", config.layout.output))?;

        let service = ExtractionService::new(ToolKit::new(&config.tools_dir));
        runtime.block_on(service.run(&config))?;

        if interactive {
            // Remember the paths the user picked for next time.
            let mut updated = settings.clone();
            updated.dsax_settings.game_path = config.game_dir.to_string();
            updated.dsax_settings.output_path = config.layout.output.to_string();
            if let Err(err) = config_manager.save_settings(&updated) {
                tracing::warn!("Could not save settings: {:#}", err);
            }
        }
    }

    println!("\"Farewell, ashen one.\"");
    if interactive {
        dsax::ui::wait_for_enter();
    }

    runtime.shutdown_timeout(std::time::Duration::from_secs(5));
    tracing::info!("Shutdown complete");
    Ok(())
}
