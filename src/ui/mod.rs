//! Interactive console menu, shown when the program is started without
//! arguments.
//!
//! A plain read-eval loop over a fixed command vocabulary: run, change the
//! output directory, show credits, exit, or toggle one of the four stages.
//! Directory selection uses the native folder picker. The loop only mutates
//! the [`PipelineConfig`] it is given; execution happens afterwards in
//! [`crate::services::ExtractionService`].

use crate::models::{game_dir_is_valid, PipelineConfig, StageFlags, GAME_EXECUTABLE};
use camino::Utf8PathBuf;
use std::io::{self, BufRead, Write};

/// What the menu loop should do after one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Stay in the loop (a toggle or an unknown command).
    Continue,
    /// Leave the loop and run the enabled stages.
    Run,
    /// Leave the loop without running anything.
    Exit,
    /// Open the output directory picker, then stay in the loop.
    PickOutput,
    /// Print the credits, then stay in the loop.
    ShowAbout,
}

/// Interpret one menu command, toggling stage flags in place.
///
/// Commands are matched case-insensitively against both the single-letter
/// and the long form. Anything unrecognized earns a polite rebuff.
pub fn interpret_command(input: &str, flags: &mut StageFlags) -> MenuAction {
    match input.trim().to_lowercase().as_str() {
        "r" | "run" => MenuAction::Run,
        "o" | "output" => MenuAction::PickOutput,
        "a" | "about" => MenuAction::ShowAbout,
        "x" | "exit" => {
            *flags = StageFlags::none();
            MenuAction::Exit
        }
        "u" | "unpack" => {
            flags.unpack = !flags.unpack;
            println!("Unpack is now set to {}.", flags.unpack);
            MenuAction::Continue
        }
        "d" | "decrypt" => {
            flags.decrypt = !flags.decrypt;
            println!("Decrypt is now set to {}.", flags.decrypt);
            MenuAction::Continue
        }
        "s" | "split" => {
            flags.split = !flags.split;
            println!("Split is now set to {}.", flags.split);
            MenuAction::Continue
        }
        "e" | "extract" => {
            flags.extract = !flags.extract;
            println!("Extract is now set to {}.", flags.extract);
            MenuAction::Continue
        }
        _ => {
            println!(
                "\"I am truly sorry ashen one, but I do not possess such abilities. \
                 Allow me to serve thee in other ways.\""
            );
            MenuAction::Continue
        }
    }
}

fn print_menu(config: &PipelineConfig) {
    println!("\nCommands:");
    println!("\tr/run - Run the program using the current configuration.");
    println!(
        "\to/output - Change the output location. Currently '{}'.",
        config.layout.output
    );
    println!("\ta/about - About this program.");
    println!("\tx/exit - Exit this program.");

    println!("Configuration:");
    println!(
        "\tu/unpack - Unpack '*.bdt' files from the game directory. ({})",
        config.stages.unpack
    );
    println!(
        "\td/decrypt - Decrypt '*.fsb' files from the game's 'sound' directory. ({})",
        config.stages.decrypt
    );
    println!(
        "\ts/split - Split unpacked/decrypted multitrack '*.fsb' files. ({})",
        config.stages.split
    );
    println!(
        "\te/extract - Extract audio from split '*.fsb' files into '*.wav' format. ({})",
        config.stages.extract
    );
}

fn print_about() {
    println!(
        "This program simply combines existing tools to create an easy experience \
         in extracting the audio from Dark Souls III.\n"
    );
    println!("Credits:");
    println!("Creator of 'BinderTool.exe': 'Atvaark' (https://github.com/Atvaark/BinderTool)");
    println!(
        "Creator of 'fsbext.exe': Luigi Auriemma (http://www.aluigi.altervista.org/papers.htm#fsbext)"
    );
    println!(
        "Creator of 'fsb5_split.exe': Naram 'CyberBotX' Qashat (https://github.com/CyberBotX/fsb5_split)"
    );
    println!("Creator of 'fsb_aud_extr.exe': 'id-daemon' (https://zenhax.com/viewtopic.php?t=1901)");
}

/// Open the native folder picker until the user selects a directory.
fn pick_directory(title: &str, initial: &Utf8PathBuf) -> Option<Utf8PathBuf> {
    rfd::FileDialog::new()
        .set_title(title)
        .set_directory(initial.as_std_path())
        .pick_folder()
        .and_then(|p| Utf8PathBuf::from_path_buf(p).ok())
}

/// Run the interactive configuration loop.
///
/// Returns when the user picks `run` (stages as configured) or `exit` (all
/// stages cleared, so nothing runs).
pub fn run_menu(config: &mut PipelineConfig) {
    println!("\"Welcome, ashen one.\"");

    let stdin = io::stdin();
    loop {
        print_menu(config);
        print!("\n\"Speak thine heart's desire\": ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).unwrap_or(0) == 0 {
            // stdin closed; treat like exit
            config.stages = StageFlags::none();
            return;
        }

        match interpret_command(&line, &mut config.stages) {
            MenuAction::Run => return,
            MenuAction::Exit => return,
            MenuAction::PickOutput => {
                let mut picked = None;
                while picked.is_none() {
                    picked = pick_directory("Select Output Directory", &config.layout.output);
                }
                if let Some(output) = picked {
                    println!("Output path set to {}", output);
                    config.set_output_root(output);
                }
            }
            MenuAction::ShowAbout => print_about(),
            MenuAction::Continue => {}
        }
    }
}

/// Re-prompt for the game directory until it contains the game executable.
///
/// Only used in interactive mode; flag-driven runs just warn and carry on.
pub fn ensure_game_dir(config: &mut PipelineConfig) {
    while !game_dir_is_valid(&config.game_dir) {
        println!("Please provide the directory containing '{}'.\n", GAME_EXECUTABLE);
        if let Some(dir) = pick_directory("Select Dark Souls III Install Location", &config.game_dir)
        {
            config.game_dir = dir;
        }
    }
}

/// Hold the console open until the user presses enter.
pub fn wait_for_enter() {
    print!("Press enter to exit.");
    let _ = io::stdout().flush();
    let mut line = String::new();
    let _ = io::stdin().lock().read_line(&mut line);
}
