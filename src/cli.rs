use crate::models::StageFlags;
use camino::Utf8PathBuf;
use clap::Parser;

const ABOUT: &str = "Dark Souls III Audio Extracting Tool. \
If no arguments apart from --input and --output are specified, all stages run by default. \
If any stage flag is passed, the unspecified stages are disabled \
(e.g. passing --decrypt and --extract leaves --unpack and --split off).";

/// Command line arguments.
///
/// Running with no arguments at all drops into the interactive menu instead.
#[derive(Parser, Debug, Clone)]
#[command(name = "dsax", version, about = ABOUT)]
pub struct Args {
    /// Path to the folder containing 'DarkSoulsIII.exe'. (Defaults to the
    /// default Steam installation folder)
    #[arg(short, long)]
    pub input: Option<Utf8PathBuf>,

    /// Path to the output location. (Defaults to the 'output' folder in the
    /// current directory)
    #[arg(short, long)]
    pub output: Option<Utf8PathBuf>,

    /// Unpack '*.bdt' archives from the game directory.
    #[arg(short, long)]
    pub unpack: bool,

    /// Decrypt '*.fsb' files from the game's 'sound' directory.
    #[arg(short, long)]
    pub decrypt: bool,

    /// Split multitrack '*.fsb' files into individual '*.fsb' files.
    #[arg(short, long)]
    pub split: bool,

    /// Extract audio from split '*.fsb' files into '*.wav' format.
    #[arg(short, long)]
    pub extract: bool,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    /// Stage flags with the defaulting rule applied: no stage flag on the
    /// command line means all four stages run.
    pub fn stage_flags(&self) -> StageFlags {
        let flags = StageFlags {
            unpack: self.unpack,
            decrypt: self.decrypt,
            split: self.split,
            extract: self.extract,
        };
        if flags.any() {
            flags
        } else {
            StageFlags::all()
        }
    }
}
