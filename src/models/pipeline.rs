use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// The `*.bdt` archives that actually contain audio.
///
/// The game directory holds many more `.bdt` containers, but only these four
/// are worth unpacking; the rest would waste hours of BinderTool time and a
/// lot of disk for nothing.
pub const WANTED_ARCHIVES: [&str; 4] = ["Data1.bdt", "Data5.bdt", "DLC1.bdt", "DLC2.bdt"];

/// Encryption key the game uses for the FSB sound banks under `sound/`.
/// Passed to fsbext's `-e` flag verbatim.
pub const FSB_DECRYPTION_KEY: &str = "FDPrVuT4fAFvdHJYAgyMzRF4EcBAnKg";

/// File whose presence marks a directory as a valid game installation.
pub const GAME_EXECUTABLE: &str = "DarkSoulsIII.exe";

/// Default Steam installation folder, used when neither the CLI nor the
/// settings file provides a game path.
pub const DEFAULT_GAME_DIR: &str =
    "C:/Program Files (x86)/Steam/steamapps/common/DARK SOULS III/Game";

/// Enable flags for the four pipeline stages.
///
/// Toggling one flag never touches the others; the interactive menu and the
/// CLI both rely on that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageFlags {
    pub unpack: bool,
    pub decrypt: bool,
    pub split: bool,
    pub extract: bool,
}

impl StageFlags {
    /// All four stages enabled. This is the default when no stage flag is
    /// passed on the command line.
    pub fn all() -> Self {
        Self {
            unpack: true,
            decrypt: true,
            split: true,
            extract: true,
        }
    }

    /// Nothing enabled. Used by the interactive menu's `exit` command.
    pub fn none() -> Self {
        Self {
            unpack: false,
            decrypt: false,
            split: false,
            extract: false,
        }
    }

    /// True when at least one stage is enabled.
    pub fn any(&self) -> bool {
        self.unpack || self.decrypt || self.split || self.extract
    }
}

impl Default for StageFlags {
    fn default() -> Self {
        Self::all()
    }
}

/// Output directory tree derived from the output root.
///
/// - `raw/` holds unpacked archives and decrypted sound banks
/// - `wav/` mirrors the raw subtree with the final decoded audio
/// - `raw/sound/` is where fsbext drops decrypted `*_crypt.fsb` files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    pub output: Utf8PathBuf,
    pub raw: Utf8PathBuf,
    pub wav: Utf8PathBuf,
    pub sound: Utf8PathBuf,
}

impl OutputLayout {
    pub fn new<P: Into<Utf8PathBuf>>(output_root: P) -> Self {
        let output = output_root.into();
        let raw = output.join("raw");
        let wav = output.join("wav");
        let sound = raw.join("sound");
        Self {
            output,
            raw,
            wav,
            sound,
        }
    }

    /// Create the whole output tree if any part of it is missing.
    ///
    /// Every stage assumes these directories exist, so this must run before
    /// any stage does.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        // sound lives under raw, wav is a sibling; create_dir_all covers
        // the intermediate directories.
        fs::create_dir_all(&self.sound)?;
        fs::create_dir_all(&self.wav)?;
        Ok(())
    }
}

/// Resolved configuration for one pipeline run.
///
/// Built once at startup from CLI arguments, the settings file and defaults,
/// then passed by reference to every stage. No global state.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory containing `DarkSoulsIII.exe`.
    pub game_dir: Utf8PathBuf,
    /// Derived output tree.
    pub layout: OutputLayout,
    /// Which stages to run.
    pub stages: StageFlags,
    /// Directory containing the external tool executables.
    pub tools_dir: Utf8PathBuf,
}

impl PipelineConfig {
    pub fn new<G, O, T>(game_dir: G, output_root: O, stages: StageFlags, tools_dir: T) -> Self
    where
        G: Into<Utf8PathBuf>,
        O: Into<Utf8PathBuf>,
        T: Into<Utf8PathBuf>,
    {
        Self {
            game_dir: game_dir.into(),
            layout: OutputLayout::new(output_root),
            stages,
            tools_dir: tools_dir.into(),
        }
    }

    /// The game's `sound/` directory, input to the decrypt stage.
    pub fn game_sound_dir(&self) -> Utf8PathBuf {
        self.game_dir.join("sound")
    }

    /// Whether `game_dir` looks like an actual game installation.
    pub fn game_dir_is_valid(&self) -> bool {
        game_dir_is_valid(&self.game_dir)
    }

    /// Replace the output root, rederiving the raw/wav/sound subtree.
    pub fn set_output_root<P: Into<Utf8PathBuf>>(&mut self, output_root: P) {
        self.layout = OutputLayout::new(output_root);
    }
}

/// Check whether a directory contains the game executable.
pub fn game_dir_is_valid(game_dir: &Utf8Path) -> bool {
    game_dir.join(GAME_EXECUTABLE).is_file()
}

/// Check whether a file is one of the audio-bearing archives.
pub fn is_wanted_archive(path: &Utf8Path) -> bool {
    match path.file_name() {
        Some(name) => WANTED_ARCHIVES.contains(&name),
        None => false,
    }
}
