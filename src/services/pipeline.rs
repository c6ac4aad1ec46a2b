use crate::models::{PipelineConfig, FSB_DECRYPTION_KEY, GAME_EXECUTABLE};
use crate::progress;
use crate::services::toolkit::{run_tool, ToolError, ToolKit};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::process::ExitStatus;
use std::time::{Duration, Instant};

/// One pending tool invocation.
///
/// `input` is the file handed to the external tool; `output` is the artifact
/// whose existence marks the job as already done. For the split stage the
/// artifact is a directory, for the others a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolJob {
    pub input: Utf8PathBuf,
    pub output: Utf8PathBuf,
}

/// What a stage would do: pending jobs plus how many relevant entries were
/// skipped because their output already exists.
#[derive(Debug, Clone, Default)]
pub struct StagePlan {
    pub jobs: Vec<ToolJob>,
    pub skipped: usize,
}

impl StagePlan {
    fn merge(&mut self, other: StagePlan) {
        self.jobs.extend(other.jobs);
        self.skipped += other.skipped;
    }
}

/// Counters reported after a stage has run.
#[derive(Debug, Clone, Default)]
pub struct StageSummary {
    pub processed: usize,
    pub skipped: usize,
    pub duration: Duration,
}

/// List a directory's entries as UTF-8 paths, sorted for determinism.
fn list_entries(dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>> {
    let mut entries = Vec::new();
    for entry in
        fs::read_dir(dir).with_context(|| format!("Failed to read directory: {}", dir))?
    {
        let entry = entry.with_context(|| format!("Failed to read entry in {}", dir))?;
        let path = Utf8PathBuf::from_path_buf(entry.path())
            .map_err(|p| anyhow::anyhow!("Non-UTF-8 path: {}", p.display()))?;
        entries.push(path);
    }
    entries.sort();
    Ok(entries)
}

/// Decide which directory of an unpacked archive holds the sound banks.
///
/// Some archives unpack their FSBs into a nested `sound/` folder, others
/// straight into the archive folder itself.
pub fn resolve_sound_dir(folder: &Utf8Path) -> Utf8PathBuf {
    let nested = folder.join("sound");
    if nested.exists() {
        nested
    } else {
        folder.to_path_buf()
    }
}

/// Plan the unpack stage: every wanted `.bdt` archive in the game directory
/// without a matching `raw/<stem>/` output directory.
pub fn plan_unpack(game_dir: &Utf8Path, raw_dir: &Utf8Path) -> Result<StagePlan> {
    let mut plan = StagePlan::default();
    for entry in list_entries(game_dir)? {
        if !crate::models::is_wanted_archive(&entry) || !entry.is_file() {
            continue;
        }
        let stem = entry
            .file_stem()
            .with_context(|| format!("Archive has no file stem: {}", entry))?;
        let output = raw_dir.join(stem);
        if output.exists() {
            plan.skipped += 1;
        } else {
            plan.jobs.push(ToolJob {
                input: entry,
                output,
            });
        }
    }
    Ok(plan)
}

/// Plan the decrypt stage: every `.fsb` in the game's `sound/` directory
/// without a decrypted `<stem>_crypt.fsb` in the output sound directory.
///
/// The `_crypt` suffix is fsbext's own naming convention for its output.
pub fn plan_decrypt(game_sound_dir: &Utf8Path, sound_out_dir: &Utf8Path) -> Result<StagePlan> {
    let mut plan = StagePlan::default();
    for entry in list_entries(game_sound_dir)? {
        if entry.extension() != Some("fsb") || !entry.is_file() {
            continue;
        }
        let stem = entry
            .file_stem()
            .with_context(|| format!("Sound bank has no file stem: {}", entry))?;
        let output = sound_out_dir.join(format!("{}_crypt.fsb", stem));
        if output.is_file() {
            plan.skipped += 1;
        } else {
            plan.jobs.push(ToolJob {
                input: entry,
                output,
            });
        }
    }
    Ok(plan)
}

/// Plan the split stage for one scan directory: every `.fsb` without a
/// same-named directory next to it (fsb5_split writes its tracks there).
pub fn plan_split(scan_dir: &Utf8Path) -> Result<StagePlan> {
    let mut plan = StagePlan::default();
    for entry in list_entries(scan_dir)? {
        if entry.extension() != Some("fsb") || !entry.is_file() {
            continue;
        }
        let stem = entry
            .file_stem()
            .with_context(|| format!("Sound bank has no file stem: {}", entry))?;
        let output = scan_dir.join(stem);
        if output.exists() {
            plan.skipped += 1;
        } else {
            plan.jobs.push(ToolJob {
                input: entry,
                output,
            });
        }
    }
    Ok(plan)
}

/// Plan the extract stage for one scan directory: every `.fsb` inside each
/// split subfolder without a matching `.wav` under the mirrored `wav/` tree.
///
/// The wav tree mirrors the raw tree, so the expected output is
/// `wav/<split dir relative to raw>/<stem>.wav`.
pub fn plan_extract(
    scan_dir: &Utf8Path,
    raw_dir: &Utf8Path,
    wav_dir: &Utf8Path,
) -> Result<StagePlan> {
    let mut plan = StagePlan::default();
    for folder in list_entries(scan_dir)? {
        if !folder.is_dir() {
            continue;
        }
        let relative = folder
            .strip_prefix(raw_dir)
            .with_context(|| format!("{} is not under {}", folder, raw_dir))?;
        let dest_dir = wav_dir.join(relative);

        for entry in list_entries(&folder)? {
            if entry.extension() != Some("fsb") || !entry.is_file() {
                continue;
            }
            let stem = entry
                .file_stem()
                .with_context(|| format!("Sound bank has no file stem: {}", entry))?;
            let output = dest_dir.join(format!("{}.wav", stem));
            if output.is_file() {
                plan.skipped += 1;
            } else {
                plan.jobs.push(ToolJob {
                    input: entry,
                    output,
                });
            }
        }
    }
    Ok(plan)
}

/// Service driving the four external tools over the game's data.
///
/// Stateless apart from the resolved tool paths; every stage takes the
/// [`PipelineConfig`] explicitly. Stages never abort the pipeline: a tool
/// that fails leaves its output missing and the next run picks the file up
/// again.
pub struct ExtractionService {
    tools: ToolKit,
}

impl ExtractionService {
    pub fn new(tools: ToolKit) -> Self {
        Self { tools }
    }

    /// Run every enabled stage in order: unpack, decrypt, split, extract.
    pub async fn run(&self, config: &PipelineConfig) -> Result<()> {
        if (config.stages.unpack || config.stages.decrypt) && !config.game_dir_is_valid() {
            println!("'{}' not found.\n", GAME_EXECUTABLE);
            tracing::warn!(
                "Game directory {} does not contain {}; unpack/decrypt will find nothing",
                config.game_dir,
                GAME_EXECUTABLE
            );
        }

        if config.stages.unpack {
            self.unpack_archives(config).await?;
        }
        if config.stages.decrypt {
            self.decrypt_sound_banks(config).await?;
        }
        if config.stages.split {
            self.split_sound_banks(config).await?;
        }
        if config.stages.extract {
            self.extract_audio(config).await?;
        }
        Ok(())
    }

    /// Stage 1: unpack the wanted `.bdt` archives into `raw/`.
    pub async fn unpack_archives(&self, config: &PipelineConfig) -> Result<StageSummary> {
        println!("[1/4] Unpacking '*.bdt' files (this can take ~15 minutes):");
        let started = Instant::now();

        let plan = match plan_unpack(&config.game_dir, &config.layout.raw) {
            Ok(plan) => plan,
            Err(err) => return Ok(skip_stage("unpack", started, err)),
        };

        let bar = progress::stage_bar(plan.jobs.len() as u64, "Unpacked");
        for job in &plan.jobs {
            let outcome = run_tool(
                self.tools.binder_tool(),
                &[job.input.as_str(), job.output.as_str()],
                None,
            )
            .await;
            log_outcome("BinderTool", &job.input, outcome);
            bar.inc(1);
        }
        bar.finish();

        Ok(finish_stage("unpack", &plan, started))
    }

    /// Stage 2: decrypt the game's FSB sound banks into `raw/sound/`.
    pub async fn decrypt_sound_banks(&self, config: &PipelineConfig) -> Result<StageSummary> {
        println!("[2/4] Decrypting '*.fsb' files (this can take ~25 seconds):");
        let started = Instant::now();

        let game_sound_dir = config.game_sound_dir();
        let sound_out = &config.layout.sound;
        let plan = match plan_decrypt(&game_sound_dir, sound_out) {
            Ok(plan) => plan,
            Err(err) => return Ok(skip_stage("decrypt", started, err)),
        };

        let bar = progress::stage_bar(plan.jobs.len() as u64, "Decrypted");
        for job in &plan.jobs {
            let outcome = run_tool(
                self.tools.fsb_ext(),
                &[
                    "-e",
                    FSB_DECRYPTION_KEY,
                    "1",
                    "-d",
                    sound_out.as_str(),
                    job.input.as_str(),
                ],
                None,
            )
            .await;
            log_outcome("fsbext", &job.input, outcome);
            bar.inc(1);
        }
        bar.finish();

        Ok(finish_stage("decrypt", &plan, started))
    }

    /// Stage 3: split multitrack FSBs in every unpacked folder.
    ///
    /// fsb5_split writes the per-track files into a directory named after the
    /// input, next to it; there is nothing to redirect.
    pub async fn split_sound_banks(&self, config: &PipelineConfig) -> Result<StageSummary> {
        println!("[3/4] Splitting '*.fsb' files (this can take ~1.5 minutes):");
        let started = Instant::now();

        let mut plan = StagePlan::default();
        for folder in list_entries(&config.layout.raw)? {
            if !folder.is_dir() {
                continue;
            }
            let scan_dir = resolve_sound_dir(&folder);
            plan.merge(plan_split(&scan_dir)?);
        }

        let bar = progress::stage_bar(plan.jobs.len() as u64, "Split");
        for job in &plan.jobs {
            let outcome = run_tool(self.tools.fsb5_split(), &[job.input.as_str()], None).await;
            log_outcome("fsb5_split", &job.input, outcome);
            bar.inc(1);
        }
        bar.finish();

        Ok(finish_stage("split", &plan, started))
    }

    /// Stage 4: decode every split `.fsb` to WAV under the mirrored `wav/`
    /// tree.
    ///
    /// fsb_aud_extr has no output option and writes to its working directory,
    /// so each invocation runs with the child's cwd set to the destination
    /// folder.
    pub async fn extract_audio(&self, config: &PipelineConfig) -> Result<StageSummary> {
        println!("[4/4] Extracting '*.fsb' files (this can take ~2 hours):");
        let started = Instant::now();

        let folders: Vec<_> = list_entries(&config.layout.raw)?
            .into_iter()
            .filter(|p| p.is_dir())
            .collect();

        let mut totals = StagePlan::default();
        let mut processed = 0usize;
        for (index, folder) in folders.iter().enumerate() {
            println!(
                "\t[{}/{}] Extracting from {}",
                index + 1,
                folders.len(),
                folder.file_name().unwrap_or(folder.as_str())
            );

            let scan_dir = resolve_sound_dir(folder);
            let plan = plan_extract(&scan_dir, &config.layout.raw, &config.layout.wav)?;

            let bar = progress::stage_bar(plan.jobs.len() as u64, "Extracted");
            for job in &plan.jobs {
                let dest_dir = job
                    .output
                    .parent()
                    .with_context(|| format!("Output has no parent: {}", job.output))?;
                fs::create_dir_all(dest_dir)
                    .with_context(|| format!("Failed to create {}", dest_dir))?;

                let outcome = run_tool(
                    self.tools.fsb_aud_extr(),
                    &[job.input.as_str()],
                    Some(dest_dir),
                )
                .await;
                log_outcome("fsb_aud_extr", &job.input, outcome);
                processed += 1;
                bar.inc(1);
            }
            bar.finish();
            totals.merge(plan);
        }

        let summary = StageSummary {
            processed,
            skipped: totals.skipped,
            duration: started.elapsed(),
        };
        report_stage("extract", &summary);
        Ok(summary)
    }
}

/// A stage whose input directory could not be scanned is skipped with a
/// warning; the pipeline carries on with the remaining stages.
fn skip_stage(stage: &str, started: Instant, err: anyhow::Error) -> StageSummary {
    println!("Could not scan the input for the {} stage; moving on.\n", stage);
    tracing::warn!("Skipping {} stage: {:#}", stage, err);
    StageSummary {
        duration: started.elapsed(),
        ..StageSummary::default()
    }
}

fn finish_stage(stage: &str, plan: &StagePlan, started: Instant) -> StageSummary {
    let summary = StageSummary {
        processed: plan.jobs.len(),
        skipped: plan.skipped,
        duration: started.elapsed(),
    };
    report_stage(stage, &summary);
    summary
}

fn report_stage(stage: &str, summary: &StageSummary) {
    println!(
        "Completed in {:.1} seconds.\n",
        summary.duration.as_secs_f32()
    );
    tracing::info!(
        "Stage {} done: {} processed, {} already present, {:.1}s",
        stage,
        summary.processed,
        summary.skipped,
        summary.duration.as_secs_f32()
    );
}

/// Tool failures never abort a stage - the missing output is simply picked
/// up again on the next run. They do land in the log.
fn log_outcome(tool: &str, input: &Utf8Path, outcome: Result<ExitStatus, ToolError>) {
    match outcome {
        Ok(status) if status.success() => {
            tracing::debug!("{} finished for {}", tool, input);
        }
        Ok(status) => {
            tracing::debug!("{} exited with {} for {}", tool, status, input);
        }
        Err(err) => {
            tracing::warn!("{} could not run for {}: {}", tool, input, err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn utf8_root(temp_dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap()
    }

    fn touch(path: &Utf8Path) {
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_plan_unpack_skips_existing_output() {
        let temp_dir = TempDir::new().unwrap();
        let root = utf8_root(&temp_dir);
        let game_dir = root.join("game");
        let raw_dir = root.join("out/raw");
        fs::create_dir_all(&game_dir).unwrap();
        fs::create_dir_all(raw_dir.join("Data1")).unwrap();

        touch(&game_dir.join("Data1.bdt"));
        touch(&game_dir.join("Data5.bdt"));
        touch(&game_dir.join("Data2.bdt")); // not wanted
        touch(&game_dir.join("notes.txt"));

        let plan = plan_unpack(&game_dir, &raw_dir).unwrap();

        assert_eq!(plan.skipped, 1);
        assert_eq!(plan.jobs.len(), 1);
        assert_eq!(plan.jobs[0].input, game_dir.join("Data5.bdt"));
        assert_eq!(plan.jobs[0].output, raw_dir.join("Data5"));
    }

    #[test]
    fn test_plan_unpack_missing_game_dir_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let root = utf8_root(&temp_dir);

        let result = plan_unpack(&root.join("nope"), &root.join("raw"));
        assert!(result.is_err());
    }

    #[test]
    fn test_plan_decrypt_uses_crypt_suffix_gate() {
        let temp_dir = TempDir::new().unwrap();
        let root = utf8_root(&temp_dir);
        let game_sound = root.join("game/sound");
        let sound_out = root.join("out/raw/sound");
        fs::create_dir_all(&game_sound).unwrap();
        fs::create_dir_all(&sound_out).unwrap();

        touch(&game_sound.join("main.fsb"));
        touch(&game_sound.join("dlc.fsb"));
        touch(&game_sound.join("readme.txt"));
        touch(&sound_out.join("main_crypt.fsb"));

        let plan = plan_decrypt(&game_sound, &sound_out).unwrap();

        assert_eq!(plan.skipped, 1);
        assert_eq!(plan.jobs.len(), 1);
        assert_eq!(plan.jobs[0].input, game_sound.join("dlc.fsb"));
        assert_eq!(plan.jobs[0].output, sound_out.join("dlc_crypt.fsb"));
    }

    #[test]
    fn test_plan_split_skips_when_directory_exists() {
        let temp_dir = TempDir::new().unwrap();
        let root = utf8_root(&temp_dir);
        fs::create_dir_all(root.join("done")).unwrap();

        touch(&root.join("done.fsb"));
        touch(&root.join("pending.fsb"));

        let plan = plan_split(&root).unwrap();

        assert_eq!(plan.skipped, 1);
        assert_eq!(plan.jobs.len(), 1);
        assert_eq!(plan.jobs[0].input, root.join("pending.fsb"));
        assert_eq!(plan.jobs[0].output, root.join("pending"));
    }

    #[test]
    fn test_resolve_sound_dir_prefers_nested() {
        let temp_dir = TempDir::new().unwrap();
        let root = utf8_root(&temp_dir);
        let with_sound = root.join("Data1");
        let without = root.join("Data5");
        fs::create_dir_all(with_sound.join("sound")).unwrap();
        fs::create_dir_all(&without).unwrap();

        assert_eq!(resolve_sound_dir(&with_sound), with_sound.join("sound"));
        assert_eq!(resolve_sound_dir(&without), without);
    }

    #[test]
    fn test_plan_extract_mirrors_raw_tree() {
        let temp_dir = TempDir::new().unwrap();
        let root = utf8_root(&temp_dir);
        let raw = root.join("raw");
        let wav = root.join("wav");
        let split_dir = raw.join("Data1/sound/music");
        fs::create_dir_all(&split_dir).unwrap();
        fs::create_dir_all(wav.join("Data1/sound/music")).unwrap();

        touch(&split_dir.join("track1.fsb"));
        touch(&split_dir.join("track2.fsb"));
        touch(&wav.join("Data1/sound/music/track1.wav"));

        let scan_dir = raw.join("Data1/sound");
        let plan = plan_extract(&scan_dir, &raw, &wav).unwrap();

        assert_eq!(plan.skipped, 1);
        assert_eq!(plan.jobs.len(), 1);
        assert_eq!(plan.jobs[0].input, split_dir.join("track2.fsb"));
        assert_eq!(
            plan.jobs[0].output,
            wav.join("Data1/sound/music/track2.wav")
        );
    }

    #[test]
    fn test_plan_extract_ignores_loose_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = utf8_root(&temp_dir);
        let raw = root.join("raw");
        let wav = root.join("wav");
        let scan_dir = raw.join("Data1");
        fs::create_dir_all(&scan_dir).unwrap();

        // An unsplit bank directly in the scan dir has no subfolder yet and
        // is not extractable.
        touch(&scan_dir.join("unsplit.fsb"));

        let plan = plan_extract(&scan_dir, &raw, &wav).unwrap();
        assert!(plan.jobs.is_empty());
        assert_eq!(plan.skipped, 0);
    }

    #[tokio::test]
    async fn test_stage_continues_without_tools() {
        // No external binaries exist in the toolkit dir; the stage must
        // still walk its plan and report every job as attempted.
        let temp_dir = TempDir::new().unwrap();
        let root = utf8_root(&temp_dir);
        let game_dir = root.join("game");
        fs::create_dir_all(&game_dir).unwrap();
        touch(&game_dir.join("Data1.bdt"));
        touch(&game_dir.join("DLC1.bdt"));

        let config = PipelineConfig::new(
            &game_dir,
            root.join("out"),
            crate::models::StageFlags::all(),
            root.join("missing-deps"),
        );
        config.layout.ensure_dirs().unwrap();

        let service = ExtractionService::new(ToolKit::new(&config.tools_dir));
        let summary = service.unpack_archives(&config).await.unwrap();

        assert_eq!(summary.processed, 2);
        assert_eq!(summary.skipped, 0);
    }

    #[tokio::test]
    async fn test_stage_with_missing_input_dir_degrades() {
        let temp_dir = TempDir::new().unwrap();
        let root = utf8_root(&temp_dir);

        let config = PipelineConfig::new(
            root.join("not-a-game-dir"),
            root.join("out"),
            crate::models::StageFlags::all(),
            root.join("deps"),
        );
        config.layout.ensure_dirs().unwrap();

        let service = ExtractionService::new(ToolKit::new(&config.tools_dir));
        let summary = service.decrypt_sound_banks(&config).await.unwrap();

        assert_eq!(summary.processed, 0);
        assert_eq!(summary.skipped, 0);
    }
}
