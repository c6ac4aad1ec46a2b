//! Integration tests for the CLI surface and the interactive menu commands
//!
//! These tests verify:
//! - Stage-flag defaulting: no stage flag means all four run; any stage flag
//!   disables the unspecified ones
//! - Menu commands toggle exactly one flag and map to the right actions

use clap::Parser;
use dsax::cli::Args;
use dsax::ui::{interpret_command, MenuAction};
use dsax::StageFlags;

#[test]
fn test_only_io_flags_run_everything() {
    let args = Args::try_parse_from(["dsax", "-i", "D:/DS3/Game", "-o", "/tmp/x"]).unwrap();
    assert_eq!(args.stage_flags(), StageFlags::all());
}

#[test]
fn test_single_stage_flag_disables_others() {
    let args = Args::try_parse_from(["dsax", "--unpack"]).unwrap();
    let flags = args.stage_flags();

    assert!(flags.unpack);
    assert!(!flags.decrypt);
    assert!(!flags.split);
    assert!(!flags.extract);
}

#[test]
fn test_decrypt_and_extract_leave_unpack_and_split_off() {
    let args = Args::try_parse_from(["dsax", "-d", "-e"]).unwrap();
    let flags = args.stage_flags();

    assert!(!flags.unpack);
    assert!(flags.decrypt);
    assert!(!flags.split);
    assert!(flags.extract);
}

#[test]
fn test_all_stage_flags_equivalent_to_none() {
    let explicit = Args::try_parse_from(["dsax", "-u", "-d", "-s", "-e"]).unwrap();
    let implicit = Args::try_parse_from(["dsax"]).unwrap();

    assert_eq!(explicit.stage_flags(), implicit.stage_flags());
}

#[test]
fn test_menu_toggle_flips_only_that_flag() {
    let mut flags = StageFlags::all();

    assert_eq!(interpret_command("s", &mut flags), MenuAction::Continue);
    assert!(flags.unpack);
    assert!(flags.decrypt);
    assert!(!flags.split);
    assert!(flags.extract);

    assert_eq!(interpret_command("u", &mut flags), MenuAction::Continue);
    assert!(!flags.unpack);
    assert!(!flags.split);
    assert!(flags.decrypt && flags.extract);
}

#[test]
fn test_menu_exit_clears_all_flags() {
    let mut flags = StageFlags::all();
    assert_eq!(interpret_command("exit", &mut flags), MenuAction::Exit);
    assert!(!flags.any());
}

#[test]
fn test_menu_run_keeps_configuration() {
    let mut flags = StageFlags::all();
    flags.extract = false;

    assert_eq!(interpret_command("r", &mut flags), MenuAction::Run);
    assert!(flags.unpack && flags.decrypt && flags.split);
    assert!(!flags.extract);
}
