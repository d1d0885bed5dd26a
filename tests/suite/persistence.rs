//! Snapshot persistence across sessions and registries.

use std::fs;

use townsquare_core::{Caller, ErrorKind};
use townsquare_engine::{
    Command, CommandContext, EMPTY_MARKER, Outcome, Session, SessionError, SessionRegistry,
    StoreError,
};
use townsquare_types::TownSquare;

use crate::common::{ALICE, BOB, SAM, Table, directory, game, pid};

fn run(session: &Session, caller: Caller, line: &str) -> Result<Outcome, SessionError> {
    let directory = directory();
    let storytellers = [pid(SAM)];
    let ctx = CommandContext {
        caller,
        directory: &directory,
        storytellers: &storytellers,
    };
    session.execute(&ctx, &Command::parse(line).expect("command parses"))
}

fn json(ts: Option<TownSquare>) -> serde_json::Value {
    serde_json::to_value(ts).expect("serialize")
}

#[test]
fn games_survive_a_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let tuesday = game("tuesday");
    let registry = SessionRegistry::new(dir.path());

    let session = registry.get(&tuesday).expect("open");
    run(&session, Caller::storyteller(pid(SAM)), "SetupTownSquare 1 2 3").expect("setup");
    run(&session, Caller::player(pid(ALICE)), "Nom Carol").expect("nominate");
    run(&session, Caller::player(pid(BOB)), "Vote yes").expect("vote");
    let before = json(session.snapshot());

    let path = registry.snapshot_path(&tuesday);
    assert_eq!(path, dir.path().join("tuesday").join("townsquare.json"));
    assert!(path.exists());

    assert!(registry.evict(&tuesday));
    let reloaded = registry.get(&tuesday).expect("reopen");
    assert_eq!(json(reloaded.snapshot()), before);

    let restarted = SessionRegistry::new(dir.path());
    let fresh = restarted.get(&tuesday).expect("open after restart");
    assert_eq!(json(fresh.snapshot()), before);
}

#[test]
fn games_are_kept_apart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let registry = SessionRegistry::new(dir.path());
    let first = registry.get(&game("first")).expect("open");
    run(&first, Caller::storyteller(pid(SAM)), "SetupTownSquare 1 2").expect("setup");

    let second = registry.get(&game("second")).expect("open");
    assert!(second.snapshot().is_none());
    assert!(!registry.snapshot_path(&game("second")).exists());
}

#[test]
fn ended_game_leaves_the_empty_marker() {
    let dir = tempfile::tempdir().expect("tempdir");
    let registry = SessionRegistry::new(dir.path());
    let g = game("finale");
    let session = registry.get(&g).expect("open");
    run(&session, Caller::storyteller(pid(SAM)), "SetupTownSquare 1 2 3").expect("setup");
    run(&session, Caller::storyteller(pid(SAM)), "EndGame").expect("end");

    let raw = fs::read_to_string(registry.snapshot_path(&g)).expect("read");
    assert_eq!(raw.trim(), EMPTY_MARKER);

    let restarted = SessionRegistry::new(dir.path());
    assert!(restarted.get(&g).expect("open").snapshot().is_none());
}

#[test]
fn interrupted_write_is_recovered_on_load() {
    let dir = tempfile::tempdir().expect("tempdir");
    let g = game("crash");
    let registry = SessionRegistry::new(dir.path());
    let session = registry.get(&g).expect("open");
    run(&session, Caller::storyteller(pid(SAM)), "SetupTownSquare 1 2 3").expect("setup");
    let before = json(session.snapshot());

    // Simulate dying between moving the old file aside and renaming the new one in.
    let path = registry.snapshot_path(&g);
    fs::rename(&path, path.with_file_name("townsquare.json.bak")).expect("rename");

    let restarted = SessionRegistry::new(dir.path());
    let recovered = restarted.get(&g).expect("open");
    assert_eq!(json(recovered.snapshot()), before);
    assert!(path.exists());
}

#[test]
fn corrupt_snapshot_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let g = game("corrupt");
    let registry = SessionRegistry::new(dir.path());
    let path = registry.snapshot_path(&g);
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(&path, "{ not json").expect("write");

    let err = registry.get(&g).map(|_| ()).expect_err("corrupt file");
    assert!(matches!(err, StoreError::Serde { .. }));
}

#[test]
fn failed_save_keeps_the_change_in_memory() {
    let table = Table::seated();
    table.store.set_failing(true);

    let err = table.player(ALICE, "Nom Carol").expect_err("save fails");
    assert_eq!(err.kind(), ErrorKind::Persistence);
    assert!(table.square().open_nomination().is_some());

    table.store.set_failing(false);
    table.player(BOB, "Vote yes").expect("vote");
    let saved: serde_json::Value =
        serde_json::from_str(&table.store.raw().expect("saved")).expect("json");
    assert_eq!(saved, json(table.session.snapshot()));
}
