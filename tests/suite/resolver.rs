//! Participant resolution against a live town square.

use townsquare_core::{NoDirectory, ResolveError, Resolver, StaticDirectory};
use townsquare_types::{Participant, TownSquare};

use crate::common::pid;

fn square(players: &[(u64, &str)]) -> TownSquare {
    TownSquare::new(
        players
            .iter()
            .map(|(id, alias)| Participant::new(pid(*id), *alias))
            .collect(),
        vec![Participant::new(pid(9), "Sam")],
    )
}

#[test]
fn exact_alias_beats_a_longer_one() {
    let ts = square(&[(1, "Al"), (2, "Alice"), (3, "Bob")]);
    let resolver = Resolver::new(&ts, &NoDirectory);

    assert_eq!(resolver.resolve("al"), Ok(pid(1)));
    assert_eq!(resolver.resolve("Ali"), Ok(pid(2)));
    assert_eq!(resolver.resolve("ALICE"), Ok(pid(2)));
    assert_eq!(resolver.resolve(" bob "), Ok(pid(3)));
}

#[test]
fn storytellers_are_participants_too() {
    let ts = square(&[(1, "Alice")]);
    let resolver = Resolver::new(&ts, &NoDirectory);
    let sam = resolver.resolve_participant("sam").expect("storyteller");
    assert_eq!(sam.alias, "Sam");
}

#[test]
fn directory_names_fill_in_for_aliases() {
    let ts = square(&[(6, "Wolf"), (7, "Fox")]);
    let directory = StaticDirectory::new()
        .with(pid(6), "Greg", "gregory")
        .with(pid(7), "Hannah", "hannah_b");
    let resolver = Resolver::new(&ts, &directory);

    assert_eq!(resolver.resolve("greg"), Ok(pid(6)));
    assert_eq!(resolver.resolve("hannah_b"), Ok(pid(7)));
    assert_eq!(resolver.resolve("fox"), Ok(pid(7)));
}

#[test]
fn mentions_must_name_a_participant() {
    let ts = square(&[(6, "Wolf"), (7, "Fox")]);
    let resolver = Resolver::new(&ts, &NoDirectory);

    assert_eq!(resolver.resolve("<@7>"), Ok(pid(7)));
    assert_eq!(resolver.resolve("<@!6>"), Ok(pid(6)));
    assert!(matches!(
        resolver.resolve("<@99>"),
        Err(ResolveError::NotFound { .. })
    ));
}

#[test]
fn contested_names_are_ambiguous_not_guessed() {
    let ts = square(&[(4, "Tom A"), (5, "Tom B"), (6, "Wolf")]);
    let resolver = Resolver::new(&ts, &NoDirectory);

    assert_eq!(
        resolver.resolve("tom"),
        Err(ResolveError::Ambiguous {
            identifier: "tom".into(),
            candidates: vec![pid(4), pid(5)],
        })
    );
    assert!(matches!(
        resolver.resolve("zed"),
        Err(ResolveError::NotFound { .. })
    ));
    assert!(matches!(
        resolver.resolve("   "),
        Err(ResolveError::Malformed { .. })
    ));
}
