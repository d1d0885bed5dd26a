//! Whole-table scenarios driven through the command language and a session.

use townsquare_core::{Audience, ErrorKind, LockFailure, VoteCell};

use crate::common::{ALICE, BOB, CAROL, DAN, Table, pid, texts};

fn cells(table: &Table, audience: Audience) -> Vec<(String, VoteCell)> {
    table
        .view(audience)
        .rows
        .into_iter()
        .map(|row| (row.alias, row.cell))
        .collect()
}

#[test]
fn nomination_runs_to_the_block() {
    let table = Table::seated();

    let nom = table.player(ALICE, "Nom Bob").expect("nominate");
    assert_eq!(texts(&nom), vec!["Alice has nominated Bob"]);
    table
        .player(ALICE, "AddAccusation Bob claimed two roles")
        .expect("accuse");
    table.player(BOB, "AddDefence I was confused").expect("defend");

    // The clockhand starts at Carol, the seat after Bob.
    let early = table.player(ALICE, "Vote yes").expect("vote");
    assert_eq!(
        texts(&early),
        vec!["Alice has set their vote on the nomination of Bob to yes"]
    );
    assert!(early.notice.is_none());
    table.player(BOB, "Vote no").expect("vote");

    let chain = table.player(CAROL, "Vote Y").expect("vote");
    assert_eq!(
        texts(&chain),
        vec![
            "Carol has set their vote on the nomination of Bob to Y",
            "The vote of Carol has been locked as yes on the nomination of Bob",
            "The vote of Alice has been locked as yes on the nomination of Bob",
            "The vote of Bob has been locked as no on the nomination of Bob",
            "All votes on the nomination of Bob are locked",
        ]
    );

    let view = table.view(Audience::Public);
    assert!(view.finished);
    assert_eq!(view.clockhand, None);
    assert_eq!(view.accusation, "Bob claimed two roles");
    assert_eq!(view.defense, "I was confused");
    assert_eq!(view.tally, Some(2));
    assert_eq!(view.votes_needed, 2);
    assert_eq!(view.on_the_block(), Some(true));
    assert_eq!(
        cells(&table, Audience::Public),
        vec![
            ("Carol".to_string(), VoteCell::ConfirmedYes { running_total: 1 }),
            ("Alice".to_string(), VoteCell::ConfirmedYes { running_total: 2 }),
            ("Bob".to_string(), VoteCell::ConfirmedNo),
        ]
    );

    // A finished nomination frees the table for the next one.
    table.player(CAROL, "Nom Alice").expect("next nomination");
}

#[test]
fn stalled_clockhand_is_driven_by_the_storyteller() {
    let table = Table::seated();
    table.player(ALICE, "Nom Carol").expect("nominate");
    table.player(BOB, "Vote yes").expect("vote");

    let stalled = table.player(ALICE, "Vote maybe").expect("vote");
    assert_eq!(
        stalled.notice,
        Some(LockFailure::UnrecognizedVote {
            voter: pid(ALICE),
            alias: "Alice".into(),
            text: "maybe".into(),
        })
    );
    assert_eq!(texts(&stalled).len(), 1);

    let err = table.player(ALICE, "LockVote yes").expect_err("players cannot lock");
    assert_eq!(err.kind(), ErrorKind::NotAuthorized);

    let locked = table.st("LockVote NO").expect("override");
    assert_eq!(
        texts(&locked),
        vec!["The vote of Alice has been locked as no on the nomination of Carol"]
    );
    table.st("LockVote").expect("lock Bob");

    let err = table.st("LockVote").expect_err("Carol has not voted");
    assert_eq!(err.kind(), ErrorKind::NotVoted);

    let last = table.st("LockVote yes").expect("lock Carol");
    assert_eq!(
        texts(&last),
        vec![
            "The vote of Carol has been locked as yes on the nomination of Carol",
            "All votes on the nomination of Carol are locked",
        ]
    );
    assert_eq!(table.view(Audience::Public).tally, Some(2));
}

#[test]
fn organ_grinder_hides_votes_from_the_public() {
    let table = Table::seated();
    let toggled = table.st("TOrganGrinder").expect("toggle");
    assert_eq!(texts(&toggled), vec!["Organ Grinder is now enabled"]);

    table.player(ALICE, "Nom Carol").expect("nominate");
    table.player(BOB, "Vote yes").expect("vote");

    let public = table.view(Audience::Public);
    assert_eq!(public.tally, None);
    assert_eq!(public.on_the_block(), None);
    assert!(public.rows.iter().all(|row| row.cell == VoteCell::Hidden));

    let storytellers = table.view(Audience::Storytellers);
    assert_eq!(storytellers.tally, Some(0));
    assert_eq!(storytellers.rows[1].cell, VoteCell::Pending("yes".into()));
}

#[test]
fn modifiers_and_banshee_weigh_the_tally() {
    let table = Table::seated();
    let banshee = table.st("Banshee Alice").expect("banshee");
    assert_eq!(
        texts(&banshee),
        vec!["Sam has granted banshee voting rights for Alice"]
    );

    table.player(ALICE, "Nom Carol").expect("nominate");
    let bureaucrat = table.st("Bureaucrat Bob").expect("bureaucrat");
    assert_eq!(
        texts(&bureaucrat),
        vec!["Sam has enabled bureaucrat on Bob's vote"]
    );
    table.st("Thief Carol").expect("thief");

    table.player(BOB, "Vote yes").expect("vote");
    table.player(CAROL, "Vote yes").expect("vote");
    table.player(ALICE, "Vote yes").expect("vote");

    let view = table.view(Audience::Public);
    assert!(view.finished);
    assert_eq!(view.tally, Some(4));
    assert_eq!(
        cells(&table, Audience::Public),
        vec![
            ("Alice".to_string(), VoteCell::ConfirmedYes { running_total: 2 }),
            ("Bob".to_string(), VoteCell::ConfirmedYes { running_total: 5 }),
            ("Carol".to_string(), VoteCell::ConfirmedYes { running_total: 4 }),
        ]
    );
}

#[test]
fn dead_players_without_a_vote_are_struck() {
    let table = Table::seated();
    let dead = table.st("ToggleMarkDead Carol").expect("mark dead");
    assert_eq!(texts(&dead), vec!["Sam has marked Carol as dead"]);
    let no_vote = table.st("TCanVote Carol").expect("take vote");
    assert_eq!(texts(&no_vote), vec!["Sam has set Carol as unable to vote"]);

    table.player(ALICE, "Nom Bob").expect("nominate");
    let err = table.player(CAROL, "Vote yes").expect_err("no vote left");
    assert_eq!(err.kind(), ErrorKind::IllegalState);

    let view = table.view(Audience::Public);
    assert_eq!(view.votes_needed, 1);
    let carol = &view.rows[0];
    assert_eq!(carol.alias, "Carol");
    assert!(carol.dead);
    assert_eq!(carol.cell, VoteCell::Struck);
    assert!(!carol.current_voter);
    assert!(view.rows[1].current_voter);
}

#[test]
fn storyteller_acts_on_behalf_of_players() {
    let table = Table::seated();

    let err = table.st("Nom Carol").expect_err("nominator required");
    assert_eq!(err.kind(), ErrorKind::Validation);

    let nom = table.st("Nom Carol Alice").expect("nominate");
    assert_eq!(texts(&nom), vec!["Alice has nominated Carol"]);

    let vote = table.st("Vote yes Bob").expect("vote for Bob");
    assert_eq!(
        texts(&vote),
        vec!["Sam has set Bob's vote on the nomination of Carol to yes"]
    );
    let err = table.player(ALICE, "Vote no Bob").expect_err("players vote for themselves");
    assert_eq!(err.kind(), ErrorKind::NotAuthorized);

    let closed = table.st("CloseNom").expect("close");
    assert_eq!(texts(&closed), vec!["Sam has closed the nomination of Carol"]);
    let err = table.st("CloseNom").expect_err("nothing open");
    assert_eq!(err.kind(), ErrorKind::IllegalState);

    table.player(BOB, "Nom Alice").expect("next nomination");
}

#[test]
fn second_nomination_waits_for_the_first() {
    let table = Table::seated();
    table.player(ALICE, "Nom Carol").expect("nominate");
    let err = table.player(BOB, "Nom Alice").expect_err("one at a time");
    assert_eq!(err.kind(), ErrorKind::IllegalState);
}

#[test]
fn player_nominations_can_be_switched_off() {
    let table = Table::seated();
    let off = table.st("TPlayerNoms").expect("toggle");
    assert_eq!(texts(&off), vec!["Player nominations are now disabled"]);

    let err = table.player(ALICE, "Nom Bob").expect_err("disabled");
    assert_eq!(err.kind(), ErrorKind::NotAuthorized);
    table.st("Nom Bob Alice").expect("storytellers still nominate");
}

#[test]
fn substitution_carries_the_vote_to_the_new_player() {
    let table = Table::seated();
    table.player(ALICE, "Nom Carol").expect("nominate");
    table.player(BOB, "Vote yes").expect("vote");

    let sub = table.st("SubPlayer 2 4").expect("substitute");
    assert_eq!(texts(&sub), vec!["Sam has substituted Bob with Dan"]);

    let aliases: Vec<String> = table
        .square()
        .players
        .iter()
        .map(|p| p.alias.clone())
        .collect();
    assert_eq!(aliases, vec!["Alice", "Dan", "Carol"]);
    assert_eq!(
        cells(&table, Audience::Public)[1],
        ("Dan".to_string(), VoteCell::Pending("yes".into()))
    );

    table.player(DAN, "Vote no").expect("Dan inherits Bob's seat");
}

#[test]
fn new_alias_shows_up_in_the_open_nomination() {
    let table = Table::seated();
    table.player(ALICE, "Nom Carol").expect("nominate");

    let alias = table.player(CAROL, "SetAlias Caz").expect("alias");
    assert_eq!(texts(&alias), vec!["Carol has set their alias to Caz"]);
    assert_eq!(table.view(Audience::Public).nominee, "Caz");

    table.st("Vote yes caz").expect("new alias resolves");
}
