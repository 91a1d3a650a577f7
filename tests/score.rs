use bevy_ecs::world::World;
use river_sweep::systems::ScoreLedger;
use speculoos::prelude::*;

#[test]
fn test_signed_deltas_accumulate() {
    let mut ledger = ScoreLedger::default();

    ledger.add_score(5);
    ledger.add_score(-3);

    assert_that(&ledger.current_score()).is_equal_to(2);
    assert_that(&ledger.display()).is_equal_to("Score: 2");
}

#[test]
fn test_score_can_go_negative() {
    let mut ledger = ScoreLedger::default();

    ledger.add_score(-3);

    assert_that(&ledger.current_score()).is_equal_to(-3);
    assert_that(&ledger.display()).is_equal_to("Score: -3");
}

#[test]
fn test_reset() {
    let mut ledger = ScoreLedger::default();
    ledger.add_score(12);

    ledger.reset_score();

    assert_that(&ledger.current_score()).is_equal_to(0);
    assert_that(&ledger.display()).is_equal_to("Score: 0");
}

#[test]
fn test_second_install_keeps_existing_ledger() {
    let mut world = World::default();

    assert_that(&ScoreLedger::install(&mut world)).is_true();
    world.resource_mut::<ScoreLedger>().add_score(4);

    assert_that(&ScoreLedger::install(&mut world)).is_false();
    assert_that(&world.resource::<ScoreLedger>().current_score()).is_equal_to(4);
}
