use minicade::clock::STEP;
use minicade::games::{GameId, Phase, Stat};
use minicade::host::GameHost;
use minicade::input::{Dir, Input};
use minicade::scores::{ScoreKey, ScoreStore};

fn best_stat(host: &GameHost) -> Option<String> {
    let stats: Vec<Stat> = host.game()?.stats();
    stats.into_iter().find(|s| s.label == "Best").map(|s| s.value)
}

#[test]
fn every_game_mounts_steps_and_unmounts() {
    let mut scores = ScoreStore::in_memory();
    let mut host = GameHost::new(Some(11));
    for id in GameId::ALL {
        host.mount(id, &mut scores);
        assert_eq!(host.active(), Some(id));
        host.advance(STEP * 30, &mut scores);
        assert!(host.frame().is_some());
        host.unmount(&mut scores);
        assert!(!host.is_mounted());
        assert!(host.frame().is_none());
    }
}

#[test]
fn stored_best_reaches_a_fresh_mount() {
    let mut scores = ScoreStore::in_memory();
    scores.submit(ScoreKey::Dino, 50);
    let mut host = GameHost::new(Some(1));
    host.mount(GameId::Dino, &mut scores);
    assert_eq!(best_stat(&host).as_deref(), Some("50"));
}

#[test]
fn restart_zeroes_score_and_keeps_best() {
    let mut scores = ScoreStore::in_memory();
    let mut host = GameHost::new(Some(5));
    host.mount(GameId::Dino, &mut scores);
    host.dispatch(Input::Primary, &mut scores);
    for _ in 0..3000 {
        host.advance(STEP, &mut scores);
        if host.game().is_some_and(|g| g.phase() == Phase::Lost) {
            break;
        }
    }
    let final_score = host.game().map(|g| g.score()).unwrap_or_default();
    assert!(final_score > 0);

    host.dispatch(Input::Restart, &mut scores);
    let game = host.game().unwrap();
    assert_eq!(game.score(), 0);
    assert_eq!(game.phase(), Phase::Idle);
    assert_eq!(best_stat(&host), Some(final_score.to_string()));
    assert_eq!(scores.best(ScoreKey::Dino), final_score);
}

#[test]
fn tetris_starts_on_mount_and_others_wait() {
    let mut scores = ScoreStore::in_memory();
    let mut host = GameHost::new(Some(2));
    host.mount(GameId::Tetris, &mut scores);
    assert_eq!(host.game().map(|g| g.phase()), Some(Phase::Playing));
    host.mount(GameId::Snake, &mut scores);
    host.advance(STEP * 60, &mut scores);
    assert_eq!(host.game().map(|g| g.phase()), Some(Phase::Idle));
    host.dispatch(Input::Move(Dir::Down), &mut scores);
    assert_eq!(host.game().map(|g| g.phase()), Some(Phase::Playing));
}

#[test]
fn paused_game_does_not_advance() {
    let mut scores = ScoreStore::in_memory();
    let mut host = GameHost::new(Some(3));
    host.mount(GameId::Flappy, &mut scores);
    host.dispatch(Input::Primary, &mut scores);
    host.dispatch(Input::Pause, &mut scores);
    for _ in 0..600 {
        assert_eq!(host.advance(STEP, &mut scores), 0);
    }
    assert_eq!(host.game().map(|g| g.phase()), Some(Phase::Playing));
}
