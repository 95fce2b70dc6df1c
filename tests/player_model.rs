use opponent_model::{
    GameFilter, KnownRatings, ModelConfig, ModelError, PlayerColor, ProviderGame, RatingOutcome,
    TimeControl, TrieNode, build_error_profile, build_player_model, build_trie, estimate_fide,
    normalize_batch,
};
use serde_json::{Value, json};

fn provider_game(id: &str, moves: &str, white: &str, black: &str, winner: Option<&str>) -> Value {
    json!({
        "id": id,
        "rated": true,
        "variant": "standard",
        "speed": "rapid",
        "createdAt": 1_700_000_000_000i64,
        "status": if winner.is_some() { "resign" } else { "draw" },
        "winner": winner,
        "players": {
            "white": {"user": {"name": white, "id": white.to_lowercase()}, "rating": 1810},
            "black": {"user": {"name": black, "id": black.to_lowercase()}, "rating": 1790}
        },
        "moves": moves
    })
}

fn parse(games: Vec<Value>) -> Vec<ProviderGame> {
    games
        .into_iter()
        .map(|game| serde_json::from_value(game).unwrap())
        .collect()
}

fn assert_conserved(node: &TrieNode) {
    let children: u32 = node.children.iter().map(|child| child.visit_count).sum();
    assert_eq!(node.visit_count, children + node.ended_here);
    node.children.iter().for_each(assert_conserved);
}

#[test]
fn test_three_game_white_repertoire() {
    let games = parse(vec![
        provider_game("a", "1.e4 e5 2.Nf3", "Hero", "Villain", None),
        provider_game("b", "1.e4 e5 2.Nf3", "Hero", "Villain", Some("white")),
        provider_game("c", "1.d4 d5", "Hero", "Villain", Some("black")),
    ]);

    let batch = normalize_batch(&games, "hero").unwrap();
    let trie = build_trie(&batch.games, PlayerColor::White);

    assert_eq!(trie.root.visit_count, 3);
    let e4 = trie.root.child("e4").unwrap();
    assert_eq!(e4.visit_count, 2);
    assert_eq!((e4.outcomes.wins, e4.outcomes.draws, e4.outcomes.losses), (1, 1, 0));
    let d4 = trie.root.child("d4").unwrap();
    assert_eq!(d4.visit_count, 1);
    assert_eq!(d4.outcomes.losses, 1);
    assert_conserved(&trie.root);

    assert_eq!(trie, build_trie(&batch.games, PlayerColor::White));
}

#[test]
fn test_unanalysed_batch_has_no_rating() {
    let games = parse(vec![
        provider_game("a", "e4 e5 Nf3 Nc6", "Hero", "Villain", Some("white")),
        provider_game("b", "d4 Nf6 c4 e6", "Villain", "Hero", Some("white")),
    ]);

    let batch = normalize_batch(&games, "Hero").unwrap();
    let profile = build_error_profile(&batch.games, &ModelConfig::default());
    for phase in &profile.phases {
        assert_eq!(phase.sample_moves, 0);
        assert_eq!(phase.mistake_rate, 0.0);
        assert_eq!(phase.blunder_rate, 0.0);
    }

    assert_eq!(
        estimate_fide(&KnownRatings::new(), &profile, 2),
        Err(ModelError::InsufficientData)
    );
}

#[test]
fn test_blunder_heavy_batch_rates_lower() {
    let analysed = |loss: i32| {
        let mut game = provider_game("a", "e4 e5 Nf3 Nc6 Bc4 Bc5", "Hero", "Villain", Some("white"));
        // Hero's third move drops `loss` centipawns.
        game["analysis"] = json!([
            {"eval": 20}, {"eval": 20}, {"eval": 20},
            {"eval": 20}, {"eval": 20 - loss}, {"eval": 20 - loss}
        ]);
        game
    };
    let known = KnownRatings::from([(TimeControl::Rapid, 1800)]);
    let config = ModelConfig::default();

    let rating_for = |loss| {
        let batch = normalize_batch(&parse(vec![analysed(loss)]), "hero").unwrap();
        let profile = build_error_profile(&batch.games, &config);
        estimate_fide(&known, &profile, 1).unwrap().rating
    };

    assert!(rating_for(500) < rating_for(0));
}

#[test]
fn test_build_player_model_end_to_end() {
    let mut analysed = provider_game("a", "e4 e5 Nf3 Nc6", "Hero", "Villain", Some("white"));
    analysed["analysis"] = json!([{"eval": 30}, {"eval": 25}, {"eval": -300}, {"eval": -280}]);

    let games = parse(vec![
        analysed,
        provider_game("b", "d4 d5 c4", "Villain", "Hero", Some("black")),
        provider_game("c", "e4 c5", "Stranger", "Someone", Some("white")),
        provider_game("d", "", "Hero", "Villain", None),
    ]);

    let model = build_player_model(
        &games,
        "hero",
        &KnownRatings::new(),
        &GameFilter::default(),
        &ModelConfig::default(),
    )
    .unwrap();

    assert_eq!(model.games_used, 3);
    assert_eq!(model.games_skipped, 1);
    assert_eq!(model.white.games(), 2);
    assert_eq!(model.black.games(), 1);
    assert_eq!(model.errors.games_analyzed, 1);
    assert_eq!(model.errors.total_sample_moves(), 2);
    assert_eq!(model.style.sample_size, 2);

    // Ratings come from the rated games in the batch.
    let RatingOutcome::Estimated(estimate) = &model.rating else {
        panic!("expected an estimate, got {:?}", model.rating);
    };
    assert!(estimate.confidence <= 90);

    let json = serde_json::to_value(&model).unwrap();
    assert_eq!(json["rating"]["status"], "estimated");
    assert_eq!(json["white"]["root"]["visitCount"], 2);
    assert_eq!(json["errors"]["phases"][0]["blunderRate"], 0.5);
}

#[test]
fn test_build_player_model_escalates_batch_failures() {
    let games = parse(vec![provider_game("a", "e4", "Stranger", "Someone", Some("white"))]);
    let result = build_player_model(
        &games,
        "hero",
        &KnownRatings::new(),
        &GameFilter::default(),
        &ModelConfig::default(),
    );
    assert_eq!(result.unwrap_err(), ModelError::NoUsableGames { total: 1 });

    let games = parse(vec![provider_game("a", "e4", "Hero", "Someone", Some("white"))]);
    let filtered = build_player_model(
        &games,
        "hero",
        &KnownRatings::new(),
        &GameFilter::default().time_controls([TimeControl::Bullet]),
        &ModelConfig::default(),
    );
    assert!(matches!(filtered, Err(ModelError::NoUsableGames { .. })));
}
