//! Opening repertoire trie.
//!
//! One trie per color holds every move sequence the player reached with that
//! color, both sides' moves included. Each node counts the games that passed
//! through it and their outcomes from there on; `ended_here` counts games
//! whose recorded moves stop at the node, so that
//! `visit_count == Σ children.visit_count + ended_here` holds everywhere.

use serde::Serialize;

use super::filter::GameFilter;
use super::types::{GameRecord, OutcomeTally, PlayerColor};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrieNode {
    /// SAN of the move leading here; empty at the root.
    #[serde(rename = "move")]
    pub mv: String,
    pub visit_count: u32,
    pub outcomes: OutcomeTally,
    pub ended_here: u32,
    /// First-seen order.
    pub children: Vec<TrieNode>,
}

impl TrieNode {
    fn new(mv: &str) -> Self {
        Self {
            mv: mv.to_string(),
            ..Self::default()
        }
    }

    pub fn child(&self, mv: &str) -> Option<&TrieNode> {
        self.children.iter().find(|child| child.mv == mv)
    }

    fn child_or_insert(&mut self, mv: &str) -> &mut TrieNode {
        let index = match self.children.iter().position(|child| child.mv == mv) {
            Some(index) => index,
            None => {
                self.children.push(TrieNode::new(mv));
                self.children.len() - 1
            }
        };
        &mut self.children[index]
    }

    /// Most visited child; ties go to the one seen first.
    pub fn most_played(&self) -> Option<&TrieNode> {
        self.children
            .iter()
            .reduce(|best, child| if child.visit_count > best.visit_count { child } else { best })
    }

    /// Games that continued past this node.
    pub fn continued(&self) -> u32 {
        self.visit_count - self.ended_here
    }

    fn node_count(&self) -> usize {
        1 + self.children.iter().map(TrieNode::node_count).sum::<usize>()
    }

    fn depth(&self) -> usize {
        self.children
            .iter()
            .map(|child| 1 + child.depth())
            .max()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningTrie {
    pub color: PlayerColor,
    pub root: TrieNode,
}

impl OpeningTrie {
    /// Games that contributed to this trie.
    pub fn games(&self) -> u32 {
        self.root.visit_count
    }

    pub fn node_at<S: AsRef<str>>(&self, path: &[S]) -> Option<&TrieNode> {
        path.iter()
            .try_fold(&self.root, |node, mv| node.child(mv.as_ref()))
    }

    pub fn most_played_reply<S: AsRef<str>>(&self, path: &[S]) -> Option<&str> {
        self.node_at(path)?.most_played().map(|node| node.mv.as_str())
    }

    /// Each reply after `path` with its share of the games that continued.
    /// Shares sum to 1 unless no game continued.
    pub fn reply_weights<S: AsRef<str>>(&self, path: &[S]) -> Vec<(&str, f64)> {
        let Some(node) = self.node_at(path) else {
            return Vec::new();
        };
        let continued = node.continued();
        if continued == 0 {
            return Vec::new();
        }
        node.children
            .iter()
            .map(|child| {
                (
                    child.mv.as_str(),
                    f64::from(child.visit_count) / f64::from(continued),
                )
            })
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }

    pub fn max_depth(&self) -> usize {
        self.root.depth()
    }
}

/// Builds the trie of all games `color` played in the batch.
pub fn build_trie(games: &[GameRecord], color: PlayerColor) -> OpeningTrie {
    build_trie_filtered(games, color, &GameFilter::default())
}

pub fn build_trie_filtered(
    games: &[GameRecord],
    color: PlayerColor,
    filter: &GameFilter,
) -> OpeningTrie {
    let mut root = TrieNode::default();

    for game in filter
        .apply(games)
        .filter(|game| game.player_color == color)
    {
        let mut node = &mut root;
        node.visit_count += 1;
        node.outcomes.record(game.result);

        for mv in &game.moves {
            node = node.child_or_insert(mv);
            node.visit_count += 1;
            node.outcomes.record(game.result);
        }

        node.ended_here += 1;
    }

    OpeningTrie { color, root }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::types::GameResult;

    fn game(moves: &str, color: PlayerColor, result: GameResult) -> GameRecord {
        GameRecord::new(
            moves.split_whitespace().map(str::to_string).collect(),
            color,
            result,
        )
    }

    fn scenario() -> Vec<GameRecord> {
        vec![
            game("e4 e5 Nf3", PlayerColor::White, GameResult::Draw),
            game("e4 e5 Nf3", PlayerColor::White, GameResult::Win),
            game("d4 d5", PlayerColor::White, GameResult::Loss),
            game("e4 c5", PlayerColor::Black, GameResult::Win),
        ]
    }

    fn assert_conserved(node: &TrieNode) {
        let children: u32 = node.children.iter().map(|c| c.visit_count).sum();
        assert_eq!(node.visit_count, children + node.ended_here, "at {}", node.mv);
        assert_eq!(node.visit_count, node.outcomes.total());
        node.children.iter().for_each(assert_conserved);
    }

    #[test]
    fn test_three_game_scenario() {
        let trie = build_trie(&scenario(), PlayerColor::White);

        assert_eq!(trie.games(), 3);
        let e4 = trie.root.child("e4").unwrap();
        assert_eq!(e4.visit_count, 2);
        assert_eq!(
            e4.outcomes,
            OutcomeTally {
                wins: 1,
                losses: 0,
                draws: 1
            }
        );
        let d4 = trie.root.child("d4").unwrap();
        assert_eq!(d4.visit_count, 1);
        assert_eq!(
            d4.outcomes,
            OutcomeTally {
                wins: 0,
                losses: 1,
                draws: 0
            }
        );
        assert_eq!(trie.node_at(&["e4", "e5", "Nf3"]).unwrap().ended_here, 2);
        assert_conserved(&trie.root);
    }

    #[test]
    fn test_filters_by_color() {
        let trie = build_trie(&scenario(), PlayerColor::Black);
        assert_eq!(trie.games(), 1);
        assert_eq!(trie.most_played_reply(&["e4"]), Some("c5"));
    }

    #[test]
    fn test_zero_move_games_count_at_root() {
        let games = vec![
            game("", PlayerColor::White, GameResult::Draw),
            game("e4", PlayerColor::White, GameResult::Win),
        ];
        let trie = build_trie(&games, PlayerColor::White);
        assert_eq!(trie.games(), 2);
        assert_eq!(trie.root.ended_here, 1);
        assert_eq!(trie.root.children.len(), 1);
        assert_conserved(&trie.root);
    }

    #[test]
    fn test_shorter_game_ends_on_shared_prefix() {
        let games = vec![
            game("e4 e5", PlayerColor::White, GameResult::Loss),
            game("e4 e5 Nf3 Nc6", PlayerColor::White, GameResult::Win),
        ];
        let trie = build_trie(&games, PlayerColor::White);
        let e5 = trie.node_at(&["e4", "e5"]).unwrap();
        assert_eq!(e5.visit_count, 2);
        assert_eq!(e5.ended_here, 1);
        assert_eq!(e5.continued(), 1);
        assert_eq!(trie.node_at(&["e4", "e5", "Nf3", "Nc6"]).unwrap().ended_here, 1);
        assert_conserved(&trie.root);
    }

    #[test]
    fn test_most_played_tie_prefers_first_seen() {
        let games = vec![
            game("d4", PlayerColor::White, GameResult::Win),
            game("e4", PlayerColor::White, GameResult::Win),
            game("c4", PlayerColor::White, GameResult::Win),
            game("e4", PlayerColor::White, GameResult::Win),
            game("d4", PlayerColor::White, GameResult::Win),
        ];
        let trie = build_trie(&games, PlayerColor::White);
        assert_eq!(trie.most_played_reply::<&str>(&[]), Some("d4"));
        assert_eq!(trie.most_played_reply(&["c4"]), None);
        assert_eq!(trie.most_played_reply(&["h4"]), None);
    }

    #[test]
    fn test_reply_weights() {
        let games = vec![
            game("e4 e5", PlayerColor::White, GameResult::Win),
            game("e4 c5", PlayerColor::White, GameResult::Win),
            game("e4 c5", PlayerColor::White, GameResult::Win),
            game("e4", PlayerColor::White, GameResult::Win),
        ];
        let trie = build_trie(&games, PlayerColor::White);
        let weights = trie.reply_weights(&["e4"]);
        assert_eq!(weights.len(), 2);
        assert_eq!(weights[0].0, "e5");
        assert!((weights[0].1 - 1.0 / 3.0).abs() < 1e-12);
        assert!((weights[1].1 - 2.0 / 3.0).abs() < 1e-12);
        assert!(trie.reply_weights(&["e4", "e5"]).is_empty());
    }

    #[test]
    fn test_build_is_idempotent() {
        let games = scenario();
        assert_eq!(
            build_trie(&games, PlayerColor::White),
            build_trie(&games, PlayerColor::White)
        );
    }

    #[test]
    fn test_node_count_and_depth() {
        let trie = build_trie(&scenario(), PlayerColor::White);
        // root, e4, e5, Nf3, d4, d5
        assert_eq!(trie.node_count(), 6);
        assert_eq!(trie.max_depth(), 3);
        let empty = build_trie(&[], PlayerColor::White);
        assert_eq!(empty.games(), 0);
        assert_eq!(empty.max_depth(), 0);
    }

    #[test]
    fn test_filtered_build() {
        let mut games = scenario();
        games[2].rated = true;
        let trie = build_trie_filtered(&games, PlayerColor::White, &GameFilter::default().rated_only());
        assert_eq!(trie.games(), 1);
        assert!(trie.root.child("e4").is_none());
    }

    #[test]
    fn test_serializes_nested() {
        let trie = build_trie(&scenario()[2..3], PlayerColor::White);
        let json = serde_json::to_value(&trie).unwrap();
        assert_eq!(json["color"], "white");
        assert_eq!(json["root"]["visitCount"], 1);
        assert_eq!(json["root"]["children"][0]["move"], "d4");
        assert_eq!(json["root"]["children"][0]["outcomes"]["losses"], 1);
        assert_eq!(json["root"]["children"][0]["children"][0]["endedHere"], 1);
    }
}
