//! Three-player tournament
//!
//! Round-robin first (every pair once), then a handful of final battles
//! seeded from the standings at the moment the round-robin ends. The
//! tournament only tracks players and the schedule; the match controller
//! asks it who plays next and reports who won.

use serde::{Deserialize, Serialize};

use crate::consts::{COLOR_PLAYER1, COLOR_PLAYER2, COLOR_PLAYER3};

/// Points for a match win
pub const POINTS_PER_WIN: u32 = 3;

/// A tournament entrant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentPlayer {
    pub id: u8,
    pub name: String,
    /// Paddle colour while this player is on court (0xRRGGBB)
    pub color: u32,
    pub wins: u32,
    pub losses: u32,
    pub points: u32,
}

impl TournamentPlayer {
    pub fn new(id: u8, name: impl Into<String>, color: u32) -> Self {
        Self {
            id,
            name: name.into(),
            color,
            wins: 0,
            losses: 0,
            points: 0,
        }
    }
}

/// A scheduled match; `player1` takes the left paddle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentMatch {
    pub player1: u8,
    pub player2: u8,
    pub winner: Option<u8>,
    /// Set on final battles
    pub title: Option<String>,
}

impl TournamentMatch {
    fn new(player1: u8, player2: u8, title: Option<&str>) -> Self {
        Self {
            player1,
            player2,
            winner: None,
            title: title.map(str::to_string),
        }
    }
}

/// Progress summary for the scoreboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentStatus {
    /// 1-based number of the match being played
    pub current: usize,
    pub total: usize,
    pub complete: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tournament {
    players: [TournamentPlayer; 3],
    round_robin: Vec<TournamentMatch>,
    /// Empty until the round-robin is over
    final_battles: Vec<TournamentMatch>,
    finals_seeded: bool,
    current_index: usize,
    complete: bool,
}

impl Default for Tournament {
    fn default() -> Self {
        Self::new()
    }
}

impl Tournament {
    pub fn new() -> Self {
        Self::with_players([
            TournamentPlayer::new(1, "Player 1", COLOR_PLAYER1),
            TournamentPlayer::new(2, "Player 2", COLOR_PLAYER2),
            TournamentPlayer::new(3, "Player 3", COLOR_PLAYER3),
        ])
    }

    pub fn with_players(players: [TournamentPlayer; 3]) -> Self {
        let round_robin = round_robin(&players);
        Self {
            players,
            round_robin,
            final_battles: Vec::new(),
            finals_seeded: false,
            current_index: 0,
            complete: false,
        }
    }

    pub fn players(&self) -> &[TournamentPlayer] {
        &self.players
    }

    pub fn player(&self, id: u8) -> Option<&TournamentPlayer> {
        self.players.iter().find(|p| p.id == id)
    }

    fn player_mut(&mut self, id: u8) -> Option<&mut TournamentPlayer> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// Every match scheduled so far, in play order
    pub fn schedule(&self) -> impl Iterator<Item = &TournamentMatch> {
        self.round_robin.iter().chain(self.final_battles.iter())
    }

    pub fn total_matches(&self) -> usize {
        self.round_robin.len() + self.final_battles.len()
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// The match to play next, or `None` once the tournament is over
    pub fn current_match(&self) -> Option<&TournamentMatch> {
        if self.complete {
            return None;
        }
        self.schedule().nth(self.current_index)
    }

    fn current_match_mut(&mut self) -> Option<&mut TournamentMatch> {
        if self.complete {
            return None;
        }
        let rr = self.round_robin.len();
        if self.current_index < rr {
            self.round_robin.get_mut(self.current_index)
        } else {
            self.final_battles.get_mut(self.current_index - rr)
        }
    }

    /// Display title: the final-battle title, or "A vs B"
    pub fn match_title(&self, m: &TournamentMatch) -> String {
        if let Some(title) = &m.title {
            return title.clone();
        }
        let name = |id| {
            self.player(id)
                .map(|p| p.name.clone())
                .unwrap_or_else(|| format!("Player {id}"))
        };
        format!("{} vs {}", name(m.player1), name(m.player2))
    }

    pub fn status(&self) -> TournamentStatus {
        let total = self.total_matches();
        TournamentStatus {
            current: (self.current_index + 1).min(total),
            total,
            complete: self.complete,
        }
    }

    /// Players by points, then wins. Computed on every call.
    pub fn standings(&self) -> Vec<TournamentPlayer> {
        let mut sorted = self.players.to_vec();
        sorted.sort_by(|a, b| b.points.cmp(&a.points).then(b.wins.cmp(&a.wins)));
        sorted
    }

    /// Tournament leader once every match has been played
    pub fn winner(&self) -> Option<TournamentPlayer> {
        if !self.complete {
            return None;
        }
        self.standings().into_iter().next()
    }

    /// Credit the current match to `winner_id` and move on. Ignored when
    /// there is no current match or the id is not one of its players.
    pub fn record_match_result(&mut self, winner_id: u8) {
        let Some(m) = self.current_match_mut() else {
            log::warn!("Result for player {winner_id} with no match in progress");
            return;
        };
        let loser_id = if m.player1 == winner_id {
            m.player2
        } else if m.player2 == winner_id {
            m.player1
        } else {
            log::warn!(
                "Player {winner_id} is not in the current match ({} vs {})",
                m.player1,
                m.player2
            );
            return;
        };
        m.winner = Some(winner_id);

        if let Some(winner) = self.player_mut(winner_id) {
            winner.wins += 1;
            winner.points += POINTS_PER_WIN;
        }
        if let Some(loser) = self.player_mut(loser_id) {
            loser.losses += 1;
        }
        self.current_index += 1;
        log::info!(
            "Tournament: player {} beat player {} ({}/{})",
            winner_id,
            loser_id,
            self.current_index,
            self.total_matches()
        );

        if !self.finals_seeded && self.current_index >= self.round_robin.len() {
            self.final_battles = seed_final_battles(&self.standings());
            self.finals_seeded = true;
            log::info!("Final battles seeded: {} match(es)", self.final_battles.len());
        }

        if self.current_index >= self.total_matches() {
            self.complete = true;
            log::info!("Tournament complete");
        }
    }

    /// Clear results and rebuild the round-robin
    pub fn reset(&mut self) {
        for player in self.players.iter_mut() {
            player.wins = 0;
            player.losses = 0;
            player.points = 0;
        }
        self.round_robin = round_robin(&self.players);
        self.final_battles.clear();
        self.finals_seeded = false;
        self.current_index = 0;
        self.complete = false;
    }
}

/// Each pair once: 1v2, 2v3, 1v3
fn round_robin(players: &[TournamentPlayer; 3]) -> Vec<TournamentMatch> {
    let [a, b, c] = players;
    vec![
        TournamentMatch::new(a.id, b.id, None),
        TournamentMatch::new(b.id, c.id, None),
        TournamentMatch::new(a.id, c.id, None),
    ]
}

/// Final battles from a standings snapshot (best first).
///
/// A tie between 2nd and 3rd skips the decider. The leader gets a grudge
/// match against 3rd after a clean 2-1-0 ladder.
pub fn seed_final_battles(standings: &[TournamentPlayer]) -> Vec<TournamentMatch> {
    let [champion, runner, third, ..] = standings else {
        return Vec::new();
    };

    let mut battles = Vec::new();
    if runner.points != third.points {
        battles.push(TournamentMatch::new(
            runner.id,
            third.id,
            Some("Battle for 2nd Place"),
        ));
    }
    battles.push(TournamentMatch::new(
        champion.id,
        runner.id,
        Some("Championship Match"),
    ));
    if champion.wins == 2 && runner.wins == 1 && third.wins < runner.wins {
        battles.push(TournamentMatch::new(
            champion.id,
            third.id,
            Some("Grudge Match"),
        ));
    }
    battles
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standing(id: u8, wins: u32) -> TournamentPlayer {
        TournamentPlayer {
            wins,
            points: wins * POINTS_PER_WIN,
            ..TournamentPlayer::new(id, format!("Player {id}"), 0)
        }
    }

    /// Play out the current match with the given winner
    fn play(t: &mut Tournament, winner: u8) {
        assert!(t.current_match().is_some());
        t.record_match_result(winner);
    }

    #[test]
    fn test_round_robin_pairs_everyone_once() {
        let t = Tournament::new();
        let pairs: Vec<(u8, u8)> = t.schedule().map(|m| (m.player1, m.player2)).collect();
        assert_eq!(pairs, vec![(1, 2), (2, 3), (1, 3)]);
        assert_eq!(
            t.status(),
            TournamentStatus {
                current: 1,
                total: 3,
                complete: false
            }
        );
    }

    #[test]
    fn test_tied_second_and_third_skip_decider() {
        let battles = seed_final_battles(&[standing(1, 2), standing(2, 1), standing(3, 1)]);
        assert_eq!(battles.len(), 1);
        assert_eq!(battles[0].title.as_deref(), Some("Championship Match"));
        assert_eq!((battles[0].player1, battles[0].player2), (1, 2));
    }

    #[test]
    fn test_clean_ladder_gets_decider_and_grudge() {
        let battles = seed_final_battles(&[standing(1, 2), standing(2, 1), standing(3, 0)]);
        let titles: Vec<_> = battles.iter().filter_map(|m| m.title.as_deref()).collect();
        assert_eq!(
            titles,
            vec!["Battle for 2nd Place", "Championship Match", "Grudge Match"]
        );
        assert_eq!((battles[0].player1, battles[0].player2), (2, 3));
        assert_eq!((battles[2].player1, battles[2].player2), (1, 3));
    }

    #[test]
    fn test_three_way_tie_goes_straight_to_championship() {
        let mut t = Tournament::new();
        play(&mut t, 1); // 1 beats 2
        play(&mut t, 2); // 2 beats 3
        play(&mut t, 3); // 3 beats 1
        assert_eq!(t.total_matches(), 4);
        let m = t.current_match().cloned();
        assert_eq!(m.as_ref().and_then(|m| m.title.as_deref()), Some("Championship Match"));
        assert_eq!(t.status().current, 4);
        assert!(!t.status().complete);
    }

    #[test]
    fn test_full_tournament_completes() {
        let mut t = Tournament::new();
        play(&mut t, 1); // 1 beats 2
        play(&mut t, 2); // 2 beats 3
        play(&mut t, 1); // 1 beats 3
        // [6, 3, 0]: decider, championship, grudge
        assert_eq!(t.total_matches(), 6);

        play(&mut t, 2);
        play(&mut t, 1);
        assert!(t.winner().is_none());
        play(&mut t, 1);

        let status = t.status();
        assert!(status.complete);
        assert_eq!(status.total, 6);
        assert!(t.current_match().is_none());
        assert_eq!(t.winner().map(|p| p.id), Some(1));
        assert_eq!(t.player(1).map(|p| (p.wins, p.losses, p.points)), Some((4, 0, 12)));
    }

    #[test]
    fn test_finals_seeded_once() {
        let mut t = Tournament::new();
        play(&mut t, 1);
        play(&mut t, 2);
        play(&mut t, 1);
        let seeded: Vec<_> = t.schedule().cloned().collect();

        // Standings reorder during the finals; the schedule stays put
        play(&mut t, 3);
        play(&mut t, 2);
        let now: Vec<(u8, u8)> = t.schedule().map(|m| (m.player1, m.player2)).collect();
        let before: Vec<(u8, u8)> = seeded.iter().map(|m| (m.player1, m.player2)).collect();
        assert_eq!(now, before);
    }

    #[test]
    fn test_result_after_completion_is_ignored() {
        let mut t = Tournament::new();
        for winner in [1, 2, 3, 1] {
            play(&mut t, winner);
        }
        assert!(t.is_complete());
        let before = t.standings();
        t.record_match_result(2);
        assert_eq!(t.standings(), before);
    }

    #[test]
    fn test_unknown_winner_is_ignored() {
        let mut t = Tournament::new();
        t.record_match_result(3);
        assert_eq!(t.status().current, 1);
        assert!(t.players().iter().all(|p| p.points == 0));
    }

    #[test]
    fn test_standings_break_ties_on_wins() {
        let mut t = Tournament::new();
        play(&mut t, 2); // 2 beats 1
        let standings = t.standings();
        assert_eq!(standings[0].id, 2);
        // 1 and 3 tied on 0 points and 0 wins: id order kept
        assert_eq!(standings[1].id, 1);
        assert_eq!(standings[2].id, 3);
    }

    #[test]
    fn test_titles() {
        let t = Tournament::new();
        let first = t.current_match().cloned();
        assert_eq!(first.map(|m| t.match_title(&m)).as_deref(), Some("Player 1 vs Player 2"));
    }

    #[test]
    fn test_reset() {
        let mut t = Tournament::new();
        for winner in [1, 2, 3, 1] {
            play(&mut t, winner);
        }
        t.reset();
        assert_eq!(t.total_matches(), 3);
        assert!(!t.is_complete());
        assert_eq!(t.status().current, 1);
        assert!(t.players().iter().all(|p| p.wins == 0 && p.losses == 0 && p.points == 0));
    }
}
