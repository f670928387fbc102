use flotilla_shared::*;

use crate::physics::ArenaState;

impl ArenaState {
    /// The frame a bot playing as `player` receives this turn. Every player
    /// is listed, including eliminated ones with no ships.
    pub fn observe(&self, player: PlayerId) -> WorldFrame {
        WorldFrame {
            turn: self.turn,
            my_id: player,
            players: self.players.clone(),
            planets: self.planets.clone(),
        }
    }

    pub fn snapshot_for(&self, player: PlayerId) -> WorldSnapshot {
        WorldSnapshot::new(self.observe(player))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observation_is_per_player() {
        let config = MatchConfig {
            players: 3,
            ..Default::default()
        };
        let state = ArenaState::new(&config).unwrap();

        for id in 0..3 {
            let world = state.snapshot_for(id);
            assert_eq!(world.my_id(), id);
            assert_eq!(world.player_count(), 3);
            assert_eq!(world.my_ships().count(), DEFAULT_SHIPS_PER_PLAYER);
            assert_eq!(world.planets().len(), state.planets.len());
        }
    }

    #[test]
    fn test_frame_survives_the_wire() {
        let state = ArenaState::new(&MatchConfig::default()).unwrap();
        let json = serde_json::to_string(&state.observe(1)).unwrap();
        let frame: WorldFrame = serde_json::from_str(&json).unwrap();

        let world = WorldSnapshot::new(frame);
        assert_eq!(world.my_id(), 1);
        assert_eq!(world.enemy_ships().count(), DEFAULT_SHIPS_PER_PLAYER);
    }
}
