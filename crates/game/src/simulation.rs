//! Game simulation - the main frame loop.
//!
//! Every tick moves the level's platforms, then runs each player's frame
//! against the level geometry with a fixed time step.

use serde::{Deserialize, Serialize};
use stride_physics::machine::BehaviorRegistry;

use crate::capture::InputCapture;
use crate::input::InputBus;
use crate::level::{Level, SpawnPoint};
use crate::player::{EntityId, Player};
use crate::profile::ControllerProfile;

/// Game simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Simulation tick rate (ticks per second).
    pub tick_rate: u32,

    /// Profile every new player is built from.
    pub profile: ControllerProfile,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            profile: ControllerProfile::default(),
        }
    }
}

impl SimulationConfig {
    /// Get the time step per tick in seconds.
    pub fn delta_time(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }
}

/// The main game simulation.
///
/// Owns the level, the input bus every player subscribes to and the shared
/// input capture.
#[derive(Debug)]
pub struct Simulation {
    /// Current frame/tick number.
    pub frame: u64,

    pub config: SimulationConfig,

    pub level: Level,

    pub players: Vec<Player>,

    /// Devices (or scripts) publish actions here.
    pub input: InputBus,

    capture: InputCapture,

    registry: BehaviorRegistry,

    /// Next entity ID to assign.
    next_entity_id: EntityId,
}

impl Simulation {
    pub fn new(config: SimulationConfig, level: Level) -> Self {
        Self::with_registry(config, level, BehaviorRegistry::standard())
    }

    /// Simulation whose players resolve state behaviors from `registry`.
    pub fn with_registry(config: SimulationConfig, level: Level, registry: BehaviorRegistry) -> Self {
        Self {
            frame: 0,
            config,
            level,
            players: Vec::new(),
            input: InputBus::standard(),
            capture: InputCapture::new(),
            registry,
            next_entity_id: 1,
        }
    }

    /// Create a simulation with default configuration and test arena.
    pub fn test() -> Self {
        Self::new(SimulationConfig::default(), Level::test_arena())
    }

    /// Add a player to the simulation.
    ///
    /// Returns the player's ID. A player whose profile does not configure
    /// cleanly still joins, degraded.
    pub fn add_player(&mut self, name: &str) -> EntityId {
        let spawn_index = self.players.len() % self.level.player_spawn_count().max(1);
        let spawn = self
            .level
            .get_player_spawn(spawn_index)
            .copied()
            .unwrap_or(SpawnPoint {
                position: glam::Vec3::ZERO,
                facing: 0.0,
            });

        let id = self.next_entity_id;
        let player = Player::spawn(
            id,
            name,
            &self.config.profile,
            &self.registry,
            &mut self.input,
            &self.capture,
            &spawn,
        );
        self.next_entity_id += 1;

        log::debug!("player {id} `{name}` joined");
        self.players.push(player);
        id
    }

    /// Remove a player, releasing its input subscription and capture.
    pub fn remove_player(&mut self, player_id: EntityId) -> bool {
        let Some(index) = self.players.iter().position(|p| p.id == player_id) else {
            return false;
        };
        let mut player = self.players.remove(index);
        player.teardown(&mut self.input);
        log::debug!("player {player_id} left");
        true
    }

    /// Get a player by ID.
    pub fn get_player(&self, player_id: EntityId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    /// Get a mutable reference to a player by ID.
    pub fn get_player_mut(&mut self, player_id: EntityId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == player_id)
    }

    pub fn capture(&self) -> &InputCapture {
        &self.capture
    }

    /// Advance the simulation by one tick.
    pub fn tick(&mut self) {
        let delta_time = self.config.delta_time();

        self.level.update_platforms(delta_time);

        for player in &mut self.players {
            player.frame(&mut self.input, &self.level.collision, delta_time);
        }

        self.frame += 1;
    }

    /// Get the delta time for this simulation.
    pub fn delta_time(&self) -> f32 {
        self.config.delta_time()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_simulation_creation() {
        let sim = Simulation::test();
        assert_eq!(sim.frame, 0);
        assert!(sim.players.is_empty());
        assert!(!sim.capture().is_captured());
    }

    #[test]
    fn test_add_player() {
        let mut sim = Simulation::test();

        let id = sim.add_player("Player1");
        assert!(id > 0);
        assert_eq!(sim.players.len(), 1);

        let player = sim.get_player(id).unwrap();
        assert_eq!(player.name, "Player1");
        assert!(player.has_capture());
        assert_eq!(sim.input.subscriber_count(), 1);
    }

    #[test]
    fn test_remove_player_releases_input() {
        let mut sim = Simulation::test();
        let id = sim.add_player("Player1");

        assert!(sim.remove_player(id));
        assert!(!sim.remove_player(id));
        assert_eq!(sim.input.subscriber_count(), 0);
        assert!(!sim.capture().is_captured());
    }

    #[test]
    fn test_tick_advances_frame() {
        let mut sim = Simulation::test();
        sim.add_player("Test");

        sim.tick();
        assert_eq!(sim.frame, 1);

        sim.tick();
        assert_eq!(sim.frame, 2);
    }

    #[test]
    fn test_movement_input() {
        let mut sim = Simulation::test();
        let id = sim.add_player("Test");

        let start_pos = sim.get_player(id).unwrap().position();

        sim.input.set_axis("Move", Vec2::new(0.0, 1.0)).unwrap();
        for _ in 0..60 {
            sim.tick();
        }

        let end_pos = sim.get_player(id).unwrap().position();
        let distance = (end_pos - start_pos).length();

        assert!(distance > 1.0, "Player should have moved, distance={}", distance);
    }

    #[test]
    fn test_determinism() {
        let run = || {
            let mut sim = Simulation::test();
            sim.add_player("Test");
            for i in 0..100 {
                let forward = if i % 2 == 0 { 1.0 } else { 0.0 };
                let right = if i % 3 == 0 { 1.0 } else { 0.0 };
                sim.input.set_axis("Move", Vec2::new(right, forward)).unwrap();
                sim.input.press("Jump", i % 10 == 0).unwrap();
                sim.tick();
            }
            sim.get_player(1).unwrap().position()
        };

        let pos1 = run();
        let pos2 = run();

        assert!(
            (pos1 - pos2).length() < 0.0001,
            "Simulations should be deterministic: {:?} vs {:?}",
            pos1,
            pos2
        );
    }
}
