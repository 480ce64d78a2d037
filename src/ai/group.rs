//! Agent group
//!
//! Owns every agent plus the resources they share: the attacker-slot
//! counter, the seeded RNG, the event queue and debug counters. One call to
//! [`AgentGroup::update`] advances the whole group by one frame.
//!
//! # Example
//!
//! ```ignore
//! let mut group = AgentGroup::new(AiConfig::default(), grid)?;
//! let grunt = group.spawn(TileCoord::new(9, 11), ArchetypeKind::Grunt);
//! group.set_waypoints(grunt, vec![Vec2::new(512.0, 352.0)]);
//!
//! // Each frame
//! let xp = group.update(dt, &mut player, &rocks);
//! for event in group.events().iter() {
//!     // spawn orbs, damage numbers, sounds
//! }
//! ```

use glam::Vec2;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::agent::{Agent, AgentId, TickContext};
use super::archetype::Archetype;
use super::target::Target;
use crate::core::{AiConfig, AiEvent, AiStats, ConfigError, EventQueue};
use crate::world::{CollisionBox, DynamicBlockers, TileCoord, TileGrid};

// ============================================================================
// Attacker slots
// ============================================================================

/// Global cap on simultaneous attack windups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackerSlots {
    active: u32,
    max: u32,
}

impl AttackerSlots {
    /// Create a counter allowing `max` concurrent attackers
    #[must_use]
    pub fn new(max: u32) -> Self {
        Self { active: 0, max }
    }

    /// Reserve a slot if one is free
    pub fn try_acquire(&mut self) -> bool {
        if self.active < self.max {
            self.active += 1;
            true
        } else {
            false
        }
    }

    /// Return a slot. Never goes below zero.
    pub fn release(&mut self) {
        if self.active == 0 {
            log::warn!("Attacker slot released with none held");
            return;
        }
        self.active -= 1;
    }

    /// Slots currently held
    #[must_use]
    pub fn active(&self) -> u32 {
        self.active
    }

    /// Slot capacity
    #[must_use]
    pub fn max(&self) -> u32 {
        self.max
    }

    /// Whether another attacker could start a windup
    #[must_use]
    pub fn has_headroom(&self) -> bool {
        self.active < self.max
    }
}

// ============================================================================
// Group
// ============================================================================

/// The collection of agents and their shared state
pub struct AgentGroup {
    config: AiConfig,
    grid: TileGrid,
    agents: Vec<Agent>,
    next_id: u32,
    slots: AttackerSlots,
    blockers: DynamicBlockers,
    rng: StdRng,
    events: EventQueue,
    stats: AiStats,
    /// Scratch buffer for neighbor positions
    neighbors: Vec<Vec2>,
}

impl AgentGroup {
    /// Create an empty group over `grid`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the configuration fails validation.
    pub fn new(config: AiConfig, grid: TileGrid) -> Result<Self, ConfigError> {
        config.validate()?;
        if (grid.tile_size() - config.tile_size).abs() > f32::EPSILON {
            log::warn!(
                "Grid tile size {} differs from configured {}, using the grid's",
                grid.tile_size(),
                config.tile_size
            );
        }

        log::info!(
            "Agent group over {}x{} tiles, {} attacker slots, seed {:#x}",
            grid.width(),
            grid.height(),
            config.max_attackers,
            config.seed
        );

        Ok(Self {
            slots: AttackerSlots::new(config.max_attackers),
            rng: StdRng::seed_from_u64(config.seed),
            config,
            grid,
            agents: Vec::new(),
            next_id: 0,
            blockers: DynamicBlockers::new(),
            events: EventQueue::new(),
            stats: AiStats::new(),
            neighbors: Vec::new(),
        })
    }

    // -------------------------------------------------------------------------
    // Spawning
    // -------------------------------------------------------------------------

    /// Spawn an agent at the center of `tile`.
    ///
    /// If the tile is solid, blocked or already occupied, nearby rings of
    /// tiles are probed for a clear one. When none is found the agent is
    /// placed on the requested tile anyway.
    pub fn spawn(&mut self, tile: TileCoord, archetype: impl Into<Archetype>) -> AgentId {
        let tile = self.find_spawn_tile(tile);
        let position = self.grid.tile_center(tile);
        let id = AgentId::from_raw(self.next_id);
        self.next_id += 1;

        let agent = Agent::new(id, position, archetype.into(), &self.config, &mut self.rng);
        log::info!("Spawned agent {id} at {tile}");
        self.events.push(AiEvent::AgentSpawned { agent: id, position });
        self.agents.push(agent);
        id
    }

    fn find_spawn_tile(&self, requested: TileCoord) -> TileCoord {
        if self.is_spawnable(requested) {
            return requested;
        }

        for radius in 1..=self.config.spawn_probe_radius {
            for dy in -radius..=radius {
                for dx in -radius..=radius {
                    if dx.abs().max(dy.abs()) != radius {
                        continue;
                    }
                    let candidate = requested.offset(dx, dy);
                    if self.is_spawnable(candidate) {
                        log::debug!("Spawn moved from {requested} to {candidate}");
                        return candidate;
                    }
                }
            }
        }

        log::info!("No clear tile near {requested}, spawning there anyway");
        requested
    }

    fn is_spawnable(&self, tile: TileCoord) -> bool {
        if self.grid.is_solid(tile) || self.blockers.is_blocked(tile) {
            return false;
        }
        !self
            .agents
            .iter()
            .filter(|agent| agent.is_targetable())
            .any(|agent| self.grid.world_to_tile(agent.position()) == Some(tile))
    }

    // -------------------------------------------------------------------------
    // Tick
    // -------------------------------------------------------------------------

    /// Advance every agent by `dt` seconds.
    ///
    /// `blockers` are re-rasterized each call. Returns the total reward from
    /// agents that died this tick. Events raised during the tick become
    /// readable through [`events`](Self::events) once this returns.
    pub fn update<T, B>(&mut self, dt: f32, target: &mut T, blockers: &[B]) -> u32
    where
        T: Target,
        B: CollisionBox,
    {
        if !dt.is_finite() || dt < 0.0 {
            log::warn!("Ignoring tick with invalid dt {dt}");
            return 0;
        }
        let dt = dt.min(self.config.max_dt);

        self.blockers = DynamicBlockers::from_boxes(blockers, &self.grid);

        let mut reward: u32 = 0;
        for index in 0..self.agents.len() {
            self.neighbors.clear();
            self.neighbors.extend(
                self.agents
                    .iter()
                    .enumerate()
                    .filter(|(other, agent)| *other != index && agent.is_targetable())
                    .map(|(_, agent)| agent.position()),
            );

            let mut ctx = TickContext {
                config: &self.config,
                grid: &self.grid,
                blockers: &self.blockers,
                neighbors: &self.neighbors,
                slots: &mut self.slots,
                rng: &mut self.rng,
                events: &mut self.events,
                stats: &mut self.stats,
            };
            let report = self.agents[index].update(dt, &mut *target, &mut ctx);

            reward = reward.saturating_add(report.reward);
            if let Some(last_seen) = report.alerted {
                self.propagate_aggro(index, last_seen);
            }
        }

        let events = &mut self.events;
        self.agents.retain(|agent| {
            if agent.is_removable() {
                log::info!("Removed agent {}", agent.id());
                events.push(AiEvent::AgentRemoved { agent: agent.id() });
                false
            } else {
                true
            }
        });

        self.stats.ticks += 1;
        self.events.swap();
        reward
    }

    /// Pull calm agents near `source` into its chase
    fn propagate_aggro(&mut self, source: usize, last_seen: Vec2) {
        let Some(alerter) = self.agents.get(source) else {
            return;
        };
        let origin = alerter.position();
        let radius = alerter.aggro_radius();
        let alerter_id = alerter.id();

        let mut pulled = 0;
        for (index, agent) in self.agents.iter_mut().enumerate() {
            if index == source || !agent.is_targetable() {
                continue;
            }
            if agent.position().distance(origin) > radius {
                continue;
            }
            if agent.join_chase(last_seen, &self.config, &mut self.slots, &mut self.events) {
                pulled += 1;
            }
        }

        if pulled > 0 {
            log::debug!("Agent {alerter_id} pulled {pulled} others into the chase");
        }
    }

    // -------------------------------------------------------------------------
    // Commands
    // -------------------------------------------------------------------------

    /// Injure an agent. Returns `false` if no such agent exists.
    pub fn damage(&mut self, id: AgentId, amount: f32, source: Vec2) -> bool {
        let Some(agent) = self.agents.iter_mut().find(|a| a.id() == id) else {
            return false;
        };
        agent.damage(amount, source, &self.config, &mut self.slots, &mut self.events);
        true
    }

    /// Slow an agent. Returns `false` if no such agent exists.
    pub fn apply_slow(&mut self, id: AgentId, duration: f32, multiplier: f32) -> bool {
        self.get_mut(id)
            .map(|agent| agent.apply_slow(duration, multiplier))
            .is_some()
    }

    /// Set an agent on fire. Returns `false` if no such agent exists.
    pub fn apply_burn(&mut self, id: AgentId, duration: f32) -> bool {
        self.get_mut(id)
            .map(|agent| agent.apply_burn(duration))
            .is_some()
    }

    /// Replace an agent's patrol route. Returns `false` if no such agent exists.
    pub fn set_waypoints(&mut self, id: AgentId, waypoints: Vec<Vec2>) -> bool {
        self.get_mut(id)
            .map(|agent| agent.set_waypoints(waypoints))
            .is_some()
    }

    fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|a| a.id() == id)
    }

    // -------------------------------------------------------------------------
    // Read access
    // -------------------------------------------------------------------------

    /// Look up an agent
    #[must_use]
    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id() == id)
    }

    /// All agents in update order, including fading corpses
    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    /// Number of agents, including fading corpses
    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether the group has no agents
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Number of living agents
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.agents.iter().filter(|a| a.is_alive()).count()
    }

    /// Attacker slots currently held
    #[must_use]
    pub fn active_attackers(&self) -> u32 {
        self.slots.active()
    }

    /// Attacker slot capacity
    #[must_use]
    pub fn max_attackers(&self) -> u32 {
        self.slots.max()
    }

    /// Events from the last update
    #[must_use]
    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    /// Events from the last update, for draining
    pub fn events_mut(&mut self) -> &mut EventQueue {
        &mut self.events
    }

    /// Debug counters
    #[must_use]
    pub fn stats(&self) -> &AiStats {
        &self.stats
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    /// Static tiles
    #[must_use]
    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// Static tiles, for doors and destructible walls
    pub fn grid_mut(&mut self) -> &mut TileGrid {
        &mut self.grid
    }

    /// Tiles covered by the blockers passed to the last update
    #[must_use]
    pub fn blockers(&self) -> &DynamicBlockers {
        &self.blockers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{AgentState, ArchetypeKind};
    use crate::world::Aabb;

    const NO_BLOCKERS: &[Aabb] = &[];

    struct Player {
        position: Vec2,
        hits: u32,
    }

    impl Player {
        fn at(x: f32, y: f32) -> Self {
            Self {
                position: Vec2::new(x, y),
                hits: 0,
            }
        }

        fn far_away() -> Self {
            Self::at(900.0, 600.0)
        }
    }

    impl Target for Player {
        fn position(&self) -> Vec2 {
            self.position
        }

        fn radius(&self) -> f32 {
            14.0
        }

        fn facing(&self) -> Vec2 {
            Vec2::Y
        }

        fn damage(&mut self, _amount: f32, _source: Vec2) {
            self.hits += 1;
        }
    }

    fn open_grid() -> TileGrid {
        TileGrid::new(30, 20, 32.0).with_solid_codes([1])
    }

    fn group_with(config: AiConfig) -> AgentGroup {
        AgentGroup::new(config, open_grid()).unwrap()
    }

    fn calm_group() -> AgentGroup {
        group_with(AiConfig::default().without_randomness())
    }

    /// Spawn an agent that patrols in place
    fn spawn_still(group: &mut AgentGroup, x: i32, y: i32) -> AgentId {
        let id = group.spawn(TileCoord::new(x, y), ArchetypeKind::Grunt);
        let home = group.get(id).unwrap().position();
        group.set_waypoints(id, vec![home]);
        id
    }

    fn state(group: &AgentGroup, id: AgentId) -> AgentState {
        group.get(id).unwrap().state()
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = AiConfig::default().with_max_attackers(0);
        assert!(AgentGroup::new(config, open_grid()).is_err());
    }

    #[test]
    fn test_attacker_slots_clamp_at_zero() {
        let mut slots = AttackerSlots::new(2);
        assert!(slots.try_acquire());
        assert!(slots.try_acquire());
        assert!(!slots.try_acquire());
        assert!(!slots.has_headroom());

        slots.release();
        slots.release();
        slots.release();
        assert_eq!(slots.active(), 0);
    }

    #[test]
    fn test_spawn_places_agent_on_tile_center() {
        let mut group = calm_group();
        let id = group.spawn(TileCoord::new(5, 5), ArchetypeKind::Grunt);

        let agent = group.get(id).unwrap();
        assert_eq!(agent.position(), Vec2::new(176.0, 176.0));
        assert_eq!(agent.state(), AgentState::Patrol);

        group.update(0.016, &mut Player::far_away(), NO_BLOCKERS);
        assert!(
            group
                .events()
                .iter()
                .any(|e| matches!(e, AiEvent::AgentSpawned { agent, .. } if *agent == id))
        );
    }

    #[test]
    fn test_spawn_probes_for_clear_tile() {
        let mut group = calm_group();
        group.grid_mut().set_tile(TileCoord::new(5, 5), 1);

        let id = group.spawn(TileCoord::new(5, 5), ArchetypeKind::Grunt);
        let tile = group.grid().world_to_tile(group.get(id).unwrap().position()).unwrap();

        assert_ne!(tile, TileCoord::new(5, 5));
        assert_eq!(tile.chebyshev(TileCoord::new(5, 5)), 1);
        assert!(!group.grid().is_solid(tile));
    }

    #[test]
    fn test_spawn_avoids_occupied_tile() {
        let mut group = calm_group();
        let first = group.spawn(TileCoord::new(5, 5), ArchetypeKind::Grunt);
        let second = group.spawn(TileCoord::new(5, 5), ArchetypeKind::Brute);

        let a = group.get(first).unwrap().position();
        let b = group.get(second).unwrap().position();
        assert_ne!(a, b);
    }

    #[test]
    fn test_spawn_fallback_onto_solid_tile() {
        // Every tile is solid
        let grid = TileGrid::new(30, 20, 32.0).with_solid_codes([0]);
        let mut group = AgentGroup::new(AiConfig::default(), grid).unwrap();

        let id = group.spawn(TileCoord::new(5, 5), ArchetypeKind::Grunt);
        assert_eq!(
            group.get(id).unwrap().position(),
            TileCoord::new(5, 5).center(32.0)
        );
    }

    #[test]
    fn test_perception_debounce() {
        let mut group = calm_group();
        let id = spawn_still(&mut group, 5, 5);
        let mut player = Player::at(300.0, 176.0);

        // 0.2s of exposure, shorter than the alert delay
        for _ in 0..4 {
            group.update(0.05, &mut player, NO_BLOCKERS);
        }
        player.position = Vec2::new(900.0, 600.0);
        for _ in 0..20 {
            group.update(0.05, &mut player, NO_BLOCKERS);
            assert_ne!(state(&group, id), AgentState::Chase);
        }
    }

    #[test]
    fn test_chase_and_lose() {
        let mut group = calm_group();
        let id = spawn_still(&mut group, 5, 5);
        let mut player = Player::far_away();
        group.update(0.05, &mut player, NO_BLOCKERS);
        assert_eq!(state(&group, id), AgentState::Patrol);

        // Inside vision range for alert_delay + epsilon
        player.position = Vec2::new(300.0, 176.0);
        for _ in 0..9 {
            group.update(0.05, &mut player, NO_BLOCKERS);
        }
        assert_eq!(state(&group, id), AgentState::Chase);
        assert_eq!(
            group.get(id).unwrap().last_seen_player_position(),
            Some(player.position)
        );

        // Beyond 1.5x vision range, hidden past min chase time + grace
        player.position = Vec2::new(900.0, 176.0);
        for _ in 0..38 {
            group.update(0.05, &mut player, NO_BLOCKERS);
        }
        assert_eq!(state(&group, id), AgentState::Search);
    }

    #[test]
    fn test_search_returns_to_patrol() {
        let mut group = calm_group();
        let id = spawn_still(&mut group, 5, 5);
        let mut player = Player::at(300.0, 176.0);
        for _ in 0..9 {
            group.update(0.05, &mut player, NO_BLOCKERS);
        }
        player.position = Vec2::new(900.0, 600.0);

        let mut seen = Vec::new();
        for _ in 0..300 {
            group.update(0.05, &mut player, NO_BLOCKERS);
            let current = state(&group, id);
            if seen.last() != Some(&current) {
                seen.push(current);
            }
        }

        assert_eq!(
            seen,
            vec![
                AgentState::Chase,
                AgentState::Search,
                AgentState::Return,
                AgentState::Patrol
            ]
        );
        assert!(group.get(id).unwrap().last_seen_player_position().is_none());
    }

    #[test]
    fn test_group_aggro() {
        let config = AiConfig::default()
            .without_randomness()
            .with_vision(100.0, None);
        let mut group = group_with(config);

        // Only the last one can see the player at (256, 176)
        let left = spawn_still(&mut group, 3, 5);
        let below = spawn_still(&mut group, 5, 7);
        let spotter = spawn_still(&mut group, 5, 5);
        let mut player = Player::at(256.0, 176.0);

        let mut ticks = 0;
        while state(&group, spotter) != AgentState::Chase {
            assert_ne!(state(&group, left), AgentState::Chase);
            assert_ne!(state(&group, below), AgentState::Chase);
            group.update(0.05, &mut player, NO_BLOCKERS);
            ticks += 1;
            assert!(ticks < 20, "spotter never alerted");
        }

        let expected = group.get(spotter).unwrap().last_seen_player_position();
        assert_eq!(expected, Some(player.position));
        for id in [left, below] {
            assert_eq!(state(&group, id), AgentState::Chase);
            assert_eq!(group.get(id).unwrap().last_seen_player_position(), expected);
        }
    }

    #[test]
    fn test_pulled_agent_keeps_chasing_from_beyond_range() {
        let mut group = calm_group();
        // Spotter updates first; the helper sits 308 px from the player,
        // past 1.5x the 200 px vision radius
        let spotter = spawn_still(&mut group, 10, 5);
        let helper = spawn_still(&mut group, 6, 5);
        let mut player = Player::at(516.0, 176.0);

        let dropped_chase = |group: &AgentGroup| {
            group.events().iter().any(|e| {
                matches!(
                    e,
                    AiEvent::StateChanged { agent, from: AgentState::Chase, .. }
                        if *agent == helper
                )
            })
        };

        let mut ticks = 0;
        while state(&group, spotter) != AgentState::Chase {
            group.update(0.05, &mut player, NO_BLOCKERS);
            assert!(!dropped_chase(&group));
            ticks += 1;
            assert!(ticks < 20, "spotter never alerted");
        }
        assert_eq!(state(&group, helper), AgentState::Chase);

        // Still inside the minimum chase time
        for _ in 0..10 {
            group.update(0.05, &mut player, NO_BLOCKERS);
            assert!(!dropped_chase(&group));
            assert_eq!(state(&group, helper), AgentState::Chase);
        }
    }

    #[test]
    fn test_attacker_slot_invariant() {
        let config = AiConfig::default()
            .without_randomness()
            .with_max_attackers(2);
        let mut group = group_with(config);
        for (x, y) in [(8, 10), (12, 10), (10, 8), (10, 12), (8, 8)] {
            spawn_still(&mut group, x, y);
        }
        let mut player = Player::at(336.0, 336.0);

        let mut peak = 0;
        for _ in 0..600 {
            group.update(1.0 / 60.0, &mut player, NO_BLOCKERS);

            let active = group.active_attackers();
            let winding = group.iter().filter(|a| a.is_winding_up()).count() as u32;
            let holding = group.iter().filter(|a| a.holds_attacker_slot()).count() as u32;
            assert!(active <= 2);
            assert_eq!(active, winding);
            assert_eq!(active, holding);
            peak = peak.max(active);
        }

        assert!(peak >= 1);
        assert!(player.hits > 0);
        assert_eq!(group.stats().hits_landed, u64::from(player.hits));
    }

    #[test]
    fn test_death_rewards_once_and_removes_after_fade() {
        let mut group = calm_group();
        let id = spawn_still(&mut group, 5, 5);
        let mut player = Player::far_away();

        assert!(group.damage(id, 3.0, Vec2::new(150.0, 176.0)));
        assert_eq!(group.update(0.05, &mut player, NO_BLOCKERS), 10);
        assert!(!group.get(id).unwrap().is_alive());
        assert!(
            group
                .events()
                .iter()
                .any(|e| matches!(e, AiEvent::AgentDied { reward: 10, .. }))
        );

        // Damage to a corpse changes nothing
        group.damage(id, 5.0, Vec2::ZERO);

        let mut total = 0;
        let mut removed = false;
        for _ in 0..20 {
            total += group.update(0.05, &mut player, NO_BLOCKERS);
            removed |= group
                .events()
                .iter()
                .any(|e| matches!(e, AiEvent::AgentRemoved { agent } if *agent == id));
        }
        assert_eq!(total, 0);
        assert!(removed);
        assert!(group.get(id).is_none());
        assert!(group.is_empty());
        assert_eq!(group.stats().deaths, 1);
    }

    #[test]
    fn test_damage_knocks_back_and_stuns() {
        let mut group = calm_group();
        let id = spawn_still(&mut group, 5, 5);
        let mut player = Player::far_away();
        let start = group.get(id).unwrap().position();

        group.damage(id, 1.0, start + Vec2::new(0.0, 20.0));
        let agent = group.get(id).unwrap();
        assert!(agent.hit_stun_remaining() > 0.0);
        assert_eq!(agent.health(), 2.0);

        group.update(0.05, &mut player, NO_BLOCKERS);
        assert!(group.get(id).unwrap().position().y < start.y);
    }

    #[test]
    fn test_status_effects_reach_agents() {
        let mut group = calm_group();
        let id = spawn_still(&mut group, 5, 5);

        assert!(group.apply_slow(id, 3.0, 0.45));
        assert!(group.apply_burn(id, 1.5));
        let agent = group.get(id).unwrap();
        assert!(agent.is_slowed());
        assert!(agent.is_burning());

        assert!(!group.apply_slow(AgentId::from_raw(99), 1.0, 0.5));
    }

    #[test]
    fn test_blockers_force_detour() {
        let mut group = calm_group();
        let id = group.spawn(TileCoord::new(2, 5), ArchetypeKind::Grunt);
        let goal = TileCoord::new(8, 5).center(32.0);
        group.set_waypoints(id, vec![goal]);

        // A boulder covering column 5, rows 3..=7
        let boulder = [Aabb::new(160.0, 96.0, 32.0, 160.0)];
        let mut player = Player::far_away();
        group.update(0.05, &mut player, &boulder);

        let path = group.get(id).unwrap().path().to_vec();
        assert!(!path.is_empty());
        assert!(path.iter().all(|tile| !group.blockers().is_blocked(*tile)));
        assert!(path.iter().any(|tile| tile.y < 3 || tile.y > 7));
    }

    #[test]
    fn test_oversized_blocker_stays_within_grid() {
        let mut group = calm_group();
        spawn_still(&mut group, 5, 5);
        let mut player = Player::far_away();

        let slab = [Aabb::new(-1.0e6, -1.0e6, 2.0e6, 2.0e6)];
        group.update(0.05, &mut player, &slab);
        assert_eq!(group.blockers().len(), 30 * 20);
        assert_eq!(group.stats().ticks, 1);
    }

    #[test]
    fn test_invalid_dt_is_ignored() {
        let mut group = calm_group();
        let id = spawn_still(&mut group, 5, 5);
        let mut player = Player::far_away();

        assert_eq!(group.update(f32::NAN, &mut player, NO_BLOCKERS), 0);
        assert_eq!(group.update(-1.0, &mut player, NO_BLOCKERS), 0);
        assert_eq!(group.stats().ticks, 0);
        assert_eq!(group.get(id).unwrap().position(), Vec2::new(176.0, 176.0));
    }

    #[test]
    fn test_runs_are_reproducible() {
        fn run() -> Vec<Vec2> {
            let mut group = group_with(AiConfig::default().with_seed(42));
            for (x, y) in [(4, 4), (10, 6), (20, 12)] {
                group.spawn(TileCoord::new(x, y), ArchetypeKind::Skirmisher);
            }
            let mut player = Player::at(500.0, 300.0);
            for _ in 0..300 {
                group.update(1.0 / 60.0, &mut player, NO_BLOCKERS);
            }
            group.iter().map(Agent::position).collect()
        }

        assert_eq!(run(), run());
    }
}
