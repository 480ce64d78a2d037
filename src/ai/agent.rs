//! Enemy agent
//!
//! One hostile entity: perception memory, route state, combat timers and
//! status effects, driven once per tick by [`Agent::update`].
//!
//! Each tick is resolved in priority order:
//!
//! 1. death (`health <= 0`), exactly once
//! 2. hit-stun, during which only knockback is integrated
//! 3. perception and the alert debounce (calm states -> `Chase`)
//! 4. chase give-up checks (`Chase` -> `Search`)
//! 5. the behavior of whatever state the agent is now in
//!
//! All waiting is a countdown decremented by `dt`; nothing blocks.

use std::fmt;

use glam::Vec2;
use rand::Rng;
use rand::rngs::StdRng;

use super::archetype::Archetype;
use super::fsm::{AgentState, StateMachine};
use super::group::AttackerSlots;
use super::pathfinding::find_path;
use super::perception::Perception;
use super::steering::{Circle, Seek, Separation, SteeringBehavior, follow_path};
use super::target::{Target, combat_distance};
use crate::core::{AiConfig, AiEvent, AiStats, EventQueue, PickupKind};
use crate::world::{DynamicBlockers, TileCoord, TileGrid};

/// Knockback slower than this is dropped
const KNOCKBACK_EPSILON: f32 = 0.5;
/// Attempts at finding a walkable wander target
const WANDER_ATTEMPTS: usize = 4;
/// How far ahead a target must face us (cosine) before we flank wider
const FACED_COS: f32 = 0.7;
/// Closing in stops this far past first contact
const CONTACT_OVERLAP: f32 = 1.0;

// ============================================================================
// Identity
// ============================================================================

/// Stable handle to an agent in an [`AgentGroup`](super::AgentGroup)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(u32);

impl AgentId {
    /// Wrap a raw id
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw id
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// Tick plumbing
// ============================================================================

/// Shared world state handed to each agent for one tick
pub struct TickContext<'a> {
    /// Tunables
    pub config: &'a AiConfig,
    /// Static tiles
    pub grid: &'a TileGrid,
    /// Tiles covered by dynamic blockers this tick
    pub blockers: &'a DynamicBlockers,
    /// Positions of the other living agents
    pub neighbors: &'a [Vec2],
    /// Global attacker-slot counter
    pub slots: &'a mut AttackerSlots,
    /// Group RNG
    pub rng: &'a mut StdRng,
    /// Outgoing events
    pub events: &'a mut EventQueue,
    /// Debug counters
    pub stats: &'a mut AiStats,
}

/// What an agent hands back to its group after a tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickReport {
    /// Reward earned by dying this tick
    pub reward: u32,
    /// Set when the agent's own perception just pulled it into a chase;
    /// holds the position it saw the target at
    pub alerted: Option<Vec2>,
}

// ============================================================================
// Agent
// ============================================================================

/// A simulated hostile entity
#[derive(Debug, Clone)]
pub struct Agent {
    id: AgentId,
    archetype: Archetype,
    fsm: StateMachine,
    alive: bool,

    // Spatial
    position: Vec2,
    facing: Vec2,

    // Perception
    perception: Perception,
    alert_timer: f32,
    lost_sight_timer: f32,

    // State timers
    chase_timer: f32,
    search_timer: f32,
    hesitation_timer: f32,

    // Route
    path: Vec<TileCoord>,
    path_index: usize,
    path_recalc_timer: f32,
    last_path_goal: Option<TileCoord>,
    path_failed: bool,

    // Patrol
    patrol_origin: Vec2,
    waypoints: Vec<Vec2>,
    waypoint_index: usize,
    wander_target: Option<Vec2>,

    // Combat
    health: f32,
    attack_timer: f32,
    windup_timer: f32,
    recovery_timer: f32,
    holds_slot: bool,
    hit_stun_timer: f32,
    knockback: Vec2,
    last_damage_source: Option<Vec2>,
    death_timer: f32,

    // Status effects
    slow_timer: f32,
    slow_multiplier: f32,
    burn_timer: f32,
    burn_tick: f32,

    // Group behavior
    aggro_radius: f32,
    separation_radius: f32,
    circle_direction: f32,
    circle_switch_timer: f32,
    flank_bias: f32,
}

impl Agent {
    /// Create a living agent in the initial `Patrol` state.
    ///
    /// Stats that fail [`Archetype::validate`] are replaced by the default
    /// archetype.
    pub fn new(
        id: AgentId,
        position: Vec2,
        archetype: Archetype,
        config: &AiConfig,
        rng: &mut StdRng,
    ) -> Self {
        let archetype = match archetype.validate() {
            Ok(()) => archetype,
            Err(e) => {
                log::warn!("Agent {id} uses default stats: {e}");
                Archetype::default()
            }
        };
        let flank_bias = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        let circle_direction = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        let circle_switch_timer =
            rng.gen_range(config.circle_switch_min..=config.circle_switch_max);

        Self {
            id,
            archetype,
            fsm: StateMachine::new(AgentState::Patrol),
            alive: true,

            position,
            facing: Vec2::Y,

            perception: Perception::from_config(config),
            alert_timer: 0.0,
            lost_sight_timer: 0.0,

            chase_timer: 0.0,
            search_timer: 0.0,
            hesitation_timer: 0.0,

            path: Vec::new(),
            path_index: 0,
            path_recalc_timer: 0.0,
            last_path_goal: None,
            path_failed: false,

            patrol_origin: position,
            waypoints: Vec::new(),
            waypoint_index: 0,
            wander_target: None,

            health: archetype.max_health,
            attack_timer: 0.0,
            windup_timer: 0.0,
            recovery_timer: 0.0,
            holds_slot: false,
            hit_stun_timer: 0.0,
            knockback: Vec2::ZERO,
            last_damage_source: None,
            death_timer: 0.0,

            slow_timer: 0.0,
            slow_multiplier: 1.0,
            burn_timer: 0.0,
            burn_tick: 0.0,

            aggro_radius: config.aggro_radius,
            separation_radius: config.separation_radius,
            circle_direction,
            circle_switch_timer,
            flank_bias,
        }
    }

    // -------------------------------------------------------------------------
    // Read access
    // -------------------------------------------------------------------------

    /// Handle of this agent
    #[must_use]
    pub fn id(&self) -> AgentId {
        self.id
    }

    /// Stat bundle
    #[must_use]
    pub fn archetype(&self) -> &Archetype {
        &self.archetype
    }

    /// Current behavior state
    #[must_use]
    pub fn state(&self) -> AgentState {
        self.fsm.current()
    }

    /// Seconds spent in the current state
    #[must_use]
    pub fn time_in_state(&self) -> f32 {
        self.fsm.time_in_state()
    }

    /// False once the death transition has run
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// World position
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Unit facing vector
    #[must_use]
    pub fn facing(&self) -> Vec2 {
        self.facing
    }

    /// Collision radius
    #[must_use]
    pub fn radius(&self) -> f32 {
        self.archetype.radius
    }

    /// Current health
    #[must_use]
    pub fn health(&self) -> f32 {
        self.health
    }

    /// Maximum health
    #[must_use]
    pub fn max_health(&self) -> f32 {
        self.archetype.max_health
    }

    /// Current route, for debug overlays
    #[must_use]
    pub fn path(&self) -> &[TileCoord] {
        &self.path
    }

    /// Index of the next route node
    #[must_use]
    pub fn path_index(&self) -> usize {
        self.path_index
    }

    /// Last position the target was seen at
    #[must_use]
    pub fn last_seen_player_position(&self) -> Option<Vec2> {
        self.perception.last_seen()
    }

    /// Where the agent returns to after a search
    #[must_use]
    pub fn patrol_origin(&self) -> Vec2 {
        self.patrol_origin
    }

    /// Patrol waypoints
    #[must_use]
    pub fn waypoints(&self) -> &[Vec2] {
        &self.waypoints
    }

    /// Radius within which this agent pulls others into its chase
    #[must_use]
    pub fn aggro_radius(&self) -> f32 {
        self.aggro_radius
    }

    /// Telegraphing an attack
    #[must_use]
    pub fn is_winding_up(&self) -> bool {
        self.fsm.is_in(AgentState::Windup)
    }

    /// Holding one of the global attacker slots
    #[must_use]
    pub fn holds_attacker_slot(&self) -> bool {
        self.holds_slot
    }

    /// Remaining hit-stun
    #[must_use]
    pub fn hit_stun_remaining(&self) -> f32 {
        self.hit_stun_timer
    }

    /// Current knockback velocity
    #[must_use]
    pub fn knockback(&self) -> Vec2 {
        self.knockback
    }

    /// Whether frost is slowing the agent
    #[must_use]
    pub fn is_slowed(&self) -> bool {
        self.slow_timer > 0.0
    }

    /// Whether the agent is burning
    #[must_use]
    pub fn is_burning(&self) -> bool {
        self.burn_timer > 0.0
    }

    /// Dead and done fading; the group drops it
    #[must_use]
    pub fn is_removable(&self) -> bool {
        !self.alive && self.death_timer <= 0.0
    }

    /// Health at or below the archetype's retreat threshold
    #[must_use]
    pub fn is_retreating(&self) -> bool {
        self.alive && self.health <= self.archetype.retreat_health()
    }

    /// Can be seen, pathed around, aggroed and separated from
    #[must_use]
    pub fn is_targetable(&self) -> bool {
        self.alive && !self.fsm.is_in(AgentState::Dead)
    }

    // -------------------------------------------------------------------------
    // External commands
    // -------------------------------------------------------------------------

    /// Replace the patrol route. Resets the current leg.
    pub fn set_waypoints(&mut self, waypoints: Vec<Vec2>) {
        self.waypoints = waypoints;
        self.waypoint_index = 0;
        self.wander_target = None;
        self.clear_path();
    }

    /// Apply damage from an attacker at `source`.
    ///
    /// Surviving hits start hit-stun and knockback and cancel any pending
    /// windup. Death itself is resolved on the next update.
    pub fn damage(
        &mut self,
        amount: f32,
        source: Vec2,
        config: &AiConfig,
        slots: &mut AttackerSlots,
        events: &mut EventQueue,
    ) {
        if !self.alive || !amount.is_finite() {
            return;
        }

        self.health -= amount;
        if source.is_finite() {
            self.last_damage_source = Some(source);
        }
        if self.health <= 0.0 {
            return;
        }

        self.hit_stun_timer = config.hit_stun_duration;
        self.knockback = self.away_from(source) * config.knockback_strength;
        self.hesitation_timer = 0.0;

        // Pending attack and route are discarded, never resumed
        if matches!(self.state(), AgentState::Windup | AgentState::Attack) {
            self.transition(AgentState::Chase, slots, events);
        }
        self.clear_path();
    }

    /// Frost: multiply speed by `multiplier` for `duration` seconds
    pub fn apply_slow(&mut self, duration: f32, multiplier: f32) {
        if !self.alive {
            return;
        }
        self.slow_timer = self.slow_timer.max(duration);
        self.slow_multiplier = multiplier.clamp(0.0, 1.0);
    }

    /// Fire: damage over time for `duration` seconds
    pub fn apply_burn(&mut self, duration: f32) {
        if !self.alive {
            return;
        }
        self.burn_timer = duration;
        self.burn_tick = 0.0;
    }

    /// Pulled into a chase by a nearby agent that spotted the target
    pub(crate) fn join_chase(
        &mut self,
        last_seen: Vec2,
        config: &AiConfig,
        slots: &mut AttackerSlots,
        events: &mut EventQueue,
    ) -> bool {
        if !self.alive || self.state().is_engaged() || self.is_retreating() {
            return false;
        }
        self.perception.remember(last_seen);
        self.alert_timer = config.alert_delay;
        self.enter_chase(slots, events);
        true
    }

    // -------------------------------------------------------------------------
    // Tick
    // -------------------------------------------------------------------------

    /// Advance the agent by `dt` seconds
    pub fn update(
        &mut self,
        dt: f32,
        target: &mut dyn Target,
        ctx: &mut TickContext<'_>,
    ) -> TickReport {
        let mut report = TickReport::default();

        if !self.alive {
            self.integrate_knockback(dt, ctx.grid, ctx.config);
            self.death_timer = (self.death_timer - dt).max(0.0);
            return report;
        }

        self.fsm.tick(dt);
        self.tick_timers(dt, ctx.config, ctx.rng);
        self.tick_burn(dt, ctx.config);

        // 1. Death
        if self.health <= 0.0 {
            if let Some(reward) = self.die(ctx.config, ctx.rng, ctx.slots, ctx.events, ctx.stats) {
                report.reward = reward;
            }
            return report;
        }

        // 2. Hit-stun
        if self.hit_stun_timer > 0.0 {
            self.hit_stun_timer = (self.hit_stun_timer - dt).max(0.0);
            self.integrate_knockback(dt, ctx.grid, ctx.config);
            return report;
        }
        self.knockback = Vec2::ZERO;

        // 3. Perception
        let target_pos = target.position();
        let target_valid = target_pos.is_finite();
        let cone = (!self.state().is_engaged()).then_some(self.facing);
        let sees = target_valid
            && self
                .perception
                .can_see(self.position, cone, target_pos, ctx.grid);
        let distance = if target_valid {
            self.position.distance(target_pos)
        } else {
            f32::INFINITY
        };

        if sees {
            self.alert_timer += dt;
            self.lost_sight_timer = 0.0;
        } else {
            self.alert_timer = 0.0;
            self.lost_sight_timer += dt;
        }

        // 4. Calm -> Chase, debounced
        if !self.state().is_engaged()
            && self.alert_timer >= ctx.config.alert_delay
            && !self.is_retreating()
        {
            self.enter_chase(ctx.slots, ctx.events);
            report.alerted = self.perception.last_seen();
        }

        // 5. Chase -> Search
        if self.fsm.is_in(AgentState::Chase) {
            let committed = self.chase_timer >= ctx.config.min_chase_time;
            let lost = self.lost_sight_timer >= ctx.config.lost_sight_grace && committed;
            let too_far = committed
                && distance > self.perception.vision_radius * ctx.config.chase_range_multiplier;
            if lost || too_far || self.is_retreating() {
                self.enter_search(ctx.config, ctx.slots, ctx.events);
            }
        }

        match self.state() {
            AgentState::Idle => self.update_idle(ctx),
            AgentState::Patrol => self.update_patrol(dt, ctx),
            AgentState::Chase => self.update_chase(dt, target, sees, ctx),
            AgentState::Search => self.update_search(dt, ctx),
            AgentState::Return => self.update_return(dt, ctx),
            AgentState::Windup => self.update_windup(dt, target, ctx),
            AgentState::Attack => self.update_attack(dt, ctx),
            AgentState::Dead => {}
        }

        report
    }

    fn tick_timers(&mut self, dt: f32, config: &AiConfig, rng: &mut StdRng) {
        self.attack_timer = (self.attack_timer - dt).max(0.0);

        if self.slow_timer > 0.0 {
            self.slow_timer = (self.slow_timer - dt).max(0.0);
            if self.slow_timer == 0.0 {
                self.slow_multiplier = 1.0;
            }
        }

        self.circle_switch_timer -= dt;
        if self.circle_switch_timer <= 0.0 {
            self.circle_direction = -self.circle_direction;
            self.circle_switch_timer =
                rng.gen_range(config.circle_switch_min..=config.circle_switch_max);
        }
    }

    fn tick_burn(&mut self, dt: f32, config: &AiConfig) {
        if self.burn_timer <= 0.0 || config.burn_tick_interval <= 0.0 {
            return;
        }
        self.burn_timer = (self.burn_timer - dt).max(0.0);
        self.burn_tick += dt;
        while self.burn_tick >= config.burn_tick_interval {
            self.burn_tick -= config.burn_tick_interval;
            self.health -= config.burn_damage;
        }
    }

    // -------------------------------------------------------------------------
    // Death
    // -------------------------------------------------------------------------

    /// Run the death transition. Returns the reward the first time only.
    pub(crate) fn die(
        &mut self,
        config: &AiConfig,
        rng: &mut StdRng,
        slots: &mut AttackerSlots,
        events: &mut EventQueue,
        stats: &mut AiStats,
    ) -> Option<u32> {
        if !self.alive {
            return None;
        }

        self.alive = false;
        self.transition(AgentState::Dead, slots, events);
        self.clear_path();
        self.hesitation_timer = 0.0;
        self.hit_stun_timer = 0.0;
        self.burn_timer = 0.0;
        self.death_timer = config.death_fade_duration;
        self.knockback = match self.last_damage_source {
            Some(source) => self.away_from(source) * config.knockback_strength,
            None => Vec2::ZERO,
        };

        let reward = self.archetype.reward;
        stats.deaths += 1;
        log::debug!("Agent {} died at {:?}", self.id, self.position);
        events.push(AiEvent::AgentDied {
            agent: self.id,
            position: self.position,
            reward,
        });

        if rng.gen_bool(f64::from(config.pickup_drop_chance)) {
            let kind = if rng.gen_bool(0.5) {
                PickupKind::Health
            } else {
                PickupKind::Spirit
            };
            events.push(AiEvent::PickupDropped {
                agent: self.id,
                position: self.position,
                kind,
            });
        }

        Some(reward)
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// Change state, releasing the attacker slot when a windup is left.
    fn transition(&mut self, to: AgentState, slots: &mut AttackerSlots, events: &mut EventQueue) {
        let Some(change) = self.fsm.transition(to) else {
            return;
        };

        if change.from == AgentState::Windup && self.holds_slot {
            slots.release();
            self.holds_slot = false;
        }

        log::debug!(
            "Agent {} {} -> {} after {:.2}s",
            self.id,
            change.from,
            change.to,
            change.held
        );
        events.push(AiEvent::StateChanged {
            agent: self.id,
            from: change.from,
            to: change.to,
        });
    }

    fn enter_chase(&mut self, slots: &mut AttackerSlots, events: &mut EventQueue) {
        self.transition(AgentState::Chase, slots, events);
        self.chase_timer = 0.0;
        self.lost_sight_timer = 0.0;
        self.hesitation_timer = 0.0;
        self.clear_path();
    }

    fn enter_search(
        &mut self,
        config: &AiConfig,
        slots: &mut AttackerSlots,
        events: &mut EventQueue,
    ) {
        self.transition(AgentState::Search, slots, events);
        self.search_timer = config.search_duration;
        self.clear_path();
    }

    fn clear_path(&mut self) {
        self.path.clear();
        self.path_index = 0;
        self.path_recalc_timer = 0.0;
        self.last_path_goal = None;
        self.path_failed = false;
    }

    // -------------------------------------------------------------------------
    // State behaviors
    // -------------------------------------------------------------------------

    fn update_idle(&mut self, ctx: &mut TickContext<'_>) {
        let chance = f64::from(ctx.config.idle_to_patrol_chance);
        if ctx.rng.gen_bool(chance) {
            self.wander_target = None;
            self.transition(AgentState::Patrol, ctx.slots, ctx.events);
        }
    }

    fn update_patrol(&mut self, dt: f32, ctx: &mut TickContext<'_>) {
        let arrive = ctx.config.arrive_distance;

        if !self.waypoints.is_empty() {
            let index = self.waypoint_index % self.waypoints.len();
            let goal = self.waypoints[index];
            if self.position.distance(goal) <= arrive {
                self.waypoint_index = (index + 1) % self.waypoints.len();
                // New leg, new route
                self.clear_path();
                return;
            }
            let speed = self.move_speed();
            let step = self.navigate(goal, speed, dt, ctx);
            self.move_by(step, ctx.grid);
            return;
        }

        let goal = match self.wander_target {
            Some(goal) => goal,
            None => match self.pick_wander_target(ctx) {
                Some(goal) => {
                    self.wander_target = Some(goal);
                    self.clear_path();
                    goal
                }
                None => {
                    self.transition(AgentState::Idle, ctx.slots, ctx.events);
                    return;
                }
            },
        };

        if self.position.distance(goal) <= arrive {
            self.wander_target = None;
            self.transition(AgentState::Idle, ctx.slots, ctx.events);
            return;
        }
        let speed = self.move_speed();
        let step = self.navigate(goal, speed, dt, ctx);
        self.move_by(step, ctx.grid);
    }

    fn pick_wander_target(&self, ctx: &mut TickContext<'_>) -> Option<Vec2> {
        let radius = ctx.config.wander_radius;
        if !(radius > 0.0 && radius.is_finite()) {
            return None;
        }
        (0..WANDER_ATTEMPTS).find_map(|_| {
            let offset = Vec2::new(
                ctx.rng.gen_range(-radius..=radius),
                ctx.rng.gen_range(-radius..=radius),
            );
            let candidate = self.patrol_origin + offset;
            let tile = ctx.grid.world_to_tile(candidate)?;
            let blocked = ctx.grid.is_solid(tile) || ctx.blockers.is_blocked(tile);
            (!blocked).then_some(candidate)
        })
    }

    fn update_chase(
        &mut self,
        dt: f32,
        target: &mut dyn Target,
        sees: bool,
        ctx: &mut TickContext<'_>,
    ) {
        self.chase_timer += dt;

        let target_pos = target.position();
        if sees {
            self.face(target_pos - self.position);
        }

        // Hesitation: a brief freeze, timers keep running
        if self.hesitation_timer > 0.0 {
            self.hesitation_timer = (self.hesitation_timer - dt).max(0.0);
            return;
        }
        let hesitation = ctx.config.hesitation_chance * (1.0 - self.archetype.courage);
        if ctx.rng.gen_bool(f64::from(hesitation.clamp(0.0, 1.0))) {
            self.hesitation_timer =
                ctx.rng
                    .gen_range(ctx.config.hesitation_min..=ctx.config.hesitation_max);
            log::trace!("Agent {} hesitates for {:.2}s", self.id, self.hesitation_timer);
            return;
        }

        let Some(last_seen) = self.perception.last_seen() else {
            return;
        };

        let combat = if sees {
            combat_distance(self.position, self.radius(), target_pos, target.radius())
        } else {
            f32::INFINITY
        };

        // Commit to an attack
        if combat <= 0.0 && self.attack_timer <= 0.0 && ctx.slots.try_acquire() {
            self.holds_slot = true;
            self.windup_timer = ctx.config.windup_duration;
            self.clear_path();
            ctx.stats.windups_started += 1;
            self.transition(AgentState::Windup, ctx.slots, ctx.events);
            return;
        }

        let speed = self.move_speed() * ctx.config.chase_speed_multiplier;
        let mut steering = Separation::new(
            ctx.neighbors,
            self.separation_radius,
            ctx.config.separation_strength,
        )
        .calculate(self.position);

        let step = if combat <= self.archetype.melee_range {
            // Close in directly, strafing while the attack is unavailable
            let to_target = (target_pos - self.position).normalize_or_zero();
            let waiting = self.attack_timer > 0.0 || !ctx.slots.has_headroom();
            if waiting {
                let strafe = Circle::new(
                    target_pos,
                    speed * ctx.config.circle_strength,
                    self.circle_direction,
                );
                steering = steering.combine(strafe.calculate(self.position));
            }
            to_target * (speed * dt).min((combat + CONTACT_OVERLAP).max(0.0))
        } else {
            let goal = self.chase_goal(last_seen, target.facing(), ctx.config);
            self.navigate(goal, speed, dt, ctx)
        };

        self.move_by(step + steering.scale(dt).linear, ctx.grid);
    }

    /// Approach point: `melee_range` short of the target along the approach
    /// vector, shifted sideways by the agent's flank bias.
    fn chase_goal(&self, target_pos: Vec2, target_facing: Vec2, config: &AiConfig) -> Vec2 {
        let approach = (target_pos - self.position).normalize_or_zero();
        let mut flank = config.flank_offset * self.flank_bias;
        if target_facing.normalize_or_zero().dot(-approach) > FACED_COS {
            flank *= 1.5;
        }
        target_pos - approach * self.archetype.melee_range + approach.perp() * flank
    }

    fn update_search(&mut self, dt: f32, ctx: &mut TickContext<'_>) {
        self.search_timer -= dt;
        if self.search_timer <= 0.0 {
            self.perception.forget();
            self.clear_path();
            self.transition(AgentState::Return, ctx.slots, ctx.events);
            return;
        }

        let Some(last_seen) = self.perception.last_seen() else {
            return;
        };
        if self.position.distance(last_seen) <= ctx.config.arrive_distance {
            return;
        }
        let speed = self.move_speed();
        let step = self.navigate(last_seen, speed, dt, ctx);
        self.move_by(step, ctx.grid);
    }

    fn update_return(&mut self, dt: f32, ctx: &mut TickContext<'_>) {
        let home = self.patrol_origin;
        if self.position.distance(home) <= ctx.config.arrive_distance {
            self.clear_path();
            self.wander_target = None;
            self.transition(AgentState::Patrol, ctx.slots, ctx.events);
            return;
        }
        let speed = self.move_speed();
        let step = self.navigate(home, speed, dt, ctx);
        self.move_by(step, ctx.grid);
    }

    fn update_windup(&mut self, dt: f32, target: &mut dyn Target, ctx: &mut TickContext<'_>) {
        let target_pos = target.position();
        if target_pos.is_finite() {
            self.face(target_pos - self.position);
        }

        self.windup_timer -= dt;
        if self.windup_timer > 0.0 {
            return;
        }

        let in_range = target_pos.is_finite()
            && combat_distance(self.position, self.radius(), target_pos, target.radius()) <= 0.0;
        if in_range {
            let amount = self.archetype.attack_damage;
            target.damage(amount, self.position);
            ctx.stats.hits_landed += 1;
            ctx.events.push(AiEvent::TargetHit {
                agent: self.id,
                amount,
                source: self.position,
            });
        }

        // Slot is released by leaving Windup, hit or miss
        self.attack_timer = self.archetype.attack_cooldown;
        self.recovery_timer = ctx.config.attack_recovery;
        self.transition(AgentState::Attack, ctx.slots, ctx.events);
    }

    fn update_attack(&mut self, dt: f32, ctx: &mut TickContext<'_>) {
        self.recovery_timer -= dt;
        if self.recovery_timer <= 0.0 {
            self.clear_path();
            self.transition(AgentState::Chase, ctx.slots, ctx.events);
        }
    }

    // -------------------------------------------------------------------------
    // Movement
    // -------------------------------------------------------------------------

    fn move_speed(&self) -> f32 {
        if self.slow_timer > 0.0 {
            self.archetype.speed * self.slow_multiplier
        } else {
            self.archetype.speed
        }
    }

    /// Displacement toward `goal` for this tick.
    ///
    /// Routes are recomputed only when the goal tile changes or the repath
    /// timer runs out. Without a route the agent steers straight at the goal.
    fn navigate(&mut self, goal: Vec2, speed: f32, dt: f32, ctx: &mut TickContext<'_>) -> Vec2 {
        let (Some(start_tile), Some(goal_tile)) = (
            ctx.grid.world_to_tile(self.position),
            ctx.grid.world_to_tile(goal),
        ) else {
            return Vec2::ZERO;
        };

        self.path_recalc_timer -= dt;
        if self.last_path_goal != Some(goal_tile) || self.path_recalc_timer <= 0.0 {
            let result = find_path(
                ctx.grid,
                ctx.blockers,
                start_tile,
                goal_tile,
                ctx.config.path_max_iterations,
            );
            ctx.stats.record_path(result.outcome);
            log::trace!(
                "Agent {} repath {start_tile} -> {goal_tile}: {:?}, {} tiles",
                self.id,
                result.outcome,
                result.len()
            );

            self.path_failed = result.is_empty();
            self.path = result.tiles;
            // The first node is the tile we are standing on
            self.path_index = usize::from(self.path.len() > 1);
            self.last_path_goal = Some(goal_tile);
            self.path_recalc_timer = ctx.config.repath_interval;
        }

        let tile_size = ctx.grid.tile_size();
        match follow_path(self.position, &self.path, &mut self.path_index, tile_size, speed, dt) {
            Some(step) => step,
            None => {
                if self.path_failed {
                    ctx.stats.direct_fallbacks += 1;
                }
                Seek::new(goal, speed).step(self.position, dt)
            }
        }
    }

    /// Move, sliding along solid tiles instead of entering them
    fn move_by(&mut self, delta: Vec2, grid: &TileGrid) {
        if !delta.is_finite() || delta == Vec2::ZERO {
            return;
        }

        let full = self.position + delta;
        let moved = if !grid.is_solid_at(full) {
            Some(full)
        } else {
            [
                self.position + Vec2::new(delta.x, 0.0),
                self.position + Vec2::new(0.0, delta.y),
            ]
            .into_iter()
            .find(|p| *p != self.position && !grid.is_solid_at(*p))
        };

        if let Some(next) = moved {
            if !self.fsm.is_in(AgentState::Chase) {
                self.face(next - self.position);
            }
            self.position = next;
        }
    }

    fn integrate_knockback(&mut self, dt: f32, grid: &TileGrid, config: &AiConfig) {
        if self.knockback.length() < KNOCKBACK_EPSILON {
            self.knockback = Vec2::ZERO;
            return;
        }
        let delta = self.knockback * dt;
        self.move_by(delta, grid);
        self.knockback *= config.knockback_decay;
    }

    fn face(&mut self, direction: Vec2) {
        let direction = direction.normalize_or_zero();
        if direction != Vec2::ZERO {
            self.facing = direction;
        }
    }

    fn away_from(&self, source: Vec2) -> Vec2 {
        if source.is_finite() {
            (self.position - source).normalize_or_zero()
        } else {
            Vec2::ZERO
        }
    }
}
