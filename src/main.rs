//! Headless demo: three patrolling enemies on the meadow map and a scripted
//! player walking through them.
//!
//! ```text
//! cargo run -- [config.ron|config.json] [encounter.ron|encounter.json]
//! ```

use std::path::Path;

use horde::core::PickupKind;
use horde::prelude::*;

const TILE_SIZE: f32 = 32.0;
const FRAME: f32 = 1.0 / 60.0;
const FRAMES: u32 = 900;

const SOLID_TILES: [u16; 9] = [0, 1, 2, 3, 4, 5, 6, 7, 20];

#[rustfmt::skip]
const WORLD_MAP: [[u16; 25]; 19] = [
    [ 0, 4, 4, 4, 4, 4, 2, 4, 4, 4, 4, 4, 4, 4, 4, 4, 2, 4, 4,20, 4, 4, 4, 4, 1],
    [ 2,10,10,10,10,10, 2,10,10,10,10,10,10,10,10,10, 2,10,11,20,12,10,10,10, 2],
    [ 2,10,10,10,10,10, 2,10,10,10,10,10,10,10,10,10, 2,10,11,20,12,10,10,10, 2],
    [ 2,10,10,10,10,10, 2,10,10,10,10,10, 2,10,10,10, 2,10,11,20,12,10,10,10, 2],
    [ 2,10,10,10,10,10, 2,10,10,10,10,10, 2,10,10,10, 2,10,11,20,12,10,10,10, 2],
    [ 2,10,10,10,10,10, 2,10,10,10,10,10, 2,10,10,10, 2,10,11,20,12,10,10,10, 2],
    [ 2, 4, 4,10,10, 4, 5,10,10, 4, 4, 4, 4, 4, 4, 4, 5,10,11,20,12,10,10,10, 2],
    [ 2,10,10,10,10,10,10,10,10,10,10,10,10,10,10,10,10,10,11,20,12,10,10,10, 2],
    [ 2,10,10,10,10,10,10,10,10,10,10,10,10,10,10,10,10,10,11,20,12,10,10,10, 2],
    [ 2,10,10,10,10,10,10,10,10,10,10,10,10,10,10,10,10,10,11,20,12,10,10,10, 2],
    [ 2,10,10,10,10,10,10,10,10,10,10,10,10,10,10,10,10,10,11,20,12,10,10,10, 2],
    [ 2,10,10,10,10,10,10,10,10,10,10,10,10,10,10,10,10,10,11,20,12,10,10,10, 2],
    [ 2,10,10,10,10,10,10,10,10,10,10,10,10,10,10,10,10,10,11,20,12,10,10,10, 2],
    [ 2,10,10,10,10,10,10,10,10,10,10,10,10,10,10,10,10,10,11,20,12,10,10,10, 2],
    [ 2,10,10,10,10,10,10,10,10,10,10,10,10,10,10,10,10,10,11,20,12,10,10,10, 2],
    [ 2,10,10,10,10,10,10,10,10,10,10,10,10,10,10,10,10,10, 0,20, 4,10,10, 4, 2],
    [ 2,10,10,10,10,10,10,10,10,10,10,10,10,10,10,10,10,10, 2,20,12,10,10,10, 2],
    [ 2,10,10,10,10,10,10,10,10,10,10,10,10,10,10,10,10,10, 2,20,12,10,10,10, 2],
    [ 3, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4,20, 4, 4, 4, 4, 5],
];

/// Scripted stand-in for the player controller
struct DemoPlayer {
    position: Vec2,
    facing: Vec2,
    health: f32,
    route: Vec<Vec2>,
    leg: usize,
    sword_timer: f32,
}

impl DemoPlayer {
    const SPEED: f32 = 80.0;
    const RADIUS: f32 = 14.0;
    const SWORD_REACH: f32 = 12.0;
    const SWORD_COOLDOWN: f32 = 0.6;

    fn new(route: Vec<Vec2>) -> Self {
        Self {
            position: route.first().copied().unwrap_or(Vec2::ZERO),
            facing: Vec2::X,
            health: 10.0,
            route,
            leg: 0,
            sword_timer: 0.0,
        }
    }

    fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    fn walk(&mut self, dt: f32) {
        let Some(&goal) = self.route.get(self.leg) else {
            return;
        };
        let to_goal = goal - self.position;
        let step = Self::SPEED * dt;
        if to_goal.length() <= step {
            self.position = goal;
            self.leg = (self.leg + 1) % self.route.len();
        } else {
            self.facing = to_goal.normalize_or_zero();
            self.position += self.facing * step;
        }
    }

    /// Swing at every living agent in reach
    fn swing(&mut self, dt: f32, group: &mut AgentGroup) {
        self.sword_timer -= dt;
        if self.sword_timer > 0.0 {
            return;
        }
        self.sword_timer = Self::SWORD_COOLDOWN;

        let reach = Self::RADIUS + Self::SWORD_REACH;
        let victims: Vec<AgentId> = group
            .iter()
            .filter(|a| a.is_alive() && a.position().distance(self.position) <= reach + a.radius())
            .map(Agent::id)
            .collect();
        for id in victims {
            group.damage(id, 1.0, self.position);
        }
    }

    /// Frost pulse on everything nearby, fire on whatever is closest
    fn cast(&self, group: &mut AgentGroup) {
        let nearby: Vec<(AgentId, f32)> = group
            .iter()
            .filter(|a| a.is_alive())
            .map(|a| (a.id(), a.position().distance(self.position)))
            .filter(|(_, d)| *d <= 120.0)
            .collect();
        for (id, _) in &nearby {
            group.apply_slow(*id, 3.0, 0.45);
        }
        if let Some((closest, _)) = nearby.iter().min_by(|a, b| a.1.total_cmp(&b.1)) {
            group.apply_burn(*closest, 1.5);
        }
    }
}

impl Target for DemoPlayer {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn radius(&self) -> f32 {
        Self::RADIUS
    }

    fn facing(&self) -> Vec2 {
        self.facing
    }

    fn damage(&mut self, amount: f32, source: Vec2) {
        self.health -= amount;
        log::info!(
            "Player hit for {amount} from {:?}, {} health left",
            source,
            self.health
        );
    }
}

fn meadow_encounter() -> Encounter {
    let mut encounter = Encounter::new("Meadow");
    encounter.add_spawn(SpawnEntry::new(TileCoord::new(9, 11)).with_waypoints([
        TileCoord::new(9, 11),
        TileCoord::new(16, 11),
        TileCoord::new(16, 16),
    ]));
    encounter.add_spawn(
        SpawnEntry::new(TileCoord::new(10, 12))
            .with_archetype(ArchetypeKind::Brute)
            .with_waypoints([TileCoord::new(17, 6), TileCoord::new(17, 16)]),
    );
    encounter.add_spawn(
        SpawnEntry::new(TileCoord::new(15, 3))
            .with_archetype(ArchetypeKind::Skirmisher)
            .with_waypoints([TileCoord::new(9, 2), TileCoord::new(10, 9)]),
    );
    encounter
}

fn is_json(path: &str) -> bool {
    Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn load_config(path: Option<&str>) -> Result<AiConfig, ConfigError> {
    match path {
        Some(path) if is_json(path) => AiConfig::load_json(path),
        Some(path) => AiConfig::load_ron(path),
        None => Ok(AiConfig::default()),
    }
}

fn load_encounter(path: Option<&str>) -> Result<Encounter, ConfigError> {
    match path {
        Some(path) if is_json(path) => Encounter::load_json(path),
        Some(path) => Encounter::load_ron(path),
        None => Ok(meadow_encounter()),
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = load_config(args.first().map(String::as_str))?;
    let encounter = load_encounter(args.get(1).map(String::as_str))?;

    let grid = TileGrid::from_rows(&WORLD_MAP, TILE_SIZE)?.with_solid_codes(SOLID_TILES);
    let mut group = AgentGroup::new(config, grid)?;
    encounter.populate(&mut group);

    let rocks = [
        Aabb::centered(TileCoord::new(12, 9).center(TILE_SIZE), 28.0),
        Aabb::centered(TileCoord::new(7, 13).center(TILE_SIZE), 28.0),
    ];

    let mut player = DemoPlayer::new(
        [(3, 8), (15, 8), (15, 14), (4, 14)]
            .into_iter()
            .map(|(x, y)| TileCoord::new(x, y).center(TILE_SIZE))
            .collect(),
    );

    let mut xp = 0u32;
    let mut pickups = Vec::new();
    for frame in 0..FRAMES {
        player.walk(FRAME);
        player.swing(FRAME, &mut group);
        if frame == 240 {
            player.cast(&mut group);
        }

        xp += group.update(FRAME, &mut player, &rocks);

        for event in group.events_mut().drain() {
            match event {
                AiEvent::AgentDied { agent, reward, .. } => {
                    log::info!("Frame {frame}: agent {agent} died (+{reward} xp)");
                }
                AiEvent::PickupDropped { position, kind, .. } => {
                    let name = match kind {
                        PickupKind::Health => "health",
                        PickupKind::Spirit => "spirit",
                    };
                    log::info!("Frame {frame}: {name} orb dropped at {position:?}");
                    pickups.push(kind);
                }
                other => log::debug!("Frame {frame}: {other:?}"),
            }
        }

        if !player.is_alive() {
            log::info!("Player fell on frame {frame}");
            break;
        }
    }

    log::info!(
        "Done: {xp} xp, {} pickups, {} of {} agents standing, player at {:.1} health",
        pickups.len(),
        group.alive_count(),
        group.len(),
        player.health
    );
    log::info!("{}", group.stats().format_stats());
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("Demo failed: {e}");
        std::process::exit(1);
    }
}
