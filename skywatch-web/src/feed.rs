//! Stand-in for the game server: a seeded random battle emitting one
//! [`Snapshot`] per tick, steerable through [`ControlCommand`]s.

use skywatch_core::telemetry::{ALIVE_STATUS, FINISH_STAGE};
use skywatch_core::{ControlCommand, ObstacleReport, Rect, Snapshot, VehicleReport};

const FLEET_SIZE: usize = 3;
const CRUISE_SPEED: f64 = 40.0;
const ENGAGE_RANGE: f64 = 60.0;
const HIT_CHANCE: f64 = 0.02;
const HIT_DAMAGE: i32 = 10;
const CLOUD_SPAWN_CHANCE: f64 = 0.01;
const CLOUD_LIFETIME_TICKS: u32 = 240;
const RUNNING_STAGE: &str = "running";

#[derive(Debug, Clone)]
struct SimVehicle {
    report: VehicleReport,
    steered: bool,
}

#[derive(Debug, Clone)]
struct SimCloud {
    report: ObstacleReport,
    ticks_left: u32,
}

pub struct SimulatedFeed {
    rng: fastrand::Rng,
    bounds: Rect,
    vehicles: Vec<SimVehicle>,
    terrain: Vec<ObstacleReport>,
    clouds: Vec<SimCloud>,
    next_cloud: u32,
    finished: bool,
}

impl SimulatedFeed {
    pub fn new(seed: u64, bounds: Rect) -> Self {
        let mut feed = Self {
            rng: fastrand::Rng::with_seed(seed),
            bounds,
            vehicles: Vec::new(),
            terrain: Vec::new(),
            clouds: Vec::new(),
            next_cloud: 0,
            finished: false,
        };
        feed.restart();
        feed
    }

    fn restart(&mut self) {
        self.vehicles.clear();
        for tag in ["B", "R"] {
            for index in 1..=FLEET_SIZE {
                let x = self.random_x();
                let y = self.random_y();
                let (vx, vy) = self.random_velocity();
                self.vehicles.push(SimVehicle {
                    report: VehicleReport {
                        uid: format!("{tag}{index}"),
                        hp: 100,
                        status: ALIVE_STATUS.to_string(),
                        team: tag.to_string(),
                        x,
                        y,
                        vx,
                        vy,
                    },
                    steered: false,
                });
            }
        }

        self.terrain = vec![
            self.random_obstacle("mountain-1", "mountain", 60.0),
            self.random_obstacle("mountain-2", "mountain", 90.0),
            self.random_obstacle("radar-1", "radar", 120.0),
        ];
        self.clouds.clear();
        self.finished = false;
    }

    fn random_x(&mut self) -> f64 {
        self.bounds.x + self.rng.f64() * self.bounds.width
    }

    fn random_y(&mut self) -> f64 {
        self.bounds.y + self.rng.f64() * self.bounds.height
    }

    fn random_velocity(&mut self) -> (f64, f64) {
        let angle = self.rng.f64() * std::f64::consts::TAU;
        (angle.cos() * CRUISE_SPEED, angle.sin() * CRUISE_SPEED)
    }

    fn random_obstacle(&mut self, id: &str, tag: &str, max_radius: f64) -> ObstacleReport {
        ObstacleReport {
            id: id.to_string(),
            tag: tag.to_string(),
            x: self.random_x(),
            y: self.random_y(),
            r: 20.0 + self.rng.f64() * (max_radius - 20.0),
        }
    }

    /// Applies an operator command the way the server would on `/ctrl`.
    pub fn steer(&mut self, command: &ControlCommand) {
        if let Some(vehicle) = self
            .vehicles
            .iter_mut()
            .find(|vehicle| vehicle.report.uid == command.uid)
        {
            vehicle.report.vx = command.vx;
            vehicle.report.vy = command.vy;
            vehicle.steered = true;
        }
    }

    /// Advances the battle by `dt` seconds and returns the resulting snapshot.
    pub fn tick(&mut self, dt: f64) -> Snapshot {
        if self.finished {
            self.restart();
        }

        self.move_vehicles(dt);
        self.exchange_fire();
        self.drift_clouds();

        let blue_alive = self.team_alive("B");
        let red_alive = self.team_alive("R");
        self.finished = !blue_alive || !red_alive;

        let mut obstacles = self.terrain.clone();
        obstacles.extend(self.clouds.iter().map(|cloud| cloud.report.clone()));

        Snapshot {
            stage: Some(if self.finished { FINISH_STAGE } else { RUNNING_STAGE }.to_string()),
            drones: self.vehicles.iter().map(|vehicle| vehicle.report.clone()).collect(),
            obstacles,
        }
    }

    fn team_alive(&self, tag: &str) -> bool {
        self.vehicles
            .iter()
            .any(|vehicle| vehicle.report.team == tag && vehicle.report.hp > 0)
    }

    fn move_vehicles(&mut self, dt: f64) {
        let bounds = self.bounds;
        for index in 0..self.vehicles.len() {
            if self.vehicles[index].report.hp <= 0 {
                let report = &mut self.vehicles[index].report;
                report.vx = 0.0;
                report.vy = 0.0;
                continue;
            }
            if !self.vehicles[index].steered && self.rng.f64() < 0.01 {
                let (vx, vy) = self.random_velocity();
                let report = &mut self.vehicles[index].report;
                report.vx = vx;
                report.vy = vy;
            }

            let report = &mut self.vehicles[index].report;
            report.x += report.vx * dt;
            report.y += report.vy * dt;
            if report.x < bounds.x || report.x > bounds.right() {
                report.vx = -report.vx;
                report.x = report.x.clamp(bounds.x, bounds.right());
            }
            if report.y < bounds.y || report.y > bounds.bottom() {
                report.vy = -report.vy;
                report.y = report.y.clamp(bounds.y, bounds.bottom());
            }
        }
    }

    fn exchange_fire(&mut self) {
        let count = self.vehicles.len();
        for target in 0..count {
            for shooter in 0..count {
                let (a, b) = (&self.vehicles[shooter].report, &self.vehicles[target].report);
                if a.team == b.team || a.hp <= 0 || b.hp <= 0 {
                    continue;
                }
                let distance = (a.x - b.x).hypot(a.y - b.y);
                if distance <= ENGAGE_RANGE && self.rng.f64() < HIT_CHANCE {
                    let report = &mut self.vehicles[target].report;
                    report.hp = (report.hp - HIT_DAMAGE).max(0);
                    if report.hp == 0 {
                        report.status = "destroyed".to_string();
                    }
                }
            }
        }
    }

    fn drift_clouds(&mut self) {
        for cloud in &mut self.clouds {
            cloud.ticks_left = cloud.ticks_left.saturating_sub(1);
            cloud.report.x += 0.5;
        }
        // Clouds that stop being reported age out on the console side.
        self.clouds.retain(|cloud| cloud.ticks_left > 0);

        if self.rng.f64() < CLOUD_SPAWN_CHANCE {
            self.next_cloud += 1;
            let id = format!("cloud-{}", self.next_cloud);
            let report = self.random_obstacle(&id, "cloud", 80.0);
            self.clouds.push(SimCloud {
                report,
                ticks_left: CLOUD_LIFETIME_TICKS,
            });
        }
    }
}
