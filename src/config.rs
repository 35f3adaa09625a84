use std::env;
use std::fs;
use std::path::Path;

use glam::Vec3;
use serde::Deserialize;

use crate::error::ConfigError;

/// Path to an optional TOML file overriding [`Tuning`] defaults.
pub const CONFIG_ENV_VAR: &str = "KITCHEN_CONFIG";

/// Every gameplay constant, grouped the way the systems consume them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Fixed seed for order timings; entropy when absent.
    pub seed: Option<u64>,
    pub player: PlayerTuning,
    pub camera: CameraTuning,
    pub area: GameArea,
    pub stations: StationLayout,
    pub cooker: CookerTuning,
    pub tickets: TicketTuning,
    pub audio: AudioTuning,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub speed: f32,
    /// Radians per frame.
    pub turn_rate: f32,
    /// Carry point in the player's (forward, right, up) frame.
    pub hold_offset: Vec3,
    pub start: Vec3,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            speed: 10.0,
            turn_rate: 0.15,
            hold_offset: Vec3::new(0.55, 0.0, 0.85),
            start: Vec3::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Orbit centre in the player's (forward, right, up) frame.
    pub offset: Vec3,
    /// Lowest height the camera may sink to.
    pub floor: f32,
    pub yaw_sensitivity: f32,
    pub pitch_sensitivity: f32,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            distance: 10.0,
            min_distance: 2.0,
            max_distance: 10.0,
            offset: Vec3::new(0.0, 0.0, 1.0),
            floor: 0.1,
            yaw_sensitivity: 2.5,
            pitch_sensitivity: 1.5,
        }
    }
}

/// Axis-aligned playable rectangle on the ground plane.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameArea {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
}

impl Default for GameArea {
    fn default() -> Self {
        Self {
            x_min: -12.0,
            x_max: 12.0,
            y_min: -12.0,
            y_max: 12.0,
        }
    }
}

impl GameArea {
    /// Clamp x and y independently; z passes through.
    pub fn clamp(&self, p: Vec3) -> Vec3 {
        Vec3::new(
            p.x.clamp(self.x_min, self.x_max),
            p.y.clamp(self.y_min, self.y_max),
            p.z,
        )
    }
}

/// A fixed interaction spot. The player is "at" it while inside the square of
/// half-size `reach` around `position` on the ground plane.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Station {
    pub position: Vec3,
    pub reach: f32,
}

impl Station {
    pub const fn new(x: f32, y: f32, reach: f32) -> Self {
        Self {
            position: Vec3::new(x, y, 0.0),
            reach,
        }
    }

    pub fn contains(&self, p: Vec3) -> bool {
        (p.x - self.position.x).abs() < self.reach && (p.y - self.position.y).abs() < self.reach
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StationLayout {
    pub delivery: Station,
    pub bowl_stack: Station,
    pub rice_box: Station,
    pub rice_cookers: [Station; 3],
    pub trash: Station,
    /// Where unused bowl props are parked so they are not drawn in play.
    pub off_screen: Vec3,
}

impl Default for StationLayout {
    fn default() -> Self {
        Self {
            delivery: Station::new(-12.0, 0.0, 0.75),
            bowl_stack: Station::new(-8.0, 2.0, 0.75),
            rice_box: Station::new(-6.0, 2.0, 0.75),
            rice_cookers: [
                Station::new(0.0, 2.0, 0.5),
                Station::new(0.0, 0.0, 0.5),
                Station::new(0.0, -2.0, 0.5),
            ],
            trash: Station::new(-8.0, -2.0, 0.75),
            off_screen: Vec3::new(0.0, 0.0, -10.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CookerTuning {
    /// Seconds until the rice is ready.
    pub min_duration: f32,
    /// Seconds until the rice burns, counted from loading.
    pub max_duration: f32,
}

impl Default for CookerTuning {
    fn default() -> Self {
        Self {
            min_duration: 10.0,
            max_duration: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TicketTuning {
    pub spawn_min: f32,
    pub spawn_range: f32,
    pub duration_min: f32,
    pub duration_range: f32,
    pub completion_bonus: f32,
    /// An expired order costs `duration / expiry_penalty_divisor`.
    pub expiry_penalty_divisor: f32,
}

impl Default for TicketTuning {
    fn default() -> Self {
        Self {
            spawn_min: 5.0,
            spawn_range: 5.0,
            duration_min: 16.0,
            duration_range: 6.0,
            completion_bonus: 1.0,
            expiry_penalty_divisor: 4.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AudioTuning {
    pub music_volume: f32,
    pub bell_volume: f32,
    pub boiling_volume: f32,
    pub boiling_half_volume_radius: f32,
    /// Seconds over which listener moves are smoothed.
    pub listener_ramp: f32,
}

impl Default for AudioTuning {
    fn default() -> Self {
        Self {
            music_volume: 0.3,
            bell_volume: 0.5,
            boiling_volume: 1.0,
            boiling_half_volume_radius: 0.75,
            listener_ramp: 1.0 / 60.0,
        }
    }
}

impl Tuning {
    pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = toml::from_str(src)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let src = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&src)
    }

    /// Defaults, or the file named by [`CONFIG_ENV_VAR`] when it is set.
    pub fn from_env() -> Result<Self, ConfigError> {
        match env::var(CONFIG_ENV_VAR) {
            Ok(path) => {
                tracing::info!(%path, "loading tuning overrides");
                Self::load(Path::new(&path))
            }
            Err(_) => Ok(Self::default()),
        }
    }

    fn stations(&self) -> impl Iterator<Item = (&'static str, &Station)> + '_ {
        let s = &self.stations;
        [
            ("delivery", &s.delivery),
            ("bowl_stack", &s.bowl_stack),
            ("rice_box", &s.rice_box),
            ("rice_cookers[0]", &s.rice_cookers[0]),
            ("rice_cookers[1]", &s.rice_cookers[1]),
            ("rice_cookers[2]", &s.rice_cookers[2]),
            ("trash", &s.trash),
        ]
        .into_iter()
    }

    /// Every scalar and vector setting, by name.
    fn numbers(&self) -> Vec<(&'static str, f32)> {
        let (p, c, a) = (&self.player, &self.camera, &self.area);
        let (k, t, au) = (&self.cooker, &self.tickets, &self.audio);
        let mut numbers = vec![
            ("player.speed", p.speed),
            ("player.turn_rate", p.turn_rate),
            ("camera.distance", c.distance),
            ("camera.min_distance", c.min_distance),
            ("camera.max_distance", c.max_distance),
            ("camera.floor", c.floor),
            ("camera.yaw_sensitivity", c.yaw_sensitivity),
            ("camera.pitch_sensitivity", c.pitch_sensitivity),
            ("area.x_min", a.x_min),
            ("area.x_max", a.x_max),
            ("area.y_min", a.y_min),
            ("area.y_max", a.y_max),
            ("cooker.min_duration", k.min_duration),
            ("cooker.max_duration", k.max_duration),
            ("tickets.spawn_min", t.spawn_min),
            ("tickets.spawn_range", t.spawn_range),
            ("tickets.duration_min", t.duration_min),
            ("tickets.duration_range", t.duration_range),
            ("tickets.completion_bonus", t.completion_bonus),
            ("tickets.expiry_penalty_divisor", t.expiry_penalty_divisor),
            ("audio.music_volume", au.music_volume),
            ("audio.bell_volume", au.bell_volume),
            ("audio.boiling_volume", au.boiling_volume),
            ("audio.boiling_half_volume_radius", au.boiling_half_volume_radius),
            ("audio.listener_ramp", au.listener_ramp),
        ];
        let vectors = [
            ("player.hold_offset", p.hold_offset),
            ("player.start", p.start),
            ("camera.offset", c.offset),
            ("stations.off_screen", self.stations.off_screen),
        ];
        for (name, v) in vectors {
            numbers.extend(v.to_array().map(|x| (name, x)));
        }
        for (name, station) in self.stations() {
            numbers.push((name, station.reach));
            numbers.extend(station.position.to_array().map(|x| (name, x)));
        }
        numbers
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if let Some((name, value)) = self.numbers().into_iter().find(|(_, x)| !x.is_finite()) {
            return Err(ConfigError::Invalid(format!("{name} must be finite, got {value}")));
        }
        if let Some((name, _)) = self.stations().find(|(_, s)| s.reach <= 0.0) {
            return Err(ConfigError::Invalid(format!("station {name} needs a positive reach")));
        }

        let area = &self.area;
        if area.x_min > area.x_max || area.y_min > area.y_max {
            return invalid("game area bounds are inverted");
        }
        if self.player.speed < 0.0 || self.player.turn_rate <= 0.0 {
            return invalid("player speed must be >= 0 and turn rate > 0");
        }
        let cam = &self.camera;
        if cam.min_distance <= 0.0 || cam.min_distance > cam.max_distance {
            return invalid("camera distance range is empty");
        }
        if !(cam.min_distance..=cam.max_distance).contains(&cam.distance) {
            return invalid("camera distance outside its range");
        }
        if self.cooker.min_duration <= 0.0 || self.cooker.min_duration >= self.cooker.max_duration {
            return invalid("cooker min_duration must be positive and below max_duration");
        }
        let t = &self.tickets;
        if t.spawn_min <= 0.0 || t.spawn_range < 0.0 || t.duration_min <= 0.0 || t.duration_range < 0.0 {
            return invalid("ticket timings must be positive with non-negative ranges");
        }
        if t.expiry_penalty_divisor <= 0.0 {
            return invalid("expiry_penalty_divisor must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_override_keeps_other_defaults() {
        let tuning = Tuning::from_toml_str(
            r#"
            seed = 42

            [cooker]
            min_duration = 4.0

            [stations.trash]
            position = [3.0, 3.0, 0.0]
            reach = 1.0
            "#,
        )
        .expect("valid tuning");

        assert_eq!(tuning.seed, Some(42));
        assert_eq!(tuning.cooker.min_duration, 4.0);
        assert_eq!(tuning.cooker.max_duration, 20.0, "untouched field keeps default");
        assert_eq!(tuning.stations.trash, Station::new(3.0, 3.0, 1.0));
        assert_eq!(tuning.stations.delivery, StationLayout::default().delivery);
    }

    #[test]
    fn test_rejects_inverted_cooker_durations() {
        let err = Tuning::from_toml_str("[cooker]\nmin_duration = 30.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "got {err:?}");
    }

    #[test]
    fn test_rejects_non_finite_values() {
        let err = Tuning::from_toml_str("[cooker]\nmin_duration = nan\n").unwrap_err();
        assert!(matches!(&err, ConfigError::Invalid(msg) if msg.contains("cooker.min_duration")), "got {err:?}");

        let err = Tuning::from_toml_str("[player]\nspeed = inf\n").unwrap_err();
        assert!(matches!(&err, ConfigError::Invalid(msg) if msg.contains("player.speed")), "got {err:?}");

        let err = Tuning::from_toml_str("[player]\nstart = [0.0, nan, 0.0]\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "got {err:?}");
    }

    #[test]
    fn test_rejects_unreachable_station() {
        for reach in ["0.0", "-1.0"] {
            let src = format!("[stations.rice_box]\nposition = [-6.0, 2.0, 0.0]\nreach = {reach}\n");
            let err = Tuning::from_toml_str(&src).unwrap_err();
            assert!(matches!(&err, ConfigError::Invalid(msg) if msg.contains("rice_box")), "got {err:?}");
        }
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = Tuning::from_toml_str("[player\nspeed = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "got {err:?}");
    }

    #[test]
    fn test_station_reach_is_exclusive_square() {
        let s = Station::new(-8.0, 2.0, 0.75);
        assert!(s.contains(Vec3::new(-8.0, 2.0, 5.0)), "height is ignored");
        assert!(s.contains(Vec3::new(-7.3, 2.7, 0.0)));
        assert!(!s.contains(Vec3::new(-7.25, 2.0, 0.0)), "edge is outside");
    }

    #[test]
    fn test_area_clamps_each_axis() {
        let area = GameArea::default();
        let p = area.clamp(Vec3::new(15.0, -20.0, 3.0));
        assert_eq!(p, Vec3::new(12.0, -12.0, 3.0));
    }
}
