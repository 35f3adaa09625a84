//! One round of the kitchen: owns every piece of mutable game state and
//! steps it once per frame.

use glam::{UVec2, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::audio::{AudioEngine, PlayingSound, SoundId};
use crate::config::Tuning;
use crate::controller::camera_controller::{CameraRig, PlayerController};
use crate::controller::input::{Action, Binding, InputEvent, InputState, KeyBindings, MouseButton};
use crate::controller::interaction::{plan, Interaction, Surroundings};
use crate::error::SceneError;
use crate::model::{
    BowlContents, BowlPools, CookerState, HeldBowl, Hud, OrderKind, Player, RiceCooker, SceneBindings, SceneGraph, TicketBoard,
    COOKER_COUNT,
};
use crate::view::{FrameView, Renderer};

pub struct Session {
    tuning: Tuning,
    scene: SceneGraph,
    bindings: SceneBindings,
    player: Player,
    controller: PlayerController,
    rig: CameraRig,
    input: InputState,
    key_bindings: KeyBindings,
    pools: BowlPools,
    held: Option<HeldBowl>,
    cookers: [RiceCooker; COOKER_COUNT],
    tickets: TicketBoard,
    rng: StdRng,
    audio: Box<dyn AudioEngine>,
    music: PlayingSound,
    hold_point: Vec3,
}

impl Session {
    /// Bind the scene and start the round. Fails without side effects on the
    /// scene if a required node or the camera is missing.
    pub fn new(scene: SceneGraph, tuning: Tuning, mut audio: Box<dyn AudioEngine>) -> Result<Self, SceneError> {
        let bindings = SceneBindings::bind(&scene)?;

        let mut rng = match tuning.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let tickets = TicketBoard::new(&tuning.tickets, &mut rng);
        let player = Player::new(tuning.player.start);
        let music = audio.play_looping(SoundId::BackgroundLoop, tuning.audio.music_volume, 0.0);

        let mut session = Self {
            controller: PlayerController::new(tuning.player.clone()),
            rig: CameraRig::new(tuning.camera.clone()),
            hold_point: player.position,
            tuning,
            scene,
            bindings,
            player,
            input: InputState::new(),
            key_bindings: KeyBindings::default(),
            pools: BowlPools::new(),
            held: None,
            cookers: Default::default(),
            tickets,
            rng,
            audio,
            music,
        };
        session.hold_point = session.controller.hold_point(&session.player);
        session.refresh_camera();
        session.sync_scene();
        tracing::info!(seed = ?session.tuning.seed, "session started");
        Ok(session)
    }

    pub fn with_key_bindings(mut self, key_bindings: KeyBindings) -> Self {
        self.key_bindings = key_bindings;
        self
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    pub fn held(&self) -> Option<HeldBowl> {
        self.held
    }

    pub fn pools(&self) -> &BowlPools {
        &self.pools
    }

    pub fn cookers(&self) -> &[RiceCooker; COOKER_COUNT] {
        &self.cookers
    }

    pub fn tickets(&self) -> &TicketBoard {
        &self.tickets
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn music(&self) -> PlayingSound {
        self.music
    }

    /// The host should hold the pointer captured while this is true.
    pub fn pointer_captured(&self) -> bool {
        self.input.looking
    }

    /// Feed one input event. Returns `false` for events the game ignores.
    pub fn handle_event(&mut self, event: &InputEvent, window_size: UVec2) -> bool {
        match *event {
            InputEvent::KeyDown(key) => match self.key_bindings.lookup(key) {
                Some(Binding::Action(action)) => {
                    self.input.press(action, key);
                    true
                }
                Some(Binding::ReleasePointer) => {
                    self.input.looking = false;
                    true
                }
                Some(Binding::Restart) => {
                    self.restart();
                    true
                }
                None => false,
            },
            InputEvent::KeyUp(key) => match self.key_bindings.lookup(key) {
                Some(Binding::Action(action)) => {
                    self.input.release(action, key);
                    true
                }
                _ => false,
            },
            InputEvent::MouseButton {
                button: MouseButton::Right,
                pressed,
            } if pressed != self.input.looking => {
                self.input.looking = pressed;
                true
            }
            InputEvent::MouseMotion { dx, dy } if self.input.looking => {
                let fov_y = self.scene.camera(self.bindings.camera).fov_y;
                self.rig.apply_look(dx, dy, window_size.y, fov_y);
                self.refresh_camera();
                true
            }
            InputEvent::MouseWheel { delta_y } => {
                self.rig.zoom(delta_y);
                self.refresh_camera();
                true
            }
            InputEvent::FocusLost => {
                self.input.clear();
                true
            }
            _ => false,
        }
    }

    /// Advance the round by `elapsed` seconds.
    pub fn update(&mut self, elapsed: f32) {
        let looking = self.input.looking;
        let moving = self.controller.step(
            &mut self.player,
            self.input.move_axes(),
            looking,
            self.scene.camera(self.bindings.camera),
            &self.tuning.area,
            elapsed,
        );
        self.hold_point = self.controller.hold_point(&self.player);
        self.refresh_camera();
        if moving {
            self.controller.face(&mut self.player, looking, self.rig.yaw);
        }

        let basis = self.player.basis();
        self.audio
            .set_listener(self.player.position, basis.right, self.tuning.audio.listener_ramp);

        if self.input.downs(Action::Interact) > 0 {
            self.interact();
        }
        self.sync_scene();

        for (i, cooker) in self.cookers.iter_mut().enumerate() {
            match cooker.advance(elapsed, &self.tuning.cooker) {
                Some(CookerState::Burnt) => tracing::info!(cooker = i, "rice burnt"),
                Some(state) => tracing::debug!(cooker = i, ?state, "cooker changed phase"),
                None => {}
            }
        }

        if let Some(slot) = self.tickets.tick_spawn(elapsed, &self.tuning.tickets, &mut self.rng) {
            self.audio.play(SoundId::BellDing, self.tuning.audio.bell_volume);
            tracing::info!(slot, duration = self.tickets.slots()[slot].duration, "new order");
        }
        for slot in self.tickets.tick_expiry(elapsed, &self.tuning.tickets, &mut self.rng) {
            tracing::info!(slot, score = self.tickets.score(), "order expired");
        }

        self.input.clear_downs();
    }

    pub fn hud(&self) -> Hud {
        Hud::build(
            &self.tuning.stations,
            self.player.position,
            self.tickets.slots(),
            self.tickets.score(),
        )
    }

    pub fn draw(&mut self, drawable_size: UVec2, renderer: &mut impl Renderer) {
        self.scene.camera_mut(self.bindings.camera).set_aspect(drawable_size.x, drawable_size.y);
        let hud = self.hud();
        renderer.draw(&FrameView {
            scene: &self.scene,
            camera: self.scene.camera(self.bindings.camera),
            hud: &hud,
        });
    }

    /// Put everything back to the start of a round. The music keeps going.
    pub fn restart(&mut self) {
        for cooker in &mut self.cookers {
            if let Some(sound) = cooker.empty() {
                self.audio.stop(sound);
            }
        }
        self.cookers = Default::default();
        self.pools.clear();
        self.held = None;
        self.player = Player::new(self.tuning.player.start);
        self.rig.reset();
        self.input.clear_downs();
        self.tickets = TicketBoard::new(&self.tuning.tickets, &mut self.rng);
        self.hold_point = self.controller.hold_point(&self.player);
        self.refresh_camera();
        self.sync_scene();
        tracing::info!("round restarted");
    }

    fn refresh_camera(&mut self) {
        self.rig
            .update_camera(self.scene.camera_mut(self.bindings.camera), &self.player, &self.tuning.area);
    }

    fn interact(&mut self) {
        let here = Surroundings::survey(
            &self.tuning.stations,
            self.player.position,
            &self.cookers,
            self.pools.bowls_out(),
        );
        let Some(interaction) = plan(self.held.map(|b| b.contents), &here) else {
            tracing::trace!(position = ?self.player.position, "nothing to do here");
            return;
        };
        if self.apply(interaction) {
            tracing::debug!(?interaction, held = ?self.held, "interaction");
        } else {
            tracing::trace!(?interaction, "no free bowl for interaction");
        }
    }

    fn apply(&mut self, interaction: Interaction) -> bool {
        match interaction {
            Interaction::TakeBowl => match self.pools.take_from_stack() {
                Some(bowl) => {
                    self.held = Some(bowl);
                    true
                }
                None => false,
            },
            Interaction::ScoopRice => self.swap_held(BowlContents::UncookedRice),
            Interaction::LoadCooker(i) => {
                if !self.swap_held(BowlContents::Empty) {
                    return false;
                }
                let levels = &self.tuning.audio;
                let sound = self.audio.play_positional(
                    SoundId::BoilingWater,
                    levels.boiling_volume,
                    self.tuning.stations.rice_cookers[i].position,
                    levels.boiling_half_volume_radius,
                );
                self.cookers[i].load(sound)
            }
            Interaction::CollectCooked(i) | Interaction::CollectBurnt(i) => {
                let contents = match interaction {
                    Interaction::CollectCooked(_) => BowlContents::CookedRice,
                    _ => BowlContents::BurntRice,
                };
                if !self.swap_held(contents) {
                    return false;
                }
                if let Some(sound) = self.cookers[i].empty() {
                    self.audio.stop(sound);
                }
                true
            }
            Interaction::Deliver => {
                let Some(bowl) = self.held.take() else {
                    return false;
                };
                self.pools.serve(bowl);
                match self.tickets.complete(OrderKind::Rice, &self.tuning.tickets) {
                    Some(reward) => tracing::info!(reward, score = self.tickets.score(), "order served"),
                    None => tracing::debug!("served rice nobody ordered"),
                }
                true
            }
            Interaction::Discard => self.swap_held(BowlContents::Empty),
        }
    }

    /// Trade the carried bowl for one showing `contents`.
    fn swap_held(&mut self, contents: BowlContents) -> bool {
        let Some(bowl) = self.held else {
            return false;
        };
        match self.pools.refill(bowl, contents) {
            Some(next) => {
                self.held = Some(next);
                true
            }
            None => false,
        }
    }

    /// Mirror gameplay state onto the scene nodes: the player transform, the
    /// carried bowl at the hold point, every other bowl parked out of sight.
    fn sync_scene(&mut self) {
        let player = self.scene.node_mut(self.bindings.player);
        player.position = self.player.position;
        player.rotation = self.player.rotation;

        let held = self.held;
        let park = self.tuning.stations.off_screen;
        for (contents, slot, node) in self.bindings.all_bowls() {
            let carried = held == Some(HeldBowl { contents, slot });
            self.scene.node_mut(node).position = if carried { self.hold_point } else { park };
        }
    }
}
