//! Orchestration of chops from strike to drops

use std::collections::{BTreeMap, HashSet};

use crate::animation::FallAnimation;
use crate::chop::actor::Actor;
use crate::chop::claims::ClaimSet;
use crate::chop::cooldown::CooldownTracker;
use crate::chop::outcome::{ChopOutcome, Rejection};
use crate::chop::session::{ChopSession, SessionId};
use crate::config::TimberConfig;
use crate::core::error::Error;
use crate::core::lifecycle::Component;
use crate::core::types::Result;
use crate::detect::{DetectedTree, PlacedBlocks, PlacedFilter, TreeDetector};
use crate::host::player::{PlayerId, PlayerState};
use crate::host::scheduler::{ScheduledTask, Scheduler, TickScheduler};
use crate::host::world::WorldMutation;
use crate::species::SpeciesRegistry;
use crate::trajectory::Trajectory;
use crate::voxel::{BlockSource, ChunkPos, Face, VoxelPos};

/// Entry point of tree felling.
///
/// Owns the host capabilities it was built with and every in-flight
/// session. All methods are meant to be called from the tick thread;
/// animation work is handed to the scheduler and comes back through
/// [`run_task`](Self::run_task).
pub struct ChopCoordinator<W, S, P> {
    config: TimberConfig,
    registry: SpeciesRegistry,
    detector: TreeDetector,
    cooldowns: CooldownTracker,
    placed: PlacedBlocks,
    claims: ClaimSet,
    sessions: BTreeMap<SessionId, ChopSession>,
    /// Aborted sessions whose animation task may still be queued
    aborted: HashSet<SessionId>,
    next_session: u64,
    world: W,
    scheduler: S,
    players: P,
}

impl<W: WorldMutation, S: Scheduler, P: PlayerState> ChopCoordinator<W, S, P> {
    pub fn new(config: TimberConfig, world: W, scheduler: S, players: P) -> Result<Self> {
        config.validate()?;
        let registry = SpeciesRegistry::new(config.species.iter().cloned())?;
        let detector = TreeDetector::new(config.max_trunk_voxels);
        log::info!("Tree felling ready with {} species", registry.len());

        Ok(Self {
            config,
            registry,
            detector,
            cooldowns: CooldownTracker::new(),
            placed: PlacedBlocks::new(),
            claims: ClaimSet::new(),
            sessions: BTreeMap::new(),
            aborted: HashSet::new(),
            next_session: 1,
            world,
            scheduler,
            players,
        })
    }

    /// Strike the block at `pos` on `face`.
    ///
    /// Top and bottom strikes fell the tree away from where the actor looks.
    pub fn attempt_chop(&mut self, actor: &Actor, pos: VoxelPos, face: Face) -> ChopOutcome {
        if let Err(reason) = self.check_actor(actor) {
            log::debug!("{} cannot chop: {:?}", actor.id, reason);
            return ChopOutcome::Rejected(reason);
        }

        if self.claims.is_claimed(pos) {
            return ChopOutcome::Rejected(Rejection::AlreadyClaimed);
        }
        let Some(species) = self.registry.lookup(&self.world.block_tag(pos)).cloned() else {
            return ChopOutcome::Rejected(Rejection::NotATrunk);
        };

        let strike_face = if face.is_horizontal() { face } else { actor.facing.opposite() };
        let detected = if self.config.ignore_placed_blocks {
            let view = PlacedFilter::new(&self.world, &self.placed);
            self.detector.detect(pos, strike_face, &species, &view)
        } else {
            self.detector.detect(pos, strike_face, &species, &self.world)
        };
        let tree = match detected {
            Ok(tree) => tree,
            Err(Error::NotATree) => return ChopOutcome::Rejected(Rejection::NotATree),
            Err(e) => return ChopOutcome::Failed(e),
        };

        let id = SessionId(self.next_session);
        self.next_session += 1;
        let positions: Vec<VoxelPos> = tree.positions().collect();
        if self.claims.claim(id, &positions).is_err() {
            return ChopOutcome::Rejected(Rejection::AlreadyClaimed);
        }

        let trajectory = Trajectory::compute(&tree, self.config.max_fall_angle(), self.config.animation_steps);
        let mut instant = !self.config.animate_fall;
        if !instant && trajectory.is_obstructed(&tree, &self.world) {
            if !self.config.instant_fell_when_obstructed {
                self.claims.release(id);
                return ChopOutcome::Rejected(Rejection::ObstructedFall);
            }
            log::debug!("Fall of session {} obstructed, felling instantly", id);
            instant = true;
        }

        let started = if instant {
            FallAnimation::start_instant(id, &tree, trajectory, &mut self.world)
        } else {
            FallAnimation::start(id, &tree, trajectory, &mut self.world)
        };
        let animation = match started {
            Ok(animation) => animation,
            Err(e) => {
                log::warn!("Chop by {} at {} failed: {}", actor.id, pos, e);
                self.claims.release(id);
                return ChopOutcome::Failed(e);
            }
        };

        self.scheduler.schedule_next_tick(ScheduledTask::AnimateStep(id));
        if self.config.cooldown_enabled && !actor.permissions.bypass_cooldown {
            let generation = self.cooldowns.start(actor.id);
            self.scheduler.schedule_delayed(
                ScheduledTask::ExpireCooldown(actor.id, generation),
                self.config.cooldown_ticks(),
            );
        }
        self.placed.forget_all(positions);

        log::info!(
            "{} felled {} at {} (session {}, {} trunk, {} leaves{})",
            actor.id,
            tree.species.id,
            pos,
            id,
            tree.trunk_count(),
            tree.leaf_count(),
            if instant { ", instant" } else { "" }
        );
        self.sessions.insert(id, ChopSession::new(id, actor.id, tree, animation));
        ChopOutcome::Accepted { session: id, instant }
    }

    /// Toggle, tool, permission and cooldown gates, in that order
    fn check_actor(&mut self, actor: &Actor) -> std::result::Result<(), Rejection> {
        if !self.players.is_chopping_enabled(actor.id) {
            return Err(Rejection::ChoppingDisabled);
        }
        if !self.config.is_tool_allowed(actor.held_item.as_ref()) {
            return Err(Rejection::MissingTool);
        }
        if !actor.permissions.chop {
            return Err(Rejection::MissingPermission);
        }
        if self.config.cooldown_enabled && !actor.permissions.bypass_cooldown {
            if let Some(notify) = self.cooldowns.check(actor.id) {
                return Err(Rejection::OnCooldown { notify });
            }
        }
        Ok(())
    }

    /// Run a task previously handed to the scheduler.
    ///
    /// Tasks for sessions that were aborted in the meantime report
    /// `SessionAborted`; hosts can ignore that.
    pub fn run_task(&mut self, task: ScheduledTask) -> Result<()> {
        match task {
            ScheduledTask::AnimateStep(id) => self.step_session(id),
            ScheduledTask::ExpireCooldown(player, generation) => {
                self.cooldowns.expire(player, generation);
                Ok(())
            }
        }
    }

    fn step_session(&mut self, id: SessionId) -> Result<()> {
        let Some(session) = self.sessions.get_mut(&id) else {
            return Err(if self.aborted.remove(&id) {
                Error::SessionAborted(id)
            } else {
                Error::UnknownSession(id)
            });
        };

        if session.animation.advance(&mut self.world).is_terminal() {
            self.finish_session(id);
        } else {
            self.scheduler.schedule_next_tick(ScheduledTask::AnimateStep(id));
        }
        Ok(())
    }

    fn finish_session(&mut self, id: SessionId) {
        let Some(session) = self.sessions.remove(&id) else {
            return;
        };
        self.claims.release(id);
        if self.config.replant_saplings {
            self.replant(&session.tree);
        }
        log::info!("Session {} finished", id);
    }

    /// Put a sapling where the tree was struck, if the spot is free and
    /// sits on soil the species grows on.
    fn replant(&mut self, tree: &DetectedTree) {
        let Some(sapling) = &tree.species.sapling else {
            return;
        };
        let pos = tree.origin;
        if !self.world.block_tag(pos).is_air() {
            return;
        }
        if !tree.species.plantable_soil.contains(&self.world.block_tag(pos.below())) {
            return;
        }
        match self.world.set_block_tag(pos, sapling.clone()) {
            Ok(()) => log::debug!("Replanted {} at {}", sapling, pos),
            Err(e) => log::warn!("Could not replant {} at {}: {}", sapling, pos, e),
        }
    }

    /// Abort one session, putting back every block it has not dropped.
    /// Returns the number of blocks restored.
    pub fn abort_session(&mut self, id: SessionId) -> Result<usize> {
        let mut session = self.sessions.remove(&id).ok_or(Error::UnknownSession(id))?;
        let restored = session.animation.abort(&mut self.world);
        self.claims.release(id);
        self.aborted.insert(id);
        log::info!("Session {} aborted, {} blocks restored", id, restored);
        Ok(restored)
    }

    /// Abort every session with a voxel in `chunk`; returns how many
    pub fn abort_chunk(&mut self, chunk: ChunkPos) -> usize {
        let ids: Vec<SessionId> = self
            .sessions
            .values()
            .filter(|session| session.touches_chunk(chunk))
            .map(|session| session.id)
            .collect();
        for &id in &ids {
            if let Err(e) = self.abort_session(id) {
                log::error!("Failed to abort session {}: {}", id, e);
            }
        }
        ids.len()
    }

    /// Abort all sessions, then shut every component down.
    pub fn shutdown(&mut self) {
        let ids: Vec<SessionId> = self.sessions.keys().copied().collect();
        for id in ids {
            if let Err(e) = self.abort_session(id) {
                log::error!("Failed to abort session {}: {}", id, e);
            }
        }
        for component in self.components_mut() {
            component.shutdown();
            log::debug!("Shut down {}", component.name());
        }
        self.claims.clear();
        self.aborted.clear();
        log::info!("Tree felling shut down");
    }

    /// Validate `config` and apply it to every component and the player
    /// toggles. On error nothing changes.
    pub fn reset(&mut self, config: TimberConfig) -> Result<()> {
        config.validate()?;
        for component in self.components_mut() {
            component.reset(&config)?;
            log::debug!("Reset {}", component.name());
        }
        self.players.set_default_enabled(config.chopping_enabled_by_default);
        self.config = config;
        Ok(())
    }

    fn components_mut(&mut self) -> [&mut dyn Component; 4] {
        [
            &mut self.registry,
            &mut self.detector,
            &mut self.cooldowns,
            &mut self.placed,
        ]
    }

    /// A player put a block down by hand
    pub fn record_placed(&mut self, pos: VoxelPos) {
        self.placed.record_placed(pos);
    }

    /// A block was broken by other means than felling
    pub fn record_broken(&mut self, pos: VoxelPos) {
        self.placed.record_broken(pos);
    }

    /// Flip a player's toggle; returns the new state
    pub fn toggle_chopping(&mut self, player: PlayerId) -> bool {
        self.players.toggle_chopping(player)
    }

    pub fn config(&self) -> &TimberConfig {
        &self.config
    }

    pub fn registry(&self) -> &SpeciesRegistry {
        &self.registry
    }

    pub fn session(&self, id: SessionId) -> Option<&ChopSession> {
        self.sessions.get(&id)
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    pub fn cooldowns(&self) -> &CooldownTracker {
        &self.cooldowns
    }

    pub fn claims(&self) -> &ClaimSet {
        &self.claims
    }

    pub fn placed(&self) -> &PlacedBlocks {
        &self.placed
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn players(&self) -> &P {
        &self.players
    }

    pub fn players_mut(&mut self) -> &mut P {
        &mut self.players
    }
}

impl<W: WorldMutation, P: PlayerState> ChopCoordinator<W, TickScheduler, P> {
    /// Advance the built-in scheduler one tick and run what is due.
    /// Returns the number of tasks run.
    pub fn tick(&mut self) -> usize {
        let due = self.scheduler.step_tick();
        for &task in &due {
            if let Err(e) = self.run_task(task) {
                log::debug!("{:?}: {}", task, e);
            }
        }
        due.len()
    }
}
