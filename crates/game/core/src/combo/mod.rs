//! Multi-step melee combo ability.
//!
//! States are `Idle` (step 0) and `Active(1..=5)`. Activation starts step 1;
//! an input while the combo window is open advances one step. Each step loads
//! its row by name (`LightAttack_<n>` / `HeavyAttack_<n>`), pays its stamina
//! cost and plays its montage.
//!
//! The combo ends on window expiry, on the end of the current montage, on a
//! failed stamina check, on a configuration error, past the last step, and on
//! cancellation. Whichever of these arrives first performs the reset; window
//! timers and montage notifications are matched by handle, so the ones that
//! arrive later find nothing to end.
pub mod hit;

pub use hit::HitResolution;

use std::sync::Arc;

use crate::ability_system::AbilitySystem;
use crate::attributes::Attribute;
use crate::config::CombatConfig;
use crate::context::CombatContext;
use crate::data::{AttackType, ComboAttackRow, DataError, DataTable};
use crate::effects::EffectSpec;
use crate::entity::{EntityId, Transform};
use crate::env::{MontageEnd, MontageInstance, MontagePlayer, MontageRequest, OverlapQuery};
use crate::error::{CombatError, ErrorSeverity};
use crate::tags::native::{state, stats};
use crate::timer::{TimerCallback, TimerHandle, TimerKind};

/// Reasons a combo input was refused or a step failed.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ComboError {
    #[error("character is dead")]
    Dead,

    #[error("combo step in progress, window closed")]
    Busy,

    #[error("not enough stamina: required {required}, available {available}")]
    NotEnoughStamina { required: f32, available: f32 },

    #[error("combo chain already at its last step")]
    ChainComplete,

    #[error("no montage assigned to combo row '{row}'")]
    MontageMissing { row: String },

    #[error(transparent)]
    Data(#[from] DataError),
}

impl CombatError for ComboError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            ComboError::Dead
            | ComboError::Busy
            | ComboError::NotEnoughStamina { .. }
            | ComboError::ChainComplete => ErrorSeverity::Recoverable,
            ComboError::MontageMissing { .. } => ErrorSeverity::Fatal,
            ComboError::Data(err) => err.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ComboError::Dead => "COMBO_DEAD",
            ComboError::Busy => "COMBO_BUSY",
            ComboError::NotEnoughStamina { .. } => "COMBO_NOT_ENOUGH_STAMINA",
            ComboError::ChainComplete => "COMBO_CHAIN_COMPLETE",
            ComboError::MontageMissing { .. } => "COMBO_MONTAGE_MISSING",
            ComboError::Data(err) => err.error_code(),
        }
    }
}

/// Why a combo returned to idle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum ComboEndReason {
    WindowExpired,
    Finisher,
    MontageEnded(MontageEnd),
    StaminaDepleted,
    ChainComplete,
    ConfigError,
    Cancelled,
    Death,
}

impl ComboEndReason {
    fn for_error(err: &ComboError) -> Self {
        match err {
            ComboError::NotEnoughStamina { .. } => Self::StaminaDepleted,
            ComboError::ChainComplete => Self::ChainComplete,
            ComboError::Dead => Self::Death,
            _ => Self::ConfigError,
        }
    }
}

#[derive(Debug, Default)]
pub struct ComboAttack {
    table: Option<Arc<DataTable<ComboAttackRow>>>,
    step: u8,
    attack_type: AttackType,
    window_open: bool,
    next_is_heavy: bool,
    row: Option<ComboAttackRow>,
    window_timer: Option<TimerHandle>,
    montage: Option<MontageInstance>,
}

impl ComboAttack {
    pub fn new(table: Option<Arc<DataTable<ComboAttackRow>>>) -> Self {
        Self {
            table,
            ..Self::default()
        }
    }

    /// Current step, 0 while idle.
    pub fn step(&self) -> u8 {
        self.step
    }

    pub fn is_active(&self) -> bool {
        self.step > 0
    }

    pub fn attack_type(&self) -> AttackType {
        self.attack_type
    }

    pub fn is_window_open(&self) -> bool {
        self.window_open
    }

    pub fn is_heavy_queued(&self) -> bool {
        self.next_is_heavy
    }

    pub fn current_row(&self) -> Option<&ComboAttackRow> {
        self.row.as_ref()
    }

    pub fn current_montage(&self) -> Option<MontageInstance> {
        self.montage
    }

    pub fn window_timer(&self) -> Option<TimerHandle> {
        self.window_timer
    }

    /// Pre-activation check.
    ///
    /// With the window open any input is accepted; the stamina check happens
    /// when the step advances. From idle, stamina is checked against the first
    /// light attack row.
    pub fn can_activate(&self, asc: &AbilitySystem) -> Result<(), ComboError> {
        if asc.has_matching_tag(&state::DEAD) {
            return Err(ComboError::Dead);
        }
        if self.window_open {
            return Ok(());
        }
        if self.is_active() {
            return Err(ComboError::Busy);
        }
        let row = self.load_row(1, AttackType::Light)?;
        check_stamina(asc, &row)
    }

    /// Handles a combo input. Returns the step now playing.
    pub fn activate(
        &mut self,
        ctx: &mut CombatContext<'_>,
        montages: &mut dyn MontagePlayer,
    ) -> Result<u8, ComboError> {
        if let Err(err) = self.can_activate(ctx.asc) {
            report(ctx.owner(), &err);
            return Err(err);
        }

        if self.window_open {
            self.close_window(ctx);
            return self.advance(ctx, montages);
        }

        self.step = 1;
        self.attack_type = if std::mem::take(&mut self.next_is_heavy) {
            AttackType::Heavy
        } else {
            AttackType::Light
        };
        ctx.asc.add_loose_tag(state::COMBO_ACTIVE);
        self.run_step(ctx, montages)
    }

    fn advance(
        &mut self,
        ctx: &mut CombatContext<'_>,
        montages: &mut dyn MontagePlayer,
    ) -> Result<u8, ComboError> {
        self.step += 1;
        // A queued heavy input switches the chain for every later step.
        if std::mem::take(&mut self.next_is_heavy) {
            self.attack_type = AttackType::Heavy;
        }
        if self.step > CombatConfig::MAX_COMBO_STEP {
            self.end(ctx, ComboEndReason::ChainComplete);
            return Err(ComboError::ChainComplete);
        }
        self.run_step(ctx, montages)
    }

    fn run_step(
        &mut self,
        ctx: &mut CombatContext<'_>,
        montages: &mut dyn MontagePlayer,
    ) -> Result<u8, ComboError> {
        match self.try_step(ctx, montages) {
            Ok(step) => {
                tracing::debug!(
                    target: "combat::combo",
                    owner = %ctx.owner(),
                    step,
                    attack = %self.attack_type,
                    "combo step started"
                );
                Ok(step)
            }
            Err(err) => {
                report(ctx.owner(), &err);
                self.end(ctx, ComboEndReason::for_error(&err));
                Err(err)
            }
        }
    }

    /// Loads the row, checks stamina, starts the montage, then pays the cost.
    fn try_step(
        &mut self,
        ctx: &mut CombatContext<'_>,
        montages: &mut dyn MontagePlayer,
    ) -> Result<u8, ComboError> {
        let row_name = ComboAttackRow::row_name(self.step, self.attack_type);
        let row = self.load_row(self.step, self.attack_type)?;
        check_stamina(ctx.asc, &row)?;

        let montage = row
            .montage
            .as_deref()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ComboError::MontageMissing {
                row: row_name.clone(),
            })?;
        let request = MontageRequest::new(montage).with_hitbox(row.hitbox);
        let instance = montages
            .play_montage(ctx.owner(), request)
            .ok_or(ComboError::MontageMissing { row: row_name })?;

        ctx.apply_to_self(&EffectSpec::instant().set_by_caller(stats::STAMINA, -row.stamina_cost));
        self.montage = Some(instance);
        self.row = Some(row);
        Ok(self.step)
    }

    fn load_row(&self, step: u8, attack_type: AttackType) -> Result<ComboAttackRow, DataError> {
        let table = self
            .table
            .as_ref()
            .ok_or(DataError::TableNotAssigned("ComboAttackRow"))?;
        table
            .find_row(&ComboAttackRow::row_name(step, attack_type))
            .cloned()
    }

    // ========================================================================
    // Animation notifies
    // ========================================================================

    /// Opens the follow-up window for the current step.
    ///
    /// A finisher row (zero window) ends the combo instead. Returns true if a
    /// window was opened.
    pub fn open_combo_window(&mut self, ctx: &mut CombatContext<'_>) -> bool {
        let Some(row) = self.row.as_ref() else {
            return false;
        };
        if row.is_finisher() {
            self.end(ctx, ComboEndReason::Finisher);
            return false;
        }
        let window = row.combo_window_time;

        if let Some(previous) = self.window_timer.take() {
            ctx.timers.cancel(previous);
        }
        self.window_open = true;
        ctx.asc.add_loose_tag(state::COMBO_WINDOW_OPEN);
        self.window_timer = Some(ctx.timers.schedule(
            TimerCallback::new(ctx.owner(), TimerKind::ComboWindowExpired),
            window,
            false,
        ));
        true
    }

    /// Queues the next step as heavy. Only honored while the window is open.
    pub fn request_heavy(&mut self) -> bool {
        if self.window_open {
            self.next_is_heavy = true;
        }
        self.next_is_heavy
    }

    /// Resolves the hitbox of the current step.
    ///
    /// Returns `None` while idle.
    pub fn resolve_hit(
        &self,
        owner: EntityId,
        transform: &Transform,
        overlap: &dyn OverlapQuery,
        config: &CombatConfig,
    ) -> Option<HitResolution> {
        let row = self.row.as_ref()?;
        let center = transform.ahead(config.hit_sphere_offset);
        let targets = hit::sphere_targets(owner, center, config.hit_sphere_radius, overlap);
        let damage = config.base_attack_damage * row.damage_multiplier;
        Some(HitResolution {
            targets,
            damage: hit::damage_spec(owner, damage),
            overclock_gain: row.overclock_gain,
        })
    }

    // ========================================================================
    // Terminal events
    // ========================================================================

    /// Window timer callback. Stale handles are ignored.
    pub fn on_window_expired(&mut self, ctx: &mut CombatContext<'_>, timer: TimerHandle) -> bool {
        if self.window_timer != Some(timer) {
            return false;
        }
        self.window_timer = None;
        self.end(ctx, ComboEndReason::WindowExpired)
    }

    /// Montage end notification. Ignored unless `instance` is the montage of
    /// the current step.
    pub fn on_montage_ended(
        &mut self,
        ctx: &mut CombatContext<'_>,
        instance: MontageInstance,
        how: MontageEnd,
    ) -> bool {
        if self.montage != Some(instance) {
            return false;
        }
        self.end(ctx, ComboEndReason::MontageEnded(how))
    }

    pub fn cancel(&mut self, ctx: &mut CombatContext<'_>) -> bool {
        self.end(ctx, ComboEndReason::Cancelled)
    }

    /// Resets the runtime state unconditionally.
    ///
    /// Returns false if the combo was already idle.
    pub fn end(&mut self, ctx: &mut CombatContext<'_>, reason: ComboEndReason) -> bool {
        if self.step == 0 && !self.window_open && self.window_timer.is_none() {
            return false;
        }
        let step = self.step;
        if let Some(timer) = self.window_timer.take() {
            ctx.timers.cancel(timer);
        }
        self.step = 0;
        self.window_open = false;
        self.next_is_heavy = false;
        self.attack_type = AttackType::Light;
        self.row = None;
        self.montage = None;
        ctx.asc.remove_loose_tag(&state::COMBO_ACTIVE);
        ctx.asc.remove_loose_tag(&state::COMBO_WINDOW_OPEN);

        tracing::debug!(target: "combat::combo", owner = %ctx.owner(), step, %reason, "combo ended");
        true
    }

    fn close_window(&mut self, ctx: &mut CombatContext<'_>) {
        self.window_open = false;
        if let Some(timer) = self.window_timer.take() {
            ctx.timers.cancel(timer);
        }
        ctx.asc.remove_loose_tag(&state::COMBO_WINDOW_OPEN);
    }
}

fn check_stamina(asc: &AbilitySystem, row: &ComboAttackRow) -> Result<(), ComboError> {
    let available = asc.attribute(Attribute::Stamina);
    if available < row.stamina_cost {
        return Err(ComboError::NotEnoughStamina {
            required: row.stamina_cost,
            available,
        });
    }
    Ok(())
}

fn report(owner: EntityId, err: &ComboError) {
    if err.severity().is_recoverable() {
        tracing::debug!(target: "combat::combo", %owner, code = err.error_code(), "combo input refused: {err}");
    } else {
        tracing::error!(target: "combat::combo", %owner, code = err.error_code(), "combo aborted: {err}");
    }
}
