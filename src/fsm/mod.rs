//! Function-pointer finite state machine engine for the operating mode.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │  ModeTable                                                           │
//! │  ┌─────────────┬──────────┬──────────┬─────────────┬──────────────┐  │
//! │  │ ModeId      │ on_enter │ on_exit  │ on_update   │ intensity    │  │
//! │  ├─────────────┼──────────┼──────────┼─────────────┼──────────────┤  │
//! │  │ Calibrating │ fn(ctx)  │ fn(ctx)  │ fn(ctx)->.. │ fn(&ctx)->u16│  │
//! │  │ Normal      │    -     │    -     │ fn(ctx)->.. │ fn(&ctx)->u16│  │
//! │  │ SleepIn     │ fn(ctx)  │ fn(ctx)  │ fn(ctx)->.. │ fn(&ctx)->u16│  │
//! │  │ ManualOn    │ fn(ctx)  │ fn(ctx)  │ fn(ctx)->.. │ fn(&ctx)->u16│  │
//! │  └─────────────┴──────────┴──────────┴─────────────┴──────────────┘  │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each zero-cross edge the engine calls `on_update` for the **current**
//! mode.  If it returns `Some(next_id)`, the engine runs `on_exit` for the
//! current mode, then `on_enter` for the next.  The mode that is current
//! after the update then selects the light intensity via `intensity`.

pub mod context;
pub mod states;

use context::ModeContext;
use log::info;

// ---------------------------------------------------------------------------
// Mode identity
// ---------------------------------------------------------------------------

/// Enumeration of all operating modes.
/// Must stay in sync with the table built in [`states::build_mode_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ModeId {
    Calibrating = 0,
    Normal = 1,
    SleepIn = 2,
    ManualOn = 3,
}

impl ModeId {
    /// Total number of modes: used to size the table array.
    pub const COUNT: usize = 4;

    /// Convert a `u8` index back to `ModeId`.  Out-of-range values map to
    /// `Calibrating`, the mode that never drives the gate.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Calibrating,
            1 => Self::Normal,
            2 => Self::SleepIn,
            3 => Self::ManualOn,
            _ => {
                debug_assert!(false, "invalid mode index: {idx}");
                Self::Calibrating
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
pub type ModeActionFn = fn(&mut ModeContext);

/// Per-edge update handler.  Returns `Some(next)` to trigger a transition.
pub type ModeUpdateFn = fn(&mut ModeContext) -> Option<ModeId>;

/// Light intensity for the mode: 0 = off, 1..=STEPS = dawn step, above = full on.
pub type IntensityFn = fn(&ModeContext) -> u16;

// ---------------------------------------------------------------------------
// Mode descriptor (one row in the table)
// ---------------------------------------------------------------------------

pub struct ModeDescriptor {
    pub id: ModeId,
    pub name: &'static str,
    pub on_enter: Option<ModeActionFn>,
    pub on_exit: Option<ModeActionFn>,
    pub on_update: ModeUpdateFn,
    pub intensity: IntensityFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

pub struct Fsm {
    /// Fixed-size table indexed by `ModeId as usize`.
    table: [ModeDescriptor; ModeId::COUNT],
    /// Index of the currently active mode.
    current: usize,
}

impl Fsm {
    pub fn new(table: [ModeDescriptor; ModeId::COUNT], initial: ModeId) -> Self {
        Self {
            table,
            current: initial as usize,
        }
    }

    /// Run the initial `on_enter` for the starting mode.
    pub fn start(&mut self, ctx: &mut ModeContext) {
        info!("FSM starting in mode: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Run the current mode's update and follow the transition it asks for.
    pub fn tick(&mut self, ctx: &mut ModeContext) {
        let next = (self.table[self.current].on_update)(ctx);
        if let Some(next_id) = next {
            self.transition(next_id, ctx);
        }
    }

    /// Force an immediate transition (calibration completion).
    pub fn force_transition(&mut self, next: ModeId, ctx: &mut ModeContext) {
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    pub fn current_mode(&self) -> ModeId {
        self.table[self.current].id
    }

    /// Intensity requested by the current mode.
    pub fn intensity(&self, ctx: &ModeContext) -> u16 {
        (self.table[self.current].intensity)(ctx)
    }

    fn transition(&mut self, next_id: ModeId, ctx: &mut ModeContext) {
        let next_idx = next_id as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
