//! Concrete mode handler functions and table builder.
//!
//! ```text
//!  CALIBRATING ──[curve ready]──▶ NORMAL ──[release < threshold]──▶ SLEEP-IN
//!                                  ▲  │                                │
//!                                  │  └─[release ≥ threshold]─┐        │
//!                                  │                          ▼        │
//!                                  ├──[any release / expired]── MANUAL-ON
//!                                  │                                   │
//!                                  └──[any release / ceiling minute]───┘
//! ```

use super::context::ModeContext;
use super::{ModeDescriptor, ModeId};
use crate::config::{DAWN_MIN, STEPS};
use log::info;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static mode table.  Called once at startup.
pub fn build_mode_table() -> [ModeDescriptor; ModeId::COUNT] {
    [
        // Index 0: Calibrating
        ModeDescriptor {
            id: ModeId::Calibrating,
            name: "Calibrating",
            on_enter: Some(calibrating_enter),
            on_exit: Some(calibrating_exit),
            on_update: calibrating_update,
            intensity: dark,
        },
        // Index 1: Normal
        ModeDescriptor {
            id: ModeId::Normal,
            name: "Normal",
            on_enter: None,
            on_exit: None,
            on_update: normal_update,
            intensity: normal_intensity,
        },
        // Index 2: SleepIn
        ModeDescriptor {
            id: ModeId::SleepIn,
            name: "SleepIn",
            on_enter: Some(sleep_in_enter),
            on_exit: Some(sleep_in_exit),
            on_update: sleep_in_update,
            intensity: sleep_in_intensity,
        },
        // Index 3: ManualOn
        ModeDescriptor {
            id: ModeId::ManualOn,
            name: "ManualOn",
            on_enter: Some(manual_on_enter),
            on_exit: Some(manual_on_exit),
            on_update: manual_on_update,
            intensity: manual_on_intensity,
        },
    ]
}

/// Base dawn ramp: the minute itself while inside the dawn window, else off.
pub fn dawn_intensity(minute: u16) -> u16 {
    if (minute as usize) < DAWN_MIN * STEPS {
        minute
    } else {
        0
    }
}

fn dark(_ctx: &ModeContext) -> u16 {
    0
}

// ═══════════════════════════════════════════════════════════════════════════
//  CALIBRATING: measuring the mains half-wave, gate never driven
// ═══════════════════════════════════════════════════════════════════════════

fn calibrating_enter(ctx: &mut ModeContext) {
    ctx.indicator = false;
}

fn calibrating_exit(ctx: &mut ModeContext) {
    // Indicator on signals a completed calibration.
    ctx.indicator = true;
}

fn calibrating_update(_ctx: &mut ModeContext) -> Option<ModeId> {
    // Left only through the controller once the dawn curve exists.
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  NORMAL: schedule-driven dawn
// ═══════════════════════════════════════════════════════════════════════════

fn normal_update(ctx: &mut ModeContext) -> Option<ModeId> {
    let gesture = ctx.gesture?;
    if gesture.duration < ctx.config.gesture_threshold {
        Some(ModeId::SleepIn)
    } else {
        Some(ModeId::ManualOn)
    }
}

fn normal_intensity(ctx: &ModeContext) -> u16 {
    dawn_intensity(ctx.minute)
}

// ═══════════════════════════════════════════════════════════════════════════
//  SLEEP-IN: dawn postponed by a fixed offset
// ═══════════════════════════════════════════════════════════════════════════

fn sleep_in_enter(ctx: &mut ModeContext) {
    ctx.indicator = false;
    info!(
        "SLEEP-IN: dawn delayed by {} min until minute {}",
        ctx.config.sleep_in_offset_minutes, ctx.config.sleep_in_ceiling_minute
    );
}

fn sleep_in_exit(ctx: &mut ModeContext) {
    ctx.indicator = true;
}

fn sleep_in_update(ctx: &mut ModeContext) -> Option<ModeId> {
    if ctx.minute == ctx.config.sleep_in_ceiling_minute {
        info!("SLEEP-IN: ceiling minute {} reached", ctx.minute);
        return Some(ModeId::Normal);
    }
    if ctx.gesture.is_some() {
        return Some(ModeId::Normal);
    }
    None
}

fn sleep_in_intensity(ctx: &ModeContext) -> u16 {
    let offset = ctx.config.sleep_in_offset_minutes;
    if ctx.minute > offset {
        dawn_intensity(ctx.minute - offset)
    } else {
        0
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  MANUAL-ON: forced light for a hold-proportional number of minutes
// ═══════════════════════════════════════════════════════════════════════════

fn manual_on_enter(ctx: &mut ModeContext) {
    let held = ctx.gesture.map_or(0, |g| g.duration);
    ctx.manual_minutes_left = held / ctx.config.manual_ticks_per_minute;
    info!(
        "MANUAL-ON: held {} half-cycles → {} min",
        held, ctx.manual_minutes_left
    );
}

fn manual_on_exit(ctx: &mut ModeContext) {
    ctx.manual_minutes_left = 0;
}

fn manual_on_update(ctx: &mut ModeContext) -> Option<ModeId> {
    if ctx.minute_boundary {
        if ctx.manual_minutes_left == 0 {
            info!("MANUAL-ON: expired");
            return Some(ModeId::Normal);
        }
        ctx.manual_minutes_left -= 1;
    }
    if ctx.gesture.is_some() {
        return Some(ModeId::Normal);
    }
    None
}

fn manual_on_intensity(ctx: &ModeContext) -> u16 {
    ctx.manual_minutes_left
}
