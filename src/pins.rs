//! GPIO pin assignments for the door controller board.
//!
//! Single source of truth — the firmware binary builds every pin driver
//! from these numbers rather than hard-coding them.
//!
//! All six inputs are configured with the internal pull-up enabled and
//! idle high.  All four outputs idle low.

// ---------------------------------------------------------------------------
// Position limit switches
// ---------------------------------------------------------------------------

/// Fully-open end-of-travel switch (LSA).
pub const OPEN_LIMIT_GPIO: i32 = 15;
/// Fully-closed end-of-travel switch (LSC).
pub const CLOSE_LIMIT_GPIO: i32 = 4;

// ---------------------------------------------------------------------------
// Fault and operator inputs (active low)
// ---------------------------------------------------------------------------

/// Thermal / emergency-stop loop (FTC).  LOW = fault.
pub const FAULT_GPIO: i32 = 16;
/// Open push-button (KEYA).
pub const OPEN_BUTTON_GPIO: i32 = 17;
/// Close push-button (KEYC).
pub const CLOSE_BUTTON_GPIO: i32 = 18;
/// Step / start push-button (PP).
pub const STEP_BUTTON_GPIO: i32 = 19;

// ---------------------------------------------------------------------------
// H-bridge motor driver
// ---------------------------------------------------------------------------

/// Bridge IN1 — HIGH drives the leaf towards open (MA).
pub const MOTOR_OPEN_GPIO: i32 = 22;
/// Bridge IN2 — HIGH drives the leaf towards closed (MC).
pub const MOTOR_CLOSE_GPIO: i32 = 23;

// ---------------------------------------------------------------------------
// Indicators
// ---------------------------------------------------------------------------

/// Warning lamp.
pub const LAMP_GPIO: i32 = 21;
/// Buzzer (an LED on the bench board).
pub const BUZZER_GPIO: i32 = 27;

/// Every input line, in the order the status record reports them.
pub const INPUT_GPIOS: [i32; 6] = [
    OPEN_LIMIT_GPIO,
    CLOSE_LIMIT_GPIO,
    OPEN_BUTTON_GPIO,
    CLOSE_BUTTON_GPIO,
    STEP_BUTTON_GPIO,
    FAULT_GPIO,
];

/// Every output line.
pub const OUTPUT_GPIOS: [i32; 4] = [MOTOR_OPEN_GPIO, MOTOR_CLOSE_GPIO, LAMP_GPIO, BUZZER_GPIO];
