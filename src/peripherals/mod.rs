//! Output devices driven from action callbacks.
//!
//! The traits are the contract the kiosk talks to. Every call is synchronous
//! and fire-and-forget: nothing is returned and the engine checks nothing.
//! The `Logging*` implementations emit tracing events instead of touching
//! hardware, which is what the host binary and the tests use.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

/// Character display addressed by row.
pub trait Display {
    fn clear(&mut self);
    fn show_text(&mut self, text: &str, row: u8);
}

/// Passive buzzer.
pub trait Buzzer {
    /// Sound `tone_hz` for `duration`, then go quiet. May block for the
    /// duration.
    fn beep(&mut self, tone_hz: u32, duration: Duration);

    /// Stay quiet for `duration`. May block.
    fn rest(&mut self, _duration: Duration) {}
}

/// Addressable LED strip treated as one color.
pub trait LightStrip {
    fn set_color(&mut self, color: Color);
    fn off(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }
}

/// Display that logs what it would show.
#[derive(Debug, Default)]
pub struct LoggingDisplay {
    rows: Vec<String>,
}

impl LoggingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text currently on `row`.
    pub fn row(&self, row: u8) -> Option<&str> {
        self.rows.get(usize::from(row)).map(String::as_str)
    }
}

impl Display for LoggingDisplay {
    fn clear(&mut self) {
        self.rows.clear();
        info!(target: "kiosk::display", "clear");
    }

    fn show_text(&mut self, text: &str, row: u8) {
        let index = usize::from(row);
        if self.rows.len() <= index {
            self.rows.resize(index + 1, String::new());
        }
        self.rows[index] = text.to_string();
        info!(target: "kiosk::display", row, text, "show");
    }
}

/// Buzzer that logs its tones instead of sounding them.
#[derive(Debug)]
pub struct LoggingBuzzer {
    name: String,
}

impl LoggingBuzzer {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Buzzer for LoggingBuzzer {
    fn beep(&mut self, tone_hz: u32, duration: Duration) {
        info!(
            target: "kiosk::buzzer",
            buzzer = %self.name,
            tone_hz,
            duration_ms = duration.as_millis() as u64,
            "beep"
        );
    }
}

/// Light strip that logs color changes.
#[derive(Debug)]
pub struct LoggingLightStrip {
    leds: u16,
    color: Color,
}

impl LoggingLightStrip {
    pub fn new(leds: u16) -> Self {
        Self {
            leds,
            color: Color::BLACK,
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }
}

impl LightStrip for LoggingLightStrip {
    fn set_color(&mut self, color: Color) {
        self.color = color;
        info!(target: "kiosk::lights", leds = self.leds, ?color, "set color");
    }

    fn off(&mut self) {
        self.color = Color::BLACK;
        info!(target: "kiosk::lights", leds = self.leds, "off");
    }
}
