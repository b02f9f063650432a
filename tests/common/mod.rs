//! Peripherals that record every call into a shared log.

#![allow(dead_code)]

use kiosk_fsm::peripherals::{Buzzer, Color, Display, LightStrip};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq)]
pub enum Output {
    Clear,
    Text { row: u8, text: String },
    Beep { buzzer: &'static str, tone_hz: u32, duration: Duration },
    Rest { buzzer: &'static str },
    Color(Color),
    LightsOff,
}

#[derive(Clone, Debug, Default)]
pub struct OutputLog {
    entries: Arc<Mutex<Vec<Output>>>,
}

impl OutputLog {
    pub fn push(&self, output: Output) {
        self.entries.lock().unwrap().push(output);
    }

    pub fn take(&self) -> Vec<Output> {
        std::mem::take(&mut *self.entries.lock().unwrap())
    }

    pub fn snapshot(&self) -> Vec<Output> {
        self.entries.lock().unwrap().clone()
    }

    /// Most recent text shown on `row`.
    pub fn last_text(&self, row: u8) -> Option<String> {
        self.snapshot().into_iter().rev().find_map(|output| match output {
            Output::Text { row: r, text } if r == row => Some(text),
            _ => None,
        })
    }

    pub fn display(&self) -> RecordingDisplay {
        RecordingDisplay { log: self.clone() }
    }

    pub fn buzzer(&self, name: &'static str) -> RecordingBuzzer {
        RecordingBuzzer {
            name,
            log: self.clone(),
        }
    }

    pub fn light_strip(&self) -> RecordingLightStrip {
        RecordingLightStrip { log: self.clone() }
    }
}

pub struct RecordingDisplay {
    log: OutputLog,
}

impl Display for RecordingDisplay {
    fn clear(&mut self) {
        self.log.push(Output::Clear);
    }

    fn show_text(&mut self, text: &str, row: u8) {
        self.log.push(Output::Text {
            row,
            text: text.to_string(),
        });
    }
}

pub struct RecordingBuzzer {
    name: &'static str,
    log: OutputLog,
}

impl Buzzer for RecordingBuzzer {
    fn beep(&mut self, tone_hz: u32, duration: Duration) {
        self.log.push(Output::Beep {
            buzzer: self.name,
            tone_hz,
            duration,
        });
    }

    fn rest(&mut self, _duration: Duration) {
        self.log.push(Output::Rest { buzzer: self.name });
    }
}

pub struct RecordingLightStrip {
    log: OutputLog,
}

impl LightStrip for RecordingLightStrip {
    fn set_color(&mut self, color: Color) {
        self.log.push(Output::Color(color));
    }

    fn off(&mut self) {
        self.log.push(Output::LightsOff);
    }
}
