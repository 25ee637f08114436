//! # Standard Events
//!
//! Payloads produced by the platform and application layers: keyboard and
//! mouse input, window changes, and the application's per-frame lifecycle.
//! They are ordinary structs; any other `Send + Sync + Debug` type works with
//! the event manager just as well.
//!
//! ```rust
//! use event_manager::{EventCategory, MouseMovedEvent};
//!
//! let event = MouseMovedEvent::new(10.0, 20.0);
//! assert_eq!(event.category(), EventCategory::Input);
//! ```

use crate::utils::current_timestamp;
use serde::{Deserialize, Serialize};

/// Broad grouping of the standard events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    Input,
    Window,
    Application,
}

// ============================================================================
// Input Events
// ============================================================================

/// A key went down. `repeat` is set for auto-repeat presses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyPressedEvent {
    pub key_code: u32,
    pub repeat: bool,
    pub timestamp: u64,
}

impl KeyPressedEvent {
    pub fn new(key_code: u32, repeat: bool) -> Self {
        Self {
            key_code,
            repeat,
            timestamp: current_timestamp(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyReleasedEvent {
    pub key_code: u32,
    pub timestamp: u64,
}

impl KeyReleasedEvent {
    pub fn new(key_code: u32) -> Self {
        Self {
            key_code,
            timestamp: current_timestamp(),
        }
    }
}

/// Cursor position in window coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MouseMovedEvent {
    pub x: f32,
    pub y: f32,
    pub timestamp: u64,
}

impl MouseMovedEvent {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            timestamp: current_timestamp(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MouseButtonPressedEvent {
    pub button: u8,
    pub timestamp: u64,
}

impl MouseButtonPressedEvent {
    pub fn new(button: u8) -> Self {
        Self {
            button,
            timestamp: current_timestamp(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MouseButtonReleasedEvent {
    pub button: u8,
    pub timestamp: u64,
}

impl MouseButtonReleasedEvent {
    pub fn new(button: u8) -> Self {
        Self {
            button,
            timestamp: current_timestamp(),
        }
    }
}

/// Wheel or trackpad scroll offsets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MouseScrolledEvent {
    pub x_offset: f32,
    pub y_offset: f32,
    pub timestamp: u64,
}

impl MouseScrolledEvent {
    pub fn new(x_offset: f32, y_offset: f32) -> Self {
        Self {
            x_offset,
            y_offset,
            timestamp: current_timestamp(),
        }
    }
}

// ============================================================================
// Window Events
// ============================================================================

/// New framebuffer size in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowResizeEvent {
    pub width: u32,
    pub height: u32,
    pub timestamp: u64,
}

impl WindowResizeEvent {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            timestamp: current_timestamp(),
        }
    }

    /// `true` for a zero-area (minimized) window.
    pub fn is_minimized(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowCloseEvent {
    pub timestamp: u64,
}

impl WindowCloseEvent {
    pub fn new() -> Self {
        Self {
            timestamp: current_timestamp(),
        }
    }
}

impl Default for WindowCloseEvent {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowFocusEvent {
    pub focused: bool,
    pub timestamp: u64,
}

impl WindowFocusEvent {
    pub fn new(focused: bool) -> Self {
        Self {
            focused,
            timestamp: current_timestamp(),
        }
    }
}

// ============================================================================
// Application Lifecycle Events
// ============================================================================

/// Fixed-rate simulation tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppTickEvent {
    pub tick: u64,
    pub timestamp: u64,
}

impl AppTickEvent {
    pub fn new(tick: u64) -> Self {
        Self {
            tick,
            timestamp: current_timestamp(),
        }
    }
}

/// Variable-rate update with the elapsed frame time in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppUpdateEvent {
    pub delta_seconds: f32,
    pub timestamp: u64,
}

impl AppUpdateEvent {
    pub fn new(delta_seconds: f32) -> Self {
        Self {
            delta_seconds,
            timestamp: current_timestamp(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppRenderEvent {
    pub frame: u64,
    pub timestamp: u64,
}

impl AppRenderEvent {
    pub fn new(frame: u64) -> Self {
        Self {
            frame,
            timestamp: current_timestamp(),
        }
    }
}

macro_rules! impl_category {
    ($category:expr => $($event:ty),+ $(,)?) => {
        $(
            impl $event {
                /// Category this event belongs to.
                pub fn category(&self) -> EventCategory {
                    $category
                }
            }
        )+
    };
}

impl_category!(EventCategory::Input =>
    KeyPressedEvent,
    KeyReleasedEvent,
    MouseMovedEvent,
    MouseButtonPressedEvent,
    MouseButtonReleasedEvent,
    MouseScrolledEvent,
);
impl_category!(EventCategory::Window => WindowResizeEvent, WindowCloseEvent, WindowFocusEvent);
impl_category!(EventCategory::Application => AppTickEvent, AppUpdateEvent, AppRenderEvent);
