//! Event Queue for Vehicle Side Effects
//!
//! The controller and the arena report what happened during a tick (shots,
//! nudges, trails, expired projectiles) through a double-buffered queue.
//! Consumers such as logging, audio or UI read them on the next tick without
//! being coupled to the control loop.
//!
//! # Example
//!
//! ```ignore
//! // During the tick
//! controller.tick(&mut vehicle, &mut events);
//!
//! // Next tick
//! events.swap();
//! for event in events.iter() {
//!     if let VehicleEvent::Fired { origin, .. } = event {
//!         play_shot_sound(*origin);
//!     }
//! }
//! ```

use glam::Vec3;

// ============================================================================
// Event Types
// ============================================================================

/// Something a vehicle or the arena did during a tick.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum VehicleEvent {
    // -------------------------------------------------------------------------
    // Combat Events
    // -------------------------------------------------------------------------
    /// A projectile was launched.
    Fired {
        /// Launch position
        origin: Vec3,
        /// Launch velocity
        velocity: Vec3,
    },

    /// A projectile aged out and was disposed.
    ProjectileExpired {
        /// Age in ticks at disposal
        age: u32,
    },

    // -------------------------------------------------------------------------
    // Maneuver Events
    // -------------------------------------------------------------------------
    /// A nudge impulse was applied to the chassis.
    Nudged {
        /// World-space impulse
        impulse: Vec3,
    },

    /// Accelerate or brake fired a thrust impulse while airborne.
    AirThrust {
        /// World-space impulse
        impulse: Vec3,
    },

    // -------------------------------------------------------------------------
    // Trail Events
    // -------------------------------------------------------------------------
    /// The trail started emitting (or was re-armed).
    TrailStarted,

    /// The trail latch ran out.
    TrailStopped,
}

// ============================================================================
// Event Queue
// ============================================================================

/// Events written during tick N, readable during tick N+1
#[derive(Debug, Default)]
pub struct EventQueue {
    writing: Vec<VehicleEvent>,
    readable: Vec<VehicleEvent>,
}

impl EventQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, event: VehicleEvent) {
        self.writing.push(event);
    }

    /// Publish this tick's events and drop the previous tick's.
    ///
    /// Call once per tick, before reading.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.writing, &mut self.readable);
        self.writing.clear();
    }

    /// Events published by the last [`swap`](Self::swap)
    pub fn iter(&self) -> impl Iterator<Item = &VehicleEvent> {
        self.readable.iter()
    }
}

// ============================================================================
// Tests
// ============================================================================
