//! Turtle state used to walk a plant graph.

use crate::mtg::NodeId;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// The state of the interpretation turtle.
///
/// Tracks the position and orientation frame that organ meshes are attached to.
/// One turtle is created per plant; children of a node start from a copy of the
/// turtle as it was left by their parent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Turtle {
    /// Current world-space position of the cursor.
    pub position: Vec3,

    /// Direction of forward motion. Organ meshes grow along it.
    pub heading: Vec3,

    /// Reference direction orthogonal to the heading.
    pub up: Vec3,

    /// The graph node the turtle was last tagged with.
    pub id: Option<NodeId>,
}

impl Default for Turtle {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            heading: Vec3::Z,
            up: Vec3::X,
            id: None,
        }
    }
}

impl Turtle {
    /// A fresh turtle at `position` with the default orientation.
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Rotates the frame around the heading by `angle` radians (Roll).
    pub fn roll_left(&mut self, angle: f32) {
        if angle == 0.0 {
            return;
        }
        let rot = Quat::from_axis_angle(self.heading, angle);
        self.up = (rot * self.up).normalize();
    }

    /// Turns the heading towards the up vector by `angle` radians (Pitch).
    pub fn pitch_up(&mut self, angle: f32) {
        if angle == 0.0 {
            return;
        }
        let axis = self.heading.cross(self.up).normalize();
        let rot = Quat::from_axis_angle(axis, angle);
        self.heading = (rot * self.heading).normalize();
        self.up = (rot * self.up).normalize();
    }

    /// Moves the cursor along the heading.
    pub fn forward(&mut self, distance: f32) {
        self.position += self.heading * distance;
    }

    /// Tags the turtle with the node it is interpreting.
    pub fn set_id(&mut self, id: NodeId) {
        self.id = Some(id);
    }
}
