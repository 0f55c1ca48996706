//! Math types for auricle

pub use glam::Vec3;

/// The virtual "ears" a mix quantum is rendered for.
///
/// A listener is a plain value: the mixer is handed two of them per mix call
/// (the pose at the start of the buffer and the pose at the end) and blends
/// between them sample-by-sample. The caller is responsible for keeping
/// `forward` and `left` orthonormal; they are consumed as-is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Listener {
    /// World-space position of the listener.
    pub position: Vec3,
    /// Unit vector the listener is facing along.
    pub forward: Vec3,
    /// Unit vector pointing out of the listener's left ear.
    pub left: Vec3,
}

impl Listener {
    pub fn new(position: Vec3, forward: Vec3, left: Vec3) -> Self {
        Self {
            position,
            forward,
            left,
        }
    }

    /// A listener at `position` facing negative Z with X to its right.
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            forward: -Vec3::Z,
            left: -Vec3::X,
        }
    }

    /// Unit vector out of the top of the listener's head.
    pub fn up(&self) -> Vec3 {
        self.forward.cross(self.left)
    }

    /// Componentwise linear blend between two listener poses.
    ///
    /// `forward` and `left` are not renormalized after blending. Across one
    /// mix quantum the rotation between the endpoint poses is small, so the
    /// drift from unit length stays inaudible; see the mixer docs.
    pub fn lerp(a: &Listener, b: &Listener, x: f32) -> Self {
        Self {
            position: a.position.lerp(b.position, x),
            forward: a.forward.lerp(b.forward, x),
            left: a.left.lerp(b.left, x),
        }
    }
}

impl Default for Listener {
    fn default() -> Self {
        Self::at(Vec3::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listener_lerp_endpoints() {
        let a = Listener::at(Vec3::ZERO);
        let b = Listener::at(Vec3::new(10.0, 0.0, 0.0));

        let start = Listener::lerp(&a, &b, 0.0);
        let end = Listener::lerp(&a, &b, 1.0);
        assert_eq!(start.position, a.position);
        assert_eq!(end.position, b.position);

        let mid = Listener::lerp(&a, &b, 0.5);
        assert_eq!(mid.position, Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(mid.forward, a.forward);
    }

    #[test]
    fn test_listener_up_is_y_for_default_pose() {
        let l = Listener::default();
        assert!((l.up() - Vec3::Y).length() < 1e-6);
    }
}
