use super::{BlockId, VoxelPos};
use cgmath::{Point3, Vector3};

#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
}

impl Ray {
    /// Sight ray for a yaw/pitch pose. Yaw 0 looks down -z.
    pub fn from_look(origin: Point3<f32>, yaw: f32, pitch: f32) -> Self {
        Self {
            origin,
            direction: sight_vector(yaw, pitch),
        }
    }

    pub fn at(&self, distance: f32) -> Point3<f32> {
        self.origin + self.direction * distance
    }
}

/// Unit view direction for a yaw/pitch pair in radians
pub fn sight_vector(yaw: f32, pitch: f32) -> Vector3<f32> {
    let m = pitch.cos();
    let heading = yaw - std::f32::consts::FRAC_PI_2;
    Vector3::new(heading.cos() * m, pitch.sin(), heading.sin() * m)
}

/// Cube faces in mesh order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockFace {
    Left,   // -X
    Right,  // +X
    Top,    // +Y
    Bottom, // -Y
    Front,  // -Z
    Back,   // +Z
}

impl BlockFace {
    pub const ALL: [BlockFace; 6] = [
        BlockFace::Left,
        BlockFace::Right,
        BlockFace::Top,
        BlockFace::Bottom,
        BlockFace::Front,
        BlockFace::Back,
    ];

    pub fn normal(&self) -> Vector3<f32> {
        let o = self.offset();
        Vector3::new(o.x as f32, o.y as f32, o.z as f32)
    }

    pub fn offset(&self) -> Vector3<i32> {
        match self {
            BlockFace::Left => Vector3::new(-1, 0, 0),
            BlockFace::Right => Vector3::new(1, 0, 0),
            BlockFace::Top => Vector3::new(0, 1, 0),
            BlockFace::Bottom => Vector3::new(0, -1, 0),
            BlockFace::Front => Vector3::new(0, 0, -1),
            BlockFace::Back => Vector3::new(0, 0, 1),
        }
    }

    pub fn index(&self) -> usize {
        match self {
            BlockFace::Left => 0,
            BlockFace::Right => 1,
            BlockFace::Top => 2,
            BlockFace::Bottom => 3,
            BlockFace::Front => 4,
            BlockFace::Back => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    pub position: VoxelPos,
    pub block: BlockId,
    /// Euclidean distance from the ray origin to `position`
    pub distance: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::InnerSpace;
    use std::f32::consts::PI;

    const EPS: f32 = 1e-5;

    #[test]
    fn test_sight_vector_axes() {
        let v = sight_vector(0.0, 0.0);
        assert!(v.x.abs() < EPS && (v.z + 1.0).abs() < EPS);

        let v = sight_vector(std::f32::consts::PI, 0.0);
        assert!((v.z - 1.0).abs() < EPS);

        let v = sight_vector(0.3, std::f32::consts::FRAC_PI_2);
        assert!((v.y - 1.0).abs() < EPS);
    }

    #[test]
    fn test_sight_vector_is_unit() {
        let v = sight_vector(1.2, -0.7);
        assert!((v.magnitude() - 1.0).abs() < EPS);
    }

    #[test]
    fn test_face_offsets_oppose() {
        assert_eq!(BlockFace::Left.offset(), -BlockFace::Right.offset());
        assert_eq!(BlockFace::Front.normal(), Vector3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_ray_points_along_direction() {
        let ray = Ray::from_look(Point3::new(1.0, 2.0, 3.0), PI, 0.0);
        assert!((ray.at(1.5) - Point3::new(1.0, 2.0, 4.5)).magnitude() < EPS);

        let look = Ray::from_look(Point3::new(0.0, 0.0, 0.0), 0.0, 0.0);
        assert!((look.at(2.0).z + 2.0).abs() < EPS);
    }
}
