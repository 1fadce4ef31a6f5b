//! # Observer Module
//!
//! The free-flying viewpoint. The terrain core only needs two things from
//! it: the grid cell it currently occupies (the traversal origin) and a
//! view transform for whoever renders the result.

use std::sync::Arc;

use cgmath::{EuclideanSpace, InnerSpace, Matrix, Matrix4, Point3, Rad, Vector3, Vector4};

use crate::graph::{ChunkGraph, ChunkNode};

/// World position plus yaw and pitch.
pub struct Observer {
    position: Point3<f32>,
    yaw: f32,
    pitch: f32,
}

impl Observer {
    pub fn new(position: Point3<f32>) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    pub fn set_position(&mut self, position: Point3<f32>) {
        self.position = position;
    }

    pub fn translate(&mut self, delta: Vector3<f32>) {
        self.position += delta;
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        self.yaw = yaw;
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch;
    }

    /// Unit vector the observer is looking along. Yaw zero faces -Z.
    pub fn forward(&self) -> Vector3<f32> {
        Vector3::new(
            -self.yaw.sin() * self.pitch.cos(),
            self.pitch.sin(),
            -self.yaw.cos() * self.pitch.cos(),
        )
    }

    /// View transform: yaw about the world Y axis, pitch about the yawed X
    /// axis, then translation.
    pub fn view_matrix(&self) -> Matrix4<f32> {
        let yaw_rotation = Matrix4::from_angle_y(Rad(-self.yaw));
        let x_axis = yaw_rotation.transpose() * Vector4::new(1.0, 0.0, 0.0, 1.0);
        let view = yaw_rotation
            * Matrix4::from_axis_angle(
                Vector3::new(x_axis.x, x_axis.y, x_axis.z).normalize(),
                Rad(-self.pitch),
            );
        view * Matrix4::from_translation(-self.position.to_vec())
    }

    /// Grid coordinates of the chunk the observer currently stands in.
    /// Each cell `(gx, gz)` covers world x in `[gx*N - N/2, gx*N + N/2)`.
    pub fn grid_coords(&self, chunk_edge: i32) -> (i64, i64) {
        let n = chunk_edge as f32;
        (
            (self.position.x / n + 0.5).floor() as i64,
            (self.position.z / n + 0.5).floor() as i64,
        )
    }

    /// Resolves the observer's node in `graph`, creating it if needed.
    pub fn current_node(&self, graph: &Arc<ChunkGraph>) -> Arc<ChunkNode> {
        let (gx, gz) = self.grid_coords(graph.chunk_edge());
        graph.get_or_create(gx, gz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_coords_map_cell_extents_correctly() {
        let mut observer = Observer::new(Point3::new(0.0, 0.0, 0.0));
        assert_eq!(observer.grid_coords(16), (0, 0));

        // The cell for gx = 0 spans [-8, 8).
        observer.set_position(Point3::new(7.9, 0.0, -8.0));
        assert_eq!(observer.grid_coords(16), (0, 0));

        observer.set_position(Point3::new(8.0, 0.0, 0.0));
        assert_eq!(observer.grid_coords(16), (1, 0));

        observer.set_position(Point3::new(-8.1, 0.0, 24.0));
        assert_eq!(observer.grid_coords(16), (-1, 2));
    }

    #[test]
    fn forward_faces_negative_z_at_rest() {
        let observer = Observer::new(Point3::new(0.0, 0.0, 0.0));
        let forward = observer.forward();
        assert!((forward.x).abs() < 1e-6);
        assert!((forward.y).abs() < 1e-6);
        assert!((forward.z + 1.0).abs() < 1e-6);
    }

    #[test]
    fn view_matrix_translates_the_eye_to_the_origin() {
        let observer = Observer::new(Point3::new(3.0, 4.0, 5.0));
        let eye = observer.view_matrix() * Vector4::new(3.0, 4.0, 5.0, 1.0);
        assert!(eye.x.abs() < 1e-5 && eye.y.abs() < 1e-5 && eye.z.abs() < 1e-5);
    }
}
