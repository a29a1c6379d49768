//! Per-particle primitive geometry.
//!
//! One [`MeshTemplate`] is built at renderer initialization and drawn once
//! per particle through instancing. Its static index metadata seeds the
//! renderer's [`DrawArguments`].

use std::f32::consts::{PI, TAU};

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::renderer::DrawArguments;
use crate::visuals::DisplayMode;

/// Vertex layout shared by all templates (32 bytes).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Indexed triangle list with its sub-mesh offsets.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshTemplate {
    pub name: &'static str,
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
    /// First index of the drawn range.
    pub index_start: u32,
    /// Value added to every index before fetching a vertex.
    pub base_vertex: i32,
}

impl MeshTemplate {
    /// Unit quad in the XY plane, facing +Z.
    pub fn quad() -> Self {
        let corner = |x: f32, y: f32, u: f32, v: f32| MeshVertex {
            position: [x, y, 0.0],
            normal: [0.0, 0.0, 1.0],
            uv: [u, v],
        };
        Self {
            name: "billboard quad",
            vertices: vec![
                corner(-0.5, -0.5, 0.0, 0.0),
                corner(0.5, -0.5, 1.0, 0.0),
                corner(-0.5, 0.5, 0.0, 1.0),
                corner(0.5, 0.5, 1.0, 1.0),
            ],
            indices: vec![0, 2, 1, 2, 3, 1],
            index_start: 0,
            base_vertex: 0,
        }
    }

    /// UV sphere of diameter 1 with `resolution` stacks and twice as many slices.
    pub fn sphere(resolution: u32) -> Self {
        let stacks = resolution.max(2);
        let slices = stacks * 2;

        let mut vertices = Vec::with_capacity(((stacks + 1) * (slices + 1)) as usize);
        for i in 0..=stacks {
            let v = i as f32 / stacks as f32;
            let phi = v * PI;
            for j in 0..=slices {
                let u = j as f32 / slices as f32;
                let theta = u * TAU;
                let n = Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
                vertices.push(MeshVertex {
                    position: (n * 0.5).to_array(),
                    normal: n.to_array(),
                    uv: [u, v],
                });
            }
        }

        let row = slices + 1;
        let mut indices = Vec::with_capacity((stacks * slices * 6) as usize);
        for i in 0..stacks {
            for j in 0..slices {
                let a = i * row + j;
                let b = a + row;
                indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
            }
        }

        Self {
            name: "sphere",
            vertices,
            indices,
            index_start: 0,
            base_vertex: 0,
        }
    }

    /// Template for a display mode.
    pub fn for_mode(mode: DisplayMode, mesh_resolution: u32) -> Self {
        match mode {
            DisplayMode::Billboard => Self::quad(),
            DisplayMode::Mesh3D => Self::sphere(mesh_resolution),
        }
    }

    #[inline]
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Indirect draw record for this mesh with an instance count of zero.
    pub fn draw_arguments(&self) -> DrawArguments {
        DrawArguments {
            index_count: self.index_count().saturating_sub(self.index_start),
            instance_count: 0,
            first_index: self.index_start,
            base_vertex: self.base_vertex,
            first_instance: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quad_layout() {
        let quad = MeshTemplate::quad();
        assert_eq!(quad.vertices.len(), 4);
        assert_eq!(quad.indices, vec![0, 2, 1, 2, 3, 1]);
        assert_eq!(std::mem::size_of::<MeshVertex>(), 32);
    }

    #[test]
    fn test_quad_draw_arguments() {
        let args = MeshTemplate::quad().draw_arguments();
        assert_eq!(args.index_count, 6);
        assert_eq!(args.instance_count, 0);
        assert_eq!(args.first_index, 0);
        assert_eq!(args.base_vertex, 0);
        assert_eq!(args.first_instance, 0);
    }

    #[test]
    fn test_index_start_past_end_draws_nothing() {
        let mut quad = MeshTemplate::quad();
        quad.index_start = 10;
        let args = quad.draw_arguments();
        assert_eq!(args.index_count, 0);
        assert_eq!(args.first_index, 10);
    }

    #[test]
    fn test_sphere_counts_and_radius() {
        let sphere = MeshTemplate::sphere(4);
        assert_eq!(sphere.vertices.len(), 5 * 9);
        assert_eq!(sphere.index_count(), 4 * 8 * 6);
        assert!(sphere.indices.iter().all(|&i| (i as usize) < sphere.vertices.len()));
        for v in &sphere.vertices {
            assert!((Vec3::from(v.position).length() - 0.5).abs() < 1e-5);
        }
    }

    #[test]
    fn test_sphere_minimum_resolution() {
        assert_eq!(MeshTemplate::sphere(0), MeshTemplate::sphere(2));
    }
}
