use gl::types::*;
use gl_bindings as gl;

use crate::core::math::{Vec2, Vec3, Vec4};
use crate::rendering::{
    buffer::{Buffer, BufferStorageFlags, BufferTarget},
    Draw,
};
use std::{mem, ptr};

lazy_static! {
    pub static ref FULLSCREEN_MESH: FullscreenMesh = FullscreenMesh::new();
}

#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub tangent: Vec4,
    pub tex_coord: Vec2,
    pub color: Vec4,
}

impl Vertex {
    pub fn from_position(position: Vec3, normal: Vec3) -> Self {
        Self {
            position,
            normal,
            tangent: Vec4::new(1.0, 0.0, 0.0, 1.0),
            tex_coord: Vec2::new(0.0, 0.0),
            color: Vec4::new(1.0, 1.0, 1.0, 1.0),
        }
    }
}

/// CPU side indexed geometry. Builders produce this; uploading it to the
/// GPU is a separate step so the builders stay testable without a context.
#[derive(Debug, Default)]
pub struct Geometry {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    /// Optional line-list indices over the same vertices.
    pub wireframe_indices: Vec<u32>,
}

pub struct Mesh {
    vao: GLuint,
    index_count: i32,
    wireframe_index_count: i32,
    _vbo: Buffer,
    ibo: Buffer,
    wire_ibo: Option<Buffer>,
}

impl Mesh {
    pub fn from_geometry(geometry: &Geometry) -> Mesh {
        let vbo = Buffer::new_from_slice(
            "Vertex Buffer",
            &geometry.vertices,
            BufferTarget::Array,
            BufferStorageFlags::NONE,
        );

        let ibo = Buffer::new_from_slice(
            "Index Buffer",
            &geometry.indices,
            BufferTarget::ElementArray,
            BufferStorageFlags::NONE,
        );

        let wire_ibo = if geometry.wireframe_indices.is_empty() {
            None
        } else {
            Some(Buffer::new_from_slice(
                "Wireframe Index Buffer",
                &geometry.wireframe_indices,
                BufferTarget::ElementArray,
                BufferStorageFlags::NONE,
            ))
        };

        let mut vao: GLuint = 0;
        unsafe {
            gl::CreateVertexArrays(1, &mut vao);

            gl::VertexArrayVertexBuffer(vao, 0, vbo.get_id(), 0, mem::size_of::<Vertex>() as i32);
            gl::VertexArrayElementBuffer(vao, ibo.get_id());

            gl::EnableVertexArrayAttrib(vao, 0); //positions
            gl::EnableVertexArrayAttrib(vao, 1); //normals
            gl::EnableVertexArrayAttrib(vao, 2); //tangents
            gl::EnableVertexArrayAttrib(vao, 3); //texture coordinates
            gl::EnableVertexArrayAttrib(vao, 4); //colors

            gl::VertexArrayAttribFormat(
                vao,
                0,
                3,
                gl::FLOAT,
                gl::FALSE,
                offset_of!(Vertex, position) as u32,
            );

            gl::VertexArrayAttribFormat(
                vao,
                1,
                3,
                gl::FLOAT,
                gl::FALSE,
                offset_of!(Vertex, normal) as u32,
            );

            gl::VertexArrayAttribFormat(
                vao,
                2,
                4,
                gl::FLOAT,
                gl::FALSE,
                offset_of!(Vertex, tangent) as u32,
            );

            gl::VertexArrayAttribFormat(
                vao,
                3,
                2,
                gl::FLOAT,
                gl::FALSE,
                offset_of!(Vertex, tex_coord) as u32,
            );

            gl::VertexArrayAttribFormat(
                vao,
                4,
                4,
                gl::FLOAT,
                gl::FALSE,
                offset_of!(Vertex, color) as u32,
            );

            // One interleaved VBO, so every attribute reads binding 0.
            for attribute in 0..5 {
                gl::VertexArrayAttribBinding(vao, attribute, 0);
            }
        }

        Mesh {
            vao,
            index_count: geometry.indices.len() as i32,
            wireframe_index_count: geometry.wireframe_indices.len() as i32,
            _vbo: vbo,
            ibo,
            wire_ibo,
        }
    }

    pub fn draw_wireframe(&self) {
        let wire_ibo = match self.wire_ibo.as_ref() {
            Some(buffer) => buffer,
            None => return,
        };

        unsafe {
            gl::BindVertexArray(self.vao);
            gl::VertexArrayElementBuffer(self.vao, wire_ibo.get_id());
            gl::DrawElements(
                gl::LINES,
                self.wireframe_index_count,
                gl::UNSIGNED_INT,
                ptr::null(),
            );
            gl::VertexArrayElementBuffer(self.vao, self.ibo.get_id());
            gl::BindVertexArray(0);
        }
    }
}

impl Draw for Mesh {
    fn draw(&self) {
        unsafe {
            gl::BindVertexArray(self.vao);

            gl::DrawElements(
                gl::TRIANGLES,
                self.index_count,
                gl::UNSIGNED_INT,
                ptr::null(),
            );

            gl::BindVertexArray(0);
        }
    }
}

impl Drop for Mesh {
    fn drop(&mut self) {
        unsafe { gl::DeleteVertexArrays(1, &self.vao) }
    }
}

/// An empty VAO; the vertex shader derives a fullscreen triangle from
/// `gl_VertexID`.
pub struct FullscreenMesh {
    vao: GLuint,
}

impl FullscreenMesh {
    pub fn new() -> Self {
        let mut vao: GLuint = 0;

        unsafe { gl::CreateVertexArrays(1, &mut vao) }

        FullscreenMesh { vao }
    }
}

impl Default for FullscreenMesh {
    fn default() -> Self {
        Self::new()
    }
}

impl Draw for FullscreenMesh {
    fn draw(&self) {
        unsafe {
            gl::BindVertexArray(self.vao);
            gl::DrawArrays(gl::TRIANGLES, 0, 3);
            gl::BindVertexArray(0);
        }
    }
}
