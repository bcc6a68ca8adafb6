use gl::types::*;
use gl_bindings as gl;

use crate::core::math::{utilities, Mat4, Vec3, Vec4};
use crate::rendering::sampler::Sampler;
use crate::rendering::texture::{Texture2D, TextureCube};
use std::ffi::CString;
use std::ptr;

#[repr(u32)]
#[derive(Debug, Clone, Copy)]
pub enum ShaderStage {
    Vertex = gl::VERTEX_SHADER,
    Fragment = gl::FRAGMENT_SHADER,
}

pub struct Shader {
    id: GLuint,
    stage: ShaderStage,
}

impl Shader {
    /// Compiles a GLSL source string. The name only labels error messages.
    pub fn new_from_source(stage: ShaderStage, name: &str, source: &str) -> Result<Shader, String> {
        let id;

        unsafe {
            id = gl::CreateShader(stage as u32);

            let source = CString::new(source).map_err(|e| e.to_string())?;
            gl::ShaderSource(id, 1, &source.as_ptr(), ptr::null());
            gl::CompileShader(id);

            let mut compilation_status: GLint = 0;
            gl::GetShaderiv(id, gl::COMPILE_STATUS, &mut compilation_status);

            if compilation_status != gl::TRUE as i32 {
                let log = read_info_log(id, gl::GetShaderiv, gl::GetShaderInfoLog);
                gl::DeleteShader(id);
                return Err(format!("Failed to compile shader '{}': {}", name, log));
            }
        }

        Ok(Shader { id, stage })
    }

    pub fn get_id(&self) -> GLuint {
        self.id
    }

    pub fn get_stage(&self) -> ShaderStage {
        self.stage
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        unsafe { gl::DeleteShader(self.id) }
    }
}

pub struct ShaderProgram {
    id: GLuint,
}

impl ShaderProgram {
    pub fn new(name: &str, shaders: &[&Shader]) -> Result<ShaderProgram, String> {
        let id;

        unsafe {
            id = gl::CreateProgram();

            for shader in shaders {
                gl::AttachShader(id, shader.get_id());
            }

            gl::LinkProgram(id);

            let mut link_status: GLint = 0;
            gl::GetProgramiv(id, gl::LINK_STATUS, &mut link_status);

            if link_status != gl::TRUE as i32 {
                let log = read_info_log(id, gl::GetProgramiv, gl::GetProgramInfoLog);
                gl::DeleteProgram(id);
                return Err(format!("Failed to link program '{}': {}", name, log));
            }

            for shader in shaders {
                gl::DetachShader(id, shader.get_id());
            }
        }

        Ok(ShaderProgram { id })
    }

    /// Compiles and links a vertex/fragment source pair.
    pub fn from_sources(
        name: &str,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<ShaderProgram, String> {
        let vertex = Shader::new_from_source(ShaderStage::Vertex, name, vertex_source)?;
        let fragment = Shader::new_from_source(ShaderStage::Fragment, name, fragment_source)?;
        Self::new(name, &[&vertex, &fragment])
    }

    pub fn bind(&self) {
        unsafe { gl::UseProgram(self.id) }
    }

    pub fn unbind(&self) {
        unsafe { gl::UseProgram(0) }
    }

    pub fn set_mat4(&self, name: &str, value: &Mat4) {
        if let Some(location) = self.uniform_location(name) {
            unsafe {
                gl::ProgramUniformMatrix4fv(
                    self.id,
                    location,
                    1,
                    gl::FALSE,
                    utilities::mat4_value_ptr(value),
                )
            }
        }
    }

    pub fn set_vec3(&self, name: &str, value: &Vec3) {
        if let Some(location) = self.uniform_location(name) {
            unsafe { gl::ProgramUniform3fv(self.id, location, 1, value.as_ptr()) }
        }
    }

    pub fn set_vec4(&self, name: &str, value: &Vec4) {
        if let Some(location) = self.uniform_location(name) {
            unsafe { gl::ProgramUniform4fv(self.id, location, 1, utilities::value_ptr(value)) }
        }
    }

    pub fn set_vec3_array(&self, name: &str, values: &[Vec3]) {
        if let Some(location) = self.uniform_location(name) {
            unsafe {
                gl::ProgramUniform3fv(
                    self.id,
                    location,
                    values.len() as i32,
                    values.as_ptr() as *const f32,
                )
            }
        }
    }

    pub fn set_float(&self, name: &str, value: f32) {
        if let Some(location) = self.uniform_location(name) {
            unsafe { gl::ProgramUniform1f(self.id, location, value) }
        }
    }

    pub fn set_int(&self, name: &str, value: i32) {
        if let Some(location) = self.uniform_location(name) {
            unsafe { gl::ProgramUniform1i(self.id, location, value) }
        }
    }

    pub fn bind_texture_2d(&self, unit: u32, texture: &Texture2D, sampler: &Sampler) {
        unsafe {
            gl::BindTextureUnit(unit, texture.get_id());
            gl::BindSampler(unit, sampler.id);
        }
    }

    pub fn bind_texture_cube(&self, unit: u32, texture: &TextureCube, sampler: &Sampler) {
        unsafe {
            gl::BindTextureUnit(unit, texture.get_id());
            gl::BindSampler(unit, sampler.id);
        }
    }

    fn uniform_location(&self, name: &str) -> Option<GLint> {
        let name = CString::new(name).ok()?;
        let location = unsafe { gl::GetUniformLocation(self.id, name.as_ptr()) };
        if location < 0 {
            None
        } else {
            Some(location)
        }
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        unsafe { gl::DeleteProgram(self.id) }
    }
}

fn read_info_log(
    id: GLuint,
    get_iv: unsafe fn(GLuint, GLenum, *mut GLint),
    get_log: unsafe fn(GLuint, GLsizei, *mut GLsizei, *mut GLchar),
) -> String {
    let mut message_size: GLint = 0;
    unsafe { get_iv(id, gl::INFO_LOG_LENGTH, &mut message_size) };

    let mut buffer = vec![0u8; message_size.max(1) as usize];
    unsafe {
        get_log(
            id,
            message_size,
            ptr::null_mut(),
            buffer.as_mut_ptr() as *mut GLchar,
        )
    };

    String::from_utf8_lossy(&buffer)
        .trim_end_matches('\0')
        .trim_end()
        .to_string()
}
