pub mod buffer;
pub mod mesh;
pub mod primitives;
pub mod renderer;
pub mod sampler;
pub mod shader;
pub mod texture;

use crate::core::math::Vec4;
use crate::core::Rectangle;
use gl_bindings as gl;

pub trait Draw {
    fn draw(&self);
}

pub fn clear_framebuffer(color: &Vec4) {
    unsafe {
        gl::Disable(gl::SCISSOR_TEST);
        gl::ClearColor(color.x, color.y, color.z, color.w);
        gl::Clear(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT);
    }
}

/// Restricts rendering to one view's rectangle.
pub fn set_viewport(rect: Rectangle) {
    unsafe {
        gl::Viewport(rect.x, rect.y, rect.width, rect.height);
        gl::Enable(gl::SCISSOR_TEST);
        gl::Scissor(rect.x, rect.y, rect.width, rect.height);
    }
}

/// Reads the bound framebuffer back as an RGBA image, flipped to the
/// top-left origin the image crate expects.
pub fn capture_framebuffer(width: u32, height: u32) -> image::RgbaImage {
    let mut pixels = vec![0u8; (width * height * 4) as usize];

    unsafe {
        gl::PixelStorei(gl::PACK_ALIGNMENT, 1);
        gl::ReadPixels(
            0,
            0,
            width as i32,
            height as i32,
            gl::RGBA,
            gl::UNSIGNED_BYTE,
            pixels.as_mut_ptr() as *mut gl::types::GLvoid,
        );
    }

    let row = (width * 4) as usize;
    let mut flipped = vec![0u8; pixels.len()];
    for y in 0..height as usize {
        let src = &pixels[y * row..(y + 1) * row];
        let dst_y = height as usize - 1 - y;
        flipped[dst_y * row..(dst_y + 1) * row].copy_from_slice(src);
    }

    image::RgbaImage::from_raw(width, height, flipped).expect("framebuffer readback size")
}
