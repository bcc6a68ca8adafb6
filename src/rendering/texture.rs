use image::{ColorType, DynamicImage, GenericImageView};

use gli::GliTexture;
use gli_rs as gli;

use crate::viewer::asset::Asset;
use gl::types::*;
use gl_bindings as gl;
use log::debug;
use std::path::Path;

#[repr(u32)]
#[derive(Debug, Clone, Copy)]
pub enum SizedTextureFormat {
    R8 = gl::R8,
    Rg8 = gl::RG8,
    Rgb8 = gl::RGB8,
    Srgb8 = gl::SRGB8,
    Rgba8 = gl::RGBA8,
    Srgb8A8 = gl::SRGB8_ALPHA8,
    Rgb16f = gl::RGB16F,
    Rgba16f = gl::RGBA16F,
    Rgb32f = gl::RGB32F,
    Rgba32f = gl::RGBA32F,
}

#[repr(u32)]
#[derive(Debug, Clone, Copy)]
pub enum TextureFormat {
    Red = gl::RED,
    Rg = gl::RG,
    Rgb = gl::RGB,
    Rgba = gl::RGBA,
}

fn color_type_to_texture_formats(
    color_type: ColorType,
    is_srgb: bool,
) -> Result<(SizedTextureFormat, TextureFormat), String> {
    match color_type {
        ColorType::L8 => Ok((SizedTextureFormat::R8, TextureFormat::Red)),
        ColorType::La8 => Ok((SizedTextureFormat::Rg8, TextureFormat::Rg)),
        ColorType::Rgb8 => {
            if is_srgb {
                Ok((SizedTextureFormat::Srgb8, TextureFormat::Rgb))
            } else {
                Ok((SizedTextureFormat::Rgb8, TextureFormat::Rgb))
            }
        }
        ColorType::Rgba8 => {
            if is_srgb {
                Ok((SizedTextureFormat::Srgb8A8, TextureFormat::Rgba))
            } else {
                Ok((SizedTextureFormat::Rgba8, TextureFormat::Rgba))
            }
        }
        _ => Err(String::from("Unsupported texture format.")),
    }
}

pub struct Texture2D {
    id: GLuint,
    width: u32,
    height: u32,
}

pub struct Texture2DLoadConfig {
    pub is_srgb: bool,
    pub generate_mipmaps: bool,
}

impl Asset for Texture2D {
    type Output = Self;
    type Error = String;
    type LoadConfig = Texture2DLoadConfig;

    fn load<P: AsRef<Path>>(
        path: P,
        load_config: Option<Self::LoadConfig>,
    ) -> Result<Self::Output, Self::Error> {
        let (is_srgb, generate_mipmaps) = load_config
            .map(|config| (config.is_srgb, config.generate_mipmaps))
            .unwrap_or((false, false));

        let img = image::open(path.as_ref()).map_err(|e| e.to_string())?;
        Self::new_from_image(&img, generate_mipmaps, is_srgb)
    }
}

impl Texture2D {
    pub fn new_from_image(
        image: &DynamicImage,
        generate_mipmaps: bool,
        is_srgb: bool,
    ) -> Result<Self, String> {
        let (width, height) = image.dimensions();
        let formats = color_type_to_texture_formats(image.color(), is_srgb)?;

        Self::new_from_pixels(
            width,
            height,
            formats.0,
            formats.1,
            generate_mipmaps,
            &image.to_bytes(),
        )
    }

    /// Uploads already decoded pixels (glTF images, font atlases).
    pub fn new_from_pixels(
        width: u32,
        height: u32,
        internal_format: SizedTextureFormat,
        format: TextureFormat,
        generate_mipmaps: bool,
        pixels: &[u8],
    ) -> Result<Self, String> {
        if width == 0 || height == 0 {
            return Err(String::from("Cannot create an empty texture."));
        }

        let mip_levels = if generate_mipmaps {
            (f32::floor(f32::log2(width.max(height) as f32)) + 1.0) as i32
        } else {
            1
        };

        let mut id: GLuint = 0;
        unsafe {
            gl::CreateTextures(gl::TEXTURE_2D, 1, &mut id);

            gl::TextureStorage2D(
                id,
                mip_levels,
                internal_format as u32,
                width as i32,
                height as i32,
            );

            gl::PixelStorei(gl::UNPACK_ALIGNMENT, 1);
            gl::TextureSubImage2D(
                id,
                0,
                0,
                0,
                width as i32,
                height as i32,
                format as u32,
                gl::UNSIGNED_BYTE,
                pixels.as_ptr() as *const GLvoid,
            );

            if generate_mipmaps {
                gl::GenerateTextureMipmap(id)
            }
        }

        Ok(Self { id, width, height })
    }

    /// A 1x1 texture of the given color, the fallback for untextured
    /// materials.
    pub fn new_solid_color(r: u8, g: u8, b: u8, a: u8) -> Result<Self, String> {
        Self::new_from_pixels(
            1,
            1,
            SizedTextureFormat::Rgba8,
            TextureFormat::Rgba,
            false,
            &[r, g, b, a],
        )
    }

    pub fn get_id(&self) -> GLuint {
        self.id
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Drop for Texture2D {
    fn drop(&mut self) {
        unsafe { gl::DeleteTextures(1, &self.id) }
    }
}

pub struct TextureCube {
    id: GLuint,
}

impl Asset for TextureCube {
    type Output = Self;
    type Error = String;
    type LoadConfig = ();

    fn load<P: AsRef<Path>>(
        path: P,
        _: Option<Self::LoadConfig>,
    ) -> Result<Self::Output, Self::Error> {
        let result: gli::Result<gli::TextureCube> = gli::load(path.as_ref());
        let tex = result.map_err(|e| e.to_string())?;

        debug!(
            "Loaded cubemap {}: {}x{}, {} faces, {} levels, format {}",
            path.as_ref().display(),
            tex.extent(0).width,
            tex.extent(0).height,
            tex.faces(),
            tex.levels(),
            tex.format()
        );

        let (internal_format, external_format, data_type) =
            Self::translate_gli_format_info(tex.format());

        let mut id: GLuint = 0;
        unsafe {
            gl::CreateTextures(gl::TEXTURE_CUBE_MAP, 1, &mut id);

            gl::TextureStorage2D(
                id,
                tex.levels() as i32,
                internal_format as u32,
                tex.extent(0).width as i32,
                tex.extent(0).height as i32,
            );

            for _ in 0..tex.layers() {
                for face in 0..tex.faces() {
                    let face_tex = tex.get_face(face);

                    for level in 0..tex.levels() {
                        let image = face_tex.get_level(level);

                        // Cubemaps + DSA = TextureSubImage3D using zOffset as the face index
                        gl::TextureSubImage3D(
                            id,
                            level as i32,
                            0,
                            0,
                            face as i32,
                            image.extent().width as i32,
                            image.extent().height as i32,
                            1,
                            external_format as u32,
                            data_type,
                            image.data(),
                        );
                    }
                }
            }
        }

        Ok(TextureCube { id })
    }
}

impl TextureCube {
    /// A 1x1 cubemap of one color, the fallback environment when no IBL
    /// is loaded.
    pub fn new_solid_color(r: u8, g: u8, b: u8) -> Result<Self, String> {
        let mut id: GLuint = 0;
        let pixel = [r, g, b];

        unsafe {
            gl::CreateTextures(gl::TEXTURE_CUBE_MAP, 1, &mut id);
            gl::TextureStorage2D(id, 1, SizedTextureFormat::Rgb8 as u32, 1, 1);
            gl::PixelStorei(gl::UNPACK_ALIGNMENT, 1);

            for face in 0..6 {
                gl::TextureSubImage3D(
                    id,
                    0,
                    0,
                    0,
                    face,
                    1,
                    1,
                    1,
                    TextureFormat::Rgb as u32,
                    gl::UNSIGNED_BYTE,
                    pixel.as_ptr() as *const GLvoid,
                );
            }
        }

        Ok(TextureCube { id })
    }

    pub fn get_id(&self) -> GLuint {
        self.id
    }

    fn translate_gli_format_info(
        format: gli::Format,
    ) -> (SizedTextureFormat, TextureFormat, GLenum) {
        match format {
            gli::Format::RGB16_SFLOAT_PACK16 => (
                SizedTextureFormat::Rgb16f,
                TextureFormat::Rgb,
                gl::HALF_FLOAT,
            ),
            gli::Format::RGBA16_SFLOAT_PACK16 => (
                SizedTextureFormat::Rgba16f,
                TextureFormat::Rgba,
                gl::HALF_FLOAT,
            ),
            gli::Format::RGB8_UNORM_PACK8 => (
                SizedTextureFormat::Rgb8,
                TextureFormat::Rgb,
                gl::UNSIGNED_BYTE,
            ),
            gli::Format::RGBA8_UNORM_PACK8 => (
                SizedTextureFormat::Rgba8,
                TextureFormat::Rgba,
                gl::UNSIGNED_BYTE,
            ),
            gli::Format::RGBA32_SFLOAT_PACK32 => {
                (SizedTextureFormat::Rgba32f, TextureFormat::Rgba, gl::FLOAT)
            }
            gli::Format::RGB32_SFLOAT_PACK32 => {
                (SizedTextureFormat::Rgb32f, TextureFormat::Rgb, gl::FLOAT)
            }
            _ => (
                SizedTextureFormat::Rgba8,
                TextureFormat::Rgba,
                gl::UNSIGNED_BYTE,
            ),
        }
    }
}

impl Drop for TextureCube {
    fn drop(&mut self) {
        unsafe { gl::DeleteTextures(1, &self.id) }
    }
}
