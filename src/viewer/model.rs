use crate::core::math::{Aabb, Mat4, Vec2, Vec3, Vec4};
use crate::rendering::mesh::{Geometry, Mesh, Vertex};
use crate::rendering::texture::{SizedTextureFormat, Texture2D, TextureFormat};
use crate::viewer::Error;
use itertools::izip;
use log::{info, warn};
use std::path::Path;

pub struct Primitive {
    pub mesh: Mesh,
    pub transform: Mat4,
    pub base_color: Vec4,
    pub base_color_texture: Option<Texture2D>,
}

/// A loaded glTF scene, flattened into world-space primitives.
pub struct Model {
    pub name: String,
    pub primitives: Vec<Primitive>,
    pub aabb: Aabb,
    /// Centers the scene on the origin inside a unit cube, identity when
    /// the actual size was requested.
    pub root_transform: Mat4,
}

impl Model {
    pub fn load(path: &Path, actual_size: bool) -> Result<Model, Error> {
        let (document, buffers, images) =
            gltf::import(path).map_err(|source| Error::Gltf {
                path: path.to_path_buf(),
                source,
            })?;

        let scene = document
            .default_scene()
            .or_else(|| document.scenes().next())
            .ok_or_else(|| Error::Parse {
                path: path.to_path_buf(),
                reason: String::from("the document contains no scenes"),
            })?;

        let mut primitives = Vec::new();
        let mut aabb = Aabb::default();

        for node in scene.nodes() {
            flatten_node(&node, &Mat4::identity(), &buffers, &images, &mut primitives, &mut aabb);
        }

        if primitives.is_empty() {
            return Err(Error::Parse {
                path: path.to_path_buf(),
                reason: String::from("the scene contains no mesh primitives"),
            });
        }

        let root_transform = if actual_size || aabb.is_empty() {
            Mat4::identity()
        } else {
            fit_into_unit_cube(&aabb)
        };

        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| String::from("model"));

        info!(
            "Loaded {}: {} primitives, bounds {:?} .. {:?}",
            name, primitives.len(), aabb.min, aabb.max
        );

        Ok(Model {
            name,
            primitives,
            aabb,
            root_transform,
        })
    }
}

fn flatten_node(
    node: &gltf::Node,
    parent_transform: &Mat4,
    buffers: &[gltf::buffer::Data],
    images: &[gltf::image::Data],
    primitives: &mut Vec<Primitive>,
    aabb: &mut Aabb,
) {
    let local = node_transform(node);
    let world = parent_transform * local;

    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            match load_primitive(&primitive, &world, buffers, images) {
                Ok(loaded) => {
                    let bounds = primitive.bounding_box();
                    let local_aabb = Aabb::new(
                        Vec3::new(bounds.min[0], bounds.min[1], bounds.min[2]),
                        Vec3::new(bounds.max[0], bounds.max[1], bounds.max[2]),
                    );
                    aabb.merge(&local_aabb.transform(&world));
                    primitives.push(loaded);
                }
                Err(reason) => warn!(
                    "Skipping a primitive of mesh '{}': {}",
                    mesh.name().unwrap_or("unnamed"),
                    reason
                ),
            }
        }
    }

    for child in node.children() {
        flatten_node(&child, &world, buffers, images, primitives, aabb);
    }
}

fn node_transform(node: &gltf::Node) -> Mat4 {
    let columns = node.transform().matrix();
    Mat4::from_column_slice(&columns.concat())
}

fn load_primitive(
    primitive: &gltf::Primitive,
    world: &Mat4,
    buffers: &[gltf::buffer::Data],
    images: &[gltf::image::Data],
) -> Result<Primitive, String> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| &data.0[..]));

    let positions: Vec<[f32; 3]> = reader
        .read_positions()
        .ok_or_else(|| String::from("missing positions"))?
        .collect();
    let normals: Option<Vec<[f32; 3]>> = reader.read_normals().map(|iter| iter.collect());
    let tangents: Option<Vec<[f32; 4]>> = reader.read_tangents().map(|iter| iter.collect());
    let tex_coords: Option<Vec<[f32; 2]>> = reader
        .read_tex_coords(0)
        .map(|iter| iter.into_f32().collect());
    let colors: Option<Vec<[f32; 4]>> = reader
        .read_colors(0)
        .map(|iter| iter.into_rgba_f32().collect());

    let vertices = interleave_streams(&positions, normals, tangents, tex_coords, colors);

    let indices: Vec<u32> = reader
        .read_indices()
        .map(|iter| iter.into_u32().collect())
        .unwrap_or_else(|| (0..vertices.len() as u32).collect());

    let material = primitive.material().pbr_metallic_roughness();
    let base_color = Vec4::from(material.base_color_factor());

    let base_color_texture = material.base_color_texture().and_then(|info| {
        let image = images.get(info.texture().source().index())?;
        match upload_gltf_image(image) {
            Ok(texture) => Some(texture),
            Err(reason) => {
                warn!("Ignoring a base color texture: {}", reason);
                None
            }
        }
    });

    let geometry = Geometry {
        vertices,
        indices,
        wireframe_indices: Vec::new(),
    };

    Ok(Primitive {
        mesh: Mesh::from_geometry(&geometry),
        transform: *world,
        base_color,
        base_color_texture,
    })
}

/// Interleaves the attribute streams the importer hands back. Missing
/// streams fall back to defaults; the shortest present stream bounds the
/// output.
pub(crate) fn interleave_streams(
    positions: &[[f32; 3]],
    normals: Option<Vec<[f32; 3]>>,
    tangents: Option<Vec<[f32; 4]>>,
    tex_coords: Option<Vec<[f32; 2]>>,
    colors: Option<Vec<[f32; 4]>>,
) -> Vec<Vertex> {
    let count = positions.len();

    let normals = normals.unwrap_or_else(|| vec![[0.0, 1.0, 0.0]; count]);
    let tangents = tangents.unwrap_or_else(|| vec![[1.0, 0.0, 0.0, 1.0]; count]);
    let tex_coords = tex_coords.unwrap_or_else(|| vec![[0.0, 0.0]; count]);
    let colors = colors.unwrap_or_else(|| vec![[1.0, 1.0, 1.0, 1.0]; count]);

    izip!(positions, &normals, &tangents, &tex_coords, &colors)
        .map(|(p, n, t, uv, c)| Vertex {
            position: Vec3::new(p[0], p[1], p[2]),
            normal: Vec3::new(n[0], n[1], n[2]),
            tangent: Vec4::new(t[0], t[1], t[2], t[3]),
            tex_coord: Vec2::new(uv[0], uv[1]),
            color: Vec4::new(c[0], c[1], c[2], c[3]),
        })
        .collect()
}

fn upload_gltf_image(image: &gltf::image::Data) -> Result<Texture2D, String> {
    use gltf::image::Format;

    // Base color inputs are sRGB encoded.
    let (internal_format, format) = match image.format {
        Format::R8 => (SizedTextureFormat::R8, TextureFormat::Red),
        Format::R8G8 => (SizedTextureFormat::Rg8, TextureFormat::Rg),
        Format::R8G8B8 => (SizedTextureFormat::Srgb8, TextureFormat::Rgb),
        Format::R8G8B8A8 => (SizedTextureFormat::Srgb8A8, TextureFormat::Rgba),
        other => return Err(format!("unsupported image format {:?}", other)),
    };

    Texture2D::new_from_pixels(
        image.width,
        image.height,
        internal_format,
        format,
        true,
        &image.pixels,
    )
}

/// The transform that centers a bounding box on the origin and uniformly
/// scales it into the [-1, 1] cube.
pub fn fit_into_unit_cube(aabb: &Aabb) -> Mat4 {
    let half_extent = aabb.half_extent();
    let max_extent = half_extent.x.max(half_extent.y).max(half_extent.z);
    let scale = if max_extent > 0.0 { 1.0 / max_extent } else { 1.0 };

    let center = aabb.center();
    crate::core::math::scale(&Mat4::identity(), &Vec3::new(scale, scale, scale))
        * crate::core::math::translate(&Mat4::identity(), &-center)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_into_unit_cube_centers_and_scales() {
        let aabb = Aabb::new(Vec3::new(2.0, 0.0, -1.0), Vec3::new(6.0, 2.0, 1.0));
        let transform = fit_into_unit_cube(&aabb);

        let center = transform * Vec4::new(4.0, 1.0, 0.0, 1.0);
        assert!(center.xyz().norm() < 1e-5);

        // The widest axis spans exactly [-1, 1] after the transform.
        let min = transform * Vec4::new(2.0, 0.0, -1.0, 1.0);
        let max = transform * Vec4::new(6.0, 2.0, 1.0, 1.0);
        assert!((min.x + 1.0).abs() < 1e-5);
        assert!((max.x - 1.0).abs() < 1e-5);
        // Narrower axes stay inside the cube.
        assert!(max.y.abs() <= 1.0 + 1e-5);
        assert!(max.z.abs() <= 1.0 + 1e-5);
    }

    #[test]
    fn degenerate_bounds_do_not_blow_up() {
        let aabb = Aabb::new(Vec3::new(1.0, 1.0, 1.0), Vec3::new(1.0, 1.0, 1.0));
        let transform = fit_into_unit_cube(&aabb);

        let point = transform * Vec4::new(1.0, 1.0, 1.0, 1.0);
        assert!(point.xyz().norm() < 1e-5);
    }

    #[test]
    fn missing_streams_get_defaults() {
        let positions = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let vertices = interleave_streams(&positions, None, None, None, None);

        assert_eq!(vertices.len(), 3);
        for vertex in &vertices {
            assert_eq!(vertex.normal, Vec3::new(0.0, 1.0, 0.0));
            assert_eq!(vertex.color, Vec4::new(1.0, 1.0, 1.0, 1.0));
        }
    }

    #[test]
    fn short_streams_are_truncated_to_the_position_count() {
        let positions = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]];
        let normals = vec![[0.0, 0.0, 1.0]];
        let vertices = interleave_streams(&positions, Some(normals), None, None, None);

        // izip stops at the shortest stream.
        assert_eq!(vertices.len(), 1);
        assert_eq!(vertices[0].normal, Vec3::new(0.0, 0.0, 1.0));
    }
}
