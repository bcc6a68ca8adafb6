use gl_bindings as gl;

use crate::core::camera::Camera;
use crate::core::math::{self, Mat4, Vec3, Vec4};
use crate::core::view::View;
use crate::core::window::Window;
use crate::rendering::buffer::{Buffer, BufferStorageFlags, BufferTarget, MapModeFlags};
use crate::rendering::mesh::{Mesh, FULLSCREEN_MESH};
use crate::rendering::primitives;
use crate::rendering::sampler::Sampler;
use crate::rendering::shader::ShaderProgram;
use crate::rendering::texture::Texture2D;
use crate::rendering::{clear_framebuffer, set_viewport, Draw};
use crate::viewer::ibl::Ibl;
use crate::viewer::model::Model;
use crevice::std140::AsStd140;
use std::mem;
use std::rc::Rc;

const CAMERA_UBO_BINDING_INDEX: u32 = 0;
const BASE_COLOR_MAP_BINDING_INDEX: u32 = 0;
const PREFILTERED_MAP_BINDING_INDEX: u32 = 1;

#[derive(AsStd140)]
struct CameraBlock {
    view: mint::ColumnMatrix4<f32>,
    projection: mint::ColumnMatrix4<f32>,
    view_projection: mint::ColumnMatrix4<f32>,
    eye_position: mint::Vector4<f32>,
}

impl CameraBlock {
    fn from_camera(camera: &Camera) -> Self {
        let eye = camera.position();
        Self {
            view: (*camera.view_matrix()).into(),
            projection: (*camera.projection_matrix()).into(),
            view_projection: camera.view_projection_matrix().into(),
            eye_position: Vec4::new(eye.x, eye.y, eye.z, 1.0).into(),
        }
    }
}

/// A wireframe cube drawn in the debug views, placed with an arbitrary
/// transform (camera frustums, bounding boxes).
pub struct DebugCube {
    pub transform: Mat4,
    pub color: Vec4,
}

/// The shadow-catcher style plane under the model.
pub struct Ground {
    pub mesh: Mesh,
    pub shadow_strength: f32,
    pub visible: bool,
}

impl Ground {
    pub fn new(half_extent: f32) -> Self {
        Self {
            mesh: Mesh::from_geometry(&primitives::ground_plane(half_extent)),
            shadow_strength: 0.75,
            visible: true,
        }
    }
}

/// Everything the renderer draws each frame. The application fills this
/// in; the driver only routes it to the renderer.
pub struct Scene {
    pub model: Option<Model>,
    pub ground: Option<Ground>,
    pub ibl: Option<Ibl>,
    pub dirt: Option<Rc<Texture2D>>,
    pub dirt_strength: f32,
    pub debug_cubes: Vec<DebugCube>,
    pub clear_color: Vec4,
    pub skybox_enabled: bool,
    pub ibl_intensity: f32,
    pub ibl_rotation_deg: f32,
    pub sun_enabled: bool,
    pub sun_direction: Vec3,
    pub sun_color: Vec3,
    pub sun_intensity: f32,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            model: None,
            ground: None,
            ibl: None,
            dirt: None,
            dirt_strength: 0.0,
            debug_cubes: Vec::new(),
            clear_color: Vec4::new(0.02, 0.02, 0.02, 1.0),
            skybox_enabled: true,
            // Photometric defaults: lux, scaled back down by the camera
            // exposure at shading time.
            ibl_intensity: 30_000.0,
            ibl_rotation_deg: 0.0,
            sun_enabled: true,
            sun_direction: Vec3::new(0.6, -1.0, -0.8),
            sun_color: Vec3::new(1.0, 1.0, 0.96),
            sun_intensity: 50_000.0,
        }
    }
}

/// Forward renderer for the harness scene: skybox, lit model and ground,
/// a depth visualization pass for the split depth view, wireframe debug
/// cubes and an optional fullscreen dirt overlay.
pub struct SceneRenderer {
    lit_program: ShaderProgram,
    depth_program: ShaderProgram,
    unlit_program: ShaderProgram,
    skybox_program: ShaderProgram,
    dirt_program: ShaderProgram,
    camera_ubo: Buffer,
    cube: Mesh,
    white: Texture2D,
    fallback_environment: crate::rendering::texture::TextureCube,
    linear_sampler: Sampler,
    trilinear_sampler: Sampler,
}

impl SceneRenderer {
    pub fn new() -> Result<Self, String> {
        let lit_program = ShaderProgram::from_sources(
            "lit",
            include_str!("shaders/scene.vert"),
            include_str!("shaders/lit.frag"),
        )?;
        let depth_program = ShaderProgram::from_sources(
            "depth",
            include_str!("shaders/scene.vert"),
            include_str!("shaders/depth.frag"),
        )?;
        let unlit_program = ShaderProgram::from_sources(
            "unlit",
            include_str!("shaders/scene.vert"),
            include_str!("shaders/unlit.frag"),
        )?;
        let skybox_program = ShaderProgram::from_sources(
            "skybox",
            include_str!("shaders/skybox.vert"),
            include_str!("shaders/skybox.frag"),
        )?;
        let dirt_program = ShaderProgram::from_sources(
            "dirt",
            include_str!("shaders/fullscreen.vert"),
            include_str!("shaders/dirt.frag"),
        )?;

        let initial_block = CameraBlock {
            view: Mat4::identity().into(),
            projection: Mat4::identity().into(),
            view_projection: Mat4::identity().into(),
            eye_position: Vec4::new(0.0, 0.0, 0.0, 1.0).into(),
        }
        .as_std140();

        let mut camera_ubo = Buffer::new(
            "Camera UBO",
            mem::size_of_val(&initial_block) as isize,
            BufferTarget::Uniform,
            BufferStorageFlags::MAP_WRITE_PERSISTENT_COHERENT,
        );
        camera_ubo.bind(CAMERA_UBO_BINDING_INDEX);
        camera_ubo.map(MapModeFlags::MAP_WRITE_PERSISTENT_COHERENT);
        camera_ubo.fill_mapped(&initial_block);

        Ok(Self {
            lit_program,
            depth_program,
            unlit_program,
            skybox_program,
            dirt_program,
            camera_ubo,
            cube: Mesh::from_geometry(&primitives::cube()),
            white: Texture2D::new_solid_color(255, 255, 255, 255)?,
            fallback_environment: crate::rendering::texture::TextureCube::new_solid_color(
                32, 32, 32,
            )?,
            linear_sampler: Sampler::linear(),
            trilinear_sampler: Sampler::trilinear(),
        })
    }

    /// Rebuilds the frustum visualization cubes for the debug views.
    pub fn update_debug_cubes(&self, window: &Window, scene: &mut Scene) {
        scene.debug_cubes.clear();

        if window.god_view().is_none() {
            return;
        }

        let find = |name: &str| window.views().iter().find(|view| view.name() == name);

        if let Some(main) = find("main") {
            scene.debug_cubes.push(DebugCube {
                transform: primitives::frustum_transform(&main.camera().view_projection_matrix()),
                color: Vec4::new(1.0, 0.0, 0.0, 1.0),
            });
        }
        if let Some(ortho) = find("ortho") {
            scene.debug_cubes.push(DebugCube {
                transform: primitives::frustum_transform(&ortho.camera().view_projection_matrix()),
                color: Vec4::new(0.0, 1.0, 0.0, 1.0),
            });
        }
    }

    pub fn render(&mut self, window: &Window, scene: &Scene) {
        clear_framebuffer(&scene.clear_color);

        for view in window.views() {
            match view.name() {
                "main" => self.render_lit_view(view, scene, false),
                "god" | "ortho" => self.render_lit_view(view, scene, true),
                "depth" => self.render_depth_view(view, scene),
                _ => {}
            }
        }

        self.render_dirt_overlay(window, scene);

        // Leave the full window bound for the UI overlay pass.
        let (width, height) = window.drawable_size();
        unsafe {
            gl::Disable(gl::SCISSOR_TEST);
            gl::Viewport(0, 0, width, height);
        }
    }

    fn upload_camera(&self, camera: &Camera) {
        self.camera_ubo
            .fill_mapped(&CameraBlock::from_camera(camera).as_std140());
    }

    fn render_lit_view(&self, view: &View, scene: &Scene, debug: bool) {
        set_viewport(view.viewport());
        self.upload_camera(view.camera());

        self.bind_lighting(view.camera(), scene);

        if let Some(ground) = scene.ground.as_ref().filter(|ground| ground.visible) {
            let shade = 0.45 * (1.0 - ground.shadow_strength * 0.5);
            self.draw_mesh(
                &self.lit_program,
                &ground.mesh,
                &Mat4::identity(),
                &Vec4::new(shade, shade, shade, 1.0),
                None,
            );
        }

        if let Some(model) = scene.model.as_ref() {
            for primitive in &model.primitives {
                let transform = model.root_transform * primitive.transform;
                self.draw_mesh(
                    &self.lit_program,
                    &primitive.mesh,
                    &transform,
                    &primitive.base_color,
                    primitive.base_color_texture.as_ref(),
                );
            }
        }

        if scene.skybox_enabled {
            self.draw_skybox(view.camera(), scene);
        }

        if debug {
            self.draw_debug_cubes(scene);
        }
    }

    fn render_depth_view(&self, view: &View, scene: &Scene) {
        set_viewport(view.viewport());
        self.upload_camera(view.camera());

        self.depth_program.bind();
        self.depth_program.set_float("u_near", view.camera().near());
        self.depth_program.set_float("u_far", view.camera().far());

        if let Some(ground) = scene.ground.as_ref().filter(|ground| ground.visible) {
            self.draw_mesh(
                &self.depth_program,
                &ground.mesh,
                &Mat4::identity(),
                &Vec4::new(1.0, 1.0, 1.0, 1.0),
                None,
            );
        }

        if let Some(model) = scene.model.as_ref() {
            for primitive in &model.primitives {
                let transform = model.root_transform * primitive.transform;
                self.draw_mesh(
                    &self.depth_program,
                    &primitive.mesh,
                    &transform,
                    &Vec4::new(1.0, 1.0, 1.0, 1.0),
                    None,
                );
            }
        }
    }

    fn bind_lighting(&self, camera: &Camera, scene: &Scene) {
        let program = &self.lit_program;
        program.bind();

        match scene.ibl.as_ref() {
            Some(ibl) => {
                program.set_vec3_array("u_sh", &ibl.spherical_harmonics);
                program.bind_texture_cube(
                    PREFILTERED_MAP_BINDING_INDEX,
                    &ibl.prefiltered,
                    &self.trilinear_sampler,
                );
            }
            None => {
                // A flat gray ambient term stands in for a missing IBL.
                let mut bands = [Vec3::new(0.0, 0.0, 0.0); 9];
                bands[0] = Vec3::new(0.25, 0.25, 0.25);
                program.set_vec3_array("u_sh", &bands);
                program.bind_texture_cube(
                    PREFILTERED_MAP_BINDING_INDEX,
                    &self.fallback_environment,
                    &self.trilinear_sampler,
                );
            }
        }

        program.set_float("u_ibl_intensity", scene.ibl_intensity);
        program.set_float("u_ibl_rotation", scene.ibl_rotation_deg.to_radians());
        let sun = scene.sun_direction;
        program.set_vec4(
            "u_sun_direction",
            &Vec4::new(sun.x, sun.y, sun.z, if scene.sun_enabled { 1.0 } else { 0.0 }),
        );
        program.set_vec3("u_sun_color", &(scene.sun_color * scene.sun_intensity));
        program.set_float("u_exposure", camera.exposure());
    }

    fn draw_mesh(
        &self,
        program: &ShaderProgram,
        mesh: &Mesh,
        transform: &Mat4,
        base_color: &Vec4,
        base_color_texture: Option<&Texture2D>,
    ) {
        program.bind();
        program.set_mat4("u_model", transform);
        program.set_mat4(
            "u_normal_matrix",
            &math::inverse(transform).transpose(),
        );
        program.set_vec4("u_base_color", base_color);

        let texture = base_color_texture.unwrap_or(&self.white);
        program.bind_texture_2d(BASE_COLOR_MAP_BINDING_INDEX, texture, &self.trilinear_sampler);

        mesh.draw();
    }

    fn draw_skybox(&self, camera: &Camera, scene: &Scene) {
        let ibl = match scene.ibl.as_ref() {
            Some(ibl) => ibl,
            None => return,
        };

        // Strip the translation so the box follows the eye.
        let mut sky_view = *camera.view_matrix();
        sky_view[(0, 3)] = 0.0;
        sky_view[(1, 3)] = 0.0;
        sky_view[(2, 3)] = 0.0;

        let program = &self.skybox_program;
        program.bind();
        program.set_mat4("u_projection", camera.projection_matrix());
        program.set_mat4("u_sky_view", &sky_view);
        program.set_float("u_intensity", scene.ibl_intensity * camera.exposure());
        program.set_float("u_rotation", scene.ibl_rotation_deg.to_radians());
        program.bind_texture_cube(0, &ibl.skybox, &self.linear_sampler);

        unsafe {
            gl::Disable(gl::CULL_FACE);
            gl::DepthFunc(gl::LEQUAL);
        }
        self.cube.draw();
        unsafe {
            gl::DepthFunc(gl::LESS);
            gl::Enable(gl::CULL_FACE);
        }
    }

    fn draw_debug_cubes(&self, scene: &Scene) {
        let program = &self.unlit_program;
        program.bind();

        for cube in &scene.debug_cubes {
            program.set_mat4("u_model", &cube.transform);
            program.set_mat4("u_normal_matrix", &Mat4::identity());
            program.set_vec4("u_color", &cube.color);
            self.cube.draw_wireframe();
        }
    }

    fn render_dirt_overlay(&self, window: &Window, scene: &Scene) {
        let dirt = match scene.dirt.as_ref() {
            Some(dirt) if scene.dirt_strength > 0.0 => dirt,
            _ => return,
        };

        let (width, height) = window.drawable_size();
        set_viewport(crate::core::Rectangle::new(0, 0, width, height));

        let program = &self.dirt_program;
        program.bind();
        program.set_float("u_strength", scene.dirt_strength);
        program.bind_texture_2d(0, dirt.as_ref(), &self.linear_sampler);

        unsafe {
            gl::Enable(gl::BLEND);
            gl::BlendFunc(gl::ONE, gl::ONE);
            gl::Disable(gl::DEPTH_TEST);
        }
        FULLSCREEN_MESH.draw();
        unsafe {
            gl::Enable(gl::DEPTH_TEST);
            gl::Disable(gl::BLEND);
        }
    }
}
