use gl::types::*;
use gl_bindings as gl;
use std::ffi::CString;
use std::{mem, ptr};

bitflags! {
    pub struct BufferStorageFlags : u32 {
        const NONE = 0;
        const DYNAMIC = gl::DYNAMIC_STORAGE_BIT;
        const MAP_READ = gl::MAP_READ_BIT;
        const MAP_WRITE = gl::MAP_WRITE_BIT;
        const MAP_PERSISTENT = gl::MAP_PERSISTENT_BIT;
        const MAP_COHERENT = gl::MAP_COHERENT_BIT;
        const MAP_WRITE_PERSISTENT_COHERENT = Self::MAP_WRITE.bits | Self::MAP_PERSISTENT.bits | Self::MAP_COHERENT.bits;
    }
}

bitflags! {
    pub struct MapModeFlags : u32 {
        const MAP_READ = gl::MAP_READ_BIT;
        const MAP_WRITE = gl::MAP_WRITE_BIT;
        const MAP_PERSISTENT = gl::MAP_PERSISTENT_BIT;
        const MAP_COHERENT = gl::MAP_COHERENT_BIT;
        const MAP_WRITE_PERSISTENT_COHERENT = Self::MAP_WRITE.bits | Self::MAP_PERSISTENT.bits | Self::MAP_COHERENT.bits;
    }
}

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BufferTarget {
    Array = gl::ARRAY_BUFFER,
    ElementArray = gl::ELEMENT_ARRAY_BUFFER,
    Uniform = gl::UNIFORM_BUFFER,
}

pub struct Buffer {
    _name: String,
    id: GLuint,
    size: isize,
    mapped_ptr: *mut GLvoid,
    storage_flags: BufferStorageFlags,
    target: BufferTarget,
}

impl Buffer {
    pub fn new(
        name: &str,
        size: isize,
        target: BufferTarget,
        storage_flags: BufferStorageFlags,
    ) -> Self {
        let mut id: GLuint = 0;
        unsafe {
            gl::CreateBuffers(1, &mut id);
            gl::NamedBufferStorage(id, size, ptr::null(), storage_flags.bits());

            let label = CString::new(name).unwrap();
            gl::ObjectLabel(gl::BUFFER, id, name.len() as i32 + 1, label.as_ptr())
        }

        Self {
            _name: name.to_string(),
            id,
            size,
            mapped_ptr: ptr::null_mut(),
            storage_flags,
            target,
        }
    }

    pub fn new_from_slice<T>(
        name: &str,
        data: &[T],
        target: BufferTarget,
        storage_flags: BufferStorageFlags,
    ) -> Self {
        let mut id: GLuint = 0;
        let size = (data.len() * mem::size_of::<T>()) as isize;
        unsafe {
            gl::CreateBuffers(1, &mut id);
            gl::NamedBufferStorage(
                id,
                size,
                data.as_ptr() as *const GLvoid,
                storage_flags.bits(),
            );

            let label = CString::new(name).unwrap();
            gl::ObjectLabel(gl::BUFFER, id, name.len() as i32 + 1, label.as_ptr())
        }

        Self {
            _name: name.to_string(),
            id,
            size,
            mapped_ptr: ptr::null_mut(),
            storage_flags,
            target,
        }
    }

    /// Binds an indexed target (uniform buffers here).
    pub fn bind(&self, binding_index: u32) {
        assert!(
            self.target == BufferTarget::Uniform,
            "Only uniform buffers use indexed binding points."
        );
        unsafe { gl::BindBufferRange(self.target as u32, binding_index, self.id, 0, self.size) }
    }

    pub fn map(&mut self, map_mode: MapModeFlags) {
        assert!(
            self.storage_flags
                .intersects(BufferStorageFlags::MAP_WRITE | BufferStorageFlags::MAP_READ),
            "Buffer storage does not support memory mapping."
        );

        if self.mapped_ptr.is_null() {
            unsafe {
                self.mapped_ptr = gl::MapNamedBufferRange(self.id, 0, self.size, map_mode.bits())
            }
        }
    }

    pub fn fill_mapped<T: Sized>(&self, data: &T) {
        assert!(!self.mapped_ptr.is_null(), "Buffer is not mapped.");
        assert!(mem::size_of::<T>() as isize <= self.size);

        unsafe { ptr::copy_nonoverlapping(data as *const T, self.mapped_ptr as *mut T, 1) }
    }

    pub fn is_mapped(&self) -> bool {
        !self.mapped_ptr.is_null()
    }

    pub fn get_id(&self) -> GLuint {
        self.id
    }

    pub fn get_size(&self) -> isize {
        self.size
    }

    fn unmap(&mut self) {
        unsafe {
            gl::UnmapNamedBuffer(self.id);
        }
        self.mapped_ptr = ptr::null_mut();
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        if self.is_mapped() {
            self.unmap()
        }
        unsafe { gl::DeleteBuffers(1, &mut self.id) }
    }
}
