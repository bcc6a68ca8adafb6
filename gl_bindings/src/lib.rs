#![allow(clippy::all)]
#![allow(non_upper_case_globals)]
#![allow(non_snake_case)]
#![allow(non_camel_case_types)]

include!(concat!(env!("OUT_DIR"), "/gl_bindings.rs"));
