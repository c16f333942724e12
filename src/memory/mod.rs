//! Memory management: the allocator capability and its implementations
//!
//! Everything that owns heap storage in this crate (strings, the
//! dictionary, pattern programs) draws from an [`Allocator`] capability.
//! The process-wide default is the [`SystemAllocator`] singleton returned
//! by [`system()`]; constructors that take a capacity also take the
//! allocator to use, so arenas and instrumented allocators can be swapped
//! in per value.

pub mod allocator;
pub mod arena;

pub use allocator::{system, AllocFlags, Allocator, SystemAllocator, DEFAULT_ALIGN};
pub use arena::ArenaAllocator;
