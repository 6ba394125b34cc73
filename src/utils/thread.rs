use crate::core::library::Library;
use crate::models::error::SError;
use parking_lot::Mutex;
use std::sync::Arc;

/// Handle to the library owned by the coordinating context.
pub type SharedLibrary = Arc<Mutex<Option<Library>>>;

pub fn with_lib_arc_mut<F, R>(handle: &SharedLibrary, f: F) -> Result<R, SError>
where
    F: FnOnce(&mut Library) -> R,
{
    let mut guard = handle.lock();
    let lib = guard.as_mut().ok_or(SError::NoActiveLibrary)?;
    Ok(f(lib))
}

pub fn with_lib_arc<F, R>(handle: &SharedLibrary, f: F) -> Result<R, SError>
where
    F: FnOnce(&Library) -> R,
{
    let guard = handle.lock();
    let lib = guard.as_ref().ok_or(SError::NoActiveLibrary)?;
    Ok(f(lib))
}
