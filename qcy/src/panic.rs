//! Catching panics inside a trial without losing where they came from.

use {
    crate::outcome::{Failure, Location},
    core::cell::{Cell, RefCell},
    std::{
        panic::{self, AssertUnwindSafe},
        sync::Once,
    },
};

static HOOK: Once = Once::new();

thread_local! {
    static CAPTURING: Cell<bool> = const { Cell::new(false) };
    static LOCATION: RefCell<Option<Location>> = const { RefCell::new(None) };
}

/// Chain onto whatever hook is installed,
/// recording panic locations on threads that are currently capturing.
fn install_hook() {
    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if CAPTURING.with(Cell::get) {
                LOCATION.set(info.location().map(Location::from));
            }
            previous(info);
        }));
    });
}

/// Run `f`, turning a panic into a [`Failure`] that can later be re-raised unchanged.
/// # Errors
/// If `f` panics.
#[inline]
pub fn catch<R, F: FnOnce() -> R>(f: F) -> Result<R, Failure> {
    let () = install_hook();
    let was_capturing = CAPTURING.replace(true);
    let _: Option<Location> = LOCATION.take();
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    let () = CAPTURING.set(was_capturing);
    result.map_err(|payload| Failure::from_panic(payload, LOCATION.take()))
}
