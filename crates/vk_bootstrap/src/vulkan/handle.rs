//! Managed Vulkan handles
//!
//! [`ManagedHandle`] pairs a raw handle with the action that destroys it.
//! [`HandleScope`] owns a parent handle together with everything created
//! against it, and releases all dependents before the parent.
//!
//! Release order follows ownership: a parent's release is only reachable from
//! [`HandleScope::release`], which first releases the dependents. Children
//! read their parent's value at release time, so they always see the current
//! live parent. A parent released while a child is still live is logged as an
//! error; a child whose parent is already gone skips its release instead of
//! handing a dead parent to the driver.

use ash::vk;
use std::cell::Cell;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

/// A copyable raw handle with a distinguished null value
pub trait RawHandle: Copy + PartialEq + fmt::Debug + 'static {
    /// The null handle
    fn null() -> Self;

    /// Whether this is the null handle
    fn is_null(self) -> bool {
        self == Self::null()
    }
}

impl<T: vk::Handle + Copy + PartialEq + fmt::Debug + 'static> RawHandle for T {
    fn null() -> Self {
        Self::from_raw(0)
    }
}

/// A raw handle plus the action that releases it
pub struct ManagedHandle<T: RawHandle> {
    label: &'static str,
    value: Rc<Cell<T>>,
    live_dependents: Rc<Cell<usize>>,
    parent_dependents: Option<Rc<Cell<usize>>>,
    release: Box<dyn FnMut(T)>,
}

impl<T: RawHandle> ManagedHandle<T> {
    /// Create an empty handle with no parent
    pub fn new(label: &'static str, release: impl FnMut(T) + 'static) -> Self {
        Self {
            label,
            value: Rc::new(Cell::new(T::null())),
            live_dependents: Rc::new(Cell::new(0)),
            parent_dependents: None,
            release: Box::new(release),
        }
    }

    /// Create an empty handle that is released against `parent`
    ///
    /// The release action receives the parent's value as it is at release
    /// time, not as it was when this handle was created.
    pub fn with_parent<P: RawHandle>(
        label: &'static str,
        parent: &ManagedHandle<P>,
        mut release: impl FnMut(P, T) + 'static,
    ) -> Self {
        let parent_value = Rc::clone(&parent.value);
        let parent_label = parent.label;

        let mut handle = Self::new(label, move |value| {
            let parent = parent_value.get();
            if parent.is_null() {
                log::error!(
                    "{} outlived its parent {}; skipping release of {:?}",
                    label,
                    parent_label,
                    value
                );
                return;
            }
            release(parent, value);
        });
        handle.parent_dependents = Some(Rc::clone(&parent.live_dependents));
        handle
    }

    /// Assign a new value, releasing the previous one first
    ///
    /// Assigning the value already held does nothing.
    pub fn assign(&mut self, value: T) {
        if self.value.get() == value {
            return;
        }
        self.release();
        self.store(value);
    }

    /// Release the current value and hand out the empty slot
    ///
    /// Whatever is written to the slot becomes the new value once the slot
    /// is dropped. Meant for create calls that fill in an output handle.
    pub fn replace(&mut self) -> Slot<'_, T> {
        self.release();
        Slot {
            value: T::null(),
            handle: self,
        }
    }

    /// The raw handle, for passing into API calls
    pub fn raw(&self) -> T {
        self.value.get()
    }

    /// Whether no live value is held
    pub fn is_null(&self) -> bool {
        self.value.get().is_null()
    }

    /// Name used in log messages
    pub const fn label(&self) -> &'static str {
        self.label
    }

    /// Number of dependent handles currently holding a live value
    pub fn live_dependents(&self) -> usize {
        self.live_dependents.get()
    }

    /// Release the current value, if any
    ///
    /// Idempotent: releasing an empty handle is a no-op.
    pub fn release(&mut self) {
        let value = self.value.replace(T::null());
        if value.is_null() {
            return;
        }

        let live = self.live_dependents.get();
        if live > 0 {
            log::error!(
                "Releasing {} while {} dependent handle(s) are still live",
                self.label,
                live
            );
        }

        log::debug!("Releasing {} {:?}", self.label, value);
        (self.release)(value);

        if let Some(parent) = &self.parent_dependents {
            parent.set(parent.get().saturating_sub(1));
        }
    }

    fn store(&mut self, value: T) {
        self.value.set(value);
        if value.is_null() {
            return;
        }
        if let Some(parent) = &self.parent_dependents {
            parent.set(parent.get() + 1);
        }
    }
}

impl<T: RawHandle> PartialEq<T> for ManagedHandle<T> {
    fn eq(&self, other: &T) -> bool {
        self.value.get() == *other
    }
}

impl<T: RawHandle> fmt::Debug for ManagedHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedHandle")
            .field("label", &self.label)
            .field("value", &self.value.get())
            .field("live_dependents", &self.live_dependents.get())
            .finish_non_exhaustive()
    }
}

impl<T: RawHandle> Drop for ManagedHandle<T> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Output slot returned by [`ManagedHandle::replace`]
pub struct Slot<'a, T: RawHandle> {
    handle: &'a mut ManagedHandle<T>,
    value: T,
}

impl<T: RawHandle> Deref for Slot<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T: RawHandle> DerefMut for Slot<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T: RawHandle> Drop for Slot<'_, T> {
    fn drop(&mut self) {
        self.handle.store(self.value);
    }
}

/// A group of handles created against the same parent
pub trait Dependents {
    /// Release every handle in the group, children of children first
    fn release_dependents(&mut self);
}

impl<T: RawHandle> Dependents for ManagedHandle<T> {
    fn release_dependents(&mut self) {
        self.release();
    }
}

impl<C: Dependents> Dependents for Option<C> {
    fn release_dependents(&mut self) {
        if let Some(dependents) = self {
            dependents.release_dependents();
        }
    }
}

impl<C: Dependents> Dependents for Vec<C> {
    /// Releases in reverse order of insertion
    fn release_dependents(&mut self) {
        for dependent in self.iter_mut().rev() {
            dependent.release_dependents();
        }
    }
}

/// A parent handle that owns its dependents
pub struct HandleScope<P: RawHandle, C: Dependents> {
    dependents: C,
    parent: ManagedHandle<P>,
}

impl<P: RawHandle, C: Dependents> HandleScope<P, C> {
    /// Take ownership of `parent` and build its dependents against it
    pub fn new(parent: ManagedHandle<P>, build: impl FnOnce(&ManagedHandle<P>) -> C) -> Self {
        let dependents = build(&parent);
        Self { dependents, parent }
    }

    /// The parent handle
    pub const fn parent(&self) -> &ManagedHandle<P> {
        &self.parent
    }

    /// The dependents
    pub const fn dependents(&self) -> &C {
        &self.dependents
    }

    /// Mutable access to the dependents
    ///
    /// The parent stays immutable; it can only be released through the scope.
    pub fn dependents_mut(&mut self) -> &mut C {
        &mut self.dependents
    }

    /// Release all dependents, then the parent
    pub fn release(&mut self) {
        self.dependents.release_dependents();
        self.parent.release();
    }
}

impl<P: RawHandle, C: Dependents> Drop for HandleScope<P, C> {
    fn drop(&mut self) {
        self.release();
    }
}
