//! Runtime caching and disposal primitives.
//!
//! The resolver produces a static plan; these are the small pieces a
//! provider built from that plan uses at runtime. [`LazySlot`] is one
//! double-checked cache slot backing a singleton or scoped service, and
//! [`DisposeList`] is the dynamic tracking list for instances whose
//! disposability is only known at construction time.

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// Cleanup hook for tracked instances.
pub trait Dispose: Send + Sync {
    fn dispose(&self);
}

/// A double-checked lazy cache slot.
///
/// The fast path is a single atomic load. Initialization takes the slot's
/// mutex, re-checks, and runs the initializer at most once; concurrent first
/// accesses all observe the same instance.
pub struct LazySlot<T> {
    initialized: AtomicBool,
    lock: Mutex<()>,
    cell: UnsafeCell<Option<Arc<T>>>,
}

// The cell is only written under the mutex, before the release store that
// publishes it; readers only dereference after the acquire load.
unsafe impl<T: Send + Sync> Sync for LazySlot<T> {}
unsafe impl<T: Send + Sync> Send for LazySlot<T> {}

impl<T> LazySlot<T> {
    pub fn new() -> Self {
        Self {
            initialized: AtomicBool::new(false),
            lock: Mutex::new(()),
            cell: UnsafeCell::new(None),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// The cached instance, if one was already constructed.
    pub fn get(&self) -> Option<Arc<T>> {
        if self.initialized.load(Ordering::Acquire) {
            unsafe { (*self.cell.get()).clone() }
        } else {
            None
        }
    }

    /// Returns the cached instance, constructing it with `init` on first
    /// access. `init` runs at most once per slot.
    pub fn get_or_init<F>(&self, init: F) -> Arc<T>
    where
        F: FnOnce() -> Arc<T>,
    {
        if self.initialized.load(Ordering::Acquire) {
            if let Some(value) = unsafe { (*self.cell.get()).clone() } {
                return value;
            }
        }
        let _guard = self.lock.lock();
        if self.initialized.load(Ordering::Relaxed) {
            if let Some(value) = unsafe { (*self.cell.get()).clone() } {
                return value;
            }
        }
        let value = init();
        unsafe {
            *self.cell.get() = Some(value.clone());
        }
        self.initialized.store(true, Ordering::Release);
        value
    }
}

impl<T> Default for LazySlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for LazySlot<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazySlot")
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

/// Tracks dynamically discovered disposables and disposes them in first-use
/// order when the owning cache level is torn down.
#[derive(Default)]
pub struct DisposeList {
    items: Mutex<Vec<Arc<dyn Dispose>>>,
}

impl DisposeList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&self, item: Arc<dyn Dispose>) {
        self.items.lock().push(item);
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// Disposes everything tracked so far and empties the list.
    pub fn dispose_all(&self) {
        let items = std::mem::take(&mut *self.items.lock());
        for item in items {
            item.dispose();
        }
    }
}

impl std::fmt::Debug for DisposeList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisposeList")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn slot_initializes_once() {
        let slot: LazySlot<u32> = LazySlot::new();
        assert!(!slot.is_initialized());
        assert!(slot.get().is_none());

        let first = slot.get_or_init(|| Arc::new(7));
        let second = slot.get_or_init(|| Arc::new(13));
        assert_eq!(*first, 7);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&first, &slot.get().unwrap()));
    }

    #[test]
    fn concurrent_first_access_constructs_once() {
        let slot: Arc<LazySlot<usize>> = Arc::new(LazySlot::new());
        let constructions = AtomicUsize::new(0);

        std::thread::scope(|scope| {
            for _ in 0..16 {
                scope.spawn(|| {
                    for _ in 0..64 {
                        let value = slot.get_or_init(|| {
                            constructions.fetch_add(1, Ordering::SeqCst);
                            Arc::new(42)
                        });
                        assert_eq!(*value, 42);
                    }
                });
            }
        });
        assert_eq!(constructions.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dispose_list_runs_in_first_use_order() {
        struct Recorder {
            id: usize,
            order: Arc<Mutex<Vec<usize>>>,
        }
        impl Dispose for Recorder {
            fn dispose(&self) {
                self.order.lock().push(self.id);
            }
        }

        let order = Arc::new(Mutex::new(Vec::new()));
        let list = DisposeList::new();
        for id in 0..3 {
            list.track(Arc::new(Recorder {
                id,
                order: order.clone(),
            }));
        }
        assert_eq!(list.len(), 3);
        list.dispose_all();
        assert!(list.is_empty());
        assert_eq!(*order.lock(), vec![0, 1, 2]);
    }
}
