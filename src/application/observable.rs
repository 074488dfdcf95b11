//! Observable state cells shared between the editor state and its views.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<T> = Box<dyn FnMut(&T)>;

struct Subscriber<T> {
    id: u64,
    cancelled: Rc<Cell<bool>>,
    callback: Callback<T>,
}

struct Shared<T> {
    value: RefCell<T>,
    subscribers: RefCell<Vec<Subscriber<T>>>,
    next_id: Cell<u64>,
    notifying: Cell<bool>,
    /// Set when the value changes while a notification is running.
    pending: Cell<bool>,
}

/// A writable value that notifies subscribers whenever it is set.
///
/// Clones are handles to the same cell. Cells are single-threaded.
///
/// # Examples
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use mapstack::application::Observable;
///
/// let flag = Observable::new(false);
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let sink = seen.clone();
/// let sub = flag.subscribe(move |v| sink.borrow_mut().push(*v));
///
/// flag.set(true);
/// drop(sub);
/// flag.set(false);
///
/// assert_eq!(*seen.borrow(), vec![false, true]);
/// ```
pub struct Observable<T> {
    shared: Rc<Shared<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<T: Clone + 'static> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            shared: Rc::new(Shared {
                value: RefCell::new(value),
                subscribers: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
                notifying: Cell::new(false),
                pending: Cell::new(false),
            }),
        }
    }

    pub fn get(&self) -> T {
        self.shared.value.borrow().clone()
    }

    /// Borrows the current value without cloning it.
    ///
    /// `f` must not set this cell.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.shared.value.borrow())
    }

    pub fn set(&self, value: T) {
        *self.shared.value.borrow_mut() = value;
        self.notify();
    }

    /// Mutates the value in place, then notifies.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.shared.value.borrow_mut());
        self.notify();
    }

    /// Registers `f`, calling it right away with the current value and then
    /// after every change until the returned [`Subscription`] is dropped.
    pub fn subscribe(&self, f: impl FnMut(&T) + 'static) -> Subscription {
        let id = self.shared.next_id.get();
        self.shared.next_id.set(id + 1);

        let mut callback: Callback<T> = Box::new(f);
        let current = self.get();
        callback(&current);

        let cancelled = Rc::new(Cell::new(false));
        self.shared.subscribers.borrow_mut().push(Subscriber {
            id,
            cancelled: cancelled.clone(),
            callback,
        });

        let weak: Weak<Shared<T>> = Rc::downgrade(&self.shared);
        Subscription {
            cancel: Some(Box::new(move || {
                cancelled.set(true);
                if let Some(shared) = weak.upgrade() {
                    // Absent while its notification pass is running; the pass
                    // drops it on the way out.
                    shared.subscribers.borrow_mut().retain(|sub| sub.id != id);
                }
            })),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.shared.subscribers.borrow().len()
    }

    /// Calls every live subscriber with the current value.
    ///
    /// The subscriber list is moved out while callbacks run, so callbacks may
    /// read and write any cell. Subscribers added during a pass are not called
    /// by it. A set of this same cell from inside a callback doesn't recurse:
    /// it marks the cell pending and the running pass goes round again, so
    /// every subscriber's last call sees the final value. A callback that
    /// keeps changing the value it is handed never settles.
    fn notify(&self) {
        let shared = &self.shared;
        if shared.notifying.get() {
            shared.pending.set(true);
            return;
        }
        shared.notifying.set(true);

        let mut running = std::mem::take(&mut *shared.subscribers.borrow_mut());
        loop {
            shared.pending.set(false);
            let value = self.get();
            for sub in running.iter_mut() {
                if !sub.cancelled.get() {
                    (sub.callback)(&value);
                }
            }

            running.retain(|sub| !sub.cancelled.get());
            running.append(&mut shared.subscribers.borrow_mut());
            if !shared.pending.get() {
                break;
            }
        }

        *shared.subscribers.borrow_mut() = running;
        shared.notifying.set(false);
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &*self.shared.value.borrow())
            .field("subscribers", &self.shared.subscribers.borrow().len())
            .finish()
    }
}

/// Keeps a subscription alive. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}
