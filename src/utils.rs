use std::{
	cell::{Ref, RefCell, RefMut},
	fmt::{Debug, Formatter},
	rc::Rc,
};

/// Shared, interiorly mutable handle. Cloning is a shallow copy of the handle.
#[derive(Default)]
pub struct RcCell<T> {
	inner: Rc<RefCell<T>>,
}

impl<T> Clone for RcCell<T> {
	fn clone(&self) -> Self { Self { inner: self.inner.clone() } }
}

impl<T> RcCell<T> {
	pub fn new(value: T) -> Self { Self { inner: Rc::new(RefCell::new(value)) } }

	pub fn borrow(&self) -> Ref<'_, T> { self.inner.borrow() }

	pub fn borrow_mut(&self) -> RefMut<'_, T> { self.inner.borrow_mut() }

	/// Whether both handles point at the same allocation.
	pub fn ptr_eq(&self, other: &Self) -> bool { Rc::ptr_eq(&self.inner, &other.inner) }
}

// Environments and instances may reference each other through closures, so `Debug` must not
// recurse into the shared value.
impl<T> Debug for RcCell<T> {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "RcCell({:p})", Rc::as_ptr(&self.inner))
	}
}
