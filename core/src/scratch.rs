use alloc::string::String;
#[cfg(feature = "std")]
use alloc::vec::Vec;
use core::ops::{Deref, DerefMut};

/// The length of escaped string contents which may be unescaped on the stack.
///
/// Contents longer than this are unescaped into a buffer from a [`ScratchPool`].
pub const SMALL_SCRATCH: usize = 128;

/// The maximum amount of buffers a pool retains.
#[cfg(feature = "std")]
const MAX_RETAINED: usize = 16;
/// The maximum capacity of a buffer which is returned to the pool.
///
/// Larger buffers are dropped so a single large document doesn't pin memory indefinitely.
#[cfg(feature = "std")]
const MAX_RETAINED_CAPACITY: usize = 64 * 1024;

/// A pool of reusable string buffers.
///
/// Without the `std` feature, there's no lock to guard shared buffers with and every acquisition
/// allocates a fresh buffer.
#[derive(Debug, Default)]
pub struct ScratchPool {
  #[cfg(feature = "std")]
  buffers: parking_lot::Mutex<Vec<String>>,
}

impl ScratchPool {
  /// Create a new, empty pool.
  pub const fn new() -> Self {
    Self {
      #[cfg(feature = "std")]
      buffers: parking_lot::const_mutex(Vec::new()),
    }
  }

  /// The pool shared by every cursor.
  #[inline(always)]
  pub fn shared() -> &'static ScratchPool {
    static SHARED: ScratchPool = ScratchPool::new();
    &SHARED
  }

  /// Acquire an empty buffer.
  ///
  /// The buffer is returned to the pool when the guard is dropped, including while unwinding.
  pub fn acquire(&self) -> PooledString<'_> {
    #[cfg(feature = "std")]
    let buf = self.buffers.lock().pop().unwrap_or_default();
    #[cfg(not(feature = "std"))]
    let buf = String::new();
    PooledString { pool: self, buf }
  }

  /// The amount of buffers currently held by the pool.
  #[cfg(feature = "std")]
  pub fn available(&self) -> usize {
    self.buffers.lock().len()
  }

  /// The amount of buffers currently held by the pool.
  #[cfg(not(feature = "std"))]
  #[allow(clippy::unused_self)]
  pub fn available(&self) -> usize {
    0
  }

  #[cfg(feature = "std")]
  fn release(&self, mut buf: String) {
    if buf.capacity() > MAX_RETAINED_CAPACITY {
      tracing::trace!(capacity = buf.capacity(), "dropping oversized scratch buffer");
      return;
    }
    buf.clear();
    let mut buffers = self.buffers.lock();
    if buffers.len() < MAX_RETAINED {
      buffers.push(buf);
    }
  }

  #[cfg(not(feature = "std"))]
  #[allow(clippy::unused_self)]
  fn release(&self, buf: String) {
    drop(buf);
  }
}

/// A buffer acquired from a [`ScratchPool`].
#[derive(Debug)]
pub struct PooledString<'pool> {
  pool: &'pool ScratchPool,
  buf: String,
}

impl Deref for PooledString<'_> {
  type Target = String;
  #[inline(always)]
  fn deref(&self) -> &String {
    &self.buf
  }
}

impl DerefMut for PooledString<'_> {
  #[inline(always)]
  fn deref_mut(&mut self) -> &mut String {
    &mut self.buf
  }
}

impl Drop for PooledString<'_> {
  fn drop(&mut self) {
    self.pool.release(core::mem::take(&mut self.buf));
  }
}

#[cfg(all(test, feature = "std"))]
mod tests {
  use super::*;

  #[test]
  fn buffers_are_reused() {
    let pool = ScratchPool::new();
    assert_eq!(pool.available(), 0);

    let mut buf = pool.acquire();
    buf.push_str("scratch");
    let capacity = buf.capacity();
    drop(buf);
    assert_eq!(pool.available(), 1);

    let buf = pool.acquire();
    assert!(buf.is_empty());
    assert_eq!(buf.capacity(), capacity);
    assert_eq!(pool.available(), 0);
  }

  #[test]
  fn released_on_error_and_panic() {
    let pool = ScratchPool::new();

    let fails = || -> Result<(), ()> {
      let mut buf = pool.acquire();
      buf.push_str("partial");
      Err(())?;
      Ok(())
    };
    assert!(fails().is_err());
    assert_eq!(pool.available(), 1);

    let panicked = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
      let mut first = pool.acquire();
      let _second = pool.acquire();
      first.push_str("partial");
      panic!("unwinding with buffers held");
    }));
    assert!(panicked.is_err());
    assert_eq!(pool.available(), 2);
  }

  #[test]
  fn oversized_buffers_are_dropped() {
    let pool = ScratchPool::new();
    let mut buf = pool.acquire();
    buf.reserve(MAX_RETAINED_CAPACITY + 1);
    drop(buf);
    assert_eq!(pool.available(), 0);

    let held = (0 .. (MAX_RETAINED + 4)).map(|_| pool.acquire()).collect::<Vec<_>>();
    drop(held);
    assert_eq!(pool.available(), MAX_RETAINED);
  }
}
