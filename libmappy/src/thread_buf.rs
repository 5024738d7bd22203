//! Thread-local minimap2 work buffers.
//!
//! minimap2 requires a `mm_tbuf_t` scratch buffer per mapping call, and the
//! buffer must not be shared between concurrent calls. Keeping one buffer
//! per thread in a `thread_local!` satisfies that contract without any
//! locking. The buffer accumulates kmalloc pool memory across calls, so it
//! is torn down and reinitialised after a fixed number of uses.
use std::cell::RefCell;

use minimap2_sys::{mm_tbuf_destroy, mm_tbuf_init, mm_tbuf_t};

/// Reinitialise a buffer after this many mapping calls to release its pool.
const MAX_USES: usize = 15;

thread_local! {
    static BUF: RefCell<ThreadLocalBuffer> = RefCell::new(ThreadLocalBuffer::new());
}

/// Run `f` with this thread's mapping buffer.
pub(crate) fn with_buf<F, T>(f: F) -> T
where
    F: FnOnce(*mut mm_tbuf_t) -> T,
{
    BUF.with(|buf| f(buf.borrow_mut().get()))
}

#[derive(Debug)]
struct ThreadLocalBuffer {
    buf: *mut mm_tbuf_t,
    uses: usize,
}

impl ThreadLocalBuffer {
    fn new() -> Self {
        let buf = unsafe { mm_tbuf_init() };
        Self { buf, uses: 0 }
    }

    /// Return the buffer, replacing it with a fresh one once it has been
    /// used [`MAX_USES`] times.
    fn get(&mut self) -> *mut mm_tbuf_t {
        if self.uses > MAX_USES {
            unsafe { mm_tbuf_destroy(self.buf) };
            self.buf = unsafe { mm_tbuf_init() };
            self.uses = 0;
        }
        self.uses += 1;
        self.buf
    }
}

impl Drop for ThreadLocalBuffer {
    fn drop(&mut self) {
        unsafe { mm_tbuf_destroy(self.buf) };
    }
}
