//! Output capture - per-thread redirection of the framework's output
//! streams into in-memory buffers.
//!
//! Test bodies write through [`cout!`](crate::cout), [`coutln!`](crate::coutln),
//! [`cerr!`](crate::cerr), [`cerrln!`](crate::cerrln) or the [`stdout()`] /
//! [`stderr()`] writers. Each write goes to the buffer pair bound to the
//! calling thread, or to the real process stream when nothing is bound.
//!
//! - [`CaptureProxy`] binds one buffer pair to the current thread for its
//!   lifetime. The sequential suite holds one for a whole run.
//! - [`ParallelCaptureProxy`] owns one buffer pair per worker. It is created
//!   before workers start and dropped after they join; each worker binds its
//!   own pair with [`ParallelCaptureProxy::bind`].

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::cell::RefCell;
use std::fmt;
use std::io::{self, Write};
use std::marker::PhantomData;
use std::panic;
use std::sync::Arc;

thread_local! {
    static BINDING: RefCell<Option<BufferPair>> = const { RefCell::new(None) };
}

/// Which output stream a write targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
    /// Standard output.
    Stdout,
    /// Standard error.
    Stderr,
}

/// Text captured from both streams.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CapturedOutput {
    /// Text written to stdout.
    pub stdout: String,
    /// Text written to stderr.
    pub stderr: String,
}

impl CapturedOutput {
    /// True if nothing was captured on either stream.
    pub fn is_empty(&self) -> bool {
        self.stdout.is_empty() && self.stderr.is_empty()
    }
}

/// Raw bytes per stream. Decoding waits until the text is read, so a
/// multi-byte character split across writes survives intact.
#[derive(Debug, Clone, Default)]
struct BufferPair {
    stdout: Arc<Mutex<Vec<u8>>>,
    stderr: Arc<Mutex<Vec<u8>>>,
}

fn decode(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes)
        .unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned())
}

impl BufferPair {
    fn buffer(&self, stream: Stream) -> &Arc<Mutex<Vec<u8>>> {
        match stream {
            Stream::Stdout => &self.stdout,
            Stream::Stderr => &self.stderr,
        }
    }

    fn snapshot(&self) -> CapturedOutput {
        CapturedOutput {
            stdout: decode(self.stdout.lock().clone()),
            stderr: decode(self.stderr.lock().clone()),
        }
    }

    fn take(&self) -> CapturedOutput {
        CapturedOutput {
            stdout: decode(std::mem::take(&mut *self.stdout.lock())),
            stderr: decode(std::mem::take(&mut *self.stderr.lock())),
        }
    }

    fn clear(&self) {
        self.stdout.lock().clear();
        self.stderr.lock().clear();
    }
}

fn rebind(pair: Option<BufferPair>) -> Option<BufferPair> {
    BINDING.with(|binding| binding.replace(pair))
}

fn bound_buffer(stream: Stream) -> Option<Arc<Mutex<Vec<u8>>>> {
    BINDING.with(|binding| binding.borrow().as_ref().map(|pair| Arc::clone(pair.buffer(stream))))
}

/// True when the calling thread's output is being captured.
pub fn is_capturing() -> bool {
    BINDING.with(|binding| binding.borrow().is_some())
}

static PANIC_ROUTE: OnceCell<()> = OnceCell::new();

/// Sends panic reports from capturing threads into their captured stderr.
///
/// Installed once per process. Threads without a binding keep the panic
/// hook that was active before.
pub fn route_panics() {
    PANIC_ROUTE.get_or_init(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if is_capturing() {
                write_fmt(Stream::Stderr, format_args!("{info}\n"));
            } else {
                previous(info);
            }
        }));
    });
}

/// Writes formatted text to `stream`, honoring the calling thread's binding.
///
/// Used by the `cout!` family of macros.
pub fn write_fmt(stream: Stream, args: fmt::Arguments<'_>) {
    match bound_buffer(stream) {
        Some(buffer) => {
            // Formatting happens before locking so a Debug impl that itself
            // prints cannot deadlock on the buffer.
            let text = fmt::format(args);
            buffer.lock().extend_from_slice(text.as_bytes());
        }
        None => {
            // Same policy as `print!` minus the panic: a closed pipe is ignored.
            let _ = match stream {
                Stream::Stdout => io::stdout().lock().write_fmt(args),
                Stream::Stderr => io::stderr().lock().write_fmt(args),
            };
        }
    }
}

/// An `io::Write` handle onto a capturable stream.
#[derive(Debug, Clone, Copy)]
pub struct CaptureWriter {
    stream: Stream,
}

/// Writer for the capturable stdout.
pub fn stdout() -> CaptureWriter {
    CaptureWriter {
        stream: Stream::Stdout,
    }
}

/// Writer for the capturable stderr.
pub fn stderr() -> CaptureWriter {
    CaptureWriter {
        stream: Stream::Stderr,
    }
}

impl Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match bound_buffer(self.stream) {
            Some(buffer) => {
                buffer.lock().extend_from_slice(buf);
                Ok(buf.len())
            }
            None => match self.stream {
                Stream::Stdout => io::stdout().write(buf),
                Stream::Stderr => io::stderr().write(buf),
            },
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.stream {
            Stream::Stdout => io::stdout().flush(),
            Stream::Stderr => io::stderr().flush(),
        }
    }
}

/// Captures the current thread's output for as long as it lives.
///
/// Dropping the proxy restores whatever binding was active before it.
/// The proxy is tied to the thread that installed it.
#[derive(Debug)]
pub struct CaptureProxy {
    pair: BufferPair,
    previous: Option<BufferPair>,
    _thread: PhantomData<*const ()>,
}

impl CaptureProxy {
    /// Starts capturing on the current thread.
    pub fn install() -> Self {
        let pair = BufferPair::default();
        let previous = rebind(Some(pair.clone()));
        Self {
            pair,
            previous,
            _thread: PhantomData,
        }
    }

    /// Text captured from stdout so far.
    pub fn stdout_text(&self) -> String {
        decode(self.pair.stdout.lock().clone())
    }

    /// Text captured from stderr so far.
    pub fn stderr_text(&self) -> String {
        decode(self.pair.stderr.lock().clone())
    }

    /// Copy of both buffers.
    pub fn snapshot(&self) -> CapturedOutput {
        self.pair.snapshot()
    }

    /// Moves both buffers out, leaving them empty.
    pub fn take(&self) -> CapturedOutput {
        self.pair.take()
    }

    /// Empties both buffers.
    pub fn clear(&self) {
        self.pair.clear();
    }
}

impl Drop for CaptureProxy {
    fn drop(&mut self) {
        rebind(self.previous.take());
    }
}

/// Worker-indexed capture buffers for a parallel run.
#[derive(Debug)]
pub struct ParallelCaptureProxy {
    pairs: Vec<BufferPair>,
}

impl ParallelCaptureProxy {
    /// Allocates one buffer pair per worker.
    pub fn install(workers: usize) -> Self {
        Self {
            pairs: (0..workers).map(|_| BufferPair::default()).collect(),
        }
    }

    /// Number of worker buffer pairs.
    pub fn workers(&self) -> usize {
        self.pairs.len()
    }

    /// Binds worker `worker`'s buffers to the calling thread until the
    /// returned guard drops.
    ///
    /// # Panics
    ///
    /// Panics if `worker` is not below [`workers`](Self::workers).
    pub fn bind(&self, worker: usize) -> WorkerBinding<'_> {
        let previous = rebind(Some(self.pairs[worker].clone()));
        WorkerBinding {
            previous,
            _proxy: PhantomData,
        }
    }

    /// Copy of worker `worker`'s buffers.
    ///
    /// # Panics
    ///
    /// Panics if `worker` is out of range.
    pub fn snapshot(&self, worker: usize) -> CapturedOutput {
        self.pairs[worker].snapshot()
    }

    /// Moves worker `worker`'s buffers out, leaving them empty.
    ///
    /// # Panics
    ///
    /// Panics if `worker` is out of range.
    pub fn take(&self, worker: usize) -> CapturedOutput {
        self.pairs[worker].take()
    }

    /// Empties worker `worker`'s buffers.
    ///
    /// # Panics
    ///
    /// Panics if `worker` is out of range.
    pub fn clear(&self, worker: usize) {
        self.pairs[worker].clear();
    }
}

/// Guard returned by [`ParallelCaptureProxy::bind`].
#[derive(Debug)]
pub struct WorkerBinding<'a> {
    previous: Option<BufferPair>,
    _proxy: PhantomData<(&'a ParallelCaptureProxy, *const ())>,
}

impl Drop for WorkerBinding<'_> {
    fn drop(&mut self) {
        rebind(self.previous.take());
    }
}

/// Prints to the capturable stdout.
#[macro_export]
macro_rules! cout {
    ($($arg:tt)*) => {
        $crate::capture::write_fmt($crate::capture::Stream::Stdout, ::std::format_args!($($arg)*))
    };
}

/// Prints to the capturable stdout, with a newline.
#[macro_export]
macro_rules! coutln {
    () => {
        $crate::cout!("\n")
    };
    ($($arg:tt)*) => {
        $crate::capture::write_fmt(
            $crate::capture::Stream::Stdout,
            ::std::format_args!("{}\n", ::std::format_args!($($arg)*)),
        )
    };
}

/// Prints to the capturable stderr.
#[macro_export]
macro_rules! cerr {
    ($($arg:tt)*) => {
        $crate::capture::write_fmt($crate::capture::Stream::Stderr, ::std::format_args!($($arg)*))
    };
}

/// Prints to the capturable stderr, with a newline.
#[macro_export]
macro_rules! cerrln {
    () => {
        $crate::cerr!("\n")
    };
    ($($arg:tt)*) => {
        $crate::capture::write_fmt(
            $crate::capture::Stream::Stderr,
            ::std::format_args!("{}\n", ::std::format_args!($($arg)*)),
        )
    };
}
