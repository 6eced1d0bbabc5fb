//! Activation stack: scoped cleanup and exceptions.
//!
//! An [`Activation`] is a stack of frames. Each frame owns a list of tracked
//! values that are released together when the frame is left. A throw moves its
//! payload into the current frame and returns an [`Unwind`] marker, which the
//! caller propagates with `?` up to the nearest handler ([`Activation::scope`]
//! or [`Activation::try_catch`]). The handler pops its frame and hands the
//! payload on to the parent frame, so the payload stays owned by some live
//! frame while the stack unwinds:
//!
//! ```ignore
//! let mut cx = Activation::new();
//! let caught = cx.try_catch(|cx| {
//!     let tmp = cx.track();
//!     *tmp = Value::string("released on exit");
//!     Err(throw!(cx, "bad key {}", 12))
//! });
//! assert_eq!(caught.unwrap_err().to_string(), "bad key 12");
//! assert_eq!(cx.depth(), 0);
//! ```
//!
//! Each logical worker owns its own `Activation`; nothing here is global.

use std::fmt;
use std::panic::Location;

use tracing::{debug, trace};

use crate::values::Value;

/// Marker for an exception in flight. The payload itself is owned by the
/// activation stack until a handler takes it.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "an exception must be propagated to its handler"]
pub struct Unwind {
    _in_flight: (),
}

/// Result of an operation that may throw.
pub type Throws<T> = Result<T, Unwind>;

/// One scope's record of owned temporaries.
pub struct Frame {
    vars: Vec<Value>,
    location: &'static Location<'static>,
}

impl Frame {
    fn new(location: &'static Location<'static>) -> Self {
        Self {
            vars: Vec::new(),
            location,
        }
    }

    /// Append a fresh void slot, released when this frame is dropped.
    pub fn track(&mut self) -> &mut Value {
        self.vars.push(Value::Void);
        let last = self.vars.len() - 1;
        &mut self.vars[last]
    }

    /// Number of tracked values.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Where the frame was pushed.
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("vars", &self.vars.len())
            .field("location", &format_args!("{}", self.location))
            .finish()
    }
}

/// A stack of activation frames plus the root exception slot.
#[derive(Debug, Default)]
pub struct Activation {
    frames: Vec<Frame>,
    root_exception: Value,
}

impl Activation {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live frames.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// The last exception that escaped every frame, or void.
    pub fn root_exception(&self) -> &Value {
        &self.root_exception
    }

    /// Push a new frame and return it.
    #[track_caller]
    pub fn push(&mut self) -> &mut Frame {
        let location = Location::caller();
        trace!(depth = self.frames.len() + 1, %location, "push frame");
        self.frames.push(Frame::new(location));
        let top = self.frames.len() - 1;
        &mut self.frames[top]
    }

    /// Unlink and return the top frame.
    ///
    /// # Panics
    ///
    /// Panics on an empty stack: popping more frames than were pushed is a
    /// bug in the caller.
    pub fn pop(&mut self) -> Frame {
        match self.frames.pop() {
            Some(frame) => frame,
            None => panic!("Exception stack underrun"),
        }
    }

    /// Pop the top frame and release everything it tracks.
    pub fn up(&mut self) {
        drop(self.pop());
    }

    /// Track a fresh void slot in the top frame.
    ///
    /// # Panics
    ///
    /// Panics if no frame is active.
    pub fn track(&mut self) -> &mut Value {
        match self.frames.last_mut() {
            Some(frame) => frame.track(),
            None => panic!("No activation frame to track a value in"),
        }
    }

    /// Throw a formatted message. Prefer the [`throw!`](crate::throw) macro.
    pub fn throw_fmt(&mut self, args: fmt::Arguments<'_>) -> Unwind {
        let payload = match args.as_str() {
            Some(text) => Value::string(text),
            None => Value::string(args.to_string()),
        };
        self.rethrow(payload)
    }

    /// Throw a value.
    ///
    /// With a frame on the stack, the payload is moved into the top frame and
    /// the returned marker must be propagated to the handler. Without one the
    /// exception is uncaught: the message is written to stderr and the process
    /// exits with status 1.
    pub fn throw(&mut self, payload: impl Into<Value>) -> Unwind {
        self.rethrow(payload.into())
    }

    /// Forward an already-owned payload to the nearest handler.
    pub fn rethrow(&mut self, payload: Value) -> Unwind {
        let Some(top) = self.frames.last_mut() else {
            report_uncaught(&payload);
        };
        debug!(exception = %payload, location = %top.location, "throw");
        *top.track() = payload;
        Unwind { _in_flight: () }
    }

    /// Take the payload of the exception that unwound into the top frame.
    ///
    /// Pops the frame. The payload is re-attached to the parent frame, or,
    /// when there is none, stored in the root exception slot. The stack ends
    /// up exactly one frame shallower.
    ///
    /// # Panics
    ///
    /// Panics on an empty stack.
    pub fn catch(&mut self) -> Value {
        let mut frame = self.pop();
        let payload = frame.vars.pop().unwrap_or_default();
        debug!(exception = %payload, location = %frame.location, "catch");
        match self.frames.last_mut() {
            Some(parent) => {
                *parent.track() = payload.clone();
            }
            None => {
                self.root_exception.assign(&payload);
            }
        }
        drop(frame);
        payload
    }

    /// Run `body` in a cleanup scope.
    ///
    /// Values tracked by `body` are released when it returns. An exception
    /// keeps unwinding to the enclosing handler; if there is none it is
    /// reported and the process exits.
    #[track_caller]
    pub fn scope<T>(&mut self, body: impl FnOnce(&mut Self) -> Throws<T>) -> Throws<T> {
        let depth = self.frames.len();
        self.push();
        match body(self) {
            Ok(value) => {
                debug_assert_eq!(self.frames.len(), depth + 1, "unbalanced frames in scope");
                self.up();
                Ok(value)
            }
            Err(unwind) => {
                let payload = self.catch();
                if self.frames.is_empty() {
                    report_uncaught(&payload);
                }
                Err(unwind)
            }
        }
    }

    /// Run `body` in a handler scope, returning the caught payload if it
    /// throws.
    #[track_caller]
    pub fn try_catch<T>(&mut self, body: impl FnOnce(&mut Self) -> Throws<T>) -> Result<T, Value> {
        let depth = self.frames.len();
        self.push();
        match body(self) {
            Ok(value) => {
                debug_assert_eq!(self.frames.len(), depth + 1, "unbalanced frames in try_catch");
                self.up();
                Ok(value)
            }
            Err(_unwind) => Err(self.catch()),
        }
    }
}

fn report_uncaught(payload: &Value) -> ! {
    eprintln!("Uncaught exception: {}", payload);
    std::process::exit(1)
}

/// Throw a formatted exception on an [`Activation`], evaluating to the
/// [`Unwind`] marker:
///
/// ```ignore
/// return Err(throw!(cx, "no such key: {}", key));
/// ```
#[macro_export]
macro_rules! throw {
    ($cx:expr, $($arg:tt)+) => {
        $cx.throw_fmt(::std::format_args!($($arg)+))
    };
}
