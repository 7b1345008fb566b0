// ABOUTME: Generic trapping operations that absorb errors and panics into outcomes
// ABOUTME: Logs full fault detail at debug and a one-line summary at error level

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use tracing::subscriber::NoSubscriber;
use tracing::{debug, error};

use super::failure::{Failure, Outcome};

/// Run `operation`, converting a returned error or a panic into a [`Failure`]
/// whose message starts with `context`.
pub fn attempt<T, E, F>(context: &str, operation: F) -> Outcome<T>
where
    F: FnOnce() -> Result<T, E>,
    E: fmt::Display + fmt::Debug,
{
    match panic::catch_unwind(AssertUnwindSafe(operation)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(fault)) => Err(absorb(context, &fault)),
        Err(payload) => Err(absorb(context, &PanicFault::from_payload(payload))),
    }
}

/// Like [`attempt`], but `cleanup` runs after the primary operation on every
/// exit path. A failing cleanup is logged and otherwise ignored; the returned
/// outcome is always the primary one.
pub fn attempt_with_cleanup<T, E, F, CE, C>(context: &str, operation: F, cleanup: C) -> Outcome<T>
where
    F: FnOnce() -> Result<T, E>,
    E: fmt::Display + fmt::Debug,
    C: FnOnce() -> Result<(), CE>,
    CE: fmt::Display + fmt::Debug,
{
    let outcome = attempt(context, operation);

    let cleanup_context = format!("{} (cleanup)", context);
    if let Err(failure) = attempt(&cleanup_context, cleanup) {
        debug!(
            "Ignoring cleanup failure, primary outcome was {}: {}",
            if outcome.is_ok() { "success" } else { "failure" },
            failure
        );
    }

    outcome
}

/// Trap an operation whose only interesting result is whether it failed.
pub fn attempt_unit<E, F>(context: &str, operation: F) -> Option<Failure>
where
    F: FnOnce() -> Result<(), E>,
    E: fmt::Display + fmt::Debug,
{
    attempt(context, operation).err()
}

/// Report panics through `tracing` instead of the default stderr hook. Until a
/// subscriber is active on the panicking thread the previous hook still runs.
pub fn install_panic_hook() {
    let fallback = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let unobserved =
            tracing::dispatcher::get_default(|dispatch| dispatch.is::<NoSubscriber>());
        if unobserved {
            fallback(info);
            return;
        }

        let location = info
            .location()
            .map(|location| location.to_string())
            .unwrap_or_else(|| "unknown location".to_string());
        error!("Panic at {}: {}", location, payload_message(info.payload()));
    }));
}

fn absorb<E>(context: &str, fault: &E) -> Failure
where
    E: fmt::Display + fmt::Debug + ?Sized,
{
    debug!("{} failed: {:?}", context, fault);
    // `{:#}` renders the whole cause chain on one line for anyhow errors
    let summary = format!("{:#}", fault);
    error!("{}: {}", context, summary);
    Failure::with_context(context, summary)
}

struct PanicFault {
    message: String,
}

impl PanicFault {
    fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        Self {
            message: payload_message(payload.as_ref()),
        }
    }
}

fn payload_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

impl fmt::Display for PanicFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "panicked: {}", self.message)
    }
}

impl fmt::Debug for PanicFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanicFault")
            .field("message", &self.message)
            .finish()
    }
}
