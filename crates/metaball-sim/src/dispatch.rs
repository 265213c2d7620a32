//! Foreground input dispatch.

use std::sync::Arc;

use metaball_core::input::{Bindings, EventKind, KeySymbol};

use crate::fixed_rate::LoopState;
use crate::telemetry::TelemetrySink;

/// Routes `(key, kind)` events to the binding table. Cheap to clone and
/// safe to move to an input thread.
///
/// While the telemetry loop is enabled and alive, every event is echoed
/// to the telemetry sink before it is dispatched, bound or not.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    bindings: Arc<Bindings>,
    echo: Option<(TelemetrySink, Arc<LoopState>)>,
}

impl Dispatcher {
    pub fn new(bindings: Arc<Bindings>, echo: Option<(TelemetrySink, Arc<LoopState>)>) -> Self {
        Self { bindings, echo }
    }

    /// Returns whether a bound action ran.
    pub fn dispatch(&self, key: &KeySymbol, kind: EventKind) -> bool {
        if let Some((sink, telemetry)) = &self.echo {
            if telemetry.is_alive() {
                sink.echo_event(kind, key);
            }
        }

        let handled = self.bindings.dispatch(key, kind);
        if !handled {
            log::trace!("no binding for {kind} {key}");
        }
        handled
    }

    /// Whether events are echoed to a telemetry sink at all.
    pub fn echoes(&self) -> bool {
        self.echo.is_some()
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }
}
