use std::collections::{HashMap, VecDeque};
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use acp_protocol::{HostEvent, PermissionOutcome, PermissionResponse};
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::app::{App, HostOps};

#[derive(Debug)]
pub enum Input {
    Host(HostEvent),
    /// A permission-bearing event whose host waits on `responder`.
    Permission {
        event: HostEvent,
        responder: oneshot::Sender<PermissionOutcome>,
    },
    Line(String),
}

/// Serializes every transcript mutation through one queue.
///
/// Producers on any thread enqueue host events and user lines; whichever
/// caller finds work drains it under the drain lock, so events reach `App`
/// strictly in arrival order.
pub struct TranscriptController {
    app: Arc<Mutex<App>>,
    pending_inputs: Mutex<VecDeque<Input>>,
    drain_lock: Mutex<()>,
    pending_responses: Mutex<HashMap<String, oneshot::Sender<PermissionOutcome>>>,
    outbound: Mutex<Box<dyn Write + Send>>,
    render_requested: AtomicBool,
    stop_requested: AtomicBool,
}

impl TranscriptController {
    /// Creates a controller writing `response:` locations to `outbound`, one per line.
    pub fn new(app: Arc<Mutex<App>>, outbound: Box<dyn Write + Send>) -> Arc<Self> {
        Arc::new(Self {
            app,
            pending_inputs: Mutex::new(VecDeque::new()),
            drain_lock: Mutex::new(()),
            pending_responses: Mutex::new(HashMap::new()),
            outbound: Mutex::new(outbound),
            render_requested: AtomicBool::new(false),
            stop_requested: AtomicBool::new(false),
        })
    }

    pub fn app(&self) -> &Arc<Mutex<App>> {
        &self.app
    }

    /// Queues one input and applies everything queued so far.
    pub fn submit(self: &Arc<Self>, input: Input) -> usize {
        lock_unpoisoned(&self.pending_inputs).push_back(input);
        self.flush_pending_inputs()
    }

    pub fn submit_host_event(self: &Arc<Self>, event: HostEvent) -> usize {
        self.submit(Input::Host(event))
    }

    pub fn submit_line(self: &Arc<Self>, line: impl Into<String>) -> usize {
        self.submit(Input::Line(line.into()))
    }

    /// Queues a permission request and returns the host's completion handle.
    ///
    /// The handle resolves with `selected` once the user chooses, or with
    /// `cancelled` when the session rejects the request, is cleared, or the
    /// request is superseded.
    pub fn request_permission(
        self: &Arc<Self>,
        event: HostEvent,
    ) -> oneshot::Receiver<PermissionOutcome> {
        let (responder, receiver) = oneshot::channel();
        self.submit(Input::Permission { event, responder });
        receiver
    }

    /// Routes one host JSON line; permission requests get a completion handle.
    ///
    /// Lines that do not parse are handed to `App`, which reports them.
    pub fn submit_host_line(
        self: &Arc<Self>,
        line: &str,
    ) -> Option<oneshot::Receiver<PermissionOutcome>> {
        match HostEvent::from_json_line(line) {
            Ok(event) if awaits_permission(&event) => Some(self.request_permission(event)),
            Ok(event) => {
                self.submit_host_event(event);
                None
            }
            Err(_) => {
                self.submit_line(line);
                None
            }
        }
    }

    /// Applies queued inputs in order and returns how many were applied.
    pub fn flush_pending_inputs(self: &Arc<Self>) -> usize {
        let _drain = lock_unpoisoned(&self.drain_lock);
        let mut drained = 0usize;
        let mut host = Arc::clone(self);

        loop {
            let input = lock_unpoisoned(&self.pending_inputs).pop_front();
            let Some(input) = input else {
                break;
            };

            let mut app = lock_unpoisoned(&self.app);
            match input {
                Input::Host(event) => {
                    app.on_host_event(event, &mut host);
                }
                Input::Permission { event, responder } => {
                    let tool_call_id = event.tool_call_id().map(str::to_string);
                    if app.on_host_event(event, &mut host) {
                        self.register_responder(tool_call_id, responder);
                    } else {
                        debug!(?tool_call_id, "cancelling rejected host permission request");
                        let _ = responder.send(PermissionOutcome::Cancelled);
                    }
                }
                Input::Line(line) => app.on_input_line(&line, &mut host),
            }
            drained += 1;
        }

        drained
    }

    pub fn pending_response_count(&self) -> usize {
        lock_unpoisoned(&self.pending_responses).len()
    }

    /// Returns and clears the render request flag.
    pub fn take_render_request(&self) -> bool {
        self.render_requested.swap(false, Ordering::SeqCst)
    }

    pub fn stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }

    /// Tracks the host completion for an applied request; a request it supersedes is cancelled.
    fn register_responder(
        &self,
        tool_call_id: Option<String>,
        responder: oneshot::Sender<PermissionOutcome>,
    ) {
        let Some(tool_call_id) = tool_call_id else {
            let _ = responder.send(PermissionOutcome::Cancelled);
            return;
        };
        let previous =
            lock_unpoisoned(&self.pending_responses).insert(tool_call_id.clone(), responder);
        if let Some(previous) = previous {
            debug!(tool_call_id = %tool_call_id, "cancelling superseded host permission request");
            let _ = previous.send(PermissionOutcome::Cancelled);
        }
    }

    fn complete_response(&self, response: &PermissionResponse) {
        let sender = lock_unpoisoned(&self.pending_responses).remove(&response.tool_call_id);
        match sender {
            Some(sender) => {
                if sender.send(response.outcome()).is_err() {
                    debug!(
                        tool_call_id = %response.tool_call_id,
                        "host stopped waiting for permission outcome"
                    );
                }
            }
            None => debug!(
                tool_call_id = %response.tool_call_id,
                "no pending host request for permission response"
            ),
        }
    }

    fn write_outbound(&self, response: &PermissionResponse) {
        let mut outbound = lock_unpoisoned(&self.outbound);
        let written = writeln!(outbound, "{}", response.to_location()).and_then(|()| outbound.flush());
        if let Err(error) = written {
            warn!(error = %error, "failed to write permission response");
        }
    }
}

impl HostOps for Arc<TranscriptController> {
    fn send_response(&mut self, response: PermissionResponse) {
        self.complete_response(&response);
        self.write_outbound(&response);
    }

    fn cancel_pending(&mut self) {
        let pending = std::mem::take(&mut *lock_unpoisoned(&self.pending_responses));
        for (tool_call_id, sender) in pending {
            debug!(tool_call_id = %tool_call_id, "cancelling pending host permission request");
            let _ = sender.send(PermissionOutcome::Cancelled);
        }
    }

    fn request_render(&mut self) {
        self.render_requested.store(true, Ordering::SeqCst);
    }

    fn request_stop(&mut self) {
        self.stop_requested.store(true, Ordering::SeqCst);
    }
}

fn awaits_permission(event: &HostEvent) -> bool {
    matches!(
        event,
        HostEvent::PermissionRequest { .. } | HostEvent::ToolCall { options: Some(_), .. }
    )
}

pub fn lock_unpoisoned<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
