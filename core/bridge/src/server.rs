//! HTTP boundary: decodes notifications and queues them for the worker.
//!
//! Responses are sent as soon as a notification is queued, so an update's
//! 200 precedes the presence call (and any reconnect pauses).

use geo_presence_protocol::{
    parse_notification, Action, Notification, CLOSE_CONFIRMATION, MAX_REQUEST_BYTES,
};
use std::io::Read;
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};
use tiny_http::{Method, Request, Response, Server};
use tracing::{debug, error, info, warn};

use crate::orchestrator::Orchestrator;
use crate::presence::PresenceService;

const INVALID_METHOD: &str = "Invalid request method";
const WORKER_GONE: &str = "Presence worker unavailable";

/// Outcome of routing one request, before anything is sent.
#[derive(Debug, PartialEq, Eq)]
pub struct Routed {
    pub status: u16,
    pub body: String,
    pub notification: Option<Notification>,
}

impl Routed {
    fn reply(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            notification: None,
        }
    }
}

pub fn route(method: &Method, body: &[u8]) -> Routed {
    if *method != Method::Post {
        debug!(method = %method, "Invalid request method");
        return Routed::reply(405, INVALID_METHOD);
    }

    let notification = match parse_notification(body) {
        Ok(notification) => notification,
        Err(err) => {
            debug!(code = %err.code, message = %err.message, "Failed to parse request body");
            return Routed::reply(400, err.message);
        }
    };

    let body = match notification.action {
        Action::Close => CLOSE_CONFIRMATION,
        Action::Update => "",
    };
    Routed {
        status: 200,
        body: body.to_string(),
        notification: Some(notification),
    }
}

pub fn bind(addr: &str) -> Result<Server, String> {
    Server::http(addr).map_err(|err| format!("Failed to bind {}: {}", addr, err))
}

/// Serves requests until the listener closes.
pub fn serve(server: Server, queue: Sender<Notification>) {
    for mut request in server.incoming_requests() {
        let body = match read_body(&mut request) {
            Ok(body) => body,
            Err(message) => {
                warn!(error = %message, "Failed to read request body");
                respond(request, Routed::reply(400, message));
                continue;
            }
        };

        let mut routed = route(request.method(), &body);
        if let Some(notification) = routed.notification.take() {
            info!(
                action = ?notification.action,
                url = %notification.url,
                "Received notification"
            );
            if queue.send(notification).is_err() {
                error!("Presence worker has stopped; rejecting notification");
                routed = Routed::reply(503, WORKER_GONE);
            }
        }
        respond(request, routed);
    }
}

fn read_body(request: &mut Request) -> Result<Vec<u8>, String> {
    let mut body = Vec::new();
    request
        .as_reader()
        .take(MAX_REQUEST_BYTES as u64 + 1)
        .read_to_end(&mut body)
        .map_err(|err| format!("failed to read request: {}", err))?;
    Ok(body)
}

fn respond(request: Request, routed: Routed) {
    let response = Response::from_string(routed.body).with_status_code(routed.status);
    if let Err(err) = request.respond(response) {
        debug!(error = %err, "Failed to send response");
    }
}

/// Runs the orchestrator on its own thread, one notification at a time.
pub fn spawn_worker<P>(mut orchestrator: Orchestrator<P>) -> (Sender<Notification>, JoinHandle<()>)
where
    P: PresenceService + 'static,
{
    let (tx, rx) = mpsc::channel::<Notification>();
    let handle = thread::spawn(move || {
        while let Ok(first) = rx.recv() {
            let mut pending = vec![first];
            pending.extend(rx.try_iter());
            let received = pending.len();
            let batch = coalesce(pending);
            if batch.len() < received {
                debug!(received, kept = batch.len(), "Skipping superseded updates");
            }

            for notification in batch {
                match orchestrator.handle(&notification.url, notification.action) {
                    Ok(handled) => debug!(?handled, "Notification handled"),
                    Err(err) => warn!(error = %err, "Notification dropped"),
                }
            }
        }
        debug!("Notification queue closed");
    });
    (tx, handle)
}

/// Collapses each run of consecutive updates to its latest. Closes are kept
/// in place so a session still ends between the updates around it.
fn coalesce(pending: Vec<Notification>) -> Vec<Notification> {
    let mut kept: Vec<Notification> = Vec::with_capacity(pending.len());
    for notification in pending {
        match kept.last_mut() {
            Some(last)
                if last.action == Action::Update && notification.action == Action::Update =>
            {
                *last = notification;
            }
            _ => kept.push(notification),
        }
    }
    kept
}
