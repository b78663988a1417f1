use elgoose_fetch::{ClientEvent, ClientEventReceiver, Endpoint, FetchError};
use tokio::task::JoinHandle;

/// Parse endpoint names from the command line, falling back to `defaults`
/// when none were given.
pub fn parse_endpoints(names: &[String], defaults: &[&str]) -> Result<Vec<Endpoint>, FetchError> {
    if names.is_empty() {
        return defaults.iter().map(|name| Endpoint::new(name)).collect();
    }
    names
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(Endpoint::new)
        .collect()
}

/// Format a count with thousands separators, e.g. `12,345`.
pub fn format_count(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Print client request events as they happen.
///
/// The task ends once every sender is dropped; await the handle after
/// dropping the client so queued events are flushed before exit.
pub fn spawn_event_printer(mut events: ClientEventReceiver) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                ClientEvent::RequestStarted {
                    request,
                    timeout_secs,
                } => {
                    println!(
                        "   📡 {} (timeout {timeout_secs}s)",
                        request.short_description()
                    );
                }
                ClientEvent::RequestCompleted {
                    request,
                    status_code,
                    duration_ms,
                } => {
                    println!(
                        "   📥 {} -> {status_code} in {duration_ms}ms",
                        request.short_description()
                    );
                }
                ClientEvent::RequestFailed {
                    request,
                    error,
                    duration_ms,
                } => {
                    println!(
                        "   💥 {} failed after {duration_ms}ms: {error}",
                        request.short_description()
                    );
                }
            }
        }
    })
}
