use actix_web::{http::header, web, HttpResponse};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::state::{AppState, ServerEvent};

/// Live feed of new leads, reviews and appointment changes for the
/// back-office. Lagged receivers skip what they missed.
pub async fn stream_events(state: web::Data<AppState>) -> HttpResponse {
    let rx = state.events.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(event) => Some(Ok::<web::Bytes, actix_web::Error>(event_to_bytes(&event))),
        Err(err) => {
            log::debug!("Event stream lagged: {err}");
            None
        }
    });

    HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "text/event-stream"))
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .streaming(stream)
}

fn event_to_bytes(event: &ServerEvent) -> web::Bytes {
    let payload = serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string());
    web::Bytes::from(format!("event: update\ndata: {}\n\n", payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_framed_for_sse() {
        let event = ServerEvent {
            kind: "lead_created".to_string(),
            entity_id: "abc".to_string(),
            summary: "New enquiry".to_string(),
        };
        let bytes = event_to_bytes(&event);
        let text = std::str::from_utf8(&bytes).unwrap();
        assert!(text.starts_with("event: update\ndata: {"));
        assert!(text.contains(r#""kind":"lead_created""#));
        assert!(text.ends_with("\n\n"));
    }
}
