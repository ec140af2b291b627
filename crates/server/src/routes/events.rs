use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Extension,
};
use futures::stream::{self, Stream};
use tracing::{debug, warn};

use service::events::{ChangeSubscription, Received};

use crate::routes::auth::{CurrentUser, ServerState};

fn to_sse(received: Received) -> Event {
    match received {
        Received::Event(change) => match Event::default().event(change.kind.as_str()).json_data(&change) {
            Ok(ev) => ev,
            Err(e) => {
                warn!(err = %e, "change event encode failed");
                Event::default().comment("encode error")
            }
        },
        // clients should refetch everything
        Received::Lagged(skipped) => Event::default().event("lagged").data(skipped.to_string()),
    }
}

/// Turns a subscription into an endless SSE stream that ends only when the hub does.
pub fn change_stream(sub: ChangeSubscription) -> impl Stream<Item = Result<Event, Infallible>> {
    stream::unfold(sub, |mut sub| async move {
        let received = sub.recv().await?;
        Some((Ok(to_sse(received)), sub))
    })
}

#[utoipa::path(get, path = "/events", tag = "events", security(("bearer" = [])),
    responses((status = 200, description = "text/event-stream of the caller's changes")))]
pub async fn stream(
    State(state): State<ServerState>,
    Extension(me): Extension<CurrentUser>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!(user_id = me.id, subscribers = state.hub.subscriber_count() + 1, "events subscriber connected");
    Sse::new(change_stream(state.hub.subscribe(me.id))).keep_alive(KeepAlive::default())
}
