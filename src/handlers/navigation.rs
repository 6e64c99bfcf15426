use serde_json::json;

use chromeaudit_cdp::browser_protocol::page;

use crate::engine::frame::{NavReason, NavigationTicket};
use crate::engine::nav::normalize_reason;
use crate::engine::Engine;
use crate::error::CdpError;

pub async fn on_frame_requested_navigation(
    engine: &Engine,
    event: page::EventFrameRequestedNavigation,
) -> Result<(), CdpError> {
    let (uid, _) = engine.frames.ensure_urgent(&event.frame_id).await;
    let reason = normalize_reason(event.reason);

    engine
        .nav
        .schedule(uid, reason, event.url.clone(), Some(event.disposition))
        .await;
    engine
        .frames
        .set_navigation_ticket(
            &event.frame_id,
            NavigationTicket {
                on_scheduling: true,
                reason: Some(reason),
                destination_url: Some(event.url),
                script: None,
                network_session: None,
            },
        )
        .await;
    Ok(())
}

pub async fn on_frame_scheduled_navigation(
    engine: &Engine,
    event: page::EventFrameScheduledNavigation,
) -> Result<(), CdpError> {
    let (uid, _) = engine.frames.ensure_urgent(&event.frame_id).await;
    let reason = normalize_reason(event.reason);

    engine.nav.schedule(uid, reason, event.url.clone(), None).await;
    engine
        .frames
        .set_navigation_ticket(
            &event.frame_id,
            NavigationTicket {
                on_scheduling: true,
                reason: Some(reason),
                destination_url: Some(event.url),
                script: None,
                network_session: None,
            },
        )
        .await;
    Ok(())
}

pub async fn on_frame_navigated(
    engine: &Engine,
    event: page::EventFrameNavigated,
) -> Result<(), CdpError> {
    let frame = event.frame;
    let frame_id = frame.id.clone();

    let existing = engine.frames.get(&frame_id).await;
    let was_known = existing.is_some();
    let attributed_script = existing.and_then(|r| r.navigation_status.script);

    let (previous_uid, new_uid) = engine
        .frames
        .navigate(&frame_id, frame.loader_id.clone(), frame.url.clone())
        .await;

    let scheduled = engine.nav.take(&previous_uid).await;

    let reason = match &scheduled {
        Some(entry) => entry.reason,
        None if was_known => NavReason::User,
        None => NavReason::Other,
    };

    let event_name: &'static str = match reason {
        NavReason::User => "[Frame Navigate by User]",
        NavReason::Script => "[Frame Navigate by Script]",
        NavReason::Http => "[Frame Navigate by HTTP]",
        NavReason::Html => "[Frame Navigate by HTML]",
        NavReason::Other => "[Frame Navigate by Other]",
    };

    engine
        .emit(
            event_name,
            json!({
                "frameId": frame_id.as_ref(),
                "uid": new_uid.to_string(),
                "url": frame.url,
                "destinationUrl": scheduled.map(|e| e.destination_url),
                "script": attributed_script.map(|s| s.content_hash),
            }),
        )
        .await;
    Ok(())
}
