use chromeaudit_cdp::browser_protocol::network;
use chromeaudit_cdp::js_protocol::debugger::ScriptId;

use crate::engine::frame::NavReason;
use crate::engine::Engine;
use crate::error::CdpError;

fn initiator_script_id(initiator: &network::Initiator) -> Option<ScriptId> {
    initiator
        .stack
        .as_ref()
        .and_then(|s| s.call_frames.first())
        .map(|cf| cf.script_id.clone())
}

pub async fn on_request_will_be_sent(
    engine: &Engine,
    event: network::EventRequestWillBeSent,
) -> Result<(), CdpError> {
    let Some(frame_id) = &event.frame_id else {
        return Ok(());
    };

    engine
        .frames
        .request_will_be_sent(
            frame_id,
            event.request_id.clone(),
            event.request.clone(),
            event.redirect_response.clone(),
        )
        .await;

    promote_script_attributed_navigation(engine, frame_id, &event).await;
    Ok(())
}

/// While a frame's NavigationTicket is waiting on a script-initiated
/// navigation, a matching GET to the destination URL attaches the issuing
/// script and its NetworkSession so the eventual navigate event can name
/// the initiating script.
async fn promote_script_attributed_navigation(
    engine: &Engine,
    frame_id: &chromeaudit_cdp::browser_protocol::page::FrameId,
    event: &network::EventRequestWillBeSent,
) {
    if event.request.method != "GET" {
        return;
    }
    let Some(frame) = engine.frames.get(frame_id).await else {
        return;
    };
    let ticket = &frame.navigation_status;
    if !ticket.on_scheduling || ticket.reason != Some(NavReason::Script) {
        return;
    }
    if ticket.destination_url.as_deref() != Some(event.request.url.as_str()) {
        return;
    }
    let Some(script_id) = initiator_script_id(&event.initiator) else {
        return;
    };
    let Some(script_record) = frame.scripts.get(&script_id).cloned() else {
        return;
    };
    let Some(session) = engine.frames.network_session(frame_id, &event.request_id).await else {
        return;
    };
    engine
        .frames
        .attribute_navigation_script(frame_id, script_record, session)
        .await;
}

pub async fn on_response_received(
    engine: &Engine,
    event: network::EventResponseReceived,
) -> Result<(), CdpError> {
    let Some(frame_id) = &event.frame_id else {
        return Ok(());
    };
    engine
        .frames
        .response_received(frame_id, &event.request_id, event.response.clone())
        .await;
    Ok(())
}
