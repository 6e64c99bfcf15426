use serde_json::json;

use chromeaudit_cdp::browser_protocol::target::{
    self, AttachToTargetParams, SessionId, SetAutoAttachParams, SetDiscoverTargetsParams,
};
use chromeaudit_cdp::browser_protocol::{browser, dom, network as net_proto, page};
use chromeaudit_cdp::js_protocol::{debugger, runtime};

use crate::engine::Engine;
use crate::error::CdpError;
use crate::handlers::util::frame_id_for_target;

pub async fn on_target_created(
    engine: &Engine,
    event: target::EventTargetCreated,
) -> Result<(), CdpError> {
    let info = event.target_info;
    if !target::ATTACHABLE_TYPES.contains(&info.target_type.as_str()) {
        return Ok(());
    }
    // The Pending guard suppresses duplicate `targetCreated` notifications:
    // only the call that actually inserts the entry proceeds to attach.
    if !engine.sessions.begin_attach(&info.target_id).await {
        return Ok(());
    }
    let params = AttachToTargetParams::new(info.target_id.clone());
    engine.cmd.send(&params, None).await?;
    Ok(())
}

pub async fn on_target_destroyed(
    engine: &Engine,
    event: target::EventTargetDestroyed,
) -> Result<(), CdpError> {
    let session_id = engine.sessions.release_target(&event.target_id).await;
    let frame_id = frame_id_for_target(&event.target_id);
    let removed = engine.frames.destroy(&frame_id).await;
    if let Some(record) = &removed {
        engine.nav.remove_for_uid(&record.uid).await;
    }
    engine
        .emit(
            "[Target Destroyed]",
            json!({
                "targetId": event.target_id.as_ref(),
                "sessionId": session_id.map(|s| s.as_ref().to_string()),
            }),
        )
        .await;
    Ok(())
}

pub async fn on_attached_to_target(
    engine: &Engine,
    event: target::EventAttachedToTarget,
) -> Result<(), CdpError> {
    let info = event.target_info;
    engine
        .sessions
        .complete_attach(&info.target_id, event.session_id.clone())
        .await;

    let target_type = info.target_type.as_str();
    if target_type == "page" || target_type == "iframe" {
        reconcile_frame(engine, &info).await;
    }

    send_init_sequence(engine, &event.session_id, target_type).await?;
    Ok(())
}

async fn reconcile_frame(engine: &Engine, info: &target::TargetInfo) {
    let frame_id = frame_id_for_target(&info.target_id);
    let opener_uid = match &info.opener_id {
        Some(opener_id) => {
            let opener_frame_id = frame_id_for_target(opener_id);
            engine
                .frames
                .get(&opener_frame_id)
                .await
                .map(|f| f.uid)
        }
        None => None,
    };

    let is_main_frame = info.target_type == "page";
    let was_urgent = engine.frames.is_urgent(&frame_id).await;

    let reconciled = engine
        .frames
        .reconcile_attached(
            &frame_id,
            Some(info.title.clone()),
            Some(info.url.clone()),
            is_main_frame,
            opener_uid,
        )
        .await;

    engine
        .emit(
            "[Frame Info Update to]",
            json!({
                "frameId": info.target_id.as_ref(),
                "uid": reconciled.uid.to_string(),
                "title": info.title,
                "url": info.url,
            }),
        )
        .await;

    // Fires once per FrameRecord's first real announcement; whether it was
    // opened by another frame only decides Main vs Sub, not whether it
    // fires at all.
    if was_urgent != Some(false) {
        let event_name = if is_main_frame {
            "[Main Frame Created]"
        } else {
            "[Sub-Frame Created]"
        };
        engine
            .emit(
                event_name,
                json!({
                    "frameId": info.target_id.as_ref(),
                    "uid": reconciled.uid.to_string(),
                    "url": info.url,
                }),
            )
            .await;
    }
}

pub async fn on_target_info_changed(
    engine: &Engine,
    session_id: Option<target::SessionId>,
    event: target::EventTargetInfoChanged,
) -> Result<(), CdpError> {
    let info = event.target_info;
    // Only accept the update if it came from the session this collector
    // recorded for the target; stray updates from a detached session are
    // dropped.
    let recorded = engine.sessions.session_id(&info.target_id).await;
    if let (Some(sid), Some(recorded_sid)) = (&session_id, &recorded) {
        if sid != recorded_sid {
            return Ok(());
        }
    }

    let frame_id = frame_id_for_target(&info.target_id);
    if let Some(reconciled) = engine
        .frames
        .update_info(&frame_id, info.title.clone(), info.url.clone())
        .await
    {
        if reconciled.rotated {
            engine
                .emit(
                    "[Frame Info Update to]",
                    json!({
                        "frameId": info.target_id.as_ref(),
                        "uid": reconciled.uid.to_string(),
                        "title": info.title,
                        "url": info.url,
                    }),
                )
                .await;
        }
    }
    Ok(())
}

/// The fixed command sequence issued on every newly attached session, per
/// the external interfaces contract. `Browser.setDownloadBehavior` is only
/// sent for the browser target itself.
async fn send_init_sequence(
    engine: &Engine,
    session_id: &SessionId,
    target_type: &str,
) -> Result<(), CdpError> {
    let sid = Some(session_id.as_ref().to_string());

    engine
        .cmd
        .send(&SetAutoAttachParams::disabled_flatten(), sid.clone())
        .await?;
    engine
        .cmd
        .send(&SetDiscoverTargetsParams::new(true), sid.clone())
        .await?;
    engine.cmd.send(&page::EnableParams {}, sid.clone()).await?;
    engine
        .cmd
        .send(&net_proto::EnableParams {}, sid.clone())
        .await?;
    engine
        .cmd
        .send(&net_proto::SetAttachDebugStackParams::new(true), sid.clone())
        .await?;
    engine
        .cmd
        .send(&debugger::EnableParams {}, sid.clone())
        .await?;
    engine
        .cmd
        .send(&debugger::SetAsyncCallStackDepthParams::new(20), sid.clone())
        .await?;
    engine
        .cmd
        .send(&runtime::EnableParams {}, sid.clone())
        .await?;
    engine
        .cmd
        .send(&runtime::SetAsyncCallStackDepthParams::new(20), sid.clone())
        .await?;
    engine
        .cmd
        .send(
            &page::SetInterceptFileChooserDialogParams::new(true),
            sid.clone(),
        )
        .await?;
    engine.cmd.send(&dom::EnableParams {}, sid.clone()).await?;
    engine
        .cmd
        .send(&dom::SetNodeStackTracesEnabledParams::new(true), sid.clone())
        .await?;
    engine.cmd.send(&dom::FocusParams {}, sid.clone()).await?;

    if target_type == "browser" {
        engine
            .cmd
            .send(&browser::SetDownloadBehaviorParams::allow_with_events(), sid)
            .await?;
    }

    Ok(())
}
