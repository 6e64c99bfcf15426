use serde_json::json;

use chromeaudit_cdp::browser_protocol::target::SessionId;
use chromeaudit_cdp::js_protocol::debugger;

use crate::engine::Engine;
use crate::error::CdpError;
use crate::handlers::util::frame_id_for_target;

pub async fn on_script_parsed(
    engine: &Engine,
    session_id: Option<SessionId>,
    event: debugger::EventScriptParsed,
) -> Result<(), CdpError> {
    let Some(session_id) = session_id else {
        return Ok(());
    };
    let Some(target_id) = engine.sessions.target_for_session(&session_id).await else {
        return Ok(());
    };
    let frame_id = frame_id_for_target(&target_id);

    let flattened: Vec<_> = event
        .stack_trace
        .as_ref()
        .map(|s| s.flatten().into_iter().cloned().collect())
        .unwrap_or_default();

    let (spawn_parent, call_edges) = engine
        .frames
        .record_script_parsed(
            &frame_id,
            event.script_id.clone(),
            event.url.clone(),
            event.hash.clone(),
            &flattened,
        )
        .await;

    if let Some(parent_id) = spawn_parent {
        engine
            .emit(
                "[Script Spawn Script]",
                json!({
                    "parentScriptId": parent_id.to_string(),
                    "childScriptId": event.script_id.to_string(),
                    "targetId": target_id.as_ref(),
                }),
            )
            .await;
    }

    for (caller, callee) in call_edges {
        engine
            .emit(
                "[Script Call Script]",
                json!({
                    "callerScriptId": caller.to_string(),
                    "calleeScriptId": callee.to_string(),
                    "targetId": target_id.as_ref(),
                }),
            )
            .await;
    }

    let is_extension_scheme = event
        .url
        .split(':')
        .next()
        .map(|scheme| scheme.ends_with("-extension"))
        .unwrap_or(false);

    if !is_extension_scheme {
        engine
            .emit(
                "[Frame Execute Script]",
                json!({
                    "scriptId": event.script_id.to_string(),
                    "url": event.url,
                    "targetId": target_id.as_ref(),
                }),
            )
            .await;
    }

    Ok(())
}
