use serde_json::json;

use chromeaudit_cdp::browser_protocol::page;

use crate::engine::Engine;
use crate::error::CdpError;

pub async fn on_frame_attached(
    engine: &Engine,
    event: page::EventFrameAttached,
) -> Result<(), CdpError> {
    let (child_uid, _) = engine.frames.ensure_urgent(&event.frame_id).await;
    let (parent_uid, _) = engine.frames.ensure_urgent(&event.parent_frame_id).await;

    engine
        .emit(
            "[Frame Attach to Frame]",
            json!({
                "childFrameId": event.frame_id.as_ref(),
                "childUid": child_uid.to_string(),
                "parentFrameId": event.parent_frame_id.as_ref(),
                "parentUid": parent_uid.to_string(),
            }),
        )
        .await;

    if let Some(stack) = &event.stack {
        let flattened = stack.flatten();
        let parent_record = engine.frames.get(&event.parent_frame_id).await;
        let spawning_script = parent_record.as_ref().and_then(|record| {
            flattened
                .iter()
                .find(|cf| record.scripts.contains_key(&cf.script_id))
                .map(|cf| cf.script_id.clone())
        });

        if let Some(script_id) = spawning_script {
            engine
                .emit(
                    "[Script Create Sub-Frame]",
                    json!({
                        "scriptId": script_id.to_string(),
                        "childFrameId": event.frame_id.as_ref(),
                        "childUid": child_uid.to_string(),
                    }),
                )
                .await;
        }
    }

    Ok(())
}
