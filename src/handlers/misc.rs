use serde_json::json;

use chromeaudit_cdp::browser_protocol::{browser, page};

use crate::engine::Engine;
use crate::error::CdpError;

pub async fn on_page_download_will_begin(
    engine: &Engine,
    event: page::EventDownloadWillBegin,
) -> Result<(), CdpError> {
    emit_download(engine, event.frame_id, event.guid, event.url, event.suggested_filename).await;
    Ok(())
}

pub async fn on_browser_download_will_begin(
    engine: &Engine,
    event: browser::EventDownloadWillBegin,
) -> Result<(), CdpError> {
    emit_download(engine, event.frame_id, event.guid, event.url, event.suggested_filename).await;
    Ok(())
}

async fn emit_download(
    engine: &Engine,
    frame_id: Option<page::FrameId>,
    guid: String,
    url: String,
    suggested_filename: String,
) {
    let uid = match &frame_id {
        Some(id) => engine.frames.get(id).await.map(|f| f.uid.to_string()),
        None => None,
    };
    engine
        .emit(
            "[File Download Start]",
            json!({
                "frameId": frame_id.map(|f| f.as_ref().to_string()),
                "uid": uid,
                "guid": guid,
                "url": url,
                "suggestedFilename": suggested_filename,
            }),
        )
        .await;
}

pub async fn on_file_chooser_opened(
    engine: &Engine,
    event: page::EventFileChooserOpened,
) -> Result<(), CdpError> {
    let uid = engine.frames.get(&event.frame_id).await.map(|f| f.uid.to_string());
    engine
        .emit(
            "[File Chooser Opened]",
            json!({
                "frameId": event.frame_id.as_ref(),
                "uid": uid,
                "mode": format!("{:?}", event.mode),
                "backendNodeId": event.backend_node_id,
            }),
        )
        .await;
    Ok(())
}
