use chromeaudit_cdp::browser_protocol::page::FrameId;
use chromeaudit_cdp::browser_protocol::target::TargetId;

/// CDP's page/iframe target id and the target's main frame id are the same
/// identifier; this collector relies on that to key `FrameRecord`s for page
/// targets without maintaining a separate frame tree.
pub fn frame_id_for_target(target_id: &TargetId) -> FrameId {
    FrameId::from(target_id.as_ref().to_string())
}
