//! Task Context - 任务消息解析
//!
//! 后端以 `"<stage>: <detail>"` 的格式上报进度消息，UI 需要分别展示 stage 和 detail

/// 没有 stage 前缀时使用的默认 stage
pub const DEFAULT_STAGE: &str = "processing";

/// 活动任务消息为空时的默认文案
pub const DEFAULT_ACTIVE_MESSAGE: &str = "Processing...";

/// 进度停滞被本地判定失败时写入的消息
pub const STALE_TASK_MESSAGE: &str = "Task appears to have stopped (no progress)";

const STAGE_SEPARATOR: &str = ": ";

/// 拆分任务消息为 (stage, message)
///
/// - 包含 `": "` 时，第一次出现之前的部分为 stage，其余为 message
/// - 否则 stage 为 `"processing"`，message 原样返回（为空时返回 `"Processing..."`）
pub fn split_stage_message(message: Option<&str>) -> (String, String) {
    let message = message.unwrap_or_default();

    if let Some((stage, detail)) = message.split_once(STAGE_SEPARATOR) {
        return (stage.to_string(), detail.to_string());
    }

    let detail = if message.is_empty() {
        DEFAULT_ACTIVE_MESSAGE
    } else {
        message
    };
    (DEFAULT_STAGE.to_string(), detail.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_on_first_separator() {
        let (stage, message) = split_stage_message(Some("tagging: sentence 3: of 10"));
        assert_eq!(stage, "tagging");
        assert_eq!(message, "sentence 3: of 10");
    }

    #[test]
    fn test_no_separator_keeps_message() {
        let (stage, message) = split_stage_message(Some("loading model"));
        assert_eq!(stage, DEFAULT_STAGE);
        assert_eq!(message, "loading model");
    }

    #[test]
    fn test_colon_without_space_is_not_a_separator() {
        let (stage, message) = split_stage_message(Some("step:1"));
        assert_eq!(stage, DEFAULT_STAGE);
        assert_eq!(message, "step:1");
    }

    #[test]
    fn test_empty_and_missing_message() {
        assert_eq!(
            split_stage_message(Some("")),
            (DEFAULT_STAGE.to_string(), DEFAULT_ACTIVE_MESSAGE.to_string())
        );
        assert_eq!(
            split_stage_message(None),
            (DEFAULT_STAGE.to_string(), DEFAULT_ACTIVE_MESSAGE.to_string())
        );
    }

    #[test]
    fn test_empty_detail_after_stage() {
        let (stage, message) = split_stage_message(Some("usas: "));
        assert_eq!(stage, "usas");
        assert_eq!(message, "");
    }
}
