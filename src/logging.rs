// ==========================================
// 日志系统初始化
// ==========================================
// 使用 tracing 和 tracing-subscriber
// 支持环境变量配置日志级别
// 默认: 导入核心 info，依赖库（rusqlite 等）只输出 warn
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 默认过滤指令（未设置 RUST_LOG 时）
pub const DEFAULT_DIRECTIVES: &str = "warn,crm_lead_import=info";

/// 测试过滤指令: 导入会话逐行日志（debug）可见
pub const TEST_DIRECTIVES: &str = "warn,crm_lead_import=debug";

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// 初始化日志系统
///
/// # 环境变量
/// - RUST_LOG: 日志级别过滤器（默认: [`DEFAULT_DIRECTIVES`]）
///   例如: RUST_LOG=debug 或 RUST_LOG=crm_lead_import::importer=trace
///
/// # 示例
/// ```no_run
/// use crm_lead_import::logging;
/// logging::init();
/// ```
pub fn init() {
    fmt()
        .with_env_filter(env_filter(DEFAULT_DIRECTIVES))
        .with_target(true)
        .with_line_number(true)
        .init();
}

/// 初始化 JSON 格式日志（供前端壳采集，含 submit 的 batch_id span 字段）
pub fn init_json() {
    fmt()
        .json()
        .with_env_filter(env_filter(DEFAULT_DIRECTIVES))
        .with_current_span(true)
        .init();
}

/// 初始化测试环境的日志系统
///
/// 输出到测试捕获；可重复调用
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new(TEST_DIRECTIVES))
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directives_are_valid() {
        assert!(EnvFilter::try_new(DEFAULT_DIRECTIVES).is_ok());
        assert!(EnvFilter::try_new(TEST_DIRECTIVES).is_ok());
    }

    #[test]
    fn test_init_test_is_idempotent() {
        init_test();
        init_test();
        tracing::debug!("logging initialised twice without panic");
    }
}
