/// 工厂约定常量
///
/// 名称前缀和保留 Bean 名称集中在这里定义，
/// 工厂和上下文使用同一组标识符

/// FactoryBean 解引用前缀
///
/// `get_bean("&name")` 返回工厂本身而不是它生产的对象
pub const FACTORY_BEAN_PREFIX: &str = "&";

/// 上下文刷新时按此名称查找消息源
pub const MESSAGE_SOURCE_BEAN_NAME: &str = "messageSource";

/// 检查名称是否带有解引用前缀
///
/// # Example
/// ```
/// use chimera_beans::constants::is_factory_dereference;
///
/// assert!(is_factory_dereference("&dataSource"));
/// assert!(!is_factory_dereference("dataSource"));
/// ```
pub fn is_factory_dereference(name: &str) -> bool {
    name.starts_with(FACTORY_BEAN_PREFIX)
}

/// 去掉所有解引用前缀
///
/// # Example
/// ```
/// use chimera_beans::constants::strip_factory_dereference;
///
/// assert_eq!(strip_factory_dereference("&dataSource"), "dataSource");
/// assert_eq!(strip_factory_dereference("dataSource"), "dataSource");
/// ```
pub fn strip_factory_dereference(name: &str) -> &str {
    name.trim_start_matches(FACTORY_BEAN_PREFIX)
}

/// 为名称加上解引用前缀
pub fn factory_dereference(name: &str) -> String {
    format!("{}{}", FACTORY_BEAN_PREFIX, name)
}
