//! 工厂扩展点
//!
//! - [`BeanPostProcessor`] 在每个 Bean 的 init 方法前后处理实例
//! - [`BeanFactoryPostProcessor`] 在预实例化之前修改工厂（例如注册或替换定义）

use crate::bean::Object;
use crate::bean_factory::ConfigurableListableBeanFactory;

/// BeanPostProcessor trait
///
/// 在 Bean 初始化的不同阶段提供钩子，允许替换或包装 Bean 实例。
///
/// # 示例
///
/// ```
/// use chimera_beans::bean::Object;
/// use chimera_beans::lifecycle::BeanPostProcessor;
///
/// struct LoggingBeanPostProcessor;
///
/// impl BeanPostProcessor for LoggingBeanPostProcessor {
///     fn post_process_after_initialization(
///         &self,
///         bean: Object,
///         bean_name: &str,
///     ) -> anyhow::Result<Object> {
///         tracing::info!("After initialization: {}", bean_name);
///         Ok(bean)
///     }
/// }
/// ```
pub trait BeanPostProcessor: Send + Sync {
    /// 在 init 方法之前调用
    fn post_process_before_initialization(
        &self,
        bean: Object,
        _bean_name: &str,
    ) -> anyhow::Result<Object> {
        Ok(bean)
    }

    /// 在 init 方法之后调用，典型用途是返回包装后的对象
    fn post_process_after_initialization(
        &self,
        bean: Object,
        _bean_name: &str,
    ) -> anyhow::Result<Object> {
        Ok(bean)
    }

    /// 处理器名称（用于日志）
    fn name(&self) -> &str {
        "BeanPostProcessor"
    }

    /// 优先级，数字越小越先执行，默认为 1000
    fn order(&self) -> i32 {
        1000
    }
}

/// BeanFactoryPostProcessor trait
///
/// 在所有定义加载完成、任何单例实例化之前调用。
/// 接收的工厂同时是定义注册表，可以注册、替换或移除定义。
pub trait BeanFactoryPostProcessor: Send + Sync {
    fn post_process_bean_factory(
        &self,
        bean_factory: &dyn ConfigurableListableBeanFactory,
    ) -> anyhow::Result<()>;

    fn name(&self) -> &str {
        "BeanFactoryPostProcessor"
    }

    fn order(&self) -> i32 {
        1000
    }
}
