//! Bean 工厂错误类型
//!
//! 领域错误使用 `BeanError`（thiserror），协作者（实例化策略、FactoryBean、后置处理器）
//! 返回 `anyhow::Result`，工厂在边界处判断错误是否已经是 `BeanError`：
//! 是则原样传播，否则包装为 `BeanError::BeanCreation`。

use thiserror::Error;

/// 协作者使用的统一错误类型
pub use anyhow::Result;

/// 工厂操作的结果类型
pub type BeanResult<T> = std::result::Result<T, BeanError>;

/// 被包装的底层错误
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Bean 工厂错误分类
#[derive(Debug, Error)]
pub enum BeanError {
    /// 整个工厂层级中都找不到该名称
    #[error("No bean named '{name}' is defined: {factory}")]
    NoSuchBeanDefinition { name: String, factory: String },

    /// 请求实例化一个抽象定义
    #[error("Bean definition '{name}' is abstract and cannot be instantiated")]
    BeanIsAbstract { name: String },

    /// 定义违反了结构性约束，在注册时抛出
    #[error("Invalid bean definition with name '{name}'{}: {message}", describe(.resource_description))]
    BeanDefinitionValidation {
        name: String,
        resource_description: Option<String>,
        message: String,
    },

    /// 注册表层面的冲突（重复定义、别名冲突、重复单例）
    #[error("Error registering bean with name '{name}'{}: {message}", describe(.resource_description))]
    BeanDefinitionStore {
        name: String,
        resource_description: Option<String>,
        message: String,
    },

    /// 对非 FactoryBean 使用了解引用前缀
    #[error("Bean named '{name}' must be a FactoryBean but was actually of type [{type_name}]")]
    BeanIsNotAFactory { name: String, type_name: String },

    /// FactoryBean 在构造完成前被再次请求，返回了空产品
    #[error(
        "Factory bean '{name}' returned null object - possible cause: not fully initialized due to circular bean reference"
    )]
    FactoryBeanCircularReference { name: String },

    /// 实例化策略失败
    #[error("Error creating bean with name '{name}'{}: {source}", describe(.resource_description))]
    BeanCreation {
        name: String,
        resource_description: Option<String>,
        #[source]
        source: BoxError,
    },

    /// `get_bean_as` 找到的 Bean 类型不匹配
    #[error("Bean named '{name}' must be of type [{required}], but was actually of type [{actual}]")]
    BeanNotOfRequiredType {
        name: String,
        required: String,
        actual: String,
    },

    /// 定义中的类名无法解析
    #[error("Cannot resolve bean class [{class_name}] for bean with name '{name}'")]
    CannotLoadBeanClass { name: String, class_name: String },

    /// 单例在创建过程中被再次请求
    #[error("Bean '{name}' is currently in creation: {}", .chain.join(" -> "))]
    BeanCurrentlyInCreation { name: String, chain: Vec<String> },

    /// depends-on 依赖图校验失败
    #[error("Dependency validation failed: {0}")]
    DependencyValidation(String),
}

fn describe(resource_description: &Option<String>) -> String {
    match resource_description {
        Some(description) => format!(" defined in {}", description),
        None => String::new(),
    }
}

impl BeanError {
    pub fn no_such_bean(name: impl Into<String>, factory: impl Into<String>) -> Self {
        Self::NoSuchBeanDefinition {
            name: name.into(),
            factory: factory.into(),
        }
    }

    pub fn store(
        name: impl Into<String>,
        resource_description: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::BeanDefinitionStore {
            name: name.into(),
            resource_description,
            message: message.into(),
        }
    }

    /// 将协作者返回的错误归类：已是 `BeanError` 的原样返回，其它包装为创建失败
    pub fn from_creation(
        name: &str,
        resource_description: Option<&str>,
        error: anyhow::Error,
    ) -> Self {
        match error.downcast::<BeanError>() {
            Ok(bean_error) => bean_error,
            Err(other) => Self::BeanCreation {
                name: name.to_string(),
                resource_description: resource_description.map(str::to_string),
                source: other.into(),
            },
        }
    }

    /// 是否为 "找不到" 错误（用于父工厂回退）
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NoSuchBeanDefinition { .. })
    }

    /// 错误涉及的 Bean 名称
    pub fn bean_name(&self) -> Option<&str> {
        match self {
            Self::NoSuchBeanDefinition { name, .. }
            | Self::BeanIsAbstract { name }
            | Self::BeanDefinitionValidation { name, .. }
            | Self::BeanDefinitionStore { name, .. }
            | Self::BeanIsNotAFactory { name, .. }
            | Self::FactoryBeanCircularReference { name }
            | Self::BeanCreation { name, .. }
            | Self::BeanNotOfRequiredType { name, .. }
            | Self::CannotLoadBeanClass { name, .. }
            | Self::BeanCurrentlyInCreation { name, .. } => Some(name),
            Self::DependencyValidation(_) => None,
        }
    }
}
