// chimera-beans: 类似 Spring 的 Bean 工厂核心
//
// 提供：
// - Root / Child 定义与合并
// - 单例和原型作用域，双重检查的单例缓存
// - FactoryBean 与 `&` 解引用
// - 别名和父子工厂
// - 后置处理器与应用上下文的刷新/关闭流程

pub mod bean;
pub mod bean_class;
pub mod bean_factory;
pub mod config;
pub mod constants;
pub mod context;
pub mod definition;
pub mod error;
pub mod instantiation;
pub mod lifecycle;
pub mod logging;
pub mod scope;
pub mod utils;
pub mod value;

// 重新导出常用类型
pub use bean::{BeanInstance, FactoryBean, Object, SimpleFactoryBean};
pub use bean_class::{BeanClass, BeanClassBuilder, BeanClassSubmission, ClassRegistry};
pub use bean_factory::{
    BeanDefinitionRegistry, BeanFactory, BeanFactoryExt, ConfigurableBeanFactory,
    ConfigurableListableBeanFactory, DefaultListableBeanFactory, HierarchicalBeanFactory,
    ListableBeanFactory,
};
pub use config::FactoryConfig;
pub use constants::*;
pub use context::{
    ApplicationContext, ApplicationListener, BeanDefinitionReader, ContextEvent, MessageSource,
    StaticBeanDefinitionReader, StaticMessageSource,
};
pub use definition::{
    AutowireMode, BeanDefinition, ChildBeanDefinition, DependencyCheck, RootBeanDefinition,
};
pub use error::{BeanError, BeanResult, Result};
pub use instantiation::{BeanCreationContext, InstantiationStrategy, SimpleInstantiationStrategy};
pub use lifecycle::{BeanFactoryPostProcessor, BeanPostProcessor};
pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use scope::Scope;
pub use value::{ConstructorArgumentValues, MutablePropertyValues, PropertyValue, Value, ValueHolder};

// 导出 inventory，供 `inventory::submit!` 注册类使用
pub use inventory;

/// Prelude 模块，包含常用的 traits 和类型
pub mod prelude {
    pub use crate::bean::{BeanInstance, FactoryBean, Object, SimpleFactoryBean};
    pub use crate::bean_class::{BeanClass, BeanClassSubmission, ClassRegistry};
    pub use crate::bean_factory::{
        BeanDefinitionRegistry, BeanFactory, BeanFactoryExt, ConfigurableBeanFactory,
        ConfigurableListableBeanFactory, DefaultListableBeanFactory, HierarchicalBeanFactory,
        ListableBeanFactory,
    };
    pub use crate::config::FactoryConfig;
    pub use crate::context::{
        ApplicationContext, ApplicationListener, ContextEvent, MessageSource,
        StaticBeanDefinitionReader,
    };
    pub use crate::definition::{BeanDefinition, ChildBeanDefinition, RootBeanDefinition};
    pub use crate::error::{BeanError, BeanResult, Result};
    pub use crate::instantiation::BeanCreationContext;
    pub use crate::lifecycle::{BeanFactoryPostProcessor, BeanPostProcessor};
    pub use crate::logging::{LogFormat, LogLevel, LoggingConfig};
    pub use crate::scope::Scope;
    pub use crate::value::Value;
    // Re-export anyhow for convenience
    pub use anyhow::{anyhow, Context};
}
