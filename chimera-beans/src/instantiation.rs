//! 实例化策略
//!
//! 工厂不直接构造对象，而是把合并后的定义交给 [`InstantiationStrategy`]。
//! 默认的 [`SimpleInstantiationStrategy`] 通过 [`BeanClass`] 上注册的构造函数、
//! 静态工厂方法或实例工厂方法创建对象。

use std::any::Any;
use std::sync::Arc;

use anyhow::Context;

use crate::bean::{BeanInstance, Object};
use crate::bean_class::BeanClass;
use crate::bean_factory::{BeanFactory, BeanFactoryExt, ConfigurableBeanFactory, DefaultListableBeanFactory};
use crate::definition::RootBeanDefinition;
use crate::error::BeanResult;
use crate::value::Value;

/// 创建单个 Bean 时可用的上下文
///
/// 构造函数通过它读取属性值、构造参数，以及按名称获取其它 Bean。
pub struct BeanCreationContext<'a> {
    bean_name: &'a str,
    definition: &'a RootBeanDefinition,
    factory: &'a DefaultListableBeanFactory,
}

impl<'a> BeanCreationContext<'a> {
    pub fn new(
        bean_name: &'a str,
        definition: &'a RootBeanDefinition,
        factory: &'a DefaultListableBeanFactory,
    ) -> Self {
        Self {
            bean_name,
            definition,
            factory,
        }
    }

    pub fn bean_name(&self) -> &str {
        self.bean_name
    }

    pub fn definition(&self) -> &RootBeanDefinition {
        self.definition
    }

    pub fn factory(&self) -> &DefaultListableBeanFactory {
        self.factory
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.definition.property_values().get(name)
    }

    /// 必需的属性值
    pub fn required_property(&self, name: &str) -> anyhow::Result<&Value> {
        self.property(name).ok_or_else(|| {
            anyhow::anyhow!(
                "Property '{}' is required for bean '{}'",
                name,
                self.bean_name
            )
        })
    }

    /// 按位置获取构造参数，位置上没有时退回到通用参数
    pub fn constructor_arg(&self, index: usize) -> Option<&Value> {
        self.definition
            .constructor_argument_values()
            .get_argument_value(index, None)
            .map(|holder| &holder.value)
    }

    pub fn get_bean(&self, name: &str) -> BeanResult<Object> {
        self.factory.get_bean(name)
    }

    pub fn get_bean_as<T: Any + Send + Sync>(&self, name: &str) -> BeanResult<Arc<T>> {
        self.factory.get_bean_as::<T>(name)
    }

    /// 解析引用类型的属性，返回被引用的 Bean
    pub fn property_ref<T: Any + Send + Sync>(&self, name: &str) -> anyhow::Result<Arc<T>> {
        let value = self.required_property(name)?;
        let target = value.as_bean_ref().ok_or_else(|| {
            anyhow::anyhow!(
                "Property '{}' of bean '{}' must be a bean reference, but was {}",
                name,
                self.bean_name,
                value.type_name()
            )
        })?;
        Ok(self.get_bean_as::<T>(target)?)
    }
}

/// 实例化策略
pub trait InstantiationStrategy: Send + Sync {
    /// 根据合并后的定义创建实例
    ///
    /// 返回的实例尚未经过后置处理器和 init 方法，也不能由策略自己放入单例缓存。
    fn instantiate(
        &self,
        ctx: &BeanCreationContext<'_>,
        class: Option<&BeanClass>,
    ) -> anyhow::Result<BeanInstance>;

    /// 销毁实例，默认调用定义中的 destroy 方法
    fn destroy(
        &self,
        bean_name: &str,
        definition: &RootBeanDefinition,
        class: Option<&BeanClass>,
        instance: &BeanInstance,
    ) -> anyhow::Result<()> {
        let Some(method) = definition.destroy_method_name() else {
            return Ok(());
        };
        let class = class.ok_or_else(|| {
            anyhow::anyhow!(
                "Cannot invoke destroy method '{}' on bean '{}' without a bean class",
                method,
                bean_name
            )
        })?;
        class.invoke_method(method, &**instance.raw())
    }

    fn name(&self) -> &str {
        "InstantiationStrategy"
    }
}

/// 基于 [`BeanClass`] 方法表的默认实例化策略
#[derive(Debug, Default, Clone, Copy)]
pub struct SimpleInstantiationStrategy;

impl SimpleInstantiationStrategy {
    pub fn new() -> Self {
        Self
    }

    fn instantiate_with_instance_factory(
        &self,
        ctx: &BeanCreationContext<'_>,
        factory_bean_name: &str,
        method: &str,
    ) -> anyhow::Result<BeanInstance> {
        let factory = ctx.factory();
        let target = factory.get_bean(factory_bean_name)?;
        let merged = factory.get_merged_bean_definition(factory_bean_name, true)?;
        let class = merged
            .resolve_bean_class(factory_bean_name, factory.class_registry())?
            .ok_or_else(|| {
                anyhow::anyhow!("Factory bean '{}' has no bean class", factory_bean_name)
            })?;
        let factory_method = class.factory_method(method).ok_or_else(|| {
            anyhow::anyhow!(
                "No factory method '{}' found on class [{}] of factory bean '{}'",
                method,
                class.name(),
                factory_bean_name
            )
        })?;
        factory_method(Some(&*target), ctx)
    }
}

impl InstantiationStrategy for SimpleInstantiationStrategy {
    fn instantiate(
        &self,
        ctx: &BeanCreationContext<'_>,
        class: Option<&BeanClass>,
    ) -> anyhow::Result<BeanInstance> {
        let definition = ctx.definition();

        if let Some(method) = definition.factory_method_name() {
            if let Some(factory_bean_name) = definition.factory_bean_name() {
                tracing::trace!(
                    "Instantiating bean '{}' via factory method '{}' on bean '{}'",
                    ctx.bean_name(),
                    method,
                    factory_bean_name
                );
                return self
                    .instantiate_with_instance_factory(ctx, factory_bean_name, method)
                    .with_context(|| {
                        format!("Factory method '{}' on bean '{}' failed", method, factory_bean_name)
                    });
            }

            let class = class.ok_or_else(|| {
                anyhow::anyhow!("Static factory method '{}' requires a bean class", method)
            })?;
            let factory_method = class.factory_method(method).ok_or_else(|| {
                anyhow::anyhow!(
                    "No static factory method '{}' found on class [{}]",
                    method,
                    class.name()
                )
            })?;
            tracing::trace!(
                "Instantiating bean '{}' via static factory method '{}'",
                ctx.bean_name(),
                method
            );
            return factory_method(None, ctx);
        }

        let class = class
            .ok_or_else(|| anyhow::anyhow!("Bean '{}' has no bean class", ctx.bean_name()))?;
        let constructor = class.constructor().ok_or_else(|| {
            anyhow::anyhow!("No constructor registered for class [{}]", class.name())
        })?;
        constructor(ctx)
    }

    fn name(&self) -> &str {
        "SimpleInstantiationStrategy"
    }
}
