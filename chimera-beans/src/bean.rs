use std::any::{Any, TypeId};
use std::fmt;
use std::sync::{Arc, OnceLock};

/// 工厂管理的对象
pub type Object = Arc<dyn Any + Send + Sync>;

/// FactoryBean 能力 - 本身不是最终对象，而是负责生产 "产品" 对象
///
/// 工厂通过 `get_bean("name")` 返回产品，通过 `get_bean("&name")` 返回工厂本身。
pub trait FactoryBean: Any + Send + Sync {
    /// 获取产品对象
    ///
    /// 返回 `Ok(None)` 表示工厂尚未完成初始化，工厂会将其视为循环引用
    fn get_object(&self) -> anyhow::Result<Option<Object>>;

    /// 产品的类型，事先未知时返回 None
    fn object_type(&self) -> Option<TypeId> {
        None
    }

    /// 产品是否为单例
    fn is_singleton(&self) -> bool {
        true
    }

    /// 工厂完成构造后、定义中的 init 方法之前调用
    fn after_properties_set(&self) -> anyhow::Result<()> {
        Ok(())
    }

    /// 单例销毁时调用，先于定义中的 destroy 方法
    fn destroy(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Bean 实例 - 普通对象或具有 FactoryBean 能力的对象
#[derive(Clone)]
pub enum BeanInstance {
    Object(Object),
    Factory {
        factory: Arc<dyn FactoryBean>,
        /// 与 `factory` 指向同一个实例，供解引用调用方向下转型
        raw: Object,
    },
}

impl BeanInstance {
    pub fn object<T: Any + Send + Sync>(value: T) -> Self {
        BeanInstance::Object(Arc::new(value))
    }

    pub fn from_object(object: Object) -> Self {
        BeanInstance::Object(object)
    }

    pub fn factory<F: FactoryBean>(factory: F) -> Self {
        let factory = Arc::new(factory);
        BeanInstance::Factory {
            raw: factory.clone(),
            factory,
        }
    }

    pub fn is_factory(&self) -> bool {
        matches!(self, BeanInstance::Factory { .. })
    }

    pub fn as_factory(&self) -> Option<&Arc<dyn FactoryBean>> {
        match self {
            BeanInstance::Factory { factory, .. } => Some(factory),
            BeanInstance::Object(_) => None,
        }
    }

    /// 原始对象（FactoryBean 返回工厂本身）
    pub fn raw(&self) -> &Object {
        match self {
            BeanInstance::Object(object) => object,
            BeanInstance::Factory { raw, .. } => raw,
        }
    }

    pub fn into_object(self) -> Object {
        match self {
            BeanInstance::Object(object) => object,
            BeanInstance::Factory { raw, .. } => raw,
        }
    }

    pub fn ptr_eq(&self, other: &BeanInstance) -> bool {
        Arc::ptr_eq(self.raw(), other.raw())
    }
}

impl fmt::Debug for BeanInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BeanInstance::Object(_) => f.write_str("BeanInstance::Object"),
            BeanInstance::Factory { factory, .. } => f
                .debug_struct("BeanInstance::Factory")
                .field("singleton", &factory.is_singleton())
                .finish(),
        }
    }
}

type CreateFn = Box<dyn Fn() -> anyhow::Result<Object> + Send + Sync>;
type DestroyFn = Box<dyn Fn(&Object) -> anyhow::Result<()> + Send + Sync>;

/// 通用的 FactoryBean 实现
///
/// 单例模式下产品在 `after_properties_set` 中创建并缓存（工厂创建完 FactoryBean 后自动调用），
/// 之前调用 `get_object` 得到 `None`；原型模式下每次调用都创建新产品。
pub struct SimpleFactoryBean {
    singleton: bool,
    object_type: Option<TypeId>,
    create: CreateFn,
    destroy: Option<DestroyFn>,
    instance: OnceLock<Object>,
}

impl SimpleFactoryBean {
    pub fn new<T, F>(create: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn() -> anyhow::Result<T> + Send + Sync + 'static,
    {
        Self {
            singleton: true,
            object_type: Some(TypeId::of::<T>()),
            create: Box::new(move || create().map(|value| Arc::new(value) as Object)),
            destroy: None,
            instance: OnceLock::new(),
        }
    }

    pub fn with_singleton(mut self, singleton: bool) -> Self {
        self.singleton = singleton;
        self
    }

    /// 单例产品的销毁回调
    pub fn with_destroy<T, F>(mut self, destroy: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&T) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.destroy = Some(Box::new(move |object: &Object| match object.downcast_ref::<T>() {
            Some(product) => destroy(product),
            None => Err(anyhow::anyhow!(
                "Product is not of type {}",
                std::any::type_name::<T>()
            )),
        }));
        self
    }
}

impl FactoryBean for SimpleFactoryBean {
    fn get_object(&self) -> anyhow::Result<Option<Object>> {
        if self.singleton {
            Ok(self.instance.get().cloned())
        } else {
            (self.create)().map(Some)
        }
    }

    fn object_type(&self) -> Option<TypeId> {
        self.object_type
    }

    fn is_singleton(&self) -> bool {
        self.singleton
    }

    /// 单例模式下创建并缓存产品
    fn after_properties_set(&self) -> anyhow::Result<()> {
        if self.singleton && self.instance.get().is_none() {
            let object = (self.create)()?;
            let _ = self.instance.set(object);
        }
        Ok(())
    }

    fn destroy(&self) -> anyhow::Result<()> {
        match (&self.destroy, self.instance.get()) {
            (Some(destroy), Some(object)) => destroy(object),
            _ => Ok(()),
        }
    }
}
