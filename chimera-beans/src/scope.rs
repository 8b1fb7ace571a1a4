/// Bean 的作用域
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    /// 单例模式 - 工厂中只有一个实例
    #[default]
    Singleton,

    /// 原型模式 - 每次请求都创建新实例
    Prototype,
}

impl Scope {
    pub fn is_singleton(self) -> bool {
        self == Scope::Singleton
    }

    pub fn from_singleton(singleton: bool) -> Self {
        if singleton {
            Scope::Singleton
        } else {
            Scope::Prototype
        }
    }
}
