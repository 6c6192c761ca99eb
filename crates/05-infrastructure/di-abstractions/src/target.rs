//! 注入目标抽象
//!
//! 描述可被注入的对象、它的注入方法，以及复合对象的展开能力

use crate::factory::{Arguments, ParameterInfo};
use crate::scope::ScopeAware;
use infrastructure_common::{erase, DependencyError, DependencyResult, Instance, TypeKey};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// 在模块链中流转的共享对象
pub type SharedObject = Arc<dyn InjectionTarget>;

/// 注入目标 trait
///
/// `injection_methods` 列出候选方法，由注册表的命名约定过滤，
/// 过滤结果按具体类型缓存，因此同一类型的所有实例应返回相同的方法列表。
pub trait InjectionTarget: Send + Sync + 'static {
    /// 转换为 `Any` 以便注入方法还原具体类型
    fn as_any(&self) -> &dyn Any;

    /// 具体类型
    fn target_type(&self) -> TypeKey {
        TypeKey::of::<Self>()
    }

    /// 候选注入方法
    fn injection_methods(&self) -> Vec<InjectionMethod> {
        Vec::new()
    }

    /// 复合对象展开能力
    fn as_composite(&self) -> Option<&dyn CompositeObject> {
        None
    }

    /// 作用域注入能力
    fn as_scope_aware(&self) -> Option<&dyn ScopeAware> {
        None
    }
}

/// 复合对象展开能力
///
/// 返回按顺序排列的组成对象，组成对象本身也可以是复合对象。
pub trait CompositeObject: Send + Sync {
    /// 组成对象
    fn constituents(&self) -> Vec<SharedObject>;
}

/// 对象身份（指针地址）
pub fn object_id(object: &SharedObject) -> usize {
    Arc::as_ptr(object) as *const () as usize
}

/// 判断两个共享对象是否为同一对象
pub fn same_object(left: &SharedObject, right: &SharedObject) -> bool {
    object_id(left) == object_id(right)
}

/// 注入方法调用函数
pub type MethodInvoker =
    Arc<dyn Fn(&dyn Any, &Arguments) -> DependencyResult<Option<Instance>> + Send + Sync>;

/// 注入方法描述
#[derive(Clone)]
pub struct InjectionMethod {
    name: &'static str,
    declaring_type: TypeKey,
    parameters: Vec<ParameterInfo>,
    invoker: MethodInvoker,
}

impl InjectionMethod {
    /// 创建无返回值的注入方法
    pub fn new<T, F>(name: &'static str, parameters: Vec<ParameterInfo>, method: F) -> Self
    where
        T: 'static,
        F: Fn(&T, &Arguments) + Send + Sync + 'static,
    {
        Self::build::<T, _>(name, parameters, move |target, args| {
            method(target, args);
            None
        })
    }

    /// 创建带返回值的方法
    pub fn with_result<T, R, F>(name: &'static str, parameters: Vec<ParameterInfo>, method: F) -> Self
    where
        T: 'static,
        R: Send + Sync + 'static,
        F: Fn(&T, &Arguments) -> R + Send + Sync + 'static,
    {
        Self::build::<T, _>(name, parameters, move |target, args| {
            Some(erase(Arc::new(method(target, args))))
        })
    }

    fn build<T, F>(name: &'static str, parameters: Vec<ParameterInfo>, method: F) -> Self
    where
        T: 'static,
        F: Fn(&T, &Arguments) -> Option<Instance> + Send + Sync + 'static,
    {
        let declaring_type = TypeKey::of::<T>();
        let invoker: MethodInvoker = Arc::new(move |target, args| {
            let target = target.downcast_ref::<T>().ok_or_else(|| DependencyError::TypeMismatch {
                expected: declaring_type.name().to_string(),
                actual: "<目标对象>".to_string(),
            })?;
            Ok(method(target, args))
        });
        Self {
            name,
            declaring_type,
            parameters,
            invoker,
        }
    }

    /// 方法名称
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 声明该方法的类型
    pub fn declaring_type(&self) -> TypeKey {
        self.declaring_type
    }

    /// 参数列表
    pub fn parameters(&self) -> &[ParameterInfo] {
        &self.parameters
    }

    /// 使用已解析的实参调用方法
    pub fn invoke(&self, target: &dyn Any, arguments: &Arguments) -> DependencyResult<Option<Instance>> {
        (self.invoker)(target, arguments)
    }
}

impl fmt::Debug for InjectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InjectionMethod")
            .field("name", &self.name)
            .field("declaring_type", &self.declaring_type)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Receiver {
        seen: Mutex<Option<i32>>,
    }

    impl InjectionTarget for Receiver {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_invoke_downcasts_target() {
        let method = InjectionMethod::new::<Receiver, _>(
            "inject",
            vec![ParameterInfo::of::<i32>("value")],
            |target, args| *target.seen.lock() = Some(args.value(0)),
        );
        let receiver = Receiver::default();
        let args = Arguments::new(vec![Some(erase(Arc::new(9_i32)))]);
        let result = method.invoke(receiver.as_any(), &args).unwrap();
        assert!(result.is_none());
        assert_eq!(*receiver.seen.lock(), Some(9));

        let wrong = method.invoke(&5_u8, &args);
        assert!(matches!(wrong, Err(DependencyError::TypeMismatch { .. })));
    }

    #[test]
    fn test_object_identity() {
        let a: SharedObject = Arc::new(Receiver::default());
        let b: SharedObject = Arc::new(Receiver::default());
        assert!(same_object(&a, &a.clone()));
        assert!(!same_object(&a, &b));
        assert!(a.target_type().is::<Receiver>());
    }
}
