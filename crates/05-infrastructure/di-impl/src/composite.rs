//! 复合对象展开

use di_abstractions::{object_id, SharedObject};
use std::collections::HashSet;

/// 把对象展开为待处理的叶子对象
///
/// 非复合对象原样返回；复合对象按先序递归展开（包括嵌套的复合对象），
/// 复合对象本身不出现在结果中，同一对象最多出现一次。
pub fn expand_composite(target: &SharedObject) -> Vec<SharedObject> {
    if target.as_composite().is_none() {
        return vec![target.clone()];
    }
    let mut leaves = Vec::new();
    let mut visited = HashSet::new();
    let mut pending = vec![target.clone()];
    while let Some(object) = pending.pop() {
        if !visited.insert(object_id(&object)) {
            continue;
        }
        match object.as_composite() {
            Some(composite) => pending.extend(composite.constituents().into_iter().rev()),
            None => leaves.push(object),
        }
    }
    leaves
}
