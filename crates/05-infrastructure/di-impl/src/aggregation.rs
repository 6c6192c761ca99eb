//! 聚合注册表的图遍历
//!
//! 深度优先、先序遍历聚合关系，携带已访问集合，循环聚合时同样会终止。
//! 遍历次数以可达的不同注册表数量为上界。

use crate::registry::BindingRegistry;
use std::collections::HashSet;
use std::sync::Arc;

fn registry_id(registry: &BindingRegistry) -> usize {
    registry as *const BindingRegistry as usize
}

/// 聚合注册表遍历器
///
/// 不包含起点注册表本身；每个注册表最多产出一次。
pub struct AggregationWalk {
    visited: HashSet<usize>,
    stack: Vec<Arc<BindingRegistry>>,
}

impl AggregationWalk {
    /// 从指定注册表开始遍历
    pub fn new(root: &BindingRegistry) -> Self {
        let mut visited = HashSet::new();
        visited.insert(registry_id(root));
        let stack = root.aggregates().into_iter().rev().collect();
        Self { visited, stack }
    }
}

impl Iterator for AggregationWalk {
    type Item = Arc<BindingRegistry>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(registry) = self.stack.pop() {
            if !self.visited.insert(registry_id(&registry)) {
                continue;
            }
            let visited = &self.visited;
            let children: Vec<_> = registry
                .aggregates()
                .into_iter()
                .rev()
                .filter(|child| !visited.contains(&registry_id(child)))
                .collect();
            self.stack.extend(children);
            return Some(registry);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(walk: AggregationWalk) -> Vec<String> {
        walk.map(|r| r.name().to_string()).collect()
    }

    #[test]
    fn test_preorder_with_most_recent_first() {
        let root = BindingRegistry::new("root");
        let b = Arc::new(BindingRegistry::new("b"));
        let c = Arc::new(BindingRegistry::new("c"));
        let d = Arc::new(BindingRegistry::new("d"));
        b.aggregate(d.clone());
        root.aggregate(c.clone());
        root.aggregate(b.clone());
        assert_eq!(names(AggregationWalk::new(&root)), ["b", "d", "c"]);
    }

    #[test]
    fn test_cyclic_aggregation_terminates() {
        let a = Arc::new(BindingRegistry::new("a"));
        let b = Arc::new(BindingRegistry::new("b"));
        a.aggregate(b.clone());
        b.aggregate(a.clone());
        b.aggregate(b.clone());
        assert_eq!(names(AggregationWalk::new(&a)), ["b"]);
        assert_eq!(names(AggregationWalk::new(&b)), ["a"]);
        a.deaggregate(&b);
        b.deaggregate(&a);
        b.deaggregate(&b);
    }

    #[test]
    fn test_diamond_visits_once() {
        let root = BindingRegistry::new("root");
        let left = Arc::new(BindingRegistry::new("left"));
        let right = Arc::new(BindingRegistry::new("right"));
        let shared = Arc::new(BindingRegistry::new("shared"));
        left.aggregate(shared.clone());
        right.aggregate(shared.clone());
        root.aggregate(right.clone());
        root.aggregate(left.clone());
        assert_eq!(names(AggregationWalk::new(&root)), ["left", "shared", "right"]);
    }
}
